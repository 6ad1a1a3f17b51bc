pub mod assembler;
pub mod document;
pub mod docx;
pub mod error;
pub mod service;

pub use assembler::*;
pub use document::*;
pub use docx::*;
pub use error::*;
pub use service::*;
