pub mod asset;
pub mod common;
pub mod project;
pub mod record;
pub mod report;

pub use asset::*;
pub use common::*;
pub use project::*;
pub use record::*;
pub use report::*;
