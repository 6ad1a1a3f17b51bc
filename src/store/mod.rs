pub mod bundle;
pub mod fs;
pub mod mem;
pub mod postgres;
pub mod traits;

pub use bundle::*;
pub use fs::*;
pub use mem::*;
pub use postgres::*;
pub use traits::*;
