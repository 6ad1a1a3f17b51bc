pub mod asset_index;
pub mod candidates;
pub mod normalize;
pub mod pattern_match;
pub mod project_image;
pub mod scaling;
pub mod student_image;

pub use asset_index::*;
pub use candidates::*;
pub use normalize::*;
pub use pattern_match::*;
pub use project_image::*;
pub use scaling::*;
pub use student_image::*;
