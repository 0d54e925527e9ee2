pub mod feature_collection;
pub mod sea_level;

pub use feature_collection::*;
pub use sea_level::*;
