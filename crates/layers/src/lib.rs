pub mod basemap;
pub mod compose;
pub mod filter;
pub mod layer;
pub mod symbology;

pub use basemap::*;
pub use compose::*;
pub use filter::*;
pub use layer::*;
pub use symbology::*;
