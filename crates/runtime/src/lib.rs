pub mod event;
pub mod session;

pub use event::*;
pub use session::*;
