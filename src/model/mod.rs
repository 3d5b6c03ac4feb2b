//! Pure data structures shared by the discovery and favorites components.

pub mod favorite;
pub mod property;
pub mod session;

pub use favorite::*;
pub use property::*;
pub use session::*;
