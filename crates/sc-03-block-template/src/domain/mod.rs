//! Domain layer for block template generation

pub mod admission;
pub mod context;
pub mod payouts;
pub mod stability;
pub mod template;

pub use admission::*;
pub use context::*;
pub use payouts::*;
pub use stability::*;
pub use template::*;
