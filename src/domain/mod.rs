pub mod event;
pub mod roster;
pub mod scores;

pub use event::*;
pub use roster::*;
pub use scores::*;
