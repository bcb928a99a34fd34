pub mod event;
pub mod wallet;
pub mod score;
pub mod error;

pub use event::*;
pub use wallet::*;
pub use score::*;
pub use error::*;
