pub mod classify;
pub mod export;
pub mod formats;

pub use classify::*;
pub use export::*;
pub use formats::*;
