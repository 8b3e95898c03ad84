pub mod config;
pub mod error;
pub mod types;

pub use error::{RippleError, RippleResult};
pub use types::StrategyKind;
