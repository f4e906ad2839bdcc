pub mod config;
pub mod error;
pub mod fmt;

pub use config::*;
pub use error::*;
