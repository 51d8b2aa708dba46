pub mod board;
pub mod config;
pub mod error;
pub mod session;
pub mod shutdown;
pub mod store;

pub use error::{BoardError, Result};
