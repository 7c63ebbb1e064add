pub mod adapter;
pub mod config;
pub mod error;
pub mod hooks;
pub mod id;
pub mod io;
pub mod paths;
pub mod queue;
pub mod types;

pub use error::{HodgeError, Result};
