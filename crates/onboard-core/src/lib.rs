pub mod catalog;
pub mod codec;
pub mod config;
pub mod detail;
pub mod error;
pub mod form;
pub mod io;
pub mod notify;
pub mod paths;
pub mod progress;
pub mod report;
pub mod session;
pub mod store;
pub mod types;

pub use error::{OnboardError, Result};
