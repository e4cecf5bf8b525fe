//! Core domain models for a content pipeline run
//!
//! Typed stage inputs and outputs, the task ledger, the terminal result,
//! the error taxonomy, and runtime configuration.

pub mod config;
pub mod error;
pub mod ledger;
pub mod outline;
pub mod request;
pub mod result;

pub use error::*;
pub use ledger::*;
pub use outline::*;
pub use request::*;
pub use result::*;
