//! Core types shared by the organizer and the tree layout engine
//!
//! People and relationship edges, configuration, diagnostics, errors and
//! logging setup.

mod config;
mod diagnostics;
mod error;
pub mod logging;
mod types;

pub use config::*;
pub use diagnostics::*;
pub use error::*;
pub use logging::*;
pub use types::*;
