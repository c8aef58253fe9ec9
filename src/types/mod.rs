//! Type definitions for runlog

mod error;
mod run;

pub use error::*;
pub use run::*;
