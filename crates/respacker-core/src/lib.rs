//! respacker Core Library
//!
//! This crate provides the math types, error handling and logging setup
//! shared by the scene host and the export pipeline.

pub mod error;
pub mod logging;
pub mod types;

pub use error::{Error, Result, ResultExt};
pub use types::*;
