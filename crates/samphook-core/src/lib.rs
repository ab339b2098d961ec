//! # samphook-core
//!
//! Core crate for samphook. Contains the configuration schemas and the
//! unified error system shared by the callback machinery and the demo
//! binary.
//!
//! This crate has **no** internal dependencies on other samphook crates.

pub mod config;
pub mod error;
pub mod result;

pub use error::AppError;
pub use result::AppResult;
