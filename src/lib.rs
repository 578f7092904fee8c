//! redsync CLI - Resumable bulk sync of redirect rules
//!
//! This crate provides the core functionality for the `redsync` CLI tool.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface using clap
//! - [`model`] - Data types (Redirect, OperationKind)
//! - [`validate`] - Record validation with type normalization
//! - [`sync`] - Fingerprinting, batching, checkpoints and the resumable engine
//! - [`remote`] - Remote redirect service client
//! - [`config`] - Configuration management
//! - [`error`] - Error types and handling

#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod config;
pub mod error;
pub mod model;
pub mod remote;
pub mod sync;
pub mod validate;

pub use error::{Error, Result};
