//! Data models for redsync.
//!
//! This module contains the domain models:
//! - Redirect (the record being synchronized)
//! - OperationKind (which remote operation a run performs)

pub mod operation;
pub mod redirect;

pub use operation::OperationKind;
pub use redirect::Redirect;
