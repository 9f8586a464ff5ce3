//! # revgraph-error
//!
//! Unified error handling for revgraph.
//!
//! ## Design Philosophy
//!
//! - **ErrorKind**: Know what error occurred (e.g., InvalidArgument, AssertionFailed)
//! - **ErrorStatus**: Decide how to handle it (Permanent, Temporary, Persistent)
//! - **Error Context**: Assist in locating the cause with rich context
//! - **Error Source**: Wrap underlying errors without leaking raw types
//!
//! ## Usage
//!
//! ```rust
//! use revgraph_error::{Error, ErrorKind};
//!
//! fn example() -> Result<(), Error> {
//!     Err(Error::new(ErrorKind::InvalidArgument, "row range out of bounds")
//!         .with_operation("graph::fix_row_visibility")
//!         .with_context("from", "3")
//!         .with_context("to", "17"))
//! }
//! ```
//!
//! ## Principles
//!
//! - All fallible engine operations return `Result<T, revgraph_error::Error>`
//! - Same error handled once, subsequent ops only append context
//! - Absent search results are `Option::None`, never errors

mod error;
mod kind;
mod status;

pub use error::Error;
pub use kind::ErrorKind;
pub use status::ErrorStatus;

/// Result type alias using the revgraph Error
pub type Result<T> = std::result::Result<T, Error>;
