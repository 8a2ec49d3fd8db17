//! Ready-made handler families.
//!
//! - [`On`]: a request handler for one payload type, with an optional check.
//! - [`Grouped`]: a group check in front of an ordered set of children.
//! - [`OnError`] / [`CatchAllErrors`]: error handlers keyed on error type.

mod error;
mod grouped;
mod payload;

pub use error::{CatchAllErrors, OnError, TypedErrorHandler};
pub use grouped::{GroupCheck, Grouped};
pub use payload::{On, PayloadCheck, PayloadHandler};
