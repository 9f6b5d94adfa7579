//! Session Module
//!
//! The request loop and the protocol state machine behind it.
//!
//! ## Error Escalation
//! - Unsupported operation: `UNSUPPORTED-REQUEST`, session continues
//! - Business failure: the request's own `-FAILURE` / `-UNKNOWN` reply,
//!   session continues
//! - Structural violation: one `ERROR <description>` line, session ends

mod dispatcher;
mod driver;

pub use dispatcher::{Dispatcher, ExportScope};
pub use driver::Session;
