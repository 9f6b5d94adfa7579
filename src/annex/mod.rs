//! Annex Module
//!
//! The host side of the conversation as seen from a backend.
//!
//! ## Callback Shapes
//! - Single value: `GETCONFIG name` → `VALUE <value>`
//! - Value list: `GETURLS key prefix` → `VALUE <url>` … then a bare `VALUE`
//! - Fixed arity: `GETCREDS setting` → `CREDS <user> <password>`
//! - Fire and forget: `SETCONFIG`, `SETSTATE`, `PROGRESS`, `DEBUG`, …

mod client;
mod extensions;

pub use client::{Annex, Credentials};
pub use extensions::{Extensions, GETGITREMOTENAME, INFO};
