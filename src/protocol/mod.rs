//! Protocol Module
//!
//! Defines the line-oriented wire protocol spoken with the host.
//!
//! ## Conversation
//! ```text
//!   remote                          host
//!     │ ── VERSION 1 ─────────────────▶ │
//!     │ ◀──────────────── INITREMOTE ── │
//!     │ ── INITREMOTE-SUCCESS ────────▶ │
//!     │ ◀──── TRANSFER STORE Key File ── │
//!     │ ── GETCONFIG directory ───────▶ │   (host callback, optional)
//!     │ ◀──────────────── VALUE /srv ── │
//!     │ ── TRANSFER-SUCCESS STORE Key ▶ │
//! ```
//!
//! The conversation is half-duplex: one request line, then the reply line(s),
//! with any host callbacks the backend makes nested in between.
//!
//! ### Request Verbs
//! - No parameters: INITREMOTE, PREPARE, GETCOST, GETAVAILABILITY,
//!   EXPORTSUPPORTED, GETINFO, LISTCONFIGS
//! - One parameter: CHECKPRESENT, REMOVE, CLAIMURL, CHECKURL, WHEREIS,
//!   EXPORT, CHECKPRESENTEXPORT, REMOVEEXPORT, REMOVEEXPORTDIRECTORY,
//!   EXTENSIONS, ERROR
//! - Several parameters: TRANSFER, TRANSFEREXPORT, RENAMEEXPORT

mod command;
mod response;
mod codec;

pub use command::{Direction, Request};
pub use response::{Availability, MultiUrl, Reply};
pub use codec::{
    check_field, check_key, decode_reply, decode_request, encode_reply, encode_request,
    flatten_message, read_line, split_params, split_verb, write_line, write_reply, Line,
    SEPARATOR, UNKNOWN_SIZE,
};
