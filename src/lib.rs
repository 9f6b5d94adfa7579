//! # annex-remote
//!
//! Build git-annex external special remotes in Rust:
//! - Line protocol codec for requests, replies and host callbacks
//! - Session loop that turns backend outcomes into protocol replies
//! - Capability traits for key storage, URL handling and export trees
//! - Blocking callback client for talking back to the host mid-request
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     git-annex (host)                         │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ stdin / stdout, one line at a time
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                       Session                                │
//! │          (read line → decode → dispatch → reply)             │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │ Dispatcher  │─────────▶│   Backend   │
//!   │ (ext/scope) │          │ (traits)    │
//!   └─────────────┘          └──────┬──────┘
//!                                   │ callbacks
//!                                   ▼
//!                           ┌─────────────┐
//!                           │    Annex    │
//!                           │  (client)   │
//!                           └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod remote;
pub mod annex;
pub mod session;
pub mod key;
pub mod cli;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{AnnexError, RemoteError, RemoteResult, Result};
pub use config::Config;
pub use session::Session;
pub use remote::{ExportRemote, SpecialRemote, UrlCheck, UrlItem, UrlRemote};
pub use annex::{Annex, Credentials, Extensions};
pub use key::Key;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of annex-remote
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
