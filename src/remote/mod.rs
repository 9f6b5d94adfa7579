//! Remote Module
//!
//! The contract a storage backend implements.
//!
//! ## Capabilities
//! - [`SpecialRemote`]: required key operations plus defaulted optional ones
//! - [`UrlRemote`]: `CLAIMURL` / `CHECKURL`
//! - [`ExportRemote`]: the `EXPORT` family
//!
//! Each operation returns a [`RemoteResult`](crate::RemoteResult):
//! `Ok`, `Failed(message)` for a business failure, or `Unsupported`.

mod special;
mod url;
mod export;

pub use special::SpecialRemote;
pub use url::{UrlCheck, UrlItem, UrlRemote};
pub use export::ExportRemote;
