//! Core backend interface

use std::collections::BTreeMap;
use std::path::Path;

use crate::annex::Annex;
use crate::error::{RemoteError, RemoteResult};
use super::{ExportRemote, UrlRemote};

/// A storage backend served over the special remote protocol
///
/// The six key operations are required. Everything else defaults to
/// [`RemoteError::Unsupported`], which the session answers with
/// `UNSUPPORTED-REQUEST`. URL and export support are separate capability
/// traits, exposed through [`SpecialRemote::urls`] and
/// [`SpecialRemote::export`].
///
/// Every operation gets the [`Annex`] handle so it can call back into the
/// host (read settings, report progress, ...) before it returns.
pub trait SpecialRemote {
    // =========================================================================
    // Required Operations
    // =========================================================================

    /// One-time setup of a new remote. Settings come from `annex.get_config`.
    fn init_remote(&mut self, annex: &mut Annex<'_>) -> RemoteResult<()>;

    /// Get ready to serve requests. Called before any transfer.
    fn prepare(&mut self, annex: &mut Annex<'_>) -> RemoteResult<()>;

    /// Store the content of `local_file` under `key`
    ///
    /// `check_present` must not report the key until the whole content
    /// has been stored.
    fn transfer_store(&mut self, annex: &mut Annex<'_>, key: &str, local_file: &Path)
        -> RemoteResult<()>;

    /// Fetch the content of `key` into `local_file`
    fn transfer_retrieve(
        &mut self,
        annex: &mut Annex<'_>,
        key: &str,
        local_file: &Path,
    ) -> RemoteResult<()>;

    /// Whether `key` is present. A failure means presence is unknown.
    fn check_present(&mut self, annex: &mut Annex<'_>, key: &str) -> RemoteResult<bool>;

    /// Remove the content of `key`. Removing an absent key succeeds.
    fn remove(&mut self, annex: &mut Annex<'_>, key: &str) -> RemoteResult<()>;

    // =========================================================================
    // Optional Operations
    // =========================================================================

    /// Use cost of the remote, as reported (must parse as an integer)
    ///
    /// Typical values: 100 cheap, 175 semi-expensive, 200 expensive,
    /// 1000 very expensive.
    fn get_cost(&mut self, _annex: &mut Annex<'_>) -> RemoteResult<String> {
        Err(RemoteError::Unsupported)
    }

    /// `global` or `local`, as reported
    fn get_availability(&mut self, _annex: &mut Annex<'_>) -> RemoteResult<String> {
        Err(RemoteError::Unsupported)
    }

    /// Human-readable location of a key (public URL, ...). Must be fast.
    fn where_is(&mut self, _annex: &mut Annex<'_>, _key: &str) -> RemoteResult<Option<String>> {
        Err(RemoteError::Unsupported)
    }

    /// Settings the remote understands, name to description
    ///
    /// Names must not contain spaces.
    fn list_configs(&mut self, _annex: &mut Annex<'_>) -> RemoteResult<BTreeMap<String, String>> {
        Err(RemoteError::Unsupported)
    }

    /// Field/value pairs shown by `git annex info`
    fn get_info(&mut self, _annex: &mut Annex<'_>) -> RemoteResult<BTreeMap<String, String>> {
        Err(RemoteError::Unsupported)
    }

    /// The host reported a fatal error of its own
    fn error(&mut self, _annex: &mut Annex<'_>, _message: &str) {}

    /// Interactive setup run outside a session, before `initremote`
    fn setup(&mut self) -> RemoteResult<()> {
        Err(RemoteError::Unsupported)
    }

    // =========================================================================
    // Capabilities
    // =========================================================================

    /// URL claiming and checking, if supported
    fn urls(&mut self) -> Option<&mut dyn UrlRemote> {
        None
    }

    /// Export tree operations, if supported
    fn export(&mut self) -> Option<&mut dyn ExportRemote> {
        None
    }
}
