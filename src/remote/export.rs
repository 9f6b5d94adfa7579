//! Export tree capability

use std::path::Path;

use crate::annex::Annex;
use crate::error::{RemoteError, RemoteResult};

/// Backends that can store a tree of files under their own names
///
/// `remote_file` is a relative path chosen by the host. It may contain
/// path separators and spaces.
pub trait ExportRemote {
    /// Whether exports are actually usable with the current setup
    fn export_supported(&mut self, _annex: &mut Annex<'_>) -> bool {
        true
    }

    /// Store `local_file` at `remote_file`
    fn transfer_export_store(
        &mut self,
        annex: &mut Annex<'_>,
        key: &str,
        local_file: &Path,
        remote_file: &str,
    ) -> RemoteResult<()>;

    /// Fetch `remote_file` into `local_file`
    fn transfer_export_retrieve(
        &mut self,
        annex: &mut Annex<'_>,
        key: &str,
        local_file: &Path,
        remote_file: &str,
    ) -> RemoteResult<()>;

    /// Whether `remote_file` is present
    fn check_present_export(
        &mut self,
        annex: &mut Annex<'_>,
        key: &str,
        remote_file: &str,
    ) -> RemoteResult<bool>;

    /// Remove `remote_file`
    fn remove_export(&mut self, annex: &mut Annex<'_>, key: &str, remote_file: &str)
        -> RemoteResult<()>;

    /// Remove an exported directory, which may still hold files
    fn remove_export_directory(
        &mut self,
        _annex: &mut Annex<'_>,
        _remote_directory: &str,
    ) -> RemoteResult<()> {
        Err(RemoteError::Unsupported)
    }

    /// Move `filename` to `new_filename`
    fn rename_export(
        &mut self,
        _annex: &mut Annex<'_>,
        _key: &str,
        _filename: &str,
        _new_filename: &str,
    ) -> RemoteResult<()> {
        Err(RemoteError::Unsupported)
    }
}
