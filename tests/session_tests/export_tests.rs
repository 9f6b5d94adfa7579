//! Export Tests
//!
//! Tests for the EXPORT family and export scope handling.

use std::io::Cursor;
use std::path::Path;

use annex_remote::session::ExportScope;
use annex_remote::{
    Annex, AnnexError, ExportRemote, RemoteError, RemoteResult, Result, Session, SpecialRemote,
};

// =============================================================================
// Test Backend
// =============================================================================

#[derive(Default)]
struct ExportingRemote {
    calls: Vec<String>,
    supported: bool,
    fail_exports: bool,
    present: bool,
    rename_supported: bool,
}

impl ExportingRemote {
    fn new() -> Self {
        Self {
            supported: true,
            rename_supported: true,
            ..Self::default()
        }
    }

    fn outcome(&self) -> RemoteResult<()> {
        if self.fail_exports {
            Err(RemoteError::failed("export failed"))
        } else {
            Ok(())
        }
    }
}

impl SpecialRemote for ExportingRemote {
    fn init_remote(&mut self, _annex: &mut Annex<'_>) -> RemoteResult<()> {
        Ok(())
    }

    fn prepare(&mut self, _annex: &mut Annex<'_>) -> RemoteResult<()> {
        self.calls.push("prepare".to_string());
        Ok(())
    }

    fn transfer_store(&mut self, _annex: &mut Annex<'_>, _key: &str, _local_file: &Path)
        -> RemoteResult<()>
    {
        Ok(())
    }

    fn transfer_retrieve(&mut self, _annex: &mut Annex<'_>, _key: &str, _local_file: &Path)
        -> RemoteResult<()>
    {
        Ok(())
    }

    fn check_present(&mut self, _annex: &mut Annex<'_>, _key: &str) -> RemoteResult<bool> {
        Ok(false)
    }

    fn remove(&mut self, _annex: &mut Annex<'_>, _key: &str) -> RemoteResult<()> {
        Ok(())
    }

    fn export(&mut self) -> Option<&mut dyn ExportRemote> {
        Some(self)
    }
}

impl ExportRemote for ExportingRemote {
    fn export_supported(&mut self, _annex: &mut Annex<'_>) -> bool {
        self.supported
    }

    fn transfer_export_store(
        &mut self,
        _annex: &mut Annex<'_>,
        key: &str,
        local_file: &Path,
        remote_file: &str,
    ) -> RemoteResult<()> {
        self.calls.push(format!(
            "store {} {} -> {}",
            key,
            local_file.display(),
            remote_file
        ));
        self.outcome()
    }

    fn transfer_export_retrieve(
        &mut self,
        _annex: &mut Annex<'_>,
        key: &str,
        local_file: &Path,
        remote_file: &str,
    ) -> RemoteResult<()> {
        self.calls.push(format!(
            "retrieve {} {} <- {}",
            key,
            local_file.display(),
            remote_file
        ));
        self.outcome()
    }

    fn check_present_export(
        &mut self,
        _annex: &mut Annex<'_>,
        key: &str,
        remote_file: &str,
    ) -> RemoteResult<bool> {
        self.calls.push(format!("check {} {}", key, remote_file));
        self.outcome()?;
        Ok(self.present)
    }

    fn remove_export(&mut self, _annex: &mut Annex<'_>, key: &str, remote_file: &str)
        -> RemoteResult<()>
    {
        self.calls.push(format!("remove {} {}", key, remote_file));
        self.outcome()
    }

    fn remove_export_directory(
        &mut self,
        _annex: &mut Annex<'_>,
        remote_directory: &str,
    ) -> RemoteResult<()> {
        self.calls.push(format!("remove directory {}", remote_directory));
        self.outcome()
    }

    fn rename_export(
        &mut self,
        _annex: &mut Annex<'_>,
        key: &str,
        filename: &str,
        new_filename: &str,
    ) -> RemoteResult<()> {
        if !self.rename_supported {
            return Err(RemoteError::Unsupported);
        }
        self.calls.push(format!("rename {} {} -> {}", key, filename, new_filename));
        self.outcome()
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn converse(remote: ExportingRemote, input: &str) -> (Result<()>, ExportingRemote, Vec<String>) {
    let mut session = Session::new(remote, Cursor::new(input.as_bytes().to_vec()), Vec::new());
    let result = session.run();
    let (remote, _, writer) = session.into_parts();
    let lines = String::from_utf8(writer)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect();
    (result, remote, lines)
}

fn assert_fatal_after(lines: &[String], replies: usize) {
    assert_eq!(lines.len(), replies + 2, "unexpected output: {:?}", lines);
    assert!(lines[replies + 1].starts_with("ERROR "));
}

// =============================================================================
// Export Support
// =============================================================================

#[test]
fn test_export_supported() {
    let (_, _, lines) = converse(ExportingRemote::new(), "EXPORTSUPPORTED\n");
    assert_eq!(lines, vec!["VERSION 1", "EXPORTSUPPORTED-SUCCESS"]);

    let remote = ExportingRemote {
        supported: false,
        ..ExportingRemote::new()
    };
    let (_, _, lines) = converse(remote, "EXPORTSUPPORTED\n");
    assert_eq!(lines, vec!["VERSION 1", "EXPORTSUPPORTED-FAILURE"]);
}

// =============================================================================
// Scoped Requests
// =============================================================================

#[test]
fn test_transfer_export_store() {
    let input = "EXPORT Name\nTRANSFEREXPORT STORE Key File\n";
    let (result, remote, lines) = converse(ExportingRemote::new(), input);

    result.unwrap();
    assert_eq!(lines, vec!["VERSION 1", "TRANSFER-SUCCESS STORE Key"]);
    assert_eq!(remote.calls, vec!["store Key File -> Name"]);
}

#[test]
fn test_transfer_export_names_with_spaces() {
    let input = "EXPORT dir/Name with spaces\nTRANSFEREXPORT RETRIEVE Key local file\n";
    let (result, remote, lines) = converse(ExportingRemote::new(), input);

    result.unwrap();
    assert_eq!(lines, vec!["VERSION 1", "TRANSFER-SUCCESS RETRIEVE Key"]);
    assert_eq!(remote.calls, vec!["retrieve Key local file <- dir/Name with spaces"]);
}

#[test]
fn test_transfer_export_failure() {
    let remote = ExportingRemote {
        fail_exports: true,
        ..ExportingRemote::new()
    };
    let input = "EXPORT Name\nTRANSFEREXPORT STORE Key File\nPREPARE\n";
    let (result, _, lines) = converse(remote, input);

    result.unwrap();
    assert_eq!(
        lines,
        vec!["VERSION 1", "TRANSFER-FAILURE STORE Key export failed", "PREPARE-SUCCESS"]
    );
}

#[test]
fn test_check_present_export() {
    let remote = ExportingRemote {
        present: true,
        ..ExportingRemote::new()
    };
    let (_, remote, lines) = converse(remote, "EXPORT Name\nCHECKPRESENTEXPORT Key\n");
    assert_eq!(lines, vec!["VERSION 1", "CHECKPRESENT-SUCCESS Key"]);
    assert_eq!(remote.calls, vec!["check Key Name"]);

    let (_, _, lines) = converse(ExportingRemote::new(), "EXPORT Name\nCHECKPRESENTEXPORT Key\n");
    assert_eq!(lines, vec!["VERSION 1", "CHECKPRESENT-FAILURE Key"]);

    let remote = ExportingRemote {
        fail_exports: true,
        ..ExportingRemote::new()
    };
    let (_, _, lines) = converse(remote, "EXPORT Name\nCHECKPRESENTEXPORT Key\n");
    assert_eq!(lines, vec!["VERSION 1", "CHECKPRESENT-UNKNOWN Key export failed"]);
}

#[test]
fn test_remove_export() {
    let (_, remote, lines) = converse(ExportingRemote::new(), "EXPORT Name\nREMOVEEXPORT Key\n");
    assert_eq!(lines, vec!["VERSION 1", "REMOVE-SUCCESS Key"]);
    assert_eq!(remote.calls, vec!["remove Key Name"]);
}

#[test]
fn test_rename_export() {
    let input = "EXPORT Name\nRENAMEEXPORT Key New name\n";
    let (_, remote, lines) = converse(ExportingRemote::new(), input);
    assert_eq!(lines, vec!["VERSION 1", "RENAMEEXPORT-SUCCESS Key"]);
    assert_eq!(remote.calls, vec!["rename Key Name -> New name"]);

    let remote = ExportingRemote {
        fail_exports: true,
        ..ExportingRemote::new()
    };
    let (_, _, lines) = converse(remote, input);
    assert_eq!(lines, vec!["VERSION 1", "RENAMEEXPORT-FAILURE Key"]);

    let remote = ExportingRemote {
        rename_supported: false,
        ..ExportingRemote::new()
    };
    let (_, _, lines) = converse(remote, input);
    assert_eq!(lines, vec!["VERSION 1", "UNSUPPORTED-REQUEST"]);
}

#[test]
fn test_remove_export_directory_needs_no_scope() {
    let (result, remote, lines) =
        converse(ExportingRemote::new(), "REMOVEEXPORTDIRECTORY dir/with space\n");
    result.unwrap();
    assert_eq!(lines, vec!["VERSION 1", "REMOVEEXPORTDIRECTORY-SUCCESS"]);
    assert_eq!(remote.calls, vec!["remove directory dir/with space"]);

    let remote = ExportingRemote {
        fail_exports: true,
        ..ExportingRemote::new()
    };
    let (_, _, lines) = converse(remote, "REMOVEEXPORTDIRECTORY dir\n");
    assert_eq!(lines, vec!["VERSION 1", "REMOVEEXPORTDIRECTORY-FAILURE"]);
}

// =============================================================================
// Scope Violations
// =============================================================================

#[test]
fn test_transfer_export_without_export_is_fatal() {
    let (result, remote, lines) =
        converse(ExportingRemote::new(), "TRANSFEREXPORT STORE Key File\nPREPARE\n");
    assert!(matches!(result, Err(AnnexError::Protocol(_))));
    assert!(remote.calls.is_empty());
    assert_fatal_after(&lines, 0);
}

#[test]
fn test_unknown_transfer_export_direction_without_export_is_fatal() {
    let (result, remote, lines) =
        converse(ExportingRemote::new(), "TRANSFEREXPORT FOO Key File\nPREPARE\n");
    assert!(matches!(result, Err(AnnexError::Protocol(_))));
    assert!(remote.calls.is_empty());
    assert_fatal_after(&lines, 0);
}

#[test]
fn test_unknown_transfer_export_direction_in_scope_is_unsupported() {
    let input = "EXPORT Name\nTRANSFEREXPORT FOO Key File\nPREPARE\n";
    let (result, remote, lines) = converse(ExportingRemote::new(), input);
    result.unwrap();
    assert_eq!(remote.calls, vec!["prepare"]);
    assert_eq!(lines, vec!["VERSION 1", "UNSUPPORTED-REQUEST", "PREPARE-SUCCESS"]);
}

#[test]
fn test_scope_is_cleared_after_one_request() {
    let input = "EXPORT A\nTRANSFEREXPORT STORE k f\nCHECKPRESENTEXPORT k\nPREPARE\n";
    let (result, remote, lines) = converse(ExportingRemote::new(), input);

    assert!(matches!(result, Err(AnnexError::Protocol(_))));
    assert_eq!(remote.calls, vec!["store k f -> A"]);
    assert_fatal_after(&lines, 1);
}

#[test]
fn test_scope_is_cleared_by_unrelated_request() {
    let input = "EXPORT A\nPREPARE\nREMOVEEXPORT k\n";
    let (result, remote, lines) = converse(ExportingRemote::new(), input);

    assert!(matches!(result, Err(AnnexError::Protocol(_))));
    assert_eq!(remote.calls, vec!["prepare"]);
    assert_eq!(lines[1], "PREPARE-SUCCESS");
    assert_fatal_after(&lines, 1);
}

#[test]
fn test_scope_is_cleared_after_failed_request() {
    let remote = ExportingRemote {
        fail_exports: true,
        ..ExportingRemote::new()
    };
    let input = "EXPORT A\nREMOVEEXPORT k\nREMOVEEXPORT k\n";
    let (result, _, lines) = converse(remote, input);

    assert!(matches!(result, Err(AnnexError::Protocol(_))));
    assert_eq!(lines[1], "REMOVE-FAILURE k export failed");
    assert_fatal_after(&lines, 1);
}

#[test]
fn test_second_export_replaces_first() {
    let input = "EXPORT A\nEXPORT B\nREMOVEEXPORT k\n";
    let (result, remote, _) = converse(ExportingRemote::new(), input);
    result.unwrap();
    assert_eq!(remote.calls, vec!["remove k B"]);
}

#[test]
fn test_rename_export_without_scope_is_fatal() {
    let (result, _, lines) = converse(ExportingRemote::new(), "RENAMEEXPORT Key New\n");
    assert!(matches!(result, Err(AnnexError::Protocol(_))));
    assert_fatal_after(&lines, 0);
}

#[test]
fn test_export_scope_visible_between_requests() {
    let mut session = Session::new(ExportingRemote::new(), Cursor::new(Vec::new()), Vec::new());

    session.handle_line("EXPORT some name").unwrap();
    assert_eq!(
        session.dispatcher().export_scope(),
        &ExportScope::Active("some name".to_string())
    );

    session.handle_line("REMOVEEXPORT Key").unwrap();
    assert_eq!(session.dispatcher().export_scope(), &ExportScope::Inactive);
}

// =============================================================================
// Backends Without Export Support
// =============================================================================

struct PlainRemote;

impl SpecialRemote for PlainRemote {
    fn init_remote(&mut self, _annex: &mut Annex<'_>) -> RemoteResult<()> {
        Ok(())
    }

    fn prepare(&mut self, _annex: &mut Annex<'_>) -> RemoteResult<()> {
        Ok(())
    }

    fn transfer_store(&mut self, _annex: &mut Annex<'_>, _key: &str, _local_file: &Path)
        -> RemoteResult<()>
    {
        Ok(())
    }

    fn transfer_retrieve(&mut self, _annex: &mut Annex<'_>, _key: &str, _local_file: &Path)
        -> RemoteResult<()>
    {
        Ok(())
    }

    fn check_present(&mut self, _annex: &mut Annex<'_>, _key: &str) -> RemoteResult<bool> {
        Ok(true)
    }

    fn remove(&mut self, _annex: &mut Annex<'_>, _key: &str) -> RemoteResult<()> {
        Ok(())
    }
}

#[test]
fn test_scoped_request_without_capability_is_unsupported() {
    let mut session = Session::new(PlainRemote, Cursor::new(Vec::new()), Vec::new());
    session.handle_line("EXPORTSUPPORTED").unwrap();
    session.handle_line("EXPORT Name").unwrap();
    session.handle_line("TRANSFEREXPORT STORE Key File").unwrap();

    let (_, _, writer) = session.into_parts();
    assert_eq!(
        String::from_utf8(writer).unwrap(),
        "EXPORTSUPPORTED-FAILURE\nUNSUPPORTED-REQUEST\n"
    );
}
