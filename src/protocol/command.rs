//! Request definitions
//!
//! Represents requests sent by the host to the special remote.

use std::fmt;
use std::str::FromStr;

/// Direction of a `TRANSFER` / `TRANSFEREXPORT` request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Store,
    Retrieve,
}

impl Direction {
    /// Wire token for this direction
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Store => "STORE",
            Direction::Retrieve => "RETRIEVE",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = ();

    /// Sub-verbs are matched exactly; only the request verb is case-insensitive
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "STORE" => Ok(Direction::Store),
            "RETRIEVE" => Ok(Direction::Retrieve),
            _ => Err(()),
        }
    }
}

/// A parsed request from the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    // Lifecycle
    InitRemote,
    Prepare,

    // Extension negotiation
    Extensions { names: Vec<String> },

    // Key transfer and presence
    Transfer { direction: Direction, key: String, file: String },
    CheckPresent { key: String },
    Remove { key: String },

    // Remote properties
    GetCost,
    GetAvailability,
    WhereIs { key: String },
    ListConfigs,
    GetInfo,

    // URLs
    ClaimUrl { url: String },
    CheckUrl { url: String },

    // Export trees
    ExportSupported,
    Export { name: String },
    TransferExport { direction: Direction, key: String, file: String },
    /// `TRANSFEREXPORT` with a sub-verb this side does not recognise
    UnknownTransferExport { direction: String, key: String, file: String },
    CheckPresentExport { key: String },
    RemoveExport { key: String },
    RemoveExportDirectory { directory: String },
    RenameExport { key: String, new_name: String },

    /// The host reports a fatal condition on its side
    Error { message: String },

    /// A verb (or `TRANSFER` sub-verb) this side does not recognise
    Unknown { verb: String },
}

impl Request {
    /// Wire verb of this request
    pub fn verb(&self) -> &str {
        match self {
            Request::InitRemote => "INITREMOTE",
            Request::Prepare => "PREPARE",
            Request::Extensions { .. } => "EXTENSIONS",
            Request::Transfer { .. } => "TRANSFER",
            Request::CheckPresent { .. } => "CHECKPRESENT",
            Request::Remove { .. } => "REMOVE",
            Request::GetCost => "GETCOST",
            Request::GetAvailability => "GETAVAILABILITY",
            Request::WhereIs { .. } => "WHEREIS",
            Request::ListConfigs => "LISTCONFIGS",
            Request::GetInfo => "GETINFO",
            Request::ClaimUrl { .. } => "CLAIMURL",
            Request::CheckUrl { .. } => "CHECKURL",
            Request::ExportSupported => "EXPORTSUPPORTED",
            Request::Export { .. } => "EXPORT",
            Request::TransferExport { .. } | Request::UnknownTransferExport { .. } => {
                "TRANSFEREXPORT"
            }
            Request::CheckPresentExport { .. } => "CHECKPRESENTEXPORT",
            Request::RemoveExport { .. } => "REMOVEEXPORT",
            Request::RemoveExportDirectory { .. } => "REMOVEEXPORTDIRECTORY",
            Request::RenameExport { .. } => "RENAMEEXPORT",
            Request::Error { .. } => "ERROR",
            Request::Unknown { verb } => verb,
        }
    }

    /// Whether this request needs a preceding `EXPORT`
    pub fn is_export_scoped(&self) -> bool {
        matches!(
            self,
            Request::TransferExport { .. }
                | Request::UnknownTransferExport { .. }
                | Request::CheckPresentExport { .. }
                | Request::RemoveExport { .. }
                | Request::RenameExport { .. }
        )
    }
}
