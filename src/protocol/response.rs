//! Reply definitions
//!
//! Represents replies sent by the special remote to the host.

use std::fmt;
use std::str::FromStr;

use super::Direction;

/// Whether a remote is reachable only locally or from anywhere
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    Global,
    Local,
}

impl Availability {
    /// Wire token used in `AVAILABILITY <token>`
    pub fn as_str(&self) -> &'static str {
        match self {
            Availability::Global => "GLOBAL",
            Availability::Local => "LOCAL",
        }
    }
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Availability {
    type Err = String;

    /// Accepts exactly `global` or `local`, the values a backend reports
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "global" => Ok(Availability::Global),
            "local" => Ok(Availability::Local),
            other => Err(format!(
                "Availability must be either 'global' or 'local', got '{}'",
                other
            )),
        }
    }
}

/// One entry of a `CHECKURL-MULTI` reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiUrl {
    pub url: String,
    pub size: Option<u64>,
    /// Empty when the backend suggested no filename
    pub filename: String,
}

/// A reply to send to the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    InitRemoteSuccess,
    InitRemoteFailure { message: String },

    PrepareSuccess,
    PrepareFailure { message: String },

    /// Extensions this side supports
    Extensions { names: Vec<String> },

    TransferSuccess { direction: Direction, key: String },
    TransferFailure { direction: Direction, key: String, message: String },

    CheckPresentSuccess { key: String },
    CheckPresentFailure { key: String },
    CheckPresentUnknown { key: String, message: String },

    RemoveSuccess { key: String },
    RemoveFailure { key: String, message: String },

    Cost(i64),
    Availability(Availability),

    WhereIsSuccess { text: String },
    WhereIsFailure,

    /// `CONFIG <name> <description>` lines followed by `CONFIGEND`
    Configs(Vec<(String, String)>),

    /// `INFOFIELD` / `INFOVALUE` pairs followed by `INFOEND`
    Info(Vec<(String, String)>),

    ClaimUrlSuccess,
    ClaimUrlFailure,

    CheckUrlContents { size: Option<u64>, filename: Option<String> },
    CheckUrlMulti(Vec<MultiUrl>),
    CheckUrlFailure,

    ExportSupportedSuccess,
    ExportSupportedFailure,

    RemoveExportDirectorySuccess,
    RemoveExportDirectoryFailure,

    RenameExportSuccess { key: String },
    RenameExportFailure { key: String },

    UnsupportedRequest,
}

impl Reply {
    /// Create a CHECKPRESENT reply from a presence result
    pub fn check_present(key: impl Into<String>, present: bool) -> Self {
        let key = key.into();
        if present {
            Reply::CheckPresentSuccess { key }
        } else {
            Reply::CheckPresentFailure { key }
        }
    }
}
