//! Request Dispatcher
//!
//! Maps each request to its backend operation and turns the outcome into a
//! reply. Owns the per-session protocol state.
//!
//! ## Export Scope Transitions
//! ```text
//! ┌──────────────────────────────┬──────────────────────────┐
//! │ Request handled              │ Scope afterwards         │
//! ├──────────────────────────────┼──────────────────────────┤
//! │ EXPORT <name>                │ Active(name)             │
//! │ anything else, any outcome   │ Inactive                 │
//! └──────────────────────────────┴──────────────────────────┘
//! ```
//! TRANSFEREXPORT (whatever its sub-verb), CHECKPRESENTEXPORT, REMOVEEXPORT
//! and RENAMEEXPORT read the scope left by the request right before them and
//! fail with a protocol error when it is inactive.

use std::io::{BufRead, Write};
use std::path::Path;

use crate::annex::{Annex, Extensions};
use crate::error::{AnnexError, RemoteError, RemoteResult, Result};
use crate::protocol::{
    check_key, flatten_message, Availability, Direction, MultiUrl, Reply, Request,
};
use crate::remote::{SpecialRemote, UrlCheck};

/// Export name set by the last request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ExportScope {
    #[default]
    Inactive,
    Active(String),
}

/// Backend outcome with structural errors already split off
enum Outcome<T> {
    Done(T),
    Failed(String),
    Unsupported,
}

fn outcome<T>(result: RemoteResult<T>) -> Result<Outcome<T>> {
    match result {
        Ok(value) => Ok(Outcome::Done(value)),
        Err(RemoteError::Failed(message)) => Ok(Outcome::Failed(flatten_message(&message))),
        Err(RemoteError::Unsupported) => Ok(Outcome::Unsupported),
        Err(RemoteError::Fatal(err)) => Err(err),
    }
}

/// Protocol state machine for one session
#[derive(Debug, Default)]
pub struct Dispatcher {
    /// Extensions announced by the host
    extensions: Extensions,

    /// Cleared after every request except EXPORT
    export_scope: ExportScope,

    /// Extensions listed in our EXTENSIONS reply
    advertised: Vec<String>,
}

impl Dispatcher {
    /// Create a dispatcher that advertises `advertised` in its EXTENSIONS reply
    pub fn new(advertised: Vec<String>) -> Self {
        Self {
            advertised,
            ..Self::default()
        }
    }

    pub fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    pub fn export_scope(&self) -> &ExportScope {
        &self.export_scope
    }

    /// Handle one request
    ///
    /// Returns the reply to send, if the request has one. Business failures
    /// and unsupported operations come back as replies; only structural
    /// errors are returned as `Err`.
    pub fn dispatch<B: SpecialRemote + ?Sized>(
        &mut self,
        remote: &mut B,
        reader: &mut dyn BufRead,
        writer: &mut dyn Write,
        request: Request,
    ) -> Result<Option<Reply>> {
        let scope = std::mem::take(&mut self.export_scope);

        match request {
            Request::Export { name } => {
                tracing::debug!("Export scope set to '{}'", name);
                self.export_scope = ExportScope::Active(name);
                Ok(None)
            }
            Request::Extensions { names } => {
                tracing::debug!("Host announced extensions: {:?}", names);
                self.extensions.announce(names);
                Ok(Some(Reply::Extensions {
                    names: self.advertised.clone(),
                }))
            }
            request => {
                let export_name = if request.is_export_scoped() {
                    require_scope(&scope, request.verb())?
                } else {
                    ""
                };
                let mut annex = Annex::new(reader, writer, &self.extensions);
                execute(remote, &mut annex, export_name, request)
            }
        }
    }
}

fn require_scope<'s>(scope: &'s ExportScope, verb: &str) -> Result<&'s str> {
    match scope {
        ExportScope::Active(name) => Ok(name),
        ExportScope::Inactive => Err(AnnexError::Protocol(format!(
            "Export request {} without prior EXPORT",
            verb
        ))),
    }
}

/// `export_name` is empty unless the request is export-scoped
fn execute<B: SpecialRemote + ?Sized>(
    remote: &mut B,
    annex: &mut Annex<'_>,
    export_name: &str,
    request: Request,
) -> Result<Option<Reply>> {
    let reply = match request {
        // ---------------------------------------------------------------------
        // Lifecycle
        // ---------------------------------------------------------------------
        Request::InitRemote => match outcome(remote.init_remote(annex))? {
            Outcome::Done(()) => Reply::InitRemoteSuccess,
            Outcome::Failed(message) => Reply::InitRemoteFailure { message },
            Outcome::Unsupported => Reply::UnsupportedRequest,
        },
        Request::Prepare => match outcome(remote.prepare(annex))? {
            Outcome::Done(()) => Reply::PrepareSuccess,
            Outcome::Failed(message) => Reply::PrepareFailure { message },
            Outcome::Unsupported => Reply::UnsupportedRequest,
        },

        // ---------------------------------------------------------------------
        // Keys
        // ---------------------------------------------------------------------
        Request::Transfer { direction, key, file } => {
            check_key(&key)?;
            let local_file = Path::new(&file);
            let result = match direction {
                Direction::Store => remote.transfer_store(annex, &key, local_file),
                Direction::Retrieve => remote.transfer_retrieve(annex, &key, local_file),
            };
            transfer_reply(direction, key, outcome(result)?)
        }
        Request::CheckPresent { key } => {
            check_key(&key)?;
            let result = remote.check_present(annex, &key);
            check_present_reply(key, outcome(result)?)
        }
        Request::Remove { key } => {
            check_key(&key)?;
            let result = remote.remove(annex, &key);
            remove_reply(key, outcome(result)?)
        }

        // ---------------------------------------------------------------------
        // Remote Properties
        // ---------------------------------------------------------------------
        Request::GetCost => match outcome(remote.get_cost(annex))? {
            Outcome::Done(raw) => Reply::Cost(parse_cost(&raw)?),
            Outcome::Failed(message) => return Err(backend_failure("GETCOST", message)),
            Outcome::Unsupported => Reply::UnsupportedRequest,
        },
        Request::GetAvailability => match outcome(remote.get_availability(annex))? {
            Outcome::Done(raw) => {
                Reply::Availability(raw.parse::<Availability>().map_err(AnnexError::InvalidValue)?)
            }
            Outcome::Failed(message) => return Err(backend_failure("GETAVAILABILITY", message)),
            Outcome::Unsupported => Reply::UnsupportedRequest,
        },
        Request::WhereIs { key } => {
            check_key(&key)?;
            match outcome(remote.where_is(annex, &key))? {
                Outcome::Done(Some(text)) if !text.is_empty() => Reply::WhereIsSuccess {
                    text: flatten_message(&text),
                },
                Outcome::Done(_) | Outcome::Failed(_) => Reply::WhereIsFailure,
                Outcome::Unsupported => Reply::UnsupportedRequest,
            }
        }
        Request::ListConfigs => match outcome(remote.list_configs(annex))? {
            Outcome::Done(configs) => Reply::Configs(
                configs
                    .into_iter()
                    .map(|(name, description)| (name, flatten_message(&description)))
                    .collect(),
            ),
            Outcome::Failed(message) => return Err(backend_failure("LISTCONFIGS", message)),
            Outcome::Unsupported => Reply::UnsupportedRequest,
        },
        Request::GetInfo => match outcome(remote.get_info(annex))? {
            Outcome::Done(info) => Reply::Info(
                info.into_iter()
                    .map(|(field, value)| (flatten_message(&field), flatten_message(&value)))
                    .collect(),
            ),
            Outcome::Failed(message) => return Err(backend_failure("GETINFO", message)),
            Outcome::Unsupported => Reply::UnsupportedRequest,
        },

        // ---------------------------------------------------------------------
        // URLs
        // ---------------------------------------------------------------------
        Request::ClaimUrl { url } => match remote.urls() {
            None => Reply::UnsupportedRequest,
            Some(urls) => match outcome(urls.claim_url(annex, &url))? {
                Outcome::Done(true) => Reply::ClaimUrlSuccess,
                Outcome::Done(false) | Outcome::Failed(_) => Reply::ClaimUrlFailure,
                Outcome::Unsupported => Reply::UnsupportedRequest,
            },
        },
        Request::CheckUrl { url } => match remote.urls() {
            None => Reply::UnsupportedRequest,
            Some(urls) => match outcome(urls.check_url(annex, &url))? {
                Outcome::Done(check) => check_url_reply(check)?,
                Outcome::Failed(_) => Reply::CheckUrlFailure,
                Outcome::Unsupported => Reply::UnsupportedRequest,
            },
        },

        // ---------------------------------------------------------------------
        // Export Trees
        // ---------------------------------------------------------------------
        Request::ExportSupported => {
            let supported = match remote.export() {
                Some(export) => export.export_supported(annex),
                None => false,
            };
            if supported {
                Reply::ExportSupportedSuccess
            } else {
                Reply::ExportSupportedFailure
            }
        }
        Request::TransferExport { direction, key, file } => {
            check_key(&key)?;
            let Some(export) = remote.export() else {
                return Ok(Some(Reply::UnsupportedRequest));
            };
            let local_file = Path::new(&file);
            let result = match direction {
                Direction::Store => export.transfer_export_store(annex, &key, local_file, export_name),
                Direction::Retrieve => {
                    export.transfer_export_retrieve(annex, &key, local_file, export_name)
                }
            };
            transfer_reply(direction, key, outcome(result)?)
        }
        Request::UnknownTransferExport { direction, .. } => {
            tracing::debug!("Unsupported TRANSFEREXPORT direction '{}'", direction);
            Reply::UnsupportedRequest
        }
        Request::CheckPresentExport { key } => {
            check_key(&key)?;
            let Some(export) = remote.export() else {
                return Ok(Some(Reply::UnsupportedRequest));
            };
            let result = export.check_present_export(annex, &key, export_name);
            check_present_reply(key, outcome(result)?)
        }
        Request::RemoveExport { key } => {
            check_key(&key)?;
            let Some(export) = remote.export() else {
                return Ok(Some(Reply::UnsupportedRequest));
            };
            let result = export.remove_export(annex, &key, export_name);
            remove_reply(key, outcome(result)?)
        }
        Request::RenameExport { key, new_name } => {
            check_key(&key)?;
            let Some(export) = remote.export() else {
                return Ok(Some(Reply::UnsupportedRequest));
            };
            match outcome(export.rename_export(annex, &key, export_name, &new_name))? {
                Outcome::Done(()) => Reply::RenameExportSuccess { key },
                Outcome::Failed(_) => Reply::RenameExportFailure { key },
                Outcome::Unsupported => Reply::UnsupportedRequest,
            }
        }
        Request::RemoveExportDirectory { directory } => match remote.export() {
            None => Reply::UnsupportedRequest,
            Some(export) => match outcome(export.remove_export_directory(annex, &directory))? {
                Outcome::Done(()) => Reply::RemoveExportDirectorySuccess,
                Outcome::Failed(_) => Reply::RemoveExportDirectoryFailure,
                Outcome::Unsupported => Reply::UnsupportedRequest,
            },
        },

        // ---------------------------------------------------------------------
        // Host Reports and Unknown Verbs
        // ---------------------------------------------------------------------
        Request::Error { message } => {
            tracing::warn!("Host reported error: {}", message);
            remote.error(annex, &message);
            return Ok(None);
        }
        Request::Unknown { verb } => {
            tracing::debug!("Unsupported request '{}'", verb);
            Reply::UnsupportedRequest
        }

        // Session state, applied by Dispatcher::dispatch
        Request::Export { .. } | Request::Extensions { .. } => return Ok(None),
    };

    Ok(Some(reply))
}

// =============================================================================
// Reply Builders
// =============================================================================

fn transfer_reply(direction: Direction, key: String, outcome: Outcome<()>) -> Reply {
    match outcome {
        Outcome::Done(()) => Reply::TransferSuccess { direction, key },
        Outcome::Failed(message) => Reply::TransferFailure {
            direction,
            key,
            message,
        },
        Outcome::Unsupported => Reply::UnsupportedRequest,
    }
}

fn check_present_reply(key: String, outcome: Outcome<bool>) -> Reply {
    match outcome {
        Outcome::Done(present) => Reply::check_present(key, present),
        Outcome::Failed(message) => Reply::CheckPresentUnknown { key, message },
        Outcome::Unsupported => Reply::UnsupportedRequest,
    }
}

fn remove_reply(key: String, outcome: Outcome<()>) -> Reply {
    match outcome {
        Outcome::Done(()) => Reply::RemoveSuccess { key },
        Outcome::Failed(message) => Reply::RemoveFailure { key, message },
        Outcome::Unsupported => Reply::UnsupportedRequest,
    }
}

/// Render a URL check
///
/// A single item without its own URL collapses to `CHECKURL-CONTENTS`.
/// An item that carries a URL always uses `CHECKURL-MULTI`, even alone.
fn check_url_reply(check: UrlCheck) -> Result<Reply> {
    let items = match check {
        UrlCheck::Unavailable => return Ok(Reply::CheckUrlFailure),
        UrlCheck::Available => {
            return Ok(Reply::CheckUrlContents {
                size: None,
                filename: None,
            })
        }
        UrlCheck::Items(items) => items,
    };

    if items.is_empty() {
        return Ok(Reply::CheckUrlFailure);
    }
    if let [item] = items.as_slice() {
        if item.url.is_none() {
            return Ok(Reply::CheckUrlContents {
                size: item.size,
                filename: item.filename.clone().filter(|name| !name.is_empty()),
            });
        }
    }

    items
        .into_iter()
        .map(|item| {
            let url = item.url.ok_or_else(|| {
                AnnexError::InvalidValue(
                    "Url must be present when specifying multiple values".to_string(),
                )
            })?;
            Ok(MultiUrl {
                url,
                size: item.size,
                filename: item.filename.unwrap_or_default(),
            })
        })
        .collect::<Result<Vec<_>>>()
        .map(Reply::CheckUrlMulti)
}

fn parse_cost(raw: &str) -> Result<i64> {
    raw.trim().parse::<i64>().map_err(|_| {
        AnnexError::InvalidValue(format!("Cost must be an integer, got '{}'", raw))
    })
}

fn backend_failure(verb: &str, message: String) -> AnnexError {
    AnnexError::Backend(format!("{} failed: {}", verb, message))
}
