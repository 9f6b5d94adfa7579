//! Protocol codec
//!
//! Tokenizing, formatting and line I/O for the wire protocol.
//!
//! ## Line Format
//! ```text
//! ┌────────┬───┬─────────┬───┬─────────┬───┬──────────────────────────┐
//! │  VERB  │ ␠ │ field 1 │ ␠ │ field 2 │ ␠ │ trailing (may hold ␠)    │ \n
//! └────────┴───┴─────────┴───┴─────────┴───┴──────────────────────────┘
//! ```
//!
//! - Positional fields never contain a space; they may be empty, in which
//!   case the separators around them are still written.
//! - Only the trailing field may contain spaces. An empty trailing field is
//!   left off together with its separator.
//! - Tabs are ordinary characters. Line breaks are never allowed in a field.

use std::io::{BufRead, Write};

use crate::error::{AnnexError, Result};
use super::{Availability, Direction, MultiUrl, Reply, Request};

/// Field separator
pub const SEPARATOR: char = ' ';

/// Size token used when a size is not known
pub const UNKNOWN_SIZE: &str = "UNKNOWN";

// =============================================================================
// Tokenizing
// =============================================================================

/// Split a line into its verb and the remainder after the first separator
pub fn split_verb(line: &str) -> (&str, Option<&str>) {
    match line.split_once(SEPARATOR) {
        Some((verb, rest)) => (verb, Some(rest)),
        None => (line, None),
    }
}

/// Split the remainder of a line into exactly `count` parameters
///
/// The last parameter absorbs everything left, spaces included.
pub fn split_params<'a>(verb: &str, rest: Option<&'a str>, count: usize) -> Result<Vec<&'a str>> {
    let rest = rest.ok_or_else(|| {
        AnnexError::Syntax(format!("{} expects {} parameter(s), got none", verb, count))
    })?;

    let params: Vec<&str> = rest.splitn(count, SEPARATOR).collect();
    if params.len() < count {
        return Err(AnnexError::Syntax(format!(
            "{} expects {} parameter(s), got {}",
            verb,
            count,
            params.len()
        )));
    }
    Ok(params)
}

/// Split `count` positional parameters plus an optional trailing field
fn split_params_with_trailing<'a>(
    verb: &str,
    rest: Option<&'a str>,
    count: usize,
) -> Result<(Vec<&'a str>, &'a str)> {
    let rest = rest.unwrap_or("");
    let mut parts: Vec<&str> = rest.splitn(count + 1, SEPARATOR).collect();
    if rest.is_empty() || parts.len() < count {
        return Err(AnnexError::Syntax(format!(
            "{} expects at least {} parameter(s)",
            verb, count
        )));
    }
    let trailing = if parts.len() > count { parts.pop().unwrap_or("") } else { "" };
    Ok((parts, trailing))
}

/// Reject parameters on a verb that takes none
fn expect_no_params(verb: &str, rest: Option<&str>) -> Result<()> {
    match rest {
        None | Some("") => Ok(()),
        Some(extra) => Err(AnnexError::Syntax(format!(
            "{} takes no parameters, got '{}'",
            verb, extra
        ))),
    }
}

// =============================================================================
// Field Validation
// =============================================================================

/// Check that a key is non-empty and free of whitespace
pub fn check_key(key: &str) -> Result<()> {
    if key.is_empty() || key.chars().any(char::is_whitespace) {
        return Err(AnnexError::InvalidValue(format!(
            "Invalid key '{}': key must be non-empty and contain no whitespace",
            key
        )));
    }
    Ok(())
}

/// Check that a single-valued field holds no separator and no line break
pub fn check_field(what: &str, value: &str) -> Result<()> {
    if value.contains(SEPARATOR) {
        return Err(AnnexError::InvalidValue(format!(
            "{} must not contain spaces: '{}'",
            what, value
        )));
    }
    check_single_line(what, value)
}

fn check_single_line(what: &str, value: &str) -> Result<()> {
    if value.contains(['\n', '\r']) {
        return Err(AnnexError::InvalidValue(format!(
            "{} must not contain line breaks",
            what
        )));
    }
    Ok(())
}

/// Fold line breaks in a free-text message into spaces
pub fn flatten_message(message: &str) -> String {
    message
        .split(['\r', '\n'])
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

// =============================================================================
// Line Builder
// =============================================================================

/// An outgoing protocol line under construction
#[derive(Debug, Clone)]
pub struct Line {
    verb: String,
    fields: Vec<String>,
    trailing: Option<String>,
}

impl Line {
    /// Start a line with the given verb
    pub fn new(verb: impl Into<String>) -> Self {
        Self {
            verb: verb.into(),
            fields: Vec::new(),
            trailing: None,
        }
    }

    /// Append a positional field (written even when empty)
    pub fn field(mut self, value: impl Into<String>) -> Self {
        self.fields.push(value.into());
        self
    }

    /// Set the trailing field (may contain spaces, omitted when empty)
    pub fn trailing(mut self, value: impl Into<String>) -> Self {
        self.trailing = Some(value.into());
        self
    }

    /// Render the line without its terminator
    pub fn encode(&self) -> Result<String> {
        let mut line = self.verb.clone();

        for field in &self.fields {
            check_field(&format!("{} parameter", self.verb), field)?;
            line.push(SEPARATOR);
            line.push_str(field);
        }

        if let Some(trailing) = &self.trailing {
            check_single_line(&format!("{} parameter", self.verb), trailing)?;
            if !trailing.is_empty() {
                line.push(SEPARATOR);
                line.push_str(trailing);
            }
        }

        Ok(line)
    }
}

// =============================================================================
// Request Encoding/Decoding
// =============================================================================

/// Decode a request line from the host
///
/// Verbs are case-insensitive. Unrecognised verbs decode to
/// [`Request::Unknown`]; wrong arity is a syntax error.
pub fn decode_request(line: &str) -> Result<Request> {
    let (verb, rest) = split_verb(line);
    let upper = verb.to_ascii_uppercase();
    let verb = upper.as_str();

    let request = match verb {
        "INITREMOTE" => {
            expect_no_params(verb, rest)?;
            Request::InitRemote
        }
        "PREPARE" => {
            expect_no_params(verb, rest)?;
            Request::Prepare
        }
        "GETCOST" => {
            expect_no_params(verb, rest)?;
            Request::GetCost
        }
        "GETAVAILABILITY" => {
            expect_no_params(verb, rest)?;
            Request::GetAvailability
        }
        "EXPORTSUPPORTED" => {
            expect_no_params(verb, rest)?;
            Request::ExportSupported
        }
        "GETINFO" => {
            expect_no_params(verb, rest)?;
            Request::GetInfo
        }
        "LISTCONFIGS" => {
            expect_no_params(verb, rest)?;
            Request::ListConfigs
        }
        "EXTENSIONS" => {
            let params = split_params(verb, rest, 1)?;
            let names = params[0]
                .split(SEPARATOR)
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .collect();
            Request::Extensions { names }
        }
        "TRANSFER" | "TRANSFEREXPORT" => {
            let params = split_params(verb, rest, 3)?;
            match params[0].parse::<Direction>() {
                Ok(direction) if verb == "TRANSFER" => Request::Transfer {
                    direction,
                    key: params[1].to_string(),
                    file: params[2].to_string(),
                },
                Ok(direction) => Request::TransferExport {
                    direction,
                    key: params[1].to_string(),
                    file: params[2].to_string(),
                },
                // Still export-scoped, so the scope check runs first
                Err(()) if verb == "TRANSFEREXPORT" => Request::UnknownTransferExport {
                    direction: params[0].to_string(),
                    key: params[1].to_string(),
                    file: params[2].to_string(),
                },
                Err(()) => Request::Unknown {
                    verb: format!("{} {}", verb, params[0]),
                },
            }
        }
        "CHECKPRESENT" => Request::CheckPresent { key: key_param(verb, rest)? },
        "REMOVE" => Request::Remove { key: key_param(verb, rest)? },
        "WHEREIS" => Request::WhereIs { key: key_param(verb, rest)? },
        "CLAIMURL" => Request::ClaimUrl { url: single_param(verb, rest)? },
        "CHECKURL" => Request::CheckUrl { url: single_param(verb, rest)? },
        "EXPORT" => Request::Export { name: single_param(verb, rest)? },
        "CHECKPRESENTEXPORT" => Request::CheckPresentExport { key: key_param(verb, rest)? },
        "REMOVEEXPORT" => Request::RemoveExport { key: key_param(verb, rest)? },
        "REMOVEEXPORTDIRECTORY" => Request::RemoveExportDirectory {
            directory: single_param(verb, rest)?,
        },
        "RENAMEEXPORT" => {
            let params = split_params(verb, rest, 2)?;
            Request::RenameExport {
                key: params[0].to_string(),
                new_name: params[1].to_string(),
            }
        }
        "ERROR" => Request::Error { message: single_param(verb, rest)? },
        _ => Request::Unknown { verb: upper.clone() },
    };

    Ok(request)
}

fn single_param(verb: &str, rest: Option<&str>) -> Result<String> {
    let params = split_params(verb, rest, 1)?;
    Ok(params[0].to_string())
}

/// A lone key parameter; trailing padding from the host is dropped
fn key_param(verb: &str, rest: Option<&str>) -> Result<String> {
    let key = single_param(verb, rest)?;
    Ok(key.trim_end_matches([' ', '\t']).to_string())
}

/// Encode a request as the host would send it
pub fn encode_request(request: &Request) -> Result<String> {
    let verb = request.verb();
    let line = match request {
        Request::InitRemote
        | Request::Prepare
        | Request::GetCost
        | Request::GetAvailability
        | Request::ExportSupported
        | Request::GetInfo
        | Request::ListConfigs
        | Request::Unknown { .. } => Line::new(verb),
        Request::Extensions { names } => Line::new(verb).trailing(names.join(" ")),
        Request::Transfer { direction, key, file }
        | Request::TransferExport { direction, key, file } => Line::new(verb)
            .field(direction.as_str())
            .field(key.as_str())
            .trailing(file.as_str()),
        Request::UnknownTransferExport { direction, key, file } => Line::new(verb)
            .field(direction.as_str())
            .field(key.as_str())
            .trailing(file.as_str()),
        Request::CheckPresent { key }
        | Request::Remove { key }
        | Request::WhereIs { key }
        | Request::CheckPresentExport { key }
        | Request::RemoveExport { key } => Line::new(verb).field(key.as_str()),
        Request::ClaimUrl { url } | Request::CheckUrl { url } => {
            Line::new(verb).field(url.as_str())
        }
        Request::Export { name } => Line::new(verb).trailing(name.as_str()),
        Request::RemoveExportDirectory { directory } => {
            Line::new(verb).trailing(directory.as_str())
        }
        Request::RenameExport { key, new_name } => {
            Line::new(verb).field(key.as_str()).trailing(new_name.as_str())
        }
        Request::Error { message } => Line::new(verb).trailing(message.as_str()),
    };
    line.encode()
}

// =============================================================================
// Reply Encoding/Decoding
// =============================================================================

fn size_token(size: Option<u64>) -> String {
    size.map(|s| s.to_string())
        .unwrap_or_else(|| UNKNOWN_SIZE.to_string())
}

fn parse_size(token: &str) -> Result<Option<u64>> {
    if token == UNKNOWN_SIZE {
        return Ok(None);
    }
    token
        .parse::<u64>()
        .map(Some)
        .map_err(|_| AnnexError::InvalidValue(format!("Invalid size '{}'", token)))
}

fn parse_direction(token: &str) -> Result<Direction> {
    token
        .parse::<Direction>()
        .map_err(|_| AnnexError::Syntax(format!("Unknown transfer direction '{}'", token)))
}

/// Encode a reply into one or more lines
///
/// All validation happens here, so a reply that fails to encode never
/// leaves a partial line on the wire.
pub fn encode_reply(reply: &Reply) -> Result<Vec<String>> {
    let line = match reply {
        Reply::InitRemoteSuccess => Line::new("INITREMOTE-SUCCESS"),
        Reply::InitRemoteFailure { message } => {
            Line::new("INITREMOTE-FAILURE").trailing(message.as_str())
        }
        Reply::PrepareSuccess => Line::new("PREPARE-SUCCESS"),
        Reply::PrepareFailure { message } => Line::new("PREPARE-FAILURE").trailing(message.as_str()),
        Reply::Extensions { names } => names
            .iter()
            .fold(Line::new("EXTENSIONS"), |line, name| line.field(name.as_str())),
        Reply::TransferSuccess { direction, key } => Line::new("TRANSFER-SUCCESS")
            .field(direction.as_str())
            .field(key.as_str()),
        Reply::TransferFailure { direction, key, message } => Line::new("TRANSFER-FAILURE")
            .field(direction.as_str())
            .field(key.as_str())
            .trailing(message.as_str()),
        Reply::CheckPresentSuccess { key } => Line::new("CHECKPRESENT-SUCCESS").field(key.as_str()),
        Reply::CheckPresentFailure { key } => Line::new("CHECKPRESENT-FAILURE").field(key.as_str()),
        Reply::CheckPresentUnknown { key, message } => Line::new("CHECKPRESENT-UNKNOWN")
            .field(key.as_str())
            .trailing(message.as_str()),
        Reply::RemoveSuccess { key } => Line::new("REMOVE-SUCCESS").field(key.as_str()),
        Reply::RemoveFailure { key, message } => Line::new("REMOVE-FAILURE")
            .field(key.as_str())
            .trailing(message.as_str()),
        Reply::Cost(cost) => Line::new("COST").field(cost.to_string()),
        Reply::Availability(availability) => Line::new("AVAILABILITY").field(availability.as_str()),
        Reply::WhereIsSuccess { text } => Line::new("WHEREIS-SUCCESS").trailing(text.as_str()),
        Reply::WhereIsFailure => Line::new("WHEREIS-FAILURE"),
        Reply::Configs(entries) => return encode_configs(entries),
        Reply::Info(entries) => return encode_info(entries),
        Reply::ClaimUrlSuccess => Line::new("CLAIMURL-SUCCESS"),
        Reply::ClaimUrlFailure => Line::new("CLAIMURL-FAILURE"),
        Reply::CheckUrlContents { size, filename } => Line::new("CHECKURL-CONTENTS")
            .field(size_token(*size))
            .trailing(filename.clone().unwrap_or_default()),
        Reply::CheckUrlMulti(items) => encode_multi(items)?,
        Reply::CheckUrlFailure => Line::new("CHECKURL-FAILURE"),
        Reply::ExportSupportedSuccess => Line::new("EXPORTSUPPORTED-SUCCESS"),
        Reply::ExportSupportedFailure => Line::new("EXPORTSUPPORTED-FAILURE"),
        Reply::RemoveExportDirectorySuccess => Line::new("REMOVEEXPORTDIRECTORY-SUCCESS"),
        Reply::RemoveExportDirectoryFailure => Line::new("REMOVEEXPORTDIRECTORY-FAILURE"),
        Reply::RenameExportSuccess { key } => Line::new("RENAMEEXPORT-SUCCESS").field(key.as_str()),
        Reply::RenameExportFailure { key } => Line::new("RENAMEEXPORT-FAILURE").field(key.as_str()),
        Reply::UnsupportedRequest => Line::new("UNSUPPORTED-REQUEST"),
    };

    Ok(vec![line.encode()?])
}

fn encode_multi(items: &[MultiUrl]) -> Result<Line> {
    let mut line = Line::new("CHECKURL-MULTI");
    for item in items {
        if item.url.is_empty() {
            return Err(AnnexError::InvalidValue(
                "Url must be present when specifying multiple values".to_string(),
            ));
        }
        check_field("Url", &item.url)?;
        check_field("Filename", &item.filename)?;
        line = line
            .field(item.url.as_str())
            .field(size_token(item.size))
            .field(item.filename.as_str());
    }
    Ok(line)
}

fn encode_configs(entries: &[(String, String)]) -> Result<Vec<String>> {
    let mut lines = Vec::with_capacity(entries.len() + 1);
    for (name, description) in entries {
        check_field("Config name", name)?;
        lines.push(
            Line::new("CONFIG")
                .field(name.as_str())
                .trailing(description.as_str())
                .encode()?,
        );
    }
    lines.push("CONFIGEND".to_string());
    Ok(lines)
}

fn encode_info(entries: &[(String, String)]) -> Result<Vec<String>> {
    let mut lines = Vec::with_capacity(entries.len() * 2 + 1);
    for (field, value) in entries {
        lines.push(Line::new("INFOFIELD").trailing(field.as_str()).encode()?);
        lines.push(Line::new("INFOVALUE").trailing(value.as_str()).encode()?);
    }
    lines.push("INFOEND".to_string());
    Ok(lines)
}

/// Decode a reply from its wire lines
///
/// Multi-line replies (`CONFIG ...`, `INFOFIELD ...`) must include their
/// terminating line.
pub fn decode_reply<S: AsRef<str>>(lines: &[S]) -> Result<Reply> {
    let first = lines
        .first()
        .map(AsRef::as_ref)
        .ok_or_else(|| AnnexError::Syntax("Empty reply".to_string()))?;
    let (verb, rest) = split_verb(first);

    let reply = match verb {
        "INITREMOTE-SUCCESS" => {
            expect_no_params(verb, rest)?;
            Reply::InitRemoteSuccess
        }
        "INITREMOTE-FAILURE" => Reply::InitRemoteFailure {
            message: rest.unwrap_or("").to_string(),
        },
        "PREPARE-SUCCESS" => {
            expect_no_params(verb, rest)?;
            Reply::PrepareSuccess
        }
        "PREPARE-FAILURE" => Reply::PrepareFailure {
            message: rest.unwrap_or("").to_string(),
        },
        "EXTENSIONS" => Reply::Extensions {
            names: rest
                .unwrap_or("")
                .split(SEPARATOR)
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .collect(),
        },
        "TRANSFER-SUCCESS" => {
            let params = split_params(verb, rest, 2)?;
            Reply::TransferSuccess {
                direction: parse_direction(params[0])?,
                key: params[1].to_string(),
            }
        }
        "TRANSFER-FAILURE" => {
            let (params, message) = split_params_with_trailing(verb, rest, 2)?;
            Reply::TransferFailure {
                direction: parse_direction(params[0])?,
                key: params[1].to_string(),
                message: message.to_string(),
            }
        }
        "CHECKPRESENT-SUCCESS" => Reply::CheckPresentSuccess { key: single_param(verb, rest)? },
        "CHECKPRESENT-FAILURE" => Reply::CheckPresentFailure { key: single_param(verb, rest)? },
        "CHECKPRESENT-UNKNOWN" => {
            let (params, message) = split_params_with_trailing(verb, rest, 1)?;
            Reply::CheckPresentUnknown {
                key: params[0].to_string(),
                message: message.to_string(),
            }
        }
        "REMOVE-SUCCESS" => Reply::RemoveSuccess { key: single_param(verb, rest)? },
        "REMOVE-FAILURE" => {
            let (params, message) = split_params_with_trailing(verb, rest, 1)?;
            Reply::RemoveFailure {
                key: params[0].to_string(),
                message: message.to_string(),
            }
        }
        "COST" => {
            let token = single_param(verb, rest)?;
            let cost = token
                .parse::<i64>()
                .map_err(|_| AnnexError::InvalidValue(format!("Invalid cost '{}'", token)))?;
            Reply::Cost(cost)
        }
        "AVAILABILITY" => match single_param(verb, rest)?.as_str() {
            "GLOBAL" => Reply::Availability(Availability::Global),
            "LOCAL" => Reply::Availability(Availability::Local),
            other => {
                return Err(AnnexError::InvalidValue(format!(
                    "Invalid availability '{}'",
                    other
                )))
            }
        },
        "WHEREIS-SUCCESS" => Reply::WhereIsSuccess {
            text: rest.unwrap_or("").to_string(),
        },
        "WHEREIS-FAILURE" => Reply::WhereIsFailure,
        "CONFIG" | "CONFIGEND" => return decode_configs(lines),
        "INFOFIELD" | "INFOEND" => return decode_info(lines),
        "CLAIMURL-SUCCESS" => Reply::ClaimUrlSuccess,
        "CLAIMURL-FAILURE" => Reply::ClaimUrlFailure,
        "CHECKURL-CONTENTS" => {
            let (params, filename) = split_params_with_trailing(verb, rest, 1)?;
            Reply::CheckUrlContents {
                size: parse_size(params[0])?,
                filename: (!filename.is_empty()).then(|| filename.to_string()),
            }
        }
        "CHECKURL-MULTI" => Reply::CheckUrlMulti(decode_multi(rest)?),
        "CHECKURL-FAILURE" => Reply::CheckUrlFailure,
        "EXPORTSUPPORTED-SUCCESS" => Reply::ExportSupportedSuccess,
        "EXPORTSUPPORTED-FAILURE" => Reply::ExportSupportedFailure,
        "REMOVEEXPORTDIRECTORY-SUCCESS" => Reply::RemoveExportDirectorySuccess,
        "REMOVEEXPORTDIRECTORY-FAILURE" => Reply::RemoveExportDirectoryFailure,
        "RENAMEEXPORT-SUCCESS" => Reply::RenameExportSuccess { key: single_param(verb, rest)? },
        "RENAMEEXPORT-FAILURE" => Reply::RenameExportFailure { key: single_param(verb, rest)? },
        "UNSUPPORTED-REQUEST" => Reply::UnsupportedRequest,
        other => {
            return Err(AnnexError::Syntax(format!("Unknown reply '{}'", other)));
        }
    };

    Ok(reply)
}

fn decode_multi(rest: Option<&str>) -> Result<Vec<MultiUrl>> {
    let rest = match rest {
        None | Some("") => return Ok(Vec::new()),
        Some(rest) => rest,
    };

    let tokens: Vec<&str> = rest.split(SEPARATOR).collect();
    if tokens.len() % 3 != 0 {
        return Err(AnnexError::Syntax(format!(
            "CHECKURL-MULTI expects url/size/filename triples, got {} fields",
            tokens.len()
        )));
    }

    tokens
        .chunks(3)
        .map(|item| {
            Ok(MultiUrl {
                url: item[0].to_string(),
                size: parse_size(item[1])?,
                filename: item[2].to_string(),
            })
        })
        .collect()
}

fn decode_configs<S: AsRef<str>>(lines: &[S]) -> Result<Reply> {
    let mut entries = Vec::new();
    for line in lines {
        match split_verb(line.as_ref()) {
            ("CONFIGEND", _) => return Ok(Reply::Configs(entries)),
            ("CONFIG", rest) => {
                let (params, description) = split_params_with_trailing("CONFIG", rest, 1)?;
                entries.push((params[0].to_string(), description.to_string()));
            }
            _ => return Err(unexpected("CONFIG or CONFIGEND", line.as_ref())),
        }
    }
    Err(AnnexError::Syntax("Config list without CONFIGEND".to_string()))
}

fn decode_info<S: AsRef<str>>(lines: &[S]) -> Result<Reply> {
    let mut entries = Vec::new();
    let mut field: Option<String> = None;
    for line in lines {
        match (split_verb(line.as_ref()), field.take()) {
            (("INFOEND", _), None) => return Ok(Reply::Info(entries)),
            (("INFOFIELD", rest), None) => field = Some(rest.unwrap_or("").to_string()),
            (("INFOVALUE", rest), Some(name)) => {
                entries.push((name, rest.unwrap_or("").to_string()));
            }
            (_, Some(_)) => return Err(unexpected("INFOVALUE", line.as_ref())),
            (_, None) => return Err(unexpected("INFOFIELD or INFOEND", line.as_ref())),
        }
    }
    Err(AnnexError::Syntax("Info list without INFOEND".to_string()))
}

fn unexpected(expected: &str, got: &str) -> AnnexError {
    AnnexError::UnexpectedMessage {
        expected: expected.to_string(),
        got: got.to_string(),
    }
}

// =============================================================================
// Stream-based I/O helpers
// =============================================================================

/// Read one line, without its terminator
///
/// Returns `None` at end of input.
pub fn read_line<R: BufRead + ?Sized>(reader: &mut R) -> Result<Option<String>> {
    let mut line = String::new();
    if reader.read_line(&mut line)? == 0 {
        return Ok(None);
    }

    if line.ends_with('\n') {
        line.pop();
        if line.ends_with('\r') {
            line.pop();
        }
    }

    tracing::trace!("<- {}", line);
    Ok(Some(line))
}

/// Write one line followed by its terminator, then flush
pub fn write_line<W: Write + ?Sized>(writer: &mut W, line: &str) -> Result<()> {
    check_single_line("Outgoing line", line)?;

    tracing::trace!("-> {}", line);
    writer.write_all(line.as_bytes())?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

/// Encode a reply and write all its lines
pub fn write_reply<W: Write + ?Sized>(writer: &mut W, reply: &Reply) -> Result<()> {
    for line in encode_reply(reply)? {
        write_line(writer, &line)?;
    }
    Ok(())
}
