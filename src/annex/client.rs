//! Host Callback Client
//!
//! Lets a backend ask the host questions in the middle of a request.
//! Every call is a blocking round trip: one line out, then exactly the
//! reply shape the request calls for.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use crate::error::{AnnexError, Result};
use crate::protocol::{flatten_message, read_line, split_verb, write_line, Line, SEPARATOR};
use super::extensions::{Extensions, GETGITREMOTENAME, INFO};

/// URI schemes the host records with `SETURLPRESENT` rather than `SETURIPRESENT`
const URL_SCHEMES: &[&str] = &[
    "http", "ftp", "gopher", "mailto", "mid", "cid", "news", "nntp", "prospero", "telnet",
    "rlogin", "tn3270", "wais",
];

/// Stored credentials returned by `GETCREDS`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

/// Handle for talking back to the host while a request is being served
pub struct Annex<'a> {
    /// Host requests and replies
    reader: &'a mut dyn BufRead,

    /// Lines to the host (flushed after every line)
    writer: &'a mut dyn Write,

    /// Extensions the host has announced so far
    extensions: &'a Extensions,
}

impl<'a> Annex<'a> {
    /// Create a client over the session's streams
    pub fn new(
        reader: &'a mut dyn BufRead,
        writer: &'a mut dyn Write,
        extensions: &'a Extensions,
    ) -> Self {
        Self {
            reader,
            writer,
            extensions,
        }
    }

    /// Extensions the host has announced
    pub fn extensions(&self) -> &Extensions {
        self.extensions
    }

    // =========================================================================
    // Configuration and State
    // =========================================================================

    /// Read a configuration setting; unset settings come back empty
    pub fn get_config(&mut self, name: &str) -> Result<String> {
        self.ask_value(Line::new("GETCONFIG").field(name))
    }

    /// Store a configuration setting
    pub fn set_config(&mut self, name: &str, value: &str) -> Result<()> {
        self.send(Line::new("SETCONFIG").field(name).trailing(value))
    }

    /// Read the state stored for a key
    pub fn get_state(&mut self, key: &str) -> Result<String> {
        self.ask_value(Line::new("GETSTATE").field(key))
    }

    /// Store state for a key; an empty value clears it
    pub fn set_state(&mut self, key: &str, value: &str) -> Result<()> {
        self.send(Line::new("SETSTATE").field(key).trailing(value))
    }

    /// Get the repository-relative hash directory for a key (mixed case)
    pub fn dirhash(&mut self, key: &str) -> Result<String> {
        self.ask_value(Line::new("DIRHASH").field(key))
    }

    /// Get the repository-relative hash directory for a key (lower case)
    pub fn dirhash_lower(&mut self, key: &str) -> Result<String> {
        self.ask_value(Line::new("DIRHASH-LOWER").field(key))
    }

    pub fn set_creds(&mut self, setting: &str, user: &str, password: &str) -> Result<()> {
        self.send(
            Line::new("SETCREDS")
                .field(setting)
                .field(user)
                .trailing(password),
        )
    }

    /// Read stored credentials; a missing password comes back empty
    pub fn get_creds(&mut self, setting: &str) -> Result<Credentials> {
        let mut values = self.ask(Line::new("GETCREDS").field(setting), "CREDS", 2)?;
        let password = values.pop().unwrap_or_default();
        let user = values.pop().unwrap_or_default();
        Ok(Credentials { user, password })
    }

    /// UUID of the remote
    pub fn get_uuid(&mut self) -> Result<String> {
        self.ask_value(Line::new("GETUUID"))
    }

    /// Path to the repository's git directory
    pub fn get_git_dir(&mut self) -> Result<PathBuf> {
        self.ask_value(Line::new("GETGITDIR")).map(PathBuf::from)
    }

    /// Set the preferred-content expression of the remote
    pub fn set_wanted(&mut self, expression: &str) -> Result<()> {
        self.send(Line::new("SETWANTED").trailing(expression))
    }

    pub fn get_wanted(&mut self) -> Result<String> {
        self.ask_value(Line::new("GETWANTED"))
    }

    // =========================================================================
    // URLs
    // =========================================================================

    pub fn set_url_present(&mut self, key: &str, url: &str) -> Result<()> {
        self.send(Line::new("SETURLPRESENT").field(key).trailing(url))
    }

    pub fn set_url_missing(&mut self, key: &str, url: &str) -> Result<()> {
        self.send(Line::new("SETURLMISSING").field(key).trailing(url))
    }

    pub fn set_uri_present(&mut self, key: &str, uri: &str) -> Result<()> {
        self.send(Line::new("SETURIPRESENT").field(key).trailing(uri))
    }

    pub fn set_uri_missing(&mut self, key: &str, uri: &str) -> Result<()> {
        self.send(Line::new("SETURIMISSING").field(key).trailing(uri))
    }

    /// Record that a key can be downloaded from `uri`
    ///
    /// Known URL schemes are recorded as URLs, anything else as a URI.
    pub fn add_uri(&mut self, key: &str, uri: &str) -> Result<()> {
        if is_url(uri) {
            self.set_url_present(key, uri)
        } else {
            self.set_uri_present(key, uri)
        }
    }

    /// Record that a key can no longer be downloaded from `uri`
    pub fn discard_uri(&mut self, key: &str, uri: &str) -> Result<()> {
        if is_url(uri) {
            self.set_url_missing(key, uri)
        } else {
            self.set_uri_missing(key, uri)
        }
    }

    /// Recorded URLs for a key, limited to those starting with `prefix`
    pub fn get_urls(&mut self, key: &str, prefix: &str) -> Result<Vec<String>> {
        self.ask_values(Line::new("GETURLS").field(key).trailing(prefix))
    }

    // =========================================================================
    // Messages
    // =========================================================================

    /// Report how many bytes of the current transfer are done
    pub fn progress(&mut self, bytes: u64) -> Result<()> {
        self.send(Line::new("PROGRESS").field(bytes.to_string()))
    }

    pub fn debug(&mut self, message: &str) -> Result<()> {
        self.send(Line::new("DEBUG").trailing(flatten_message(message)))
    }

    /// Report a fatal error to the host
    pub fn error(&mut self, message: &str) -> Result<()> {
        self.send(Line::new("ERROR").trailing(flatten_message(message)))
    }

    /// Show a message to the user; needs the `INFO` extension
    pub fn info(&mut self, message: &str) -> Result<()> {
        self.require_extension(INFO)?;
        self.send(Line::new("INFO").trailing(flatten_message(message)))
    }

    /// Name of the git remote; needs the `GETGITREMOTENAME` extension
    pub fn get_git_remote_name(&mut self) -> Result<String> {
        self.require_extension(GETGITREMOTENAME)?;
        self.ask_value(Line::new("GETGITREMOTENAME"))
    }

    // =========================================================================
    // Round Trips
    // =========================================================================

    fn require_extension(&self, name: &str) -> Result<()> {
        if self.extensions.is_announced(name) {
            Ok(())
        } else {
            Err(AnnexError::Protocol(format!(
                "{} not available: the host did not announce the extension",
                name
            )))
        }
    }

    fn send(&mut self, line: Line) -> Result<()> {
        let line = line.encode()?;
        write_line(&mut *self.writer, &line)
    }

    fn receive(&mut self, expected: &str) -> Result<String> {
        read_line(&mut *self.reader)?.ok_or_else(|| AnnexError::UnexpectedMessage {
            expected: expected.to_string(),
            got: "end of input".to_string(),
        })
    }

    /// Send a request and parse a `<keyword> v1 .. vN` reply
    ///
    /// Missing trailing values are padded with empty strings.
    fn ask(&mut self, request: Line, keyword: &str, count: usize) -> Result<Vec<String>> {
        self.send(request)?;
        let reply = self.receive(keyword)?;

        let (verb, rest) = split_verb(&reply);
        if verb != keyword {
            return Err(AnnexError::UnexpectedMessage {
                expected: format!("{} and {} value(s)", keyword, count),
                got: reply.clone(),
            });
        }

        let mut values: Vec<String> = match rest {
            Some(rest) => rest.splitn(count, SEPARATOR).map(str::to_string).collect(),
            None => Vec::new(),
        };
        values.resize(count, String::new());
        Ok(values)
    }

    fn ask_value(&mut self, request: Line) -> Result<String> {
        let mut values = self.ask(request, "VALUE", 1)?;
        Ok(values.pop().unwrap_or_default())
    }

    /// Send a request and collect `VALUE <v>` lines up to a bare `VALUE`
    fn ask_values(&mut self, request: Line) -> Result<Vec<String>> {
        self.send(request)?;

        let mut values = Vec::new();
        loop {
            let reply = self.receive("VALUE")?;
            match split_verb(&reply) {
                ("VALUE", None) | ("VALUE", Some("")) => return Ok(values),
                ("VALUE", Some(value)) => values.push(value.to_string()),
                _ => {
                    return Err(AnnexError::UnexpectedMessage {
                        expected: "VALUE".to_string(),
                        got: reply.clone(),
                    })
                }
            }
        }
    }
}

fn is_url(uri: &str) -> bool {
    match uri.split_once("://") {
        Some((scheme, _)) => URL_SCHEMES.contains(&scheme.to_ascii_lowercase().as_str()),
        None => false,
    }
}
