//! Structured Keys
//!
//! Optional helper for backends that want the fields packed into a key.
//!
//! ## Key Layout
//! ```text
//! BACKEND[-sSIZE][-mMTIME][-SCHUNKSIZE-CCHUNK]--NAME
//!
//! SHA256E-s1048576-S262144-C2--9f86d081884c.bin
//! └──┬──┘ └──┬───┘ └──┬──┘ └┬┘  └──────┬──────┘
//!  backend  size   chunk   chunk     name
//!                  size    index
//! ```
//! Chunk indices start at 1.

use std::fmt;
use std::str::FromStr;

use crate::annex::Annex;
use crate::error::{RemoteError, RemoteResult, Result};

/// Separator between the key fields and the name
const NAME_SEPARATOR: &str = "--";

/// Separator between key fields
const FIELD_SEPARATOR: char = '-';

/// A parsed key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key {
    /// The whole key as the host sent it
    key: String,

    /// Key backend (e.g. `SHA256E`)
    pub backend: String,

    /// Size of the whole file, if recorded
    pub bytesize: Option<u64>,

    /// Modification time, if recorded
    pub mtime: Option<u64>,

    /// Chunk size, if the key names a chunk
    pub chunksize: Option<u64>,

    /// Chunk index (1-based), if the key names a chunk
    pub chunk: Option<u64>,

    /// Hash and extension part
    pub keyname: String,
}

impl Key {
    /// Parse a key
    ///
    /// Malformed keys are a business failure, so the request they came
    /// with fails without ending the session.
    pub fn parse(key: &str) -> RemoteResult<Self> {
        let bad_key = || RemoteError::failed(format!("bad key: {}", key));

        let (fields, keyname) = key.split_once(NAME_SEPARATOR).ok_or_else(bad_key)?;
        let mut fields: Vec<&str> = fields.split(FIELD_SEPARATOR).collect();

        let chunk_fields = match fields.as_slice() {
            [_, .., size, index] if size.starts_with('S') && index.starts_with('C') => {
                Some((*size, *index))
            }
            _ => None,
        };
        let (chunksize, chunk) = match chunk_fields {
            Some((size, index)) => {
                let chunk = parse_number(&index[1..]).ok_or_else(bad_key)?;
                let chunksize = parse_number(&size[1..]).ok_or_else(bad_key)?;
                fields.truncate(fields.len() - 2);
                (Some(chunksize), Some(chunk))
            }
            None => (None, None),
        };

        let mtime = take_tagged(&mut fields, 'm')
            .map(|value| value.ok_or_else(bad_key))
            .transpose()?;
        let bytesize = take_tagged(&mut fields, 's')
            .map(|value| value.ok_or_else(bad_key))
            .transpose()?;

        let backend = match fields.as_slice() {
            [backend] if !backend.is_empty() => backend.to_string(),
            _ => return Err(bad_key()),
        };

        if let (Some(chunk), Some(chunksize), Some(bytesize)) = (chunk, chunksize, bytesize) {
            if chunk > 0
                && bytesize > 0
                && chunk.saturating_mul(chunksize) >= bytesize.saturating_add(chunksize)
            {
                return Err(bad_key());
            }
        }

        Ok(Self {
            key: key.to_string(),
            backend,
            bytesize,
            mtime,
            chunksize,
            chunk,
            keyname: keyname.to_string(),
        })
    }

    /// The key as sent by the host
    pub fn as_str(&self) -> &str {
        &self.key
    }

    /// Size of the data this key names
    ///
    /// For a chunk this is the chunk size, truncated for the final chunk.
    /// Unknown when a chunk key carries no file size.
    pub fn size(&self) -> Option<u64> {
        match (self.chunksize, self.chunk, self.bytesize) {
            (Some(chunksize), Some(chunk), Some(bytesize)) if chunksize > 0 => {
                if chunk.saturating_mul(chunksize) > bytesize {
                    Some(bytesize % chunksize)
                } else {
                    Some(chunksize)
                }
            }
            (Some(_), _, _) => None,
            (None, _, bytesize) => bytesize,
        }
    }

    // =========================================================================
    // Host State
    // =========================================================================

    /// State stored for this key in the host
    pub fn state(&self, annex: &mut Annex<'_>) -> Result<String> {
        annex.get_state(&self.key)
    }

    pub fn set_state(&self, annex: &mut Annex<'_>, value: &str) -> Result<()> {
        annex.set_state(&self.key, value)
    }

    /// Recorded locations of this key starting with `prefix` (may be empty)
    pub fn uris(&self, annex: &mut Annex<'_>, prefix: &str) -> Result<Vec<String>> {
        annex.get_urls(&self.key, prefix)
    }

    pub fn add_uri(&self, annex: &mut Annex<'_>, uri: &str) -> Result<()> {
        annex.add_uri(&self.key, uri)
    }

    pub fn discard_uri(&self, annex: &mut Annex<'_>, uri: &str) -> Result<()> {
        annex.discard_uri(&self.key, uri)
    }
}

impl FromStr for Key {
    type Err = RemoteError;

    fn from_str(s: &str) -> RemoteResult<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}

impl AsRef<str> for Key {
    fn as_ref(&self) -> &str {
        &self.key
    }
}

fn parse_number(digits: &str) -> Option<u64> {
    digits.parse().ok()
}

/// Pop the last field if it carries `tag`
///
/// `None` when the field is absent, `Some(None)` when it is malformed.
fn take_tagged(fields: &mut Vec<&str>, tag: char) -> Option<Option<u64>> {
    let value = match fields.last() {
        Some(field) if field.starts_with(tag) => parse_number(&field[tag.len_utf8()..]),
        _ => return None,
    };
    fields.pop();
    Some(value)
}
