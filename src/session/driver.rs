//! Session Driver
//!
//! Runs one protocol conversation over a pair of streams.

use std::io::{BufRead, Write};

use crate::config::Config;
use crate::error::Result;
use crate::protocol::{decode_request, flatten_message, read_line, write_line, write_reply, Line};
use crate::remote::SpecialRemote;
use super::Dispatcher;

/// A protocol session between a backend and the host
///
/// Reads one request line at a time, dispatches it, and writes the reply
/// before reading on. Every line is flushed as soon as it is written.
pub struct Session<B, R, W> {
    /// The backend serving requests
    remote: B,

    /// Requests and callback replies from the host
    reader: R,

    /// Replies and callback requests to the host
    writer: W,

    /// Protocol state (extensions, export scope)
    dispatcher: Dispatcher,

    /// Session configuration
    config: Config,
}

impl<B: SpecialRemote, R: BufRead, W: Write> Session<B, R, W> {
    /// Create a session with the default configuration
    pub fn new(remote: B, reader: R, writer: W) -> Self {
        Self::with_config(Config::default(), remote, reader, writer)
    }

    /// Create a session with the given configuration
    pub fn with_config(config: Config, remote: B, reader: R, writer: W) -> Self {
        Self {
            dispatcher: Dispatcher::new(config.extensions.clone()),
            remote,
            reader,
            writer,
            config,
        }
    }

    /// Run the session until the host closes its end (blocking)
    ///
    /// Announces the protocol version, then serves requests. On a structural
    /// error a single `ERROR <description>` line is sent and the error is
    /// returned; nothing after the offending line is read.
    pub fn run(&mut self) -> Result<()> {
        tracing::debug!("Session started (protocol version {})", self.config.protocol_version);

        let result = self.serve();
        if let Err(ref e) = result {
            tracing::warn!("Session terminated: {}", e);
            // Best effort; the caller still gets the error
            if let Ok(line) = Line::new("ERROR").trailing(flatten_message(&e.to_string())).encode() {
                let _ = write_line(&mut self.writer, &line);
            }
        }
        result
    }

    fn serve(&mut self) -> Result<()> {
        write_line(
            &mut self.writer,
            &format!("VERSION {}", self.config.protocol_version),
        )?;

        while let Some(line) = read_line(&mut self.reader)? {
            self.handle_line(&line)?;
        }

        tracing::debug!("Host closed the session");
        Ok(())
    }

    /// Decode, dispatch and answer a single request line
    pub fn handle_line(&mut self, line: &str) -> Result<()> {
        let request = decode_request(line)?;
        tracing::trace!("Dispatching {:?}", request);

        let reply = self.dispatcher.dispatch(
            &mut self.remote,
            &mut self.reader,
            &mut self.writer,
            request,
        )?;

        if let Some(reply) = reply {
            write_reply(&mut self.writer, &reply)?;
        }
        Ok(())
    }

    /// The backend
    pub fn remote(&self) -> &B {
        &self.remote
    }

    /// Protocol state
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Take the session apart into backend and streams
    pub fn into_parts(self) -> (B, R, W) {
        (self.remote, self.reader, self.writer)
    }
}
