// src/capture/drain.rs

//! Non-blocking capture of a child's combined output.
//!
//! Each pipe gets a small Tokio task ([`OutputCapture::attach`]) that reads
//! newline-terminated raw chunks and pushes them onto one unbounded channel.
//! On Unix the child's stdout and stderr share a single pipe, so there is one
//! reader and chunks arrive in the order they were written. [`OutputCapture::drain`] empties that channel with `try_recv`, so
//! it never waits for the child.

use std::time::Duration;

use encoding_rs::Encoding;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc::{self, error::TryRecvError};
use tracing::{debug, trace, warn};

use crate::capture::decode::decode_line;
use crate::capture::filter::LineFilter;
use crate::hooks::{Category, OutputSink};

/// Sending half of the combined output stream.
pub type ChunkSender = mpsc::UnboundedSender<Vec<u8>>;

/// Line buffer fed from the child's combined output stream.
#[derive(Debug)]
pub struct OutputCapture {
    rx: mpsc::UnboundedReceiver<Vec<u8>>,
    tx: Option<ChunkSender>,
    filter: LineFilter,
    encoding: &'static Encoding,
    mute: bool,
    lines: Vec<String>,
}

impl OutputCapture {
    pub fn new(filter: LineFilter, encoding: &'static Encoding, mute: bool) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            rx,
            tx: Some(tx),
            filter,
            encoding,
            mute,
            lines: Vec::new(),
        }
    }

    /// A handle producers can push raw chunks through, until [`seal`] is called.
    ///
    /// [`seal`]: OutputCapture::seal
    pub fn sender(&self) -> Option<ChunkSender> {
        self.tx.clone()
    }

    /// Spawn a reader task forwarding `reader`'s lines into the stream.
    ///
    /// Must be called from within a Tokio runtime. Does nothing once sealed.
    pub fn attach<R>(&self, reader: R, stream: &'static str)
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let Some(tx) = self.sender() else {
            warn!(stream, "output capture already sealed; pipe not attached");
            return;
        };

        tokio::spawn(async move {
            let mut reader = BufReader::new(reader);
            loop {
                let mut chunk = Vec::new();
                match reader.read_until(b'\n', &mut chunk).await {
                    Ok(0) => break,
                    Ok(_) => {
                        if tx.send(chunk).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        debug!(stream, error = %e, "error reading child pipe");
                        break;
                    }
                }
            }
            trace!(stream, "child pipe closed");
        });
    }

    /// Drop the capture's own sender so the stream closes when all readers do.
    pub fn seal(&mut self) {
        self.tx = None;
    }

    pub fn is_muted(&self) -> bool {
        self.mute
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Buffered output joined with `\n`.
    pub fn joined(&self) -> String {
        self.lines.join("\n")
    }

    /// Drain every chunk currently available, without waiting.
    ///
    /// Surviving lines are appended to the buffer and, unless muted, sent to
    /// the sink as process output. Returns the number of lines appended.
    pub fn drain(&mut self, sink: &dyn OutputSink) -> usize {
        let mut appended = 0;
        loop {
            match self.rx.try_recv() {
                Ok(chunk) => {
                    if self.accept(&chunk, sink) {
                        appended += 1;
                    }
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        appended
    }

    /// Wait (at most `grace`) for every producer to finish, then drain what
    /// they left behind.
    ///
    /// Returns `true` if the stream closed within the grace period.
    pub async fn finish(&mut self, sink: &dyn OutputSink, grace: Duration) -> bool {
        self.seal();
        let deadline = tokio::time::Instant::now() + grace;
        loop {
            match tokio::time::timeout_at(deadline, self.rx.recv()).await {
                Ok(Some(chunk)) => {
                    self.accept(&chunk, sink);
                }
                Ok(None) => return true,
                Err(_) => {
                    debug!(?grace, "output stream still open after grace period");
                    self.drain(sink);
                    return false;
                }
            }
        }
    }

    fn accept(&mut self, chunk: &[u8], sink: &dyn OutputSink) -> bool {
        let Some(line) = decode_line(chunk, self.encoding, &self.filter) else {
            return false;
        };
        if line.is_empty() {
            return false;
        }
        if !self.mute {
            sink.emit(Category::ProcessOutput, &line);
        }
        self.lines.push(line);
        true
    }
}
