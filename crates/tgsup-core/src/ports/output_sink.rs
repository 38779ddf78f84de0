//! Output sink port for child process stdout/stderr lines.
//!
//! This port abstracts the destination for captured server output,
//! allowing the CLI to print, tests to collect, and embedders to forward
//! lines wherever they like.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which standard stream a line was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputStream {
    Stdout,
    Stderr,
}

impl OutputStream {
    /// Tag prefixed to lines from this stream.
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Stdout => "[Output]",
            Self::Stderr => "[Error]",
        }
    }

    /// Lowercase stream name used in log fields.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stdout => "stdout",
            Self::Stderr => "stderr",
        }
    }
}

/// A single line of child output, without its trailing newline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputLine {
    pub stream: OutputStream,
    pub text: String,
}

impl OutputLine {
    pub fn new(stream: OutputStream, text: impl Into<String>) -> Self {
        Self {
            stream,
            text: text.into(),
        }
    }
}

impl fmt::Display for OutputLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.stream.tag(), self.text)
    }
}

/// Port for receiving server output lines.
///
/// Implementations must be thread-safe. Lines from one stream arrive in
/// order; stdout and stderr are delivered by independent tasks and may
/// interleave arbitrarily. A slow sink stalls the reader for its stream.
pub trait OutputSinkPort: Send + Sync {
    /// Receive one tagged output line.
    fn append(&self, line: OutputLine);
}

impl<F> OutputSinkPort for F
where
    F: Fn(OutputLine) + Send + Sync,
{
    fn append(&self, line: OutputLine) {
        self(line);
    }
}

/// A sink that discards all output.
///
/// Lines are still traced at debug level by the reader tasks.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopOutputSink;

impl OutputSinkPort for NoopOutputSink {
    fn append(&self, _line: OutputLine) {}
}
