//! Stderr writer that removes account names from formatted log lines.
//!
//! Events may carry paths (input logs, extension roots, settings files) and
//! error messages built from them. Each formatted event is buffered whole and
//! anonymized before it reaches the underlying writer.

use et_redact::LogAnonymizer;
use std::io::{self, Write};
use std::sync::Arc;

/// Anonymize every name in `usernames` out of `text`.
pub fn redact_usernames<S: AsRef<str>>(text: &str, usernames: &[S]) -> String {
    let anonymizer = LogAnonymizer::new();
    usernames.iter().fold(text.to_string(), |text, name| {
        anonymizer.anonymize(&text, name.as_ref())
    })
}

/// `MakeWriter` producing [`RedactingWriter`]s over stderr.
#[derive(Debug, Clone)]
pub struct RedactingStderr {
    usernames: Arc<[String]>,
}

impl RedactingStderr {
    /// Empty names are ignored.
    pub fn new<I, S>(usernames: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut names: Vec<String> = usernames
            .into_iter()
            .map(Into::into)
            .filter(|name| !name.is_empty())
            .collect();
        names.sort();
        names.dedup();
        Self {
            usernames: names.into(),
        }
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for RedactingStderr {
    type Writer = RedactingWriter<io::Stderr>;

    fn make_writer(&'a self) -> Self::Writer {
        RedactingWriter::new(io::stderr(), Arc::clone(&self.usernames))
    }
}

/// Buffers everything written and emits it anonymized on flush or drop.
pub struct RedactingWriter<W: Write> {
    inner: W,
    usernames: Arc<[String]>,
    buf: Vec<u8>,
}

impl<W: Write> RedactingWriter<W> {
    pub fn new(inner: W, usernames: Arc<[String]>) -> Self {
        Self {
            inner,
            usernames,
            buf: Vec::new(),
        }
    }

    fn emit(&mut self) -> io::Result<()> {
        if self.buf.is_empty() {
            return Ok(());
        }
        let redacted = redact_usernames(&String::from_utf8_lossy(&self.buf), &self.usernames[..]);
        self.buf.clear();
        self.inner.write_all(redacted.as_bytes())
    }
}

impl<W: Write> Write for RedactingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.emit()?;
        self.inner.flush()
    }
}

impl<W: Write> Drop for RedactingWriter<W> {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}
