//! Inbound share request model.

use std::fmt;
use std::io::{self, Read};
use std::path::PathBuf;
use std::sync::Arc;

/// How the producer dispatched the share.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareAction {
    /// One payload: a single stream, or a text/URL string.
    Single,
    /// Several stream payloads.
    Multiple,
    /// Anything else; only handled when force-saving is enabled.
    TextOrOther,
}

/// Opaque byte source behind a payload reference.
pub trait ByteSource: Send + Sync {
    /// Stable reference string (path or URI) naming the source.
    fn reference(&self) -> &str;

    /// Display name supplied by the producer, if any.
    fn display_name(&self) -> Option<&str> {
        None
    }

    /// Opens the source for reading. Borrow-for-read: the pipeline never
    /// keeps the reader past one copy operation.
    fn open(&self) -> io::Result<Box<dyn Read + Send>>;
}

/// Shared handle to one payload's byte source.
pub type PayloadRef = Arc<dyn ByteSource>;

/// Payload backed by a local file.
pub struct FilePayload {
    path: PathBuf,
    reference: String,
    display_name: Option<String>,
}

impl FilePayload {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let reference = path.to_string_lossy().into_owned();
        Self {
            path,
            reference,
            display_name: None,
        }
    }

    /// Attach a producer-supplied display name.
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }
}

impl ByteSource for FilePayload {
    fn reference(&self) -> &str {
        &self.reference
    }

    fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    fn open(&self) -> io::Result<Box<dyn Read + Send>> {
        Ok(Box::new(std::fs::File::open(&self.path)?))
    }
}

/// One inbound share. Immutable for the duration of a handling cycle.
pub struct ShareRequest {
    pub action: ShareAction,
    /// MIME type declared by the producer. Required for classification.
    pub declared_mime: Option<String>,
    /// Stream payloads for Single/Multiple actions.
    pub items: Vec<PayloadRef>,
    /// Text payload (literal text or a URL) for stream-less shares.
    pub text: Option<String>,
    /// Title hint preferred when deriving a filename for text payloads.
    pub subject: Option<String>,
}

impl ShareRequest {
    /// Single-stream share.
    pub fn single(mime: impl Into<String>, item: PayloadRef) -> Self {
        Self {
            action: ShareAction::Single,
            declared_mime: Some(mime.into()),
            items: vec![item],
            text: None,
            subject: None,
        }
    }

    /// Multi-stream share.
    pub fn multiple(mime: impl Into<String>, items: Vec<PayloadRef>) -> Self {
        Self {
            action: ShareAction::Multiple,
            declared_mime: Some(mime.into()),
            items,
            text: None,
            subject: None,
        }
    }

    /// Text or URL share.
    pub fn text(mime: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            action: ShareAction::Single,
            declared_mime: Some(mime.into()),
            items: Vec::new(),
            text: Some(text.into()),
            subject: None,
        }
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }
}

impl fmt::Debug for ShareRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShareRequest")
            .field("action", &self.action)
            .field("declared_mime", &self.declared_mime)
            .field(
                "items",
                &self
                    .items
                    .iter()
                    .map(|i| i.reference().to_string())
                    .collect::<Vec<_>>(),
            )
            .field("text", &self.text)
            .field("subject", &self.subject)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn file_payload_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("in.txt");
        std::fs::write(&path, b"payload bytes").unwrap();

        let payload = FilePayload::new(&path).with_display_name("in.txt");
        assert_eq!(payload.display_name(), Some("in.txt"));
        assert!(payload.reference().ends_with("in.txt"));

        let mut buf = String::new();
        payload.open().unwrap().read_to_string(&mut buf).unwrap();
        assert_eq!(buf, "payload bytes");
    }

    #[test]
    fn file_payload_missing_file_unopenable() {
        let payload = FilePayload::new("/no/such/file");
        assert!(payload.open().is_err());
    }

    #[test]
    fn constructors_set_action() {
        let req = ShareRequest::text("text/plain", "hello").with_subject("note");
        assert_eq!(req.action, ShareAction::Single);
        assert!(req.items.is_empty());
        assert_eq!(req.text.as_deref(), Some("hello"));
        assert_eq!(req.subject.as_deref(), Some("note"));

        let item: PayloadRef = Arc::new(FilePayload::new("/tmp/a"));
        let req = ShareRequest::multiple("image/png", vec![item]);
        assert_eq!(req.action, ShareAction::Multiple);
        assert_eq!(req.items.len(), 1);
    }
}
