//! Persistence: stream copy, string write, or download hand-off.

use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;
use std::sync::Arc;

use crate::download::{DownloadJob, Downloader};
use crate::media_index::MediaIndex;
use crate::request::PayloadRef;

/// Copy buffer size for stream persistence.
const COPY_BUF_SIZE: usize = 1024;

/// Terminal state of one persistence attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Succeeded,
    Failed,
    /// Handed off to the download subsystem, whose terminal result is not
    /// observed here: successful enqueue, not completed transfer.
    Pending,
}

/// Executes writes once classification and conflict resolution are done.
///
/// Every filename reaching a `Persister` has been through the conflict
/// resolver. All I/O errors are absorbed into `Failed`.
#[derive(Clone)]
pub struct Persister {
    register_media_index: bool,
    media_index: Arc<dyn MediaIndex>,
}

impl Persister {
    pub fn new(register_media_index: bool, media_index: Arc<dyn MediaIndex>) -> Self {
        Self {
            register_media_index,
            media_index,
        }
    }

    /// Streams a payload's bytes to `dest`.
    pub fn copy(&self, payload: &PayloadRef, dest: &Path, dry_run: bool) -> SaveOutcome {
        if dry_run {
            return SaveOutcome::Succeeded;
        }
        tracing::debug!("saving {} to {}", payload.reference(), dest.display());

        let mut source = match payload.open() {
            Ok(s) => s,
            Err(e) => {
                tracing::error!("payload source {} unreadable: {e}", payload.reference());
                return SaveOutcome::Failed;
            }
        };

        match copy_stream(source.as_mut(), dest) {
            Ok(()) => {
                self.register(dest);
                SaveOutcome::Succeeded
            }
            Err(e) => {
                tracing::error!("unable to save {}: {e}", dest.display());
                SaveOutcome::Failed
            }
        }
    }

    /// Writes literal text to `dest`.
    pub fn write_string(&self, text: &str, dest: &Path, dry_run: bool) -> SaveOutcome {
        if dry_run {
            return SaveOutcome::Succeeded;
        }
        tracing::debug!("saving text to {}", dest.display());

        match write_all(text.as_bytes(), dest) {
            Ok(()) => {
                self.register(dest);
                SaveOutcome::Succeeded
            }
            Err(e) => {
                tracing::error!("unable to save {}: {e}", dest.display());
                SaveOutcome::Failed
            }
        }
    }

    /// Hands a URL off to the download subsystem. `Pending` on a successful
    /// enqueue; the transfer itself is never awaited.
    pub fn download(
        &self,
        downloader: &dyn Downloader,
        url: &str,
        destination_rel: &Path,
        filename: &str,
        dry_run: bool,
    ) -> SaveOutcome {
        if dry_run {
            return SaveOutcome::Succeeded;
        }

        let job = DownloadJob {
            url: url.to_string(),
            destination_dir: destination_rel.to_path_buf(),
            filename: filename.to_string(),
            allow_metered: true,
            allow_roaming: true,
            register_media_index: self.register_media_index,
            description: format!("dropsink download of {url}"),
        };
        match downloader.enqueue(&job) {
            Ok(id) => {
                tracing::debug!("enqueued download {id} for {url}");
                SaveOutcome::Pending
            }
            Err(e) => {
                tracing::error!("download enqueue failed for {url}: {e}");
                SaveOutcome::Failed
            }
        }
    }

    /// Best-effort media index registration.
    fn register(&self, dest: &Path) {
        if !self.register_media_index {
            return;
        }
        if let Err(e) = self.media_index.register(dest) {
            tracing::warn!(
                "media index registration failed for {}: {e}",
                dest.display()
            );
        }
    }
}

fn copy_stream(source: &mut (dyn Read + Send), dest: &Path) -> std::io::Result<()> {
    let mut out = BufWriter::new(File::create(dest)?);
    let mut buf = [0u8; COPY_BUF_SIZE];
    loop {
        let n = source.read(&mut buf)?;
        if n == 0 {
            break;
        }
        out.write_all(&buf[..n])?;
    }
    out.flush()
}

fn write_all(bytes: &[u8], dest: &Path) -> std::io::Result<()> {
    let mut out = BufWriter::new(File::create(dest)?);
    out.write_all(bytes)?;
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media_index::NullMediaIndex;
    use crate::request::ByteSource;
    use anyhow::Result;
    use std::io;
    use std::path::PathBuf;
    use std::sync::Mutex;

    struct BytesPayload(Vec<u8>);

    impl ByteSource for BytesPayload {
        fn reference(&self) -> &str {
            "mem://bytes"
        }

        fn open(&self) -> io::Result<Box<dyn Read + Send>> {
            Ok(Box::new(io::Cursor::new(self.0.clone())))
        }
    }

    struct BrokenPayload;

    impl ByteSource for BrokenPayload {
        fn reference(&self) -> &str {
            "mem://broken"
        }

        fn open(&self) -> io::Result<Box<dyn Read + Send>> {
            Err(io::Error::new(io::ErrorKind::NotFound, "gone"))
        }
    }

    struct RecordingIndex(Mutex<Vec<PathBuf>>);

    impl MediaIndex for RecordingIndex {
        fn register(&self, path: &Path) -> Result<()> {
            self.0.lock().unwrap().push(path.to_path_buf());
            Ok(())
        }
    }

    fn persister() -> Persister {
        Persister::new(false, Arc::new(NullMediaIndex))
    }

    #[test]
    fn copy_writes_all_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("out.bin");
        // Larger than one copy buffer to exercise the loop.
        let data = vec![7u8; COPY_BUF_SIZE * 3 + 17];
        let payload: PayloadRef = Arc::new(BytesPayload(data.clone()));

        let outcome = persister().copy(&payload, &dest, false);
        assert_eq!(outcome, SaveOutcome::Succeeded);
        assert_eq!(std::fs::read(&dest).unwrap(), data);
    }

    #[test]
    fn copy_dry_run_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("out.bin");
        let payload: PayloadRef = Arc::new(BytesPayload(b"data".to_vec()));

        let outcome = persister().copy(&payload, &dest, true);
        assert_eq!(outcome, SaveOutcome::Succeeded);
        assert!(!dest.exists());
    }

    #[test]
    fn copy_unreadable_source_fails() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("out.bin");
        let payload: PayloadRef = Arc::new(BrokenPayload);

        let outcome = persister().copy(&payload, &dest, false);
        assert_eq!(outcome, SaveOutcome::Failed);
        assert!(!dest.exists());
    }

    #[test]
    fn write_string_persists_text() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("note.txt");

        let outcome = persister().write_string("shared words", &dest, false);
        assert_eq!(outcome, SaveOutcome::Succeeded);
        assert_eq!(std::fs::read_to_string(&dest).unwrap(), "shared words");
    }

    #[test]
    fn write_string_to_bad_path_fails() {
        let outcome = persister().write_string("x", Path::new("/no/such/dir/note.txt"), false);
        assert_eq!(outcome, SaveOutcome::Failed);
    }

    #[test]
    fn media_index_called_after_successful_write() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("pic.png");
        let index = Arc::new(RecordingIndex(Mutex::new(Vec::new())));
        let persister = Persister::new(true, Arc::clone(&index) as Arc<dyn MediaIndex>);

        let payload: PayloadRef = Arc::new(BytesPayload(b"png".to_vec()));
        persister.copy(&payload, &dest, false);

        let seen = index.0.lock().unwrap();
        assert_eq!(seen.as_slice(), &[dest]);
    }

    #[test]
    fn media_index_skipped_when_disabled() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("pic.png");
        let index = Arc::new(RecordingIndex(Mutex::new(Vec::new())));
        let persister = Persister::new(false, Arc::clone(&index) as Arc<dyn MediaIndex>);

        let payload: PayloadRef = Arc::new(BytesPayload(b"png".to_vec()));
        persister.copy(&payload, &dest, false);

        assert!(index.0.lock().unwrap().is_empty());
    }
}
