//! Media index collaborator seam.

use anyhow::Result;
use std::path::Path;

/// External media indexing service. Registration is always best-effort; the
/// pipeline logs and ignores failures.
pub trait MediaIndex: Send + Sync {
    fn register(&self, path: &Path) -> Result<()>;
}

/// No-op index for installations without a media catalog.
pub struct NullMediaIndex;

impl MediaIndex for NullMediaIndex {
    fn register(&self, path: &Path) -> Result<()> {
        tracing::debug!("media index disabled, skipping {}", path.display());
        Ok(())
    }
}
