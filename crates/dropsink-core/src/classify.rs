//! Payload classification and the save pipeline.
//!
//! Classification and filename derivation are synchronous and pure; the one
//! asynchronous boundary sits at the persistence stage, where blocking
//! filesystem and network work runs on the blocking pool.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::batch::{self, BatchOutcome};
use crate::config::{ConflictPolicy, DropsinkConfig};
use crate::conflict;
use crate::content_type::ContentTypeProbe;
use crate::download::Downloader;
use crate::error::SaveError;
use crate::filename::{self, SanitizeMode};
use crate::media_index::MediaIndex;
use crate::persist::{Persister, SaveOutcome};
use crate::request::{PayloadRef, ShareAction, ShareRequest};

/// Drives one share request through classification, filename derivation,
/// conflict resolution, and persistence.
pub struct Saver {
    config: DropsinkConfig,
    /// Resolved destination directory.
    destination: PathBuf,
    /// Root-relative destination, handed to the download subsystem.
    destination_rel: PathBuf,
    downloader: Arc<dyn Downloader>,
    media_index: Arc<dyn MediaIndex>,
    probe: Arc<dyn ContentTypeProbe>,
}

impl Saver {
    pub fn new(
        config: DropsinkConfig,
        destination: PathBuf,
        destination_rel: PathBuf,
        downloader: Arc<dyn Downloader>,
        media_index: Arc<dyn MediaIndex>,
        probe: Arc<dyn ContentTypeProbe>,
    ) -> Self {
        Self {
            config,
            destination,
            destination_rel,
            downloader,
            media_index,
            probe,
        }
    }

    fn sanitize_mode(&self) -> SanitizeMode {
        if self.config.lenient_filenames {
            SanitizeMode::Lenient
        } else {
            SanitizeMode::Strict
        }
    }

    fn persister(&self) -> Persister {
        Persister::new(
            self.config.register_media_index,
            Arc::clone(&self.media_index),
        )
    }

    /// Classifies and executes one request. With `dry_run` every persistence
    /// step is short-circuited and the filesystem is left untouched.
    pub async fn handle(&self, request: &ShareRequest, dry_run: bool) -> BatchOutcome {
        let Some(declared) = request.declared_mime.as_deref() else {
            tracing::info!("no declared type, request unsupported");
            return BatchOutcome::unsupported();
        };
        let declared = declared.to_ascii_lowercase();
        tracing::debug!("action: {:?}, type: {declared}", request.action);

        match request.action {
            ShareAction::Single => self.handle_single(request, &declared, dry_run).await,
            ShareAction::Multiple => self.handle_multiple(request, &declared, dry_run).await,
            ShareAction::TextOrOther if self.config.force_saving => {
                // Best effort: treat it like a single share.
                tracing::debug!("force saving an unrecognized action as single");
                self.handle_single(request, &declared, dry_run).await
            }
            ShareAction::TextOrOther => {
                tracing::info!("no handler for action, request unsupported");
                BatchOutcome::unsupported()
            }
        }
    }

    async fn handle_single(
        &self,
        request: &ShareRequest,
        declared: &str,
        dry_run: bool,
    ) -> BatchOutcome {
        if let Some(item) = request.items.first() {
            tracing::debug!("single share has a stream");
            return self
                .save_stream_item(Arc::clone(item), declared.to_string(), dry_run)
                .await;
        }

        if let Some(text) = request.text.as_deref() {
            return self.save_text(request, text, declared, dry_run).await;
        }

        tracing::info!("single share carries neither stream nor text");
        BatchOutcome::failed(None)
    }

    async fn save_stream_item(
        &self,
        item: PayloadRef,
        declared: String,
        dry_run: bool,
    ) -> BatchOutcome {
        let persister = self.persister();
        let mode = self.sanitize_mode();
        let destination = self.destination.clone();
        let policy = self.config.on_collision;

        let result = tokio::task::spawn_blocking(move || {
            persist_stream(&persister, &item, &declared, mode, &destination, policy, dry_run)
        })
        .await;
        outcome_from(result)
    }

    async fn save_text(
        &self,
        request: &ShareRequest,
        text: &str,
        declared: &str,
        dry_run: bool,
    ) -> BatchOutcome {
        // A fetchable URL needs a host; bare `scheme:` prefixes also occur in
        // ordinary prose ("Remember: ...") and stay on the literal-text path.
        match url::Url::parse(text) {
            Ok(parsed) if parsed.has_host() => self.save_url(request, text, &parsed, dry_run).await,
            _ => {
                tracing::debug!("text payload is not a URL");
                let hint = request.subject.as_deref().unwrap_or(text);
                let candidate = filename::derive(hint, declared, self.sanitize_mode());
                self.write_resolved_string(candidate, text.to_string(), dry_run)
                    .await
            }
        }
    }

    async fn save_url(
        &self,
        request: &ShareRequest,
        text: &str,
        parsed: &url::Url,
        dry_run: bool,
    ) -> BatchOutcome {
        tracing::debug!("text payload is a URL");

        // Extension lookup first; the HTTP header probe only on a real run,
        // since the capability probe must never touch the network.
        let mut content_type = filename::mime_from_url_path(parsed);
        if content_type.is_none() && !dry_run {
            let probe = Arc::clone(&self.probe);
            let url_s = text.to_string();
            content_type =
                match tokio::task::spawn_blocking(move || probe.content_type(&url_s)).await {
                    Ok(Ok(ct)) => ct,
                    Ok(Err(e)) => {
                        tracing::warn!("content type probe failed: {e}");
                        None
                    }
                    Err(e) => {
                        tracing::error!("probe task join: {e}");
                        None
                    }
                };
        }

        let Some(content_type) = content_type else {
            if dry_run {
                // The header probe could still resolve this on a real run;
                // report the payload as handleable.
                return BatchOutcome::from_outcome(SaveOutcome::Succeeded);
            }
            tracing::info!("no content type for {text}");
            return BatchOutcome::from_error(&SaveError::ContentTypeUndetermined {
                url: text.to_string(),
            });
        };
        tracing::debug!("URL content type: {content_type}");

        let hint = request
            .subject
            .clone()
            .or_else(|| last_url_segment(parsed))
            .unwrap_or_else(|| text.to_string());
        let candidate = filename::derive(&hint, &content_type, self.sanitize_mode());

        if content_type.starts_with("image/")
            || content_type.starts_with("video/")
            || content_type.starts_with("audio/")
        {
            self.enqueue_resolved_download(candidate, text.to_string(), dry_run)
                .await
        } else if content_type.starts_with("text/") {
            // Known gap carried over from the original behavior: the URL
            // string itself is written, not the fetched body.
            self.write_resolved_string(candidate, text.to_string(), dry_run)
                .await
        } else if self.config.force_saving {
            tracing::debug!("force saving {content_type} via download");
            self.enqueue_resolved_download(candidate, text.to_string(), dry_run)
                .await
        } else {
            tracing::info!("unrecognized content type {content_type} for {text}");
            BatchOutcome::failed(None).with_content_type(content_type)
        }
    }

    /// Conflict-resolves `candidate`, then writes `text` to it.
    async fn write_resolved_string(
        &self,
        candidate: String,
        text: String,
        dry_run: bool,
    ) -> BatchOutcome {
        let persister = self.persister();
        let destination = self.destination.clone();
        let policy = self.config.on_collision;

        let result = tokio::task::spawn_blocking(move || {
            let resolved = conflict::resolve(&candidate, &destination, policy, dry_run)?;
            Ok(persister.write_string(&text, &destination.join(resolved), dry_run))
        })
        .await;
        outcome_from(result)
    }

    /// Conflict-resolves `candidate`, then hands `url` to the downloader.
    async fn enqueue_resolved_download(
        &self,
        candidate: String,
        url: String,
        dry_run: bool,
    ) -> BatchOutcome {
        let persister = self.persister();
        let downloader = Arc::clone(&self.downloader);
        let destination = self.destination.clone();
        let destination_rel = self.destination_rel.clone();
        let policy = self.config.on_collision;

        let result = tokio::task::spawn_blocking(move || {
            let resolved = conflict::resolve(&candidate, &destination, policy, dry_run)?;
            Ok(persister.download(downloader.as_ref(), &url, &destination_rel, &resolved, dry_run))
        })
        .await;
        outcome_from(result)
    }

    async fn handle_multiple(
        &self,
        request: &ShareRequest,
        declared: &str,
        dry_run: bool,
    ) -> BatchOutcome {
        if request.items.is_empty() {
            tracing::info!("multiple share carries no stream items");
            return BatchOutcome::failed(None);
        }

        let mode = self.sanitize_mode();
        let policy = self.config.on_collision;
        let mut outcomes: Vec<SaveOutcome> = Vec::with_capacity(request.items.len());
        let mut first_message = None;
        let mut join_set = tokio::task::JoinSet::new();

        // Filenames resolve sequentially so each item's existence check sees
        // the filesystem as earlier items left it; the copies themselves run
        // concurrently and are joined below.
        for item in &request.items {
            let resolved = {
                let item = Arc::clone(item);
                let declared = declared.to_string();
                let destination = self.destination.clone();
                tokio::task::spawn_blocking(move || {
                    let candidate = filename::derive(&stream_name(&item), &declared, mode);
                    conflict::resolve(&candidate, &destination, policy, dry_run)
                })
                .await
            };

            match resolved {
                Ok(Ok(name)) => {
                    let persister = self.persister();
                    let item = Arc::clone(item);
                    let dest = self.destination.join(name);
                    join_set.spawn_blocking(move || persister.copy(&item, &dest, dry_run));
                }
                Ok(Err(e)) => {
                    tracing::warn!("item {} aborted: {e}", item.reference());
                    if first_message.is_none() {
                        first_message = e.message_code();
                    }
                    outcomes.push(SaveOutcome::Failed);
                }
                Err(e) => {
                    tracing::error!("resolve task join: {e}");
                    outcomes.push(SaveOutcome::Failed);
                }
            }
        }

        while let Some(res) = join_set.join_next().await {
            outcomes.push(res.unwrap_or_else(|e| {
                tracing::error!("persist task join: {e}");
                SaveOutcome::Failed
            }));
        }

        BatchOutcome {
            outcome: batch::aggregate(&outcomes),
            message: first_message,
            content_type: None,
        }
    }
}

/// Derivation + resolution + copy for one stream payload.
fn persist_stream(
    persister: &Persister,
    item: &PayloadRef,
    declared: &str,
    mode: SanitizeMode,
    destination: &Path,
    policy: ConflictPolicy,
    dry_run: bool,
) -> Result<SaveOutcome, SaveError> {
    let candidate = filename::derive(&stream_name(item), declared, mode);
    let resolved = conflict::resolve(&candidate, destination, policy, dry_run)?;
    Ok(persister.copy(item, &destination.join(resolved), dry_run))
}

/// Last non-empty path segment of a URL, when it has one.
fn last_url_segment(url: &url::Url) -> Option<String> {
    url.path_segments()?
        .filter(|s| !s.is_empty())
        .last()
        .map(str::to_string)
}

/// Raw filename candidate for a stream payload: its display name when the
/// producer supplied one, else the last segment of its reference.
fn stream_name(item: &PayloadRef) -> String {
    match item.display_name() {
        Some(name) => name.to_string(),
        None => item
            .reference()
            .rsplit('/')
            .next()
            .unwrap_or_else(|| item.reference())
            .to_string(),
    }
}

fn outcome_from(
    result: Result<Result<SaveOutcome, SaveError>, tokio::task::JoinError>,
) -> BatchOutcome {
    match result {
        Ok(Ok(outcome)) => BatchOutcome::from_outcome(outcome),
        Ok(Err(e)) => {
            tracing::warn!("item aborted: {e}");
            BatchOutcome::from_error(&e)
        }
        Err(e) => {
            tracing::error!("persist task join: {e}");
            BatchOutcome::failed(None)
        }
    }
}
