//! CLI subcommand implementations.

mod locations;
mod probe;
mod save;

pub use locations::run_locations;
pub use probe::run_probe;
pub use save::run_save;

use anyhow::{bail, Context, Result};
use std::path::PathBuf;
use std::sync::Arc;

use dropsink_core::classify::Saver;
use dropsink_core::config::DropsinkConfig;
use dropsink_core::content_type::{ContentTypeProbe, HttpContentTypeProbe};
use dropsink_core::download::{Downloader, SpoolDownloader};
use dropsink_core::location::{LocationProvider, RootedLocations};
use dropsink_core::media_index::{MediaIndex, NullMediaIndex};
use dropsink_core::request::{FilePayload, PayloadRef, ShareRequest};

use super::PayloadArgs;

/// Builds a ShareRequest from the payload arguments: N paths make a
/// multi-item batch, one path a single stream, `--text` alone a text/URL
/// share.
pub(crate) fn build_request(args: &PayloadArgs) -> Result<ShareRequest> {
    if !args.paths.is_empty() {
        let mime = match &args.mime {
            Some(m) => m.clone(),
            None => mime_guess::from_path(&args.paths[0])
                .first()
                .map(|m| m.essence_str().to_string())
                .unwrap_or_else(|| "application/octet-stream".to_string()),
        };

        let mut items: Vec<PayloadRef> = Vec::with_capacity(args.paths.len());
        for path in &args.paths {
            let mut payload = FilePayload::new(path);
            if let Some(name) = path.file_name() {
                payload = payload.with_display_name(name.to_string_lossy());
            }
            items.push(Arc::new(payload));
        }

        let mut request = if items.len() > 1 {
            ShareRequest::multiple(mime, items)
        } else {
            ShareRequest::single(mime, items.remove(0))
        };
        if let Some(subject) = &args.subject {
            request = request.with_subject(subject);
        }
        return Ok(request);
    }

    if let Some(text) = &args.text {
        let mime = args.mime.clone().unwrap_or_else(|| "text/plain".to_string());
        let mut request = ShareRequest::text(mime, text);
        if let Some(subject) = &args.subject {
            request = request.with_subject(subject);
        }
        return Ok(request);
    }

    bail!("nothing to save: pass file paths or --text");
}

/// Selects the destination location: auto when exactly one candidate is
/// configured, `--location` when several are. Returns the resolved
/// directory and its root-relative form.
pub(crate) fn select_destination(
    cfg: &DropsinkConfig,
    chosen: Option<&str>,
) -> Result<(PathBuf, PathBuf)> {
    let provider = RootedLocations::new(cfg.root.clone(), cfg.locations.clone());
    let candidates = provider.list_candidates();

    let name = match chosen {
        Some(n) => {
            if !candidates.iter().any(|c| c == n) {
                bail!("unknown location {n:?}; see `dropsink locations`");
            }
            n.to_string()
        }
        None => match candidates.len() {
            0 => bail!("no destination locations configured"),
            1 => candidates[0].clone(),
            _ => bail!("several locations configured; pass --location (see `dropsink locations`)"),
        },
    };

    let destination = provider.resolve_chosen(&name);
    let destination_rel = provider.strip_root(&destination);
    Ok((destination, destination_rel))
}

pub(crate) fn build_saver(
    cfg: &DropsinkConfig,
    destination: PathBuf,
    destination_rel: PathBuf,
) -> Result<Saver> {
    let downloader: Arc<dyn Downloader> =
        Arc::new(SpoolDownloader::open_default().context("open download spool")?);
    let media_index: Arc<dyn MediaIndex> = Arc::new(NullMediaIndex);
    let probe: Arc<dyn ContentTypeProbe> = Arc::new(HttpContentTypeProbe);

    Ok(Saver::new(
        cfg.clone(),
        destination,
        destination_rel,
        downloader,
        media_index,
        probe,
    ))
}

/// Diagnostic block for unsupported payloads, in place of the original's
/// support-request screen.
pub(crate) fn print_unsupported(request: &ShareRequest, content_type: Option<&str>) {
    eprintln!("This payload is not supported.");
    eprintln!("  action: {:?}", request.action);
    eprintln!(
        "  declared type: {}",
        request.declared_mime.as_deref().unwrap_or("(none)")
    );
    eprintln!("  stream items: {}", request.items.len());
    if let Some(text) = &request.text {
        eprintln!("  text: {}", excerpt(text));
    }
    if let Some(subject) = &request.subject {
        eprintln!("  subject: {}", excerpt(subject));
    }
    if let Some(content_type) = content_type {
        eprintln!("  probed content type: {content_type}");
    }
}

fn excerpt(s: &str) -> String {
    const MAX: usize = 120;
    if s.chars().count() <= MAX {
        s.to_string()
    } else {
        let head: String = s.chars().take(MAX).collect();
        format!("{head}...")
    }
}
