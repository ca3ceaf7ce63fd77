//! `dropsink save` – run the full pipeline for a payload.

use anyhow::{bail, Result};

use dropsink_core::config::DropsinkConfig;
use dropsink_core::error::MessageCode;
use dropsink_core::persist::SaveOutcome;

use super::{build_request, build_saver, print_unsupported, select_destination};
use crate::cli::PayloadArgs;

pub async fn run_save(
    cfg: &DropsinkConfig,
    payload: &PayloadArgs,
    location: Option<&str>,
    dry_run: bool,
) -> Result<()> {
    let request = build_request(payload)?;
    let (destination, destination_rel) = select_destination(cfg, location)?;
    if !dry_run {
        std::fs::create_dir_all(&destination)?;
    }

    let saver = build_saver(cfg, destination.clone(), destination_rel)?;
    let result = saver.handle(&request, dry_run).await;

    match result.outcome {
        SaveOutcome::Succeeded if dry_run => {
            println!("Dry run OK; would save to {}", destination.display());
            Ok(())
        }
        SaveOutcome::Succeeded => {
            println!("Saved to {}", destination.display());
            Ok(())
        }
        SaveOutcome::Pending => {
            println!("Download queued for {}", destination.display());
            Ok(())
        }
        SaveOutcome::Failed => {
            if !result.supported() || result.content_type.is_some() {
                print_unsupported(&request, result.content_type.as_deref());
            }
            bail!("{}", describe(result.message));
        }
    }
}

fn describe(message: Option<MessageCode>) -> &'static str {
    match message {
        Some(MessageCode::FileExists) => "file already exists",
        Some(MessageCode::TooManyCollisions) => "too many name collisions",
        Some(MessageCode::ContentTypeUndetermined) => "could not determine content type",
        Some(MessageCode::Unsupported) => "payload not supported",
        None => "save failed",
    }
}
