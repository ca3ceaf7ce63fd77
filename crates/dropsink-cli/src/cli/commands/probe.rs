//! `dropsink probe` – capability check without saving.

use anyhow::{bail, Result};

use dropsink_core::config::DropsinkConfig;

use super::{build_request, build_saver, print_unsupported, select_destination};
use crate::cli::PayloadArgs;

pub async fn run_probe(
    cfg: &DropsinkConfig,
    payload: &PayloadArgs,
    location: Option<&str>,
) -> Result<()> {
    let request = build_request(payload)?;
    let (destination, destination_rel) = select_destination(cfg, location)?;
    let saver = build_saver(cfg, destination, destination_rel)?;

    if saver.probe_support(&request).await {
        println!("supported");
        Ok(())
    } else {
        print_unsupported(&request, None);
        bail!("payload not supported");
    }
}
