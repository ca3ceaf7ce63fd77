//! `dropsink locations` – list configured destinations.

use anyhow::Result;

use dropsink_core::config::DropsinkConfig;
use dropsink_core::location::{LocationProvider, RootedLocations};

pub fn run_locations(cfg: &DropsinkConfig) -> Result<()> {
    let provider = RootedLocations::new(cfg.root.clone(), cfg.locations.clone());
    let candidates = provider.list_candidates();
    if candidates.is_empty() {
        println!("no locations configured");
        return Ok(());
    }

    for name in candidates {
        let shown = if name.is_empty() { "/" } else { name.as_str() };
        println!("{shown} -> {}", provider.resolve_chosen(&name).display());
    }
    Ok(())
}
