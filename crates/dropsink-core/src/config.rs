use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// What to do when the derived filename already exists at the destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictPolicy {
    /// Delete the existing file and reuse its name.
    Overwrite,
    /// Abort the item.
    Skip,
    /// Insert a counter before the extension until a free name is found.
    #[default]
    Postfix,
    /// Ask the user for a new name. Reserved; rejected at config load.
    Request,
}

/// Global configuration loaded from `~/.config/dropsink/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DropsinkConfig {
    /// Save even when the payload cannot be positively classified.
    #[serde(default)]
    pub force_saving: bool,
    /// Register saved files with the media index collaborator.
    #[serde(default)]
    pub register_media_index: bool,
    /// Strip only control characters from filenames instead of applying the
    /// strict allow-list.
    #[serde(default)]
    pub lenient_filenames: bool,
    /// Collision policy for existing destination files.
    #[serde(default)]
    pub on_collision: ConflictPolicy,
    /// Destination root. All candidate locations live under it.
    pub root: PathBuf,
    /// Candidate destination folders under `root`. A blank entry means the
    /// root itself.
    #[serde(default = "default_locations")]
    pub locations: Vec<String>,
}

fn default_locations() -> Vec<String> {
    vec![String::new()]
}

impl Default for DropsinkConfig {
    fn default() -> Self {
        Self {
            force_saving: false,
            register_media_index: false,
            lenient_filenames: false,
            on_collision: ConflictPolicy::default(),
            root: std::env::var_os("HOME")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".")),
            locations: default_locations(),
        }
    }
}

impl DropsinkConfig {
    /// Rejects configurations the pipeline cannot honor.
    pub fn validate(&self) -> Result<()> {
        if self.on_collision == ConflictPolicy::Request {
            bail!("on_collision = \"request\" is not implemented; use overwrite, skip, or postfix");
        }
        Ok(())
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("dropsink")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<DropsinkConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = DropsinkConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: DropsinkConfig = toml::from_str(&data)?;
    cfg.validate()?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = DropsinkConfig::default();
        assert!(!cfg.force_saving);
        assert!(!cfg.register_media_index);
        assert!(!cfg.lenient_filenames);
        assert_eq!(cfg.on_collision, ConflictPolicy::Postfix);
        assert_eq!(cfg.locations, vec![String::new()]);
    }

    #[test]
    fn config_toml_roundtrip() {
        let cfg = DropsinkConfig::default();
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed: DropsinkConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.force_saving, cfg.force_saving);
        assert_eq!(parsed.on_collision, cfg.on_collision);
        assert_eq!(parsed.root, cfg.root);
        assert_eq!(parsed.locations, cfg.locations);
    }

    #[test]
    fn config_toml_custom_values() {
        let toml = r#"
            force_saving = true
            lenient_filenames = true
            on_collision = "skip"
            root = "/srv/inbox"
            locations = ["", "Pictures", "Documents"]
        "#;
        let cfg: DropsinkConfig = toml::from_str(toml).unwrap();
        assert!(cfg.force_saving);
        assert!(!cfg.register_media_index);
        assert!(cfg.lenient_filenames);
        assert_eq!(cfg.on_collision, ConflictPolicy::Skip);
        assert_eq!(cfg.root, PathBuf::from("/srv/inbox"));
        assert_eq!(cfg.locations.len(), 3);
    }

    #[test]
    fn config_toml_collision_policies() {
        for (text, policy) in [
            ("overwrite", ConflictPolicy::Overwrite),
            ("skip", ConflictPolicy::Skip),
            ("postfix", ConflictPolicy::Postfix),
            ("request", ConflictPolicy::Request),
        ] {
            let toml = format!("root = \"/tmp\"\non_collision = \"{text}\"");
            let cfg: DropsinkConfig = toml::from_str(&toml).unwrap();
            assert_eq!(cfg.on_collision, policy);
        }
    }

    #[test]
    fn validate_rejects_request_policy() {
        let cfg = DropsinkConfig {
            on_collision: ConflictPolicy::Request,
            ..DropsinkConfig::default()
        };
        assert!(cfg.validate().is_err());
        assert!(DropsinkConfig::default().validate().is_ok());
    }
}
