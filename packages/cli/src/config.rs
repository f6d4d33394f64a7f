use dossier_blocks::{AssetMode, Mode, RenderOptions};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_CONFIG_NAME: &str = "dossier.config.json";

/// Dossier configuration file format
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Options handed to the dispatch table and renderers
    #[serde(default)]
    pub render: RenderOptions,

    /// Default log filter when RUST_LOG is unset (e.g. "info", "dossier_editor=debug")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log: Option<String>,
}

/// Command-line overrides for the loaded config
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub embed: bool,
    pub remote: bool,
    pub light_prose: bool,
}

impl Config {
    /// Load `explicit`, or the default config file in `cwd`
    pub fn load(cwd: &Path, explicit: Option<&Path>) -> anyhow::Result<Self> {
        match explicit {
            Some(path) => Self::load_from(path),
            None => Self::load_from(&cwd.join(DEFAULT_CONFIG_NAME)),
        }
    }

    /// Load config from an explicit path. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&content)
                .map_err(|e| anyhow::anyhow!("Invalid config {}: {}", path.display(), e))?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn render_options(&self, overrides: &Overrides) -> RenderOptions {
        let mut options = self.render.clone();
        if overrides.embed {
            options.mode = Mode::Embed;
        }
        if overrides.remote {
            options.assets = AssetMode::Remote;
        }
        if overrides.light_prose {
            options.is_light_prose = true;
        }
        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let json = r#"{
            "render": {
                "mode": "EMBED",
                "isOrg": true,
                "webUrl": "https://reports.example.com/r/1",
                "assets": "remote"
            },
            "log": "debug"
        }"#;

        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.render.mode, Mode::Embed);
        assert!(config.render.is_org);
        assert!(!config.render.is_light_prose);
        assert_eq!(config.render.web_url, "https://reports.example.com/r/1");
        assert_eq!(config.render.assets, AssetMode::Remote);
        assert_eq!(config.log.as_deref(), Some("debug"));
    }

    #[test]
    fn test_default_config() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.render.mode, Mode::View);
        assert_eq!(config.render.assets, AssetMode::Local);
    }

    #[test]
    fn test_missing_file_is_default() {
        let config = Config::load_from(Path::new("/nonexistent/dossier.config.json")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_flags_override_config() {
        let config = Config::default();
        let options = config.render_options(&Overrides {
            embed: true,
            remote: false,
            light_prose: true,
        });
        assert_eq!(options.mode, Mode::Embed);
        assert_eq!(options.assets, AssetMode::Local);
        assert!(options.is_light_prose);
    }
}
