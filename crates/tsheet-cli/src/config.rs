//! Settings loading.
//!
//! Sources, lowest to highest precedence: built-in defaults, the user
//! defaults file, an explicit `--config` file, the timesheet's front-matter,
//! and `TSHEET_*` environment variables.

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml, Yaml};
use tsheet_core::Settings;

/// Loads settings for one timesheet.
#[expect(
    clippy::result_large_err,
    reason = "figment::Error is large but only returned at startup"
)]
pub fn load_settings(
    config_path: Option<&Path>,
    front_matter: Option<&str>,
) -> Result<Settings, figment::Error> {
    let mut figment = Figment::from(Serialized::defaults(Settings::default()));

    if let Some(config_dir) = dirs_config_path() {
        figment = figment.merge(Toml::file(config_dir.join("config.toml")));
    }

    if let Some(path) = config_path {
        figment = figment.merge(Toml::file(path));
    }

    if let Some(yaml) = front_matter.filter(|y| !y.trim().is_empty()) {
        figment = figment.merge(Yaml::string(yaml));
    }

    figment = figment.merge(Env::prefixed("TSHEET_"));

    figment.extract()
}

/// Returns the platform-specific config directory for tsheet.
///
/// On Linux: `~/.config/tsheet`
pub fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("tsheet"))
}
