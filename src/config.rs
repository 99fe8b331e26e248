//! Controller settings and their TOML persistence

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::controller::error::ControllerError;

const CONFIG_DIR: &str = ".vxcontroller";
const CONFIG_FILE: &str = "settings.toml";

/// Settings applied to every virtual controller handle
///
/// # Examples
///
/// ```rust
/// use vxcontroller::config::ControllerSettings;
///
/// // Skip the enumeration wait, e.g. against a simulated bus
/// let settings = ControllerSettings {
///     settle_delay_ms: 0,
///     ..ControllerSettings::default()
/// };
/// assert!(!settings.force_unplug_on_drop);
/// ```
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct ControllerSettings {
    /// Blocking wait after plug-in, in milliseconds
    ///
    /// The OS needs time to enumerate the new device before input written to
    /// it is observed. The driver exposes no ready signal.
    pub settle_delay_ms: u64,

    /// Detach with `UnPlugForce` instead of `UnPlug` when a handle is dropped
    pub force_unplug_on_drop: bool,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            settle_delay_ms: 500,
            force_unplug_on_drop: false,
        }
    }
}

impl ControllerSettings {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    /// `<home>/.vxcontroller/settings.toml`
    pub fn default_path() -> PathBuf {
        let mut path = dirs::home_dir().unwrap_or_else(|| {
            warn!("Could not determine home directory, using current directory");
            PathBuf::from(".")
        });
        path.push(CONFIG_DIR);
        path.push(CONFIG_FILE);
        path
    }

    /// Loads settings from the default path.
    pub fn load() -> Result<Self, ControllerError> {
        Self::load_from(Self::default_path())
    }

    /// Loads settings from `path`; a missing file yields the defaults.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ControllerError> {
        let path = path.as_ref();
        if !path.exists() {
            debug!("No settings at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| {
            ControllerError::Settings(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let settings = toml::from_str(&content).map_err(|e| {
            ControllerError::Settings(format!("Failed to parse {}: {}", path.display(), e))
        })?;

        info!("Loaded controller settings from {}", path.display());
        Ok(settings)
    }

    /// Writes settings to `path`, creating parent directories as needed.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<(), ControllerError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                ControllerError::Settings(format!(
                    "Failed to create {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| ControllerError::Settings(format!("Failed to serialize: {}", e)))?;
        fs::write(path, content).map_err(|e| {
            ControllerError::Settings(format!("Failed to write {}: {}", path.display(), e))
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn defaults_wait_half_a_second() {
        let settings = ControllerSettings::default();
        assert_eq!(settings.settle_delay(), Duration::from_millis(500));
        assert!(!settings.force_unplug_on_drop);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let settings = ControllerSettings::load_from(dir.path().join("absent.toml")).unwrap();
        assert_eq!(settings, ControllerSettings::default());
    }

    #[test]
    fn saved_settings_load_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE);
        let settings = ControllerSettings {
            settle_delay_ms: 250,
            force_unplug_on_drop: true,
        };

        settings.save_to(&path).unwrap();

        assert_eq!(ControllerSettings::load_from(&path).unwrap(), settings);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "force_unplug_on_drop = true\n").unwrap();

        let settings = ControllerSettings::load_from(&path).unwrap();
        assert_eq!(settings.settle_delay_ms, 500);
        assert!(settings.force_unplug_on_drop);
    }

    #[test]
    fn malformed_file_is_a_settings_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "settle_delay_ms = \"soon\"\n").unwrap();

        assert!(matches!(
            ControllerSettings::load_from(&path),
            Err(ControllerError::Settings(_))
        ));
    }

    #[test]
    fn default_path_ends_in_settings_file() {
        let path = ControllerSettings::default_path();
        assert!(path.ends_with(Path::new(CONFIG_DIR).join(CONFIG_FILE)));
    }
}
