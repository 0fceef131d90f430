//! Configuration file handling for the galaxy greeting scene.
//!
//! The configuration lives in `config.toml` under the platform config
//! directory. Every field has a default, so a missing file or a partial
//! file both work.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use galaxy_core::{Memory, SceneSettings};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while reading or writing the configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("could not serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("no configuration directory available on this platform")]
    NoConfigDir,
}

/// Ambient soundtrack settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Soundtrack file, relative to the asset directory.
    pub path: PathBuf,
    /// Playback volume in `[0, 1]`.
    pub volume: f32,
    /// External player command. `{path}` and `{volume}` (0-100) are
    /// substituted. The player is expected to loop.
    pub player: Vec<String>,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("music.mp3"),
            volume: 0.3,
            player: [
                "ffplay", "-nodisp", "-loglevel", "quiet", "-loop", "0", "-volume", "{volume}",
                "{path}",
            ]
            .map(String::from)
            .to_vec(),
        }
    }
}

/// Screen capture settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordingConfig {
    /// Where captures are written. Defaults to the data directory.
    pub directory: Option<PathBuf>,
    /// Capture length in seconds.
    pub duration_secs: f32,
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            directory: None,
            duration_secs: 5.0,
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log file. Defaults to `galaxy.log` in the data directory.
    pub file: Option<PathBuf>,
    /// Filter used when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: None,
            level: "info".into(),
        }
    }
}

/// Texts shown by the overlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayText {
    pub intro_title: String,
    pub intro_hint: String,
    pub header: String,
    pub footer: String,
}

impl Default for OverlayText {
    fn default() -> Self {
        Self {
            intro_title: "ENTER GALAXY".into(),
            intro_hint: "Click to begin".into(),
            header: "MY LOVE".into(),
            footer: "DRAG TO EXPLORE • CLICK MEMORIES".into(),
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Time between frames in milliseconds.
    pub frame_interval_ms: u64,
    /// Base directory for memory images and the soundtrack.
    pub asset_dir: PathBuf,
    pub scene: SceneSettings,
    pub memories: Vec<Memory>,
    pub audio: AudioConfig,
    pub recording: RecordingConfig,
    pub logging: LoggingConfig,
    pub overlay: OverlayText,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            frame_interval_ms: 33,
            asset_dir: PathBuf::from("."),
            scene: SceneSettings::default(),
            memories: vec![
                Memory::new("cp-1.jpeg", "The night we first met"),
                Memory::new("cp-2.jpeg", "Our first trip together"),
                Memory::new("cp-3.jpeg", "Every day since"),
            ],
            audio: AudioConfig::default(),
            recording: RecordingConfig::default(),
            logging: LoggingConfig::default(),
            overlay: OverlayText::default(),
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "galaxy")
}

impl Config {
    /// Default location of the configuration file.
    pub fn path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Directory for logs and recordings.
    pub fn data_dir() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.data_local_dir().to_path_buf())
    }

    /// Load from the default location, falling back to defaults when the
    /// file does not exist.
    pub fn load() -> Result<Self, ConfigError> {
        match Self::path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load from `path`, falling back to defaults when it does not exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match fs::read_to_string(path) {
            Ok(contents) => Self::from_toml(&contents),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                log::debug!("no config at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Parse a configuration document.
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Write to the default location, creating parent directories.
    pub fn save(&self) -> Result<PathBuf, ConfigError> {
        let path = Self::path().ok_or(ConfigError::NoConfigDir)?;
        self.save_to(&path)?;
        Ok(path)
    }

    /// Write to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Resolve an asset path against [`Config::asset_dir`].
    pub fn asset_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.asset_dir.join(path)
        }
    }

    /// Where captures go.
    pub fn recording_dir(&self) -> PathBuf {
        self.recording
            .directory
            .clone()
            .or_else(|| Self::data_dir().map(|dir| dir.join("recordings")))
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Where the log goes, if anywhere.
    pub fn log_file(&self) -> Option<PathBuf> {
        self.logging
            .file
            .clone()
            .or_else(|| Self::data_dir().map(|dir| dir.join("galaxy.log")))
    }

    /// Frame interval with a floor of one millisecond.
    pub fn frame_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.frame_interval_ms.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_is_default() {
        assert_eq!(Config::from_toml("").unwrap(), Config::default());
    }

    #[test]
    fn test_partial_document() {
        let config = Config::from_toml(
            r#"
            frame_interval_ms = 16
            asset_dir = "/srv/galaxy"

            [scene]
            comet_count = 40

            [[memories]]
            image = "beach.png"
            message = "Sunset"

            [audio]
            volume = 0.5
            "#,
        )
        .unwrap();

        assert_eq!(config.frame_interval_ms, 16);
        assert_eq!(config.scene.comet_count, 40);
        assert_eq!(config.scene.shower_star_count, 20);
        assert_eq!(config.memories, vec![Memory::new("beach.png", "Sunset")]);
        assert_eq!(config.audio.volume, 0.5);
        assert_eq!(config.audio.path, PathBuf::from("music.mp3"));
        assert_eq!(
            config.asset_path(Path::new("beach.png")),
            PathBuf::from("/srv/galaxy/beach.png")
        );
        assert_eq!(
            config.asset_path(Path::new("/tmp/x.png")),
            PathBuf::from("/tmp/x.png")
        );
    }

    #[test]
    fn test_memory_without_message() {
        let config = Config::from_toml("[[memories]]\nimage = \"a.jpeg\"").unwrap();
        assert_eq!(config.memories[0].message, "");
    }

    #[test]
    fn test_invalid_document_is_error() {
        assert!(matches!(
            Config::from_toml("frame_interval_ms = \"fast\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = std::env::temp_dir().join(format!("galaxy-config-{}", std::process::id()));
        let path = dir.join("nested").join("config.toml");

        let mut config = Config::default();
        config.scene.comet_count = 7;
        config.recording.directory = Some(PathBuf::from("/tmp/caps"));
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.recording_dir(), PathBuf::from("/tmp/caps"));

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_missing_file_is_default() {
        let path = std::env::temp_dir().join("galaxy-config-does-not-exist.toml");
        assert_eq!(Config::load_from(&path).unwrap(), Config::default());
    }

    #[test]
    fn test_frame_interval_floor() {
        let config = Config {
            frame_interval_ms: 0,
            ..Config::default()
        };
        assert_eq!(config.frame_interval(), std::time::Duration::from_millis(1));
    }
}
