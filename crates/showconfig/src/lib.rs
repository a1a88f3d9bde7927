use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Presentation described by `goldleaf.toml`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ShowConfig {
    pub version: u32,
    /// Background frames in scroll order.
    #[serde(default)]
    pub images: Vec<PathBuf>,
    /// Document height in viewport heights; defaults to one page per image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pages: Option<f32>,
    #[serde(default)]
    pub window: WindowSettings,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct WindowSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    /// Frame-rate cap; 0 or absent renders every frame.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fps: Option<f32>,
    /// Constrained viewports (phones, tiny windows) skip the shader overlay.
    #[serde(default)]
    pub constrained: bool,
}

impl ShowConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let raw: ShowConfig = toml::from_str(input)?;
        raw.validate()?;
        Ok(raw)
    }

    /// Loads a config file and resolves relative image paths against the
    /// directory that contains it.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let input = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml_str(&input)?;
        if let Some(base) = path.parent() {
            config.resolve_relative_to(base);
        }
        Ok(config)
    }

    pub fn resolve_relative_to(&mut self, base: &Path) {
        for image in &mut self.images {
            if image.is_relative() {
                *image = base.join(&*image);
            }
        }
    }

    pub fn pages(&self) -> f32 {
        self.pages
            .unwrap_or(self.images.len().max(1) as f32)
            .max(1.0)
    }

    pub fn target_fps(&self) -> Option<f32> {
        self.window.fps.filter(|fps| *fps > 0.0)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != 1 {
            return Err(ConfigError::Invalid(format!(
                "unsupported config version {}; expected 1",
                self.version
            )));
        }

        if self.images.is_empty() {
            return Err(ConfigError::Invalid(
                "config must list at least one image".into(),
            ));
        }

        for image in &self.images {
            if image.as_os_str().is_empty() {
                return Err(ConfigError::Invalid("image paths may not be empty".into()));
            }
        }

        if let Some(pages) = self.pages {
            if !pages.is_finite() || pages < 1.0 {
                return Err(ConfigError::Invalid(format!(
                    "pages must be at least 1 (got {pages})"
                )));
            }
        }

        if self.window.width == Some(0) || self.window.height == Some(0) {
            return Err(ConfigError::Invalid(
                "window dimensions must be greater than zero".into(),
            ));
        }

        if let Some(fps) = self.window.fps {
            if fps < 0.0 {
                return Err(ConfigError::Invalid("window.fps must be >= 0".into()));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SAMPLE: &str = r#"
version = 1
images = ["images/01.jpg", "images/02.jpg", "/srv/art/03.jpg"]

[window]
width = 1280
height = 720
fps = 0
"#;

    #[test]
    fn parses_sample_config() {
        let config = ShowConfig::from_toml_str(SAMPLE).expect("parse config");
        assert_eq!(config.version, 1);
        assert_eq!(config.images.len(), 3);
        assert_eq!(config.window.width, Some(1280));
        assert!(!config.window.constrained);
        assert_eq!(config.pages(), 3.0);
    }

    #[test]
    fn zero_fps_treated_as_uncapped() {
        let config = ShowConfig::from_toml_str(SAMPLE).unwrap();
        assert_eq!(config.target_fps(), None);
    }

    #[test]
    fn rejects_empty_image_list() {
        let err = ShowConfig::from_toml_str("version = 1\nimages = []\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_unknown_version() {
        let err = ShowConfig::from_toml_str("version = 2\nimages = [\"a.jpg\"]\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_short_document() {
        let err =
            ShowConfig::from_toml_str("version = 1\nimages = [\"a.jpg\"]\npages = 0.5\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn reports_parse_errors() {
        let err = ShowConfig::from_toml_str("version = \"one\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn load_resolves_relative_images() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("goldleaf.toml");
        std::fs::write(&path, SAMPLE).unwrap();

        let config = ShowConfig::load(&path).expect("load config");
        assert_eq!(config.images[0], dir.path().join("images/01.jpg"));
        assert_eq!(config.images[2], PathBuf::from("/srv/art/03.jpg"));
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = ShowConfig::load(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
