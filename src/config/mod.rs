//! Composer configuration, loaded from JSON.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::assets::decode::MAX_DESIGN_BYTES;
use crate::composer::interaction::InteractionLimits;
use crate::export::upload::DEFAULT_UPLOAD_ENDPOINT;
use crate::foundation::core::{Canvas, Point};
use crate::foundation::error::{MockupError, MockupResult};

/// Environment variable that overrides `upload.apiKey`.
pub const UPLOAD_API_KEY_ENV: &str = "MOCKUP_UPLOAD_API_KEY";

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ComposerConfig {
    /// Logical canvas size. Export PNGs are this size.
    pub canvas: Canvas,
    /// Front garment art. Relative paths resolve against the config file's directory.
    pub garment_base: Option<PathBuf>,
    /// Back garment art; the front art is used when absent.
    pub garment_base_back: Option<PathBuf>,
    /// Center of a freshly loaded design.
    pub design_origin: Point,
    /// Longer side of a freshly loaded design.
    pub initial_design_size: f64,
    pub min_design_size: f64,
    pub resize_handle_hit: f64,
    pub max_design_bytes: u64,
    pub upload: UploadConfig,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            canvas: Canvas::default(),
            garment_base: None,
            garment_base_back: None,
            design_origin: Point::new(150.0, 150.0),
            initial_design_size: 150.0,
            min_design_size: 10.0,
            resize_handle_hit: 10.0,
            max_design_bytes: MAX_DESIGN_BYTES,
            upload: UploadConfig::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UploadConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_UPLOAD_ENDPOINT.to_string(),
            api_key: None,
            timeout_secs: 30,
        }
    }
}

impl ComposerConfig {
    pub fn from_reader<R: std::io::Read>(r: R) -> MockupResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| MockupError::validation(format!("parse composer config JSON: {e}")))
    }

    /// Load, resolve relative asset paths, apply env overrides, then validate.
    pub fn from_path(path: impl AsRef<Path>) -> MockupResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            MockupError::validation(format!("open composer config '{}': {e}", path.display()))
        })?;
        let mut cfg = Self::from_reader(BufReader::new(f))?;
        let root = path.parent().unwrap_or_else(|| Path::new("."));
        cfg.resolve_paths(root);
        cfg.apply_env_overrides();
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn resolve_paths(&mut self, root: &Path) {
        for p in [&mut self.garment_base, &mut self.garment_base_back]
            .into_iter()
            .flatten()
        {
            if p.is_relative() {
                *p = root.join(&*p);
            }
        }
    }

    pub fn apply_env_overrides(&mut self) {
        if let Some(key) = std::env::var(UPLOAD_API_KEY_ENV)
            .ok()
            .filter(|k| !k.trim().is_empty())
        {
            self.upload.api_key = Some(key);
        }
    }

    pub fn validate(&self) -> MockupResult<()> {
        if self.canvas.width == 0 || self.canvas.height == 0 {
            return Err(MockupError::validation("canvas width/height must be > 0"));
        }
        let positive = |v: f64| v.is_finite() && v > 0.0;
        if !positive(self.initial_design_size) {
            return Err(MockupError::validation("initialDesignSize must be > 0"));
        }
        if !positive(self.min_design_size) {
            return Err(MockupError::validation("minDesignSize must be > 0"));
        }
        if self.min_design_size > self.initial_design_size {
            return Err(MockupError::validation(
                "minDesignSize must not exceed initialDesignSize",
            ));
        }
        if !positive(self.resize_handle_hit) {
            return Err(MockupError::validation("resizeHandleHit must be > 0"));
        }
        if !(self.design_origin.x.is_finite() && self.design_origin.y.is_finite()) {
            return Err(MockupError::validation("designOrigin must be finite"));
        }
        if self.max_design_bytes == 0 {
            return Err(MockupError::validation("maxDesignBytes must be > 0"));
        }
        if self.upload.endpoint.trim().is_empty() {
            return Err(MockupError::validation("upload.endpoint must be non-empty"));
        }
        if self.upload.timeout_secs == 0 {
            return Err(MockupError::validation("upload.timeoutSecs must be > 0"));
        }
        Ok(())
    }

    pub fn interaction_limits(&self) -> InteractionLimits {
        InteractionLimits {
            resize_handle_hit: self.resize_handle_hit,
            min_design_size: self.min_design_size,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/mod.rs"]
mod tests;
