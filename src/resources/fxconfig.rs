//! Effect engine configuration.
//!
//! Defaults for surfaces, the ticker, motion tuning, asset lookup and the
//! loading safety net, optionally read from an INI file. Per-effect
//! descriptors start from these values.
//!
//! # Configuration File Format
//!
//! ```ini
//! [surface]
//! width = 800
//! height = 600
//! background_alpha = 0.0
//!
//! [ticker]
//! target_fps = 60
//!
//! [motion]
//! step = 5.0
//! left_boundary = 0.35
//! right_boundary = 0.65
//!
//! [assets]
//! root = ./public
//! padding = 1
//!
//! [loading]
//! ready_timeout_ms = 3000
//! ```

use configparser::ini::Ini;
use log::info;
use std::path::PathBuf;

use crate::resources::ticktime::TickTime;

const DEFAULT_SURFACE_WIDTH: u32 = 800;
const DEFAULT_SURFACE_HEIGHT: u32 = 600;
const DEFAULT_BACKGROUND_ALPHA: f32 = 0.0;
const DEFAULT_TARGET_FPS: u32 = 60;
const DEFAULT_STEP: f32 = 5.0;
const DEFAULT_LEFT_BOUNDARY: f32 = 0.35;
const DEFAULT_RIGHT_BOUNDARY: f32 = 0.65;
const DEFAULT_ASSET_ROOT: &str = "./public";
const DEFAULT_SHEET_PADDING: u32 = 1;
const DEFAULT_READY_TIMEOUT_MS: u64 = 3000;
const DEFAULT_CONFIG_PATH: &str = "./battlefx.ini";

#[derive(Debug, Clone, PartialEq)]
pub struct FxConfig {
    pub surface_width: u32,
    pub surface_height: u32,
    /// 0.0 is a fully transparent background.
    pub background_alpha: f32,
    pub target_fps: u32,
    /// Pixels per tick for moving effects.
    pub step: f32,
    /// Fraction of the surface width.
    pub left_boundary: f32,
    /// Fraction of the surface width.
    pub right_boundary: f32,
    pub asset_root: PathBuf,
    /// Inset used when slicing character sprite sheets.
    pub sheet_padding: u32,
    pub ready_timeout_ms: u64,
    pub config_path: PathBuf,
}

impl Default for FxConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl FxConfig {
    pub fn new() -> Self {
        Self {
            surface_width: DEFAULT_SURFACE_WIDTH,
            surface_height: DEFAULT_SURFACE_HEIGHT,
            background_alpha: DEFAULT_BACKGROUND_ALPHA,
            target_fps: DEFAULT_TARGET_FPS,
            step: DEFAULT_STEP,
            left_boundary: DEFAULT_LEFT_BOUNDARY,
            right_boundary: DEFAULT_RIGHT_BOUNDARY,
            asset_root: PathBuf::from(DEFAULT_ASSET_ROOT),
            sheet_padding: DEFAULT_SHEET_PADDING,
            ready_timeout_ms: DEFAULT_READY_TIMEOUT_MS,
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            ..Self::new()
        }
    }

    /// Load configuration from the INI file.
    ///
    /// Missing or malformed values retain their current values.
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(&mut self) -> Result<(), String> {
        let mut config = Ini::new();
        config
            .load(&self.config_path)
            .map_err(|e| format!("Failed to load config file: {}", e))?;

        // [surface]
        if let Some(width) = config.getuint("surface", "width").ok().flatten() {
            self.surface_width = width as u32;
        }
        if let Some(height) = config.getuint("surface", "height").ok().flatten() {
            self.surface_height = height as u32;
        }
        if let Some(alpha) = config.getfloat("surface", "background_alpha").ok().flatten() {
            self.background_alpha = (alpha as f32).clamp(0.0, 1.0);
        }

        // [ticker]
        if let Some(fps) = config.getuint("ticker", "target_fps").ok().flatten() {
            self.target_fps = (fps as u32).max(1);
        }

        // [motion]
        if let Some(step) = config.getfloat("motion", "step").ok().flatten() {
            self.step = step as f32;
        }
        if let Some(left) = config.getfloat("motion", "left_boundary").ok().flatten() {
            self.left_boundary = left as f32;
        }
        if let Some(right) = config.getfloat("motion", "right_boundary").ok().flatten() {
            self.right_boundary = right as f32;
        }

        // [assets]
        if let Some(root) = config.get("assets", "root") {
            self.asset_root = PathBuf::from(root);
        }
        if let Some(padding) = config.getuint("assets", "padding").ok().flatten() {
            self.sheet_padding = padding as u32;
        }

        // [loading]
        if let Some(timeout) = config.getuint("loading", "ready_timeout_ms").ok().flatten() {
            self.ready_timeout_ms = timeout;
        }

        info!(
            "Loaded config: {}x{} surface, fps={}, step={}, boundaries={}..{}, assets={:?}",
            self.surface_width,
            self.surface_height,
            self.target_fps,
            self.step,
            self.left_boundary,
            self.right_boundary,
            self.asset_root
        );

        Ok(())
    }

    /// Save configuration to the INI file.
    pub fn save_to_file(&self) -> Result<(), String> {
        let mut config = Ini::new();

        config.set("surface", "width", Some(self.surface_width.to_string()));
        config.set("surface", "height", Some(self.surface_height.to_string()));
        config.set(
            "surface",
            "background_alpha",
            Some(self.background_alpha.to_string()),
        );
        config.set("ticker", "target_fps", Some(self.target_fps.to_string()));
        config.set("motion", "step", Some(self.step.to_string()));
        config.set(
            "motion",
            "left_boundary",
            Some(self.left_boundary.to_string()),
        );
        config.set(
            "motion",
            "right_boundary",
            Some(self.right_boundary.to_string()),
        );
        config.set(
            "assets",
            "root",
            Some(self.asset_root.display().to_string()),
        );
        config.set("assets", "padding", Some(self.sheet_padding.to_string()));
        config.set(
            "loading",
            "ready_timeout_ms",
            Some(self.ready_timeout_ms.to_string()),
        );

        config
            .write(&self.config_path)
            .map_err(|e| format!("Failed to save config file: {}", e))?;

        info!("Saved config to {:?}", self.config_path);

        Ok(())
    }

    /// The loading safety net expressed in ticks.
    pub fn ready_timeout_ticks(&self) -> u64 {
        TickTime::ticks_for_millis(self.ready_timeout_ms, self.target_fps)
    }

    pub fn surface_size(&self) -> (u32, u32) {
        (self.surface_width, self.surface_height)
    }
}
