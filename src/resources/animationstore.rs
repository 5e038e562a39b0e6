//! Animation catalog.
//!
//! Named effect descriptors and character profiles, loaded from JSON or taken
//! from the built-in set. Lookups hand out clones so callers can tweak a
//! descriptor (direction, size) without touching the catalog.
//!
//! ```json
//! {
//!   "effects": {
//!     "fire": { "source": { "type": "motion", "name": "fire", "frame_count": 5 }, "moving": true }
//!   },
//!   "characters": {
//!     "classicCat": { "idle": { "sheet": "/game/classicCat/IdleCatt.png", "frame_width": 32, ... }, ... }
//!   }
//! }
//! ```

use std::path::Path;

use log::info;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::character::CharacterProfile;
use crate::effect::EffectConfig;
use crate::resources::framesource::FrameSource;

pub const CLASSIC_CAT: &str = "classicCat";

/// Built-in travelling motions: name and frame count.
const BUILTIN_MOTIONS: [(&str, u32); 3] = [("fire", 5), ("wind", 6), ("water", 6)];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnimationStore {
    #[serde(default)]
    pub effects: FxHashMap<String, EffectConfig>,
    #[serde(default)]
    pub characters: FxHashMap<String, CharacterProfile>,
}

impl AnimationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The stock catalog: the classic cat and the fire/wind/water motions.
    pub fn builtin() -> Self {
        let mut store = Self::new();
        for (name, frames) in BUILTIN_MOTIONS {
            store.effects.insert(
                name.to_string(),
                EffectConfig::new(FrameSource::motion(name, frames)).moving(true),
            );
        }
        store
            .characters
            .insert(CLASSIC_CAT.to_string(), CharacterProfile::classic_cat());
        store
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, String> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read catalog {}: {}", path.display(), e))?;
        let store = Self::from_json(&json)
            .map_err(|e| format!("Failed to parse catalog {}: {}", path.display(), e))?;
        info!(
            "Loaded catalog {}: {} effects, {} characters",
            path.display(),
            store.effects.len(),
            store.characters.len()
        );
        Ok(store)
    }

    /// Add or replace entries from `other`.
    pub fn merge(&mut self, other: AnimationStore) {
        self.effects.extend(other.effects);
        self.characters.extend(other.characters);
    }

    pub fn effect(&self, name: &str) -> Option<EffectConfig> {
        self.effects.get(name).cloned()
    }

    pub fn character(&self, name: &str) -> Option<CharacterProfile> {
        self.characters.get(name).cloned()
    }

    /// Effect names, sorted.
    pub fn effect_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.effects.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Character names, sorted.
    pub fn character_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.characters.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
