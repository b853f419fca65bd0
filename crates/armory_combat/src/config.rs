//! Combat configuration (RON)
//!
//! Все поля опциональны в файле: отсутствующие берутся из `Default`.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;
use crate::logger::LogLevel;

/// Размер default hitbox (полный размер куба, не half extents)
pub const DEFAULT_HITBOX_SIZE: [f32; 3] = [5.0, 5.0, 5.0];

/// Имя папки с weapon definitions
pub const DEFAULT_WEAPON_FOLDER: &str = "Weapons";

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    /// Размер куба для default sweep (не зависит от range оружия)
    pub default_hitbox_size: [f32; 3],
    /// Папка, которую ищет `RonDirectoryProvider`
    pub weapon_folder: String,
    pub log_level: LogLevel,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            default_hitbox_size: DEFAULT_HITBOX_SIZE,
            weapon_folder: DEFAULT_WEAPON_FOLDER.to_string(),
            log_level: LogLevel::Debug,
        }
    }
}

impl CombatConfig {
    pub fn from_ron_str(content: &str) -> Result<Self, ConfigError> {
        Ok(ron::from_str(content)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_ron_str(&content)
    }

    pub fn hitbox_size(&self) -> Vec3 {
        Vec3::from_array(self.default_hitbox_size)
    }

    /// Half extents для sweep запроса
    pub fn hitbox_half_extents(&self) -> Vec3 {
        self.hitbox_size() * 0.5
    }
}
