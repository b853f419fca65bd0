//! Ошибки combat ядра
//!
//! Fatal-классы (startup, configuration, precondition) - это ошибки.
//! Ожидаемые no-op исходы (неизвестное оружие, restriction, пустой sweep)
//! ошибками НЕ являются, см. `AttackOutcome`.

use bevy::prelude::Entity;
use std::path::PathBuf;
use thiserror::Error;

/// Ошибки загрузки и регистрации weapon definitions
#[derive(Error, Debug)]
pub enum RegistryError {
    /// Источник определений недоступен (нет папки Weapons и т.п.)
    #[error("Weapon definition source unavailable: {0}")]
    SourceUnavailable(String),

    /// Имя уже занято (сравнение без учёта регистра)
    #[error("Weapon with name \"{0}\" already exists")]
    DuplicateWeapon(String),

    #[error("Failed to read weapon definition {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid weapon definition {}: {message}", path.display())]
    InvalidDefinition { path: PathBuf, message: String },

    #[error("Weapon \"{weapon}\" references unknown attack behavior \"{behavior}\"")]
    UnknownBehavior { weapon: String, behavior: String },
}

/// Fatal precondition для server атаки
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttackError {
    #[error("Could not find root frame on actor {0:?}")]
    MissingRootFrame(Entity),

    #[error("Could not find controller on actor {0:?}")]
    MissingController(Entity),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("RON error: {0}")]
    Ron(#[from] ron::error::SpannedError),
}
