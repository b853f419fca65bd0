//! Definition providers - откуда registry берёт weapon definitions
//!
//! - `StaticProvider`: готовый список (тесты, hardcoded наборы)
//! - `RonDirectoryProvider`: папка `Weapons` с RON файлами (по файлу на оружие)

use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::behavior::BehaviorCatalog;
use super::definition::{WeaponDefinition, WeaponSpec};
use crate::config::DEFAULT_WEAPON_FOLDER;
use crate::error::RegistryError;
use crate::logger::log;

/// Источник weapon definitions (опрашивается один раз при старте)
pub trait DefinitionProvider {
    fn fetch(&self) -> Result<Vec<WeaponDefinition>, RegistryError>;
}

/// Provider поверх готового списка
#[derive(Debug, Clone, Default)]
pub struct StaticProvider {
    definitions: Vec<WeaponDefinition>,
}

impl StaticProvider {
    pub fn new(definitions: Vec<WeaponDefinition>) -> Self {
        Self { definitions }
    }
}

impl DefinitionProvider for StaticProvider {
    fn fetch(&self) -> Result<Vec<WeaponDefinition>, RegistryError> {
        Ok(self.definitions.clone())
    }
}

/// Provider поверх директории с RON файлами
///
/// Ищет первую папку с именем `folder_name` внутри `root` (depth-first,
/// имена по алфавиту, сам `root` тоже кандидат) и грузит все `*.ron`
/// из неё и вложенных папок.
#[derive(Debug, Clone)]
pub struct RonDirectoryProvider {
    root: PathBuf,
    folder_name: String,
    catalog: BehaviorCatalog,
}

impl RonDirectoryProvider {
    pub fn new(root: impl Into<PathBuf>, folder_name: impl Into<String>, catalog: BehaviorCatalog) -> Self {
        Self {
            root: root.into(),
            folder_name: folder_name.into(),
            catalog,
        }
    }

    /// Папка `Weapons` + встроенный каталог поведений
    pub fn with_defaults(root: impl Into<PathBuf>) -> Self {
        Self::new(root, DEFAULT_WEAPON_FOLDER, BehaviorCatalog::new())
    }

    pub fn locate_folder(&self) -> Result<PathBuf, RegistryError> {
        WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_dir())
            .find(|entry| entry.file_name().to_str() == Some(self.folder_name.as_str()))
            .map(|entry| entry.into_path())
            .ok_or_else(|| {
                RegistryError::SourceUnavailable(format!(
                    "no folder named \"{}\" found under {}",
                    self.folder_name,
                    self.root.display()
                ))
            })
    }

    fn load_file(&self, path: &Path) -> Result<WeaponDefinition, RegistryError> {
        let content = fs::read_to_string(path).map_err(|source| RegistryError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let spec: WeaponSpec = ron::from_str(&content).map_err(|e| RegistryError::InvalidDefinition {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        spec.into_definition(&self.catalog)
    }
}

impl DefinitionProvider for RonDirectoryProvider {
    fn fetch(&self) -> Result<Vec<WeaponDefinition>, RegistryError> {
        let folder = self.locate_folder()?;
        log(&format!("RonDirectoryProvider: loading weapons from {}", folder.display()));

        let mut definitions = Vec::new();
        for entry in WalkDir::new(&folder).sort_by_file_name() {
            let entry = entry.map_err(|e| RegistryError::SourceUnavailable(e.to_string()))?;
            let path = entry.path();

            let is_ron = entry.file_type().is_file()
                && path
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .map(|ext| ext.eq_ignore_ascii_case("ron"))
                    .unwrap_or(false);
            if !is_ron {
                continue;
            }

            definitions.push(self.load_file(path)?);
        }

        Ok(definitions)
    }
}
