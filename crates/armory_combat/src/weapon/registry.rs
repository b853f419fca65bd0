//! WeaponRegistry - name → definition lookup table
//!
//! Write-once при старте (`load_all`), дальше только чтение.
//! Ключ = lower-case имя оружия; имена, отличающиеся только регистром, конфликтуют.
//! Не глобальный singleton: один экземпляр на контекст (client / server / тест),
//! передаётся по ссылке или живёт как `Resource`.

use bevy::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;

use super::definition::WeaponDefinition;
use super::provider::DefinitionProvider;
use crate::error::RegistryError;
use crate::logger::{log, log_info};

#[derive(Resource, Debug, Clone, Default)]
pub struct WeaponRegistry {
    weapons: HashMap<String, Arc<WeaponDefinition>>,
}

impl WeaponRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Собрать registry из provider'а (один запрос при старте)
    pub fn from_provider(provider: &dyn DefinitionProvider) -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        registry.load_all(provider)?;
        Ok(registry)
    }

    /// Загрузить все definitions из provider'а
    ///
    /// Всё или ничего: при duplicate (или ошибке provider'а) registry не меняется.
    /// Пустой provider - валидный случай.
    pub fn load_all(&mut self, provider: &dyn DefinitionProvider) -> Result<usize, RegistryError> {
        let definitions = provider.fetch()?;

        let mut staged = self.clone();
        for definition in definitions {
            staged.create(definition)?;
        }

        let loaded = staged.len() - self.len();
        *self = staged;

        log_info(&format!("WeaponRegistry: loaded {} weapon definitions", loaded));
        Ok(loaded)
    }

    /// Зарегистрировать definition
    ///
    /// Ошибка `DuplicateWeapon`, если имя (без учёта регистра) уже занято.
    pub fn create(&mut self, definition: WeaponDefinition) -> Result<(), RegistryError> {
        let key = definition.key();
        if self.weapons.contains_key(&key) {
            return Err(RegistryError::DuplicateWeapon(definition.name));
        }

        log(&format!(
            "WeaponRegistry: registered {:?} weapon \"{}\"",
            definition.kind(),
            definition.name
        ));
        self.weapons.insert(key, Arc::new(definition));
        Ok(())
    }

    /// Lookup без учёта регистра; неизвестное имя → None (не ошибка)
    pub fn get(&self, name: &str) -> Option<&WeaponDefinition> {
        self.weapons.get(&name.to_lowercase()).map(Arc::as_ref)
    }

    /// Shared handle на definition (для систем, которые держат его дольше borrow)
    pub fn get_shared(&self, name: &str) -> Option<Arc<WeaponDefinition>> {
        self.weapons.get(&name.to_lowercase()).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.weapons.contains_key(&name.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.weapons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weapons.is_empty()
    }

    /// Имена definitions (как записаны автором), отсортированы по ключу
    pub fn names(&self) -> Vec<&str> {
        let mut entries: Vec<_> = self.weapons.iter().collect();
        entries.sort_by(|(a, _), (b, _)| a.cmp(b));
        entries.into_iter().map(|(_, def)| def.name.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &WeaponDefinition> {
        self.weapons.values().map(Arc::as_ref)
    }
}
