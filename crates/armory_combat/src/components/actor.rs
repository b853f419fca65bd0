//! Компоненты актора, которые читает combat ядро
//!
//! - `ActorMarkers`: активные маркеры состояния (stunned, blocking, ...)
//! - `Controller`: управляющий агент (humanoid-like), обязателен для server атаки
//! - `Transform`: root frame актора (origin и forward для default sweep)

use bevy::prelude::*;
use std::collections::HashMap;

/// Боец: актор, который может атаковать
///
/// Автоматически добавляет маркеры, controller и root frame через Required Components.
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
#[require(ActorMarkers, Controller, Transform)]
pub struct Combatant;

/// Управляющий агент актора (анимируемый controller)
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct Controller;

/// Маркеры состояния актора
///
/// Ключи хранятся в lower-case, значение - truthy флаг.
/// Маркер со значением `false` эквивалентен отсутствию маркера.
#[derive(Component, Debug, Clone, Default, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub struct ActorMarkers {
    markers: HashMap<String, bool>,
}

impl ActorMarkers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: выставить маркер в true
    pub fn with(mut self, tag: &str) -> Self {
        self.set(tag, true);
        self
    }

    pub fn set(&mut self, tag: &str, value: bool) {
        self.markers.insert(tag.to_lowercase(), value);
    }

    pub fn clear(&mut self, tag: &str) {
        self.markers.remove(&tag.to_lowercase());
    }

    pub fn has_marker(&self, tag: &str) -> bool {
        self.markers.get(&tag.to_lowercase()).copied().unwrap_or(false)
    }

    /// Активные (true) маркеры, отсортированы
    pub fn active(&self) -> Vec<&str> {
        let mut active: Vec<_> = self
            .markers
            .iter()
            .filter(|(_, value)| **value)
            .map(|(tag, _)| tag.as_str())
            .collect();
        active.sort_unstable();
        active
    }
}
