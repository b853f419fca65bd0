//! Attack behaviors - effect logic оружия
//!
//! Definition хранит только ссылку на поведение (`Arc<dyn AttackBehavior>`),
//! сама логика эффекта (урон, звук, projectile) живёт снаружи.
//! Поведение получает `Commands` и ставит эффекты в очередь; dispatcher
//! применяет очередь до возврата.

use bevy::prelude::*;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// В каком контексте выполняется атака
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub enum ExecutionContext {
    /// Локальное предсказание, без authority
    Client,
    /// Authoritative resolution (hit detection)
    Server,
}

/// Аргументы одного вызова поведения
#[derive(Debug, Clone, PartialEq)]
pub struct AttackContext {
    /// Кто атакует
    pub actor: Entity,
    /// Имя оружия как оно записано в definition (не lower-case ключ)
    pub weapon: String,
    pub context: ExecutionContext,
    /// Кандидат в цели из default sweep (только server, только без hitbox)
    pub target: Option<Entity>,
}

pub trait AttackBehavior: Send + Sync + 'static {
    fn execute(&self, commands: &mut Commands, attack: &AttackContext);

    /// Идентификатор для логов и Debug
    fn name(&self) -> &str {
        "custom"
    }
}

impl fmt::Debug for dyn AttackBehavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AttackBehavior({})", self.name())
    }
}

/// Ничего не делает (default для definitions без логики)
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopBehavior;

impl AttackBehavior for NoopBehavior {
    fn execute(&self, _commands: &mut Commands, _attack: &AttackContext) {}

    fn name(&self) -> &str {
        "noop"
    }
}

/// Event: поведение "announce" отработало
///
/// Downstream системы (damage, VFX, звук) подписываются на него.
#[derive(Event, Debug, Clone, PartialEq)]
pub struct AttackAnnounced {
    pub actor: Entity,
    pub weapon: String,
    pub context: ExecutionContext,
    pub target: Option<Entity>,
}

/// Шлёт `AttackAnnounced` (нужен зарегистрированный event, см. `WeaponPlugin`)
#[derive(Debug, Default, Clone, Copy)]
pub struct AnnounceBehavior;

impl AttackBehavior for AnnounceBehavior {
    fn execute(&self, commands: &mut Commands, attack: &AttackContext) {
        commands.send_event(AttackAnnounced {
            actor: attack.actor,
            weapon: attack.weapon.clone(),
            context: attack.context,
            target: attack.target,
        });
    }

    fn name(&self) -> &str {
        "announce"
    }
}

/// Поведение из замыкания
pub struct FnBehavior<F> {
    name: String,
    f: F,
}

impl<F> AttackBehavior for FnBehavior<F>
where
    F: Fn(&mut Commands, &AttackContext) + Send + Sync + 'static,
{
    fn execute(&self, commands: &mut Commands, attack: &AttackContext) {
        (self.f)(commands, attack);
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Обернуть замыкание в `Arc<dyn AttackBehavior>`
pub fn behavior_fn<F>(name: impl Into<String>, f: F) -> Arc<dyn AttackBehavior>
where
    F: Fn(&mut Commands, &AttackContext) + Send + Sync + 'static,
{
    Arc::new(FnBehavior {
        name: name.into(),
        f,
    })
}

/// Каталог поведений по строковому id (для definitions из RON)
///
/// Ключи lower-case, как и имена оружия.
#[derive(Clone)]
pub struct BehaviorCatalog {
    behaviors: HashMap<String, Arc<dyn AttackBehavior>>,
}

impl BehaviorCatalog {
    /// Каталог со встроенными "noop" и "announce"
    pub fn new() -> Self {
        let mut catalog = Self::empty();
        catalog.register("noop", Arc::new(NoopBehavior));
        catalog.register("announce", Arc::new(AnnounceBehavior));
        catalog
    }

    pub fn empty() -> Self {
        Self {
            behaviors: HashMap::new(),
        }
    }

    /// Зарегистрировать поведение; возвращает предыдущее с тем же id
    pub fn register(
        &mut self,
        id: &str,
        behavior: Arc<dyn AttackBehavior>,
    ) -> Option<Arc<dyn AttackBehavior>> {
        self.behaviors.insert(id.to_lowercase(), behavior)
    }

    pub fn get(&self, id: &str) -> Option<Arc<dyn AttackBehavior>> {
        self.behaviors.get(&id.to_lowercase()).cloned()
    }

    pub fn len(&self) -> usize {
        self.behaviors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.behaviors.is_empty()
    }
}

impl Default for BehaviorCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for BehaviorCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ids: Vec<_> = self.behaviors.keys().collect();
        ids.sort();
        f.debug_struct("BehaviorCatalog").field("behaviors", &ids).finish()
    }
}
