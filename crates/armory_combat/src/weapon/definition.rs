//! Weapon definitions - статические данные оружия
//!
//! # Архитектура
//!
//! **WeaponDefinition** - immutable blueprint одного оружия:
//! - общие stats (damage, range, timing, restrictions)
//! - `WeaponClass`: Melee { animations } / Ranged { projectile_model, animations }
//! - два attack behavior: client (prediction) и server (authoritative)
//!
//! **WeaponSpec** - та же definition в serde-форме (RON файл), где поведения
//! заданы строковыми id. Конвертируется через `BehaviorCatalog` при загрузке.
//!
//! После регистрации в `WeaponRegistry` definition не мутируется.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use super::behavior::{AttackBehavior, BehaviorCatalog, NoopBehavior};
use crate::error::RegistryError;

/// Тип оружия
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeaponKind {
    Melee,
    Ranged,
}

/// Timing параметры (passthrough: ядро их не применяет)
///
/// Cooldown/endlag enforcement - забота внешнего timing collaborator'а
/// или самого attack behavior.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WeaponTiming {
    /// Задержка после атаки (секунды)
    pub endlag: f32,
    /// Cooldown между атаками (секунды)
    pub cooldown: f32,
    /// Множитель скорости атаки
    pub attack_speed: Option<f32>,
}

/// M1 combo: шаг комбо → animation id
///
/// Порядок ключей = порядок комбо.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComboChain(BTreeMap<u32, String>);

impl ComboChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: добавить шаг (повторный шаг перезаписывает анимацию)
    pub fn with_step(mut self, step: u32, animation: impl Into<String>) -> Self {
        self.0.insert(step, animation.into());
        self
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn step(&self, step: u32) -> Option<&str> {
        self.0.get(&step).map(String::as_str)
    }

    pub fn first_step(&self) -> Option<u32> {
        self.0.keys().next().copied()
    }

    /// Следующий шаг комбо; после последнего - снова первый
    pub fn next_step(&self, current: u32) -> Option<u32> {
        self.0
            .range(current.saturating_add(1)..)
            .next()
            .map(|(step, _)| *step)
            .or_else(|| self.first_step())
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &str)> {
        self.0.iter().map(|(step, animation)| (*step, animation.as_str()))
    }
}

impl<S: Into<String>> FromIterator<(u32, S)> for ComboChain {
    fn from_iter<I: IntoIterator<Item = (u32, S)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(step, anim)| (step, anim.into())).collect())
    }
}

/// Анимации melee оружия
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MeleeAnimations {
    pub block: String,
    pub m1: ComboChain,
    #[serde(default)]
    pub m2: Option<String>,
    #[serde(default)]
    pub idle: Option<String>,
    #[serde(default)]
    pub walk: Option<String>,
    #[serde(default)]
    pub jump: Option<String>,
}

impl MeleeAnimations {
    pub fn new(block: impl Into<String>, m1: ComboChain) -> Self {
        Self {
            block: block.into(),
            m1,
            ..Default::default()
        }
    }
}

/// Анимации ranged оружия (как melee + обязательный reload)
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RangedAnimations {
    pub reload: String,
    pub block: String,
    pub m1: ComboChain,
    #[serde(default)]
    pub m2: Option<String>,
    #[serde(default)]
    pub idle: Option<String>,
    #[serde(default)]
    pub walk: Option<String>,
    #[serde(default)]
    pub jump: Option<String>,
}

impl RangedAnimations {
    pub fn new(reload: impl Into<String>, block: impl Into<String>, m1: ComboChain) -> Self {
        Self {
            reload: reload.into(),
            block: block.into(),
            m1,
            ..Default::default()
        }
    }
}

/// Kind-specific часть definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WeaponClass {
    Melee {
        animations: MeleeAnimations,
    },
    Ranged {
        projectile_model: String,
        animations: RangedAnimations,
    },
}

impl WeaponClass {
    pub fn kind(&self) -> WeaponKind {
        match self {
            WeaponClass::Melee { .. } => WeaponKind::Melee,
            WeaponClass::Ranged { .. } => WeaponKind::Ranged,
        }
    }

    pub fn block_animation(&self) -> &str {
        match self {
            WeaponClass::Melee { animations } => &animations.block,
            WeaponClass::Ranged { animations, .. } => &animations.block,
        }
    }

    pub fn m1(&self) -> &ComboChain {
        match self {
            WeaponClass::Melee { animations } => &animations.m1,
            WeaponClass::Ranged { animations, .. } => &animations.m1,
        }
    }

    /// Только у ranged
    pub fn reload_animation(&self) -> Option<&str> {
        match self {
            WeaponClass::Melee { .. } => None,
            WeaponClass::Ranged { animations, .. } => Some(&animations.reload),
        }
    }

    pub fn projectile_model(&self) -> Option<&str> {
        match self {
            WeaponClass::Melee { .. } => None,
            WeaponClass::Ranged {
                projectile_model, ..
            } => Some(projectile_model),
        }
    }
}

/// Immutable описание одного оружия
#[derive(Clone)]
pub struct WeaponDefinition {
    /// Имя (ключ registry = lower-case имя)
    pub name: String,
    pub damage: f32,
    /// Дистанция default sweep (если нет hitbox)
    pub range: f32,
    pub class: WeaponClass,
    pub timing: WeaponTiming,
    /// Pre-authored hitbox: оружие само делает hit detection
    pub hitbox: Option<String>,
    pub hitstun: Option<bool>,
    pub weapon_model: Option<String>,
    pub weapon_attributes: Vec<String>,
    /// Теги, которые (как маркеры на акторе) блокируют атаку
    pub attack_restrictions: Vec<String>,
    pub client_attack: Arc<dyn AttackBehavior>,
    pub server_attack: Arc<dyn AttackBehavior>,
}

impl WeaponDefinition {
    /// Melee оружие с no-op поведениями и нулевыми stats
    pub fn melee(name: impl Into<String>, animations: MeleeAnimations) -> Self {
        Self::with_class(name, WeaponClass::Melee { animations })
    }

    /// Ranged оружие с no-op поведениями и нулевыми stats
    pub fn ranged(
        name: impl Into<String>,
        projectile_model: impl Into<String>,
        animations: RangedAnimations,
    ) -> Self {
        Self::with_class(
            name,
            WeaponClass::Ranged {
                projectile_model: projectile_model.into(),
                animations,
            },
        )
    }

    fn with_class(name: impl Into<String>, class: WeaponClass) -> Self {
        Self {
            name: name.into(),
            damage: 0.0,
            range: 0.0,
            class,
            timing: WeaponTiming::default(),
            hitbox: None,
            hitstun: None,
            weapon_model: None,
            weapon_attributes: Vec::new(),
            attack_restrictions: Vec::new(),
            client_attack: Arc::new(NoopBehavior),
            server_attack: Arc::new(NoopBehavior),
        }
    }

    pub fn with_damage(mut self, damage: f32) -> Self {
        self.damage = damage;
        self
    }

    pub fn with_range(mut self, range: f32) -> Self {
        self.range = range;
        self
    }

    pub fn with_timing(mut self, timing: WeaponTiming) -> Self {
        self.timing = timing;
        self
    }

    pub fn with_hitbox(mut self, hitbox: impl Into<String>) -> Self {
        self.hitbox = Some(hitbox.into());
        self
    }

    pub fn with_hitstun(mut self, hitstun: bool) -> Self {
        self.hitstun = Some(hitstun);
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.weapon_model = Some(model.into());
        self
    }

    pub fn with_attributes<I, S>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.weapon_attributes = attributes.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_restrictions<I, S>(mut self, restrictions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attack_restrictions = restrictions.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_client_attack(mut self, behavior: Arc<dyn AttackBehavior>) -> Self {
        self.client_attack = behavior;
        self
    }

    pub fn with_server_attack(mut self, behavior: Arc<dyn AttackBehavior>) -> Self {
        self.server_attack = behavior;
        self
    }

    pub fn kind(&self) -> WeaponKind {
        self.class.kind()
    }

    /// Ключ в registry
    pub fn key(&self) -> String {
        self.name.to_lowercase()
    }

    pub fn has_hitbox(&self) -> bool {
        self.hitbox.is_some()
    }
}

impl fmt::Debug for WeaponDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeaponDefinition")
            .field("name", &self.name)
            .field("kind", &self.kind())
            .field("damage", &self.damage)
            .field("range", &self.range)
            .field("timing", &self.timing)
            .field("hitbox", &self.hitbox)
            .field("attack_restrictions", &self.attack_restrictions)
            .field("client_attack", &self.client_attack.name())
            .field("server_attack", &self.server_attack.name())
            .finish_non_exhaustive()
    }
}

/// Serde-форма definition (один RON файл = одно оружие)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaponSpec {
    pub name: String,
    pub damage: f32,
    pub range: f32,
    pub kind: WeaponClass,
    pub endlag: f32,
    pub cooldown: f32,
    #[serde(default)]
    pub attack_speed: Option<f32>,
    /// id поведения в `BehaviorCatalog`
    pub client_attack: String,
    pub server_attack: String,
    #[serde(default)]
    pub hitbox: Option<String>,
    #[serde(default)]
    pub hitstun: Option<bool>,
    #[serde(default)]
    pub weapon_model: Option<String>,
    #[serde(default)]
    pub weapon_attributes: Vec<String>,
    #[serde(default)]
    pub attack_restrictions: Vec<String>,
}

impl WeaponSpec {
    /// Разрешить id поведений и собрать definition
    pub fn into_definition(self, catalog: &BehaviorCatalog) -> Result<WeaponDefinition, RegistryError> {
        let resolve = |id: &str| {
            catalog.get(id).ok_or_else(|| RegistryError::UnknownBehavior {
                weapon: self.name.clone(),
                behavior: id.to_string(),
            })
        };
        let client_attack = resolve(&self.client_attack)?;
        let server_attack = resolve(&self.server_attack)?;

        Ok(WeaponDefinition {
            name: self.name,
            damage: self.damage,
            range: self.range,
            class: self.kind,
            timing: WeaponTiming {
                endlag: self.endlag,
                cooldown: self.cooldown,
                attack_speed: self.attack_speed,
            },
            hitbox: self.hitbox,
            hitstun: self.hitstun,
            weapon_model: self.weapon_model,
            weapon_attributes: self.weapon_attributes,
            attack_restrictions: self.attack_restrictions,
            client_attack,
            server_attack,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sword_combo() -> ComboChain {
        ComboChain::new()
            .with_step(1, "sword_m1_1")
            .with_step(2, "sword_m1_2")
            .with_step(3, "sword_m1_3")
    }

    #[test]
    fn test_combo_chain_order_and_wrap() {
        let combo = sword_combo();
        assert_eq!(combo.len(), 3);
        assert_eq!(combo.first_step(), Some(1));
        assert_eq!(combo.next_step(1), Some(2));
        assert_eq!(combo.next_step(2), Some(3));
        assert_eq!(combo.next_step(3), Some(1)); // wrap
        assert_eq!(combo.step(2), Some("sword_m1_2"));
        assert_eq!(combo.step(4), None);
    }

    #[test]
    fn test_combo_chain_sparse_steps() {
        let combo: ComboChain = [(10, "a"), (5, "b"), (20, "c")].into_iter().collect();
        let steps: Vec<_> = combo.iter().map(|(step, _)| step).collect();
        assert_eq!(steps, vec![5, 10, 20]);
        assert_eq!(combo.next_step(7), Some(10));
        assert!(ComboChain::new().next_step(1).is_none());
    }

    #[test]
    fn test_melee_definition_builder() {
        let sword = WeaponDefinition::melee("Sword", MeleeAnimations::new("sword_block", sword_combo()))
            .with_damage(10.0)
            .with_range(5.0)
            .with_restrictions(["stunned"]);

        assert_eq!(sword.kind(), WeaponKind::Melee);
        assert_eq!(sword.key(), "sword");
        assert_eq!(sword.class.block_animation(), "sword_block");
        assert_eq!(sword.class.reload_animation(), None);
        assert_eq!(sword.attack_restrictions, vec!["stunned".to_string()]);
        assert!(!sword.has_hitbox());
        assert_eq!(sword.client_attack.name(), "noop");
    }

    #[test]
    fn test_ranged_definition_builder() {
        let bow = WeaponDefinition::ranged(
            "Bow",
            "arrow",
            RangedAnimations::new("bow_reload", "bow_block", ComboChain::new().with_step(1, "bow_draw")),
        )
        .with_range(50.0)
        .with_hitbox("bow_hitbox");

        assert_eq!(bow.kind(), WeaponKind::Ranged);
        assert_eq!(bow.class.projectile_model(), Some("arrow"));
        assert_eq!(bow.class.reload_animation(), Some("bow_reload"));
        assert_eq!(bow.class.m1().step(1), Some("bow_draw"));
        assert!(bow.has_hitbox());
    }

    #[test]
    fn test_spec_from_ron_into_definition() {
        let source = r#"(
            name: "Greatsword",
            damage: 30.0,
            range: 6.0,
            endlag: 0.5,
            cooldown: 1.2,
            attack_speed: Some(0.8),
            client_attack: "noop",
            server_attack: "announce",
            attack_restrictions: ["Stunned", "blocking"],
            hitstun: Some(false),
            weapon_model: Some("models/greatsword.glb"),
            weapon_attributes: ["Heavy", "two_handed"],
            kind: Melee(
                animations: (
                    block: "gs_block",
                    m1: {1: "gs_1", 2: "gs_2"},
                    idle: Some("gs_idle"),
                ),
            ),
        )"#;
        let spec: WeaponSpec = ron::from_str(source).unwrap();
        let definition = spec.into_definition(&BehaviorCatalog::new()).unwrap();

        assert_eq!(definition.name, "Greatsword");
        assert_eq!(definition.server_attack.name(), "announce");
        // Timing проходит без изменений
        assert_eq!(
            definition.timing,
            WeaponTiming {
                endlag: 0.5,
                cooldown: 1.2,
                attack_speed: Some(0.8),
            }
        );
        assert_eq!(definition.attack_restrictions, vec!["Stunned", "blocking"]);
        // Авторские данные тоже как есть (регистр не трогаем)
        assert_eq!(definition.hitstun, Some(false));
        assert_eq!(definition.weapon_model.as_deref(), Some("models/greatsword.glb"));
        assert_eq!(definition.weapon_attributes, vec!["Heavy", "two_handed"]);
        match &definition.class {
            WeaponClass::Melee { animations } => {
                assert_eq!(animations.idle.as_deref(), Some("gs_idle"));
                assert_eq!(animations.m2, None);
                assert_eq!(animations.m1.len(), 2);
            }
            other => panic!("expected melee, got {:?}", other),
        }
    }

    #[test]
    fn test_spec_unknown_behavior() {
        let spec = WeaponSpec {
            name: "Wand".into(),
            damage: 1.0,
            range: 1.0,
            kind: WeaponClass::Melee {
                animations: MeleeAnimations::new("block", ComboChain::new()),
            },
            endlag: 0.0,
            cooldown: 0.0,
            attack_speed: None,
            client_attack: "noop".into(),
            server_attack: "fireball".into(),
            hitbox: None,
            hitstun: None,
            weapon_model: None,
            weapon_attributes: Vec::new(),
            attack_restrictions: Vec::new(),
        };

        let err = spec.into_definition(&BehaviorCatalog::new()).unwrap_err();
        assert!(matches!(
            err,
            RegistryError::UnknownBehavior { ref weapon, ref behavior } if weapon == "Wand" && behavior == "fireball"
        ));
    }
}
