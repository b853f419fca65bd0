//! Attack dispatcher - один attack request от начала до конца
//!
//! Порядок (client и server):
//! 1. Lookup оружия в registry (нет → `UnknownWeapon`, тихий no-op)
//! 2. Restriction gate (маркер активен → `Restricted`, тихий no-op)
//! 3. Client: сразу `client_attack`.
//!    Server: root frame + controller обязательны (иначе fatal `AttackError`),
//!    default sweep если у оружия нет hitbox, затем `server_attack`.
//!
//! Dispatcher без состояния между вызовами: cooldown/endlag не применяет.

use bevy::ecs::world::CommandQueue;
use bevy::prelude::*;

use super::hit_resolver::{HitResolver, ShapeCaster, SweepHit};
use super::restriction::first_restriction;
use crate::components::{ActorMarkers, Controller};
use crate::config::CombatConfig;
use crate::error::AttackError;
use crate::logger::log;
use crate::weapon::{AttackBehavior, AttackContext, ExecutionContext, WeaponDefinition, WeaponRegistry};

/// Чем закончился attack request (без fatal ошибок)
#[derive(Debug, Clone, PartialEq)]
pub enum AttackOutcome {
    /// Поведение вызвано; `target` - результат default sweep (server, без hitbox)
    Dispatched { target: Option<SweepHit> },
    /// Оружия нет в registry
    UnknownWeapon,
    /// Актор несёт маркер из restriction списка
    Restricted { tag: String },
}

impl AttackOutcome {
    pub fn is_dispatched(&self) -> bool {
        matches!(self, AttackOutcome::Dispatched { .. })
    }

    pub fn target(&self) -> Option<SweepHit> {
        match self {
            AttackOutcome::Dispatched { target } => *target,
            _ => None,
        }
    }
}

pub struct AttackDispatcher<'a> {
    registry: &'a WeaponRegistry,
    resolver: HitResolver<'a>,
}

impl<'a> AttackDispatcher<'a> {
    pub fn new(registry: &'a WeaponRegistry, caster: &'a dyn ShapeCaster, config: &CombatConfig) -> Self {
        Self {
            registry,
            resolver: HitResolver::new(caster, config.hitbox_half_extents()),
        }
    }

    /// Client path: без hit detection и без authority
    pub fn execute_client_attack(&self, world: &mut World, weapon_name: &str, actor: Entity) -> AttackOutcome {
        let weapon = match self.gate(world, weapon_name, actor) {
            Ok(weapon) => weapon,
            Err(outcome) => return outcome,
        };

        let attack = AttackContext {
            actor,
            weapon: weapon.name.clone(),
            context: ExecutionContext::Client,
            target: None,
        };
        invoke(world, weapon.client_attack.as_ref(), &attack);

        AttackOutcome::Dispatched { target: None }
    }

    /// Server path: preconditions + default sweep + `server_attack`
    pub fn execute_server_attack(
        &self,
        world: &mut World,
        weapon_name: &str,
        actor: Entity,
    ) -> Result<AttackOutcome, AttackError> {
        let weapon = match self.gate(world, weapon_name, actor) {
            Ok(weapon) => weapon,
            Err(outcome) => return Ok(outcome),
        };

        let frame = *world
            .get::<Transform>(actor)
            .ok_or(AttackError::MissingRootFrame(actor))?;
        if world.get::<Controller>(actor).is_none() {
            return Err(AttackError::MissingController(actor));
        }

        // Explicit hitbox → оружие само отвечает за hit detection
        let target = if weapon.has_hitbox() {
            None
        } else {
            self.resolver.resolve_default_hit(world, actor, &frame, weapon)
        };

        let attack = AttackContext {
            actor,
            weapon: weapon.name.clone(),
            context: ExecutionContext::Server,
            target: target.map(|hit| hit.owner),
        };
        invoke(world, weapon.server_attack.as_ref(), &attack);

        Ok(AttackOutcome::Dispatched { target })
    }

    /// Lookup + restriction gate (общие для обоих путей)
    fn gate(&self, world: &World, weapon_name: &str, actor: Entity) -> Result<&'a WeaponDefinition, AttackOutcome> {
        let Some(weapon) = self.registry.get(weapon_name) else {
            log(&format!("Attack ignored: unknown weapon \"{}\" for {:?}", weapon_name, actor));
            return Err(AttackOutcome::UnknownWeapon);
        };

        let markers = world.get::<ActorMarkers>(actor);
        if let Some(tag) = first_restriction(&markers, &weapon.attack_restrictions) {
            log(&format!(
                "Attack suppressed: {:?} restricted by \"{}\" for \"{}\"",
                actor, tag, weapon.name
            ));
            return Err(AttackOutcome::Restricted { tag: tag.to_string() });
        }

        Ok(weapon)
    }
}

/// Вызвать поведение и применить его команды до возврата
fn invoke(world: &mut World, behavior: &dyn AttackBehavior, attack: &AttackContext) {
    let mut queue = CommandQueue::default();
    {
        let mut commands = Commands::new(&mut queue, world);
        behavior.execute(&mut commands, attack);
    }
    queue.apply(world);
}
