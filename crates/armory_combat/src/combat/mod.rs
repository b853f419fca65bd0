//! Combat module: restriction gate, default hit detection, attack dispatch
//!
//! ECS ответственность:
//! - Weapon catalog: `WeaponRegistry` resource (write-once при старте)
//! - Attack requests: `ClientAttackRequest` / `ServerAttackRequest` events
//! - Результаты: `AttackResolved` / `AttackFailed` events
//!
//! Внешние collaborators:
//! - Attack behaviors (effect logic) - через `AttackBehavior`
//! - Геометрия - через `ShapeCaster` (`SweepBackend` resource)

use bevy::prelude::*;

pub mod dispatcher;
pub mod hit_resolver;
pub mod restriction;


// Re-export основных типов
pub use dispatcher::{AttackDispatcher, AttackOutcome};
pub use hit_resolver::{
    root_ancestor, CastHit, HitResolver, RapierShapeCaster, ShapeCaster, SweepBackend, SweepHit, SweepRequest,
};
pub use restriction::{first_restriction, is_restricted, MarkerSource};

use crate::config::CombatConfig;
use crate::error::AttackError;
use crate::logger::log_error;
use crate::weapon::{AttackAnnounced, ExecutionContext, WeaponRegistry};

/// Event: client (prediction) attack request
#[derive(Event, Debug, Clone)]
pub struct ClientAttackRequest {
    pub weapon: String,
    pub actor: Entity,
}

/// Event: server (authoritative) attack request
#[derive(Event, Debug, Clone)]
pub struct ServerAttackRequest {
    pub weapon: String,
    pub actor: Entity,
}

/// Event: request обработан (включая тихие no-op исходы)
#[derive(Event, Debug, Clone)]
pub struct AttackResolved {
    pub actor: Entity,
    pub weapon: String,
    pub context: ExecutionContext,
    pub outcome: AttackOutcome,
}

/// Event: server request упал на fatal precondition
#[derive(Event, Debug, Clone)]
pub struct AttackFailed {
    pub actor: Entity,
    pub weapon: String,
    pub error: AttackError,
}

/// Weapon Plugin
///
/// Регистрирует attack события и одну exclusive систему в FixedUpdate.
/// Resources (`WeaponRegistry`, `CombatConfig`, `SweepBackend`) вставляются
/// только если их ещё нет: обычно registry загружают до `add_plugins`.
pub struct WeaponPlugin;

impl Plugin for WeaponPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<ClientAttackRequest>()
            .add_event::<ServerAttackRequest>()
            .add_event::<AttackResolved>()
            .add_event::<AttackFailed>()
            .add_event::<AttackAnnounced>();

        app.init_resource::<CombatConfig>()
            .init_resource::<WeaponRegistry>()
            .init_resource::<SweepBackend>();

        app.add_systems(FixedUpdate, process_attack_requests);
    }
}

/// System: обработка attack requests
///
/// Порядок: все client requests, затем все server requests, каждый в порядке
/// поступления. Fatal ошибка одного request не останавливает остальные.
pub fn process_attack_requests(world: &mut World) {
    let client: Vec<ClientAttackRequest> = world
        .resource_mut::<Events<ClientAttackRequest>>()
        .drain()
        .collect();
    let server: Vec<ServerAttackRequest> = world
        .resource_mut::<Events<ServerAttackRequest>>()
        .drain()
        .collect();

    if client.is_empty() && server.is_empty() {
        return;
    }

    let config = world.resource::<CombatConfig>().clone();

    world.resource_scope(|world, registry: Mut<WeaponRegistry>| {
        world.resource_scope(|world, backend: Mut<SweepBackend>| {
            let dispatcher = AttackDispatcher::new(&registry, &*backend.0, &config);

            for request in client {
                let outcome = dispatcher.execute_client_attack(world, &request.weapon, request.actor);
                world.send_event(AttackResolved {
                    actor: request.actor,
                    weapon: request.weapon,
                    context: ExecutionContext::Client,
                    outcome,
                });
            }

            for request in server {
                match dispatcher.execute_server_attack(world, &request.weapon, request.actor) {
                    Ok(outcome) => {
                        world.send_event(AttackResolved {
                            actor: request.actor,
                            weapon: request.weapon,
                            context: ExecutionContext::Server,
                            outcome,
                        });
                    }
                    Err(error) => {
                        log_error(&format!(
                            "Server attack \"{}\" aborted: {}",
                            request.weapon, error
                        ));
                        world.send_event(AttackFailed {
                            actor: request.actor,
                            weapon: request.weapon,
                            error,
                        });
                    }
                }
            }
        });
    });
}
