//! ARMORY Combat Core
//!
//! Weapon registry + attack resolution на Bevy ECS 0.16.
//!
//! Слои:
//! - weapon: definitions, attack behaviors, registry, definition providers
//! - combat: restriction gate, default hit detection, attack dispatch (client / server)
//! - components: то, что ядро читает у актора (маркеры, controller, hurtbox)
//!
//! Registry не singleton: создаётся при старте и передаётся по ссылке
//! (`AttackDispatcher`) или живёт как resource (`WeaponPlugin`).

use bevy::prelude::*;
use bevy::transform::TransformPlugin;
use bevy_rapier3d::prelude::{NoUserData, RapierPhysicsPlugin};

// Публичные модули
pub mod combat;
pub mod components;
pub mod config;
pub mod error;
pub mod logger;
pub mod weapon;

// Re-export базовых типов для удобства
pub use combat::{
    AttackDispatcher, AttackFailed, AttackOutcome, AttackResolved, ClientAttackRequest, RapierShapeCaster,
    ServerAttackRequest, ShapeCaster, SweepBackend, SweepHit, SweepRequest, WeaponPlugin,
};
pub use components::*;
pub use config::CombatConfig;
pub use error::{AttackError, ConfigError, RegistryError};
pub use logger::{init_logger, log, log_error, log_info, log_warning};
pub use weapon::{
    AttackAnnounced, AttackBehavior, AttackContext, BehaviorCatalog, DefinitionProvider, ExecutionContext,
    RonDirectoryProvider, StaticProvider, WeaponDefinition, WeaponKind, WeaponRegistry,
};

/// Главный plugin (fixed timestep + rapier + weapon подсистема)
///
/// Rapier нужен default sweep'у (`RapierShapeCaster`). Если host app уже
/// добавил `RapierPhysicsPlugin`, второй раз не добавляем.
pub struct ArmoryPlugin;

impl Plugin for ArmoryPlugin {
    fn build(&self, app: &mut App) {
        // Fixed timestep 60Hz для attack processing
        app.insert_resource(Time::<Fixed>::from_hz(60.0));

        if !app.is_plugin_added::<RapierPhysicsPlugin<NoUserData>>() {
            app.add_plugins(RapierPhysicsPlugin::<NoUserData>::default());
        }

        app.add_plugins(WeaponPlugin);
    }
}

/// Создаёт minimal Bevy App для headless симуляции
///
/// Registry и config вставляются снаружи (до или после), plugin не
/// перезаписывает существующие resources.
/// Коллайдеры попадают в rapier context только после `app.update()`
/// (sync + propagation), до этого default sweep никого не видит.
pub fn create_headless_app(config: CombatConfig) -> App {
    init_logger();
    logger::set_log_level(config.log_level);

    let mut app = App::new();
    app.add_plugins((MinimalPlugins, TransformPlugin))
        .insert_resource(config)
        .add_plugins(ArmoryPlugin);

    app
}
