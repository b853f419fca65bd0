//! Combat integration test
//!
//! Полный путь через `WeaponPlugin`: attack request events → FixedUpdate →
//! AttackResolved / AttackFailed / AttackAnnounced.
//!
//! Проверяем:
//! - restriction gate и unknown weapon как тихие no-op
//! - fatal preconditions не ломают остальные requests
//! - default sweep (rapier): ровно один запрос, цель доходит до поведения

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use bevy::prelude::*;
use bevy_rapier3d::prelude::Collider;
use armory_combat::combat::CastHit;
use armory_combat::weapon::{ComboChain, MeleeAnimations, RangedAnimations};
use armory_combat::*;

/// Поведение-счётчик
#[derive(Clone, Default)]
struct Counter(Arc<AtomicUsize>);

impl Counter {
    fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

impl AttackBehavior for Counter {
    fn execute(&self, _commands: &mut Commands, _attack: &AttackContext) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

/// Backend, который только считает запросы
#[derive(Clone, Default)]
struct RecordingCaster(Arc<Mutex<Vec<SweepRequest>>>);

impl ShapeCaster for RecordingCaster {
    fn cast(&self, _world: &mut World, request: &SweepRequest) -> Option<CastHit> {
        self.0.lock().unwrap().push(request.clone());
        None
    }
}

fn sword(server: &Counter) -> WeaponDefinition {
    WeaponDefinition::melee("Sword", MeleeAnimations::new("block", ComboChain::new().with_step(1, "m1")))
        .with_range(5.0)
        .with_restrictions(["stunned"])
        .with_server_attack(Arc::new(server.clone()))
}

fn bow() -> WeaponDefinition {
    WeaponDefinition::ranged(
        "Bow",
        "arrow",
        RangedAnimations::new("reload", "block", ComboChain::new().with_step(1, "draw")),
    )
    .with_range(50.0)
    .with_client_attack(Arc::new(weapon::AnnounceBehavior))
    .with_server_attack(Arc::new(weapon::AnnounceBehavior))
}

/// Helper: combat App с готовым registry
fn create_combat_app(definitions: Vec<WeaponDefinition>) -> App {
    let mut app = create_headless_app(CombatConfig::default());
    let registry = WeaponRegistry::from_provider(&StaticProvider::new(definitions)).unwrap();
    app.insert_resource(registry);
    app
}

/// Startup + rapier sync, чтобы коллайдеры попали в query pipeline
fn settle_physics(app: &mut App) {
    for _ in 0..3 {
        app.update();
    }
}

fn tick(app: &mut App) {
    app.world_mut().run_schedule(FixedUpdate);
}

fn drain<E: Event>(app: &mut App) -> Vec<E> {
    app.world_mut().resource_mut::<Events<E>>().drain().collect()
}

fn server_attack(app: &mut App, weapon: &str, actor: Entity) {
    app.world_mut().send_event(ServerAttackRequest {
        weapon: weapon.to_string(),
        actor,
    });
}

fn client_attack(app: &mut App, weapon: &str, actor: Entity) {
    app.world_mut().send_event(ClientAttackRequest {
        weapon: weapon.to_string(),
        actor,
    });
}

#[test]
fn test_sword_scenario_through_plugin() {
    let server = Counter::default();
    let mut app = create_combat_app(vec![sword(&server)]);
    let actor = app.world_mut().spawn(Combatant).id();

    server_attack(&mut app, "sword", actor);
    tick(&mut app);
    assert_eq!(server.get(), 1);

    let resolved = drain::<AttackResolved>(&mut app);
    assert_eq!(resolved.len(), 1);
    assert_eq!(resolved[0].context, ExecutionContext::Server);
    assert!(resolved[0].outcome.is_dispatched());

    // Stunned → атака подавлена
    app.world_mut()
        .get_mut::<ActorMarkers>(actor)
        .unwrap()
        .set("Stunned", true);
    server_attack(&mut app, "sword", actor);
    tick(&mut app);
    assert_eq!(server.get(), 1);

    let resolved = drain::<AttackResolved>(&mut app);
    assert_eq!(resolved[0].outcome, AttackOutcome::Restricted { tag: "stunned".into() });
}

#[test]
fn test_unknown_weapon_resolves_silently() {
    let server = Counter::default();
    let mut app = create_combat_app(vec![sword(&server)]);
    let actor = app.world_mut().spawn(Combatant).id();

    server_attack(&mut app, "mjolnir", actor);
    client_attack(&mut app, "mjolnir", actor);
    tick(&mut app);

    let resolved = drain::<AttackResolved>(&mut app);
    assert_eq!(resolved.len(), 2);
    assert!(resolved.iter().all(|e| e.outcome == AttackOutcome::UnknownWeapon));
    assert!(drain::<AttackFailed>(&mut app).is_empty());
    assert_eq!(server.get(), 0);
}

#[test]
fn test_fatal_precondition_does_not_block_other_requests() {
    let server = Counter::default();
    let mut app = create_combat_app(vec![sword(&server)]);
    let broken = app.world_mut().spawn(Transform::default()).id(); // нет Controller
    let healthy = app.world_mut().spawn(Combatant).id();

    server_attack(&mut app, "sword", broken);
    server_attack(&mut app, "sword", healthy);
    tick(&mut app);

    let failed = drain::<AttackFailed>(&mut app);
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].actor, broken);
    assert_eq!(failed[0].error, AttackError::MissingController(broken));

    let resolved = drain::<AttackResolved>(&mut app);
    assert_eq!(resolved.len(), 1);
    assert_eq!(resolved[0].actor, healthy);
    assert_eq!(server.get(), 1);
}

#[test]
fn test_bow_scenario_single_sweep_with_custom_backend() {
    let mut app = create_combat_app(vec![bow()]);
    let caster = RecordingCaster::default();
    app.insert_resource(SweepBackend::new(caster.clone()));

    let actor = app
        .world_mut()
        .spawn((Combatant, Transform::default().looking_to(Vec3::NEG_X, Vec3::Y)))
        .id();

    server_attack(&mut app, "BOW", actor);
    tick(&mut app);

    let requests = caster.0.lock().unwrap().clone();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].distance, 50.0);
    assert!(requests[0].direction.abs_diff_eq(Vec3::NEG_X, 1e-5));
    assert_eq!(requests[0].excluded, vec![actor]);
}

#[test]
fn test_bow_default_sweep_reaches_announced_target() {
    let mut app = create_combat_app(vec![bow()]);
    let archer = app.world_mut().spawn(Combatant).id();
    let target = app
        .world_mut()
        .spawn((Combatant, Transform::from_xyz(0.0, 0.0, -30.0), Collider::cuboid(0.5, 1.0, 0.5)))
        .id();
    settle_physics(&mut app);

    server_attack(&mut app, "bow", archer);
    tick(&mut app);

    let resolved = drain::<AttackResolved>(&mut app);
    let hit = resolved[0].outcome.target().expect("bow should hit the target");
    assert_eq!(hit.owner, target);

    let announced = drain::<AttackAnnounced>(&mut app);
    assert_eq!(announced.len(), 1);
    assert_eq!(announced[0].actor, archer);
    assert_eq!(announced[0].weapon, "Bow");
    assert_eq!(announced[0].target, Some(target));
}

#[test]
fn test_client_requests_processed_before_server() {
    let mut app = create_combat_app(vec![bow()]);
    let actor = app.world_mut().spawn(Combatant).id();

    server_attack(&mut app, "bow", actor);
    client_attack(&mut app, "bow", actor);
    tick(&mut app);

    let contexts: Vec<_> = drain::<AttackAnnounced>(&mut app)
        .into_iter()
        .map(|e| e.context)
        .collect();
    assert_eq!(contexts, vec![ExecutionContext::Client, ExecutionContext::Server]);
}

#[test]
fn test_no_requests_no_events() {
    let mut app = create_combat_app(vec![bow()]);
    tick(&mut app);
    tick(&mut app);

    assert!(drain::<AttackResolved>(&mut app).is_empty());
    assert!(drain::<AttackFailed>(&mut app).is_empty());
}
