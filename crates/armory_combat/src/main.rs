//! Headless прогон ARMORY
//!
//! Грузит оружие из папки `Weapons` (корень - первый аргумент, по умолчанию
//! `assets`), спавнит двух бойцов и прогоняет несколько fixed тиков атак.

use std::path::PathBuf;

use bevy::prelude::*;
use bevy_rapier3d::prelude::Collider;
use armory_combat::*;

fn main() {
    let root = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("assets"));

    let config = match std::env::args().nth(2) {
        Some(path) => match CombatConfig::load(&path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load config {}: {}", path, e);
                std::process::exit(1);
            }
        },
        None => CombatConfig::default(),
    };

    let mut app = create_headless_app(config.clone());

    // Startup: битый каталог оружия = режим не стартует
    let provider = RonDirectoryProvider::new(root.clone(), config.weapon_folder.clone(), BehaviorCatalog::new());
    let registry = match WeaponRegistry::from_provider(&provider) {
        Ok(registry) => registry,
        Err(e) => {
            log_error(&format!("Weapon catalog failed to load: {}", e));
            std::process::exit(1);
        }
    };
    println!("Loaded weapons: {:?}", registry.names());
    let weapons: Vec<String> = registry.names().into_iter().map(String::from).collect();
    app.insert_resource(registry);

    let attacker = app.world_mut().spawn((Combatant, Transform::default())).id();
    let defender = app
        .world_mut()
        .spawn((Combatant, Transform::from_xyz(0.0, 0.0, -4.0), Collider::capsule_y(0.5, 0.4)))
        .id();
    if let Some(mut markers) = app.world_mut().get_mut::<ActorMarkers>(defender) {
        markers.set("stunned", true);
    }

    // Startup + первый physics sync: коллайдеры попадают в rapier context
    app.update();
    app.update();

    for tick in 0..3 {
        for weapon in &weapons {
            app.world_mut().send_event(ClientAttackRequest {
                weapon: weapon.clone(),
                actor: attacker,
            });
            app.world_mut().send_event(ServerAttackRequest {
                weapon: weapon.clone(),
                actor: if tick == 2 { defender } else { attacker },
            });
        }

        app.world_mut().run_schedule(FixedUpdate);

        let resolved: Vec<AttackResolved> = app
            .world_mut()
            .resource_mut::<Events<AttackResolved>>()
            .drain()
            .collect();
        for event in resolved {
            println!(
                "Tick {}: {:?} {:?} \"{}\" → {:?}",
                tick, event.context, event.actor, event.weapon, event.outcome
            );
        }

        let announced = app
            .world_mut()
            .resource_mut::<Events<AttackAnnounced>>()
            .drain()
            .count();
        println!("Tick {}: {} attacks announced", tick, announced);
    }

    println!("Simulation complete!");
}
