//! Hit resolver - default hit detection для оружия без hitbox
//!
//! Архитектура:
//! - Куб фиксированного размера (`CombatConfig::default_hitbox_size`, по умолчанию 5x5x5)
//!   в root frame актора
//! - Sweep вдоль forward актора на дистанцию `weapon.range`
//! - Один дискретный запрос, максимум один first-contact результат
//! - Сам актор и его дочерние части исключены
//!
//! Геометрия - внешний capability (`ShapeCaster`). Default backend
//! `RapierShapeCaster` делает shape cast в rapier context.

use bevy::ecs::system::SystemState;
use bevy::prelude::*;
use bevy_rapier3d::prelude::{Collider, QueryFilter, ReadRapierContext, ShapeCastOptions};

use crate::logger::{log, log_info};
use crate::weapon::WeaponDefinition;

/// Один sweep запрос
#[derive(Debug, Clone, PartialEq)]
pub struct SweepRequest {
    /// Центр куба в начале sweep
    pub origin: Vec3,
    /// Ориентация root frame (backend может её игнорировать)
    pub rotation: Quat,
    pub half_extents: Vec3,
    /// Единичное направление (forward актора)
    pub direction: Vec3,
    pub distance: f32,
    /// Entity (вместе с потомками), которые sweep не задевает
    pub excluded: Vec<Entity>,
}

impl SweepRequest {
    pub fn displacement(&self) -> Vec3 {
        self.direction * self.distance
    }
}

/// Ответ backend'а: в какой коллайдер и когда (доля от displacement, 0..=1)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CastHit {
    pub entity: Entity,
    pub time_of_impact: f32,
}

/// Результат default sweep
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepHit {
    /// Коллайдер, в который попали (может быть частью тела)
    pub collider: Entity,
    /// Корневой entity коллайдера (актор, которому принадлежит часть)
    pub owner: Entity,
    pub time_of_impact: f32,
    /// Дистанция от origin до контакта
    pub distance: f32,
}

/// Геометрический query capability
pub trait ShapeCaster: Send + Sync + 'static {
    fn cast(&self, world: &mut World, request: &SweepRequest) -> Option<CastHit>;
}

/// Backend для `WeaponPlugin` (по умолчанию `RapierShapeCaster`)
#[derive(Resource)]
pub struct SweepBackend(pub Box<dyn ShapeCaster>);

impl SweepBackend {
    pub fn new(caster: impl ShapeCaster) -> Self {
        Self(Box::new(caster))
    }
}

impl Default for SweepBackend {
    fn default() -> Self {
        Self::new(RapierShapeCaster)
    }
}

/// Shape cast через Rapier (default rapier context)
///
/// Куб ориентирован по `request.rotation`, коллайдеры берутся в world space
/// (`GlobalTransform`), поэтому части тела на `ChildOf` стоят там, где их видит физика.
/// Нет rapier context в world → промах.
#[derive(Debug, Default, Clone, Copy)]
pub struct RapierShapeCaster;

impl ShapeCaster for RapierShapeCaster {
    fn cast(&self, world: &mut World, request: &SweepRequest) -> Option<CastHit> {
        let mut state: SystemState<(ReadRapierContext, Query<&ChildOf>)> = SystemState::new(world);
        let (rapier, parents) = state.get(world);

        let Ok(context) = rapier.single() else {
            log("RapierShapeCaster: no rapier context, sweep skipped");
            return None;
        };

        let shape = Collider::cuboid(
            request.half_extents.x,
            request.half_extents.y,
            request.half_extents.z,
        );
        let options = ShapeCastOptions {
            max_time_of_impact: 1.0,
            target_distance: 0.0,
            stop_at_penetration: true,
            compute_impact_geometry_on_penetration: false,
        };
        let not_excluded = |entity: Entity| !descends_from(&parents, entity, &request.excluded);
        let filter = QueryFilter::default().predicate(&not_excluded);

        context
            .cast_shape(
                request.origin,
                request.rotation,
                request.displacement(),
                (&shape).into(),
                options,
                filter,
            )
            .map(|(entity, hit)| CastHit {
                entity,
                time_of_impact: hit.time_of_impact,
            })
    }
}

/// Entity или любой его предок в списке исключений
fn descends_from(parents: &Query<&ChildOf>, entity: Entity, excluded: &[Entity]) -> bool {
    let mut current = Some(entity);
    while let Some(e) = current {
        if excluded.contains(&e) {
            return true;
        }
        current = parents.get(e).ok().map(|child_of| child_of.parent());
    }
    false
}

/// Корневой предок (модель, которой принадлежит часть тела)
pub fn root_ancestor(world: &World, entity: Entity) -> Entity {
    let mut current = entity;
    while let Some(child_of) = world.get::<ChildOf>(current) {
        current = child_of.parent();
    }
    current
}

/// Default hit detection поверх `ShapeCaster`
pub struct HitResolver<'a> {
    caster: &'a dyn ShapeCaster,
    half_extents: Vec3,
}

impl<'a> HitResolver<'a> {
    pub fn new(caster: &'a dyn ShapeCaster, half_extents: Vec3) -> Self {
        Self { caster, half_extents }
    }

    /// Запрос для актора с root frame `frame`
    pub fn build_request(&self, actor: Entity, frame: &Transform, weapon: &WeaponDefinition) -> SweepRequest {
        SweepRequest {
            origin: frame.translation,
            rotation: frame.rotation,
            half_extents: self.half_extents,
            direction: *frame.forward(),
            distance: weapon.range,
            excluded: vec![actor],
        }
    }

    /// Default sweep; `None` = никого не задели (нормальный исход)
    ///
    /// Оружие с explicit hitbox сюда не попадает (см. `AttackDispatcher`).
    pub fn resolve_default_hit(
        &self,
        world: &mut World,
        actor: Entity,
        frame: &Transform,
        weapon: &WeaponDefinition,
    ) -> Option<SweepHit> {
        let request = self.build_request(actor, frame, weapon);
        let hit = self.caster.cast(world, &request)?;

        let sweep_hit = SweepHit {
            collider: hit.entity,
            owner: root_ancestor(world, hit.entity),
            time_of_impact: hit.time_of_impact,
            distance: hit.time_of_impact * request.distance,
        };

        log_info(&format!(
            "Default sweep: {:?} with \"{}\" struck {:?} (collider {:?}, {:.2}m)",
            actor, weapon.name, sweep_hit.owner, sweep_hit.collider, sweep_hit.distance
        ));
        Some(sweep_hit)
    }
}
