//! ECS Components для игровых entity
//!
//! Combat ядро читает у актора только:
//! - actor: маркеры состояния и controller (ActorMarkers, Controller)
//! - `Transform` как root frame (bevy)
//! - rapier `Collider` на акторе или его частях тела как цель default sweep

pub mod actor;

// Re-exports для удобного импорта
pub use actor::*;
