//! Weapon catalog: definitions, attack behaviors, registry, providers
//!
//! Поток данных:
//! DefinitionProvider → WeaponRegistry (один раз при старте) → AttackDispatcher

pub mod behavior;
pub mod definition;
pub mod provider;
pub mod registry;


// Re-exports
pub use behavior::*;
pub use definition::*;
pub use provider::*;
pub use registry::*;
