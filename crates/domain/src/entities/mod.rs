//! Projection entities
//!
//! Mutable, derived, disposable: every entity here can be deleted and fully
//! reconstructed by replaying the world's event ledger. The ledger, not the
//! entity row, is the source of truth.

mod campaign;
mod character;
mod combat;
mod condition;
mod world;

pub use campaign::Campaign;
pub use character::{Character, CharacterKind};
pub use combat::{sort_by_initiative, Combat, Combatant, CombatantKind, TurnAdvance};
pub use condition::AppliedCondition;
pub use world::World;
