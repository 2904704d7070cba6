//! Domain layer - Core business logic with no I/O
//!
//! This layer contains:
//! - Entities: Story, Character, Location, Creature, PowerSystem, LoreEntry, Chapter
//! - Value Objects: ids, role tiers, story snapshots, budgets, generation results
//! - Domain Services: token estimation, context packing, response validation

pub mod entities;
pub mod services;
pub mod value_objects;
