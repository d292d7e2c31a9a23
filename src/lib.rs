//! Squad Tactics - hierarchical NPC squad-combat decision core

pub mod battle;
pub mod core;
