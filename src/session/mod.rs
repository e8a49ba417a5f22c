pub mod code_vault;
pub mod error;
pub mod events;
pub mod registry;
pub mod room;
pub mod runner;
