mod code_vault;
mod coordinator;
mod events;
