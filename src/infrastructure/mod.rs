pub mod config;
pub mod credential_store;
pub mod error;
pub mod schedule_store;
