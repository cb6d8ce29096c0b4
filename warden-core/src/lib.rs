// src/lib.rs

pub mod cache;
pub mod config;
pub mod db;
pub mod repositories;
pub mod services;
pub mod tasks;
pub mod test_utils;

pub use cache::InMemoryHistoryStore;
pub use config::ModerationConfig;
pub use db::Database;
pub use warden_common::error::Error;
