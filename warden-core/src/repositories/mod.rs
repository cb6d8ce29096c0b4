// src/repositories/mod.rs

pub mod memory;
pub mod postgres;

pub use memory::{InMemoryGroupRepository, InMemorySuspiciousMessageRepository, InMemoryUserRepository};
pub use postgres::{
    PostgresGroupRepository, PostgresHistoryRepository, PostgresSuspiciousMessageRepository,
    PostgresUserRepository,
};
