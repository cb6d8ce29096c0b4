// src/repositories/postgres/mod.rs

pub mod history;
pub mod group_info;
pub mod user;
pub mod suspicious_message;

pub use history::PostgresHistoryRepository;
pub use group_info::PostgresGroupRepository;
pub use user::PostgresUserRepository;
pub use suspicious_message::PostgresSuspiciousMessageRepository;
