pub mod history_maintenance;

pub use history_maintenance::spawn_history_prune_task;
