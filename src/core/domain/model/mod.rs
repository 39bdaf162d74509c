pub mod auth_identity;
pub mod availability_report;
pub mod experiment;
mod experiment_name;
pub mod journal_entry;
pub mod node;
pub mod results_report;
pub mod schedule;
pub mod scheduler_connection;
pub mod submission_report;
