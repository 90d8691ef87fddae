//! Port traits through which the core reaches its collaborators.

pub mod config_port;
pub mod data_port;
pub mod news_port;
pub mod notify_port;
pub mod report_port;
