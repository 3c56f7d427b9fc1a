pub mod monitor_manager;
pub mod store_manager;
