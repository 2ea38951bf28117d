pub mod history_view;
pub mod network_view;
pub mod performance;
pub mod plot;
pub mod process_details;
pub mod process_table;
pub mod services_view;
pub mod settings;
pub mod system_view;
pub mod users_view;
