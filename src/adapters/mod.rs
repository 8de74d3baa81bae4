pub mod csv_data_adapter;
pub mod file_config_adapter;
pub mod log_adapters;
