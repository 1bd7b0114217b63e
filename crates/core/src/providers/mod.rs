pub mod traits;

// Data source implementations
pub mod local_csv;
