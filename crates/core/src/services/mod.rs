pub mod analytics;
pub mod api_client;
pub mod local_analysis;
pub mod session;
