pub mod auth;
pub mod chart;
pub mod prediction;
pub mod price;
pub mod settings;
