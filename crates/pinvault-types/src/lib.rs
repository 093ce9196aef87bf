pub mod api;
pub mod market;
pub mod models;
pub mod validation;
