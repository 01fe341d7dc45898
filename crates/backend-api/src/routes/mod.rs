pub mod auth;
pub mod dashboard;
pub mod health;
pub mod medications;
pub mod models;
pub mod patients;
pub mod shipments;
pub mod weight;
