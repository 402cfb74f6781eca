pub mod auth;
pub mod clients;
pub mod dashboard;
pub mod items;
pub mod orders;
pub mod reports;
