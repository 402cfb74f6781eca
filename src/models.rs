pub mod auth;
pub mod client;
pub mod dashboard;
pub mod filters;
pub mod item;
pub mod order;
