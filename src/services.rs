pub mod auth;
pub mod client_service;
pub mod contract_storage;
pub mod dashboard_service;
pub mod item_service;
pub mod listing;
pub mod order_service;
pub mod report_service;
pub mod valuation;
