pub mod recommendation_service;
pub mod seed_service;
pub mod stock_service;
pub mod sync_scheduler;
pub mod sync_service;
