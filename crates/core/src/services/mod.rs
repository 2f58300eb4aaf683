pub mod chart_service;
pub mod list_service;
pub mod pnl_service;
pub mod query_cache;
