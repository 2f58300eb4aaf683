pub mod chart;
pub mod filter;
pub mod instance;
pub mod metrics;
pub mod operation;
pub mod page;
pub mod settings;
