pub mod client;
pub mod rest;
pub mod traits;
