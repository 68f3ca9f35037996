pub mod api;
pub mod config;
pub mod db;
pub mod metrics;
pub mod models;
pub mod observe;
pub mod pipeline;
pub mod retrieval;
