pub mod app;
pub mod cache;
pub mod config;
pub mod execution;
pub mod executor;
pub mod fetch;
pub mod loader;
pub mod provider;
pub mod runtime;
pub mod shared;
