//! Nutrition dashboard backend: proxies the browser's chat, profile, recipe and
//! media-analysis calls to the external AI services, stores body metrics in the
//! hosted database, and ships typed clients for the same routes.

pub mod analyzer;
pub mod app;
pub mod auth;
pub mod chat;
pub mod client;
pub mod config;
pub mod error;
pub mod markdown;
pub mod metrics;
pub mod profile;
pub mod recipes;
pub mod state;
pub mod tracker;
pub mod upstream;

#[cfg(test)]
mod test_support;
