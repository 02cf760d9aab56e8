//! AdsCampaign — signup and account backend for small-business advertising.

pub mod auth;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod navigation;
pub mod profile;
pub mod server;
pub mod session;
pub mod signup;
pub mod store;
