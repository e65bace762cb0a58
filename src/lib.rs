pub mod bot;
pub mod config;
pub mod engine;
pub mod handlers;
pub mod localization;
pub mod movie_store;
pub mod subscription;
pub mod user_session;
pub mod utils;
