pub mod auth;
pub mod catalog;
pub mod config;
pub mod db;
pub mod engine;
pub mod server;
pub mod term;
pub mod types;
