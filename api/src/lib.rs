pub mod config;
pub mod database;
pub mod search;
pub mod service;
