// src/lib.rs
pub mod api;
pub mod banner;
pub mod clients;
pub mod config;
pub mod database;
pub mod errors;
pub mod flow;
pub mod models;
pub mod session;
