pub mod cli;
pub mod config;
pub mod db;
pub mod http_client;
pub mod models;
pub mod schema;
pub mod sync;
