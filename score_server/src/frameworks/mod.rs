pub mod config;
pub mod db;
pub mod seed;
pub mod server;
