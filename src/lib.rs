// Agent Chat Bridge - Library root

pub mod config;
pub mod converters;
pub mod error;
pub mod http_client;
pub mod models;
pub mod providers;
pub mod resolver;
pub mod utils;
