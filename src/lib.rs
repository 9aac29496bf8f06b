pub mod api;
pub mod cli;
pub mod config;
pub mod export;
pub mod monitor;
pub mod storage;
pub mod task;
pub mod utils;
