pub mod cli;
pub mod client;
pub mod engine;
pub mod errors;
pub mod models;
pub mod storage;
