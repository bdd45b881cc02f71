pub mod api;
pub mod config;
pub mod error;
pub mod llm;
pub mod search;
pub mod synthesis;
