pub mod cli;
pub mod config;
pub mod editor;
pub mod error;
pub mod parser;
pub mod session;
pub mod store;
