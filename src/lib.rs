pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod gateway;
pub mod models;
pub mod parsers;
pub mod provider;
pub mod validation;
pub mod wizard;
