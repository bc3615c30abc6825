pub mod aggregate;
pub mod cli;
pub mod config;
pub mod error;
pub mod index;
pub mod jacoco;
pub mod model;
pub mod overall;
pub mod render;
pub mod resolve;
pub mod threshold;
