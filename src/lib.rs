pub mod api;
pub mod cli;
pub mod mcp;
pub mod models;
pub mod services;
pub mod specfile;
