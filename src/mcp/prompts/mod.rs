//! MCP prompt templates

pub mod upstream;
