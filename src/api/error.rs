use std::net::SocketAddr;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum ApiError {
    #[error("Failed to bind {addr}")]
    #[diagnostic(
        code(hrungnir::api::bind),
        help("Is another process already listening on this address?")
    )]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("HTTP server stopped unexpectedly")]
    #[diagnostic(code(hrungnir::api::serve))]
    Serve(#[source] std::io::Error),
}
