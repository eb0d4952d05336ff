use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum SpecfileError {
    #[error("Spec file not found: {0}")]
    #[diagnostic(code(hrungnir::specfile::not_found))]
    NotFound(String),

    #[error("Failed to read spec file {path}: {source}")]
    #[diagnostic(code(hrungnir::specfile::read))]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Macro '%{{{name}}}' is defined in terms of itself")]
    #[diagnostic(
        code(hrungnir::specfile::macro_recursion),
        help("Check the %global and %define lines for a self-referencing chain")
    )]
    MacroRecursion { name: String },
}
