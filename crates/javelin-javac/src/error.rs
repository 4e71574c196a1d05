//! Error types for javelin-javac.

/// Errors produced while assembling a rule invocation.
#[derive(Debug, thiserror::Error)]
pub enum JavacError {
    /// No source files provided to a compile invocation.
    #[error("no source files specified; add .java files to srcs")]
    NoSources,

    /// No input jars provided to a combine or desugar invocation.
    #[error("no input jars specified for {rule}")]
    NoInputs { rule: &'static str },

    /// No output path specified.
    #[error("no output path specified for {rule}")]
    NoOutput { rule: &'static str },
}
