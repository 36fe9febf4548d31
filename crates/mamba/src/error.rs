use thiserror::Error;

/// Host-level failures: things that can go wrong *around* the scripted language's own
/// evaluation, never during it. Every error the scripted language itself can raise and
/// catch (`TypeError`, `NameError`, ...) is a first-class [`crate::Value`] propagated as
/// a [`crate::signal::Signal::Raise`], not a variant here.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Parse(String),

    #[error("could not read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("unhandled exception: {0}")]
    Unhandled(String),
}

pub type Result<T> = std::result::Result<T, Error>;
