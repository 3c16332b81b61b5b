use thiserror::Error;

/// Internal failures of the bounded command runner
#[derive(Error, Debug)]
pub enum ExecError {
    #[error("Failed to spawn shell for `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Output pipe was not captured")]
    Capture,

    #[error("Failed to read command output: {0}")]
    Read(#[source] std::io::Error),

    #[error("Failed to reap child process: {0}")]
    Reap(#[source] std::io::Error),
}
