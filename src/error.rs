use thiserror::Error;

#[derive(Error, Debug)]
/// Batch error
pub enum BatchError {
    /// The job or one of its steps is not correctly assembled.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A job parameter is malformed, missing or of an unexpected type.
    #[error("Job parameter error: {0}")]
    JobParameter(String),

    /// A tasklet failed while executing its unit of work.
    #[error("Tasklet error: {0}")]
    Tasklet(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
