//! # Greeting Tasklet
//!
//! This module provides a tasklet writing a `Hello, <name>!` line to any
//! [`std::io::Write`] sink, standard output being the usual one.
//!
//! ## Name resolution
//!
//! - **Fixed**: the name is known when the step is built (defaults to `World`).
//! - **Eager binding**: the name is read from the launch parameters while the job
//!   is being assembled, see [`GreetingTaskletBuilder::bind_parameter`].
//! - **Lazy binding**: the tasklet only knows a parameter key and reads its value
//!   from the running job execution, see [`GreetingTaskletBuilder::name_parameter`].
//!
//! ## Examples
//!
//! ```rust
//! use hello_batch::core::{
//!     job::{JobBuilder, JobRunner},
//!     parameters::JobParametersBuilder,
//!     step::StepBuilder,
//! };
//! use hello_batch::tasklet::greeting::GreetingTaskletBuilder;
//!
//! # fn example() -> Result<(), hello_batch::BatchError> {
//! let tasklet = GreetingTaskletBuilder::new()
//!     .name_parameter("name")
//!     .from_writer(Vec::new());
//!
//! let step = StepBuilder::new("step1").tasklet(&tasklet).build();
//! let job = JobBuilder::new().name("basicJob".to_string()).start(&step).build()?;
//!
//! let parameters = JobParametersBuilder::new().add_string("name", "World").build();
//! let result = JobRunner::new().run(&job, parameters);
//! assert!(result.is_completed());
//! assert_eq!(String::from_utf8_lossy(&tasklet.into_inner()), "Hello, World!\n");
//! # Ok(())
//! # }
//! ```

use std::{
    cell::RefCell,
    io::{self, Stdout, Write},
};

use log::debug;

use crate::{
    BatchError,
    core::{
        parameters::JobParameters,
        step::{ChunkContext, RepeatStatus, StepContribution, Tasklet},
    },
};

/// Name greeted when nothing else is configured.
pub const DEFAULT_NAME: &str = "World";

#[derive(Debug, Clone, PartialEq)]
enum NameSource {
    Fixed(String),
    Parameter {
        key: String,
        fallback: Option<String>,
    },
}

/// A tasklet greeting a name on its writer, then finishing.
pub struct GreetingTasklet<W: Write> {
    source: NameSource,
    writer: RefCell<W>,
}

impl<W: Write> GreetingTasklet<W> {
    /// Resolves the greeted name against the parameters of the running job.
    fn resolve_name(&self, job_parameters: &JobParameters) -> Result<String, BatchError> {
        match &self.source {
            NameSource::Fixed(name) => Ok(name.clone()),
            NameSource::Parameter { key, fallback } => match job_parameters.get(key) {
                Some(parameter) => Ok(parameter.to_string()),
                None => fallback.clone().ok_or_else(|| {
                    BatchError::JobParameter(format!("missing job parameter: {}", key))
                }),
            },
        }
    }

    /// Consumes the tasklet and returns its writer.
    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

impl<W: Write> Tasklet for GreetingTasklet<W> {
    fn execute(
        &self,
        contribution: &mut StepContribution,
        chunk_context: &ChunkContext<'_>,
    ) -> Result<RepeatStatus, BatchError> {
        let name = self.resolve_name(chunk_context.job_parameters())?;

        let mut writer = self.writer.borrow_mut();
        writeln!(writer, "Hello, {}!", name)?;
        writer.flush()?;

        contribution.increment_write_count(1);
        debug!("Greeted {} in step {}", name, chunk_context.step_name());

        Ok(RepeatStatus::Finished)
    }
}

/// Builder for a [`GreetingTasklet`].
#[derive(Default)]
pub struct GreetingTaskletBuilder {
    name: Option<String>,
    parameter: Option<String>,
    fallback: Option<String>,
}

impl GreetingTaskletBuilder {
    pub fn new() -> Self {
        Self {
            name: None,
            parameter: None,
            fallback: None,
        }
    }

    /// Greets a fixed name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self.parameter = None;
        self
    }

    /// Binds the name to the value of `key` in `job_parameters` right now.
    ///
    /// # Errors
    /// [`BatchError::JobParameter`] when `key` is absent.
    pub fn bind_parameter(self, job_parameters: &JobParameters, key: &str) -> Result<Self, BatchError> {
        let parameter = job_parameters.get(key).ok_or_else(|| {
            BatchError::JobParameter(format!("missing job parameter: {}", key))
        })?;
        Ok(self.name(parameter.to_string()))
    }

    /// Reads the name from the job parameter `key` each time the tasklet runs.
    pub fn name_parameter(mut self, key: impl Into<String>) -> Self {
        self.parameter = Some(key.into());
        self.name = None;
        self
    }

    /// Name used when the lazily bound parameter is absent.
    ///
    /// Without a fallback, an absent parameter fails the step.
    pub fn fallback(mut self, name: impl Into<String>) -> Self {
        self.fallback = Some(name.into());
        self
    }

    fn source(self) -> NameSource {
        match self.parameter {
            Some(key) => NameSource::Parameter {
                key,
                fallback: self.fallback,
            },
            None => NameSource::Fixed(self.name.unwrap_or_else(|| DEFAULT_NAME.to_string())),
        }
    }

    pub fn from_writer<W: Write>(self, writer: W) -> GreetingTasklet<W> {
        GreetingTasklet {
            source: self.source(),
            writer: RefCell::new(writer),
        }
    }

    pub fn to_stdout(self) -> GreetingTasklet<Stdout> {
        self.from_writer(io::stdout())
    }
}
