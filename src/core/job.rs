use std::{
    collections::HashSet,
    time::{Duration, Instant},
};

use log::{error, info};
use uuid::Uuid;

use crate::BatchError;

use super::{
    build_name,
    parameters::JobParameters,
    step::{BatchStatus, Step, StepExecution},
};

/// Type alias for job assembly and execution results.
type JobResult<T> = Result<T, BatchError>;

/// Represents a job that can be executed.
///
/// A job is a container for a sequence of steps that are executed in order.
/// Jobs are launched by a [`JobRunner`], which owns the bookkeeping of the
/// execution and turns the outcome into an [`ExecutionResult`].
///
/// # Example Usage
///
/// ```rust
/// use hello_batch::core::{
///     job::{JobBuilder, JobRunner},
///     parameters::JobParameters,
///     step::{FnTasklet, RepeatStatus, StepBuilder},
/// };
///
/// # fn example() -> Result<(), hello_batch::BatchError> {
/// let tasklet = FnTasklet::new(|_, _| {
///     println!("Hello, World!");
///     Ok(RepeatStatus::Finished)
/// });
/// let step = StepBuilder::new("step1").tasklet(&tasklet).build();
///
/// let job = JobBuilder::new().name("job".to_string()).start(&step).build()?;
///
/// let result = JobRunner::new().run(&job, JobParameters::new());
/// assert!(result.is_completed());
/// # Ok(())
/// # }
/// ```
pub trait Job {
    fn get_name(&self) -> &str;

    /// Runs the steps of the job in order, recording one [`StepExecution`] per
    /// step that was started.
    ///
    /// # Returns
    /// - `Ok(())` when every step completed
    /// - `Err(BatchError)` with the error of the first failing step
    fn execute(&self, job_execution: &mut JobExecution) -> JobResult<()>;
}

/// Execution record of a job run.
#[derive(Debug)]
pub struct JobExecution {
    /// Unique identifier for this execution
    pub id: Uuid,
    /// Name of the executed job
    pub job_name: String,
    /// Parameters the job was launched with
    pub parameters: JobParameters,
    pub status: BatchStatus,
    /// Executions of the steps that were started, in run order
    pub step_executions: Vec<StepExecution>,
    pub start_time: Instant,
    pub end_time: Instant,
    pub duration: Duration,
}

impl JobExecution {
    pub fn new(job_name: &str, parameters: JobParameters) -> Self {
        let now = Instant::now();
        Self {
            id: Uuid::new_v4(),
            job_name: job_name.to_string(),
            parameters,
            status: BatchStatus::Starting,
            step_executions: Vec::new(),
            start_time: now,
            end_time: now,
            duration: Duration::default(),
        }
    }
}

/// Represents an instance of a job.
///
/// A `JobInstance` is created through the [`JobBuilder`], which guarantees that
/// it holds at least one step and that step names are unique.
pub struct JobInstance<'a> {
    /// Unique identifier for this job instance
    id: Uuid,
    /// Human-readable name for the job
    name: String,
    /// Collection of steps that make up this job, in execution order
    steps: Vec<&'a dyn Step>,
}

impl JobInstance<'_> {
    pub fn get_id(&self) -> Uuid {
        self.id
    }

    /// Names of the steps, in execution order.
    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|step| step.get_name()).collect()
    }
}

impl Job for JobInstance<'_> {
    fn get_name(&self) -> &str {
        &self.name
    }

    fn execute(&self, job_execution: &mut JobExecution) -> JobResult<()> {
        for step in &self.steps {
            let mut step_execution = StepExecution::new(step.get_name());
            let result = step.execute(&mut step_execution, &job_execution.parameters);
            job_execution.step_executions.push(step_execution);

            // Abort on the first failing step, the remaining steps never run
            result?;
        }
        Ok(())
    }
}

/// Builder for creating a job instance.
///
/// # Example
///
/// ```rust
/// use hello_batch::core::{
///     job::JobBuilder,
///     step::{FnTasklet, RepeatStatus, StepBuilder},
/// };
///
/// # fn example() -> Result<(), hello_batch::BatchError> {
/// let tasklet = FnTasklet::new(|_, _| Ok(RepeatStatus::Finished));
/// let extract = StepBuilder::new("extract").tasklet(&tasklet).build();
/// let load = StepBuilder::new("load").tasklet(&tasklet).build();
///
/// let job = JobBuilder::new()
///     .name("import-customers".to_string())
///     .start(&extract)
///     .next(&load)
///     .build()?;
///
/// assert_eq!(job.step_names(), vec!["extract", "load"]);
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct JobBuilder<'a> {
    /// Optional name for the job (generated randomly if not specified)
    name: Option<String>,
    /// Collection of steps to be executed, in order
    steps: Vec<&'a dyn Step>,
}

impl<'a> JobBuilder<'a> {
    pub fn new() -> Self {
        Self {
            name: None,
            steps: Vec::new(),
        }
    }

    pub fn name(mut self, name: String) -> JobBuilder<'a> {
        self.name = Some(name);
        self
    }

    /// Sets the first step of the job.
    ///
    /// Semantically identical to `next()`, it only reads better for the initial step.
    pub fn start(mut self, step: &'a dyn Step) -> JobBuilder<'a> {
        self.steps.push(step);
        self
    }

    /// Adds a step to the job. Steps are executed in the order they are added.
    pub fn next(mut self, step: &'a dyn Step) -> JobBuilder<'a> {
        self.steps.push(step);
        self
    }

    /// Builds the `JobInstance`.
    ///
    /// If no name has been provided, a random name is generated.
    ///
    /// # Errors
    /// [`BatchError::Configuration`] when the job has no step, when a step has an
    /// empty name, or when two steps share the same name.
    pub fn build(self) -> JobResult<JobInstance<'a>> {
        let name = self.name.unwrap_or_else(build_name);

        if self.steps.is_empty() {
            return Err(BatchError::Configuration(format!(
                "job {} must contain at least one step",
                name
            )));
        }

        let mut step_names = HashSet::with_capacity(self.steps.len());
        for step in &self.steps {
            let step_name = step.get_name();
            if step_name.is_empty() {
                return Err(BatchError::Configuration(format!(
                    "job {} contains a step without a name",
                    name
                )));
            }
            if !step_names.insert(step_name) {
                return Err(BatchError::Configuration(format!(
                    "job {} contains more than one step named {}",
                    name, step_name
                )));
            }
        }

        Ok(JobInstance {
            id: Uuid::new_v4(),
            name,
            steps: self.steps,
        })
    }
}

/// Outcome of running a job: the execution record plus the error that stopped it.
#[derive(Debug)]
pub struct ExecutionResult {
    pub execution: JobExecution,
    pub error: Option<BatchError>,
}

impl ExecutionResult {
    pub fn status(&self) -> BatchStatus {
        self.execution.status
    }

    pub fn is_completed(&self) -> bool {
        self.execution.status == BatchStatus::Completed
    }

    pub fn error(&self) -> Option<&BatchError> {
        self.error.as_ref()
    }

    /// Name of the step that failed, if any.
    pub fn failed_step(&self) -> Option<&str> {
        self.execution
            .step_executions
            .iter()
            .find(|step_execution| step_execution.status == BatchStatus::Failed)
            .map(|step_execution| step_execution.name.as_str())
    }

    /// Process exit code for this result: 0 when completed, 1 otherwise.
    pub fn exit_code(&self) -> u8 {
        if self.is_completed() { 0 } else { 1 }
    }
}

/// Launches jobs.
///
/// The runner holds no state between runs: every call to [`JobRunner::run`]
/// creates a fresh [`JobExecution`] owning the parameters of that run.
#[derive(Debug, Default, Clone, Copy)]
pub struct JobRunner;

impl JobRunner {
    pub fn new() -> Self {
        Self
    }

    /// Runs `job` once with `parameters`.
    ///
    /// Steps run sequentially on the calling thread. The first step error stops
    /// the job: the result is then `Failed` and carries that error unchanged.
    pub fn run(&self, job: &dyn Job, parameters: JobParameters) -> ExecutionResult {
        let mut execution = JobExecution::new(job.get_name(), parameters);

        info!(
            "Job: [{}] launched with the following parameters: [{}], id: {}",
            execution.job_name,
            execution.parameters.to_json(),
            execution.id
        );

        let start = Instant::now();
        execution.start_time = start;
        execution.status = BatchStatus::Started;

        let outcome = job.execute(&mut execution);

        execution.end_time = Instant::now();
        execution.duration = start.elapsed();

        let error = match outcome {
            Ok(()) => {
                execution.status = BatchStatus::Completed;
                None
            }
            Err(error) => {
                execution.status = BatchStatus::Failed;
                error!("Job: [{}] failed: {}", execution.job_name, error);
                Some(error)
            }
        };

        info!(
            "Job: [{}] completed with the following status: [{}] in {:?}",
            execution.job_name, execution.status, execution.duration
        );

        ExecutionResult { execution, error }
    }
}
