use std::{
    fmt,
    time::{Duration, Instant},
};

use log::{debug, info, warn};
use serde::Serialize;
use uuid::Uuid;

use crate::BatchError;

use super::parameters::JobParameters;

/// Status of a job or step execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BatchStatus {
    /// Prior to execution.
    Starting,
    /// Currently running.
    Started,
    /// Ran to the end successfully.
    Completed,
    /// Stopped by an error.
    Failed,
}

impl fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BatchStatus::Starting => "STARTING",
            BatchStatus::Started => "STARTED",
            BatchStatus::Completed => "COMPLETED",
            BatchStatus::Failed => "FAILED",
        };
        f.write_str(label)
    }
}

/// Value returned by a tasklet after each invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepeatStatus {
    /// The tasklet has more work to do and must be invoked again.
    Continuable,
    /// The tasklet has finished executing.
    Finished,
}

/// Read-only context handed to each tasklet invocation.
pub struct ChunkContext<'a> {
    step_name: &'a str,
    job_parameters: &'a JobParameters,
    invocation: usize,
}

impl<'a> ChunkContext<'a> {
    pub fn new(step_name: &'a str, job_parameters: &'a JobParameters, invocation: usize) -> Self {
        Self {
            step_name,
            job_parameters,
            invocation,
        }
    }

    pub fn step_name(&self) -> &str {
        self.step_name
    }

    /// Parameters of the running job execution.
    pub fn job_parameters(&self) -> &JobParameters {
        self.job_parameters
    }

    /// 1-based number of the current invocation within the step.
    pub fn invocation(&self) -> usize {
        self.invocation
    }
}

/// Mutable per-invocation contribution of a tasklet to its step execution.
///
/// A fresh contribution is handed to every invocation; once the tasklet returns,
/// its counters are added to the [`StepExecution`].
#[derive(Debug, Default)]
pub struct StepContribution {
    read_count: usize,
    write_count: usize,
    filter_count: usize,
    exit_description: Option<String>,
}

impl StepContribution {
    pub fn increment_read_count(&mut self, count: usize) {
        self.read_count += count;
    }

    pub fn increment_write_count(&mut self, count: usize) {
        self.write_count += count;
    }

    pub fn increment_filter_count(&mut self, count: usize) {
        self.filter_count += count;
    }

    /// Replaces the exit description reported by the step.
    pub fn set_exit_description(&mut self, description: impl Into<String>) {
        self.exit_description = Some(description.into());
    }

    pub fn read_count(&self) -> usize {
        self.read_count
    }

    pub fn write_count(&self) -> usize {
        self.write_count
    }

    pub fn filter_count(&self) -> usize {
        self.filter_count
    }
}

/// Execution record of a single step.
#[derive(Debug)]
pub struct StepExecution {
    /// Unique identifier for this step execution
    pub id: Uuid,
    /// Name of the executed step
    pub name: String,
    /// Current status of the step execution
    pub status: BatchStatus,
    pub start_time: Instant,
    pub end_time: Instant,
    pub duration: Duration,
    /// Items reported as read by the tasklet
    pub read_count: usize,
    /// Items reported as written by the tasklet
    pub write_count: usize,
    /// Items reported as filtered by the tasklet
    pub filter_count: usize,
    /// Number of tasklet invocations that returned normally
    pub commit_count: usize,
    /// Number of tasklet invocations that raised an error
    pub rollback_count: usize,
    /// Last exit description set by the tasklet, or the failure message
    pub exit_description: Option<String>,
}

impl StepExecution {
    pub fn new(name: &str) -> Self {
        let now = Instant::now();
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            status: BatchStatus::Starting,
            start_time: now,
            end_time: now,
            duration: Duration::default(),
            read_count: 0,
            write_count: 0,
            filter_count: 0,
            commit_count: 0,
            rollback_count: 0,
            exit_description: None,
        }
    }

    /// Number of times the tasklet was invoked.
    pub fn invocation_count(&self) -> usize {
        self.commit_count + self.rollback_count
    }

    fn apply(&mut self, contribution: StepContribution) {
        self.read_count += contribution.read_count;
        self.write_count += contribution.write_count;
        self.filter_count += contribution.filter_count;
        if contribution.exit_description.is_some() {
            self.exit_description = contribution.exit_description;
        }
    }
}

/// A named unit of work inside a job.
pub trait Step {
    /// Name of the step, unique within its job.
    fn get_name(&self) -> &str;

    /// Executes the step.
    ///
    /// # Returns
    /// - `Ok(())`: the step completed, `step_execution.status` is `Completed`
    /// - `Err(BatchError)`: the step failed, `step_execution.status` is `Failed`
    fn execute(
        &self,
        step_execution: &mut StepExecution,
        job_parameters: &JobParameters,
    ) -> Result<(), BatchError>;
}

/// The unit of work run by a [`TaskletStep`].
pub trait Tasklet {
    fn execute(
        &self,
        contribution: &mut StepContribution,
        chunk_context: &ChunkContext<'_>,
    ) -> Result<RepeatStatus, BatchError>;
}

/// Adapts a closure into a [`Tasklet`].
///
/// # Example
///
/// ```rust
/// use hello_batch::core::step::{FnTasklet, RepeatStatus};
///
/// let tasklet = FnTasklet::new(|_contribution, chunk_context| {
///     let name = chunk_context.job_parameters().get_string("name").unwrap_or("World");
///     println!("Hello, {}!", name);
///     Ok(RepeatStatus::Finished)
/// });
/// ```
pub struct FnTasklet<F> {
    function: F,
}

impl<F> FnTasklet<F> {
    pub fn new(function: F) -> Self
    where
        F: Fn(&mut StepContribution, &ChunkContext<'_>) -> Result<RepeatStatus, BatchError>,
    {
        Self { function }
    }
}

impl<F> Tasklet for FnTasklet<F>
where
    F: Fn(&mut StepContribution, &ChunkContext<'_>) -> Result<RepeatStatus, BatchError>,
{
    fn execute(
        &self,
        contribution: &mut StepContribution,
        chunk_context: &ChunkContext<'_>,
    ) -> Result<RepeatStatus, BatchError> {
        (self.function)(contribution, chunk_context)
    }
}

/// A step that repeatedly invokes a tasklet until it reports `Finished`.
///
/// There is no upper bound on the number of invocations: a tasklet that always
/// returns [`RepeatStatus::Continuable`] keeps the step running forever.
pub struct TaskletStep<'a> {
    name: String,
    tasklet: &'a dyn Tasklet,
}

impl Step for TaskletStep<'_> {
    fn get_name(&self) -> &str {
        &self.name
    }

    fn execute(
        &self,
        step_execution: &mut StepExecution,
        job_parameters: &JobParameters,
    ) -> Result<(), BatchError> {
        let start_time = Instant::now();
        step_execution.start_time = start_time;
        step_execution.status = BatchStatus::Started;

        info!("Executing step: [{}], id: {}", self.name, step_execution.id);

        let result = loop {
            let invocation = step_execution.invocation_count() + 1;
            let chunk_context = ChunkContext::new(&self.name, job_parameters, invocation);
            let mut contribution = StepContribution::default();

            debug!("Invoking tasklet of step {} ({})", self.name, invocation);
            let repeat_status = self.tasklet.execute(&mut contribution, &chunk_context);
            step_execution.apply(contribution);

            match repeat_status {
                Ok(RepeatStatus::Continuable) => {
                    step_execution.commit_count += 1;
                }
                Ok(RepeatStatus::Finished) => {
                    step_execution.commit_count += 1;
                    break Ok(());
                }
                Err(error) => {
                    step_execution.rollback_count += 1;
                    break Err(error);
                }
            }
        };

        step_execution.end_time = Instant::now();
        step_execution.duration = start_time.elapsed();

        match &result {
            Ok(()) => {
                step_execution.status = BatchStatus::Completed;
                info!(
                    "Step: [{}] executed in {:?}",
                    self.name, step_execution.duration
                );
            }
            Err(error) => {
                step_execution.status = BatchStatus::Failed;
                step_execution.exit_description = Some(error.to_string());
                warn!("Step: [{}] failed: {}", self.name, error);
            }
        }

        result
    }
}

/// Entry point for building steps.
///
/// # Example
///
/// ```rust
/// use hello_batch::core::step::{FnTasklet, RepeatStatus, Step, StepBuilder};
///
/// let tasklet = FnTasklet::new(|_, _| Ok(RepeatStatus::Finished));
/// let step = StepBuilder::new("step1").tasklet(&tasklet).build();
///
/// assert_eq!(step.get_name(), "step1");
/// ```
pub struct StepBuilder {
    name: String,
}

impl StepBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }

    pub fn tasklet<'a>(self, tasklet: &'a dyn Tasklet) -> TaskletStepBuilder<'a> {
        TaskletStepBuilder {
            name: self.name,
            tasklet,
        }
    }
}

pub struct TaskletStepBuilder<'a> {
    name: String,
    tasklet: &'a dyn Tasklet,
}

impl<'a> TaskletStepBuilder<'a> {
    pub fn build(self) -> TaskletStep<'a> {
        TaskletStep {
            name: self.name,
            tasklet: self.tasklet,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use crate::{
        BatchError,
        core::parameters::{JobParameters, JobParametersBuilder},
    };

    use super::*;

    #[test]
    fn finished_tasklet_runs_once() -> Result<(), BatchError> {
        let calls = Cell::new(0);
        let tasklet = FnTasklet::new(|_, _| {
            calls.set(calls.get() + 1);
            Ok(RepeatStatus::Finished)
        });
        let step = StepBuilder::new("step1").tasklet(&tasklet).build();

        let mut step_execution = StepExecution::new(step.get_name());
        step.execute(&mut step_execution, &JobParameters::new())?;

        assert_eq!(calls.get(), 1);
        assert_eq!(step_execution.status, BatchStatus::Completed);
        assert_eq!(step_execution.commit_count, 1);
        assert_eq!(step_execution.rollback_count, 0);
        Ok(())
    }

    #[test]
    fn continuable_tasklet_is_invoked_again() -> Result<(), BatchError> {
        let tasklet = FnTasklet::new(|_, chunk_context| {
            if chunk_context.invocation() <= 4 {
                Ok(RepeatStatus::Continuable)
            } else {
                Ok(RepeatStatus::Finished)
            }
        });
        let step = StepBuilder::new("repeat").tasklet(&tasklet).build();

        let mut step_execution = StepExecution::new(step.get_name());
        step.execute(&mut step_execution, &JobParameters::new())?;

        assert_eq!(step_execution.invocation_count(), 5);
        assert_eq!(step_execution.commit_count, 5);
        Ok(())
    }

    #[test]
    fn contributions_accumulate_across_invocations() -> Result<(), BatchError> {
        let tasklet = FnTasklet::new(|contribution, chunk_context| {
            contribution.increment_read_count(2);
            contribution.increment_write_count(1);
            if chunk_context.invocation() == 3 {
                contribution.increment_filter_count(1);
                contribution.set_exit_description("done");
                Ok(RepeatStatus::Finished)
            } else {
                Ok(RepeatStatus::Continuable)
            }
        });
        let step = StepBuilder::new("count").tasklet(&tasklet).build();

        let mut step_execution = StepExecution::new(step.get_name());
        step.execute(&mut step_execution, &JobParameters::new())?;

        assert_eq!(step_execution.read_count, 6);
        assert_eq!(step_execution.write_count, 3);
        assert_eq!(step_execution.filter_count, 1);
        assert_eq!(step_execution.exit_description.as_deref(), Some("done"));
        Ok(())
    }

    #[test]
    fn failing_tasklet_fails_the_step() {
        let tasklet = FnTasklet::new(|_, _| Err(BatchError::Tasklet("boom".to_string())));
        let step = StepBuilder::new("broken").tasklet(&tasklet).build();

        let mut step_execution = StepExecution::new(step.get_name());
        let result = step.execute(&mut step_execution, &JobParameters::new());

        assert!(matches!(result, Err(BatchError::Tasklet(message)) if message == "boom"));
        assert_eq!(step_execution.status, BatchStatus::Failed);
        assert_eq!(step_execution.rollback_count, 1);
        assert_eq!(
            step_execution.exit_description.as_deref(),
            Some("Tasklet error: boom")
        );
    }

    #[test]
    fn chunk_context_exposes_job_parameters() -> Result<(), BatchError> {
        let seen = Cell::new(false);
        let tasklet = FnTasklet::new(|_, chunk_context| {
            seen.set(
                chunk_context.step_name() == "params"
                    && chunk_context.job_parameters().get_string("name") == Some("World"),
            );
            Ok(RepeatStatus::Finished)
        });
        let step = StepBuilder::new("params").tasklet(&tasklet).build();
        let parameters = JobParametersBuilder::new().add_string("name", "World").build();

        let mut step_execution = StepExecution::new(step.get_name());
        step.execute(&mut step_execution, &parameters)?;

        assert!(seen.get());
        Ok(())
    }

    #[test]
    fn batch_status_is_displayed_upper_case() {
        assert_eq!(BatchStatus::Completed.to_string(), "COMPLETED");
        assert_eq!(BatchStatus::Failed.to_string(), "FAILED");
    }
}
