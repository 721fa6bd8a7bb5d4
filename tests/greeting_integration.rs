mod common;

use std::io::{self, ErrorKind};

use anyhow::Result;
use common::mocks::MockSink;
use hello_batch::{
    BatchError,
    core::{
        job::{JobBuilder, JobRunner},
        parameters::{JobParameters, JobParametersBuilder},
        step::{BatchStatus, StepBuilder},
    },
    tasklet::greeting::GreetingTaskletBuilder,
};

#[test]
fn hello_world_job_prints_the_default_greeting() -> Result<()> {
    let tasklet = GreetingTaskletBuilder::new().from_writer(Vec::new());
    let step = StepBuilder::new("step1").tasklet(&tasklet).build();
    let job = JobBuilder::new().name("job".to_string()).start(&step).build()?;

    let result = JobRunner::new().run(&job, JobParameters::new());

    assert!(result.is_completed());
    assert_eq!(String::from_utf8(tasklet.into_inner())?, "Hello, World!\n");
    Ok(())
}

#[test]
fn name_parameter_is_greeted() -> Result<()> {
    let tasklet = GreetingTaskletBuilder::new()
        .name_parameter("name")
        .from_writer(Vec::new());
    let step = StepBuilder::new("step1").tasklet(&tasklet).build();
    let job = JobBuilder::new()
        .name("basicJob".to_string())
        .start(&step)
        .build()?;

    let parameters = JobParametersBuilder::new().add_string("name", "World").build();
    let result = JobRunner::new().run(&job, parameters);

    assert!(result.is_completed());
    assert_eq!(result.execution.step_executions[0].write_count, 1);
    assert_eq!(String::from_utf8(tasklet.into_inner())?, "Hello, World!\n");
    Ok(())
}

#[test]
fn eager_and_lazy_bindings_greet_the_same_launch_argument() -> Result<()> {
    let parameters = JobParameters::from_args(["name=Batch"])?;

    let lazy = GreetingTaskletBuilder::new()
        .name_parameter("name")
        .from_writer(Vec::new());
    let eager = GreetingTaskletBuilder::new()
        .bind_parameter(&parameters, "name")?
        .from_writer(Vec::new());

    let lazy_step = StepBuilder::new("step1").tasklet(&lazy).build();
    let eager_step = StepBuilder::new("step3").tasklet(&eager).build();
    let job = JobBuilder::new()
        .name("basicJob".to_string())
        .start(&lazy_step)
        .next(&eager_step)
        .build()?;

    let result = JobRunner::new().run(&job, parameters);

    assert!(result.is_completed());
    assert_eq!(String::from_utf8(lazy.into_inner())?, "Hello, Batch!\n");
    assert_eq!(String::from_utf8(eager.into_inner())?, "Hello, Batch!\n");
    Ok(())
}

#[test]
fn missing_name_parameter_fails_the_job() -> Result<()> {
    let tasklet = GreetingTaskletBuilder::new()
        .name_parameter("name")
        .from_writer(Vec::new());
    let step = StepBuilder::new("step1").tasklet(&tasklet).build();
    let job = JobBuilder::new().start(&step).build()?;

    let result = JobRunner::new().run(&job, JobParameters::new());

    assert_eq!(result.status(), BatchStatus::Failed);
    assert!(matches!(result.error(), Some(BatchError::JobParameter(_))));
    assert!(tasklet.into_inner().is_empty());
    Ok(())
}

#[test]
fn sink_failure_fails_the_job() -> Result<()> {
    let mut sink = MockSink::new();
    sink.expect_write()
        .times(1)
        .returning(|_| Err(io::Error::new(ErrorKind::BrokenPipe, "stdout closed")));
    sink.expect_flush().never();

    let tasklet = GreetingTaskletBuilder::new().from_writer(sink);
    let step = StepBuilder::new("step1").tasklet(&tasklet).build();
    let job = JobBuilder::new().start(&step).build()?;

    let result = JobRunner::new().run(&job, JobParameters::new());

    assert_eq!(result.status(), BatchStatus::Failed);
    assert!(matches!(
        result.error(),
        Some(BatchError::Io(error)) if error.kind() == ErrorKind::BrokenPipe
    ));
    Ok(())
}

#[test]
fn greeting_is_flushed_after_writing() -> Result<()> {
    let mut sink = MockSink::new();
    sink.expect_write().returning(|buf| Ok(buf.len()));
    sink.expect_flush().times(1).returning(|| Ok(()));

    let tasklet = GreetingTaskletBuilder::new().name("Ada").from_writer(sink);
    let step = StepBuilder::new("step1").tasklet(&tasklet).build();
    let job = JobBuilder::new().start(&step).build()?;

    let result = JobRunner::new().run(&job, JobParameters::new());

    assert!(result.is_completed());
    Ok(())
}
