//! # Hello Parameter Job
//!
//! Greets the value of the `name` job parameter, once with a tasklet that reads
//! the parameter when the step runs, and once with a tasklet whose name was bound
//! while the job was being assembled.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --example hello_parameter --features greeting -- name=Batch
//! ```

use std::{env, process::ExitCode};

use env_logger::Env;
use log::info;
use hello_batch::{
    BatchError,
    core::{
        job::{JobBuilder, JobRunner},
        parameters::JobParameters,
        step::{FnTasklet, RepeatStatus, StepBuilder},
    },
    tasklet::greeting::GreetingTaskletBuilder,
};

fn main() -> Result<ExitCode, BatchError> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let parameters = JobParameters::from_args(env::args().skip(1))?;
    let runner = JobRunner::new();

    // Late binding: the tasklet looks the parameter up in its chunk context
    info!("Running the lazily bound greeting");
    let lazy_tasklet = FnTasklet::new(|_contribution, chunk_context| {
        let name = chunk_context
            .job_parameters()
            .get("name")
            .map(ToString::to_string)
            .unwrap_or_else(|| "World".to_string());
        println!("Hello, {}!", name);
        Ok(RepeatStatus::Finished)
    });
    let lazy_step = StepBuilder::new("step1").tasklet(&lazy_tasklet).build();
    let lazy_job = JobBuilder::new()
        .name("basicJob".to_string())
        .start(&lazy_step)
        .build()?;
    let lazy_result = runner.run(&lazy_job, parameters.clone());

    // Early binding: the name is resolved before the step even exists
    info!("Running the eagerly bound greeting");
    let eager_tasklet = GreetingTaskletBuilder::new()
        .bind_parameter(&parameters, "name")?
        .to_stdout();
    let eager_step = StepBuilder::new("step3").tasklet(&eager_tasklet).build();
    let eager_job = JobBuilder::new()
        .name("basicJob".to_string())
        .start(&eager_step)
        .build()?;
    let eager_result = runner.run(&eager_job, parameters);

    Ok(ExitCode::from(lazy_result.exit_code().max(eager_result.exit_code())))
}
