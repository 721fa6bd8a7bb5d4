//! # Hello World Job
//!
//! The smallest possible job: one step whose tasklet prints `Hello, World!`.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --example hello_world --features greeting
//! ```

use std::process::ExitCode;

use env_logger::Env;
use hello_batch::{
    BatchError,
    core::{
        job::{JobBuilder, JobRunner},
        parameters::JobParameters,
        step::StepBuilder,
    },
    tasklet::greeting::GreetingTaskletBuilder,
};

fn main() -> Result<ExitCode, BatchError> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let tasklet = GreetingTaskletBuilder::new().to_stdout();

    let step = StepBuilder::new("step1").tasklet(&tasklet).build();

    let job = JobBuilder::new()
        .name("job".to_string())
        .start(&step)
        .build()?;

    let result = JobRunner::new().run(&job, JobParameters::new());

    Ok(ExitCode::from(result.exit_code()))
}
