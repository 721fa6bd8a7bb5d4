//! # Countdown Job
//!
//! Shows the repeat contract of tasklet steps: the tasklet returns
//! `RepeatStatus::Continuable` until its counter reaches zero, and the step keeps
//! invoking it.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --example countdown -- "from(long)=5"
//! ```

use std::{cell::Cell, env, process::ExitCode};

use env_logger::Env;
use log::info;
use hello_batch::{
    BatchError,
    core::{
        job::{JobBuilder, JobRunner},
        parameters::JobParameters,
        step::{FnTasklet, RepeatStatus, StepBuilder},
    },
};

fn main() -> Result<ExitCode, BatchError> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let parameters = JobParameters::from_args(env::args().skip(1))?;
    let remaining = Cell::new(parameters.get_long("from").unwrap_or(3));

    let countdown = FnTasklet::new(|contribution, _chunk_context| {
        let current = remaining.get();
        if current <= 0 {
            println!("Liftoff!");
            return Ok(RepeatStatus::Finished);
        }
        println!("{}...", current);
        contribution.increment_write_count(1);
        remaining.set(current - 1);
        Ok(RepeatStatus::Continuable)
    });

    let step = StepBuilder::new("countdown").tasklet(&countdown).build();
    let job = JobBuilder::new()
        .name("countdownJob".to_string())
        .start(&step)
        .build()?;

    let result = JobRunner::new().run(&job, parameters);

    for step_execution in &result.execution.step_executions {
        info!(
            "Step {}: status={}, commits={}, writes={}",
            step_execution.name,
            step_execution.status,
            step_execution.commit_count,
            step_execution.write_count
        );
    }

    Ok(ExitCode::from(result.exit_code()))
}
