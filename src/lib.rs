#![cfg_attr(docsrs, feature(doc_cfg))]

/*!
 # Hello Batch

 A minimal batch job runner inspired by Spring Batch tasklet steps. A job is a
 named, ordered sequence of steps; each step repeatedly invokes a tasklet until
 it reports that it has finished. Jobs run synchronously on the calling thread
 and stop at the first failing step.

 ## Core Concepts

- **Job:** a named sequence of one or more `Step`s, assembled with `JobBuilder`.
- **Step:** a named unit of work, unique within its job. `TaskletStep` runs a `Tasklet`.
- **Tasklet:** the caller-supplied work, returning `RepeatStatus::Finished` or
  `RepeatStatus::Continuable` (invoke me again).
- **JobParameters:** immutable per-execution key/value input (string, long, date, double).
- **JobRunner:** launches a job with its parameters and produces an `ExecutionResult`.

 ## Features

| **Feature** | **Description**                                             |
|-------------|-------------------------------------------------------------|
| greeting    | Enables the `GreetingTasklet` writing `Hello, <name>!`      |
| cli         | Builds the `hello-batch` launcher binary                    |
| full        | Enables all available features                              |

 ## Getting Started

```rust
use hello_batch::{
    core::{
        job::{JobBuilder, JobRunner},
        parameters::JobParameters,
        step::{FnTasklet, RepeatStatus, StepBuilder},
    },
    BatchError,
};

fn main() -> Result<(), BatchError> {
    let parameters = JobParameters::from_args(["name=World"])?;

    let tasklet = FnTasklet::new(|_contribution, chunk_context| {
        let name = chunk_context.job_parameters().get_string("name").unwrap_or("World");
        println!("Hello, {}!", name);
        Ok(RepeatStatus::Finished)
    });

    let step = StepBuilder::new("step1").tasklet(&tasklet).build();

    let job = JobBuilder::new()
        .name("basicJob".to_string())
        .start(&step)
        .build()?;

    let result = JobRunner::new().run(&job, parameters);
    assert!(result.is_completed());

    Ok(())
}
```
 */

/// Core module for batch operations
pub mod core;

/// Error types for batch operations
pub mod error;

#[doc(inline)]
pub use error::*;

/// Set of ready-made tasklets
pub mod tasklet;
