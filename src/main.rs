//! `hello-batch` launcher: runs a single-step greeting job once.
//!
//! ```text
//! hello-batch                          # Hello, World!
//! hello-batch name=Batch               # Hello, Batch!  (read when the step runs)
//! hello-batch --binding eager name=Ada # Hello, Ada!    (bound while assembling the job)
//! ```

use std::process::ExitCode;

use clap::{Parser, ValueEnum};
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

/// Job parameter holding the greeted name.
const NAME_PARAMETER: &str = "name";

/// Exit status when the job could not be assembled or its parameters are invalid.
const LAUNCH_ERROR_EXIT_CODE: u8 = 2;

/// How the greeted name is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Binding {
    /// Always greet the world
    Fixed,
    /// Read the `name` parameter when the step runs
    Lazy,
    /// Read the `name` parameter while the job is assembled
    Eager,
}

/// Runs a single-step greeting batch job
#[derive(Debug, Parser)]
#[command(name = "hello-batch", version, about, long_about = None)]
struct Cli {
    /// Name of the job
    #[arg(long, default_value = "basicJob")]
    job_name: String,

    /// Name of the greeting step
    #[arg(long, default_value = "step1")]
    step_name: String,

    /// Binding of the greeted name (default: lazy when a `name` parameter is given, fixed otherwise)
    #[arg(long, value_enum)]
    binding: Option<Binding>,

    /// Job parameters, as key=value or key(type)=value with type one of string, long, double, date
    #[arg(value_name = "PARAMETERS")]
    parameters: Vec<String>,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match launch(&cli) {
        Ok(exit_code) => ExitCode::from(exit_code),
        Err(error) => {
            eprintln!("Error: {}", error);
            ExitCode::from(LAUNCH_ERROR_EXIT_CODE)
        }
    }
}

/// Assembles the job from the command line and runs it once.
///
/// Errors are launch errors only; a failing job is reported through its exit code.
fn launch(cli: &Cli) -> Result<u8, BatchError> {
    let parameters = JobParameters::from_args(&cli.parameters)?;

    let binding = cli.binding.unwrap_or(if parameters.contains_key(NAME_PARAMETER) {
        Binding::Lazy
    } else {
        Binding::Fixed
    });

    let builder = GreetingTaskletBuilder::new();
    let builder = match binding {
        Binding::Fixed => builder,
        Binding::Lazy => builder.name_parameter(NAME_PARAMETER),
        Binding::Eager => builder.bind_parameter(&parameters, NAME_PARAMETER)?,
    };
    let tasklet = builder.to_stdout();

    let step = StepBuilder::new(&cli.step_name).tasklet(&tasklet).build();
    let job = JobBuilder::new()
        .name(cli.job_name.clone())
        .start(&step)
        .build()?;

    let result = JobRunner::new().run(&job, parameters);

    Ok(result.exit_code())
}
