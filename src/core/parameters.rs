//! # Job Parameters
//!
//! Job parameters are the per-execution input of a job. They are created once per
//! launch (typically from command-line arguments), handed to the
//! [`JobRunner`](crate::core::job::JobRunner) and exposed read-only to every step
//! of that execution.
//!
//! ## Launch syntax
//!
//! Each argument is either `key=value` (a string parameter) or `key(type)=value`
//! where `type` is one of `string`, `long`, `double` or `date`:
//!
//! ```rust
//! use hello_batch::core::parameters::JobParameters;
//!
//! # fn example() -> Result<(), hello_batch::BatchError> {
//! let parameters = JobParameters::from_args(["name=World", "count(long)=3"])?;
//!
//! assert_eq!(parameters.get_string("name"), Some("World"));
//! assert_eq!(parameters.get_long("count"), Some(3));
//! # Ok(())
//! # }
//! ```

use std::{collections::BTreeMap, fmt};

use chrono::NaiveDate;
use serde::Serialize;

use crate::BatchError;

/// Accepted date layouts, the historical `yyyy/MM/dd` first.
const DATE_FORMATS: [&str; 2] = ["%Y/%m/%d", "%Y-%m-%d"];

/// A single scalar job parameter value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum JobParameter {
    String(String),
    Long(i64),
    Date(NaiveDate),
    Double(f64),
}

impl JobParameter {
    /// Name of the parameter type as written in the launch syntax.
    pub fn type_name(&self) -> &'static str {
        match self {
            JobParameter::String(_) => "string",
            JobParameter::Long(_) => "long",
            JobParameter::Date(_) => "date",
            JobParameter::Double(_) => "double",
        }
    }
}

impl fmt::Display for JobParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobParameter::String(value) => f.write_str(value),
            JobParameter::Long(value) => write!(f, "{}", value),
            JobParameter::Date(value) => write!(f, "{}", value.format("%Y-%m-%d")),
            JobParameter::Double(value) => write!(f, "{}", value),
        }
    }
}

impl From<&str> for JobParameter {
    fn from(value: &str) -> Self {
        JobParameter::String(value.to_string())
    }
}

impl From<String> for JobParameter {
    fn from(value: String) -> Self {
        JobParameter::String(value)
    }
}

impl From<i64> for JobParameter {
    fn from(value: i64) -> Self {
        JobParameter::Long(value)
    }
}

impl From<f64> for JobParameter {
    fn from(value: f64) -> Self {
        JobParameter::Double(value)
    }
}

impl From<NaiveDate> for JobParameter {
    fn from(value: NaiveDate) -> Self {
        JobParameter::Date(value)
    }
}

/// Immutable mapping from parameter keys to scalar values.
///
/// There is no way to modify a `JobParameters` once built: steps only ever
/// receive a shared reference to it, so the values seen by the first step of an
/// execution are the values seen by the last one.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct JobParameters {
    parameters: BTreeMap<String, JobParameter>,
}

impl JobParameters {
    /// Creates an empty set of parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses launch arguments (`key=value` or `key(type)=value`).
    ///
    /// When the same key appears more than once, the last occurrence wins.
    ///
    /// # Errors
    /// Returns [`BatchError::JobParameter`] on the first malformed argument.
    pub fn from_args<I, S>(args: I) -> Result<Self, BatchError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut builder = JobParametersBuilder::new();
        for arg in args {
            let (key, parameter) = parse_parameter(arg.as_ref())?;
            builder = builder.add_parameter(key, parameter);
        }
        Ok(builder.build())
    }

    pub fn get(&self, key: &str) -> Option<&JobParameter> {
        self.parameters.get(key)
    }

    /// Returns the value of `key` if it is a string parameter.
    pub fn get_string(&self, key: &str) -> Option<&str> {
        match self.parameters.get(key) {
            Some(JobParameter::String(value)) => Some(value),
            _ => None,
        }
    }

    /// Returns the value of `key` if it is a long parameter.
    pub fn get_long(&self, key: &str) -> Option<i64> {
        match self.parameters.get(key) {
            Some(JobParameter::Long(value)) => Some(*value),
            _ => None,
        }
    }

    /// Returns the value of `key` if it is a double parameter.
    pub fn get_double(&self, key: &str) -> Option<f64> {
        match self.parameters.get(key) {
            Some(JobParameter::Double(value)) => Some(*value),
            _ => None,
        }
    }

    /// Returns the value of `key` if it is a date parameter.
    pub fn get_date(&self, key: &str) -> Option<NaiveDate> {
        match self.parameters.get(key) {
            Some(JobParameter::Date(value)) => Some(*value),
            _ => None,
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.parameters.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    /// Iterates over the parameters in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &JobParameter)> {
        self.parameters.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Renders the parameters as a JSON object, for logging.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Builder for creating job parameters.
///
/// # Example
///
/// ```rust
/// use hello_batch::core::parameters::JobParametersBuilder;
///
/// let parameters = JobParametersBuilder::new()
///     .add_string("name", "World")
///     .add_long("run.id", 1)
///     .build();
///
/// assert_eq!(parameters.len(), 2);
/// ```
#[derive(Default)]
pub struct JobParametersBuilder {
    parameters: BTreeMap<String, JobParameter>,
}

impl JobParametersBuilder {
    pub fn new() -> Self {
        Self {
            parameters: BTreeMap::new(),
        }
    }

    /// Adds a parameter, replacing any previous value stored under `key`.
    pub fn add_parameter(mut self, key: impl Into<String>, parameter: JobParameter) -> Self {
        self.parameters.insert(key.into(), parameter);
        self
    }

    pub fn add_string(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.add_parameter(key, JobParameter::String(value.into()))
    }

    pub fn add_long(self, key: impl Into<String>, value: i64) -> Self {
        self.add_parameter(key, JobParameter::Long(value))
    }

    pub fn add_double(self, key: impl Into<String>, value: f64) -> Self {
        self.add_parameter(key, JobParameter::Double(value))
    }

    pub fn add_date(self, key: impl Into<String>, value: NaiveDate) -> Self {
        self.add_parameter(key, JobParameter::Date(value))
    }

    pub fn build(self) -> JobParameters {
        JobParameters {
            parameters: self.parameters,
        }
    }
}

/// Parses one launch argument into a key and a typed value.
///
/// The value is everything after the first `=`, so `url=a=b` binds `a=b`.
pub fn parse_parameter(arg: &str) -> Result<(String, JobParameter), BatchError> {
    let (declaration, value) = arg.split_once('=').ok_or_else(|| {
        BatchError::JobParameter(format!("expected key=value, got '{}'", arg))
    })?;

    let (key, kind) = match declaration.split_once('(') {
        Some((key, rest)) => {
            let kind = rest.strip_suffix(')').ok_or_else(|| {
                BatchError::JobParameter(format!("unterminated type in '{}'", declaration))
            })?;
            (key.trim(), Some(kind.trim().to_ascii_lowercase()))
        }
        None => (declaration.trim(), None),
    };

    if key.is_empty() {
        return Err(BatchError::JobParameter(format!(
            "missing parameter key in '{}'",
            arg
        )));
    }

    let parameter = match kind.as_deref() {
        None | Some("string") => JobParameter::String(value.to_string()),
        Some("long") => value.trim().parse().map(JobParameter::Long).map_err(|e| {
            BatchError::JobParameter(format!("'{}' is not a valid long for {}: {}", value, key, e))
        })?,
        Some("double") => value.trim().parse().map(JobParameter::Double).map_err(|e| {
            BatchError::JobParameter(format!(
                "'{}' is not a valid double for {}: {}",
                value, key, e
            ))
        })?,
        Some("date") => JobParameter::Date(parse_date(key, value.trim())?),
        Some(other) => {
            return Err(BatchError::JobParameter(format!(
                "unknown parameter type '{}' for {}",
                other, key
            )));
        }
    };

    Ok((key.to_string(), parameter))
}

fn parse_date(key: &str, value: &str) -> Result<NaiveDate, BatchError> {
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
        .ok_or_else(|| {
            BatchError::JobParameter(format!(
                "'{}' is not a valid date for {} (expected yyyy/MM/dd or yyyy-MM-dd)",
                value, key
            ))
        })
}
