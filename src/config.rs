//! Run settings resolved from flags, then environment, then defaults.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::interpreter::OutputMode;

pub const ENV_OUTPUT: &str = "BFOOP_OUTPUT";
pub const ENV_TIMEOUT_MS: &str = "BFOOP_TIMEOUT_MS";
pub const ENV_MAX_STEPS: &str = "BFOOP_MAX_STEPS";
pub const ENV_REPL_MODE: &str = "BFOOP_REPL_MODE";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid {var} value: '{value}' ({reason})")]
    InvalidEnv {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Settings for a single program execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunConfig {
    pub output_mode: OutputMode,
    /// Wall-clock limit; `None` runs until the program halts.
    pub timeout: Option<Duration>,
    /// Step limit; `None` is unlimited.
    pub max_steps: Option<usize>,
}

impl RunConfig {
    /// Resolve each setting: flag -> environment -> default.
    pub fn resolve(
        output_mode: Option<OutputMode>,
        timeout_ms: Option<u64>,
        max_steps: Option<u64>,
    ) -> Result<Self, ConfigError> {
        Self::resolve_with(output_mode, timeout_ms, max_steps, |var| env::var(var).ok())
    }

    /// Same as [`RunConfig::resolve`] with a custom environment lookup.
    pub fn resolve_with<F>(
        output_mode: Option<OutputMode>,
        timeout_ms: Option<u64>,
        max_steps: Option<u64>,
        lookup: F,
    ) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let output_mode = match output_mode {
            Some(mode) => mode,
            None => env_value(&lookup, ENV_OUTPUT)?.unwrap_or_default(),
        };
        let timeout_ms = match timeout_ms {
            Some(ms) => Some(ms),
            None => env_value::<u64, _>(&lookup, ENV_TIMEOUT_MS)?,
        };
        let max_steps = match max_steps {
            Some(n) => Some(n),
            None => env_value::<u64, _>(&lookup, ENV_MAX_STEPS)?,
        };

        Ok(Self {
            output_mode,
            timeout: timeout_ms.map(Duration::from_millis),
            max_steps: max_steps.map(|n| usize::try_from(n).unwrap_or(usize::MAX)),
        })
    }

    /// Whether execution needs a [`crate::StepControl`] at all.
    pub fn is_limited(&self) -> bool {
        self.timeout.is_some() || self.max_steps.is_some()
    }
}

/// Parse `var` if it is set; an empty value counts as unset.
fn env_value<T, F>(lookup: &F, var: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: ToString,
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(var) else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<T>()
        .map(Some)
        .map_err(|e| ConfigError::InvalidEnv {
            var,
            value: raw.clone(),
            reason: e.to_string(),
        })
}
