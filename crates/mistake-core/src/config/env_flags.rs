//! Boolean toggles read from the process environment
//!
//! Flags accept exactly two values, `0` and `1`. Anything else produces a
//! warning and the caller's default is used instead.

use std::collections::HashMap;

use super::ConfigWarning;

/// Read-only view of environment variables
pub trait EnvSource {
    /// Look up a variable, `None` when unset
    fn var(&self, name: &str) -> Option<String>;
}

/// The real process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        // Non-UTF-8 values are kept (lossily) so they are reported as malformed
        // instead of silently treated as unset.
        std::env::var_os(name).map(|value| value.to_string_lossy().into_owned())
    }
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

impl EnvSource for HashMap<&str, &str> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).map(|value| value.to_string())
    }
}

/// Outcome of reading one flag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagRead {
    pub value: bool,
    pub warning: Option<ConfigWarning>,
}

/// Parse a raw flag value without touching the environment.
pub fn parse_bool_flag(name: &str, raw: Option<&str>, default: bool) -> FlagRead {
    let Some(raw) = raw else {
        return FlagRead {
            value: default,
            warning: None,
        };
    };

    match raw.trim().parse::<i64>() {
        Ok(1) => FlagRead {
            value: true,
            warning: None,
        },
        Ok(0) => FlagRead {
            value: false,
            warning: None,
        },
        _ => FlagRead {
            value: default,
            warning: Some(ConfigWarning::InvalidFlag {
                name: name.to_string(),
                value: raw.to_string(),
            }),
        },
    }
}

/// Read a flag from `env`, logging a warning for malformed values
pub fn read_bool_flag_from(env: &dyn EnvSource, name: &str, default: bool) -> FlagRead {
    let raw = env.var(name);
    let read = parse_bool_flag(name, raw.as_deref(), default);
    if let Some(warning) = &read.warning {
        tracing::warn!("{}", warning);
    }
    read
}

/// Read a flag from the process environment.
///
/// Never fails: unset returns `default`, malformed values warn and return
/// `default`.
pub fn read_bool_flag(name: &str, default: bool) -> bool {
    read_bool_flag_from(&ProcessEnv, name, default).value
}
