use chrono::prelude::*;
use chrono::{DateTime, Local, Utc};
use serde::Deserialize;
use std::time::SystemTime;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[allow(clippy::upper_case_acronyms)]
pub enum TimestampFormat {
    UTC,
    Local,
    None,
    Redacted,
}

impl Default for TimestampFormat {
    fn default() -> Self {
        Self::None
    }
}

/// Whether terminal sinks should emit ANSI escapes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorChoice {
    Auto,
    Always,
    Never,
}

impl Default for ColorChoice {
    fn default() -> Self {
        Self::Auto
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ReporterOptions {
    /// Initial state of the dispatch gate.
    pub enabled: bool,
    /// A silent reporter refuses every sink.
    pub silent: bool,
    /// Send every write to the error-direction sinks.
    pub redirect_to_error: bool,
    /// Prefix of remote progress session ids, the OS pid when unset.
    pub process_identity: Option<String>,
    pub timestamp_format: TimestampFormat,
}

impl Default for ReporterOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            silent: false,
            redirect_to_error: false,
            process_identity: None,
            timestamp_format: TimestampFormat::None,
        }
    }
}

impl ReporterOptions {
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_silent(mut self, silent: bool) -> Self {
        self.silent = silent;
        self
    }

    pub fn with_redirect_to_error(mut self, redirect: bool) -> Self {
        self.redirect_to_error = redirect;
        self
    }

    pub fn with_process_identity<S: Into<String>>(mut self, identity: S) -> Self {
        self.process_identity = Some(identity.into());
        self
    }

    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }
}

pub(crate) fn format_timestamp(format: TimestampFormat, at: SystemTime) -> String {
    match format {
        TimestampFormat::None => String::new(),
        TimestampFormat::Redacted => "[ ] ".to_string(), // for testing
        TimestampFormat::Local => {
            let datetime: DateTime<Local> = at.into();
            let rounded = datetime.round_subsecs(0);
            format!("<dim>[{}]</> ", rounded.format("%I:%M:%S%p"))
        }
        TimestampFormat::UTC => {
            let datetime: DateTime<Utc> = at.into();
            let rounded = datetime.round_subsecs(0);
            format!("<dim>[{:?}]</> ", rounded)
        }
    }
}
