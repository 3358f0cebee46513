use std::fmt;
use std::time::Duration;

/// A single resolver invocation failed. Only ever shrinks the working set.
#[derive(Debug, thiserror::Error)]
pub enum AttemptError {
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("status {status} from {url}")]
    Status { url: String, status: u16 },
    #[error("failed to run {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{command} exited with {status}")]
    Exit { command: String, status: String },
    #[error("timed out after {0:?}")]
    Timeout(Duration),
    #[error("malformed response {reply:?}: {reason}")]
    Malformed { reply: String, reason: String },
}

impl AttemptError {
    pub(crate) fn malformed(reply: impl Into<String>, reason: impl fmt::Display) -> Self {
        Self::Malformed {
            reply: reply.into(),
            reason: reason.to_string(),
        }
    }
}

/// Invalid resolver selection requested by the caller.
#[derive(Debug, thiserror::Error)]
pub enum SelectionError {
    #[error("invalid name '{0}'")]
    UnknownResolver(String),
    #[error("resolver '{name}' unavailable: no usable {binary} binary")]
    ResolverUnavailable { name: String, binary: &'static str },
    #[error("name '{0}' disabled by user")]
    Disabled(String),
    #[error("all resolvers disabled")]
    AllDisabled,
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("duplicate name '{0}'")]
    Duplicate(String),
    #[error("cannot derive a resolver name from '{0}'")]
    Unnamed(String),
}

/// Every resolver of the selection was tried and failed.
#[derive(Debug, thiserror::Error)]
#[error("no resolver succeeded after {attempts} attempts{}", summary(.failures))]
pub struct ResolutionError {
    pub attempts: usize,
    pub failures: Vec<(String, AttemptError)>,
}

fn summary(failures: &[(String, AttemptError)]) -> String {
    failures
        .iter()
        .map(|(name, e)| format!("\n  {name}: {e}"))
        .collect()
}
