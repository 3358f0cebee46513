use std::net::Ipv4Addr;
use std::path::PathBuf;
use std::time::Duration;

use rand::seq::SliceRandom;

use super::{command, parse_addr, Lookup, DEFAULT_TIMEOUT};
use crate::error::AttemptError;

/// Asks an authoritative "whoami" zone for our address through `dig`.
#[derive(Debug, Clone)]
pub struct DigLookup {
    dig: PathBuf,
    servers: Vec<String>,
    name: String,
    class: Option<String>,
    record_type: Option<String>,
    timeout: Duration,
}

impl DigLookup {
    pub fn new(
        dig: impl Into<PathBuf>,
        servers: impl IntoIterator<Item = impl Into<String>>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            dig: dig.into(),
            servers: servers.into_iter().map(Into::into).collect(),
            name: name.into(),
            class: None,
            record_type: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.class = Some(class.into());
        self
    }

    pub fn with_type(mut self, record_type: impl Into<String>) -> Self {
        self.record_type = Some(record_type.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn query_name(&self) -> &str {
        &self.name
    }

    fn args(&self, server: &str) -> Vec<String> {
        let mut args = vec![format!("@{server}")];
        if let Some(class) = &self.class {
            args.extend(["-c".to_owned(), class.clone()]);
        }
        if let Some(record_type) = &self.record_type {
            args.extend(["-t".to_owned(), record_type.clone()]);
        }
        args.extend([
            "-q".to_owned(),
            self.name.clone(),
            "+short".to_owned(),
            format!("+time={}", self.timeout.as_secs().max(1)),
        ]);
        args
    }
}

#[async_trait::async_trait]
impl Lookup for DigLookup {
    async fn lookup(&self) -> Result<Ipv4Addr, AttemptError> {
        let args = match self.servers.choose(&mut rand::thread_rng()) {
            Some(server) => self.args(server),
            None => return Err(AttemptError::malformed("", "no DNS servers configured")),
        };
        let stdout = command::output(&self.dig, &args).await?;
        parse_addr(&short_answer(&stdout))
    }
}

/// `+short` prints the answer on the first line, the address always being the
/// last word once TXT quotes are stripped (`"ns" "192.0.2.1"`).
fn short_answer(stdout: &str) -> String {
    let line = stdout.lines().next().unwrap_or_default().replace('"', "");
    line.split_whitespace().last().unwrap_or_default().to_owned()
}
