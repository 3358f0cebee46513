use std::fmt;
use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;

use crate::error::AttemptError;

pub use self::dns::DigLookup;
pub use self::http::HttpLookup;
pub use self::stun::StunIpLookup;

mod command;
mod dns;
mod http;
mod stun;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResolverKind {
    Http,
    Dns,
    Stun,
}

impl ResolverKind {
    /// Prefix given to every resolver name of this kind.
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Http => "www",
            Self::Dns => "dns",
            Self::Stun => "stun",
        }
    }
}

impl fmt::Display for ResolverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Http => "HTTP",
            Self::Dns => "DNS",
            Self::Stun => "STUN",
        })
    }
}

/// One way of asking somebody else what our address is.
#[async_trait::async_trait]
pub trait Lookup: Send + Sync {
    async fn lookup(&self) -> Result<Ipv4Addr, AttemptError>;
}

#[derive(Clone)]
pub struct Resolver {
    name: String,
    kind: ResolverKind,
    timeout: Duration,
    lookup: Arc<dyn Lookup>,
}

impl Resolver {
    pub fn new(name: impl Into<String>, kind: ResolverKind, lookup: impl Lookup + 'static) -> Self {
        Self {
            name: name.into(),
            kind,
            timeout: DEFAULT_TIMEOUT,
            lookup: Arc::new(lookup),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ResolverKind {
        self.kind
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Runs the lookup, giving up after the resolver's timeout.
    pub async fn invoke(&self) -> Result<Ipv4Addr, AttemptError> {
        match tokio::time::timeout(self.timeout, self.lookup.lookup()).await {
            Ok(result) => result,
            Err(_) => Err(AttemptError::Timeout(self.timeout)),
        }
    }
}

impl fmt::Debug for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("timeout", &self.timeout)
            .finish()
    }
}

pub(crate) fn parse_addr(reply: &str) -> Result<Ipv4Addr, AttemptError> {
    let reply = reply.trim();
    if reply.is_empty() {
        return Err(AttemptError::malformed(reply, "empty response"));
    }
    reply
        .parse::<Ipv4Addr>()
        .map_err(|e| AttemptError::malformed(reply, e))
}

/// Label just below the TLD, ignoring any port: `stun.ekiga.net:3478` -> `ekiga`.
pub(crate) fn label_below_tld(host: &str) -> Option<&str> {
    let host = host.split(':').next()?.trim_end_matches('.');
    let labels = host.split('.').collect::<Vec<_>>();
    let label = match labels.len() {
        0 => return None,
        1 => labels[0],
        n => labels[n - 2],
    };
    (!label.is_empty()).then_some(label)
}
