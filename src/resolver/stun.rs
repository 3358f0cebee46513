use std::net::Ipv4Addr;
use std::path::PathBuf;
use std::time::Duration;

use super::{command, parse_addr, Lookup, DEFAULT_TIMEOUT};
use crate::error::AttemptError;

/// Binding request to a public STUN server, delegated to `stunip.py`.
#[derive(Debug, Clone)]
pub struct StunIpLookup {
    stunip: PathBuf,
    server: String,
    timeout: Duration,
}

impl StunIpLookup {
    pub fn new(stunip: impl Into<PathBuf>, server: impl Into<String>) -> Self {
        Self {
            stunip: stunip.into(),
            server: server.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn server(&self) -> &str {
        &self.server
    }

    fn args(&self) -> Vec<String> {
        vec![
            "-t".to_owned(),
            "1".to_owned(),
            "-m".to_owned(),
            self.timeout.as_secs().max(1).to_string(),
            self.server.clone(),
        ]
    }
}

#[async_trait::async_trait]
impl Lookup for StunIpLookup {
    async fn lookup(&self) -> Result<Ipv4Addr, AttemptError> {
        let stdout = command::output(&self.stunip, &self.args()).await?;
        parse_addr(stdout.lines().next().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_line() {
        let lookup = StunIpLookup::new("stunip.py", "stun.ekiga.net")
            .with_timeout(Duration::from_secs(7));
        assert_eq!(lookup.args(), ["-t", "1", "-m", "7", "stun.ekiga.net"]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn reads_first_line_only() {
        use std::fs;
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let stunip = dir.path().join("stunip.py");
        fs::write(&stunip, "#!/bin/sh\necho 203.0.113.7\necho junk\n").unwrap();
        fs::set_permissions(&stunip, fs::Permissions::from_mode(0o755)).unwrap();

        let addr = StunIpLookup::new(stunip.clone(), "stun.ekiga.net").lookup().await.unwrap();
        assert_eq!(addr, Ipv4Addr::new(203, 0, 113, 7));
    }
}
