use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::binary;
use crate::error::{RegistryError, SelectionError};
use crate::resolver::{
    label_below_tld, DigLookup, HttpLookup, Resolver, ResolverKind, StunIpLookup, DEFAULT_TIMEOUT,
};

const WWW_SOURCES: &[(&str, Option<&str>)] = &[
    ("http://whatismyip.akamai.com", None),
    ("http://checkip.amazonaws.com", None),
    ("http://curlmyip.net", None),
    ("http://icanhazip.com", None),
    ("http://v4.ident.me", None),
    ("http://ifconfig.me", None),
    ("https://ip-addr.es", None),
    ("http://ipecho.net/plain", None),
    ("https://api.ipify.org", None),
    ("http://ipinfo.io/ip", None),
    ("http://4.ipquail.com/ip", None),
    ("http://myexternalip.com/raw", None),
    ("https://ipaddr.pub/cli", Some("ipaddr-pub")),
    ("https://myip.dnsomatic.com", None),
];

/// A "whoami" zone answering with the address of the querying resolver.
#[derive(Debug, Clone, Copy)]
pub struct DnsSource {
    pub name: Option<&'static str>,
    pub query: &'static str,
    pub class: Option<&'static str>,
    pub record_type: Option<&'static str>,
    pub servers: &'static [&'static str],
}

const DNS_SOURCES: &[DnsSource] = &[
    DnsSource {
        name: None,
        query: "whoami.akamai.net",
        class: None,
        record_type: None,
        servers: &[
            "ns1-1.akamaitech.net",
            "ns2-193.akamaitech.net",
            "ns3-193.akamaitech.net",
            "ns4-193.akamaitech.net",
            "ns5-193.akamaitech.net",
        ],
    },
    DnsSource {
        name: None,
        query: "whoami.ds.akahelp.net",
        class: None,
        record_type: Some("txt"),
        servers: &[
            "a1-67.akam.net",
            "a11-67.akam.net",
            "a12-67.akam.net",
            "a13-67.akam.net",
            "a18-67.akam.net",
            "a22-67.akam.net",
            "a28-67.akam.net",
            "a3-67.akam.net",
            "a4-67.akam.net",
            "a5-67.akam.net",
            "a6-67.akam.net",
            "a7-67.akam.net",
            "a9-67.akam.net",
        ],
    },
    DnsSource {
        name: Some("cloudflare"),
        query: "whoami.cloudflare",
        class: Some("ch"),
        record_type: Some("txt"),
        servers: &["1.1.1.1", "1.0.0.1"],
    },
    DnsSource {
        name: None,
        query: "o-o.myaddr.l.google.com",
        class: None,
        record_type: Some("txt"),
        servers: &[
            "ns1.google.com",
            "ns2.google.com",
            "ns3.google.com",
            "ns4.google.com",
        ],
    },
];

const STUN_SOURCES: &[(&str, Option<&str>)] = &[
    ("stun1.l.google.com:19302", Some("google-1")),
    ("stun2.l.google.com:19302", Some("google-2")),
    ("stun3.l.google.com:19302", Some("google-3")),
    ("stun4.l.google.com:19302", Some("google-4")),
    ("stun.acronis.com", None),
    ("stun.bethesda.net", None),
    ("stun.callwithus.com", None),
    ("stun.counterpath.net", None),
    ("stun.easyvoip.com", None),
    ("stun.ekiga.net", None),
    ("stun.gmx.net", None),
    ("stun.intervoip.com", None),
    ("stun.ooma.com", None),
    ("stun.poivy.com", None),
    ("stun.sipgate.net", None),
    ("stun.siptraffic.com", None),
    ("stun.sonetel.com", None),
    ("stun.stunprotocol.org", None),
    ("stun.vivox.com", None),
    ("stun.voipbuster.com", None),
    ("stun.voipgate.com", None),
    ("stun.voipstunt.com", None),
    ("stun.xten.com", None),
];

/// Builds the registry of every resolver usable in this run.
///
/// HTTP resolvers are always present. DNS and STUN resolvers are added only
/// when `dig_bin` / `stunip_bin` can be found (see [`binary::locate`]); an
/// empty value disables that kind. Never fails.
pub fn build_registry(dig_bin: &str, stunip_bin: &str, timeout: Duration) -> Registry {
    let dig = binary::locate(dig_bin);
    let stunip = binary::locate(stunip_bin);
    tracing::debug!(?dig, ?stunip, "helper binaries");

    let mut registry = Registry::new(dig, stunip).with_timeout(timeout);
    registry.add_builtin();
    registry
}

/// Named resolvers available in one run.
#[derive(Debug, Clone)]
pub struct Registry {
    resolvers: Vec<Resolver>,
    unavailable: BTreeMap<String, &'static str>,
    dig: Option<PathBuf>,
    stunip: Option<PathBuf>,
    timeout: Duration,
}

impl Registry {
    /// Empty registry; DNS and STUN resolvers need their helper binary path.
    pub fn new(dig: Option<PathBuf>, stunip: Option<PathBuf>) -> Self {
        Self {
            resolvers: Vec::new(),
            unavailable: BTreeMap::new(),
            dig,
            stunip,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn dig(&self) -> Option<&Path> {
        self.dig.as_deref()
    }

    pub fn stunip(&self) -> Option<&Path> {
        self.stunip.as_deref()
    }

    pub fn len(&self) -> usize {
        self.resolvers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }

    /// Resolvers in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Resolver> {
        self.resolvers.iter()
    }

    pub fn get(&self, name: &str) -> Option<&Resolver> {
        self.resolvers.iter().find(|r| r.name() == name)
    }

    /// Sorted resolver names.
    pub fn names(&self) -> Vec<&str> {
        let mut names = self.resolvers.iter().map(Resolver::name).collect::<Vec<_>>();
        names.sort_unstable();
        names
    }

    /// Names skipped because their helper binary is missing.
    pub fn unavailable(&self) -> impl Iterator<Item = &str> {
        self.unavailable.keys().map(String::as_str)
    }

    pub fn add(&mut self, resolver: Resolver) -> Result<(), RegistryError> {
        self.check_unique(resolver.name())?;
        self.resolvers.push(resolver);
        Ok(())
    }

    pub fn add_www(&mut self, url: &str, name: Option<&str>) -> Result<(), RegistryError> {
        let name = match name {
            Some(name) => prefixed(ResolverKind::Http, name),
            None => {
                let host = reqwest::Url::parse(url)
                    .ok()
                    .and_then(|url| url.host_str().map(str::to_owned))
                    .ok_or_else(|| RegistryError::Unnamed(url.to_owned()))?;
                derived(ResolverKind::Http, &host)?
            }
        };

        let lookup = HttpLookup::new(url).with_timeout(self.timeout);
        self.add(Resolver::new(name, ResolverKind::Http, lookup).with_timeout(self.timeout))
    }

    pub fn add_dns(&mut self, source: &DnsSource) -> Result<(), RegistryError> {
        let name = match source.name {
            Some(name) => prefixed(ResolverKind::Dns, name),
            None => derived(ResolverKind::Dns, source.query)?,
        };

        let Some(dig) = self.dig.clone() else {
            return self.skip(name, "dig");
        };

        let mut lookup = DigLookup::new(dig, source.servers.iter().copied(), source.query)
            .with_timeout(self.timeout);
        if let Some(class) = source.class {
            lookup = lookup.with_class(class);
        }
        if let Some(record_type) = source.record_type {
            lookup = lookup.with_type(record_type);
        }
        self.add(Resolver::new(name, ResolverKind::Dns, lookup).with_timeout(self.timeout))
    }

    pub fn add_stun(&mut self, server: &str, name: Option<&str>) -> Result<(), RegistryError> {
        let name = match name {
            Some(name) => prefixed(ResolverKind::Stun, name),
            None => derived(ResolverKind::Stun, server)?,
        };

        let Some(stunip) = self.stunip.clone() else {
            return self.skip(name, "stunip.py");
        };

        let lookup = StunIpLookup::new(stunip, server).with_timeout(self.timeout);
        self.add(Resolver::new(name, ResolverKind::Stun, lookup).with_timeout(self.timeout))
    }

    fn add_builtin(&mut self) {
        for (url, name) in WWW_SOURCES {
            if let Err(e) = self.add_www(url, *name) {
                tracing::warn!("skipping built-in resolver: {e}");
            }
        }
        for source in DNS_SOURCES {
            if let Err(e) = self.add_dns(source) {
                tracing::warn!("skipping built-in resolver: {e}");
            }
        }
        for (server, name) in STUN_SOURCES {
            if let Err(e) = self.add_stun(server, *name) {
                tracing::warn!("skipping built-in resolver: {e}");
            }
        }
    }

    fn skip(&mut self, name: String, binary: &'static str) -> Result<(), RegistryError> {
        self.check_unique(&name)?;
        self.unavailable.insert(name, binary);
        Ok(())
    }

    fn check_unique(&self, name: &str) -> Result<(), RegistryError> {
        if self.get(name).is_some() || self.unavailable.contains_key(name) {
            return Err(RegistryError::Duplicate(name.to_owned()));
        }
        Ok(())
    }
}

fn prefixed(kind: ResolverKind, name: &str) -> String {
    format!("{}_{name}", kind.prefix())
}

fn derived(kind: ResolverKind, host: &str) -> Result<String, RegistryError> {
    label_below_tld(host)
        .map(|label| prefixed(kind, label))
        .ok_or_else(|| RegistryError::Unnamed(host.to_owned()))
}

/// Non-empty subset of a [`Registry`] a run draws from.
#[derive(Debug, Clone)]
pub struct Selection {
    resolvers: Vec<Resolver>,
}

impl Selection {
    pub fn len(&self) -> usize {
        self.resolvers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Resolver> {
        self.resolvers.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.resolvers.iter().map(Resolver::name).collect()
    }
}

/// Applies the caller's filters to `registry`.
///
/// With `include` the selection is exactly that resolver. Otherwise it is the
/// registry minus `exclude`; unknown names in `exclude` are ignored.
pub fn filter(
    registry: &Registry,
    include: Option<&str>,
    exclude: &[String],
) -> Result<Selection, SelectionError> {
    if let Some(name) = include {
        if exclude.iter().any(|e| e == name) {
            return Err(SelectionError::Disabled(name.to_owned()));
        }
        if let Some(resolver) = registry.get(name) {
            return Ok(Selection {
                resolvers: vec![resolver.clone()],
            });
        }
        return Err(match registry.unavailable.get(name) {
            Some(&binary) => SelectionError::ResolverUnavailable {
                name: name.to_owned(),
                binary,
            },
            None => SelectionError::UnknownResolver(name.to_owned()),
        });
    }

    let resolvers = registry
        .iter()
        .filter(|r| !exclude.iter().any(|e| e == r.name()))
        .cloned()
        .collect::<Vec<_>>();
    if resolvers.is_empty() {
        return Err(SelectionError::AllDisabled);
    }
    Ok(Selection { resolvers })
}
