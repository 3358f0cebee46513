//! Lookup of the externally routable IPv4 address of this host.
//!
//! A [`Registry`] holds every resolver usable in a run: plain-text HTTP(S)
//! services, plus DNS "whoami" zones queried through `dig` and public STUN
//! servers queried through `stunip.py` when those binaries are found.
//! [`filter`] narrows it to a [`Selection`] and [`resolve`] picks resolvers
//! from it at random until one answers.
//!
//! ```rust,ignore
//! let registry = natip::build_registry("dig", "stunip.py", natip::DEFAULT_TIMEOUT);
//! let selection = natip::filter(&registry, None, &[])?;
//! println!("{}", natip::resolve(&selection).await?);
//! ```

pub mod binary;
pub mod config;
pub mod error;
pub mod registry;
pub mod resolver;
pub mod selector;

pub use self::error::{AttemptError, RegistryError, ResolutionError, SelectionError};
pub use self::registry::{build_registry, filter, Registry, Selection};
pub use self::resolver::{Lookup, Resolver, ResolverKind, DEFAULT_TIMEOUT};
pub use self::selector::{resolve, resolve_all, resolve_with};
