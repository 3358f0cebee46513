use std::net::Ipv4Addr;

use rand::Rng;

use crate::error::{AttemptError, ResolutionError};
use crate::registry::Selection;

/// Resolves our address with a randomly picked resolver of `selection`,
/// falling back to another random pick until one succeeds.
pub async fn resolve(selection: &Selection) -> Result<Ipv4Addr, ResolutionError> {
    resolve_with(selection, &mut rand::thread_rng()).await
}

/// Same as [`resolve`], drawing from `rng`.
///
/// Every resolver is tried at most once, so a failed run makes exactly
/// `selection.len()` attempts.
pub async fn resolve_with<R>(
    selection: &Selection,
    rng: &mut R,
) -> Result<Ipv4Addr, ResolutionError>
where
    R: Rng,
{
    let mut working = selection.iter().collect::<Vec<_>>();
    let mut failures = Vec::with_capacity(working.len());

    while !working.is_empty() {
        let resolver = working.swap_remove(rng.gen_range(0..working.len()));
        tracing::info!(resolver = resolver.name(), kind = %resolver.kind(), "lookup");

        match resolver.invoke().await {
            Ok(addr) => {
                tracing::debug!(
                    resolver = resolver.name(),
                    %addr,
                    attempts = failures.len() + 1,
                    "resolved"
                );
                return Ok(addr);
            }
            Err(e) => {
                tracing::warn!(
                    resolver = resolver.name(),
                    remaining = working.len(),
                    "lookup failed: {e}"
                );
                failures.push((resolver.name().to_owned(), e));
            }
        }
    }

    Err(ResolutionError {
        attempts: failures.len(),
        failures,
    })
}

/// Queries every resolver of `selection` once, in order.
pub async fn resolve_all(selection: &Selection) -> Vec<(String, Result<Ipv4Addr, AttemptError>)> {
    let mut results = Vec::with_capacity(selection.len());
    for resolver in selection.iter() {
        tracing::info!(resolver = resolver.name(), kind = %resolver.kind(), "lookup");
        let result = resolver.invoke().await;
        if let Err(e) = &result {
            tracing::warn!(resolver = resolver.name(), "lookup failed: {e}");
        }
        results.push((resolver.name().to_owned(), result));
    }
    results
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::registry::{filter, Registry};
    use crate::resolver::{Lookup, Resolver, ResolverKind};

    type Calls = Arc<Mutex<HashMap<String, usize>>>;

    struct Scripted {
        name: String,
        reply: Option<Ipv4Addr>,
        calls: Calls,
    }

    #[async_trait::async_trait]
    impl Lookup for Scripted {
        async fn lookup(&self) -> Result<Ipv4Addr, AttemptError> {
            *self.calls.lock().unwrap().entry(self.name.clone()).or_default() += 1;
            self.reply
                .ok_or_else(|| AttemptError::malformed("", "scripted failure"))
        }
    }

    fn selection(outcomes: &[(&str, Option<Ipv4Addr>)]) -> (Selection, Calls) {
        let calls = Calls::default();
        let mut registry = Registry::new(None, None);
        for (name, reply) in outcomes {
            let lookup = Scripted {
                name: name.to_string(),
                reply: *reply,
                calls: calls.clone(),
            };
            registry
                .add(Resolver::new(*name, ResolverKind::Http, lookup))
                .unwrap();
        }
        (filter(&registry, None, &[]).unwrap(), calls)
    }

    const ADDR: Ipv4Addr = Ipv4Addr::new(203, 0, 113, 7);

    #[tokio::test]
    async fn falls_back_until_success() {
        for seed in 0..32 {
            let (selection, calls) = selection(&[("A", None), ("B", None), ("C", Some(ADDR))]);
            let addr = resolve_with(&selection, &mut StdRng::seed_from_u64(seed))
                .await
                .unwrap();
            assert_eq!(addr, ADDR);

            let calls = calls.lock().unwrap();
            assert_eq!(calls.get("C"), Some(&1));
            assert!(calls.values().all(|&n| n == 1));
        }
    }

    #[tokio::test]
    async fn single_failure_is_resolution_error() {
        let (selection, _) = selection(&[("A", None)]);
        let e = resolve(&selection).await.unwrap_err();
        assert_eq!(e.attempts, 1);
        assert_eq!(e.failures[0].0, "A");
    }

    #[tokio::test]
    async fn exhaustion_tries_each_resolver_once() {
        for size in 1..=6 {
            let names = (0..size).map(|i| format!("r{i}")).collect::<Vec<_>>();
            let outcomes = names.iter().map(|n| (n.as_str(), None)).collect::<Vec<_>>();
            let (selection, calls) = selection(&outcomes);

            let e = resolve_with(&selection, &mut StdRng::seed_from_u64(size as u64))
                .await
                .unwrap_err();
            assert_eq!(e.attempts, size);
            assert_eq!(e.failures.len(), size);

            let calls = calls.lock().unwrap();
            assert_eq!(calls.len(), size);
            assert!(calls.values().all(|&n| n == 1));
        }
    }

    #[tokio::test]
    async fn picks_spread_over_selection() {
        let (selection, calls) = selection(&[
            ("A", Some(ADDR)),
            ("B", Some(ADDR)),
            ("C", Some(ADDR)),
        ]);
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..300 {
            resolve_with(&selection, &mut rng).await.unwrap();
        }
        let calls = calls.lock().unwrap();
        assert_eq!(calls.values().sum::<usize>(), 300);
        assert!(calls.values().all(|&n| n > 50), "skewed picks: {calls:?}");
    }

    #[tokio::test]
    async fn all_mode_reports_each_outcome() {
        let (selection, _) = selection(&[("A", None), ("B", Some(ADDR))]);
        let results = resolve_all(&selection).await;
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].0, "A");
        assert!(results[0].1.is_err());
        assert_eq!(results[1].0, "B");
        assert_eq!(results[1].1.as_ref().unwrap(), &ADDR);
    }

    #[tokio::test]
    async fn counts_attempts() {
        let counter = Arc::new(AtomicUsize::new(0));

        struct Counting(Arc<AtomicUsize>);

        #[async_trait::async_trait]
        impl Lookup for Counting {
            async fn lookup(&self) -> Result<Ipv4Addr, AttemptError> {
                self.0.fetch_add(1, Ordering::SeqCst);
                Err(AttemptError::malformed("", "nope"))
            }
        }

        let mut registry = Registry::new(None, None);
        for name in ["www_a", "www_b", "www_c", "www_d"] {
            registry
                .add(Resolver::new(name, ResolverKind::Http, Counting(counter.clone())))
                .unwrap();
        }
        let exclude = vec!["www_d".to_owned()];
        let selection = filter(&registry, None, &exclude).unwrap();

        let e = resolve(&selection).await.unwrap_err();
        assert_eq!(e.attempts, 3);
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }
}
