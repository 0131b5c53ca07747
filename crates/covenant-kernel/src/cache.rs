//! Memoized composition keyed by composition id.
//!
//! Only successful resolutions are stored. Entries are immutable and handed
//! out as `Arc`, so readers never hold the lock while using a result.

use crate::config::ResolverConfig;
use crate::error::CompositionError;
use crate::hash::ContentHash;
use crate::model::Interface;
use crate::resolve::{EffectiveContractInterface, composition_id, interface_refs, resolve_refs};
use parking_lot::RwLock;
use std::borrow::Borrow;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<ContentHash, Arc<EffectiveContractInterface>>,
    /// Insertion order, oldest at the front.
    order: VecDeque<ContentHash>,
}

/// Bounded resolution cache with oldest-first eviction.
#[derive(Debug)]
pub struct ResolutionCache {
    config: ResolverConfig,
    state: RwLock<CacheState>,
}

impl ResolutionCache {
    pub fn new(config: ResolverConfig) -> Self {
        Self {
            config,
            state: RwLock::new(CacheState::default()),
        }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.state.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, id: &ContentHash) -> Option<Arc<EffectiveContractInterface>> {
        self.state.read().entries.get(id).cloned()
    }

    /// Resolve `interfaces`, reusing a cached result for the same ordered set.
    pub fn resolve<I>(
        &self,
        interfaces: &[I],
    ) -> Result<Arc<EffectiveContractInterface>, CompositionError>
    where
        I: Borrow<Interface>,
    {
        let refs = interface_refs(interfaces)?;
        let id = composition_id(&refs);
        if let Some(hit) = self.get(&id) {
            debug!(target: "covenant::resolve", composition = %id.short(), "cache hit");
            return Ok(hit);
        }

        let effective = Arc::new(resolve_refs(interfaces, refs, &self.config)?);
        if self.config.cache_capacity == 0 {
            return Ok(effective);
        }

        let mut state = self.state.write();
        // Another writer may have raced us to the same composition.
        if let Some(existing) = state.entries.get(&id) {
            return Ok(existing.clone());
        }
        while state.order.len() >= self.config.cache_capacity {
            let Some(oldest) = state.order.pop_front() else {
                break;
            };
            state.entries.remove(&oldest);
            debug!(target: "covenant::resolve", composition = %oldest.short(), "evicted");
        }
        state.order.push_back(id.clone());
        state.entries.insert(id, effective.clone());
        Ok(effective)
    }

    pub fn clear(&self) {
        let mut state = self.state.write();
        state.entries.clear();
        state.order.clear();
    }
}

impl Default for ResolutionCache {
    fn default() -> Self {
        Self::new(ResolverConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ident::{IfaceName, OpName};
    use crate::model::{OperationSpec, Timestamp, Version};

    fn iface(name: &str, ts: i64) -> Interface {
        Interface::new(IfaceName::new(name).unwrap(), Version::V1, Timestamp::from_unix(ts))
            .operation(OpName::genesis(), OperationSpec::genesis())
    }

    #[test]
    fn hits_return_the_same_arc() {
        let cache = ResolutionCache::default();
        let a = cache.resolve(&[iface("A", 0)]).unwrap();
        let b = cache.resolve(&[iface("A", 0)]).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn failures_are_not_cached() {
        let cache = ResolutionCache::default();
        let broken = Interface::new(IfaceName::new("B").unwrap(), Version::V1, Timestamp::from_unix(0));
        assert!(cache.resolve(&[broken]).is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn evicts_oldest_first() {
        let cache = ResolutionCache::new(ResolverConfig {
            cache_capacity: 2,
            ..ResolverConfig::default()
        });
        let first = cache.resolve(&[iface("A", 1)]).unwrap();
        cache.resolve(&[iface("A", 2)]).unwrap();
        cache.resolve(&[iface("A", 3)]).unwrap();
        assert_eq!(cache.len(), 2);
        assert!(cache.get(&first.id).is_none());
    }

    #[test]
    fn zero_capacity_disables_storage() {
        let cache = ResolutionCache::new(ResolverConfig {
            cache_capacity: 0,
            ..ResolverConfig::default()
        });
        cache.resolve(&[iface("A", 0)]).unwrap();
        assert!(cache.is_empty());
    }

    #[test]
    fn shared_across_threads() {
        let cache = Arc::new(ResolutionCache::default());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let cache = cache.clone();
                std::thread::spawn(move || cache.resolve(&[iface("A", 0)]).unwrap().id.clone())
            })
            .collect();
        let ids: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(ids.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(cache.len(), 1);
    }
}
