//! Append-only interface catalog.
//!
//! Entries are keyed by (name, version) and by content hash. Registered
//! interfaces are immutable and shared as `Arc<Interface>`; lookups take a
//! read lock only long enough to clone the `Arc`.

use crate::config::CatalogConfig;
use crate::error::CatalogError;
use crate::hash::ContentHash;
use crate::ident::IfaceName;
use crate::model::{Interface, Version};
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{debug, info};

/// Outcome of a successful registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registration {
    Added(ContentHash),
    /// The identical interface was already registered.
    AlreadyPresent(ContentHash),
}

impl Registration {
    pub fn hash(&self) -> &ContentHash {
        match self {
            Registration::Added(h) | Registration::AlreadyPresent(h) => h,
        }
    }
}

#[derive(Debug, Clone)]
struct CatalogEntry {
    hash: ContentHash,
    interface: Arc<Interface>,
}

#[derive(Debug, Default)]
struct CatalogState {
    by_name: BTreeMap<IfaceName, BTreeMap<Version, CatalogEntry>>,
    by_hash: HashMap<ContentHash, Arc<Interface>>,
    count: usize,
}

#[derive(Debug, Default)]
pub struct SchemaCatalog {
    config: CatalogConfig,
    state: RwLock<CatalogState>,
}

impl SchemaCatalog {
    pub fn new(config: CatalogConfig) -> Self {
        Self {
            config,
            state: RwLock::new(CatalogState::default()),
        }
    }

    /// Register an interface.
    ///
    /// Re-registering identical content is a no-op; the same (name, version)
    /// with different content fails `DuplicateVersion`.
    pub fn register(&self, interface: Interface) -> Result<Registration, CatalogError> {
        interface.validate()?;
        let hash = interface.content_hash()?;

        let mut state = self.state.write();
        if let Some(existing) = state
            .by_name
            .get(&interface.name)
            .and_then(|versions| versions.get(&interface.version))
        {
            if existing.hash == hash {
                debug!(
                    target: "covenant::catalog",
                    interface = %interface.name,
                    version = %interface.version,
                    "already registered"
                );
                return Ok(Registration::AlreadyPresent(hash));
            }
            return Err(CatalogError::DuplicateVersion {
                name: interface.name.clone(),
                version: interface.version,
                existing: existing.hash.clone(),
                offered: hash,
            });
        }
        if state.count >= self.config.max_interfaces {
            return Err(CatalogError::CatalogFull {
                capacity: self.config.max_interfaces,
            });
        }

        info!(
            target: "covenant::catalog",
            interface = %interface.name,
            version = %interface.version,
            hash = %hash.short(),
            "registered"
        );
        let name = interface.name.clone();
        let version = interface.version;
        let interface = Arc::new(interface);
        state.by_hash.insert(hash.clone(), interface.clone());
        state.by_name.entry(name).or_default().insert(
            version,
            CatalogEntry {
                hash: hash.clone(),
                interface,
            },
        );
        state.count += 1;
        Ok(Registration::Added(hash))
    }

    pub fn get(&self, name: &str, version: Version) -> Result<Arc<Interface>, CatalogError> {
        self.state
            .read()
            .by_name
            .get(name)
            .and_then(|versions| versions.get(&version))
            .map(|entry| entry.interface.clone())
            .ok_or_else(|| CatalogError::NotFound {
                name: name.to_string(),
                version,
            })
    }

    pub fn get_by_hash(&self, hash: &ContentHash) -> Result<Arc<Interface>, CatalogError> {
        self.state
            .read()
            .by_hash
            .get(hash)
            .cloned()
            .ok_or_else(|| CatalogError::HashNotFound(hash.clone()))
    }

    /// Highest registered version of `name`.
    pub fn latest(&self, name: &str) -> Option<Arc<Interface>> {
        self.state
            .read()
            .by_name
            .get(name)
            .and_then(|versions| versions.values().next_back())
            .map(|entry| entry.interface.clone())
    }

    pub fn versions(&self, name: &str) -> Vec<Version> {
        self.state
            .read()
            .by_name
            .get(name)
            .map(|versions| versions.keys().copied().collect())
            .unwrap_or_default()
    }

    /// Look up an ordered selection, e.g. the members of a composition.
    pub fn select(&self, selection: &[(&str, Version)]) -> Result<Vec<Arc<Interface>>, CatalogError> {
        selection
            .iter()
            .map(|(name, version)| self.get(name, *version))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.state.read().count
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn names(&self) -> Vec<IfaceName> {
        self.state.read().by_name.keys().cloned().collect()
    }
}
