//! Feature presets for fungible assets.

use crate::stdlib::StandardInterface;
use covenant_kernel::{
    CatalogError, CompositionError, EffectiveContractInterface, Interface, ResolutionCache,
    SchemaCatalog, Version, resolve,
};
use std::sync::Arc;

/// How the supply of a fungible asset may change after genesis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Inflation {
    #[default]
    Fixed,
    Burnable,
    Inflatable,
    InflatableBurnable,
    Replaceable,
}

impl Inflation {
    pub fn is_fixed(self) -> bool {
        self == Inflation::Fixed
    }

    pub fn is_inflatable(self) -> bool {
        matches!(
            self,
            Inflation::Inflatable | Inflation::InflatableBurnable | Inflation::Replaceable
        )
    }

    pub fn is_burnable(self) -> bool {
        matches!(
            self,
            Inflation::Burnable | Inflation::InflatableBurnable | Inflation::Replaceable
        )
    }

    pub fn is_replaceable(self) -> bool {
        self == Inflation::Replaceable
    }
}

/// Feature selection mapped to an ordered interface list.
///
/// Inflatable presets leave `issue` abstract unless `reserves` is set, so
/// they only resolve together with [`ReservableAsset`](StandardInterface::ReservableAsset).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FungibleFeatures {
    pub renaming: bool,
    pub reserves: bool,
    pub inflation: Inflation,
}

impl FungibleFeatures {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn all() -> Self {
        Self {
            renaming: true,
            reserves: true,
            inflation: Inflation::Replaceable,
        }
    }

    /// Root-to-leaf composition order.
    pub fn interfaces(&self) -> Vec<StandardInterface> {
        let mut list = vec![StandardInterface::NamedAsset];
        if self.renaming {
            list.push(StandardInterface::RenameableAsset);
        }
        list.push(StandardInterface::FungibleAsset);
        list.extend(match self.inflation {
            Inflation::Fixed => &[StandardInterface::FixedAsset][..],
            Inflation::Burnable => &[StandardInterface::BurnableAsset][..],
            Inflation::Inflatable => &[StandardInterface::InflatableAsset][..],
            Inflation::InflatableBurnable => &[
                StandardInterface::InflatableAsset,
                StandardInterface::BurnableAsset,
            ][..],
            Inflation::Replaceable => &[
                StandardInterface::InflatableAsset,
                StandardInterface::ReplaceableAsset,
            ][..],
        });
        if self.reserves {
            list.push(StandardInterface::ReservableAsset);
        }
        list
    }

    /// Resolve the bundled interfaces for this preset.
    pub fn resolve(&self) -> Result<EffectiveContractInterface, CompositionError> {
        let ifaces = self
            .interfaces()
            .into_iter()
            .map(|member| member.interface().map_err(CatalogError::from))
            .collect::<Result<Vec<Interface>, _>>()?;
        resolve(&ifaces)
    }

    /// Resolve the preset from `catalog` (v1 of each member) through `cache`.
    pub fn resolve_from(
        &self,
        catalog: &SchemaCatalog,
        cache: &ResolutionCache,
    ) -> Result<Arc<EffectiveContractInterface>, PresetError> {
        let selection: Vec<(&str, Version)> = self
            .interfaces()
            .into_iter()
            .map(|member| (member.name(), Version::V1))
            .collect();
        let ifaces = catalog.select(&selection)?;
        Ok(cache.resolve(&ifaces)?)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PresetError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Composition(#[from] CompositionError),
}
