//! Standard interface library.
//!
//! Interfaces are authored in the source format and bundled at compile time.
//! Fungible assets compose as
//! `NamedAsset, [RenameableAsset], FungibleAsset, <inflation>, [ReservableAsset]`;
//! see [`crate::FungibleFeatures`]. Non-fungible assets start from either
//! `UniqueAsset` or `FractionableAsset` and add `EngravableAsset` and
//! `AttachableAsset` as needed.

use crate::error::ParseError;
use crate::parse::parse_interface;
use covenant_kernel::{CatalogError, Interface, Registration, SchemaCatalog};
use std::fmt;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StandardInterface {
    NamedAsset,
    RenameableAsset,
    FungibleAsset,
    FixedAsset,
    InflatableAsset,
    BurnableAsset,
    ReplaceableAsset,
    ReservableAsset,
    UniqueAsset,
    FractionableAsset,
    EngravableAsset,
    AttachableAsset,
}

impl StandardInterface {
    pub const ALL: [StandardInterface; 12] = [
        StandardInterface::NamedAsset,
        StandardInterface::RenameableAsset,
        StandardInterface::FungibleAsset,
        StandardInterface::FixedAsset,
        StandardInterface::InflatableAsset,
        StandardInterface::BurnableAsset,
        StandardInterface::ReplaceableAsset,
        StandardInterface::ReservableAsset,
        StandardInterface::UniqueAsset,
        StandardInterface::FractionableAsset,
        StandardInterface::EngravableAsset,
        StandardInterface::AttachableAsset,
    ];

    pub fn name(self) -> &'static str {
        match self {
            StandardInterface::NamedAsset => "NamedAsset",
            StandardInterface::RenameableAsset => "RenameableAsset",
            StandardInterface::FungibleAsset => "FungibleAsset",
            StandardInterface::FixedAsset => "FixedAsset",
            StandardInterface::InflatableAsset => "InflatableAsset",
            StandardInterface::BurnableAsset => "BurnableAsset",
            StandardInterface::ReplaceableAsset => "ReplaceableAsset",
            StandardInterface::ReservableAsset => "ReservableAsset",
            StandardInterface::UniqueAsset => "UniqueAsset",
            StandardInterface::FractionableAsset => "FractionableAsset",
            StandardInterface::EngravableAsset => "EngravableAsset",
            StandardInterface::AttachableAsset => "AttachableAsset",
        }
    }

    /// Bundled source text.
    pub fn source(self) -> &'static str {
        match self {
            StandardInterface::NamedAsset => include_str!("../interfaces/named_asset.iface"),
            StandardInterface::RenameableAsset => {
                include_str!("../interfaces/renameable_asset.iface")
            }
            StandardInterface::FungibleAsset => include_str!("../interfaces/fungible_asset.iface"),
            StandardInterface::FixedAsset => include_str!("../interfaces/fixed_asset.iface"),
            StandardInterface::InflatableAsset => {
                include_str!("../interfaces/inflatable_asset.iface")
            }
            StandardInterface::BurnableAsset => include_str!("../interfaces/burnable_asset.iface"),
            StandardInterface::ReplaceableAsset => {
                include_str!("../interfaces/replaceable_asset.iface")
            }
            StandardInterface::ReservableAsset => {
                include_str!("../interfaces/reservable_asset.iface")
            }
            StandardInterface::UniqueAsset => include_str!("../interfaces/unique_asset.iface"),
            StandardInterface::FractionableAsset => {
                include_str!("../interfaces/fractionable_asset.iface")
            }
            StandardInterface::EngravableAsset => {
                include_str!("../interfaces/engravable_asset.iface")
            }
            StandardInterface::AttachableAsset => {
                include_str!("../interfaces/attachable_asset.iface")
            }
        }
    }

    /// Parse the bundled source.
    pub fn interface(self) -> Result<Interface, ParseError> {
        parse_interface(self.source())
    }
}

impl fmt::Display for StandardInterface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Every standard interface, in [`StandardInterface::ALL`] order.
pub fn standard_interfaces() -> Result<Vec<Interface>, ParseError> {
    StandardInterface::ALL
        .into_iter()
        .map(StandardInterface::interface)
        .collect()
}

/// Register the whole library into `catalog`.
pub fn register_standard(catalog: &SchemaCatalog) -> Result<Vec<Registration>, CatalogError> {
    let registrations = standard_interfaces()?
        .into_iter()
        .map(|iface| catalog.register(iface))
        .collect::<Result<Vec<_>, _>>()?;
    info!(
        target: "covenant::schema",
        count = registrations.len(),
        "standard library registered"
    );
    Ok(registrations)
}

/// A fresh catalog holding the standard library.
pub fn standard_catalog() -> Result<SchemaCatalog, CatalogError> {
    let catalog = SchemaCatalog::default();
    register_standard(&catalog)?;
    Ok(catalog)
}
