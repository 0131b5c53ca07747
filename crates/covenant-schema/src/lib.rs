//! # Covenant Schema
//!
//! The human-authored source format for Covenant interfaces, its canonical
//! printer, and the standard interface library.
//!
//! The kernel never depends on this crate; it consumes [`Interface`]
//! values however they were produced.

pub mod error;
pub mod features;
pub mod parse;
pub mod print;
pub mod stdlib;

pub use error::ParseError;
pub use features::{FungibleFeatures, Inflation, PresetError};
pub use parse::{parse_interface, parse_interfaces};
pub use print::{print_interface, print_interfaces};
pub use stdlib::{StandardInterface, register_standard, standard_catalog, standard_interfaces};

use covenant_kernel::{CatalogError, Interface, Registration, SchemaCatalog};

/// Parse `text` and register every interface it declares, in order.
///
/// Stops at the first failure; interfaces registered before it stay
/// registered.
pub fn load_into(catalog: &SchemaCatalog, text: &str) -> Result<Vec<Registration>, CatalogError> {
    parse_interfaces(text)?
        .into_iter()
        .map(|iface: Interface| catalog.register(iface))
        .collect()
}
