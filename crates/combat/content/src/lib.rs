//! Data-driven combat content and loaders.
//!
//! Power, condition and curve catalogs plus the combat configuration are
//! authored as RON files and loaded into the oracle types `combat-core`
//! consumes:
//! - `powers.ron`: power definitions
//! - `conditions.ron`: shared condition definitions
//! - `curves.ron`: level and difficulty curves
//! - `config.ron`: combat configuration overrides
//!
//! A default content set is embedded in the crate ([`Content::embedded`]).
//! Content never appears in entity state; it is read-only for the lifetime
//! of a world.

pub mod loaders;
pub mod validate;

mod content;

pub use content::Content;
pub use loaders::{CatalogLoader, ConfigLoader, ContentFactory, CurveLoader, LoadResult};
pub use validate::{CatalogError, validate_catalog};
