//! Traits describing read-only collaborators.
//!
//! Oracles expose the definition catalog, curves, combat formulas, entity
//! lookup and randomness. The [`Env`] aggregate bundles them so validation and
//! payload calculation reach everything through one injected value instead of
//! process-wide singletons.
mod catalog;
mod error;
mod formulas;
mod rng;
mod sandbox;
mod world;

pub use catalog::{DefinitionCatalog, DefinitionOracle};
pub use error::OracleError;
pub use formulas::{CombatFormulas, StandardFormulas};
pub use rng::{PcgRng, RngOracle, RollKind, compute_seed};
pub use sandbox::{Blocker, SandboxEntity, SandboxWorld};
pub use world::{CombatEntity, PathFlags, WorldOracle};

use crate::config::{CombatConfig, DEFAULT_CONFIG};
use crate::formula::CurveOracle;

/// Aggregates read-only oracles required by the validator and payloads.
pub struct Env<'a, D, C, F, W, R>
where
    D: DefinitionOracle + ?Sized,
    C: CurveOracle + ?Sized,
    F: CombatFormulas + ?Sized,
    W: WorldOracle + ?Sized,
    R: RngOracle + ?Sized,
{
    catalog: Option<&'a D>,
    curves: Option<&'a C>,
    formulas: Option<&'a F>,
    world: Option<&'a W>,
    rng: Option<&'a R>,
    config: Option<&'a CombatConfig>,
}

pub type CombatEnv<'a> = Env<
    'a,
    dyn DefinitionOracle + 'a,
    dyn CurveOracle + 'a,
    dyn CombatFormulas + 'a,
    dyn WorldOracle + 'a,
    dyn RngOracle + 'a,
>;

// Manual impls: derives would require the (possibly unsized) oracle types to be Clone.
impl<D, C, F, W, R> Clone for Env<'_, D, C, F, W, R>
where
    D: DefinitionOracle + ?Sized,
    C: CurveOracle + ?Sized,
    F: CombatFormulas + ?Sized,
    W: WorldOracle + ?Sized,
    R: RngOracle + ?Sized,
{
    fn clone(&self) -> Self {
        *self
    }
}

impl<D, C, F, W, R> Copy for Env<'_, D, C, F, W, R>
where
    D: DefinitionOracle + ?Sized,
    C: CurveOracle + ?Sized,
    F: CombatFormulas + ?Sized,
    W: WorldOracle + ?Sized,
    R: RngOracle + ?Sized,
{
}

impl<'a, D, C, F, W, R> Env<'a, D, C, F, W, R>
where
    D: DefinitionOracle + ?Sized,
    C: CurveOracle + ?Sized,
    F: CombatFormulas + ?Sized,
    W: WorldOracle + ?Sized,
    R: RngOracle + ?Sized,
{
    pub fn new(
        catalog: Option<&'a D>,
        curves: Option<&'a C>,
        formulas: Option<&'a F>,
        world: Option<&'a W>,
        rng: Option<&'a R>,
    ) -> Self {
        Self {
            catalog,
            curves,
            formulas,
            world,
            rng,
            config: None,
        }
    }

    pub fn with_all(
        catalog: &'a D,
        curves: &'a C,
        formulas: &'a F,
        world: &'a W,
        rng: &'a R,
    ) -> Self {
        Self::new(
            Some(catalog),
            Some(curves),
            Some(formulas),
            Some(world),
            Some(rng),
        )
    }

    pub fn empty() -> Self {
        Self::new(None, None, None, None, None)
    }

    /// Overrides the default [`CombatConfig`].
    pub fn with_config(mut self, config: &'a CombatConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Returns the DefinitionOracle, or an error if not available.
    ///
    /// # Errors
    ///
    /// Returns `OracleError::CatalogNotAvailable` if no catalog was provided.
    pub fn catalog(&self) -> Result<&'a D, OracleError> {
        self.catalog.ok_or(OracleError::CatalogNotAvailable)
    }

    /// Returns the CurveOracle, or an error if not available.
    pub fn curves(&self) -> Result<&'a C, OracleError> {
        self.curves.ok_or(OracleError::CurvesNotAvailable)
    }

    /// Returns the CombatFormulas oracle, or an error if not available.
    pub fn formulas(&self) -> Result<&'a F, OracleError> {
        self.formulas.ok_or(OracleError::FormulasNotAvailable)
    }

    /// Returns the WorldOracle, or an error if not available.
    pub fn world(&self) -> Result<&'a W, OracleError> {
        self.world.ok_or(OracleError::WorldNotAvailable)
    }

    /// Returns the RngOracle, or an error if not available.
    pub fn rng(&self) -> Result<&'a R, OracleError> {
        self.rng.ok_or(OracleError::RngNotAvailable)
    }

    /// Active configuration; the defaults when none was supplied.
    pub fn config(&self) -> &'a CombatConfig {
        self.config.unwrap_or(&DEFAULT_CONFIG)
    }
}

impl<'a, D, C, F, W, R> Env<'a, D, C, F, W, R>
where
    D: DefinitionOracle + 'a,
    C: CurveOracle + 'a,
    F: CombatFormulas + 'a,
    W: WorldOracle + 'a,
    R: RngOracle + 'a,
{
    /// Converts this environment into the trait-object based [`CombatEnv`].
    pub fn as_combat_env(&self) -> CombatEnv<'a> {
        let catalog: Option<&'a dyn DefinitionOracle> = self.catalog.map(|c| c as _);
        let curves: Option<&'a dyn CurveOracle> = self.curves.map(|c| c as _);
        let formulas: Option<&'a dyn CombatFormulas> = self.formulas.map(|f| f as _);
        let world: Option<&'a dyn WorldOracle> = self.world.map(|w| w as _);
        let rng: Option<&'a dyn RngOracle> = self.rng.map(|r| r as _);
        Env {
            catalog,
            curves,
            formulas,
            world,
            rng,
            config: self.config,
        }
    }
}
