//! Common error infrastructure for combat-core.
//!
//! Shared severity classification and diagnostic context used by every error
//! type in the crate. Domain errors (`PayloadError`, `ConditionError`, ...) live
//! next to the operations that produce them.
//!
//! Caller-visible rejections such as [`crate::PowerUseResult`] are plain enums,
//! not errors: a rejected activation is an expected outcome.

use crate::state::{EntityId, PowerId, TimeMs};

/// Severity level of an error, used for categorization and recovery strategies.
///
/// - **Recoverable**: the same request may succeed later
/// - **Validation**: invalid input, reject without retry
/// - **Internal**: unexpected inconsistency, investigate
/// - **Fatal**: an engine invariant was violated
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Examples: target entity despawned between activation and impact.
    Recoverable,

    /// Examples: unknown power id, unknown condition id.
    Validation,

    /// Examples: missing definition for an assigned power.
    Internal,

    /// Examples: missing required oracle, negative condition duration.
    Fatal,
}

impl ErrorSeverity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    /// Returns true if this error indicates an engine or data bug.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Diagnostic context captured where an error was created.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ErrorContext {
    /// Entity whose operation failed.
    pub entity: Option<EntityId>,

    /// Power being activated or calculated.
    pub power: Option<PowerId>,

    /// Game time of the failure.
    pub time: Option<TimeMs>,

    #[cfg_attr(feature = "serde", serde(skip))]
    pub message: Option<&'static str>,
}

impl ErrorContext {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entity: None,
            power: None,
            time: None,
            message: None,
        }
    }

    #[must_use]
    pub const fn with_entity(mut self, entity: EntityId) -> Self {
        self.entity = Some(entity);
        self
    }

    #[must_use]
    pub const fn with_power(mut self, power: PowerId) -> Self {
        self.power = Some(power);
        self
    }

    #[must_use]
    pub const fn with_time(mut self, time: TimeMs) -> Self {
        self.time = Some(time);
        self
    }

    #[must_use]
    pub const fn with_message(mut self, message: &'static str) -> Self {
        self.message = Some(message);
        self
    }
}

/// Common trait for all combat-core errors.
///
/// - Use `#[derive(thiserror::Error)]` for Display/Error
/// - Classify severity by recoverability, not by gameplay impact
pub trait CombatError: core::fmt::Display + core::fmt::Debug {
    fn severity(&self) -> ErrorSeverity;

    /// Not all errors carry context.
    fn context(&self) -> Option<&ErrorContext> {
        None
    }

    /// Stable identifier for this error variant, used in logs and tests.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}

/// Reports a fatal-class invariant violation.
///
/// Always logged; additionally trips a debug assertion when `strict` is set.
pub(crate) fn invariant_violation(strict: bool, what: &'static str) {
    tracing::warn!(target: "combat::invariant", violation = what, "invariant violation");
    debug_assert!(!strict, "invariant violation: {what}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_builder_sets_fields() {
        let ctx = ErrorContext::new()
            .with_entity(EntityId(7))
            .with_power(PowerId(3))
            .with_time(TimeMs(1200))
            .with_message("target despawned");
        assert_eq!(ctx.entity, Some(EntityId(7)));
        assert_eq!(ctx.power, Some(PowerId(3)));
        assert_eq!(ctx.time, Some(TimeMs(1200)));
        assert_eq!(ctx.message, Some("target despawned"));
    }

    #[test]
    fn severity_classification() {
        assert!(ErrorSeverity::Recoverable.is_recoverable());
        assert!(ErrorSeverity::Fatal.is_internal());
        assert!(!ErrorSeverity::Validation.is_internal());
    }

    #[test]
    fn lenient_invariant_violation_does_not_panic() {
        invariant_violation(false, "negative duration");
    }
}
