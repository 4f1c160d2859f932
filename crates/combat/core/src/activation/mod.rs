//! Activation validation.
//!
//! Decides whether a requested activation is legal before any payload is
//! built. Rejections are enumerated results, never errors.
mod position;
mod result;
mod validation;

pub use position::is_in_position_for_power;
pub use result::{ActivationFlags, ActivationRequest, InPositionResult, PowerUseResult};
pub use validation::can_activate_power;
