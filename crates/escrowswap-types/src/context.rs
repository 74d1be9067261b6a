//! Execution context supplied by the hosting environment.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{Address, EscrowSwapError, Result};

/// Who is calling, and the wall-clock time at the instant of execution.
///
/// The engine never reads a clock of its own; expiration checks and both
/// auction curves are evaluated against `now`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionContext {
    /// The signer of the operation.
    pub caller: Address,
    /// Unix seconds.
    pub now: u32,
}

impl ExecutionContext {
    #[must_use]
    pub fn at(caller: Address, now: u32) -> Self {
        Self { caller, now }
    }

    /// Context stamped with the current system time.
    ///
    /// # Errors
    /// Returns `ArithmeticOverflow` if the clock does not fit in 32 bits.
    pub fn now_utc(caller: Address) -> Result<Self> {
        let now = u32::try_from(Utc::now().timestamp()).map_err(|_| {
            EscrowSwapError::ArithmeticOverflow {
                context: "system clock",
            }
        })?;
        Ok(Self { caller, now })
    }

    /// Same caller, different time.
    #[must_use]
    pub fn with_time(self, now: u32) -> Self {
        Self { now, ..self }
    }
}
