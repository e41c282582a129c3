//! XP and level progression.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::record::Record;

pub const XP_PER_LEVEL: u64 = 1000;
/// Flat reward for any completion.
pub const BASE_COMPLETION_XP: u64 = 50;
/// Multiplier applied to `importance * urgency`.
pub const MATRIX_XP_FACTOR: f64 = 10.0;

/// Monotonic XP counter. The level is always derived, never stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardLedger {
    xp: u64,
}

/// Result of crediting XP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct XpCredit {
    pub amount: u64,
    pub xp: u64,
    pub level: u64,
    pub previous_level: u64,
}

impl XpCredit {
    pub fn leveled_up(&self) -> bool {
        self.level > self.previous_level
    }
}

/// Progress within the current level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LevelProgress {
    pub xp: u64,
    pub level: u64,
    pub xp_into_level: u64,
    pub xp_to_next_level: u64,
}

impl RewardLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from a persisted or imported total.
    pub fn restore(xp: u64) -> Self {
        Self { xp }
    }

    pub fn xp(&self) -> u64 {
        self.xp
    }

    pub fn level(&self) -> u64 {
        level_for(self.xp)
    }

    /// Credit a positive amount.
    pub fn add_xp(&mut self, amount: i64) -> Result<XpCredit, ValidationError> {
        if amount <= 0 {
            return Err(ValidationError::NonPositiveXp(amount));
        }
        let previous_level = self.level();
        self.xp = self.xp.saturating_add(amount as u64);
        Ok(XpCredit {
            amount: amount as u64,
            xp: self.xp,
            level: self.level(),
            previous_level,
        })
    }

    pub fn progress(&self) -> LevelProgress {
        let xp_into_level = self.xp % XP_PER_LEVEL;
        LevelProgress {
            xp: self.xp,
            level: self.level(),
            xp_into_level,
            xp_to_next_level: XP_PER_LEVEL - xp_into_level,
        }
    }
}

pub fn level_for(xp: u64) -> u64 {
    xp / XP_PER_LEVEL + 1
}

/// Reward for completing `record`: `50 + importance * urgency * 10`.
///
/// Events carry no ratings and are rewarded as if both were 1. Half-step
/// ratings can produce a fractional product, which is rounded to whole XP.
pub fn completion_xp(record: &Record) -> u64 {
    let (importance, urgency) = record
        .task()
        .map(|t| (t.importance.value(), t.urgency.value()))
        .unwrap_or((1.0, 1.0));
    BASE_COMPLETION_XP + (importance * urgency * MATRIX_XP_FACTOR).round() as u64
}
