use crate::error::{GiftError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of an escrowed gift. Every state but `Deposited` is final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GiftState {
    Deposited,
    ClaimedInternal,
    ClaimedExternal,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GiftAction {
    ClaimInternal,
    ClaimExternal,
    Cancel,
}

impl GiftState {
    pub fn is_final(&self) -> bool {
        !matches!(self, GiftState::Deposited)
    }

    pub fn apply(self, action: GiftAction) -> Result<GiftState> {
        match (self, action) {
            (GiftState::Deposited, GiftAction::ClaimInternal) => Ok(GiftState::ClaimedInternal),
            (GiftState::Deposited, GiftAction::ClaimExternal) => Ok(GiftState::ClaimedExternal),
            (GiftState::Deposited, GiftAction::Cancel) => Ok(GiftState::Cancelled),
            (state, action) => Err(GiftError::InvalidTransition { state, action }),
        }
    }
}

impl fmt::Display for GiftState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            GiftState::Deposited => "deposited",
            GiftState::ClaimedInternal | GiftState::ClaimedExternal => "claimed",
            GiftState::Cancelled => "cancelled",
        })
    }
}

impl fmt::Display for GiftAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            GiftAction::ClaimInternal | GiftAction::ClaimExternal => "claim",
            GiftAction::Cancel => "cancel",
        })
    }
}
