use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::{CreditsConfig, MAX_RESET_INTERVAL_HOURS};
use crate::storage::{self, KeyValueStore, CREDITS_KEY};
use crate::Result;

/// Credit caps and reset period for the two tiers.
#[derive(Debug, Clone, Copy)]
pub struct CreditPolicy {
    pub free_max: u32,
    pub premium_max: u32,
    pub reset_interval: Duration,
}

impl Default for CreditPolicy {
    fn default() -> Self {
        Self {
            free_max: 10,
            premium_max: 100,
            reset_interval: Duration::hours(24),
        }
    }
}

impl From<&CreditsConfig> for CreditPolicy {
    fn from(config: &CreditsConfig) -> Self {
        Self {
            free_max: config.free_max,
            premium_max: config.premium_max,
            reset_interval: Duration::hours(config.reset_interval_hours.clamp(1, MAX_RESET_INTERVAL_HOURS)),
        }
    }
}

impl CreditPolicy {
    pub fn cap_for(&self, is_premium: bool) -> u32 {
        if is_premium { self.premium_max } else { self.free_max }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditState {
    pub credits: u32,
    pub max_credits: u32,
    pub last_reset: Option<DateTime<Utc>>,
    pub is_premium: bool,
}

impl Default for CreditState {
    fn default() -> Self {
        Self {
            credits: 10,
            max_credits: 10,
            last_reset: None,
            is_premium: false,
        }
    }
}

/// Daily credit allowance. Premium accounts are never charged.
pub struct CreditLedger {
    storage: Arc<dyn KeyValueStore>,
    policy: CreditPolicy,
    state: CreditState,
}

impl CreditLedger {
    /// Loads the persisted balance. A stored balance above the configured
    /// cap for its tier is lowered to that cap.
    pub fn new(storage: Arc<dyn KeyValueStore>, policy: CreditPolicy) -> Result<Self> {
        let state = match storage::load::<CreditState>(storage.as_ref(), CREDITS_KEY)? {
            Some(mut state) => {
                let cap = policy.cap_for(state.is_premium);
                if state.max_credits != cap || state.credits > cap {
                    warn!(
                        credits = state.credits,
                        max_credits = state.max_credits,
                        cap,
                        "Stored credits do not match the configured cap"
                    );
                    state.max_credits = cap;
                    state.credits = state.credits.min(cap);
                }
                state
            }
            None => CreditState {
                credits: policy.free_max,
                max_credits: policy.free_max,
                ..CreditState::default()
            },
        };
        Ok(Self { storage, policy, state })
    }

    pub fn with_state(storage: Arc<dyn KeyValueStore>, policy: CreditPolicy, state: CreditState) -> Result<Self> {
        let ledger = Self { storage, policy, state };
        ledger.persist()?;
        Ok(ledger)
    }

    pub fn state(&self) -> &CreditState {
        &self.state
    }

    /// Charges `amount` credits. Returns `false` and leaves the balance
    /// untouched when the balance is too low.
    pub fn use_credits(&mut self, amount: u32) -> Result<bool> {
        if self.state.is_premium {
            return Ok(true);
        }
        if self.state.credits < amount {
            debug!(available = self.state.credits, amount, "Refusing credit charge");
            return Ok(false);
        }

        self.state.credits -= amount;
        self.persist()?;
        Ok(true)
    }

    pub fn reset_credits(&mut self) -> Result<()> {
        self.reset_credits_at(Utc::now())
    }

    pub fn reset_credits_at(&mut self, now: DateTime<Utc>) -> Result<()> {
        let cap = self.policy.cap_for(self.state.is_premium);
        self.state.credits = cap;
        self.state.max_credits = cap;
        self.state.last_reset = Some(now);
        self.persist()
    }

    /// Returns whether a reset happened.
    pub fn check_and_reset_credits(&mut self) -> Result<bool> {
        self.check_and_reset_credits_at(Utc::now())
    }

    pub fn check_and_reset_credits_at(&mut self, now: DateTime<Utc>) -> Result<bool> {
        let last_reset = match self.state.last_reset {
            Some(last_reset) => last_reset,
            None => {
                self.reset_credits_at(now)?;
                info!(credits = self.state.credits, "Initialized credit allowance");
                return Ok(true);
            }
        };

        if now - last_reset >= self.policy.reset_interval {
            self.reset_credits_at(now)?;
            info!(credits = self.state.credits, "Daily credits refilled");
            return Ok(true);
        }
        Ok(false)
    }

    /// Switches tier and refills to the new cap.
    pub fn set_premium(&mut self, is_premium: bool) -> Result<()> {
        self.state.is_premium = is_premium;
        self.state.max_credits = self.policy.cap_for(is_premium);
        self.reset_credits()?;
        info!(is_premium, max_credits = self.state.max_credits, "Credit tier changed");
        Ok(())
    }

    fn persist(&self) -> Result<()> {
        storage::save(self.storage.as_ref(), CREDITS_KEY, &self.state)?;
        Ok(())
    }
}
