//! Single owner and mutation gateway for the bulb state.

use std::sync::{Mutex, MutexGuard};

use crate::error::BulbError;
use crate::feed::{ChangeFeed, Subscription};
use crate::preset::Preset;
use crate::state::BulbState;

/// Serialises access to the one [`BulbState`] of the process.
///
/// Each operation holds the lock for exactly one read-modify-write. The new
/// snapshot is published to the [`ChangeFeed`] after the lock is released, so
/// a slow or vanished subscriber can never stall or fail a caller.
#[derive(Debug, Default)]
pub struct BulbService {
    state: Mutex<BulbState>,
    feed: ChangeFeed,
}

/// Power state observed before and after a toggle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// Snapshot taken before the toggle.
    pub before: BulbState,
    /// Snapshot taken after the toggle.
    pub after: BulbState,
}

impl BulbService {
    /// Creates a service around a fresh bulb.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a service around an existing state.
    #[must_use]
    pub fn with_state(state: BulbState) -> Self {
        Self {
            state: Mutex::new(state),
            feed: ChangeFeed::new(),
        }
    }

    /// Returns the current snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`BulbError::Poisoned`] if a writer panicked while holding the
    /// lock.
    pub fn snapshot(&self) -> Result<BulbState, BulbError> {
        Ok(self.lock()?.clone())
    }

    /// Flips the power flag.
    ///
    /// # Errors
    ///
    /// Returns [`BulbError::Poisoned`] if the lock is poisoned.
    pub fn toggle(&self) -> Result<Transition, BulbError> {
        let transition = {
            let mut state = self.lock()?;
            let before = state.clone();
            state.toggle_power();
            Transition {
                before,
                after: state.clone(),
            }
        };
        self.feed.publish(&transition.after);
        Ok(transition)
    }

    /// Sets the color from `#rrggbb` text.
    ///
    /// # Errors
    ///
    /// Returns [`BulbError::InvalidColor`] for malformed colors and
    /// [`BulbError::Poisoned`] if the lock is poisoned.
    pub fn set_color(&self, value: &str) -> Result<BulbState, BulbError> {
        self.mutate(|state| state.set_color(value))
            .map(|((), snapshot)| snapshot)
    }

    /// Sets the brightness percentage.
    ///
    /// # Errors
    ///
    /// Returns [`BulbError::OutOfRange`] outside `0..=100` and
    /// [`BulbError::Poisoned`] if the lock is poisoned.
    pub fn set_brightness(&self, value: i64) -> Result<BulbState, BulbError> {
        self.mutate(|state| state.set_brightness(value))
            .map(|((), snapshot)| snapshot)
    }

    /// Applies a named preset.
    ///
    /// # Errors
    ///
    /// Returns [`BulbError::UnknownPreset`] for names outside the preset table
    /// and [`BulbError::Poisoned`] if the lock is poisoned.
    pub fn apply_preset(&self, name: &str) -> Result<(Preset, BulbState), BulbError> {
        self.mutate(|state| state.apply_preset(name))
    }

    /// Subscribes to snapshots published after each successful mutation.
    pub fn subscribe(&self) -> Subscription {
        self.feed.subscribe()
    }

    /// Registered subscribers; see [`ChangeFeed::subscriber_count`].
    #[must_use]
    pub fn feed_subscribers(&self) -> usize {
        self.feed.subscriber_count()
    }

    /// Disconnects every subscriber.
    pub fn close_feed(&self) {
        self.feed.close();
    }

    fn mutate<T, F>(&self, apply: F) -> Result<(T, BulbState), BulbError>
    where
        F: FnOnce(&mut BulbState) -> Result<T, BulbError>,
    {
        let (outcome, snapshot) = {
            let mut state = self.lock()?;
            let outcome = apply(&mut state)?;
            (outcome, state.clone())
        };
        self.feed.publish(&snapshot);
        Ok((outcome, snapshot))
    }

    fn lock(&self) -> Result<MutexGuard<'_, BulbState>, BulbError> {
        self.state.lock().map_err(|_| BulbError::Poisoned)
    }
}
