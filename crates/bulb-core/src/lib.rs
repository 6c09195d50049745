//! Domain model for the simulated bulb.
//!
//! The crate owns everything that is independent of the wire: the
//! [`BulbState`] record and its validated value types, the fixed [`Preset`]
//! table, the [`BulbService`] that serialises access to the one bulb of the
//! process, and the [`ChangeFeed`] that fans snapshots out to subscribers.
//!
//! ```rust,ignore
//! use bulb_core::BulbService;
//!
//! let service = BulbService::new();
//! let transition = service.toggle()?;
//! assert!(transition.after.on);
//! ```

mod brightness;
mod color;
mod error;
mod feed;
mod preset;
mod service;
mod state;

pub use brightness::Brightness;
pub use color::HexColor;
pub use error::BulbError;
pub use feed::{ChangeFeed, FeedEvent, SUBSCRIBER_CAPACITY, Subscription};
pub use preset::Preset;
pub use service::{BulbService, Transition};
pub use state::BulbState;
