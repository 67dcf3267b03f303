#![deny(warnings)]

//! Runtime for the economy simulation: catalog transactions, the game
//! session that ties state, catalog and prestige together, and the clocks
//! and autoplayer that drive it headlessly.
//!
//! Everything here is single-threaded. A host that shares a [`Session`]
//! across threads must wrap the whole session in one lock, since buy,
//! prestige and reset read and write several fields at once.

mod autoplay;
mod catalog;
mod clock;
mod session;

pub use autoplay::{Autoplayer, StepSummary};
pub use catalog::{BuyError, Catalog, Offer, Quantity};
pub use clock::{AutosaveTimer, SettingsHandle, TickClock};
pub use session::{RestoreReport, Session, TickReport};
