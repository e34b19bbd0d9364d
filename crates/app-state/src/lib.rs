//! Application state management for the member app
//!
//! This crate holds the small amount of state that outlives a single screen:
//! the persisted session and the launch decision made from it, plus the
//! timer-driven carousel index used by the landing screen.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod carousel;
pub mod session;

pub use carousel::{Carousel, CarouselTicker, ScrollTarget, TickerHandle, DEFAULT_TICK_INTERVAL};
pub use session::{LaunchDestination, SessionGate, SessionState, SessionStateError};
