//! Auto-advancing carousel index
//!
//! A [`Carousel`] is a wrapping index over a fixed number of items. A
//! [`CarouselTicker`] advances it on a fixed period and asks a
//! [`ScrollTarget`] to show the new index. The ticker stops when its
//! [`TickerHandle`] is cancelled or dropped.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// Default period between carousel advances
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(3000);

/// Something that can display a carousel item by index
pub trait ScrollTarget: Send + Sync {
    /// Bring the item at `index` into view
    fn scroll_to_index(&self, index: usize);
}

/// Wrapping index over `len` items
#[derive(Debug, Clone)]
pub struct Carousel {
    len: usize,
    index: Arc<Mutex<usize>>,
}

impl Carousel {
    /// Create a carousel positioned on the first item
    pub fn new(len: usize) -> Self {
        Self {
            len,
            index: Arc::new(Mutex::new(0)),
        }
    }

    /// Number of items
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether there is nothing to show
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Index of the item currently shown
    pub fn current(&self) -> usize {
        *self.index.lock()
    }

    /// Move to the next item, wrapping to 0 after the last.
    ///
    /// Returns the new index, or `None` for an empty carousel.
    pub fn advance(&self) -> Option<usize> {
        if self.len == 0 {
            return None;
        }
        let mut index = self.index.lock();
        *index = (*index + 1) % self.len;
        Some(*index)
    }

    /// Jump back to the first item
    pub fn reset(&self) {
        *self.index.lock() = 0;
    }
}

/// Spawns the periodic advance task
pub struct CarouselTicker;

impl CarouselTicker {
    /// Start advancing `carousel` every `interval`.
    ///
    /// The first advance happens one full interval after start. An empty
    /// carousel or a zero interval yields an idle handle.
    pub fn start(
        carousel: Carousel,
        interval: Duration,
        target: Arc<dyn ScrollTarget>,
    ) -> TickerHandle {
        if carousel.is_empty() || interval.is_zero() {
            tracing::debug!(len = carousel.len(), "carousel ticker not started");
            return TickerHandle { task: None };
        }

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                if let Some(index) = carousel.advance() {
                    target.scroll_to_index(index);
                }
            }
        });

        TickerHandle { task: Some(task) }
    }
}

/// Owner of a running ticker; the ticker stops when this is dropped
#[derive(Debug)]
pub struct TickerHandle {
    task: Option<JoinHandle<()>>,
}

impl TickerHandle {
    /// Stop the ticker
    pub fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    /// Whether the ticker is still scheduled
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl Drop for TickerHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}
