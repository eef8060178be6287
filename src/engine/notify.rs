//! New-destination notifications.
//!
//! [`NotificationEngine`] decides *what* to announce: each city at most once
//! per job run. [`ToastQueue`] decides what is *on screen*: a few toasts,
//! each for a bounded time.

use serde::Serialize;
use std::collections::{HashMap, HashSet, VecDeque};
use std::time::{Duration, Instant};

use crate::model::Deal;

/// How long a toast stays visible.
pub const TOAST_LIFETIME: Duration = Duration::from_secs(5);
/// How many toasts are visible at once.
pub const MAX_VISIBLE_TOASTS: usize = 3;

/// A destination seen for the first time in the current job run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DealNotification {
    pub city: String,
    pub country: String,
    /// Lowest price for the city within the delta that introduced it.
    pub price: f64,
}

/// Tracks announced cities across polls of one job run.
#[derive(Debug, Default)]
pub struct NotificationEngine {
    seen: HashSet<String>,
}

impl NotificationEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget every announced city. Called once per job submission.
    pub fn reset(&mut self) {
        self.seen.clear();
    }

    pub fn seen_count(&self) -> usize {
        self.seen.len()
    }

    pub fn has_seen(&self, city: &str) -> bool {
        self.seen.contains(city)
    }

    /// Announce every city in `delta` not announced before in this run.
    ///
    /// Notifications come out in first-appearance order within the delta,
    /// each carrying the cheapest price for its city in that delta.
    pub fn observe(&mut self, delta: &[Deal]) -> Vec<DealNotification> {
        let mut fresh: Vec<DealNotification> = Vec::new();
        let mut slot: HashMap<&str, usize> = HashMap::new();

        for deal in delta {
            if let Some(&i) = slot.get(deal.city.as_str()) {
                if deal.price < fresh[i].price {
                    fresh[i].price = deal.price;
                }
                continue;
            }
            if self.seen.contains(&deal.city) {
                continue;
            }
            slot.insert(deal.city.as_str(), fresh.len());
            fresh.push(DealNotification {
                city: deal.city.clone(),
                country: deal.country.clone(),
                price: deal.price,
            });
        }

        for n in &fresh {
            self.seen.insert(n.city.clone());
        }
        if !fresh.is_empty() {
            tracing::debug!(
                "{} new destination(s), {} announced this run",
                fresh.len(),
                self.seen.len()
            );
        }
        fresh
    }
}

#[derive(Debug, Clone)]
struct Toast {
    notification: DealNotification,
    shown_at: Instant,
}

/// Visible notifications with a fixed lifetime and capacity.
///
/// Pushing onto a full queue evicts the oldest toast; nothing waits for a
/// free slot.
#[derive(Debug)]
pub struct ToastQueue {
    toasts: VecDeque<Toast>,
    lifetime: Duration,
    capacity: usize,
}

impl Default for ToastQueue {
    fn default() -> Self {
        Self::new(TOAST_LIFETIME, MAX_VISIBLE_TOASTS)
    }
}

impl ToastQueue {
    pub fn new(lifetime: Duration, capacity: usize) -> Self {
        Self {
            toasts: VecDeque::with_capacity(capacity),
            lifetime,
            capacity: capacity.max(1),
        }
    }

    pub fn push(&mut self, notification: DealNotification, now: Instant) {
        self.expire(now);
        while self.toasts.len() >= self.capacity {
            self.toasts.pop_front();
        }
        self.toasts.push_back(Toast {
            notification,
            shown_at: now,
        });
    }

    /// Drop toasts whose lifetime has elapsed.
    pub fn expire(&mut self, now: Instant) {
        let lifetime = self.lifetime;
        self.toasts
            .retain(|t| now.saturating_duration_since(t.shown_at) < lifetime);
    }

    /// Currently visible notifications, oldest first.
    pub fn visible(&mut self, now: Instant) -> Vec<&DealNotification> {
        self.expire(now);
        self.toasts.iter().map(|t| &t.notification).collect()
    }

    pub fn len(&self) -> usize {
        self.toasts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }
}
