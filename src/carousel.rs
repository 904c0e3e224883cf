//! Events carousel.
//!
//! The home page shows one event at a time, advancing on a timer. This module
//! holds the carousel as a plain state machine so its rules can be tested
//! without a browser: time only moves when [`Carousel::tick`] is called.
//! `static/carousel.js` applies the same transitions in the page.
//!
//! ```text
//!            mount (autoplay, >1 item)
//!   Idle ─────────────────────────────▶ Playing ◀──┐
//!    ▲                                    │        │ pointer_leave
//!    │ unmount                pointer_enter        │
//!    │                                    ▼        │
//!    └──────────────────────────────── Paused ─────┘
//! ```
//!
//! Event data is fetched lazily: the first [`Carousel::became_visible`]
//! returns `true` and the caller starts the fetch; later calls return
//! `false`. [`Carousel::items_loaded`] then replaces the list with the fixed
//! first slide followed by whatever was fetched. A failed fetch leaves only
//! the fixed slide and is not reported to the visitor.

use crate::config::CarouselConfig;
use crate::content::EventRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayState {
    Idle,
    Playing,
    Paused,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchState {
    Deferred,
    InFlight,
    Settled,
}

#[derive(Debug, Clone)]
pub struct Carousel<T> {
    items: Vec<T>,
    fixed_first: Option<T>,
    current: usize,
    play: PlayState,
    fetch: FetchState,
    interval: Duration,
    elapsed: Duration,
    autoplay: bool,
    hovered: bool,
    mounted: bool,
}

impl<T: Clone> Carousel<T> {
    /// A carousel showing only `fixed_first` until items are loaded.
    pub fn new(fixed_first: Option<T>, interval: Duration, autoplay: bool) -> Self {
        Self {
            items: fixed_first.iter().cloned().collect(),
            fixed_first,
            current: 0,
            play: PlayState::Idle,
            fetch: FetchState::Deferred,
            interval,
            elapsed: Duration::ZERO,
            autoplay,
            hovered: false,
            mounted: false,
        }
    }

    pub fn from_config(fixed_first: Option<T>, config: &CarouselConfig) -> Self {
        Self::new(fixed_first, config.interval(), config.autoplay)
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn current_item(&self) -> Option<&T> {
        self.items.get(self.current)
    }

    pub fn play_state(&self) -> PlayState {
        self.play
    }

    pub fn fetch_state(&self) -> FetchState {
        self.fetch
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn autoplay(&self) -> bool {
        self.autoplay
    }

    fn settle_play_state(&mut self) {
        self.play = if !self.mounted || !self.autoplay || self.items.len() <= 1 {
            PlayState::Idle
        } else if self.hovered {
            PlayState::Paused
        } else {
            PlayState::Playing
        };
    }

    fn restart_timer(&mut self) {
        self.elapsed = Duration::ZERO;
    }

    pub fn mount(&mut self) {
        self.mounted = true;
        self.current = 0;
        self.restart_timer();
        self.settle_play_state();
    }

    /// Tear down: the timer is cleared and later ticks do nothing.
    pub fn unmount(&mut self) {
        self.mounted = false;
        self.restart_timer();
        self.settle_play_state();
    }

    /// Advance the clock by `dt`. Returns the number of slides advanced.
    pub fn tick(&mut self, dt: Duration) -> u32 {
        if self.play != PlayState::Playing || self.interval.is_zero() || self.items.is_empty() {
            return 0;
        }
        self.elapsed += dt;
        let interval = self.interval.as_nanos();
        let steps = self.elapsed.as_nanos() / interval;
        let remainder = self.elapsed.as_nanos() % interval;
        self.elapsed = Duration::from_nanos(remainder as u64);
        let len = self.items.len() as u128;
        self.current = ((self.current as u128 + steps) % len) as usize;
        steps as u32
    }

    /// Manual step forward. Restarts the timer; a hover pause stays in place.
    pub fn next(&mut self) {
        if self.items.is_empty() {
            return;
        }
        self.current = (self.current + 1) % self.items.len();
        self.restart_timer();
    }

    /// Manual step back, wrapping to the last slide.
    pub fn previous(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let len = self.items.len();
        self.current = (self.current + len - 1) % len;
        self.restart_timer();
    }

    pub fn pointer_enter(&mut self) {
        self.hovered = true;
        self.settle_play_state();
    }

    pub fn pointer_leave(&mut self) {
        self.hovered = false;
        self.restart_timer();
        self.settle_play_state();
    }

    /// `true` exactly once: the caller should start the event fetch.
    pub fn became_visible(&mut self) -> bool {
        if self.fetch == FetchState::Deferred {
            self.fetch = FetchState::InFlight;
            true
        } else {
            false
        }
    }

    pub fn items_loaded<E>(&mut self, result: Result<Vec<T>, E>) {
        let mut items: Vec<T> = self.fixed_first.iter().cloned().collect();
        if let Ok(fetched) = result {
            items.extend(fetched);
        }
        self.items = items;
        self.fetch = FetchState::Settled;
        self.current = 0;
        self.restart_timer();
        self.settle_play_state();
    }

    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
        self.restart_timer();
    }
}

// ============================================================================
// Slides
// ============================================================================

/// One slide, as served by `/api/events` and rendered on the home page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarouselItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    /// Display time used when `date_time` is absent or cannot be formatted
    /// in the browser.
    pub time: String,
    /// RFC 3339 timestamp the browser formats in the visitor's time zone.
    #[serde(
        rename = "dateTime",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub date_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl CarouselItem {
    /// The slide that always comes first.
    pub fn sunday_services() -> Self {
        Self {
            id: None,
            name: "Sunday Morning Services".to_string(),
            time: "10:00 AM - 12:00 PM".to_string(),
            date_time: None,
            description: Some("Sunday School @ 10 AM • Morning Worship @ 11 AM".to_string()),
            image: Some("🙏".to_string()),
        }
    }

    pub fn from_event(event: &EventRecord) -> Self {
        let time = match (event.date_time, &event.recurrence_pattern) {
            (Some(dt), _) => format_event_time(dt),
            (None, Some(pattern)) => pattern.clone(),
            (None, None) => String::new(),
        };
        Self {
            id: Some(event.id.clone()),
            name: event.name.clone(),
            time,
            date_time: event
                .date_time
                .map(|dt| dt.to_rfc3339_opts(chrono::SecondsFormat::Secs, true)),
            description: event.description.clone(),
            image: Some("📅".to_string()),
        }
    }
}

/// "Sunday, December 15 @ 10:00 AM"
pub fn format_event_time(dt: DateTime<Utc>) -> String {
    dt.format("%A, %B %-d @ %-I:%M %p").to_string()
}

/// Slides for the events feed: upcoming or recurring events in date order,
/// capped at `max_items`. `events` is expected to be sorted already.
pub fn events_feed(events: &[EventRecord], now: DateTime<Utc>, max_items: usize) -> Vec<CarouselItem> {
    events
        .iter()
        .filter(|e| e.is_upcoming(now))
        .take(max_items)
        .map(CarouselItem::from_event)
        .collect()
}
