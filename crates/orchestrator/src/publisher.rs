//! Event fan-out to the external push collaborators.
//!
//! Built on `tokio::sync::broadcast`: every subscriber gets its own
//! receiver over a bounded ring that drops the oldest value on overflow,
//! so a slow consumer can never block the pipeline. Lag is surfaced per
//! subscriber as a dropped-event count. One task publishes sequentially,
//! which preserves per-match event order.

use arbscan_arbitrage::Opportunity;
use arbscan_codec::describe;
use arbscan_core::ProviderId;
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Ring capacity per subscriber.
const DEFAULT_CAPACITY: usize = 256;

/// Outbound event kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EventKind {
    #[serde(rename = "arbitrage.new")]
    ArbitrageNew,
    #[serde(rename = "arbitrage.expired")]
    ArbitrageExpired,
    #[serde(rename = "odds.update")]
    OddsUpdate,
}

#[derive(Debug, Clone, Serialize)]
pub struct EventLeg {
    pub provider: ProviderId,
    pub outcome: u8,
    pub price: Decimal,
}

/// The JSON payload handed to push/chat/notification collaborators.
#[derive(Debug, Clone, Serialize)]
pub struct OutboundEvent {
    pub kind: EventKind,
    #[serde(rename = "match")]
    pub match_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bet_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selection: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub legs: Vec<EventLeg>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stakes: Option<Vec<Decimal>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profit_pct: Option<Decimal>,
}

impl OutboundEvent {
    #[must_use]
    pub fn arbitrage_new(opp: &Opportunity) -> Self {
        let selection = opp
            .legs
            .iter()
            .find(|l| !l.selection.is_empty())
            .map(|l| l.selection.clone());

        Self {
            kind: EventKind::ArbitrageNew,
            match_id: opp.match_id,
            bet_type: Some(describe(opp.bet_type, "", opp.margin)),
            margin: Some(opp.margin),
            selection,
            legs: opp
                .legs
                .iter()
                .map(|l| EventLeg {
                    provider: l.provider,
                    outcome: l.outcome,
                    price: l.price,
                })
                .collect(),
            stakes: Some(opp.stakes.clone()),
            profit_pct: Some(opp.profit_pct),
        }
    }

    #[must_use]
    pub fn arbitrage_expired(
        match_id: i64,
        bet_type: arbscan_core::BetTypeId,
        margin: Decimal,
    ) -> Self {
        Self {
            kind: EventKind::ArbitrageExpired,
            match_id,
            bet_type: Some(describe(bet_type, "", margin)),
            margin: Some(margin),
            selection: None,
            legs: Vec::new(),
            stakes: None,
            profit_pct: None,
        }
    }

    #[must_use]
    pub fn odds_update(match_id: i64) -> Self {
        Self {
            kind: EventKind::OddsUpdate,
            match_id,
            bet_type: None,
            margin: None,
            selection: None,
            legs: Vec::new(),
            stakes: None,
            profit_pct: None,
        }
    }
}

/// A subscriber's receive handle. Overflow on this subscriber's ring
/// surfaces as an incremented dropped count, never as a missed wakeup.
pub struct Subscription {
    name: String,
    rx: broadcast::Receiver<OutboundEvent>,
    dropped: u64,
    total_dropped: Arc<AtomicU64>,
}

impl Subscription {
    /// Waits for the next event. Returns `None` once the publisher is
    /// gone and the ring is drained.
    pub async fn recv(&mut self) -> Option<OutboundEvent> {
        loop {
            match self.rx.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(n)) => self.record_lag(n),
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Next event if one is already buffered.
    pub fn try_recv(&mut self) -> Option<OutboundEvent> {
        loop {
            match self.rx.try_recv() {
                Ok(event) => return Some(event),
                Err(broadcast::error::TryRecvError::Lagged(n)) => self.record_lag(n),
                Err(_) => return None,
            }
        }
    }

    /// Events dropped on this subscriber due to overflow.
    #[must_use]
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    fn record_lag(&mut self, n: u64) {
        self.dropped += n;
        self.total_dropped.fetch_add(n, Ordering::Relaxed);
        tracing::debug!(subscriber = %self.name, lagged = n, "subscriber ring overflow");
    }
}

/// Fan-out registry over subscriber handles.
pub struct Publisher {
    tx: broadcast::Sender<OutboundEvent>,
    total_dropped: Arc<AtomicU64>,
}

impl Default for Publisher {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl Publisher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A publisher whose subscribers each buffer at most `capacity`
    /// events before the oldest is dropped.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self {
            tx,
            total_dropped: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Registers a subscriber.
    #[must_use]
    pub fn subscribe(&self, name: impl Into<String>) -> Subscription {
        Subscription {
            name: name.into(),
            rx: self.tx.subscribe(),
            dropped: 0,
            total_dropped: self.total_dropped.clone(),
        }
    }

    /// Fans one event out to every subscriber.
    pub fn publish(&self, event: &OutboundEvent) {
        // No subscribers is fine; the pipeline does not care.
        let _ = self.tx.send(event.clone());
    }

    /// Total events dropped across subscribers, as observed by their
    /// receive sides.
    #[must_use]
    pub fn total_dropped(&self) -> u64 {
        self.total_dropped.load(Ordering::Relaxed)
    }
}
