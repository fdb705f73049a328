//! # Runtime events emitted by the manager and the monitoring loop.
//!
//! The [`EventKind`] enum classifies event types across four categories:
//! - **Registry events**: registration, deregistration, lookups that missed
//! - **Watch events**: loop start/stop and refused starts
//! - **Health events**: observed transitions, probe timeouts, recovery outcomes
//! - **Subscriber events**: overflow and panics inside subscribers
//!
//! Every kind has a fixed [`Severity`]; the built-in `LogWriter` maps it to a
//! `tracing` level.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Use `seq` to restore the exact order when events are delivered out of order.
//!
//! ## Example
//! ```rust
//! use recoverable::{Event, EventKind, HealthState, Severity};
//!
//! let ev = Event::new(EventKind::StatusTimeout)
//!     .with_recoverable("db")
//!     .with_state(HealthState::Failed)
//!     .with_reason("probe hung");
//!
//! assert_eq!(ev.kind, EventKind::StatusTimeout);
//! assert_eq!(ev.severity(), Severity::Warn);
//! assert_eq!(ev.recoverable.as_deref(), Some("db"));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

use crate::error::ManagerError;
use crate::state::{HealthState, RecoverableUpdate};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Operator-facing importance of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Debug,
    Info,
    Warn,
    Error,
}

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Registry events ===
    /// Recoverable added to the registry.
    ///
    /// Sets: `recoverable`
    RecoverableRegistered,

    /// Registration ignored: the id is already registered (first one kept).
    ///
    /// Sets: `recoverable`, `reason`, `label`
    DuplicateRegistration,

    /// Recoverable removed from the registry.
    ///
    /// Sets: `recoverable`
    RecoverableDeregistered,

    /// Deregistration or lookup of an id that is not registered.
    ///
    /// Sets: `recoverable`, `reason`, `label`
    UnknownIdentifier,

    // === Watch events ===
    /// Monitoring loop started.
    ///
    /// Sets: `count` (registered recoverables at start)
    WatchStarted,

    /// `start_watching` refused because the registry is empty.
    ///
    /// Sets: `reason`, `label`
    StartRefused,

    /// `start_watching` ignored because the loop is already running.
    ///
    /// Sets: `reason`, `label`
    AlreadyWatching,

    /// Monitoring loop stopped (no further ticks).
    WatchStopped,

    /// One scan over the registry finished.
    ///
    /// Sets: `count` (recoverables scanned), `reason` (outcome summary)
    TickCompleted,

    // === Health events ===
    /// `status()` returned a different state than on the previous probe.
    ///
    /// Only reported states count: an in-flight recovery shows up in
    /// `state_of` as `RECOVERING` but does not emit this event.
    ///
    /// Sets: `recoverable`, `state`, `update`
    StateChanged,

    /// `status()` did not answer in time; no action taken this tick.
    ///
    /// Sets: `recoverable`, `reason`, `label`
    StatusTimeout,

    /// `recover()` is about to be called.
    ///
    /// Sets: `recoverable`, `state` (`FAILED`)
    RecoveryStarted,

    /// `recover()` returned `true`.
    ///
    /// Sets: `recoverable`
    RecoverySucceeded,

    /// `recover()` returned `false`; next attempt on the next tick.
    ///
    /// Sets: `recoverable`, `reason`, `label`
    RecoveryFailed,

    /// `recover()` exceeded its bound and was abandoned.
    ///
    /// Sets: `recoverable`, `reason`, `label`
    RecoveryTimedOut,

    /// Failed recoverable skipped because a recovery is already in flight.
    ///
    /// Sets: `recoverable`, `state`
    RecoverySkipped,

    /// `status()` or `recover()` panicked. A panicking probe takes no action;
    /// a panicking recovery counts as failed and is retried next tick.
    ///
    /// Sets: `recoverable`, `reason`, `label`
    RecoverablePanicked,

    // === Subscriber events ===
    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets: `subscriber`, `reason`
    SubscriberOverflow,

    /// Subscriber panicked during event processing.
    ///
    /// Sets: `subscriber`, `reason`
    SubscriberPanicked,
}

impl EventKind {
    /// Fixed severity of this kind.
    pub fn severity(self) -> Severity {
        match self {
            EventKind::DuplicateRegistration
            | EventKind::AlreadyWatching
            | EventKind::TickCompleted
            | EventKind::RecoverySkipped => Severity::Debug,

            EventKind::RecoverableRegistered
            | EventKind::RecoverableDeregistered
            | EventKind::WatchStarted
            | EventKind::WatchStopped
            | EventKind::StateChanged
            | EventKind::RecoveryStarted
            | EventKind::RecoverySucceeded => Severity::Info,

            EventKind::StatusTimeout | EventKind::SubscriberOverflow => Severity::Warn,

            EventKind::UnknownIdentifier
            | EventKind::StartRefused
            | EventKind::RecoveryFailed
            | EventKind::RecoveryTimedOut
            | EventKind::RecoverablePanicked
            | EventKind::SubscriberPanicked => Severity::Error,
        }
    }

    /// Kind used to report `err`.
    pub fn for_error(err: &ManagerError) -> Self {
        match err {
            ManagerError::DuplicateRegistration { .. } => EventKind::DuplicateRegistration,
            ManagerError::UnknownIdentifier { .. } => EventKind::UnknownIdentifier,
            ManagerError::EmptyRegistryOnStart => EventKind::StartRefused,
            ManagerError::AlreadyWatching => EventKind::AlreadyWatching,
            ManagerError::RecoveryFailure { .. } => EventKind::RecoveryFailed,
            ManagerError::RecoveryTimeout { .. } => EventKind::RecoveryTimedOut,
            ManagerError::StatusTimeout { .. } => EventKind::StatusTimeout,
            ManagerError::RecoverablePanicked { .. } => EventKind::RecoverablePanicked,
        }
    }
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Debug, Clone)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Id of the recoverable the event is about.
    pub recoverable: Option<Arc<str>>,
    /// Name of the subscriber, for subscriber events.
    pub subscriber: Option<&'static str>,
    /// Observed health state, if applicable.
    pub state: Option<HealthState>,
    /// Human-readable reason (errors, summaries, overflow details).
    pub reason: Option<Arc<str>>,
    /// Stable error label (see [`ManagerError::as_label`]).
    pub label: Option<&'static str>,
    /// Count attached to watch/tick events.
    pub count: Option<u32>,
    /// Transition record for [`EventKind::StateChanged`].
    pub update: Option<RecoverableUpdate>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            recoverable: None,
            subscriber: None,
            state: None,
            reason: None,
            label: None,
            count: None,
            update: None,
        }
    }

    /// Creates the event that reports `err`.
    pub fn from_error(err: &ManagerError) -> Self {
        let ev = Event::new(EventKind::for_error(err)).with_error(err);
        match err.id() {
            Some(id) => ev.with_recoverable(id),
            None => ev,
        }
    }

    /// Creates a [`EventKind::StateChanged`] event carrying `update`.
    pub fn state_changed(update: RecoverableUpdate) -> Self {
        Event::new(EventKind::StateChanged)
            .with_recoverable(update.id())
            .with_state(update.to_state())
            .with_update(update)
    }

    #[inline]
    pub fn severity(&self) -> Severity {
        self.kind.severity()
    }

    /// Attaches a recoverable id.
    #[inline]
    pub fn with_recoverable(mut self, id: impl Into<Arc<str>>) -> Self {
        self.recoverable = Some(id.into());
        self
    }

    /// Attaches a subscriber name.
    #[inline]
    pub fn with_subscriber(mut self, name: &'static str) -> Self {
        self.subscriber = Some(name);
        self
    }

    /// Attaches an observed state.
    #[inline]
    pub fn with_state(mut self, state: HealthState) -> Self {
        self.state = Some(state);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches an error's message and label.
    #[inline]
    pub fn with_error(mut self, err: &ManagerError) -> Self {
        self.reason = Some(err.as_message().into());
        self.label = Some(err.as_label());
        self
    }

    /// Attaches a count.
    #[inline]
    pub fn with_count(mut self, n: usize) -> Self {
        self.count = Some(u32::try_from(n).unwrap_or(u32::MAX));
        self
    }

    #[inline]
    pub fn with_update(mut self, update: RecoverableUpdate) -> Self {
        self.update = Some(update);
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_subscriber(subscriber)
            .with_reason(format!("subscriber={subscriber} reason={reason}"))
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_subscriber(subscriber)
            .with_reason(info)
    }

    #[inline]
    pub fn is_subscriber_overflow(&self) -> bool {
        matches!(self.kind, EventKind::SubscriberOverflow)
    }
}
