//! Typed turn events with pre-allocated ring buffers.
//!
//! Events are emitted while a turn resolves and delivered in batch once the
//! turn is complete. Each event kind has its own [`EventBuffer`] ring buffer.
//!
//! # Subscriber Types
//!
//! - **Passive listeners**: read-only, for UI notifications and turn logs.
//! - **Reactive handlers**: return [`Command`]s to apply before the next turn.
//!
//! # Suppression
//!
//! Event kinds can be suppressed via [`EventBus::suppress`], which prevents
//! any allocation or recording for that kind.

use crate::build::ProjectKind;
use crate::command::Command;
use crate::fleet::FleetLocation;
use crate::fleet::colonize::ColonizeRejection;
use crate::id::{FleetId, PlayerId, StarId};
use crate::tech::TechField;

// ---------------------------------------------------------------------------
// Event types
// ---------------------------------------------------------------------------

/// Why a fleet order was discarded without effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    UnknownStar,
    TargetLost,
    NotAtStar,
    NotOwner,
    Colonize(ColonizeRejection),
}

/// Something that happened during a turn. All events carry the turn number
/// that was being resolved.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    // -- Colonies --
    ProjectCompleted {
        star: StarId,
        project: ProjectKind,
        turn: u32,
    },
    GovernorQueued {
        star: StarId,
        project: ProjectKind,
        turn: u32,
    },
    PopulationChanged {
        star: StarId,
        from: u64,
        to: u64,
        turn: u32,
    },
    ColonyAbandoned {
        star: StarId,
        previous_owner: PlayerId,
        turn: u32,
    },
    ColonyFounded {
        star: StarId,
        owner: PlayerId,
        population: u64,
        turn: u32,
    },

    // -- Research --
    ResearchAdvanced {
        player: PlayerId,
        field: TechField,
        level: u32,
        turn: u32,
    },

    // -- Fleets --
    FleetCreated {
        fleet: FleetId,
        owner: PlayerId,
        star: StarId,
        turn: u32,
    },
    FleetArrived {
        fleet: FleetId,
        location: FleetLocation,
        turn: u32,
    },
    FleetRemoved {
        fleet: FleetId,
        turn: u32,
    },
    OrderDropped {
        fleet: FleetId,
        reason: DropReason,
        turn: u32,
    },
    CargoTransferred {
        fleet: FleetId,
        star: StarId,
        turn: u32,
    },

    // -- Scanning --
    StarsScanned {
        player: PlayerId,
        count: usize,
        turn: u32,
    },
}

/// Discriminant tag for event types, used for suppression and buffering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    ProjectCompleted,
    GovernorQueued,
    PopulationChanged,
    ColonyAbandoned,
    ColonyFounded,
    ResearchAdvanced,
    FleetCreated,
    FleetArrived,
    FleetRemoved,
    OrderDropped,
    CargoTransferred,
    StarsScanned,
}

/// Total number of event kinds.
const EVENT_KIND_COUNT: usize = 12;

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::ProjectCompleted { .. } => EventKind::ProjectCompleted,
            Event::GovernorQueued { .. } => EventKind::GovernorQueued,
            Event::PopulationChanged { .. } => EventKind::PopulationChanged,
            Event::ColonyAbandoned { .. } => EventKind::ColonyAbandoned,
            Event::ColonyFounded { .. } => EventKind::ColonyFounded,
            Event::ResearchAdvanced { .. } => EventKind::ResearchAdvanced,
            Event::FleetCreated { .. } => EventKind::FleetCreated,
            Event::FleetArrived { .. } => EventKind::FleetArrived,
            Event::FleetRemoved { .. } => EventKind::FleetRemoved,
            Event::OrderDropped { .. } => EventKind::OrderDropped,
            Event::CargoTransferred { .. } => EventKind::CargoTransferred,
            Event::StarsScanned { .. } => EventKind::StarsScanned,
        }
    }
}

impl EventKind {
    fn index(self) -> usize {
        self as usize
    }
}

// ---------------------------------------------------------------------------
// EventBuffer: pre-allocated ring buffer
// ---------------------------------------------------------------------------

/// A fixed-capacity ring buffer of events. When full, the oldest event is
/// dropped.
#[derive(Debug)]
pub struct EventBuffer {
    events: Vec<Option<Event>>,
    /// Next write position.
    head: usize,
    len: usize,
    /// Total events ever written, dropped ones included.
    total_written: u64,
}

impl EventBuffer {
    /// A capacity of 0 is clamped to 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            events: (0..capacity).map(|_| None).collect(),
            head: 0,
            len: 0,
            total_written: 0,
        }
    }

    pub fn push(&mut self, event: Event) {
        self.events[self.head] = Some(event);
        self.head = (self.head + 1) % self.capacity();
        if self.len < self.capacity() {
            self.len += 1;
        }
        self.total_written += 1;
    }

    pub fn capacity(&self) -> usize {
        self.events.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn total_written(&self) -> u64 {
        self.total_written
    }

    /// Events lost to overflow.
    pub fn dropped_count(&self) -> u64 {
        self.total_written.saturating_sub(self.capacity() as u64)
    }

    /// Oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        let start = if self.len < self.capacity() { 0 } else { self.head };
        (0..self.len).filter_map(move |i| self.events[(start + i) % self.capacity()].as_ref())
    }

    pub fn clear(&mut self) {
        for slot in &mut self.events {
            *slot = None;
        }
        self.head = 0;
        self.len = 0;
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// Receives events read-only.
pub type PassiveListener = Box<dyn FnMut(&Event)>;

/// Receives an event and returns commands to apply before the next turn.
pub type ReactiveHandler = Box<dyn FnMut(&Event) -> Vec<Command>>;

enum Subscriber {
    Passive(PassiveListener),
    Reactive(ReactiveHandler),
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// One ring buffer per event kind, subscriber lists, and suppression flags.
pub struct EventBus {
    buffers: [Option<EventBuffer>; EVENT_KIND_COUNT],
    suppressed: [bool; EVENT_KIND_COUNT],
    subscribers: [Vec<Subscriber>; EVENT_KIND_COUNT],
    /// Commands returned by reactive handlers, drained by the engine.
    pending_commands: Vec<Command>,
    default_capacity: usize,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("buffers", &self.buffers)
            .field("suppressed", &self.suppressed)
            .field("pending_commands", &self.pending_commands)
            .field("default_capacity", &self.default_capacity)
            .finish_non_exhaustive()
    }
}

impl EventBus {
    pub fn new(default_capacity: usize) -> Self {
        Self {
            buffers: Default::default(),
            suppressed: [false; EVENT_KIND_COUNT],
            subscribers: Default::default(),
            pending_commands: Vec::new(),
            default_capacity,
        }
    }

    /// Suppressed kinds are never allocated or buffered.
    pub fn suppress(&mut self, kind: EventKind) {
        self.suppressed[kind.index()] = true;
        self.buffers[kind.index()] = None;
    }

    pub fn is_suppressed(&self, kind: EventKind) -> bool {
        self.suppressed[kind.index()]
    }

    /// Buffer an event. No-op for suppressed kinds.
    pub fn emit(&mut self, event: Event) {
        let idx = event.kind().index();
        if self.suppressed[idx] {
            return;
        }
        let capacity = self.default_capacity;
        self.buffers[idx]
            .get_or_insert_with(|| EventBuffer::new(capacity))
            .push(event);
    }

    /// Register a passive listener. Listeners run in registration order.
    pub fn on_passive(&mut self, kind: EventKind, listener: PassiveListener) {
        self.subscribers[kind.index()].push(Subscriber::Passive(listener));
    }

    /// Register a reactive handler. Handlers run in registration order.
    pub fn on_reactive(&mut self, kind: EventKind, handler: ReactiveHandler) {
        self.subscribers[kind.index()].push(Subscriber::Reactive(handler));
    }

    /// Deliver every buffered event to its subscribers, oldest first, then
    /// clear the buffers. Reactive handler output accumulates until
    /// [`drain_commands`](Self::drain_commands).
    pub fn deliver(&mut self) {
        for idx in 0..EVENT_KIND_COUNT {
            if self.suppressed[idx] {
                continue;
            }
            let Some(buffer) = self.buffers[idx].as_mut() else {
                continue;
            };
            if buffer.is_empty() {
                continue;
            }

            let events: Vec<Event> = buffer.iter().cloned().collect();
            buffer.clear();

            for subscriber in &mut self.subscribers[idx] {
                for event in &events {
                    match subscriber {
                        Subscriber::Passive(listener) => listener(event),
                        Subscriber::Reactive(handler) => {
                            self.pending_commands.extend(handler(event));
                        }
                    }
                }
            }
        }
    }

    pub fn drain_commands(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.pending_commands)
    }

    pub fn buffer(&self, kind: EventKind) -> Option<&EventBuffer> {
        self.buffers[kind.index()].as_ref()
    }

    /// Events of `kind` buffered since the last delivery, oldest first.
    pub fn events(&self, kind: EventKind) -> impl Iterator<Item = &Event> {
        self.buffers[kind.index()]
            .as_ref()
            .into_iter()
            .flat_map(|b| b.iter())
    }

    pub fn buffered_count(&self, kind: EventKind) -> usize {
        self.buffer(kind).map_or(0, |b| b.len())
    }

    pub fn total_emitted(&self, kind: EventKind) -> u64 {
        self.buffer(kind).map_or(0, |b| b.total_written())
    }

    /// Clear all buffers and pending commands. Subscribers and suppression
    /// settings are kept.
    pub fn clear_all(&mut self) {
        for buffer in self.buffers.iter_mut().flatten() {
            buffer.clear();
        }
        self.pending_commands.clear();
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1024)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn scanned(count: usize) -> Event {
        Event::StarsScanned {
            player: PlayerId(0),
            count,
            turn: 1,
        }
    }

    // -----------------------------------------------------------------------
    // Ring buffer
    // -----------------------------------------------------------------------

    #[test]
    fn ring_buffer_drops_oldest() {
        let mut buf = EventBuffer::new(2);
        buf.push(scanned(1));
        buf.push(scanned(2));
        buf.push(scanned(3));
        let counts: Vec<usize> = buf
            .iter()
            .map(|e| match e {
                Event::StarsScanned { count, .. } => *count,
                _ => 0,
            })
            .collect();
        assert_eq!(counts, vec![2, 3]);
        assert_eq!(buf.total_written(), 3);
        assert_eq!(buf.dropped_count(), 1);
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let buf = EventBuffer::new(0);
        assert_eq!(buf.capacity(), 1);
    }

    // -----------------------------------------------------------------------
    // Bus
    // -----------------------------------------------------------------------

    #[test]
    fn emit_buffers_by_kind() {
        let mut bus = EventBus::default();
        bus.emit(scanned(4));
        bus.emit(Event::FleetRemoved {
            fleet: FleetId::default(),
            turn: 1,
        });
        assert_eq!(bus.buffered_count(EventKind::StarsScanned), 1);
        assert_eq!(bus.buffered_count(EventKind::FleetRemoved), 1);
        assert_eq!(bus.buffered_count(EventKind::FleetArrived), 0);
        assert_eq!(bus.events(EventKind::StarsScanned).count(), 1);
    }

    #[test]
    fn suppressed_kinds_are_not_recorded() {
        let mut bus = EventBus::default();
        bus.suppress(EventKind::StarsScanned);
        bus.emit(scanned(1));
        assert!(bus.is_suppressed(EventKind::StarsScanned));
        assert!(bus.buffer(EventKind::StarsScanned).is_none());
        assert_eq!(bus.total_emitted(EventKind::StarsScanned), 0);
    }

    #[test]
    fn passive_listeners_see_events_once() {
        let mut bus = EventBus::default();
        let seen = Rc::new(RefCell::new(0usize));
        let sink = Rc::clone(&seen);
        bus.on_passive(
            EventKind::StarsScanned,
            Box::new(move |_| *sink.borrow_mut() += 1),
        );
        bus.emit(scanned(1));
        bus.emit(scanned(2));
        bus.deliver();
        bus.deliver();
        assert_eq!(*seen.borrow(), 2);
        assert_eq!(bus.buffered_count(EventKind::StarsScanned), 0);
    }

    #[test]
    fn reactive_handlers_queue_commands() {
        let mut bus = EventBus::default();
        bus.on_reactive(
            EventKind::ColonyFounded,
            Box::new(|event| match event {
                Event::ColonyFounded { star, owner, .. } => vec![Command::SetGovernor {
                    player: *owner,
                    star: *star,
                    governor: None,
                }],
                _ => Vec::new(),
            }),
        );
        bus.emit(Event::ColonyFounded {
            star: StarId(3),
            owner: PlayerId(0),
            population: 100,
            turn: 2,
        });
        bus.deliver();
        let commands = bus.drain_commands();
        assert_eq!(commands.len(), 1);
        assert!(bus.drain_commands().is_empty());
    }

    #[test]
    fn clear_all_keeps_subscribers() {
        let mut bus = EventBus::default();
        let seen = Rc::new(RefCell::new(0usize));
        let sink = Rc::clone(&seen);
        bus.on_passive(
            EventKind::StarsScanned,
            Box::new(move |_| *sink.borrow_mut() += 1),
        );
        bus.emit(scanned(1));
        bus.clear_all();
        bus.deliver();
        assert_eq!(*seen.borrow(), 0);
        bus.emit(scanned(1));
        bus.deliver();
        assert_eq!(*seen.borrow(), 1);
    }
}
