//! Binary turn snapshots and a bounded turn history.
//!
//! A snapshot is a bitcode-encoded [`GameState`] behind a versioned header.
//! The [`TurnHistory`] ring keeps the most recent ones for undo and replay.

use crate::state::GameState;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Magic number identifying a Starlane turn snapshot.
pub const SNAPSHOT_MAGIC: u32 = 0x57A2_0001;

/// Current format version. Increment when breaking the wire format.
pub const FORMAT_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("bitcode encoding failed: {0}")]
    Encode(String),
    #[error("bitcode decoding failed: {0}")]
    Decode(String),
    #[error("invalid magic number: expected 0x{:08X}, got 0x{:08X}", SNAPSHOT_MAGIC, .0)]
    BadMagic(u32),
    #[error("unsupported format version {0} (this build reads {FORMAT_VERSION})")]
    UnsupportedVersion(u32),
}

// ---------------------------------------------------------------------------
// Header and snapshot
// ---------------------------------------------------------------------------

/// Prepended to every snapshot so the format can be checked before the
/// state is trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotHeader {
    pub magic: u32,
    pub version: u32,
    /// Turn of the captured state.
    pub turn: u32,
}

impl SnapshotHeader {
    pub fn new(turn: u32) -> Self {
        Self {
            magic: SNAPSHOT_MAGIC,
            version: FORMAT_VERSION,
            turn,
        }
    }

    pub fn validate(&self) -> Result<(), SnapshotError> {
        if self.magic != SNAPSHOT_MAGIC {
            return Err(SnapshotError::BadMagic(self.magic));
        }
        if self.version != FORMAT_VERSION {
            return Err(SnapshotError::UnsupportedVersion(self.version));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnSnapshot {
    pub header: SnapshotHeader,
    pub state: GameState,
}

impl TurnSnapshot {
    pub fn new(state: GameState) -> Self {
        Self {
            header: SnapshotHeader::new(state.turn),
            state,
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>, SnapshotError> {
        bitcode::serialize(self).map_err(|e| SnapshotError::Encode(e.to_string()))
    }

    /// Decode and validate the header.
    pub fn decode(data: &[u8]) -> Result<Self, SnapshotError> {
        let snapshot: TurnSnapshot =
            bitcode::deserialize(data).map_err(|e| SnapshotError::Decode(e.to_string()))?;
        snapshot.header.validate()?;
        Ok(snapshot)
    }
}

// ---------------------------------------------------------------------------
// TurnHistory
// ---------------------------------------------------------------------------

/// One encoded turn.
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub turn: u32,
    pub state_hash: u64,
    pub data: Vec<u8>,
}

/// Fixed-capacity ring of encoded snapshots. When full, the oldest turn is
/// evicted.
#[derive(Debug)]
pub struct TurnHistory {
    entries: Vec<Option<HistoryEntry>>,
    head: usize,
    len: usize,
    total_recorded: u64,
}

impl TurnHistory {
    /// A capacity of 0 is clamped to 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: (0..capacity).map(|_| None).collect(),
            head: 0,
            len: 0,
            total_recorded: 0,
        }
    }

    /// Encode `state` and store it as the newest entry.
    pub fn record(&mut self, state: &GameState) -> Result<(), SnapshotError> {
        let data = TurnSnapshot::new(state.clone()).encode()?;
        self.entries[self.head] = Some(HistoryEntry {
            turn: state.turn,
            state_hash: state.state_hash(),
            data,
        });
        self.head = (self.head + 1) % self.capacity();
        if self.len < self.capacity() {
            self.len += 1;
        }
        self.total_recorded += 1;
        Ok(())
    }

    pub fn capacity(&self) -> usize {
        self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Total turns ever recorded, evicted ones included.
    pub fn total_recorded(&self) -> u64 {
        self.total_recorded
    }

    /// Entry by age: 0 is the oldest retained, `len - 1` the newest.
    pub fn entry(&self, index: usize) -> Option<&HistoryEntry> {
        if index >= self.len {
            return None;
        }
        let start = if self.len < self.capacity() {
            0
        } else {
            self.head
        };
        self.entries[(start + index) % self.capacity()].as_ref()
    }

    /// The retained entry for `turn`, if any.
    pub fn get(&self, turn: u32) -> Option<&HistoryEntry> {
        (0..self.len)
            .filter_map(|i| self.entry(i))
            .find(|e| e.turn == turn)
    }

    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.len.checked_sub(1).and_then(|i| self.entry(i))
    }

    /// Decode the state recorded for `turn`. `Ok(None)` if it is not retained.
    pub fn restore(&self, turn: u32) -> Result<Option<GameState>, SnapshotError> {
        let Some(entry) = self.get(turn) else {
            return Ok(None);
        };
        Ok(Some(TurnSnapshot::decode(&entry.data)?.state))
    }

    pub fn clear(&mut self) {
        for entry in &mut self.entries {
            *entry = None;
        }
        self.head = 0;
        self.len = 0;
    }
}

// ===========================================================================
// Tests
// ===========================================================================
