use crate::game::GameState;
use log::debug;
use smallvec::SmallVec;

/// Simulation conditions whose first-true time is kept for the rest of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Milestone {
    Started,
    GettingStarted,
}

impl Milestone {
    pub const ALL: [Self; 2] = [Self::Started, Self::GettingStarted];

    /// Snapshot key. Skins read these names directly.
    #[inline(always)]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Started => "started",
            Self::GettingStarted => "gettingStarted",
        }
    }

    #[inline(always)]
    fn reached(self, state: &dyn GameState) -> bool {
        match self {
            Self::Started => state.started(),
            Self::GettingStarted => state.getting_started(),
        }
    }
}

/// Set-once record of elapsed real times. A key, once written, never changes.
#[derive(Debug, Clone, Default)]
pub struct StatefulRecorder {
    entries: SmallVec<[(&'static str, f32); 4]>,
}

impl StatefulRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `time` under `key` unless the key already has a value.
    /// Returns whether this call wrote it.
    pub fn record_if_absent(&mut self, key: &'static str, time: f32) -> bool {
        if self.get(key).is_some() {
            return false;
        }
        self.entries.push((key, time));
        true
    }

    #[inline(always)]
    pub fn get(&self, key: &str) -> Option<f32> {
        self.entries
            .iter()
            .find_map(|&(k, t)| (k == key).then_some(t))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, f32)> + '_ {
        self.entries.iter().copied()
    }

    /// Records every milestone the simulation currently reports. Milestones
    /// are independent of each other.
    pub fn observe(&mut self, state: &dyn GameState, time: f32) {
        for milestone in Milestone::ALL {
            if milestone.reached(state) && self.record_if_absent(milestone.key(), time) {
                debug!("Milestone '{}' reached at t={time:.3}", milestone.key());
            }
        }
    }
}
