use crate::display::snapshot::Value;
use crate::game::{Placement, Player, PlayerState};
use smallvec::SmallVec;

/// Unprefixed key/value pairs one player contributes to a frame. The display
/// namespaces them as `p{number}_{key}`.
pub type PlayerData = SmallVec<[(&'static str, Value); 8]>;

/// Per-player visual sub-display. Created once per player when the game
/// display is built and updated every frame.
pub trait PlayerDisplay {
    fn update(&mut self, time: f32, game_time: f32, state: &PlayerState) -> PlayerData;
}

/// Default player display: combo, score, life and the latest judgment.
pub struct StatsDisplay {
    placement: Placement,
    last_combo: u32,
    combo_changed_at: f32,
}

impl StatsDisplay {
    pub fn new(player: &Player) -> Self {
        Self {
            placement: player.options.placement,
            last_combo: 0,
            combo_changed_at: 0.0,
        }
    }
}

impl PlayerDisplay for StatsDisplay {
    fn update(&mut self, time: f32, game_time: f32, state: &PlayerState) -> PlayerData {
        if state.combo != self.last_combo {
            self.last_combo = state.combo;
            self.combo_changed_at = time;
        }

        let mut data = PlayerData::new();
        data.push(("placement", Value::from(self.placement.as_str())));
        data.push(("combo", Value::from(state.combo)));
        data.push(("combo_t", Value::from(self.combo_changed_at)));
        data.push(("max_combo", Value::from(state.max_combo)));
        data.push(("score", Value::from(state.score)));
        data.push(("life", Value::from(state.life.clamp(0.0, 1.0))));
        match (state.last_judgment, state.judged_at) {
            (Some(grade), Some(at)) => {
                data.push(("judgment", Value::from(grade.as_str())));
                data.push(("judgment_age", Value::from((game_time - at).max(0.0))));
            }
            _ => data.push(("judgment", Value::from(""))),
        }
        data
    }
}
