use crate::game::judgment::JudgeGrade;
use std::sync::Arc;

/// Where a player's notefield sits on screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Placement {
    Left,
    #[default]
    Center,
    Right,
    ThreeD,
}

impl Placement {
    #[inline(always)]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
            Self::ThreeD => "3d",
        }
    }
}

impl std::str::FromStr for Placement {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" | "p1" => Ok(Self::Left),
            "center" | "centre" => Ok(Self::Center),
            "right" | "p2" => Ok(Self::Right),
            "3d" => Ok(Self::ThreeD),
            _ => Err(format!("'{s}' is not a valid placement")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SongInfo {
    pub title: Arc<str>,
    pub artist: Arc<str>,
}

#[derive(Debug, Clone)]
pub struct Notechart {
    /// Song length in seconds.
    pub duration: f32,
    pub song_info: SongInfo,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PlayerOptions {
    pub placement: Placement,
}

/// A player as seen by the display. Owned by the simulation; the display
/// addresses it by its index in `Game::players`.
#[derive(Debug, Clone)]
pub struct Player {
    /// 1-based, stable for the whole session.
    pub number: u8,
    pub options: PlayerOptions,
    pub notechart: Arc<Notechart>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GameOptions {
    pub tutorial: bool,
}

#[derive(Debug, Clone)]
pub struct Game {
    pub players: Vec<Player>,
    pub options: GameOptions,
}

impl Game {
    #[inline(always)]
    pub fn primary_player(&self) -> Option<&Player> {
        self.players.first()
    }
}

/// Per-player gameplay state read by the player displays each frame.
#[derive(Debug, Clone)]
pub struct PlayerState {
    pub combo: u32,
    pub max_combo: u32,
    pub score: u32,
    /// 0.0..=1.0
    pub life: f32,
    pub last_judgment: Option<JudgeGrade>,
    /// Game time at which `last_judgment` was made.
    pub judged_at: Option<f32>,
    pub notes_judged: u32,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            combo: 0,
            max_combo: 0,
            score: 0,
            life: 0.5,
            last_judgment: None,
            judged_at: None,
            notes_judged: 0,
        }
    }
}

/// Read-only view of the running simulation, polled once per frame.
pub trait GameState {
    /// Progress of the "ready" cue, 0.0..=1.0.
    fn ready_fraction(&self) -> f32;
    fn started(&self) -> bool;
    fn getting_started(&self) -> bool;
    /// State of the player at `index` in `Game::players`.
    fn player(&self, index: usize) -> Option<&PlayerState>;
}
