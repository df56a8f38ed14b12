use crate::game::judgment::{self, JudgeGrade};
use crate::game::{
    Game, GameOptions, GameState, Notechart, Placement, Player, PlayerOptions, PlayerState,
    SongInfo,
};
use log::debug;
use smallvec::SmallVec;
use std::sync::Arc;

// Scripted session used by the headless host. Everything is a pure function of
// game time so seeking backwards (replay) reproduces the same frames.

/// Game time the host starts counting from.
pub const LEAD_IN_SECONDS: f32 = 3.0;
const READY_SECONDS: f32 = 2.0;
const NOTES_PER_SECOND: f32 = 4.0;

pub fn demo_game(num_players: u8, duration: f32, tutorial: bool) -> Game {
    let chart = Arc::new(Notechart {
        duration: duration.max(0.0),
        song_info: SongInfo {
            title: Arc::from("Demo Song"),
            artist: Arc::from("deadsync"),
        },
    });
    let num_players = num_players.clamp(1, 2);
    let players = (1..=num_players)
        .map(|number| Player {
            number,
            options: PlayerOptions {
                placement: match (num_players, number) {
                    (1, _) => Placement::Center,
                    (_, 1) => Placement::Left,
                    _ => Placement::Right,
                },
            },
            notechart: Arc::clone(&chart),
        })
        .collect();
    Game {
        players,
        options: GameOptions { tutorial },
    }
}

pub struct ScriptedGame {
    players: SmallVec<[PlayerState; 2]>,
    ready_fraction: f32,
    started: bool,
    getting_started: bool,
    duration: f32,
}

impl ScriptedGame {
    pub fn new(game: &Game) -> Self {
        let duration = game
            .primary_player()
            .map_or(0.0, |p| p.notechart.duration);
        Self {
            players: game.players.iter().map(|_| PlayerState::default()).collect(),
            ready_fraction: 0.0,
            started: false,
            getting_started: false,
            duration,
        }
    }

    pub fn advance(&mut self, game_time: f32) {
        self.getting_started = game_time >= -READY_SECONDS;
        self.started = game_time >= 0.0;
        self.ready_fraction = ((game_time + READY_SECONDS) / READY_SECONDS).clamp(0.0, 1.0);

        let notes = if game_time <= 0.0 {
            0
        } else {
            (game_time.min(self.duration) * NOTES_PER_SECOND) as u32
        };
        for (index, player) in self.players.iter_mut().enumerate() {
            if notes < player.notes_judged {
                debug!("Player {} rewound to note {notes}", index + 1);
                *player = PlayerState::default();
            }
            for note in player.notes_judged..notes {
                judge_note(player, index, note);
            }
        }
    }
}

/// Deterministic timing error for a note, roughly within +/-100ms with a
/// periodic miss so combos break now and then.
fn scripted_error(player_index: usize, note: u32) -> f32 {
    let period = 23 + 6 * player_index as u32;
    if note % period == period - 1 {
        return 0.5;
    }
    let h = note
        .wrapping_mul(2_654_435_761)
        .wrapping_add(player_index as u32 * 40_503);
    ((h >> 16) % 201) as f32 / 1000.0 - 0.1
}

fn judge_note(p: &mut PlayerState, player_index: usize, note: u32) {
    let grade = judgment::grade_for_error(scripted_error(player_index, note));
    let (points, life_delta) = match grade {
        JudgeGrade::Fantastic => (5, 0.008),
        JudgeGrade::Excellent => (4, 0.008),
        JudgeGrade::Great => (2, 0.004),
        JudgeGrade::Decent => (0, 0.0),
        JudgeGrade::WayOff => (0, -0.05),
        JudgeGrade::Miss => (0, -0.1),
    };
    p.score = p.score.saturating_add(points);
    p.life = (p.life + life_delta).clamp(0.0, 1.0);
    if grade.breaks_combo() {
        p.combo = 0;
    } else {
        p.combo += 1;
        p.max_combo = p.max_combo.max(p.combo);
    }
    p.last_judgment = Some(grade);
    p.judged_at = Some(note as f32 / NOTES_PER_SECOND);
    p.notes_judged = note + 1;
}

impl GameState for ScriptedGame {
    fn ready_fraction(&self) -> f32 {
        self.ready_fraction
    }

    fn started(&self) -> bool {
        self.started
    }

    fn getting_started(&self) -> bool {
        self.getting_started
    }

    fn player(&self, index: usize) -> Option<&PlayerState> {
        self.players.get(index)
    }
}
