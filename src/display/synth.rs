use crate::display::error::DisplayError;
use crate::display::player::PlayerDisplay;
use crate::display::snapshot::{Snapshot, Value};
use crate::display::stateful::StatefulRecorder;
use crate::game::GameState;
use std::sync::Arc;

// Fixed keys every snapshot carries.
pub const KEY_TUTORIAL: &str = "tutorial";
pub const KEY_TIME: &str = "t";
pub const KEY_GAME_TIME: &str = "gameTime";
pub const KEY_READY: &str = "ready";
pub const KEY_SONG_TIME: &str = "song_time";
pub const KEY_SONG_TITLE: &str = "song_title";
pub const KEY_SONG_ARTIST: &str = "song_artist";

/// A player display together with the player it draws, addressed by the
/// player's index in `Game::players`.
pub struct PlayerSlot {
    pub index: usize,
    pub number: u8,
    pub display: Box<dyn PlayerDisplay>,
}

/// Song metadata captured once at `start()`.
#[derive(Debug, Clone)]
pub struct SongConstants {
    pub title: Arc<str>,
    pub artist: Arc<str>,
    pub duration: f32,
}

#[derive(Clone, Copy)]
pub struct FrameInput<'a> {
    /// Elapsed real time since `start()`.
    pub time: f32,
    pub game_time: f32,
    pub state: &'a dyn GameState,
}

/// Quadratic fade of the "ready" cue: 0 up to f = 0.5, then
/// `(1 - (f - 0.5) / 0.5)^2`.
#[inline(always)]
pub fn ready_ease(f: f32) -> f32 {
    if f > 0.5 {
        let x = 1.0 - (f - 0.5) / 0.5;
        x * x
    } else {
        0.0
    }
}

/// `M:SS` below ten minutes total, `MM:SS` below an hour, `H:MM:SS` above.
/// The layout follows the total so both halves of "a / b" line up.
pub fn format_game_time(s: f32, total_seconds: f32) -> String {
    if s.is_nan() || s < 0.0 {
        return format_game_time(0.0, total_seconds);
    }
    let s_u64 = s as u64;

    let minutes = s_u64 / 60;
    let seconds = s_u64 % 60;

    if total_seconds >= 3600.0 {
        let hours = s_u64 / 3600;
        let minutes = (s_u64 % 3600) / 60;
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else if total_seconds >= 600.0 {
        format!("{:02}:{:02}", minutes, seconds)
    } else {
        format!("{}:{:02}", minutes, seconds)
    }
}

/// "elapsed / total" with elapsed clamped into `0..=duration`.
pub fn song_time(game_time: f32, duration: f32) -> String {
    let elapsed = game_time.max(0.0).min(duration);
    format!(
        "{} / {}",
        format_game_time(elapsed, duration),
        format_game_time(duration, duration)
    )
}

/// Builds one frame's snapshot from scratch. Player displays are updated in
/// player order; their keys are namespaced per player number so they never
/// collide with each other or with the fixed keys.
pub fn synthesize(
    frame: FrameInput<'_>,
    song: &SongConstants,
    tutorial: bool,
    players: &mut [PlayerSlot],
    recorder: &StatefulRecorder,
) -> Result<Snapshot, DisplayError> {
    let mut snapshot = Snapshot::with_capacity(16 + players.len() * 10);

    for slot in players.iter_mut() {
        let player_state = frame
            .state
            .player(slot.index)
            .ok_or(DisplayError::UnknownPlayer { number: slot.number })?;
        let data = slot.display.update(frame.time, frame.game_time, player_state);
        for (key, value) in data {
            snapshot.insert(format!("p{}_{}", slot.number, key), value);
        }
    }

    snapshot.insert(KEY_SONG_TITLE, Arc::clone(&song.title));
    snapshot.insert(KEY_SONG_ARTIST, Arc::clone(&song.artist));
    snapshot.insert(KEY_TUTORIAL, if tutorial { "yes" } else { "no" });
    snapshot.insert(KEY_TIME, frame.time);
    snapshot.insert(KEY_GAME_TIME, frame.game_time);
    snapshot.insert(KEY_READY, ready_ease(frame.state.ready_fraction()));
    snapshot.insert(KEY_SONG_TIME, song_time(frame.game_time, song.duration));

    for (key, time) in recorder.iter() {
        snapshot.insert(key, Value::Number(time));
    }
    Ok(snapshot)
}
