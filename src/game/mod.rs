pub mod judgment;
pub mod script;
pub mod state;

pub use state::{
    Game, GameOptions, GameState, Notechart, Placement, Player, PlayerOptions, PlayerState,
    SongInfo,
};
