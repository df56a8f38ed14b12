use crate::display::overlay::ButtonKind;

/// Misuse of the display's lifecycle or of its construction contract.
/// These are programming errors; the host should stop its frame loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayError {
    NoPlayers,
    NotStarted,
    AlreadyStarted,
    Destroyed,
    /// The simulation could not resolve a player the display was built with.
    UnknownPlayer { number: u8 },
    /// A touch button was activated before its owner registered a handler.
    MissingHandler(ButtonKind),
}

impl std::fmt::Display for DisplayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoPlayers => write!(f, "game display needs at least one player"),
            Self::NotStarted => write!(f, "game display used before start()"),
            Self::AlreadyStarted => write!(f, "game display started twice"),
            Self::Destroyed => write!(f, "game display used after destroy()"),
            Self::UnknownPlayer { number } => {
                write!(f, "game state has no entry for player {number}")
            }
            Self::MissingHandler(kind) => {
                write!(f, "no handler registered for the {} button", kind.as_str())
            }
        }
    }
}

impl std::error::Error for DisplayError {}
