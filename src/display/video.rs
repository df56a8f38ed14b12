use log::{debug, info, warn};

/// Background video element driven by the display.
pub trait VideoSurface {
    fn set_volume(&mut self, volume: f32);
    fn play(&mut self);
    /// Marks the surface as actively playing so the skin can show it.
    fn set_playing(&mut self, playing: bool);
}

/// Starts the background video once, on the first frame whose game time
/// reaches the offset. Never stops or restarts it afterwards.
pub struct VideoSync {
    video: Option<Box<dyn VideoSurface>>,
    offset: f32,
    started: bool,
}

impl VideoSync {
    pub const fn disabled() -> Self {
        Self {
            video: None,
            offset: 0.0,
            started: false,
        }
    }

    /// A negative or non-finite offset leaves the video attached but never
    /// triggers it.
    pub fn new(video: Box<dyn VideoSurface>, offset: f32) -> Self {
        if !offset.is_finite() || offset < 0.0 {
            warn!("Ignoring background video with invalid offset {offset}; it will not play.");
        }
        Self {
            video: Some(video),
            offset,
            started: false,
        }
    }

    #[inline(always)]
    pub const fn is_configured(&self) -> bool {
        self.video.is_some()
    }

    #[inline(always)]
    pub const fn is_started(&self) -> bool {
        self.started
    }

    #[inline(always)]
    fn can_trigger(&self) -> bool {
        self.video.is_some() && self.offset.is_finite() && self.offset >= 0.0
    }

    /// Returns true on the single call that started playback.
    pub fn update(&mut self, game_time: f32) -> bool {
        if self.started || !self.can_trigger() || game_time.is_nan() || game_time < self.offset {
            return false;
        }
        let Some(video) = self.video.as_mut() else {
            return false;
        };
        video.set_volume(0.0);
        video.play();
        video.set_playing(true);
        self.started = true;
        info!("Background video started at game time {game_time:.3} (offset {:.3}).", self.offset);
        true
    }
}

/// Stand-in surface for hosts without a video decoder; logs what a real
/// element would do.
#[derive(Debug, Default)]
pub struct LoggedVideo {
    volume: f32,
}

impl VideoSurface for LoggedVideo {
    fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
    }

    fn play(&mut self) {
        info!("Background video: play (volume {:.2}).", self.volume);
    }

    fn set_playing(&mut self, playing: bool) {
        debug!("Background video: playing={playing}.");
    }
}
