pub mod background;
pub mod context;
pub mod error;
pub mod overlay;
pub mod player;
pub mod snapshot;
pub mod stateful;
pub mod synth;
pub mod video;
pub mod wrapper;

pub use background::{BackgroundImage, BackgroundPoll};
pub use context::{RenderContext, SkinData, Surface, TraceContext};
pub use error::DisplayError;
pub use overlay::{ButtonKind, FullscreenPolicy, OverlayControls, OverlayInput, Propagation};
pub use player::{PlayerDisplay, StatsDisplay};
pub use stateful::StatefulRecorder;
pub use video::{LoggedVideo, VideoSurface, VideoSync};
pub use wrapper::Wrapper;

use crate::config::{DisplayMode, InputDevice};
use crate::core::clock::TimeSource;
use crate::game::{Game, GameState, Player};
use log::info;
use smallvec::SmallVec;
use std::sync::Arc;
use std::time::Instant;
use synth::{FrameInput, PlayerSlot, SongConstants};

pub struct VideoOptions {
    pub element: Box<dyn VideoSurface>,
    /// Game time at which playback starts.
    pub offset: f32,
}

pub struct DisplayOptions<C> {
    pub game: Arc<Game>,
    pub context: C,
    pub background_image: Option<BackgroundImage>,
    pub video: Option<VideoOptions>,
    pub fullscreen: FullscreenPolicy,
}

struct Session {
    clock: TimeSource,
    song: SongConstants,
}

enum Lifecycle {
    Constructed,
    Started(Session),
    Destroyed,
}

/// Turns the simulation's per-frame state into render snapshots and owns
/// everything that hangs off that: player displays, milestones, background
/// video and the touch overlay.
///
/// Call order is `start` once, `update` per frame, then `destroy`; anything
/// else is rejected with a [`DisplayError`].
pub struct GameDisplay<C: RenderContext> {
    game: Arc<Game>,
    context: C,
    players: SmallVec<[PlayerSlot; 2]>,
    stateful: StatefulRecorder,
    wrapper: Wrapper,
    background: Option<BackgroundImage>,
    video: VideoSync,
    overlay: OverlayControls,
    lifecycle: Lifecycle,
}

impl<C: RenderContext> GameDisplay<C> {
    pub fn new(options: DisplayOptions<C>) -> Result<Self, DisplayError> {
        Self::with_player_displays(options, |player, _skin| {
            Box::new(StatsDisplay::new(player)) as Box<dyn PlayerDisplay>
        })
    }

    /// Builds the display with a caller-chosen player display per player.
    pub fn with_player_displays<F>(
        options: DisplayOptions<C>,
        mut make_player_display: F,
    ) -> Result<Self, DisplayError>
    where
        F: FnMut(&Player, &SkinData) -> Box<dyn PlayerDisplay>,
    {
        let DisplayOptions {
            game,
            context,
            background_image,
            video,
            fullscreen,
        } = options;
        let panel_placement = game
            .primary_player()
            .ok_or(DisplayError::NoPlayers)?
            .options
            .placement;
        let skin = *context.skin_data();

        let players = game
            .players
            .iter()
            .enumerate()
            .map(|(index, player)| PlayerSlot {
                index,
                number: player.number,
                display: make_player_display(player, &skin),
            })
            .collect();
        let wrapper = Wrapper::new(panel_placement, skin.info_panel_position, video.is_some());
        let video = match video {
            Some(v) => VideoSync::new(v.element, v.offset),
            None => VideoSync::disabled(),
        };
        let overlay = OverlayControls::new(skin.main_input_device == InputDevice::Touch, fullscreen);

        info!(
            "Game display created: {} player(s), background: {}, video: {}.",
            game.players.len(),
            background_image.is_some(),
            video.is_configured()
        );

        let mut display = Self {
            game,
            context,
            players,
            stateful: StatefulRecorder::new(),
            wrapper,
            background: background_image,
            video,
            overlay,
            lifecycle: Lifecycle::Constructed,
        };
        display.poll_background();
        Ok(display)
    }

    pub fn set_escape_handler(&mut self, handler: impl FnMut() + 'static) {
        self.overlay.set_escape_handler(handler);
    }

    pub fn set_replay_handler(&mut self, handler: impl FnMut() + 'static) {
        self.overlay.set_replay_handler(handler);
    }

    pub fn set_fullscreen_handler(&mut self, handler: impl FnMut(DisplayMode) + 'static) {
        self.overlay.set_fullscreen_handler(handler);
    }

    pub fn start(&mut self) -> Result<(), DisplayError> {
        self.start_at(Instant::now())
    }

    pub fn start_at(&mut self, now: Instant) -> Result<(), DisplayError> {
        match self.lifecycle {
            Lifecycle::Constructed => {}
            Lifecycle::Started(_) => return Err(DisplayError::AlreadyStarted),
            Lifecycle::Destroyed => return Err(DisplayError::Destroyed),
        }
        let primary = self.game.primary_player().ok_or(DisplayError::NoPlayers)?;
        let chart = &primary.notechart;
        let song = SongConstants {
            title: Arc::clone(&chart.song_info.title),
            artist: Arc::clone(&chart.song_info.artist),
            duration: chart.duration,
        };
        info!(
            "Display started: '{}' by '{}' ({:.1}s).",
            song.title, song.artist, song.duration
        );

        let mut clock = TimeSource::new();
        clock.start_at(now);
        self.lifecycle = Lifecycle::Started(Session { clock, song });
        Ok(())
    }

    pub fn update(&mut self, game_time: f32, state: &dyn GameState) -> Result<(), DisplayError> {
        self.update_at(Instant::now(), game_time, state)
    }

    /// One frame: record milestones, build and render the snapshot, then let
    /// the background video catch up with game time.
    pub fn update_at(
        &mut self,
        now: Instant,
        game_time: f32,
        state: &dyn GameState,
    ) -> Result<(), DisplayError> {
        let session = match &self.lifecycle {
            Lifecycle::Started(session) => session,
            Lifecycle::Constructed => return Err(DisplayError::NotStarted),
            Lifecycle::Destroyed => return Err(DisplayError::Destroyed),
        };
        let time = session.clock.elapsed_at(now).ok_or(DisplayError::NotStarted)?;

        attach_ready_background(&mut self.background, &mut self.wrapper);
        self.stateful.observe(state, time);
        let snapshot = synth::synthesize(
            FrameInput {
                time,
                game_time,
                state,
            },
            &session.song,
            self.game.options.tutorial,
            &mut self.players,
            &self.stateful,
        )?;
        self.context.render(&snapshot);
        self.video.update(game_time);
        Ok(())
    }

    /// Releases the rendering context. Any pending background is abandoned.
    pub fn destroy(&mut self) -> Result<(), DisplayError> {
        if matches!(self.lifecycle, Lifecycle::Destroyed) {
            return Err(DisplayError::Destroyed);
        }
        self.context.destroy();
        self.background = None;
        self.lifecycle = Lifecycle::Destroyed;
        info!("Game display destroyed.");
        Ok(())
    }

    pub fn handle_input(&mut self, input: OverlayInput) -> Result<Propagation, DisplayError> {
        if matches!(self.lifecycle, Lifecycle::Destroyed) {
            return Err(DisplayError::Destroyed);
        }
        self.overlay.handle(input)
    }

    /// Attaches the background if it has resolved. `update` does this too.
    pub fn poll_background(&mut self) {
        if !matches!(self.lifecycle, Lifecycle::Destroyed) {
            attach_ready_background(&mut self.background, &mut self.wrapper);
        }
    }

    #[inline(always)]
    pub const fn context(&self) -> &C {
        &self.context
    }

    #[inline(always)]
    pub fn view(&self) -> &C::View {
        self.context.view()
    }

    #[inline(always)]
    pub const fn wrapper(&self) -> &Wrapper {
        &self.wrapper
    }

    #[inline(always)]
    pub const fn overlay(&self) -> &OverlayControls {
        &self.overlay
    }

    #[inline(always)]
    pub const fn video(&self) -> &VideoSync {
        &self.video
    }

    #[inline(always)]
    pub const fn stateful(&self) -> &StatefulRecorder {
        &self.stateful
    }
}

fn attach_ready_background(background: &mut Option<BackgroundImage>, wrapper: &mut Wrapper) {
    let Some(pending) = background.as_ref() else {
        return;
    };
    match pending.poll() {
        BackgroundPoll::Pending => {}
        BackgroundPoll::Ready(image) => {
            wrapper.attach_background(image);
            *background = None;
        }
        BackgroundPoll::Gone => *background = None,
    }
}

#[cfg(test)]
mod tests {
    use super::player::PlayerData;
    use super::snapshot::{Snapshot, Value};
    use super::{
        BackgroundImage, ButtonKind, DisplayError, DisplayOptions, FullscreenPolicy, GameDisplay,
        OverlayInput, PlayerDisplay, Propagation, RenderContext, SkinData, VideoOptions,
        VideoSurface,
    };
    use crate::config::{FullscreenType, InfoPanelPosition, InputDevice};
    use crate::game::{
        Game, GameOptions, GameState, Notechart, Placement, Player, PlayerOptions, PlayerState,
        SongInfo,
    };
    use image::RgbaImage;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;
    use std::sync::{Arc, mpsc};
    use std::time::{Duration, Instant};

    #[derive(Default)]
    struct RecordingContext {
        skin: SkinData,
        frames: Vec<Snapshot>,
        destroyed: u32,
    }

    impl RenderContext for RecordingContext {
        type View = &'static str;

        fn view(&self) -> &&'static str {
            &"recording"
        }
        fn skin_data(&self) -> &SkinData {
            &self.skin
        }
        fn render(&mut self, snapshot: &Snapshot) {
            self.frames.push(snapshot.clone());
        }
        fn destroy(&mut self) {
            self.destroyed += 1;
        }
    }

    #[derive(Default)]
    struct FakeState {
        ready: f32,
        started: bool,
        getting_started: bool,
        players: Vec<PlayerState>,
    }

    impl GameState for FakeState {
        fn ready_fraction(&self) -> f32 {
            self.ready
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

    struct ComboOnly;

    impl PlayerDisplay for ComboOnly {
        fn update(&mut self, _time: f32, _game_time: f32, state: &PlayerState) -> PlayerData {
            let mut data = PlayerData::new();
            data.push(("combo", Value::from(state.combo)));
            data
        }
    }

    struct SharedVideo(Rc<Cell<u32>>);

    impl VideoSurface for SharedVideo {
        fn set_volume(&mut self, _volume: f32) {}
        fn play(&mut self) {
            self.0.set(self.0.get() + 1);
        }
        fn set_playing(&mut self, _playing: bool) {}
    }

    const NO_FULLSCREEN: FullscreenPolicy = FullscreenPolicy {
        available: false,
        disabled: false,
        mode: FullscreenType::Borderless,
    };

    fn game(players: u8, duration: f32) -> Arc<Game> {
        let chart = Arc::new(Notechart {
            duration,
            song_info: SongInfo {
                title: Arc::from("Song"),
                artist: Arc::from("Artist"),
            },
        });
        Arc::new(Game {
            players: (1..=players)
                .map(|number| Player {
                    number,
                    options: PlayerOptions {
                        placement: if number == 1 { Placement::Left } else { Placement::Right },
                    },
                    notechart: Arc::clone(&chart),
                })
                .collect(),
            options: GameOptions { tutorial: false },
        })
    }

    fn options(game: Arc<Game>) -> DisplayOptions<RecordingContext> {
        DisplayOptions {
            game,
            context: RecordingContext::default(),
            background_image: None,
            video: None,
            fullscreen: NO_FULLSCREEN,
        }
    }

    fn combo_display(opts: DisplayOptions<RecordingContext>) -> GameDisplay<RecordingContext> {
        GameDisplay::with_player_displays(opts, |_, _| Box::new(ComboOnly) as Box<dyn PlayerDisplay>)
            .expect("display builds")
    }

    fn state_with_combos(combos: &[u32]) -> FakeState {
        FakeState {
            players: combos
                .iter()
                .map(|&combo| PlayerState {
                    combo,
                    ..PlayerState::default()
                })
                .collect(),
            ..FakeState::default()
        }
    }

    fn last_frame(display: &GameDisplay<RecordingContext>) -> &Snapshot {
        display.context().frames.last().expect("a frame was rendered")
    }

    #[test]
    fn two_player_frame_end_to_end() {
        let mut display = combo_display(options(game(2, 200.0)));
        let t0 = Instant::now();
        display.start_at(t0).expect("first start");
        let mut state = state_with_combos(&[5, 9]);
        state.ready = 0.75;
        display
            .update_at(t0 + Duration::from_secs(2), 10.0, &state)
            .expect("frame renders");

        let snap = last_frame(&display);
        assert!(snap.number("ready").is_some_and(|r| (r - 0.25).abs() <= 1e-6));
        assert_eq!(snap.text("song_time"), Some("0:10 / 3:20"));
        assert_eq!(snap.number("t"), Some(2.0));
        assert_eq!(snap.number("gameTime"), Some(10.0));
        assert_eq!(snap.number("p1_combo"), Some(5.0));
        assert_eq!(snap.number("p2_combo"), Some(9.0));
        assert!(!snap.contains_key("combo"));
        assert_eq!(snap.text("song_title"), Some("Song"));
        assert_eq!(snap.text("song_artist"), Some("Artist"));
        assert_eq!(snap.text("tutorial"), Some("no"));
        assert_eq!(*display.view(), "recording");
    }

    #[test]
    fn default_player_displays_are_namespaced() {
        let mut display = GameDisplay::new(options(game(2, 60.0))).expect("display builds");
        display.start().expect("start");
        display
            .update(1.0, &state_with_combos(&[3, 4]))
            .expect("frame renders");
        let snap = last_frame(&display);
        assert_eq!(snap.number("p1_combo"), Some(3.0));
        assert_eq!(snap.text("p2_placement"), Some("right"));
        assert!(
            snap.keys()
                .filter(|k| k.starts_with('p'))
                .all(|k| k.starts_with("p1_") || k.starts_with("p2_"))
        );
    }

    #[test]
    fn lifecycle_misuse_is_rejected() {
        let mut display = combo_display(options(game(1, 60.0)));
        let state = state_with_combos(&[0]);
        assert_eq!(display.update(0.0, &state), Err(DisplayError::NotStarted));
        assert!(display.context().frames.is_empty());

        display.start().expect("first start");
        assert_eq!(display.start(), Err(DisplayError::AlreadyStarted));
        display.update(0.0, &state).expect("started display renders");

        display.destroy().expect("first destroy");
        assert_eq!(display.context().destroyed, 1);
        assert_eq!(display.update(0.0, &state), Err(DisplayError::Destroyed));
        assert_eq!(display.start(), Err(DisplayError::Destroyed));
        assert_eq!(display.destroy(), Err(DisplayError::Destroyed));
        assert_eq!(
            display.handle_input(OverlayInput::SurfaceTouch),
            Err(DisplayError::Destroyed)
        );
        assert_eq!(display.context().destroyed, 1);
        assert_eq!(display.context().frames.len(), 1);
    }

    #[test]
    fn empty_game_is_rejected() {
        let result = GameDisplay::new(options(game(0, 60.0)));
        assert!(matches!(result, Err(DisplayError::NoPlayers)));
    }

    #[test]
    fn missing_player_state_fails_the_frame() {
        let mut display = combo_display(options(game(2, 60.0)));
        display.start().expect("start");
        let result = display.update(0.0, &state_with_combos(&[1]));
        assert_eq!(result, Err(DisplayError::UnknownPlayer { number: 2 }));
        assert!(display.context().frames.is_empty());
    }

    #[test]
    fn milestones_stick_across_frames() {
        let mut display = combo_display(options(game(1, 60.0)));
        let t0 = Instant::now();
        display.start_at(t0).expect("start");
        let mut state = state_with_combos(&[0]);

        display.update_at(t0 + Duration::from_secs(1), -2.0, &state).expect("frame");
        assert!(!last_frame(&display).contains_key("gettingStarted"));

        state.getting_started = true;
        display.update_at(t0 + Duration::from_secs(2), -1.0, &state).expect("frame");
        state.started = true;
        display.update_at(t0 + Duration::from_secs(3), 0.0, &state).expect("frame");
        display.update_at(t0 + Duration::from_secs(4), 1.0, &state).expect("frame");

        let snap = last_frame(&display);
        assert_eq!(snap.number("gettingStarted"), Some(2.0));
        assert_eq!(snap.number("started"), Some(3.0));
        // Earlier frames are untouched by later ones.
        assert_eq!(display.context().frames[1].number("started"), None);
        assert_eq!(display.context().frames[1].number("t"), Some(2.0));
    }

    #[test]
    fn video_starts_once_even_after_replay_seek() {
        let plays = Rc::new(Cell::new(0));
        let mut opts = options(game(1, 60.0));
        opts.video = Some(VideoOptions {
            element: Box::new(SharedVideo(Rc::clone(&plays))),
            offset: 1.5,
        });
        let mut display = combo_display(opts);
        assert!(display.wrapper().has_video());
        display.start().expect("start");
        let state = state_with_combos(&[0]);

        display.update(1.0, &state).expect("frame");
        assert_eq!(plays.get(), 0);
        display.update(1.5, &state).expect("frame");
        assert_eq!(plays.get(), 1);
        for t in [-3.0, 0.0, 1.5, 30.0] {
            display.update(t, &state).expect("frame");
        }
        assert_eq!(plays.get(), 1);
        assert!(display.video().is_started());
    }

    #[test]
    fn background_attaches_when_it_resolves() {
        let (tx, rx) = mpsc::channel();
        let mut opts = options(game(1, 60.0));
        opts.background_image = Some(BackgroundImage::from_receiver(rx));
        let mut display = combo_display(opts);
        display.start().expect("start");
        let state = state_with_combos(&[0]);

        display.update(0.0, &state).expect("frame");
        assert!(display.wrapper().background().is_none());
        tx.send(Ok(RgbaImage::new(3, 3))).expect("display still listening");
        display.update(0.1, &state).expect("frame");
        assert_eq!(display.wrapper().background().map(|i| i.dimensions()), Some((3, 3)));
    }

    #[test]
    fn late_background_after_destroy_is_harmless() {
        let (tx, rx) = mpsc::channel();
        let mut opts = options(game(1, 60.0));
        opts.background_image = Some(BackgroundImage::from_receiver(rx));
        let mut display = combo_display(opts);
        display.destroy().expect("destroy without start");
        assert!(tx.send(Ok(RgbaImage::new(1, 1))).is_err(), "receiver was dropped");
        display.poll_background();
        assert!(display.wrapper().background().is_none());
    }

    #[test]
    fn touch_reveals_escape_and_replay() {
        let mut display = combo_display(options(game(1, 60.0)));
        assert!(!display.overlay().touch_buttons().is_visible());
        let replays = Rc::new(Cell::new(0));
        let r = Rc::clone(&replays);
        display.set_replay_handler(move || r.set(r.get() + 1));
        display.set_escape_handler(|| {});

        // Hidden buttons do nothing.
        display
            .handle_input(OverlayInput::ButtonClick(ButtonKind::Replay))
            .expect("hidden click is ignored");
        assert_eq!(replays.get(), 0);

        assert_eq!(
            display.handle_input(OverlayInput::SurfaceTouch),
            Ok(Propagation::Continue)
        );
        assert!(display.overlay().touch_buttons().is_visible());
        display
            .handle_input(OverlayInput::ButtonClick(ButtonKind::Replay))
            .expect("replay handler registered");
        assert_eq!(replays.get(), 1);
    }

    #[test]
    fn skin_data_drives_wrapper_and_overlay_defaults() {
        let mut opts = options(game(2, 60.0));
        opts.context.skin = SkinData {
            info_panel_position: InfoPanelPosition::Bottom,
            main_input_device: InputDevice::Touch,
        };
        opts.fullscreen = FullscreenPolicy {
            available: true,
            ..NO_FULLSCREEN
        };
        let requested = Rc::new(RefCell::new(Vec::new()));
        let mut display = combo_display(opts);
        let sink = Rc::clone(&requested);
        display.set_fullscreen_handler(move |mode| sink.borrow_mut().push(mode));

        assert!(display.overlay().touch_buttons().is_visible());
        assert_eq!(display.wrapper().panel_placement(), Placement::Left);
        assert_eq!(display.wrapper().info_panel_position(), InfoPanelPosition::Bottom);
        display
            .handle_input(OverlayInput::ButtonClick(ButtonKind::Fullscreen))
            .expect("fullscreen handler registered");
        assert_eq!(requested.borrow().len(), 1);
    }
}
