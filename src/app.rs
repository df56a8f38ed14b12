use crate::config::{self, Config};
use crate::display::{
    BackgroundImage, ButtonKind, DisplayOptions, FullscreenPolicy, GameDisplay, LoggedVideo,
    OverlayInput, SkinData, Surface, TraceContext, VideoOptions,
};
use crate::game::script::{self, LEAD_IN_SECONDS, ScriptedGame};
use log::{info, warn};
use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::{Duration, Instant};
use winit::event::{ElementState, MouseButton, TouchPhase};

/// Game time rendered past the end of the song before the host presses escape.
const OUTRO_SECONDS: f32 = 2.0;
/// Hard stop if escape never lands (e.g. the button stayed hidden).
const GIVE_UP_AFTER_SECONDS: f32 = 5.0;

const REPLAY: OverlayInput = OverlayInput::ButtonClick(ButtonKind::Replay);

/// Input the headless host plays back, expressed as the winit events a
/// windowed host would have seen. Replay clicks beyond the configured count
/// are swallowed so the session eventually reaches escape.
struct DemoInput {
    events: Vec<(f32, OverlayInput)>,
    next: usize,
    replays_left: u32,
}

impl DemoInput {
    fn new(duration: f32, replays: u32) -> Self {
        let events = [
            (0.0, OverlayInput::from_touch(TouchPhase::Started, None)),
            (
                duration,
                OverlayInput::from_touch(TouchPhase::Ended, Some(ButtonKind::Replay)),
            ),
            (
                duration + OUTRO_SECONDS,
                OverlayInput::from_mouse(
                    ElementState::Released,
                    MouseButton::Left,
                    Some(ButtonKind::Escape),
                ),
            ),
        ]
        .into_iter()
        .filter_map(|(at, input)| input.map(|input| (at, input)))
        .collect();
        Self {
            events,
            next: 0,
            replays_left: replays,
        }
    }

    fn due(&mut self, game_time: f32) -> Vec<OverlayInput> {
        let mut due = Vec::new();
        while let Some(&(at, input)) = self.events.get(self.next)
            && at <= game_time
        {
            self.next += 1;
            if input == REPLAY {
                if self.replays_left == 0 {
                    continue;
                }
                self.replays_left -= 1;
            }
            due.push(input);
        }
        due
    }

    fn rewind(&mut self) {
        self.next = 0;
    }
}

fn build_context(config: &Config) -> TraceContext {
    let view = Surface {
        width: config.display_width,
        height: config.display_height,
    };
    let skin = SkinData {
        info_panel_position: config.info_panel_position,
        main_input_device: config.main_input_device,
    };
    match config.trace_path.as_deref() {
        Some(path) => TraceContext::create(path, view, skin).unwrap_or_else(|e| {
            warn!(
                "Cannot open trace file '{}': {e}. Logging frames instead.",
                path.display()
            );
            TraceContext::new(view, skin)
        }),
        None => TraceContext::new(view, skin),
    }
}

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = config::get();
    let game = Arc::new(script::demo_game(
        config.players,
        config.song_seconds,
        config.tutorial,
    ));
    let duration = game
        .primary_player()
        .map_or(0.0, |p| p.notechart.duration);

    let video = config.video_offset_seconds.map(|offset| VideoOptions {
        element: Box::new(LoggedVideo::default()),
        offset,
    });
    let background_image = config.background_path.clone().map(BackgroundImage::load);
    let mut display = GameDisplay::new(DisplayOptions {
        game: Arc::clone(&game),
        context: build_context(&config),
        background_image,
        video,
        // No window to put into fullscreen.
        fullscreen: FullscreenPolicy {
            available: false,
            disabled: config.disable_fullscreen,
            mode: config.fullscreen_type,
        },
    })?;

    let view = display.view();
    let wrapper = display.wrapper();
    info!(
        "Layout: {}x{}, panel {}, info panel {}, video {}.",
        view.width,
        view.height,
        wrapper.panel_placement().as_str(),
        wrapper.info_panel_position().as_str(),
        wrapper.has_video()
    );

    let escaped = Rc::new(Cell::new(false));
    let replays = Rc::new(Cell::new(0u32));
    {
        let escaped = Rc::clone(&escaped);
        display.set_escape_handler(move || escaped.set(true));
    }
    {
        let replays = Rc::clone(&replays);
        display.set_replay_handler(move || replays.set(replays.get() + 1));
    }
    display.set_fullscreen_handler(|mode| {
        info!("Fullscreen requested ({mode:?}), ignored by the headless host.");
    });

    let mut sim = ScriptedGame::new(&game);
    let mut input = DemoInput::new(duration, config.replays);
    let frame_interval = Duration::from_secs_f64(1.0 / f64::from(config.frame_rate.max(1)));
    let mut handled_replays = 0;

    display.start()?;
    let mut song_start = Instant::now();
    let mut next_frame = song_start;
    loop {
        let now = Instant::now();
        if replays.get() != handled_replays {
            handled_replays = replays.get();
            song_start = now;
            input.rewind();
            info!("Replay {handled_replays}: back to the lead-in.");
        }
        let game_time = now.duration_since(song_start).as_secs_f32() - LEAD_IN_SECONDS;

        sim.advance(game_time);
        display.update_at(now, game_time, &sim)?;
        for event in input.due(game_time) {
            display.handle_input(event)?;
            if event == REPLAY {
                // Replay restarts the song; nothing later in this batch applies.
                break;
            }
        }
        if escaped.get() {
            info!("Escape pressed at game time {game_time:.2}.");
            break;
        }
        if replays.get() == handled_replays
            && game_time > duration + OUTRO_SECONDS + GIVE_UP_AFTER_SECONDS
        {
            warn!("Escape never arrived; stopping at game time {game_time:.2}.");
            break;
        }

        next_frame += frame_interval;
        let now = Instant::now();
        if next_frame > now {
            std::thread::sleep(next_frame - now);
        } else {
            next_frame = now;
        }
    }

    let milestones: Vec<String> = display
        .stateful()
        .iter()
        .map(|(key, t)| format!("{key}={t:.2}s"))
        .collect();
    info!(
        "Session over after {handled_replays} replay(s): {} frames, milestones [{}], video started: {}, background shown: {}, touch buttons shown: {}, fullscreen offered: {}.",
        display.context().frames(),
        milestones.join(", "),
        display.video().is_started(),
        display.wrapper().background().is_some(),
        display.overlay().touch_buttons().is_visible(),
        display.overlay().fullscreen_buttons().is_some()
    );
    display.destroy()?;
    Ok(())
}
