use crate::config::{DisplayMode, FullscreenType};
use crate::display::error::DisplayError;
use log::debug;
use smallvec::SmallVec;
use winit::event::{ElementState, MouseButton, TouchPhase};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonKind {
    Escape,
    Replay,
    Fullscreen,
}

impl ButtonKind {
    #[inline(always)]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Escape => "escape",
            Self::Replay => "replay",
            Self::Fullscreen => "fullscreen",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

/// Hidden until the first touch, then visible for good.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevealLatch {
    visible: bool,
}

impl RevealLatch {
    pub const fn new(display_by_default: bool) -> Self {
        Self {
            visible: display_by_default,
        }
    }

    #[inline(always)]
    pub const fn is_visible(&self) -> bool {
        self.visible
    }

    /// Returns true only on the touch that revealed the group.
    pub fn touch(&mut self) -> bool {
        if self.visible {
            return false;
        }
        self.visible = true;
        true
    }
}

#[derive(Debug, Clone)]
pub struct ButtonGroup {
    #[allow(dead_code)] // read by the skin when laying out the group
    pub side: Side,
    pub buttons: SmallVec<[ButtonKind; 2]>,
    latch: RevealLatch,
}

impl ButtonGroup {
    #[inline(always)]
    pub const fn is_visible(&self) -> bool {
        self.latch.is_visible()
    }

    #[inline(always)]
    fn contains(&self, kind: ButtonKind) -> bool {
        self.buttons.contains(&kind)
    }
}

/// Whether the platform can go fullscreen and whether policy allows offering it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FullscreenPolicy {
    pub available: bool,
    pub disabled: bool,
    pub mode: FullscreenType,
}

impl FullscreenPolicy {
    #[inline(always)]
    const fn offers_button(&self) -> bool {
        self.available && !self.disabled
    }
}

/// What reached the overlay, already hit-tested by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayInput {
    /// Touch began on the display surface outside any button.
    SurfaceTouch,
    /// Touch began on a button.
    ButtonTouch(ButtonKind),
    /// A button was activated (tap released or mouse clicked on it).
    ButtonClick(ButtonKind),
}

impl OverlayInput {
    pub const fn from_touch(phase: TouchPhase, target: Option<ButtonKind>) -> Option<Self> {
        match (phase, target) {
            (TouchPhase::Started, None) => Some(Self::SurfaceTouch),
            (TouchPhase::Started, Some(kind)) => Some(Self::ButtonTouch(kind)),
            (TouchPhase::Ended, Some(kind)) => Some(Self::ButtonClick(kind)),
            _ => None,
        }
    }

    pub fn from_mouse(
        state: ElementState,
        button: MouseButton,
        target: Option<ButtonKind>,
    ) -> Option<Self> {
        match (state, button, target) {
            (ElementState::Released, MouseButton::Left, Some(kind)) => {
                Some(Self::ButtonClick(kind))
            }
            _ => None,
        }
    }
}

/// Whether an input should continue to the display's other handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Propagation {
    Continue,
    Stop,
}

type Handler = Box<dyn FnMut()>;
type FullscreenHandler = Box<dyn FnMut(DisplayMode)>;

/// Escape/replay buttons (left, revealed by touch) and the fullscreen button
/// (right, always visible when offered). Actions go to handlers registered by
/// the owner after construction.
pub struct OverlayControls {
    touch_buttons: ButtonGroup,
    fullscreen: Option<ButtonGroup>,
    fullscreen_mode: FullscreenType,
    on_escape: Option<Handler>,
    on_replay: Option<Handler>,
    on_fullscreen: Option<FullscreenHandler>,
}

impl OverlayControls {
    pub fn new(display_by_default: bool, fullscreen: FullscreenPolicy) -> Self {
        let touch_buttons = ButtonGroup {
            side: Side::Left,
            buttons: SmallVec::from_slice(&[ButtonKind::Escape, ButtonKind::Replay]),
            latch: RevealLatch::new(display_by_default),
        };
        let fullscreen_group = fullscreen.offers_button().then(|| ButtonGroup {
            side: Side::Right,
            buttons: SmallVec::from_slice(&[ButtonKind::Fullscreen]),
            latch: RevealLatch::new(true),
        });
        if fullscreen_group.is_none() {
            debug!(
                "Fullscreen button skipped (available: {}, disabled: {}).",
                fullscreen.available, fullscreen.disabled
            );
        }
        Self {
            touch_buttons,
            fullscreen: fullscreen_group,
            fullscreen_mode: fullscreen.mode,
            on_escape: None,
            on_replay: None,
            on_fullscreen: None,
        }
    }

    pub fn set_escape_handler(&mut self, handler: impl FnMut() + 'static) {
        self.on_escape = Some(Box::new(handler));
    }

    pub fn set_replay_handler(&mut self, handler: impl FnMut() + 'static) {
        self.on_replay = Some(Box::new(handler));
    }

    pub fn set_fullscreen_handler(&mut self, handler: impl FnMut(DisplayMode) + 'static) {
        self.on_fullscreen = Some(Box::new(handler));
    }

    #[inline(always)]
    pub const fn touch_buttons(&self) -> &ButtonGroup {
        &self.touch_buttons
    }

    #[inline(always)]
    pub const fn fullscreen_buttons(&self) -> Option<&ButtonGroup> {
        self.fullscreen.as_ref()
    }

    fn is_clickable(&self, kind: ButtonKind) -> bool {
        if self.touch_buttons.contains(kind) {
            return self.touch_buttons.is_visible();
        }
        self.fullscreen
            .as_ref()
            .is_some_and(|g| g.contains(kind) && g.is_visible())
    }

    pub fn handle(&mut self, input: OverlayInput) -> Result<Propagation, DisplayError> {
        match input {
            OverlayInput::SurfaceTouch => {
                if self.touch_buttons.latch.touch() {
                    debug!("Touch buttons revealed.");
                }
                Ok(Propagation::Continue)
            }
            // Buttons swallow their own touch so it never reaches the latch.
            OverlayInput::ButtonTouch(_) => Ok(Propagation::Stop),
            OverlayInput::ButtonClick(kind) => {
                if self.is_clickable(kind) {
                    self.invoke(kind)?;
                }
                Ok(Propagation::Stop)
            }
        }
    }

    fn invoke(&mut self, kind: ButtonKind) -> Result<(), DisplayError> {
        let missing = DisplayError::MissingHandler(kind);
        match kind {
            ButtonKind::Escape => (self.on_escape.as_mut().ok_or(missing)?)(),
            ButtonKind::Replay => (self.on_replay.as_mut().ok_or(missing)?)(),
            ButtonKind::Fullscreen => {
                let mode = DisplayMode::Fullscreen(self.fullscreen_mode);
                (self.on_fullscreen.as_mut().ok_or(missing)?)(mode)
            }
        }
        Ok(())
    }
}
