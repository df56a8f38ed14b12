use crate::config::{InfoPanelPosition, InputDevice};
use crate::display::snapshot::Snapshot;
use log::{Level, info, log_enabled, trace, warn};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Skin-level settings the display reads from its rendering context.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SkinData {
    pub info_panel_position: InfoPanelPosition,
    pub main_input_device: InputDevice,
}

/// The drawing side of the display. It receives one snapshot per frame, in
/// order, and is released exactly once.
pub trait RenderContext {
    /// Surface the context draws into.
    type View;

    fn view(&self) -> &Self::View;
    fn skin_data(&self) -> &SkinData;
    fn render(&mut self, snapshot: &Snapshot);
    fn destroy(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Surface {
    pub width: u32,
    pub height: u32,
}

#[derive(Serialize)]
struct TraceHeader<'a> {
    session: &'a str,
    width: u32,
    height: u32,
}

#[derive(Serialize)]
struct TraceFrame<'a> {
    frame: u64,
    data: &'a Snapshot,
}

/// Headless context: writes every snapshot as a JSON line, or logs it at
/// trace level when there is no output.
pub struct TraceContext {
    view: Surface,
    skin: SkinData,
    out: Option<Box<dyn Write>>,
    frames: u64,
}

impl TraceContext {
    pub fn new(view: Surface, skin: SkinData) -> Self {
        Self {
            view,
            skin,
            out: None,
            frames: 0,
        }
    }

    pub fn with_writer(view: Surface, skin: SkinData, mut out: Box<dyn Write>) -> Self {
        let session = chrono::Local::now().to_rfc3339();
        let header = TraceHeader {
            session: &session,
            width: view.width,
            height: view.height,
        };
        let out = match write_line(&mut out, &header) {
            Ok(()) => Some(out),
            Err(e) => {
                warn!("Failed to write trace header: {e}");
                None
            }
        };
        Self {
            view,
            skin,
            out,
            frames: 0,
        }
    }

    pub fn create(path: &Path, view: Surface, skin: SkinData) -> Result<Self, std::io::Error> {
        let file = File::create(path)?;
        info!("Tracing render snapshots to '{}'.", path.display());
        Ok(Self::with_writer(view, skin, Box::new(BufWriter::new(file))))
    }

    #[inline(always)]
    pub const fn frames(&self) -> u64 {
        self.frames
    }
}

fn write_line<T: Serialize>(out: &mut Box<dyn Write>, value: &T) -> Result<(), std::io::Error> {
    serde_json::to_writer(&mut *out, value)?;
    out.write_all(b"\n")
}

impl RenderContext for TraceContext {
    type View = Surface;

    fn view(&self) -> &Surface {
        &self.view
    }

    fn skin_data(&self) -> &SkinData {
        &self.skin
    }

    fn render(&mut self, snapshot: &Snapshot) {
        self.frames += 1;
        let frame = TraceFrame {
            frame: self.frames,
            data: snapshot,
        };
        match self.out.as_mut() {
            Some(out) => {
                if let Err(e) = write_line(out, &frame) {
                    warn!("Snapshot trace stopped: {e}");
                    self.out = None;
                }
            }
            None if log_enabled!(Level::Trace) => {
                if let Ok(json) = serde_json::to_string(&frame) {
                    trace!("{json}");
                }
            }
            None => {}
        }
    }

    fn destroy(&mut self) {
        if let Some(mut out) = self.out.take()
            && let Err(e) = out.flush()
        {
            warn!("Failed to flush snapshot trace: {e}");
        }
        info!("Render context released after {} frames.", self.frames);
    }
}

#[cfg(test)]
mod tests {
    use super::{RenderContext, SkinData, Surface, TraceContext};
    use crate::display::snapshot::{Snapshot, Value};
    use std::cell::RefCell;
    use std::io::Write;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct SharedBuf(Rc<RefCell<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    const VIEW: Surface = Surface {
        width: 640,
        height: 480,
    };

    #[test]
    fn writes_header_then_one_line_per_frame() {
        let buf = SharedBuf::default();
        let mut ctx = TraceContext::with_writer(VIEW, SkinData::default(), Box::new(buf.clone()));
        let snap: Snapshot = [("t", Value::from(0.5_f32))].into_iter().collect();
        ctx.render(&snap);
        ctx.render(&snap);
        ctx.destroy();
        assert_eq!(ctx.frames(), 2);

        let text = String::from_utf8(buf.0.borrow().clone()).expect("trace is utf-8");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3, "header plus two frames: {text}");
        let header: serde_json::Value = serde_json::from_str(lines[0]).expect("header is json");
        assert_eq!(header["width"].as_u64(), Some(640));
        let second: serde_json::Value = serde_json::from_str(lines[2]).expect("frame is json");
        assert_eq!(second["frame"].as_u64(), Some(2));
        assert_eq!(second["data"]["t"].as_f64(), Some(0.5));
    }

    #[test]
    fn log_only_context_counts_frames() {
        let mut ctx = TraceContext::new(VIEW, SkinData::default());
        ctx.render(&Snapshot::default());
        assert_eq!(ctx.frames(), 1);
        assert_eq!(*ctx.view(), VIEW);
        ctx.destroy();
    }
}
