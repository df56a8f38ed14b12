use image::RgbaImage;
use log::{debug, warn};
use std::path::PathBuf;
use std::sync::mpsc;

/// Outcome of polling a pending background.
#[derive(Debug)]
pub enum BackgroundPoll {
    Pending,
    Ready(RgbaImage),
    /// The load failed or its producer went away. Not an error for the display.
    Gone,
}

/// A background image that resolves independently of the frame loop.
/// Dropping it abandons the load; a late result is then discarded by the
/// loader thread's failed send.
pub struct BackgroundImage {
    rx: mpsc::Receiver<Result<RgbaImage, String>>,
}

impl BackgroundImage {
    /// Decodes `path` on a worker thread.
    pub fn load(path: PathBuf) -> Self {
        let (tx, rx) = mpsc::channel();
        std::thread::spawn(move || {
            let result = image::open(&path)
                .map(|img| img.to_rgba8())
                .map_err(|e| format!("{}: {e}", path.display()));
            let _ = tx.send(result);
        });
        Self { rx }
    }

    /// Wraps a receiver fed by some other producer.
    pub fn from_receiver(rx: mpsc::Receiver<Result<RgbaImage, String>>) -> Self {
        Self { rx }
    }

    pub fn poll(&self) -> BackgroundPoll {
        match self.rx.try_recv() {
            Ok(Ok(image)) => {
                debug!("Background image ready ({}x{}).", image.width(), image.height());
                BackgroundPoll::Ready(image)
            }
            Ok(Err(e)) => {
                warn!("Background image failed to load: {e}");
                BackgroundPoll::Gone
            }
            Err(mpsc::TryRecvError::Empty) => BackgroundPoll::Pending,
            Err(mpsc::TryRecvError::Disconnected) => {
                warn!("Background image loader went away without a result.");
                BackgroundPoll::Gone
            }
        }
    }
}
