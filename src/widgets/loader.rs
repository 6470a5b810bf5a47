//! Loader widget: a single-line spinner animated on a background thread.

use std::io::Write;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::component::Component;
use crate::widgets::markdown::MarkdownStyleFn;

/// `simpleDotsScrolling` from the cli-spinners set.
pub const SPINNER_FRAMES: [&str; 6] = [".  ", ".. ", "...", " ..", "  .", "   "];
pub const SPINNER_INTERVAL: Duration = Duration::from_millis(200);

const ERASE_LINE: &str = "\r\x1b[2K";

pub type SharedWriter = Arc<Mutex<dyn Write + Send>>;

pub struct Loader {
    frames: Arc<Vec<String>>,
    current_frame: Arc<AtomicUsize>,
    stop_flag: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
    writer: Option<SharedWriter>,
}

impl Loader {
    /// Builds a loader whose frames are pre-styled with `spinner_fn`.
    pub fn new(message: Option<&str>, spinner_fn: &MarkdownStyleFn) -> Self {
        let frames = SPINNER_FRAMES
            .iter()
            .map(|frame| match message {
                Some(message) => format!("{} {message}", spinner_fn(frame)),
                None => spinner_fn(frame),
            })
            .collect();
        Self {
            frames: Arc::new(frames),
            current_frame: Arc::new(AtomicUsize::new(0)),
            stop_flag: Arc::new(AtomicBool::new(false)),
            thread: None,
            writer: None,
        }
    }

    /// Starts animating on `writer`. Calling `start` twice is a no-op.
    pub fn start(&mut self, writer: SharedWriter) {
        if self.thread.is_some() {
            return;
        }

        self.stop_flag.store(false, Ordering::SeqCst);
        self.current_frame.store(0, Ordering::SeqCst);
        self.writer = Some(Arc::clone(&writer));

        let stop_flag = Arc::clone(&self.stop_flag);
        let current_frame = Arc::clone(&self.current_frame);
        let frames = Arc::clone(&self.frames);

        self.thread = Some(thread::spawn(move || {
            while !stop_flag.load(Ordering::SeqCst) {
                let idx = current_frame.load(Ordering::SeqCst) % frames.len();
                if let Ok(mut out) = writer.lock() {
                    let _ = write!(out, "\r{}", frames[idx]);
                    let _ = out.flush();
                }
                thread::sleep(SPINNER_INTERVAL);
                current_frame.fetch_add(1, Ordering::SeqCst);
            }
        }));
    }

    /// Stops the animation and erases the spinner line.
    pub fn stop(&mut self) {
        self.stop_flag.store(true, Ordering::SeqCst);
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
        if let Some(writer) = self.writer.take() {
            if let Ok(mut out) = writer.lock() {
                let _ = write!(out, "{ERASE_LINE}");
                let _ = out.flush();
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.thread.is_some()
    }

    pub fn ticks(&self) -> usize {
        self.current_frame.load(Ordering::SeqCst)
    }
}

impl Drop for Loader {
    fn drop(&mut self) {
        self.stop();
    }
}

impl Component for Loader {
    fn render(&mut self, _width: usize) -> Vec<String> {
        let idx = self.ticks() % self.frames.len();
        vec![self.frames[idx].clone()]
    }
}
