// SPDX-License-Identifier: GPL-3.0-or-later
use std::fmt;
use std::io::{self, Read};
use std::sync::mpsc;
use std::thread;

use anyhow::anyhow;
use image::RgbImage;
use minifb::{InputCallback, Window, WindowOptions};
use serde::Deserialize;
use tracing::{debug, info, trace, warn};

/// Somewhere to show finished frames, that can also report key presses.
pub(crate) trait Display: fmt::Debug {
    /// Present `image`, then return the next pending key press, if there is one.
    ///
    /// This must not block waiting for a key.
    fn show(&mut self, image: &RgbImage) -> anyhow::Result<Option<char>>;

    /// `false` once the user has closed the display.
    fn is_open(&self) -> bool {
        true
    }
}

/// Which [`Display`] the viewer uses.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub(crate) enum DisplayKind {
    /// A desktop window, taking key presses typed into it.
    Window,
    /// No window, with key presses read from stdin.
    Headless,
}

impl Default for DisplayKind {
    fn default() -> Self {
        Self::Window
    }
}

/// Display settings.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub(crate) struct DisplaySettings {
    #[serde(default)]
    pub(crate) kind: DisplayKind,

    #[serde(default = "DisplaySettings::default_title")]
    pub(crate) title: String,
}

impl DisplaySettings {
    fn default_title() -> String {
        "Thermal Camera".to_string()
    }

    pub(crate) fn create_display(&self) -> anyhow::Result<Box<dyn Display>> {
        Ok(match self.kind {
            DisplayKind::Window => Box::new(WindowDisplay::new(&self.title)),
            DisplayKind::Headless => Box::new(HeadlessDisplay::from_stdin()?),
        })
    }
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            kind: DisplayKind::default(),
            title: Self::default_title(),
        }
    }
}

/// Key presses arriving from another thread or a callback.
#[derive(Debug)]
struct KeyQueue {
    keys: mpsc::Receiver<char>,
    disconnected: bool,
}

impl KeyQueue {
    fn new(keys: mpsc::Receiver<char>) -> Self {
        Self {
            keys,
            disconnected: false,
        }
    }

    /// The next non-whitespace key, without blocking.
    fn next_key(&mut self) -> Option<char> {
        if self.disconnected {
            return None;
        }
        loop {
            match self.keys.try_recv() {
                Ok(key) if key.is_whitespace() || key.is_control() => continue,
                Ok(key) => return Some(key),
                Err(mpsc::TryRecvError::Empty) => return None,
                Err(mpsc::TryRecvError::Disconnected) => {
                    debug!("key input closed");
                    self.disconnected = true;
                    return None;
                }
            }
        }
    }
}

/// Forwards the characters typed into a window.
struct KeyForwarder(mpsc::Sender<char>);

impl InputCallback for KeyForwarder {
    fn add_char(&mut self, uni_char: u32) {
        match std::char::from_u32(uni_char) {
            // A closed receiver means the display is gone, nothing left to tell.
            Some(key) => drop(self.0.send(key)),
            None => trace!(uni_char, "ignoring invalid character"),
        }
    }
}

/// Pack an RGB image into the `0RGB` pixels a window buffer holds.
fn fill_framebuffer(image: &RgbImage, buffer: &mut Vec<u32>) {
    buffer.clear();
    buffer.extend(image.pixels().map(|pixel| {
        let [r, g, b] = pixel.0;
        (r as u32) << 16 | (g as u32) << 8 | (b as u32)
    }));
}

/// A desktop window sized to the displayed image.
///
/// The window is created on the first frame, and recreated whenever the image size changes.
pub(crate) struct WindowDisplay {
    title: String,
    window: Option<Window>,
    size: (usize, usize),
    buffer: Vec<u32>,
    sender: mpsc::Sender<char>,
    keys: KeyQueue,
    closed: bool,
}

impl WindowDisplay {
    pub(crate) fn new(title: &str) -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            title: title.to_string(),
            window: None,
            size: (0, 0),
            buffer: Vec::new(),
            sender,
            keys: KeyQueue::new(receiver),
            closed: false,
        }
    }

    fn window_for(&mut self, size: (usize, usize)) -> anyhow::Result<&mut Window> {
        if self.window.is_none() || self.size != size {
            // Drop the old window first so only one is ever on screen.
            self.window = None;
            let mut window = Window::new(&self.title, size.0, size.1, WindowOptions::default())
                .map_err(|err| anyhow!("Unable to open a {}x{} window: {}", size.0, size.1, err))?;
            window.set_input_callback(Box::new(KeyForwarder(self.sender.clone())));
            info!(width = size.0, height = size.1, "opened window");
            self.size = size;
            self.window = Some(window);
        }
        self.window
            .as_mut()
            .ok_or_else(|| anyhow!("No window to draw in"))
    }
}

impl Display for WindowDisplay {
    fn show(&mut self, image: &RgbImage) -> anyhow::Result<Option<char>> {
        let size = (image.width() as usize, image.height() as usize);
        let mut buffer = std::mem::take(&mut self.buffer);
        fill_framebuffer(image, &mut buffer);
        let window = self.window_for(size)?;
        let updated = window
            .update_with_buffer(&buffer, size.0, size.1)
            .map_err(|err| anyhow!("Unable to update window: {}", err));
        let open = window.is_open();
        self.buffer = buffer;
        updated?;
        if !open && !self.closed {
            debug!("window closed");
            self.closed = true;
        }
        Ok(self.keys.next_key())
    }

    fn is_open(&self) -> bool {
        !self.closed
    }
}

impl fmt::Debug for WindowDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WindowDisplay")
            .field("title", &self.title)
            .field("size", &self.size)
            .field("closed", &self.closed)
            .finish()
    }
}

/// A display with no window. Frames are accepted and dropped, and keys are read from stdin, one
/// character per key press.
#[derive(Debug)]
pub(crate) struct HeadlessDisplay {
    keys: KeyQueue,
    shown: u64,
    last_size: Option<(u32, u32)>,
}

impl HeadlessDisplay {
    /// Spawn a thread reading keys from stdin.
    pub(crate) fn from_stdin() -> anyhow::Result<Self> {
        let (sender, receiver) = mpsc::channel();
        thread::Builder::new()
            .name("stdin-keys".to_string())
            .spawn(move || read_keys(io::stdin(), sender))?;
        Ok(Self::new(receiver))
    }

    pub(crate) fn new(keys: mpsc::Receiver<char>) -> Self {
        Self {
            keys: KeyQueue::new(keys),
            shown: 0,
            last_size: None,
        }
    }
}

impl Display for HeadlessDisplay {
    fn show(&mut self, image: &RgbImage) -> anyhow::Result<Option<char>> {
        let size = image.dimensions();
        if self.last_size != Some(size) {
            debug!(width = size.0, height = size.1, "display size changed");
            self.last_size = Some(size);
        }
        self.shown += 1;
        trace!(frame = self.shown, "showing frame");
        Ok(self.keys.next_key())
    }
}

fn read_keys<R: Read>(input: R, sender: mpsc::Sender<char>) {
    let mut buffer = String::new();
    let mut input = io::BufReader::new(input);
    loop {
        buffer.clear();
        match io::BufRead::read_line(&mut input, &mut buffer) {
            Ok(0) => return,
            Ok(_) => {
                for key in buffer.chars() {
                    if sender.send(key).is_err() {
                        return;
                    }
                }
            }
            Err(err) => {
                warn!(error = %err, "unable to read keys");
                return;
            }
        }
    }
}
