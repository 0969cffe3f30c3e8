// Clipboard access with a selection-based fallback.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::io::Write;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClipboardError {
    #[error("clipboard error: {0}")]
    Clip(String),
}

pub trait Clipboard {
    /// Primary path: write straight to the system clipboard.
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError>;

    /// Legacy path: copy whatever the view currently has selected.
    fn copy_selection(&mut self, selected: &str) -> Result<(), ClipboardError>;
}

/// System clipboard through `copypasta`. The fallback emits an OSC 52
/// escape sequence, which most terminal emulators turn into a clipboard
/// write even over SSH.
#[derive(Default)]
pub struct SystemClipboard;

impl Clipboard for SystemClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        use copypasta::{ClipboardContext, ClipboardProvider};
        let mut ctx = ClipboardContext::new().map_err(|e| ClipboardError::Clip(e.to_string()))?;
        ctx.set_contents(text.to_string())
            .map_err(|e| ClipboardError::Clip(e.to_string()))
    }

    fn copy_selection(&mut self, selected: &str) -> Result<(), ClipboardError> {
        let mut out = std::io::stdout().lock();
        out.write_all(osc52_sequence(selected).as_bytes())
            .and_then(|_| out.flush())
            .map_err(|e| ClipboardError::Clip(e.to_string()))
    }
}

/// `ESC ] 52 ; c ; <base64> BEL`
pub fn osc52_sequence(text: &str) -> String {
    format!("\x1b]52;c;{}\x07", STANDARD.encode(text))
}
