// Input mode: typed text or file upload.

use crate::view::{Element, Treatment, View};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Text,
    File,
}

impl Mode {
    fn panel(self) -> Element {
        match self {
            Mode::Text => Element::TextModePanel,
            Mode::File => Element::FileModePanel,
        }
    }

    fn button(self) -> Element {
        match self {
            Mode::Text => Element::TextModeButton,
            Mode::File => Element::FileModeButton,
        }
    }

    fn other(self) -> Mode {
        match self {
            Mode::Text => Mode::File,
            Mode::File => Mode::Text,
        }
    }
}

/// Owns the active [`Mode`].
///
/// `generation` increments whenever the mode actually changes so an
/// in-flight request can tell whether the user moved on while it was running.
#[derive(Debug, Default)]
pub struct ModeController {
    mode: Mode,
    generation: u64,
}

impl ModeController {
    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Apply the mode to the view: one panel shown, one button active,
    /// results hidden. Entered text and chosen files are left alone.
    pub fn switch(&mut self, view: &mut dyn View, mode: Mode) {
        debug!(from = ?self.mode, to = ?mode, "switching mode");
        if self.mode != mode {
            self.mode = mode;
            self.generation += 1;
        }
        self.render(view);
        view.set_visible(Element::Results, false);
    }

    /// Reflect the current mode without counting as a switch.
    pub fn render(&self, view: &mut dyn View) {
        let active = self.mode;
        let inactive = active.other();
        view.set_visible(active.panel(), true);
        view.set_visible(inactive.panel(), false);
        view.set_treatment(active.button(), Treatment::Active, true);
        view.set_treatment(inactive.button(), Treatment::Active, false);
    }
}
