// Result display, copy/download actions and their transient feedback.

use crate::api::CleaningResult;
use crate::clipboard::Clipboard;
use crate::download::{download_name, DownloadSink};
use crate::view::{Element, Treatment, View};
use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// How long "Copied!" and "Downloaded!" stay on their button.
pub const FEEDBACK_DELAY: Duration = Duration::from_secs(2);

pub const COPIED: &str = "Copied!";
pub const DOWNLOADED: &str = "Downloaded!";

/// The most recent shown result, kept for copy and download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LastResult {
    pub text: String,
    pub filename: Option<String>,
}

#[derive(Debug)]
struct PendingRevert {
    element: Element,
    label: String,
    due: Instant,
}

#[derive(Debug, Default)]
pub struct ResultPresenter {
    last: Option<LastResult>,
    reverts: Vec<PendingRevert>,
}

impl ResultPresenter {
    pub fn last_result(&self) -> Option<&LastResult> {
        self.last.as_ref()
    }

    pub fn show_result(
        &mut self,
        view: &mut dyn View,
        result: &CleaningResult,
        filename: Option<String>,
    ) {
        view.set_text(Element::ResultText, &result.cleaned_text);
        view.set_text(Element::ChangesCount, &result.changes_made.to_string());
        view.set_text(
            Element::SizeInfo,
            &format!("{} → {} chars", result.original_size, result.cleaned_size),
        );

        self.last = Some(LastResult {
            text: result.cleaned_text.clone(),
            filename,
        });

        view.set_visible(Element::Results, true);
        view.scroll_into_view(Element::Results);
    }

    pub fn hide(&self, view: &mut dyn View) {
        view.set_visible(Element::Results, false);
    }

    /// Copy the displayed text. If the clipboard refuses, select the text
    /// and fall back to the selection copy. Feedback is the same either way.
    pub fn copy(&mut self, view: &mut dyn View, clipboard: &mut dyn Clipboard, now: Instant) {
        let text = view.text(Element::ResultText);
        if let Err(e) = clipboard.write_text(&text) {
            warn!(error = %e, "clipboard write failed, using selection copy");
            view.select_text(Element::ResultText);
            if let Err(e) = clipboard.copy_selection(&text) {
                warn!(error = %e, "selection copy failed");
            }
        }
        self.feedback(view, Element::CopyButton, COPIED, now);
    }

    /// Save the last result. Does nothing (and returns `Ok(None)`) when no
    /// result has been shown yet.
    pub fn download(
        &mut self,
        view: &mut dyn View,
        sink: &mut dyn DownloadSink,
        now: Instant,
    ) -> io::Result<Option<PathBuf>> {
        let Some(last) = &self.last else {
            debug!("download requested with no result");
            return Ok(None);
        };
        let name = download_name(last.filename.as_deref());
        let path = sink.save(&name, &last.text)?;
        self.feedback(view, Element::DownloadButton, DOWNLOADED, now);
        Ok(Some(path))
    }

    /// Show `message` on a button until [`FEEDBACK_DELAY`] after `now`.
    /// Feedback repeated before the revert keeps the first deadline and still
    /// reverts to the label the button had before any feedback.
    pub fn feedback(&mut self, view: &mut dyn View, element: Element, message: &str, now: Instant) {
        if !self.reverts.iter().any(|r| r.element == element) {
            self.reverts.push(PendingRevert {
                element,
                label: view.text(element),
                due: now + FEEDBACK_DELAY,
            });
        }
        view.set_text(element, message);
        view.set_treatment(element, Treatment::Success, true);
    }

    /// Revert every feedback label that is due at `now`.
    pub fn tick(&mut self, view: &mut dyn View, now: Instant) {
        self.reverts.retain(|pending| {
            if pending.due > now {
                return true;
            }
            view.set_text(pending.element, &pending.label);
            view.set_treatment(pending.element, Treatment::Success, false);
            false
        });
    }

    pub fn has_pending_feedback(&self) -> bool {
        !self.reverts.is_empty()
    }
}
