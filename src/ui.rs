// UI layer: hosts the controller in the terminal with a `dialoguer` menu.
// Each menu choice becomes a `UiEvent`; after every event the in-memory
// view is printed. Requests run on a worker thread behind an `indicatif`
// spinner so feedback timers keep ticking while we wait.

use crate::api::ApiOutcome;
use crate::controller::{Controller, Key, KeyEvent, UiEvent};
use crate::input::FileInput;
use crate::mode::Mode;
use crate::orchestrator::Submission;
use crate::view::{Element, MemoryView, Treatment, View};
use anyhow::Result;
use crossterm::style::{Color, Stylize};
use dialoguer::{Input, Select};
use indicatif::{ProgressBar, ProgressStyle};
use std::fmt;
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

/// Extensions the service accepts for uploads.
pub const TEXT_EXTENSIONS: &[&str] = &[
    "txt", "md", "text", "log", "csv", "json", "xml", "html", "css", "js", "py", "php", "java",
    "cpp", "c", "h",
];

const PREVIEW_CHARS: usize = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuItem {
    PasteTextMode,
    UploadFileMode,
    EditText,
    Browse,
    DropPath,
    Clean,
    Copy,
    Download,
    DarkMode,
    Dismiss,
    Exit,
}

impl fmt::Display for MenuItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MenuItem::PasteTextMode => "Paste Text",
            MenuItem::UploadFileMode => "Upload File",
            MenuItem::EditText => "Edit text",
            MenuItem::Browse => "Browse for a file",
            MenuItem::DropPath => "Drop a file (path)",
            MenuItem::Clean => "Clean (Ctrl+Enter)",
            MenuItem::Copy => "Copy result",
            MenuItem::Download => "Download result",
            MenuItem::DarkMode => "Toggle dark mode",
            MenuItem::Dismiss => "Dismiss (Esc)",
            MenuItem::Exit => "Exit",
        };
        f.write_str(label)
    }
}

/// Menu entries for the current state: panel-specific entries follow the
/// active mode and result actions only appear while a result is shown.
fn menu_items(controller: &Controller<MemoryView>) -> Vec<MenuItem> {
    let mut items = vec![MenuItem::PasteTextMode, MenuItem::UploadFileMode];
    match controller.mode() {
        Mode::Text => items.push(MenuItem::EditText),
        Mode::File => items.extend([MenuItem::Browse, MenuItem::DropPath]),
    }
    items.push(MenuItem::Clean);
    if controller.result_shown() {
        items.extend([MenuItem::Copy, MenuItem::Download]);
    }
    items.extend([MenuItem::DarkMode, MenuItem::Dismiss, MenuItem::Exit]);
    items
}

/// Main interactive loop. Runs until the user chooses "Exit".
pub fn main_menu(mut controller: Controller<MemoryView>) -> Result<()> {
    loop {
        controller.tick(Instant::now());
        render(&controller);

        let items = menu_items(&controller);
        let selection = Select::new().items(&items).default(0).interact()?;
        let event = match items[selection] {
            MenuItem::PasteTextMode => UiEvent::ModeSelected(Mode::Text),
            MenuItem::UploadFileMode => UiEvent::ModeSelected(Mode::File),
            MenuItem::EditText => {
                edit_text(&mut controller)?;
                continue;
            }
            MenuItem::Browse => {
                browse(&mut controller)?;
                continue;
            }
            MenuItem::DropPath => {
                drop_path(&mut controller)?;
                continue;
            }
            MenuItem::Clean => UiEvent::Key(KeyEvent::ctrl(Key::Enter)),
            MenuItem::Copy => UiEvent::CopyClicked,
            MenuItem::Download => UiEvent::DownloadClicked,
            MenuItem::DarkMode => UiEvent::DarkModeToggled,
            MenuItem::Dismiss => UiEvent::Key(KeyEvent::plain(Key::Escape)),
            MenuItem::Exit => break,
        };
        deliver(&mut controller, event);
    }
    Ok(())
}

/// Dispatch an event and, if it started a request, wait for it.
fn deliver(controller: &mut Controller<MemoryView>, event: UiEvent) {
    let dispatch = controller.dispatch(event);
    if let Some(submission) = dispatch.submission {
        send_with_spinner(controller, submission);
    }
}

/// Send the request on a worker thread and hand the outcome back here.
fn send_with_spinner(controller: &mut Controller<MemoryView>, submission: Submission) {
    let Submission { ticket, input } = submission;
    let service = controller.service();

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(controller.view().text(Element::SubmitLabel));

    let worker = thread::spawn(move || input.send(service.as_ref()));
    while !worker.is_finished() {
        spinner.tick();
        controller.tick(Instant::now());
        thread::sleep(Duration::from_millis(80));
    }
    spinner.finish_and_clear();

    let outcome = worker
        .join()
        .unwrap_or_else(|_| ApiOutcome::Unreachable("worker thread panicked".into()));
    controller.finish_submission(ticket, outcome);
}

fn edit_text(controller: &mut Controller<MemoryView>) -> Result<()> {
    let current = controller.view().text(Element::TextInput);
    let text: String = Input::new()
        .with_prompt("Text to clean")
        .with_initial_text(current)
        .allow_empty(true)
        .interact_text()?;
    controller.view_mut().set_text(Element::TextInput, &text);
    Ok(())
}

/// Click the drop zone; if the view asks for the chooser, open it.
fn browse(controller: &mut Controller<MemoryView>) -> Result<()> {
    deliver(controller, UiEvent::DropZoneClicked);
    if !controller.view_mut().take_chooser_request() {
        return Ok(());
    }
    let Some(path) = pick_file()? else {
        return Ok(());
    };
    match FileInput::from_path(&path) {
        Ok(file) => {
            controller.view_mut().set_selected_files(vec![file.clone()]);
            deliver(controller, UiEvent::FilesChosen(vec![file]));
        }
        Err(e) => println!("{}", format!("Could not read {}: {}", path.display(), e).red()),
    }
    Ok(())
}

/// A terminal "drop": the path is pasted, the drop zone highlights while the
/// file is read, and the file is submitted as a drop.
fn drop_path(controller: &mut Controller<MemoryView>) -> Result<()> {
    let raw: String = Input::new()
        .with_prompt("Drop or paste a file path")
        .interact_text()?;
    // Terminals quote dropped paths that contain spaces.
    let path = PathBuf::from(raw.trim().trim_matches(|c: char| c == '\'' || c == '"'));

    deliver(controller, UiEvent::DragOver);
    match FileInput::from_path(&path) {
        Ok(file) => deliver(controller, UiEvent::Drop(vec![file])),
        Err(e) => {
            deliver(controller, UiEvent::DragLeave);
            println!("{}", format!("Could not read {}: {}", path.display(), e).red());
        }
    }
    Ok(())
}

#[cfg(feature = "file-dialog")]
fn pick_file() -> Result<Option<PathBuf>> {
    Ok(rfd::FileDialog::new()
        .add_filter("Text files", TEXT_EXTENSIONS)
        .pick_file())
}

#[cfg(not(feature = "file-dialog"))]
fn pick_file() -> Result<Option<PathBuf>> {
    use anyhow::Context;
    let raw: String = Input::new()
        .with_prompt("File path (empty to cancel)")
        .allow_empty(true)
        .interact_text()
        .context("Failed to read file path")?;
    let raw = raw.trim();
    Ok((!raw.is_empty()).then(|| PathBuf::from(raw)))
}

fn preview(text: &str) -> String {
    let first_line = text.lines().next().unwrap_or("");
    let mut out: String = first_line.chars().take(PREVIEW_CHARS).collect();
    if first_line.chars().count() > PREVIEW_CHARS || text.lines().nth(1).is_some() {
        out.push('…');
    }
    out
}

/// Print the view the way the page would look.
fn render(controller: &Controller<MemoryView>) {
    let view = controller.view();
    let accent = if controller.is_dark() {
        Color::Cyan
    } else {
        Color::Blue
    };

    println!();
    let tabs: Vec<String> = [Element::TextModeButton, Element::FileModeButton]
        .iter()
        .map(|&button| {
            let label = view.text(button);
            if view.has_treatment(button, Treatment::Active) {
                format!("[{}]", label).with(accent).bold().to_string()
            } else {
                format!(" {} ", label).dark_grey().to_string()
            }
        })
        .collect();
    println!("{}", tabs.join(" "));

    if view.is_visible(Element::TextModePanel) {
        let text = view.text(Element::TextInput);
        if text.trim().is_empty() {
            println!("  Text: {}", "(empty)".dark_grey());
        } else {
            println!("  Text: {}", preview(&text));
        }
    }
    if view.is_visible(Element::FileModePanel) {
        match view.selected_files().first() {
            Some(file) => println!("  File: {} ({} bytes)", file.name, file.bytes.len()),
            None => println!("  {}", "Click to upload or drag and drop".dark_grey()),
        }
    }

    if view.is_visible(Element::ErrorAlert) {
        println!("{}", format!("✗ {}", view.text(Element::ErrorMessage)).red());
    }

    if view.is_visible(Element::Results) {
        println!("{}", "Cleaned Text".with(accent).bold());
        println!(
            "  Changes made: {}   Size: {}",
            view.text(Element::ChangesCount).with(accent),
            view.text(Element::SizeInfo)
        );
        for line in view.text(Element::ResultText).lines() {
            println!("  │ {}", line);
        }
        for button in [Element::CopyButton, Element::DownloadButton] {
            if view.has_treatment(button, Treatment::Success) {
                println!("  {}", view.text(button).green());
            }
        }
    }
}
