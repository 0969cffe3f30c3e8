// Input acquisition: typed text, browsed files and dropped files all end
// up as a [`PendingInput`] or a [`ValidationError`].

use crate::api::{ApiOutcome, CleaningService};
use crate::error::ValidationError;
use crate::view::{Element, Treatment, View};
use std::fmt;
use std::io;
use std::path::Path;

/// A file picked by the user: its name and raw contents.
#[derive(Clone, PartialEq, Eq)]
pub struct FileInput {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl FileInput {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        FileInput {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// Read a local file. Only the final path component is kept as the name.
    pub fn from_path(path: &Path) -> io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("upload.txt")
            .to_string();
        Ok(FileInput { name, bytes })
    }
}

// Payloads can be large; keep them out of logs.
impl fmt::Debug for FileInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileInput")
            .field("name", &self.name)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Validated input about to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingInput {
    Text(String),
    File(FileInput),
}

impl PendingInput {
    /// Name of the originating file, `None` for typed text.
    pub fn filename(&self) -> Option<&str> {
        match self {
            PendingInput::Text(_) => None,
            PendingInput::File(file) => Some(&file.name),
        }
    }

    /// Issue the one request this input maps to.
    pub fn send(&self, service: &dyn CleaningService) -> ApiOutcome {
        match self {
            PendingInput::Text(text) => service.clean_text(text),
            PendingInput::File(file) => service.clean_file(file),
        }
    }
}

/// Trimmed contents of the text box, or `NoText` if nothing is left.
pub fn acquire_text(view: &dyn View) -> Result<PendingInput, ValidationError> {
    let raw = view.text(Element::TextInput);
    let text = raw.trim();
    if text.is_empty() {
        return Err(ValidationError::NoText);
    }
    Ok(PendingInput::Text(text.to_string()))
}

/// First file held by the chooser, or `NoFile`.
pub fn acquire_selected_file(view: &dyn View) -> Result<PendingInput, ValidationError> {
    first_file(view.selected_files()).ok_or(ValidationError::NoFile)
}

/// First of a batch of dropped or chosen files.
pub fn first_file(files: Vec<FileInput>) -> Option<PendingInput> {
    files.into_iter().next().map(PendingInput::File)
}

/// Highlight the drop zone while something is dragged over it.
pub fn drag_over(view: &mut dyn View) {
    view.set_treatment(Element::DropZone, Treatment::DropTarget, true);
}

/// Remove the drop highlight on drop or when the drag leaves.
pub fn drag_end(view: &mut dyn View) {
    view.set_treatment(Element::DropZone, Treatment::DropTarget, false);
}
