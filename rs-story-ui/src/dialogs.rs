use std::path::PathBuf;

use rfd::{FileDialog, MessageButtons, MessageDialog, MessageLevel};

/// Blocking modal message box with a single OK button.
fn show(level: MessageLevel, title: &str, description: &str) {
    let _ = MessageDialog::new()
        .set_level(level)
        .set_title(title)
        .set_description(description)
        .set_buttons(MessageButtons::Ok)
        .show();
}

pub fn info(title: &str, description: &str) {
    show(MessageLevel::Info, title, description);
}

pub fn warning(title: &str, description: &str) {
    show(MessageLevel::Warning, title, description);
}

pub fn error(title: &str, description: &str) {
    show(MessageLevel::Error, title, description);
}

/// Asks for a story data file to open.
pub fn pick_story_data() -> Option<PathBuf> {
    FileDialog::new()
        .set_directory(".")
        .add_filter("JSON files", &["json"])
        .add_filter("All files", &["*"])
        .pick_file()
}

/// Asks where to save the story; a name without extension gets `.txt`.
pub fn pick_story_output() -> Option<PathBuf> {
    let mut path = FileDialog::new()
        .set_directory(".")
        .set_file_name("story.txt")
        .add_filter("Text files", &["txt"])
        .add_filter("All files", &["*"])
        .save_file()?;
    if path.extension().is_none() {
        path.set_extension("txt");
    }
    Some(path)
}
