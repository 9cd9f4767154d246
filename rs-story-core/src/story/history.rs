/// Separator line drawn under each story in the rendered history.
const SEPARATOR_WIDTH: usize = 40;

/// Stories written during the current run, oldest first.
///
/// Append-only; nothing is persisted, the history is gone on restart.
#[derive(Clone, Debug, Default)]
pub struct SessionHistory {
	stories: Vec<String>,
}

impl SessionHistory {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn push(&mut self, story: String) {
		self.stories.push(story);
	}

	pub fn entries(&self) -> &[String] {
		&self.stories
	}

	pub fn len(&self) -> usize {
		self.stories.len()
	}

	pub fn is_empty(&self) -> bool {
		self.stories.is_empty()
	}

	/// Text shown in the history pane: every story followed by a dashed line.
	pub fn render(&self) -> String {
		let separator = "-".repeat(SEPARATOR_WIDTH);
		self.stories
			.iter()
			.map(|story| format!("{story}\n{separator}\n"))
			.collect()
	}
}
