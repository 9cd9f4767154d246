use rand::Rng;
use rand::seq::IndexedRandom;

use super::data::StoryData;

/// One random pick from each story data list.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StoryElements {
	pub setting: String,
	pub character: String,
	pub plot_twist: String,
}

impl StoryData {
	/// Picks one setting, one character and one plot twist uniformly at random.
	///
	/// An empty list yields an empty string for its element.
	pub fn sample_elements<R: Rng>(&self, rng: &mut R) -> StoryElements {
		StoryElements {
			setting: pick(&self.settings, rng),
			character: pick(&self.characters, rng),
			plot_twist: pick(&self.plot_twists, rng),
		}
	}
}

fn pick<R: Rng>(items: &[String], rng: &mut R) -> String {
	items.choose(rng).cloned().unwrap_or_default()
}
