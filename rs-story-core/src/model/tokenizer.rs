/// Punctuation split off into its own token.
///
/// Quotes and apostrophes stay inside words (`don't`, `"Hello`).
const PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?'];

/// Returns `true` if the token is a single punctuation mark.
pub(crate) fn is_punctuation(token: &str) -> bool {
	let mut chars = token.chars();
	matches!((chars.next(), chars.next()), (Some(c), None) if PUNCTUATION.contains(&c))
}

/// Splits text into word and punctuation tokens.
///
/// Whitespace only separates tokens, it is never kept.
pub fn tokenize(text: &str) -> Vec<String> {
	let mut tokens = Vec::new();
	for word in text.split_whitespace() {
		let mut remaining = word;
		while let Some(first) = remaining.chars().next() {
			if PUNCTUATION.contains(&first) {
				tokens.push(first.to_string());
				remaining = &remaining[first.len_utf8()..];
				continue;
			}

			match remaining.find(|c: char| PUNCTUATION.contains(&c)) {
				Some(pos) => {
					tokens.push(remaining[..pos].to_owned());
					remaining = &remaining[pos..];
				}
				None => {
					tokens.push(remaining.to_owned());
					break;
				}
			}
		}
	}
	tokens
}

/// Joins tokens back into text, attaching punctuation to the previous word.
pub fn detokenize<S: AsRef<str>>(tokens: &[S]) -> String {
	let mut text = String::new();
	append_tokens(&mut text, tokens);
	text
}

/// Appends tokens to existing text without touching what is already there.
///
/// Words get a separating space unless `text` is empty or already ends in
/// whitespace; punctuation is glued to whatever precedes it.
pub fn append_tokens<S: AsRef<str>>(text: &mut String, tokens: &[S]) {
	for token in tokens {
		let token = token.as_ref();
		let needs_space = !is_punctuation(token) && text.chars().next_back().is_some_and(|c| !c.is_whitespace());
		if needs_space {
			text.push(' ');
		}
		text.push_str(token);
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn splits_punctuation() {
		assert_eq!(tokenize("Hello, world."), vec!["Hello", ",", "world", "."]);
		assert_eq!(tokenize("Wait...what?!"), vec!["Wait", ".", ".", ".", "what", "?", "!"]);
	}

	#[test]
	fn keeps_apostrophes_and_quotes() {
		assert_eq!(tokenize("\"Don't\" go"), vec!["\"Don't\"", "go"]);
	}

	#[test]
	fn ignores_extra_whitespace() {
		assert_eq!(tokenize("  a \n\t b  "), vec!["a", "b"]);
		assert!(tokenize("   ").is_empty());
	}

	#[test]
	fn detokenize_attaches_punctuation() {
		let tokens = tokenize("The fox ran , then   stopped .");
		assert_eq!(detokenize(&tokens), "The fox ran, then stopped.");
	}

	#[test]
	fn append_keeps_the_existing_text() {
		let mut text = "Pi is 3.14, he said.\n\n".to_owned();
		append_tokens(&mut text, &["It", "was", "late", "."]);
		assert_eq!(text, "Pi is 3.14, he said.\n\nIt was late.");

		let mut text = "e.g. here".to_owned();
		append_tokens(&mut text, &[",", "then"]);
		assert_eq!(text, "e.g. here, then");
	}
}
