use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Reads a corpus file and returns its non-blank lines.
///
/// Each line of a corpus is one paragraph; blank lines only separate them.
pub(crate) fn read_paragraphs<P: AsRef<Path>>(filename: P) -> io::Result<Vec<String>> {
	let contents = fs::read_to_string(filename)?;
	Ok(contents
		.lines()
		.map(str::trim)
		.filter(|line| !line.is_empty())
		.map(str::to_owned)
		.collect())
}

/// Builds the path of a sibling file with another extension.
///
/// Example:
/// `data/models/tales.txt` + `"bin"` → `data/models/tales.bin`
pub(crate) fn build_output_path<P: AsRef<Path>>(
	input_path: P,
	output_extension: &str,
) -> io::Result<PathBuf> {
	let input_path = input_path.as_ref();

	let parent = input_path.parent().unwrap_or_else(|| Path::new("."));
	let file_stem = input_path
		.file_stem()
		.ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "Input path has no filename"))?;

	let mut output = PathBuf::from(parent);
	output.push(file_stem);
	output.set_extension(output_extension);

	Ok(output)
}

/// Extracts the base filename without extension.
///
/// Examples:
/// - `"./data/models/tales.txt"` → `"tales"`
/// - `"tales.txt"` → `"tales"`
pub(crate) fn get_filename<P: AsRef<Path>>(input_path: P) -> io::Result<String> {
	let stem = input_path
		.as_ref()
		.file_stem()
		.ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "Path has no filename"))?;

	Ok(stem.to_string_lossy().to_string())
}

/// Normalize a folder path.
///
/// - `""`, `"."` or `"./"` resolves to the current working directory
/// - Other paths are returned as-is (not canonicalized)
pub(crate) fn normalize_folder<P: AsRef<Path>>(input: P) -> PathBuf {
	let input = input.as_ref();
	if input.as_os_str().is_empty() || input == Path::new(".") || input == Path::new("./") {
		std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
	} else {
		input.to_path_buf()
	}
}

/// Lists the files with a given extension directly inside `dir`.
///
/// Returns full paths, sorted so that loading order is stable.
pub fn list_files<P: AsRef<Path>>(dir: P, extension: &str) -> io::Result<Vec<PathBuf>> {
	let mut files = Vec::new();

	for entry in fs::read_dir(dir)? {
		let path = entry?.path();
		if path.is_file() && path.extension() == Some(std::ffi::OsStr::new(extension)) {
			files.push(path);
		}
	}

	files.sort();
	Ok(files)
}

/// Writes `text` to `path` verbatim, replacing any previous content.
pub fn write_text<P: AsRef<Path>>(path: P, text: &str) -> io::Result<()> {
	fs::write(path, text)
}

/// Reads a whole UTF-8 text file.
pub fn read_text<P: AsRef<Path>>(path: P) -> io::Result<String> {
	fs::read_to_string(path)
}
