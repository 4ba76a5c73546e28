//! Loading source text from files.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};

/// Largest file accepted as editor input.
pub const MAX_FILE_BYTES: u64 = 1024 * 1024;

const TEXT_EXTENSIONS: &[&str] = &["txt", "text", "c", "h", "md"];

/// Read a plain-text file to hand to the editor or the one-shot run.
///
/// The path must be an existing regular file with a text extension (or none),
/// no larger than [`MAX_FILE_BYTES`], and valid UTF-8.
pub fn load_text_file(file_path: impl AsRef<Path>) -> Result<String> {
    let path = file_path.as_ref();

    if !path.exists() {
        bail!("File '{}' does not exist", path.display());
    }
    if !path.is_file() {
        bail!("'{}' is not a file", path.display());
    }

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_lowercase();
    if !extension.is_empty() && !TEXT_EXTENSIONS.contains(&extension.as_str()) {
        bail!(
            "Please load a plain text file (got .{}).\nCurrently supported: {}, and files without extension",
            extension,
            TEXT_EXTENSIONS.iter().map(|e| format!(".{e}")).collect::<Vec<_>>().join(", ")
        );
    }

    let len = fs::metadata(path)
        .with_context(|| format!("Failed to stat '{}'", path.display()))?
        .len();
    if len > MAX_FILE_BYTES {
        bail!("'{}' is too large ({} bytes, limit {})", path.display(), len, MAX_FILE_BYTES);
    }

    let bytes = fs::read(path).with_context(|| format!("Failed to read file '{}'", path.display()))?;
    String::from_utf8(bytes).with_context(|| format!("'{}' is not valid UTF-8 text", path.display()))
}
