//! Binary/text detection and content types.

use std::path::Path;

/// Bytes inspected when guessing whether content is binary.
const SAMPLE_LEN: usize = 1024;

const BINARY_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "webp", "bmp", "ico", "tif", "tiff", "avif",
    "pdf", "zip", "gz", "tgz", "bz2", "xz", "7z", "rar", "tar", "jar",
    "woff", "woff2", "ttf", "otf", "eot",
    "mp3", "mp4", "m4a", "ogg", "wav", "flac", "webm", "mov", "avi", "mkv",
    "exe", "dll", "so", "dylib", "o", "a", "class", "wasm", "bin", "dat",
    "sqlite", "db", "psd",
];

const TEXT_EXTENSIONS: &[&str] = &[
    "txt", "md", "markdown", "html", "htm", "css", "js", "mjs", "cjs", "ts", "tsx", "jsx",
    "json", "xml", "svg", "csv", "tsv", "yaml", "yml", "toml", "ini", "cfg", "conf", "log",
    "rs", "py", "rb", "go", "c", "h", "cpp", "hpp", "java", "kt", "swift", "sh", "bash",
    "zsh", "sql", "lock", "env",
];

/// The extension of a file name, without the dot.
///
/// Dotfiles such as `.env` have no extension here, matching how the listing
/// labels them.
pub fn extension_of(name: &str) -> Option<&str> {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => Some(ext),
        _ => None,
    }
}

/// Whether `contents` should be treated as binary.
///
/// Known binary extensions always are. Otherwise the first kilobyte is
/// sampled: a NUL byte or an invalid UTF-8 sequence marks it binary. A
/// sequence cut off by the sample boundary does not count.
pub fn is_binary(name: &str, contents: &[u8]) -> bool {
    let ext = extension_of(name).map(str::to_ascii_lowercase);
    if let Some(ext) = ext.as_deref() {
        if BINARY_EXTENSIONS.contains(&ext) {
            return true;
        }
    }

    let sample = &contents[..contents.len().min(SAMPLE_LEN)];
    if sample.contains(&0) {
        return true;
    }
    if ext.as_deref().is_some_and(|ext| TEXT_EXTENSIONS.contains(&ext)) {
        return false;
    }

    match std::str::from_utf8(sample) {
        Ok(_) => false,
        Err(e) => e.error_len().is_some(),
    }
}

/// Content type for an extension, falling back to plain text.
pub fn content_type(extension: &str) -> String {
    match mime_guess::from_ext(extension).first() {
        Some(mime) if needs_charset(mime.essence_str()) => {
            format!("{}; charset=utf-8", mime.essence_str())
        }
        Some(mime) => mime.essence_str().to_string(),
        None => "text/plain; charset=utf-8".to_string(),
    }
}

/// Content type for a file, using its bytes when the extension is unknown.
pub fn content_type_for(path: &Path, contents: &[u8]) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_default();

    match extension_of(&name) {
        Some(ext) if mime_guess::from_ext(ext).first().is_some() => content_type(ext),
        _ if is_binary(&name, contents) => "application/octet-stream".to_string(),
        _ => "text/plain; charset=utf-8".to_string(),
    }
}

fn needs_charset(essence: &str) -> bool {
    essence.starts_with("text/")
        || matches!(
            essence,
            "application/javascript" | "application/json" | "application/xml" | "image/svg+xml"
        )
}
