//! Turns picked or dropped paths into `FileSource`s: metadata capture, MIME
//! detection, the accept filter, and the per-batch file cap.

use crate::error::{GalleryError, Result};
use crate::file_record::FileSource;
use image::ImageFormat;
use std::fs;
use std::path::{Path, PathBuf};

const FALLBACK_MIME_TYPES: &[(&str, &str)] = &[
    ("mp4", "video/mp4"),
    ("m4v", "video/mp4"),
    ("mov", "video/quicktime"),
    ("webm", "video/webm"),
    ("mkv", "video/x-matroska"),
    ("avi", "video/x-msvideo"),
    ("svg", "image/svg+xml"),
    ("mp3", "audio/mpeg"),
    ("wav", "audio/wav"),
    ("ogg", "audio/ogg"),
    ("flac", "audio/flac"),
    ("pdf", "application/pdf"),
    ("txt", "text/plain"),
    ("md", "text/markdown"),
    ("csv", "text/csv"),
    ("html", "text/html"),
    ("json", "application/json"),
    ("zip", "application/zip"),
];

/// Guesses a MIME type from the file extension. Unknown extensions yield `""`.
pub fn mime_from_path(path: &Path) -> String {
    if let Ok(format) = ImageFormat::from_path(path) {
        return format.to_mime_type().to_string();
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    FALLBACK_MIME_TYPES
        .iter()
        .find(|(known, _)| *known == ext)
        .map(|(_, mime)| mime.to_string())
        .unwrap_or_default()
}

/// Reads the metadata of a file on disk.
pub fn source_from_path(path: &Path) -> Result<FileSource> {
    let metadata = fs::metadata(path).map_err(|err| GalleryError::io(path, err))?;
    if !metadata.is_file() {
        return Err(GalleryError::io(
            path,
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "not a regular file"),
        ));
    }

    let last_modified_ms = metadata
        .modified()
        .map(|time| chrono::DateTime::<chrono::Utc>::from(time).timestamp_millis())
        .unwrap_or(0);

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    Ok(FileSource {
        path: path.to_path_buf(),
        name,
        mime_type: mime_from_path(path),
        byte_size: metadata.len(),
        last_modified_ms,
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum AcceptRule {
    Any,
    MimePrefix(String),
    Mime(String),
    Extension(String),
}

/// An `accept`-style filter such as `"image/*,video/mp4,.pdf"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptFilter {
    rules: Vec<AcceptRule>,
}

impl AcceptFilter {
    pub fn parse(accept: &str) -> Self {
        let rules: Vec<AcceptRule> = accept
            .split(',')
            .map(|token| token.trim().to_ascii_lowercase())
            .filter(|token| !token.is_empty())
            .map(|token| {
                if token == "*" || token == "*/*" {
                    AcceptRule::Any
                } else if let Some(ext) = token.strip_prefix('.') {
                    AcceptRule::Extension(ext.to_string())
                } else if let Some(prefix) = token.strip_suffix("/*") {
                    AcceptRule::MimePrefix(format!("{prefix}/"))
                } else {
                    AcceptRule::Mime(token)
                }
            })
            .collect();

        if rules.is_empty() {
            Self {
                rules: vec![AcceptRule::Any],
            }
        } else {
            Self { rules }
        }
    }

    pub fn accepts_all(&self) -> bool {
        self.rules.contains(&AcceptRule::Any)
    }

    pub fn accepts(&self, source: &FileSource) -> bool {
        let mime = source.mime_type.to_ascii_lowercase();
        let ext = source
            .path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        self.rules.iter().any(|rule| match rule {
            AcceptRule::Any => true,
            AcceptRule::MimePrefix(prefix) => mime.starts_with(prefix.as_str()),
            AcceptRule::Mime(exact) => mime == *exact,
            AcceptRule::Extension(wanted) => ext.as_deref() == Some(wanted.as_str()),
        })
    }
}

/// Resolves paths into sources, dropping unreadable or filtered files, and keeps at
/// most `max_files` of them in their original order.
pub fn collect_sources(paths: Vec<PathBuf>, filter: &AcceptFilter, max_files: usize) -> Vec<FileSource> {
    let total = paths.len();
    let sources: Vec<FileSource> = paths
        .into_iter()
        .filter_map(|path| match source_from_path(&path) {
            Ok(source) => Some(source),
            Err(err) => {
                log::error!("{err}");
                None
            }
        })
        .filter(|source| {
            let accepted = filter.accepts(source);
            if !accepted {
                log::info!("skipping {} ({:?} not accepted)", source.name, source.mime_type);
            }
            accepted
        })
        .take(max_files)
        .collect();

    if sources.len() < total {
        log::warn!("accepted {} of {total} file(s)", sources.len());
    }
    sources
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(name: &str) -> FileSource {
        let path = PathBuf::from(name);
        FileSource {
            mime_type: mime_from_path(&path),
            path,
            name: name.to_string(),
            byte_size: 1,
            last_modified_ms: 0,
        }
    }

    #[test]
    fn test_mime_from_path() {
        assert_eq!(mime_from_path(Path::new("a.PNG")), "image/png");
        assert_eq!(mime_from_path(Path::new("clip.mp4")), "video/mp4");
        assert_eq!(mime_from_path(Path::new("doc.pdf")), "application/pdf");
        assert_eq!(mime_from_path(Path::new("notes.txt")), "text/plain");
        assert_eq!(mime_from_path(Path::new("archive.xyz")), "");
        assert_eq!(mime_from_path(Path::new("no_extension")), "");
    }

    #[test]
    fn test_default_filter_accepts_everything() {
        let filter = AcceptFilter::parse("*/*");
        assert!(filter.accepts_all());
        assert!(filter.accepts(&source("archive.xyz")));
        assert!(AcceptFilter::parse("").accepts_all());
    }

    #[test]
    fn test_filter_rules() {
        let filter = AcceptFilter::parse("image/*, video/mp4 ,.PDF");
        assert!(!filter.accepts_all());
        assert!(filter.accepts(&source("a.jpg")));
        assert!(filter.accepts(&source("b.mp4")));
        assert!(filter.accepts(&source("c.pdf")));
        assert!(!filter.accepts(&source("d.webm")));
        assert!(!filter.accepts(&source("e.txt")));
    }

    #[test]
    fn test_collect_sources_truncates_in_order() {
        let dir = std::env::temp_dir().join(format!("temp_gallery_intake_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let paths: Vec<PathBuf> = ["1.txt", "2.png", "3.txt", "4.txt"]
            .iter()
            .map(|name| {
                let path = dir.join(name);
                fs::write(&path, b"data").unwrap();
                path
            })
            .collect();

        let mut with_missing = paths.clone();
        with_missing.insert(1, dir.join("missing.txt"));

        let sources = collect_sources(with_missing, &AcceptFilter::parse("text/*"), 2);
        let names: Vec<&str> = sources.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["1.txt", "3.txt"]);
        assert_eq!(sources[0].byte_size, 4);
        assert_eq!(sources[0].mime_type, "text/plain");

        fs::remove_dir_all(&dir).unwrap();
    }
}
