use crate::format::FileKind;
use std::fmt;
use std::path::PathBuf;
use uuid::Uuid;

/// A file picked or dropped by the user, described by metadata captured at intake.
#[derive(Debug, Clone, PartialEq)]
pub struct FileSource {
    pub path: PathBuf,
    pub name: String,
    pub mime_type: String,
    pub byte_size: u64,
    pub last_modified_ms: i64,
}

/// Revocable key under which a record's rendered preview is cached.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PreviewHandle(String);

impl PreviewHandle {
    pub fn new(seq: u64) -> Self {
        Self(format!("preview://{seq}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PreviewHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub struct FileRecord {
    pub id: String,
    pub source: FileSource,
    pub preview: PreviewHandle,
    pub name: String,
    pub mime_type: String,
    pub byte_size: u64,
    pub last_modified_ms: i64,
}

impl FileRecord {
    pub fn new(source: FileSource, preview: PreviewHandle, added_at_ms: i64) -> Self {
        let id = record_id(&source.name, added_at_ms, Uuid::new_v4());
        Self {
            id,
            name: source.name.clone(),
            mime_type: source.mime_type.clone(),
            byte_size: source.byte_size,
            last_modified_ms: source.last_modified_ms,
            source,
            preview,
        }
    }

    pub fn kind(&self) -> FileKind {
        FileKind::from_mime(&self.mime_type)
    }
}

fn record_id(name: &str, added_at_ms: i64, nonce: Uuid) -> String {
    format!("{name}-{added_at_ms}-{}", nonce.simple())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(name: &str, mime: &str) -> FileSource {
        FileSource {
            path: PathBuf::from(name),
            name: name.to_string(),
            mime_type: mime.to_string(),
            byte_size: 42,
            last_modified_ms: 1_000,
        }
    }

    #[test]
    fn test_record_copies_metadata() {
        let record = FileRecord::new(source("a.png", "image/png"), PreviewHandle::new(7), 5);
        assert_eq!(record.name, "a.png");
        assert_eq!(record.mime_type, "image/png");
        assert_eq!(record.byte_size, 42);
        assert_eq!(record.last_modified_ms, 1_000);
        assert_eq!(record.preview.as_str(), "preview://7");
        assert_eq!(record.kind(), FileKind::Image);
        assert!(record.id.starts_with("a.png-5-"));
    }

    #[test]
    fn test_same_name_same_instant_gets_distinct_ids() {
        let a = FileRecord::new(source("a.png", "image/png"), PreviewHandle::new(1), 5);
        let b = FileRecord::new(source("a.png", "image/png"), PreviewHandle::new(2), 5);
        assert_ne!(a.id, b.id);
    }
}
