use std::{
    fmt,
    path::{Path, PathBuf},
    sync::Arc,
};

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use uuid::Uuid;

/// Where the bytes of a selected file can be read from.
#[derive(Clone, PartialEq, Eq)]
pub enum MediaSource {
    Path(PathBuf),
    Bytes(Arc<Vec<u8>>),
}

impl MediaSource {
    pub fn path(&self) -> Option<&Path> {
        match self {
            MediaSource::Path(path) => Some(path),
            MediaSource::Bytes(_) => None,
        }
    }
}

// Byte buffers can be large; print only their length.
impl fmt::Debug for MediaSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaSource::Path(path) => f.debug_tuple("Path").field(path).finish(),
            MediaSource::Bytes(bytes) => write!(f, "Bytes({} bytes)", bytes.len()),
        }
    }
}

impl Serialize for MediaSource {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            MediaSource::Path(path) => serializer.serialize_str(&path.display().to_string()),
            MediaSource::Bytes(bytes) => {
                serializer.serialize_str(&format!("<{} bytes in memory>", bytes.len()))
            }
        }
    }
}

/// A file the user picked, before validation. `mime_type` is whatever the
/// picker declared; nothing here looks at the content.
#[derive(Debug, Clone)]
pub struct FileCandidate {
    pub name: String,
    pub mime_type: String,
    pub source: MediaSource,
}

impl FileCandidate {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, source: MediaSource) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            source,
        }
    }

    pub fn from_bytes(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self::new(name, mime_type, MediaSource::Bytes(Arc::new(bytes)))
    }

    /// Declares the MIME type from the file extension, the way a browser
    /// fills in `File.type`. Unknown extensions get an empty type.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let mime_type = mime_guess::from_path(&path)
            .first()
            .map(|mime| mime.essence_str().to_string())
            .unwrap_or_default();

        Self::new(name, mime_type, MediaSource::Path(path))
    }
}

/// A validated handle to a user-selected video.
///
/// Every accepted selection gets a fresh `id`, even when the same file is
/// picked twice. Analysis results are matched back to state by `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaReference {
    id: Uuid,
    name: String,
    mime_type: String,
    source: MediaSource,
    selected_at: DateTime<Utc>,
}

impl MediaReference {
    pub(crate) fn accept(candidate: FileCandidate) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: candidate.name,
            mime_type: candidate.mime_type,
            source: candidate.source,
            selected_at: Utc::now(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn source(&self) -> &MediaSource {
        &self.source
    }

    pub fn selected_at(&self) -> DateTime<Utc> {
        self.selected_at
    }

    pub fn is_same_selection(&self, other: &MediaReference) -> bool {
        self.id == other.id
    }
}
