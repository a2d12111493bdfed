pub mod media;

pub use media::{FileCandidate, MediaReference, MediaSource};

use thiserror::Error;

const VIDEO_PREFIX: &str = "video/";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RejectedReason {
    #[error("'{mime_type}' is not a video type")]
    NotVideo { mime_type: String },
    #[error("no MIME type was declared for the file")]
    MissingMimeType,
}

/// Validates a picked file. Only the declared type is checked, so a file
/// labelled `video/*` passes whatever its bytes are.
pub fn select_file(candidate: FileCandidate) -> Result<MediaReference, RejectedReason> {
    let declared = candidate.mime_type.trim();
    if declared.is_empty() {
        return Err(RejectedReason::MissingMimeType);
    }

    if !is_video_mime(declared) {
        return Err(RejectedReason::NotVideo {
            mime_type: declared.to_string(),
        });
    }

    Ok(MediaReference::accept(candidate))
}

fn is_video_mime(mime_type: &str) -> bool {
    mime_type
        .get(..VIDEO_PREFIX.len())
        .map(|prefix| prefix.eq_ignore_ascii_case(VIDEO_PREFIX))
        .unwrap_or(false)
}
