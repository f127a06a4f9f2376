use std::collections::{hash_map::Entry, HashMap};

use shared::{domain::FileKind, error::ValidationError};

pub const MAX_UPLOAD_BYTES: u64 = 16 * 1024 * 1024;

const CSV_MEDIA_TYPES: [&str; 2] = ["text/csv", "application/csv"];

/// A file picked locally, not yet validated or staged.
#[derive(Debug, Clone)]
pub struct FileCandidate {
    pub name: String,
    pub media_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl FileCandidate {
    pub fn new(name: impl Into<String>, media_type: Option<&str>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.map(str::to_owned),
            bytes,
        }
    }
}

/// A validated file waiting to be submitted.
#[derive(Debug, Clone)]
pub struct StagedFile {
    pub kind: FileKind,
    pub name: String,
    pub size_bytes: u64,
    pub media_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Holds at most one staged file per [`FileKind`]. Staging a kind again
/// silently replaces the previous file; removal is idempotent.
#[derive(Debug, Default)]
pub struct FileStagingSet {
    files: HashMap<FileKind, StagedFile>,
}

impl FileStagingSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates and stages a candidate. Checks run in order and the first
    /// failure wins: the 16 MiB size cap, then the CSV type/extension rule.
    pub fn stage(
        &mut self,
        kind: FileKind,
        candidate: FileCandidate,
    ) -> Result<&StagedFile, ValidationError> {
        let size_bytes = candidate.bytes.len() as u64;
        if size_bytes > MAX_UPLOAD_BYTES {
            return Err(ValidationError::TooLarge);
        }
        if !is_csv(&candidate) {
            return Err(ValidationError::WrongType);
        }

        let staged = StagedFile {
            kind,
            name: candidate.name,
            size_bytes,
            media_type: candidate.media_type,
            bytes: candidate.bytes,
        };
        match self.files.entry(kind) {
            Entry::Occupied(mut slot) => {
                slot.insert(staged);
                Ok(slot.into_mut())
            }
            Entry::Vacant(slot) => Ok(slot.insert(staged)),
        }
    }

    pub fn remove(&mut self, kind: FileKind) {
        self.files.remove(&kind);
    }

    pub fn get(&self, kind: FileKind) -> Option<&StagedFile> {
        self.files.get(&kind)
    }

    /// Staged files in the backend's canonical kind order.
    pub fn files(&self) -> impl Iterator<Item = &StagedFile> {
        FileKind::ALL.iter().filter_map(|kind| self.files.get(kind))
    }

    /// True once both required kinds (sales and products) are staged.
    /// Weather never gates submission.
    pub fn is_submittable(&self) -> bool {
        FileKind::ALL
            .iter()
            .filter(|kind| kind.is_required())
            .all(|kind| self.files.contains_key(kind))
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    pub fn total_size_bytes(&self) -> u64 {
        self.files.values().map(|file| file.size_bytes).sum()
    }
}

fn is_csv(candidate: &FileCandidate) -> bool {
    if let Some(media_type) = &candidate.media_type {
        if CSV_MEDIA_TYPES
            .iter()
            .any(|known| media_type.eq_ignore_ascii_case(known))
        {
            return true;
        }
    }
    candidate
        .name
        .rsplit('.')
        .next()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
        && candidate.name.contains('.')
}
