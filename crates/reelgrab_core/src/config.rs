use std::path::{Path, PathBuf};

use crate::format::{selector, FormatExpression, QualitySelection};

pub const DEFAULT_ARCHIVE_FILENAME: &str = "downloaded_archive.txt";

/// Per-item file layout handed to the engine:
/// `<uploader>/<date>_<title, truncated to 80 bytes>_<id>.<ext>`.
pub const OUTPUT_TEMPLATE: &str = "%(uploader)s/%(upload_date)s_%(title).80B_%(id)s.%(ext)s";

/// Whether the engine should consult/append the archive, and where it lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveSetting {
    pub enabled: bool,
    /// Explicit path; `None` means `<output_dir>/downloaded_archive.txt`.
    pub path: Option<PathBuf>,
}

impl Default for ArchiveSetting {
    fn default() -> Self {
        Self {
            enabled: true,
            path: None,
        }
    }
}

/// Settings for one batch. Captured once at start and never mutated while
/// the batch runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobConfig {
    output_dir: PathBuf,
    quality: QualitySelection,
    max_items: u32,
    archive: ArchiveSetting,
    credential_file: Option<PathBuf>,
}

impl JobConfig {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            quality: QualitySelection::default(),
            max_items: 0,
            archive: ArchiveSetting::default(),
            credential_file: None,
        }
    }

    pub fn with_quality(mut self, quality: QualitySelection) -> Self {
        self.quality = quality;
        self
    }

    /// `0` means unlimited.
    pub fn with_max_items(mut self, max_items: u32) -> Self {
        self.max_items = max_items;
        self
    }

    pub fn with_archive(mut self, archive: ArchiveSetting) -> Self {
        self.archive = archive;
        self
    }

    pub fn with_credential_file(mut self, path: Option<PathBuf>) -> Self {
        self.credential_file = path;
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn quality(&self) -> QualitySelection {
        self.quality
    }

    pub fn max_items(&self) -> u32 {
        self.max_items
    }

    /// Collection expansion ceiling, `None` when unlimited.
    pub fn item_ceiling(&self) -> Option<u32> {
        (self.max_items > 0).then_some(self.max_items)
    }

    pub fn archive(&self) -> &ArchiveSetting {
        &self.archive
    }

    pub fn credential_file(&self) -> Option<&Path> {
        self.credential_file.as_deref()
    }

    pub fn format_expression(&self) -> FormatExpression {
        selector(self.quality)
    }

    /// Archive path the engine should use, or `None` when archiving is off.
    pub fn effective_archive_path(&self) -> Option<PathBuf> {
        if !self.archive.enabled {
            return None;
        }
        Some(
            self.archive
                .path
                .clone()
                .unwrap_or_else(|| default_archive_path(&self.output_dir)),
        )
    }

    /// Full output template rooted at the output directory.
    pub fn output_template(&self) -> String {
        self.output_dir
            .join(OUTPUT_TEMPLATE)
            .to_string_lossy()
            .into_owned()
    }
}

pub fn default_archive_path(output_dir: &Path) -> PathBuf {
    output_dir.join(DEFAULT_ARCHIVE_FILENAME)
}
