//! Extension-based categories used to narrow search results.

use camino::Utf8Path;
use serde::{Deserialize, Serialize};

const AUDIO: &[&str] = &["mp3", "wav", "flac", "aac", "ogg", "wma", "m4a"];
const COMPRESSED: &[&str] = &["zip", "rar", "7z", "tar", "gz", "bz2"];
const DOCUMENTS: &[&str] = &[
    "pdf", "docx", "doc", "txt", "rtf", "odt", "xlsx", "xls", "csv", "pptx", "ppt",
];
const EXECUTABLES: &[&str] = &["exe", "bat", "msi", "sh", "app"];
const PICTURE: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp", "tiff", "webp", "svg"];
const VIDEO: &[&str] = &["mp4", "avi", "mkv", "mov", "wmv", "flv", "mpeg", "webm"];

/// A group of file extensions a search can be restricted to.
///
/// The category is decided from the filename alone; nothing is read from
/// disk.
///
/// # Examples
///
/// ```
/// use bs_core::Category;
///
/// assert!(Category::Audio.matches("song.MP3"));
/// assert!(!Category::Audio.matches("notes.txt"));
/// assert!(Category::All.matches("anything"));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum Category {
    /// No filtering.
    #[default]
    All,
    /// Audio files.
    Audio,
    /// Archives.
    Compressed,
    /// Office documents and text.
    Documents,
    /// Executables and scripts.
    Executables,
    /// Images.
    Picture,
    /// Video files.
    Video,
}

impl Category {
    /// Every category, in display order.
    pub const ALL: [Self; 7] = [
        Self::All,
        Self::Audio,
        Self::Compressed,
        Self::Documents,
        Self::Executables,
        Self::Picture,
        Self::Video,
    ];

    /// The lowercase extensions (without the dot) belonging to this category.
    ///
    /// [`Category::All`] has no list; it accepts every name.
    #[must_use]
    pub const fn extensions(self) -> &'static [&'static str] {
        match self {
            Self::All => &[],
            Self::Audio => AUDIO,
            Self::Compressed => COMPRESSED,
            Self::Documents => DOCUMENTS,
            Self::Executables => EXECUTABLES,
            Self::Picture => PICTURE,
            Self::Video => VIDEO,
        }
    }

    /// Returns `true` if a file with this name belongs to the category.
    ///
    /// Extension comparison ignores ASCII case. A leading-dot name such as
    /// `.bashrc` has no extension.
    #[must_use]
    pub fn matches(self, name: &str) -> bool {
        if self == Self::All {
            return true;
        }
        Utf8Path::new(name).extension().is_some_and(|ext| {
            self.extensions()
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
    }

    /// Returns a short label for display.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::All => "All",
            Self::Audio => "Audio",
            Self::Compressed => "Compressed",
            Self::Documents => "Documents",
            Self::Executables => "Executables",
            Self::Picture => "Picture",
            Self::Video => "Video",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_accepts_everything() {
        assert!(Category::All.matches("a"));
        assert!(Category::All.matches(".hidden"));
        assert!(Category::All.matches("x.unknown"));
    }

    #[test]
    fn test_extension_case_insensitive() {
        assert!(Category::Picture.matches("IMG_0001.JPG"));
        assert!(Category::Documents.matches("Report.Docx"));
    }

    #[test]
    fn test_last_extension_wins() {
        assert!(Category::Compressed.matches("backup.tar.gz"));
        assert!(!Category::Documents.matches("notes.txt.bak"));
    }

    #[test]
    fn test_no_extension() {
        assert!(!Category::Executables.matches("Makefile"));
        assert!(!Category::Executables.matches(".sh"));
    }

    #[test]
    fn test_categories_disjoint() {
        for a in Category::ALL {
            for b in Category::ALL {
                if a == b {
                    continue;
                }
                for ext in a.extensions() {
                    assert!(
                        !b.extensions().contains(ext),
                        "{ext} in both {} and {}",
                        a.label(),
                        b.label()
                    );
                }
            }
        }
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(
            serde_json::to_string(&Category::Executables).unwrap(),
            r#""executables""#
        );
        let parsed: Category = serde_json::from_str(r#""picture""#).unwrap();
        assert_eq!(parsed, Category::Picture);
    }
}
