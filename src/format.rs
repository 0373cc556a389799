//! Binary format classification by file name.

use camino::Utf8Path;

/// Container format a file is expected to hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryFormat {
    Pe,
    Elf,
    Unknown,
}

impl BinaryFormat {
    /// Classify `path` by its complete suffix (everything after the first dot
    /// of the file name). Matching is case-sensitive.
    ///
    /// - suffix containing `dll` or `exe`: [`BinaryFormat::Pe`]
    /// - empty suffix or suffix containing `so`: [`BinaryFormat::Elf`]
    /// - anything else: [`BinaryFormat::Unknown`]
    ///
    /// The file itself is never opened.
    pub fn classify(path: &Utf8Path) -> Self {
        let suffix = complete_suffix(path);

        if suffix.contains("dll") || suffix.contains("exe") {
            BinaryFormat::Pe
        } else if suffix.is_empty() || suffix.contains("so") {
            BinaryFormat::Elf
        } else {
            BinaryFormat::Unknown
        }
    }
}

fn complete_suffix(path: &Utf8Path) -> &str {
    path.file_name()
        .and_then(|name| name.split_once('.'))
        .map(|(_, suffix)| suffix)
        .unwrap_or("")
}
