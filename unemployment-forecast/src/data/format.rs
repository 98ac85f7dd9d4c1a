//! Tabular file formats, detected from the file extension.

use std::path::Path;

/// Supported tabular file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    /// Office Open XML workbook (`.xlsx`, `.xlsm`). Readable and writable.
    Xlsx,
    /// Legacy or OpenDocument workbook (`.xls`, `.ods`). Read-only.
    LegacyWorkbook,
    /// Comma separated values with a header row.
    Csv,
    /// Apache Parquet.
    Parquet,
}

impl TableFormat {
    /// Detect the format from a path's extension (case-insensitive).
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "xlsx" | "xlsm" => Some(Self::Xlsx),
            "xls" | "ods" => Some(Self::LegacyWorkbook),
            "csv" => Some(Self::Csv),
            "parquet" | "pq" => Some(Self::Parquet),
            _ => None,
        }
    }

    /// Whether the writer can produce this format.
    pub fn is_writable(&self) -> bool {
        !matches!(self, Self::LegacyWorkbook)
    }

    pub fn is_workbook(&self) -> bool {
        matches!(self, Self::Xlsx | Self::LegacyWorkbook)
    }
}
