use crate::error::{LoadError, TabError};
use async_trait::async_trait;
use returnboard_sheet::{decode_workbook, Sheet, WorkbookReadOptions};
use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;

/// One tab as delivered by a source: a raw table with the first row as
/// header, or the error that prevented reading it.
#[derive(Debug)]
pub struct SourceSheet {
    pub name: String,
    pub content: Result<Sheet, TabError>,
}

impl SourceSheet {
    pub fn ok(name: impl Into<String>, sheet: Sheet) -> Self {
        Self {
            name: name.into(),
            content: Ok(sheet),
        }
    }

    pub fn failed(name: impl Into<String>, message: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            content: Err(TabError::new(name.clone(), message)),
            name,
        }
    }
}

/// Something that can list named raw tables.
///
/// `Err` aborts the whole load. Problems with a single tab are reported in
/// that tab's [`SourceSheet::content`] instead.
#[async_trait]
pub trait TableSource: Send + Sync {
    /// Human-readable label (file name or URL) for logs and notices.
    fn describe(&self) -> String;

    async fn list_sheets(&self) -> Result<Vec<SourceSheet>, LoadError>;
}

/// A spreadsheet file (xlsx, xlsm, xlsb, xls or ods) held in memory.
///
/// Clones share the buffer.
#[derive(Debug, Clone)]
pub struct WorkbookSource {
    label: String,
    bytes: Arc<[u8]>,
}

impl WorkbookSource {
    /// Wrap uploaded bytes; `label` is usually the original file name.
    pub fn from_bytes(label: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            label: label.into(),
            bytes: bytes.into(),
        }
    }

    /// Read a workbook file from disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .map_err(|e| LoadError::Workbook(format!("{}: {e}", path.display())))?;
        Ok(Self::from_bytes(path.display().to_string(), bytes))
    }

    /// Decode synchronously. CPU-bound; async callers go through
    /// [`TableSource::list_sheets`].
    pub fn decode(&self) -> Result<Vec<SourceSheet>, LoadError> {
        decode_sheets(&self.bytes)
    }
}

fn decode_sheets(bytes: &[u8]) -> Result<Vec<SourceSheet>, LoadError> {
    let options = WorkbookReadOptions::default().with_headers(true);
    let decoded = decode_workbook(Cursor::new(bytes), &options)?;

    Ok(decoded
        .into_iter()
        .map(|tab| match tab.sheet {
            Ok(sheet) => SourceSheet::ok(tab.name, sheet),
            Err(err) => SourceSheet::failed(tab.name, err.to_string()),
        })
        .collect())
}

#[async_trait]
impl TableSource for WorkbookSource {
    fn describe(&self) -> String {
        self.label.clone()
    }

    async fn list_sheets(&self) -> Result<Vec<SourceSheet>, LoadError> {
        let bytes = Arc::clone(&self.bytes);
        tokio::task::spawn_blocking(move || decode_sheets(&bytes))
            .await
            .map_err(|e| LoadError::Internal(e.to_string()))?
    }
}
