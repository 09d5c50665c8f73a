//! CSV encoding of exported rows

use super::ExportRow;
use crate::error::ExportError;

/// Encode `rows` as CSV with a header line, even when `rows` is empty
pub(crate) fn encode<R: ExportRow>(rows: &[R]) -> Result<Vec<u8>, ExportError> {
    let mut writer = ::csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    writer
        .write_record(R::HEADERS)
        .map_err(|e| ExportError::Serialize(e.to_string()))?;
    for row in rows {
        writer
            .serialize(row)
            .map_err(|e| ExportError::Serialize(e.to_string()))?;
    }

    writer
        .into_inner()
        .map_err(|e| ExportError::Serialize(e.to_string()))
}
