use crate::config::settings::{MalformedPolicy, ScannerSettings};
use crate::domain::model::GtinFlagMap;
use crate::utils::error::{ReconcileError, Result};
use calamine::{Data, Range, Reader, Xlsx};
use std::io::Cursor;

/// Where the GTIN list lives inside the workbook. All indices are zero-based
/// and columns are absolute (column A is 0).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SheetLayout {
    pub worksheet: usize,
    pub gtin_column: usize,
    pub flag_column: usize,
}

/// Opens an .xlsx workbook held in memory and collects GTIN -> flag pairs
/// from the configured worksheet.
pub fn scan_workbook(
    data: &[u8],
    layout: SheetLayout,
    settings: &ScannerSettings,
) -> Result<GtinFlagMap> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(data))?;
    let available = workbook.sheet_names().len();

    let range = workbook
        .worksheet_range_at(layout.worksheet)
        .ok_or(ReconcileError::WorksheetNotFound {
            index: layout.worksheet,
            available,
        })??;

    let (height, width) = range.get_size();
    tracing::debug!(
        "Worksheet {} spans {} rows x {} cols",
        layout.worksheet,
        height,
        width
    );

    scan_range(&range, layout, settings)
}

/// Scans every physically present row of `range`. Rows with no value in any
/// cell are treated as absent; a present row missing the GTIN or flag cell is
/// handled according to `settings.on_malformed_row`.
pub fn scan_range(
    range: &Range<Data>,
    layout: SheetLayout,
    settings: &ScannerSettings,
) -> Result<GtinFlagMap> {
    let mut map = GtinFlagMap::new();
    let (Some(start), Some(end)) = (range.start(), range.end()) else {
        return Ok(map);
    };

    for row in start.0..=end.0 {
        let sheet_row = row as usize;
        if sheet_row < settings.header_rows || !row_is_present(range, row, start.1, end.1) {
            continue;
        }

        let gtin = cell_text(range, row, layout.gtin_column);
        let flag = cell_text(range, row, layout.flag_column);

        let (gtin, flag) = match (gtin, flag) {
            (Some(gtin), Some(flag)) => (gtin, flag),
            (gtin, _) => {
                let column = if gtin.is_none() {
                    layout.gtin_column
                } else {
                    layout.flag_column
                };
                match settings.on_malformed_row {
                    MalformedPolicy::Abort => {
                        return Err(ReconcileError::MissingCell {
                            row: sheet_row + 1,
                            column,
                        })
                    }
                    MalformedPolicy::Skip => {
                        tracing::warn!("Skipping row {}: column {} is empty", sheet_row + 1, column);
                        continue;
                    }
                }
            }
        };

        if settings.flag_qualifies(&flag) {
            map.insert(gtin, flag);
        } else {
            tracing::debug!("Row {}: flag '{}' does not qualify {}", sheet_row + 1, flag, gtin);
        }
    }

    Ok(map)
}

fn row_is_present(range: &Range<Data>, row: u32, first_col: u32, last_col: u32) -> bool {
    (first_col..=last_col).any(|col| !matches!(range.get_value((row, col)), None | Some(Data::Empty)))
}

fn cell_text(range: &Range<Data>, row: u32, column: usize) -> Option<String> {
    let column = u32::try_from(column).ok()?;
    data_to_string(range.get_value((row, column))?)
}

/// String cells are returned verbatim; numbers stored without a fraction are
/// printed as integers so numeric GTIN cells match their catalog text.
fn data_to_string(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) => Some(s.clone()),
        Data::Int(i) => Some(i.to_string()),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => Some(format!("{:.0}", f)),
        Data::Float(f) => Some(f.to_string()),
        Data::Bool(b) => Some(b.to_string()),
        other => Some(format!("{:?}", other)),
    }
}
