// Primitives for reading Excel workbooks.

use calamine::{open_workbook, DataType, Reader, Xlsx};

use seat_chance::schema::Table;

use crate::chance::{io_common::header_names, *};

/// Reads a worksheet into a [`Table`]. The first row is the header.
pub fn read_excel_table(path: &str, worksheet_name: Option<&str>) -> ChanceResult<Table> {
    let wrange = get_range(path, worksheet_name)?;

    let mut iter = wrange.rows();
    let header: Vec<Option<String>> = match iter.next() {
        Some(row) => row.iter().map(cell_to_text).collect(),
        None => {
            warn!("read_excel_table: {:?}: the worksheet is empty", path);
            return Ok(Table::new(&[], vec![]));
        }
    };
    let headers = header_names(&header);
    debug!("read_excel_table: {:?}: header: {:?}", path, headers);

    let mut rows: Vec<Vec<Option<String>>> = Vec::new();
    for row in iter {
        let cells: Vec<Option<String>> = row.iter().map(cell_to_text).collect();
        if cells.iter().all(|c| c.is_none()) {
            continue;
        }
        rows.push(cells);
    }
    info!("read_excel_table: {:?}: {} rows", path, rows.len());
    Ok(Table::new(&headers, rows))
}

fn get_range(path: &str, worksheet_name_o: Option<&str>) -> ChanceResult<calamine::Range<DataType>> {
    debug!(
        "get_range: path: {:?} worksheet: {:?}",
        path, worksheet_name_o
    );
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;

    // A worksheet name was provided, use it.
    if let Some(worksheet_name) = worksheet_name_o {
        let wrange = workbook
            .worksheet_range(worksheet_name)
            .context(MissingWorksheetSnafu {
                path,
                name: worksheet_name,
            })?
            .context(OpeningExcelSnafu { path })?;
        Ok(wrange)
    } else {
        let all_worksheets = workbook.worksheets();
        match all_worksheets.as_slice() {
            [] => EmptyExcelSnafu { path }.fail(),
            [(worksheet_name, wrange)] => {
                debug!("get_range: path: {:?} worksheet: {:?}", path, worksheet_name);
                Ok(wrange.clone())
            }
            _ => AmbiguousWorksheetSnafu {
                path,
                names: all_worksheets
                    .iter()
                    .map(|(n, _)| n.clone())
                    .collect::<Vec<String>>(),
            }
            .fail(),
        }
    }
}

/// The text of a cell. Whole floats are written without a fractional part, so
/// that codes and ranks stored as numbers read the same as in a CSV export.
fn cell_to_text(cell: &DataType) -> Option<String> {
    match cell {
        DataType::String(s) => Some(s.clone()),
        DataType::Int(i) => Some(i.to_string()),
        DataType::Float(f) => Some(float_to_text(*f)),
        DataType::Bool(b) => Some(b.to_string()),
        DataType::DateTime(f) => Some(float_to_text(*f)),
        DataType::Empty => None,
        _ => {
            debug!("cell_to_text: ignoring cell {:?}", cell);
            None
        }
    }
}

fn float_to_text(f: f64) -> String {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 {
        format!("{}", f as i64)
    } else {
        f.to_string()
    }
}
