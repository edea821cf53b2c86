// Primitives for reading CSV files.

use seat_chance::schema::Table;

use crate::chance::{io_common::header_names, *};

/// Reads a CSV file into a [`Table`]. The first line is the header.
///
/// Lines may have fewer or more fields than the header: missing cells are
/// blank and extra cells are ignored by the schema mapping.
pub fn read_csv_table(path: &str) -> ChanceResult<Table> {
    let rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .context(OpeningCsvSnafu { path })?;

    let mut records = rdr.into_records();
    let header: Vec<Option<String>> = match records.next() {
        Some(line_r) => {
            let line = line_r.context(CsvLineParseSnafu { path, lineno: 1_usize })?;
            line.iter()
                .enumerate()
                .map(|(idx, s)| {
                    // Spreadsheet programs like to start the file with a byte order mark.
                    let s = if idx == 0 { s.trim_start_matches('\u{feff}') } else { s };
                    Some(s.to_string())
                })
                .collect()
        }
        None => {
            warn!("read_csv_table: {:?} is empty", path);
            return Ok(Table::new(&[], vec![]));
        }
    };
    let headers = header_names(&header);
    debug!("read_csv_table: {:?}: header: {:?}", path, headers);

    let mut rows: Vec<Vec<Option<String>>> = Vec::new();
    for (idx, line_r) in records.enumerate() {
        let lineno = idx + 2;
        let line = line_r.context(CsvLineParseSnafu { path, lineno })?;
        if line.iter().all(|s| s.trim().is_empty()) {
            debug!("read_csv_table: {:?}: skipping blank line {}", path, lineno);
            continue;
        }
        rows.push(line.iter().map(|s| Some(s.to_string())).collect());
    }
    info!("read_csv_table: {:?}: {} rows", path, rows.len());
    Ok(Table::new(&headers, rows))
}
