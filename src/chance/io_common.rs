use std::path::Path;

use crate::chance::*;

pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(path)
        .to_string()
}

/// The file formats that can be read.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum Provider {
    Csv,
    Xlsx,
}

impl Provider {
    /// `csv`, `xlsx`, or `auto` (or nothing) to decide from the file extension.
    pub fn detect(provider: Option<&str>, path: &str) -> ChanceResult<Provider> {
        match provider.map(|s| s.trim().to_lowercase()).as_deref() {
            Some("csv") => Ok(Provider::Csv),
            Some("xlsx") | Some("excel") => Ok(Provider::Xlsx),
            None | Some("") | Some("auto") => {
                let ext = Path::new(path)
                    .extension()
                    .and_then(|s| s.to_str())
                    .map(|s| s.to_lowercase());
                match ext.as_deref() {
                    Some("xlsx") | Some("xlsm") => Ok(Provider::Xlsx),
                    _ => Ok(Provider::Csv),
                }
            }
            Some(x) => whatever!("Provider not implemented: {:?} (expected csv, xlsx or auto)", x),
        }
    }
}

/// Header cells as read from the first row. Blank cells are named after
/// their position, as spreadsheet exports do.
pub fn header_names(cells: &[Option<String>]) -> Vec<String> {
    cells
        .iter()
        .enumerate()
        .map(|(idx, c)| match c {
            Some(s) if !s.trim().is_empty() => s.clone(),
            _ => format!("Unnamed: {}", idx),
        })
        .collect()
}
