// Normalization of join keys, headers and numeric cells.

/// The composite join key of an option: `COLLEGE_COURSE`, both parts trimmed.
///
/// Blank codes are not rejected here. They produce a key with an empty
/// segment, which [`is_incomplete_key`] detects.
pub fn normalize_key(college_code: &str, course_code: &str) -> String {
    format!("{}_{}", college_code.trim(), course_code.trim())
}

/// True if one of the two segments of a key built by [`normalize_key`] is empty.
pub fn is_incomplete_key(main_code: &str) -> bool {
    main_code.starts_with('_') || main_code.ends_with('_')
}

/// The canonical form of a column header: trimmed, upper-cased, spaces
/// replaced with underscores. `College Code ` becomes `COLLEGE_CODE`.
///
/// Every table goes through this function, so that headers match regardless
/// of how the source sheet was formatted.
pub fn normalize_header(header: &str) -> String {
    header.trim().to_uppercase().replace(' ', "_")
}

/// Parses a rank or cutoff cell.
///
/// Ranks are positive integers. Spreadsheets often store them as floats
/// (`512.0`), which are accepted when they have no fractional part. Anything
/// else (blank, text, zero, negative, fractional) is treated as absent.
pub fn parse_rank(cell: &str) -> Option<u64> {
    let s = cell.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(x) = s.parse::<u64>() {
        return if x > 0 { Some(x) } else { None };
    }
    match s.parse::<f64>() {
        Ok(f) if f.is_finite() && f >= 1.0 && f.fract() == 0.0 && f <= u64::MAX as f64 => {
            Some(f as u64)
        }
        _ => None,
    }
}

/// Parses a choice number. Same leniency as [`parse_rank`].
pub fn parse_choice_number(cell: &str) -> Option<u32> {
    parse_rank(cell).and_then(|x| u32::try_from(x).ok())
}
