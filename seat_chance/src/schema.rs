// Mapping of loosely formatted tables onto the typed records.

use log::{debug, warn};
use std::collections::HashMap;

use crate::builder::MasterTableBuilder;
use crate::config::*;
use crate::normalize::{normalize_header, parse_choice_number, parse_rank};

pub const MASTER_REQUIRED: [&str; 3] = ["COLLEGE_CODE", "COURSE_CODE", "TYPE"];

pub const STUDENT_REQUIRED: [&str; 8] = [
    "NAME",
    "STUDENT_ID",
    "GENDER",
    "CATEGORY",
    "JEE_ADVACED_CRL_RANK",
    "JEE_ADVNCED_CATEGORY_RANK",
    "JEE_MAIN_CRL_RANK",
    "JEE_MAIN_CATEGORY_RANK",
];

// (canonical column, accepted spellings after normalization)
const CHOICE_COLUMNS: [(&str, &[&str]); 5] = [
    ("COLLEGE_CODE", &["COLLEGE_CODE", "UNNAMED:_0"]),
    ("COURSE_CODE", &["COURSE_CODE", "UNNAMED:_2"]),
    ("CHOICE_NUMBER", &["CHOICE_NUMBER", "CHOICE_NO.", "CHOICE_NO"]),
    ("INSTITUTE", &["INSTITUTE"]),
    ("PROGRAM", &["PROGRAM"]),
];

const CHOICE_REQUIRED: [&str; 3] = ["COLLEGE_CODE", "COURSE_CODE", "CHOICE_NUMBER"];

/// A table of text cells, as delivered by the file readers.
///
/// Headers are normalized on construction. A missing cell and an empty cell
/// are both `None`.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

impl Table {
    pub fn new(headers: &[String], rows: Vec<Vec<Option<String>>>) -> Table {
        Table {
            headers: headers.iter().map(|h| normalize_header(h)).collect(),
            rows: rows
                .into_iter()
                .map(|row| {
                    row.into_iter()
                        .map(|c| c.filter(|s| !s.trim().is_empty()))
                        .collect()
                })
                .collect(),
        }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .and_then(|c| c.as_deref())
    }

    fn check_required(&self, table: TableKind, required: &[&str]) -> Result<HashMap<String, usize>, SchemaError> {
        if self.headers.is_empty() {
            return Err(SchemaError::EmptyTable { table });
        }
        let missing: Vec<String> = required
            .iter()
            .filter(|c| self.column(c).is_none())
            .map(|c| c.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(SchemaError::MissingColumns {
                table,
                missing,
                detected: self.headers.clone(),
            });
        }
        Ok(required
            .iter()
            .filter_map(|c| self.column(c).map(|idx| (c.to_string(), idx)))
            .collect())
    }
}

/// Maps the master sheet onto [`MasterOption`]s.
///
/// Cutoff columns are optional: the labels found in the header make up
/// [`MasterTable::labels`]. Non-numeric cutoff cells are absent values.
/// Duplicate keys are flagged by the builder, not removed.
pub fn read_master(table: &Table) -> Result<MasterTable, SchemaError> {
    let cols = table.check_required(TableKind::Master, &MASTER_REQUIRED)?;
    let (college_idx, course_idx, type_idx) = (
        cols["COLLEGE_CODE"],
        cols["COURSE_CODE"],
        cols["TYPE"],
    );

    let label_cols: Vec<(CutoffLabel, usize)> = table
        .headers()
        .iter()
        .enumerate()
        .filter_map(|(idx, h)| CutoffLabel::from_name(h).map(|l| (l, idx)))
        .collect();
    let attribute_cols: Vec<(String, usize)> = table
        .headers()
        .iter()
        .enumerate()
        .filter(|(idx, h)| {
            ![college_idx, course_idx, type_idx].contains(idx) && CutoffLabel::from_name(h).is_none()
        })
        .map(|(idx, h)| (h.clone(), idx))
        .collect();
    debug!(
        "read_master: cutoff columns: {:?} attribute columns: {:?}",
        label_cols, attribute_cols
    );

    let mut builder = MasterTableBuilder::new(label_cols.iter().map(|(l, _)| *l).collect());
    for row in 0..table.num_rows() {
        let mut option = MasterOption::new(
            table.cell(row, college_idx).unwrap_or(""),
            table.cell(row, course_idx).unwrap_or(""),
            InstituteType::parse(table.cell(row, type_idx).unwrap_or("")),
        );
        for (label, idx) in label_cols.iter() {
            option
                .cutoffs
                .set(*label, table.cell(row, *idx).and_then(parse_rank));
        }
        for (name, idx) in attribute_cols.iter() {
            if let Some(v) = table.cell(row, *idx) {
                option.attributes.insert(name.clone(), v.trim().to_string());
            }
        }
        builder.add_option(option);
    }
    Ok(builder.build())
}

/// Maps a student batch onto [`StudentRecord`]s, in row order.
///
/// Only the header is validated. Bad cells inside a row degrade to absent
/// ranks or an unrecognized category.
pub fn read_students(table: &Table) -> Result<Vec<StudentRecord>, SchemaError> {
    let cols = table.check_required(TableKind::StudentBatch, &STUDENT_REQUIRED)?;
    let text = |row: usize, name: &str| -> String {
        table
            .cell(row, cols[name])
            .map(|s| s.trim().to_string())
            .unwrap_or_default()
    };
    let rank = |row: usize, name: &str| -> Option<u64> { table.cell(row, cols[name]).and_then(parse_rank) };

    let mut res: Vec<StudentRecord> = Vec::new();
    for row in 0..table.num_rows() {
        let student = StudentRecord {
            student_id: text(row, "STUDENT_ID"),
            name: text(row, "NAME"),
            gender: Gender::parse(&text(row, "GENDER")),
            category: Category::parse(&text(row, "CATEGORY")),
            advanced: StageRanks {
                crl: rank(row, "JEE_ADVACED_CRL_RANK"),
                category: rank(row, "JEE_ADVNCED_CATEGORY_RANK"),
            },
            mains: StageRanks {
                crl: rank(row, "JEE_MAIN_CRL_RANK"),
                category: rank(row, "JEE_MAIN_CATEGORY_RANK"),
            },
        };
        if let Category::Unrecognized(c) = &student.category {
            warn!(
                "read_students: row {}: student {:?} has an unrecognized category {:?}",
                row + 2,
                student.student_id,
                c
            );
        }
        res.push(student);
    }
    Ok(res)
}

/// Maps a filled choice list onto [`ChoiceRow`]s, in row order.
///
/// Blank header cells are named positionally by the readers (`Unnamed: 0`),
/// which is how the allocation portal exports the code columns.
pub fn read_choices(table: &Table) -> Result<Vec<ChoiceRow>, SchemaError> {
    let resolved: HashMap<&str, usize> = CHOICE_COLUMNS
        .iter()
        .filter_map(|(canonical, aliases)| {
            aliases
                .iter()
                .find_map(|a| table.column(a))
                .map(|idx| (*canonical, idx))
        })
        .collect();
    if table.headers().is_empty() {
        return Err(SchemaError::EmptyTable {
            table: TableKind::ChoiceSheet,
        });
    }
    let missing: Vec<String> = CHOICE_REQUIRED
        .iter()
        .filter(|c| !resolved.contains_key(*c))
        .map(|c| c.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(SchemaError::MissingColumns {
            table: TableKind::ChoiceSheet,
            missing,
            detected: table.headers().to_vec(),
        });
    }

    let get = |row: usize, name: &str| resolved.get(name).and_then(|idx| table.cell(row, *idx));
    let mut res: Vec<ChoiceRow> = Vec::new();
    for row in 0..table.num_rows() {
        let mut choice = ChoiceRow::new(
            get(row, "CHOICE_NUMBER").and_then(parse_choice_number),
            get(row, "COLLEGE_CODE").unwrap_or(""),
            get(row, "COURSE_CODE").unwrap_or(""),
        );
        choice.institute = get(row, "INSTITUTE").map(|s| s.trim().to_string());
        choice.program = get(row, "PROGRAM").map(|s| s.trim().to_string());
        res.push(choice);
    }
    Ok(res)
}
