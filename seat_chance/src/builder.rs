pub use crate::config::*;

use log::{debug, warn};
use std::collections::HashMap;

use crate::normalize::is_incomplete_key;

/// A builder for assembling a master table.
///
/// Rows keep their insertion order. Keys that appear more than once are
/// reported in [`MasterTable::duplicates`]; all the rows are kept.
///
/// ```
/// use seat_chance::builder::MasterTableBuilder;
/// use seat_chance::{CutoffLabel, InstituteType, MasterOption};
///
/// let mut builder = MasterTableBuilder::new(vec![CutoffLabel::OcGen]);
/// let mut option = MasterOption::new("101", "4110", InstituteType::Iit);
/// option.cutoffs.set(CutoffLabel::OcGen, Some(300));
/// builder.add_option(option);
///
/// let table = builder.build();
/// assert_eq!(table.options.len(), 1);
/// assert!(table.duplicates.is_empty());
/// ```
pub struct MasterTableBuilder {
    pub(crate) _labels: Vec<CutoffLabel>,
    pub(crate) _options: Vec<MasterOption>,
}

impl MasterTableBuilder {
    pub fn new(labels: Vec<CutoffLabel>) -> MasterTableBuilder {
        MasterTableBuilder {
            _labels: labels,
            _options: Vec::new(),
        }
    }

    /// Adds an option with the given cutoffs and no other attribute.
    ///
    /// It is the simplest use case, mostly for tests and small tables.
    pub fn add_simple(
        &mut self,
        college_code: &str,
        course_code: &str,
        institute_type: &str,
        cutoffs: &[(CutoffLabel, u64)],
    ) {
        let mut option =
            MasterOption::new(college_code, course_code, InstituteType::parse(institute_type));
        for (label, value) in cutoffs {
            option.cutoffs.set(*label, Some(*value));
        }
        self.add_option(option);
    }

    pub fn add_option(&mut self, option: MasterOption) {
        if is_incomplete_key(&option.main_code) {
            warn!(
                "add_option: row {}: incomplete key {:?}",
                self._options.len() + 1,
                option.main_code
            );
        }
        self._options.push(option);
    }

    pub fn build(self) -> MasterTable {
        let mut rows_by_key: HashMap<&str, Vec<usize>> = HashMap::new();
        for (idx, o) in self._options.iter().enumerate() {
            rows_by_key.entry(o.main_code.as_str()).or_default().push(idx);
        }
        // Reported in the order of their first occurrence.
        let mut duplicates: Vec<DuplicateKey> = rows_by_key
            .into_iter()
            .filter(|(_, rows)| rows.len() > 1)
            .map(|(k, rows)| DuplicateKey {
                main_code: k.to_string(),
                rows,
            })
            .collect();
        duplicates.sort_by_key(|d| d.rows[0]);
        for d in duplicates.iter() {
            warn!(
                "build: key {:?} appears in {} rows of the master table: {:?}",
                d.main_code,
                d.rows.len(),
                d.rows
            );
        }
        debug!(
            "build: {} options, labels: {:?}",
            self._options.len(),
            self._labels
        );
        MasterTable {
            options: self._options,
            labels: self._labels,
            duplicates,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_keys_are_flagged_not_dropped() {
        let mut b = MasterTableBuilder::new(vec![CutoffLabel::OcGen]);
        b.add_simple("101", "4110", "IIT", &[(CutoffLabel::OcGen, 300)]);
        b.add_simple("202", "4110", "NIT", &[]);
        b.add_simple(" 101", "4110 ", "IIT", &[(CutoffLabel::OcGen, 350)]);
        let t = b.build();
        assert_eq!(t.options.len(), 3);
        assert_eq!(
            t.duplicates,
            vec![DuplicateKey {
                main_code: "101_4110".to_string(),
                rows: vec![0, 2]
            }]
        );
    }
}
