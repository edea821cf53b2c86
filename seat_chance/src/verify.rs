// Checks and summaries of a filled choice list against the master table.

use std::collections::{HashMap, HashSet};

use crate::config::*;

/// The result of joining a choice list with the master table.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ChoiceJoin {
    /// In the order of the choice list. A choice whose key appears several
    /// times in the master table is paired with each of the rows.
    pub matched: Vec<(ChoiceRow, MasterOption)>,
    pub unmatched: Vec<ChoiceRow>,
    pub ambiguous: Vec<ChoiceRow>,
}

fn rows_by_key(master: &MasterTable) -> HashMap<&str, Vec<&MasterOption>> {
    let mut res: HashMap<&str, Vec<&MasterOption>> = HashMap::new();
    for o in master.options.iter() {
        res.entry(o.main_code.as_str()).or_default().push(o);
    }
    res
}

/// Left join of the choices onto the master table, on the main code.
pub fn join_choices(choices: &[ChoiceRow], master: &MasterTable) -> ChoiceJoin {
    let by_key = rows_by_key(master);
    let mut matched: Vec<(ChoiceRow, MasterOption)> = Vec::new();
    let mut unmatched: Vec<ChoiceRow> = Vec::new();
    let mut ambiguous: Vec<ChoiceRow> = Vec::new();
    for choice in choices.iter() {
        match by_key.get(choice.main_code.as_str()) {
            None => unmatched.push(choice.clone()),
            Some(options) => {
                if options.len() > 1 {
                    ambiguous.push(choice.clone());
                }
                for o in options.iter() {
                    matched.push((choice.clone(), (*o).clone()));
                }
            }
        }
    }
    ChoiceJoin {
        matched,
        unmatched,
        ambiguous,
    }
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ChoiceValidation {
    /// Choices whose key is not in the master table.
    pub missing_in_master: Vec<ChoiceRow>,
    /// Master options the student did not pick, in master order.
    pub not_chosen: Vec<MasterOption>,
    /// All the choices whose key appears more than once in the list.
    pub duplicate_choices: Vec<ChoiceRow>,
}

impl ChoiceValidation {
    /// True if the list has no missing or repeated entries. Unpicked
    /// options are expected and do not count.
    pub fn is_clean(&self) -> bool {
        self.missing_in_master.is_empty() && self.duplicate_choices.is_empty()
    }
}

pub fn validate_choices(choices: &[ChoiceRow], master: &MasterTable) -> ChoiceValidation {
    let master_keys: HashSet<&str> = master.options.iter().map(|o| o.main_code.as_str()).collect();
    let mut choice_counts: HashMap<&str, usize> = HashMap::new();
    for c in choices.iter() {
        *choice_counts.entry(c.main_code.as_str()).or_insert(0) += 1;
    }

    let missing_in_master = choices
        .iter()
        .filter(|c| !master_keys.contains(c.main_code.as_str()))
        .cloned()
        .collect();
    let not_chosen = master
        .options
        .iter()
        .filter(|o| !choice_counts.contains_key(o.main_code.as_str()))
        .cloned()
        .collect();
    let duplicate_choices = choices
        .iter()
        .filter(|c| choice_counts.get(c.main_code.as_str()).copied().unwrap_or(0) > 1)
        .cloned()
        .collect();
    ChoiceValidation {
        missing_in_master,
        not_chosen,
        duplicate_choices,
    }
}

/// Compresses choice numbers into ranges: `[1, 2, 3, 5, 6]` gives `1-3, 5-6`.
///
/// The numbers are sorted and deduplicated first. An empty list gives an
/// empty string.
pub fn split_ranges(numbers: &[u32]) -> String {
    let mut nums: Vec<u32> = numbers.to_vec();
    nums.sort_unstable();
    nums.dedup();

    let mut ranges: Vec<(u32, u32)> = Vec::new();
    for n in nums {
        match ranges.last_mut() {
            Some((_, end)) if *end + 1 == n => *end = n,
            _ => ranges.push((n, n)),
        }
    }
    ranges
        .iter()
        .map(|(start, end)| {
            if start == end {
                format!("{}", start)
            } else {
                format!("{}-{}", start, end)
            }
        })
        .collect::<Vec<String>>()
        .join(", ")
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ProgramRanges {
    pub program: String,
    pub options_filled: usize,
    /// See [`split_ranges`].
    pub choice_ranges: String,
}

/// Where each program sits in the choice list.
///
/// Programs are listed in the order in which they first appear.
pub fn order_ranges_by_program(matched: &[(ChoiceRow, MasterOption)]) -> Vec<ProgramRanges> {
    let mut programs: Vec<(String, usize, Vec<u32>)> = Vec::new();
    for (choice, option) in matched.iter() {
        let program = option.program_name();
        let idx = match programs.iter().position(|(p, _, _)| p == program) {
            Some(idx) => idx,
            None => {
                programs.push((program.to_string(), 0, Vec::new()));
                programs.len() - 1
            }
        };
        let entry = &mut programs[idx];
        entry.1 += 1;
        if let Some(n) = choice.choice_number {
            entry.2.push(n);
        }
    }
    programs
        .into_iter()
        .map(|(program, options_filled, nums)| ProgramRanges {
            program,
            options_filled,
            choice_ranges: split_ranges(&nums),
        })
        .collect()
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct GroupSummary {
    pub value: String,
    pub options_filled: usize,
    /// The lowest choice number in the group.
    pub first_choice: Option<u32>,
}

/// Counts the picked options per value of a master column.
///
/// `field` is a normalized master header. `TYPE` groups by institute type.
/// Options without a value for the field are left out. Groups are sorted
/// by first choice, groups without any choice number last.
pub fn group_summary(matched: &[(ChoiceRow, MasterOption)], field: &str) -> Vec<GroupSummary> {
    let mut groups: Vec<GroupSummary> = Vec::new();
    for (choice, option) in matched.iter() {
        let value = if field == "TYPE" {
            Some(option.institute_type.label())
        } else {
            option.attribute(field)
        };
        let value = match value {
            Some(v) if !v.is_empty() => v,
            _ => continue,
        };
        let group = match groups.iter_mut().position(|g| g.value == value) {
            Some(idx) => &mut groups[idx],
            None => {
                groups.push(GroupSummary {
                    value: value.to_string(),
                    options_filled: 0,
                    first_choice: None,
                });
                let last = groups.len() - 1;
                &mut groups[last]
            }
        };
        group.options_filled += 1;
        group.first_choice = match (group.first_choice, choice.choice_number) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
    }
    groups.sort_by_key(|g| (g.first_choice.is_none(), g.first_choice));
    groups
}
