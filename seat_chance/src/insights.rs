// Descriptive statistics over master options and evaluation results.

use std::collections::BTreeMap;

use crate::config::*;

/// Summary of the published values of one cutoff column.
#[derive(PartialEq, Debug, Clone)]
pub struct CutoffStats {
    pub label: CutoffLabel,
    /// Number of options with a value.
    pub count: usize,
    pub mean: f64,
    pub min: u64,
    pub max: u64,
}

/// Statistics for each cutoff label that has at least one value, in label
/// order.
pub fn cutoff_statistics<'a, I>(options: I) -> Vec<CutoffStats>
where
    I: IntoIterator<Item = &'a MasterOption>,
{
    let mut values: BTreeMap<CutoffLabel, Vec<u64>> = BTreeMap::new();
    for o in options {
        for (label, value) in o.cutoffs.present() {
            values.entry(label).or_default().push(value);
        }
    }
    values
        .into_iter()
        .filter_map(|(label, vals)| {
            let min = *vals.iter().min()?;
            let max = *vals.iter().max()?;
            let total: f64 = vals.iter().map(|v| *v as f64).sum();
            Some(CutoffStats {
                label,
                count: vals.len(),
                mean: total / (vals.len() as f64),
                min,
                max,
            })
        })
        .collect()
}

/// [`cutoff_statistics`] for each institute type, in order of first
/// appearance.
pub fn cutoff_statistics_by_type(options: &[MasterOption]) -> Vec<(InstituteType, Vec<CutoffStats>)> {
    let mut types: Vec<InstituteType> = Vec::new();
    for o in options.iter() {
        if !types.contains(&o.institute_type) {
            types.push(o.institute_type.clone());
        }
    }
    types
        .into_iter()
        .map(|t| {
            let stats = cutoff_statistics(options.iter().filter(|o| o.institute_type == t));
            (t, stats)
        })
        .collect()
}

/// True if at least one option publishes a cutoff in the candidate's own
/// category columns (female or gender-neutral).
///
/// Always false for open and unrecognized categories: there is no
/// reservation to use.
pub fn category_match(category: &Category, options: &[MasterOption]) -> bool {
    if category.is_open() {
        return false;
    }
    let own: Vec<CutoffLabel> = [Gender::Fem, Gender::Gen]
        .iter()
        .filter_map(|g| CutoffLabel::for_category(category, *g))
        .collect();
    options
        .iter()
        .any(|o| own.iter().any(|l| o.cutoffs.get(*l).is_some()))
}

/// Number of results per verdict.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Default)]
pub struct VerdictTally {
    pub likely: usize,
    pub unlikely: usize,
    pub no_cutoff_data: usize,
    pub rank_missing: usize,
}

impl VerdictTally {
    pub fn from_results(results: &[EvaluationResult]) -> VerdictTally {
        let mut tally = VerdictTally::default();
        for r in results.iter() {
            match r.verdict {
                Verdict::Likely => tally.likely += 1,
                Verdict::Unlikely => tally.unlikely += 1,
                Verdict::NoCutoffData => tally.no_cutoff_data += 1,
                Verdict::RankMissing => tally.rank_missing += 1,
            }
        }
        tally
    }

    pub fn total(&self) -> usize {
        self.likely + self.unlikely + self.no_cutoff_data + self.rank_missing
    }
}

impl std::fmt::Display for VerdictTally {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} results: {} LIKELY, {} UNLIKELY, {} NO_CUTOFF_DATA, {} RANK_MISSING",
            self.total(),
            self.likely,
            self.unlikely,
            self.no_cutoff_data,
            self.rank_missing
        )
    }
}
