mod config;
pub mod builder;
pub mod insights;
pub mod manual;
pub mod normalize;
pub mod resolver;
pub mod schema;
pub mod verify;

use log::{debug, info};

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

pub use crate::config::*;
pub use crate::resolver::eligible_columns;
use crate::verify::{join_choices, ChoiceJoin};

/// A flag to interrupt a batch between two students.
///
/// Clones share the same flag, so one copy can be handed to whatever decides
/// to stop the run.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> CancelToken {
        CancelToken::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Receives progress notifications during a batch.
///
/// It is purely observational: nothing it does changes the results.
pub trait ProgressReporter {
    fn student_done(&mut self, done: usize, total: usize, student: &StudentRecord);
}

/// Ignores all the progress notifications.
pub struct NoProgress;

impl ProgressReporter for NoProgress {
    fn student_done(&mut self, _done: usize, _total: usize, _student: &StudentRecord) {}
}

/// Evaluates one (student, option) pair.
///
/// Returns `None` for institutes outside the allocation. Every other pair
/// gets a result: missing ranks and missing cutoffs are verdicts, not errors.
pub fn evaluate_option(
    student: &StudentRecord,
    eligible: &[CutoffLabel],
    option: &MasterOption,
    choice_number: Option<u32>,
) -> Option<EvaluationResult> {
    let rank_stage = option.institute_type.rank_stage()?;
    let applicable_rank = student.stage_rank(rank_stage);

    let considered_cutoffs: Vec<ConsideredCutoff> = if applicable_rank.is_some() {
        eligible
            .iter()
            .filter_map(|label| {
                option
                    .cutoffs
                    .get(*label)
                    .map(|value| ConsideredCutoff {
                        label: *label,
                        value,
                    })
            })
            .collect()
    } else {
        Vec::new()
    };
    // The reference closing rank is the lowest eligible one.
    let best_eligible_cutoff = considered_cutoffs.iter().map(|c| c.value).min();

    let verdict = match (applicable_rank, best_eligible_cutoff) {
        (None, _) => Verdict::RankMissing,
        (Some(_), None) => Verdict::NoCutoffData,
        (Some(rank), Some(cutoff)) if rank <= cutoff => Verdict::Likely,
        (Some(_), Some(_)) => Verdict::Unlikely,
    };

    Some(EvaluationResult {
        student_id: student.student_id.clone(),
        student_name: student.name.clone(),
        student_category: student.category.clone(),
        student_gender: student.gender,
        institute_type: option.institute_type.clone(),
        college_code: option.college_code.clone(),
        course_code: option.course_code.clone(),
        main_code: option.main_code.clone(),
        program_name: option.program_name().to_string(),
        choice_number,
        rank_stage,
        applicable_rank,
        best_eligible_cutoff,
        considered_cutoffs,
        verdict,
    })
}

/// Evaluates a student against a list of options, in the order of the options.
///
/// Arguments:
/// * `student` the candidate
/// * `eligible` the cutoff columns the candidate may be compared against, as
/// returned by [`eligible_columns`]
/// * `options` the options to evaluate. Options outside the allocation are
/// skipped.
pub fn evaluate(
    student: &StudentRecord,
    eligible: &[CutoffLabel],
    options: &[MasterOption],
) -> Vec<EvaluationResult> {
    options
        .iter()
        .filter_map(|o| evaluate_option(student, eligible, o, None))
        .collect()
}

/// Evaluates a student against every option of the master table.
pub fn evaluate_student(student: &StudentRecord, master: &MasterTable) -> Vec<EvaluationResult> {
    let eligible = eligible_columns(&student.category, student.gender, &master.labels);
    evaluate(student, &eligible, &master.options)
}

/// Runs the evaluation for a batch of students against the whole master table.
///
/// The results are ordered by student, then by master row. The cancellation
/// token is checked before each student: an interrupted run returns the
/// complete results of the students processed so far.
pub fn run_batch(
    students: &[StudentRecord],
    master: &MasterTable,
    progress: &mut dyn ProgressReporter,
    cancel: &CancelToken,
) -> BatchOutcome {
    info!(
        "run_batch: processing {} students against {} options",
        students.len(),
        master.options.len()
    );
    let mut results: Vec<EvaluationResult> = Vec::new();
    let mut students_processed: usize = 0;
    for student in students.iter() {
        if cancel.is_cancelled() {
            info!(
                "run_batch: cancelled after {} of {} students",
                students_processed,
                students.len()
            );
            return BatchOutcome {
                results,
                students_processed,
                cancelled: true,
            };
        }
        let mut student_results = evaluate_student(student, master);
        debug!(
            "run_batch: student {:?}: {} results",
            student.student_id,
            student_results.len()
        );
        results.append(&mut student_results);
        students_processed += 1;
        progress.student_done(students_processed, students.len(), student);
    }
    BatchOutcome {
        results,
        students_processed,
        cancelled: false,
    }
}

/// The evaluation of a filled choice list.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ChoiceEvaluation {
    /// In the order of the choice list.
    pub results: Vec<EvaluationResult>,
    /// The join the results come from. A choice whose key maps to several
    /// options has a result for each of them.
    pub join: ChoiceJoin,
}

/// Evaluates the choice list of a single student.
///
/// This is the same evaluation as for a batch, restricted to the options the
/// student picked.
pub fn evaluate_choices(
    student: &StudentRecord,
    choices: &[ChoiceRow],
    master: &MasterTable,
) -> ChoiceEvaluation {
    let eligible = eligible_columns(&student.category, student.gender, &master.labels);
    let joined = join_choices(choices, master);
    let results: Vec<EvaluationResult> = joined
        .matched
        .iter()
        .filter_map(|(choice, option)| {
            evaluate_option(student, &eligible, option, choice.choice_number)
        })
        .collect();
    ChoiceEvaluation {
        results,
        join: joined,
    }
}

#[cfg(test)]
mod tests {
    use super::builder::MasterTableBuilder;
    use super::*;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn student(category: &str, gender: &str, advanced: Option<u64>, mains: Option<u64>) -> StudentRecord {
        StudentRecord {
            student_id: format!("{}-{}", category, gender),
            name: "Test".to_string(),
            gender: Gender::parse(gender),
            category: Category::parse(category),
            advanced: StageRanks {
                crl: advanced,
                category: advanced,
            },
            mains: StageRanks {
                crl: mains,
                category: mains,
            },
        }
    }

    fn single(option_type: &str, cutoffs: &[(CutoffLabel, u64)]) -> MasterTable {
        let mut b = MasterTableBuilder::new(CutoffLabel::ALL.to_vec());
        b.add_simple("101", "4110", option_type, cutoffs);
        b.build()
    }

    #[test]
    fn reserved_female_uses_the_lowest_eligible_cutoff() {
        init();
        let s = student("SC", "FEM", Some(500), None);
        let m = single(
            "IIT",
            &[
                (CutoffLabel::ScFem, 600),
                (CutoffLabel::ScGen, 550),
                (CutoffLabel::OcGen, 300),
            ],
        );
        let res = evaluate_student(&s, &m);
        assert_eq!(res.len(), 1);
        let r = &res[0];
        assert_eq!(r.rank_stage, RankStage::Advanced);
        assert_eq!(r.applicable_rank, Some(500));
        assert_eq!(r.best_eligible_cutoff, Some(300));
        assert_eq!(r.verdict, Verdict::Unlikely);
        assert_eq!(r.considered_display(), "SC_FEM: 600, SC_GEN: 550, OC_GEN: 300");
    }

    #[test]
    fn single_female_pool_cutoff_is_likely() {
        let s = student("SC", "FEM", Some(500), None);
        let m = single("IIT", &[(CutoffLabel::ScFem, 600)]);
        let r = &evaluate_student(&s, &m)[0];
        assert_eq!(r.best_eligible_cutoff, Some(600));
        assert_eq!(r.verdict, Verdict::Likely);
    }

    #[test]
    fn tie_is_likely() {
        let s = student("OC", "GEN", None, Some(1500));
        let m = single("NIT", &[(CutoffLabel::OcGen, 1500)]);
        let r = &evaluate_student(&s, &m)[0];
        assert_eq!(r.rank_stage, RankStage::Mains);
        assert_eq!(r.verdict, Verdict::Likely);
    }

    #[test]
    fn missing_stage_rank_is_reported() {
        let s = student("OBC", "GEN", None, Some(10));
        let m = single("IIT", &[(CutoffLabel::ObcGen, 100_000)]);
        let r = &evaluate_student(&s, &m)[0];
        assert_eq!(r.verdict, Verdict::RankMissing);
        assert_eq!(r.best_eligible_cutoff, None);
        assert!(r.considered_cutoffs.is_empty());
    }

    #[test]
    fn no_eligible_cutoff_is_reported() {
        let s = student("ST", "GEN", Some(10), Some(10));
        // Only a female pool cutoff: not eligible for this candidate.
        let m = single("IIIT", &[(CutoffLabel::StFem, 900)]);
        let r = &evaluate_student(&s, &m)[0];
        assert_eq!(r.verdict, Verdict::NoCutoffData);
        assert_eq!(r.best_eligible_cutoff, None);
    }

    #[test]
    fn ineligible_columns_never_lower_the_cutoff() {
        let s = student("OC", "GEN", None, Some(800));
        let m = single(
            "GFTI",
            &[
                (CutoffLabel::OcGen, 1000),
                (CutoffLabel::OcFem, 5),
                (CutoffLabel::ScGen, 1),
            ],
        );
        let r = &evaluate_student(&s, &m)[0];
        assert_eq!(r.best_eligible_cutoff, Some(1000));
        assert_eq!(r.verdict, Verdict::Likely);
    }

    #[test]
    fn other_institutes_are_skipped() {
        let s = student("OC", "GEN", Some(1), Some(1));
        let m = single("Private", &[(CutoffLabel::OcGen, 1000)]);
        assert!(evaluate_student(&s, &m).is_empty());
    }

    #[test]
    fn category_rank_applies_to_reserved_candidates() {
        let mut s = student("EWS", "GEN", None, None);
        s.mains = StageRanks {
            crl: Some(20_000),
            category: Some(2_000),
        };
        let m = single("NIT", &[(CutoffLabel::EwsGen, 2_500)]);
        let r = &evaluate_student(&s, &m)[0];
        assert_eq!(r.applicable_rank, Some(2_000));
        assert_eq!(r.verdict, Verdict::Likely);
    }

    fn batch_fixture() -> (Vec<StudentRecord>, MasterTable) {
        let students = vec![
            student("OC", "GEN", Some(100), Some(1000)),
            student("SC", "FEM", Some(500), None),
            student("XYZ", "FEM", Some(5), Some(5)),
        ];
        let mut b = MasterTableBuilder::new(CutoffLabel::ALL.to_vec());
        b.add_simple("101", "4110", "IIT", &[(CutoffLabel::OcGen, 300)]);
        b.add_simple("900", "1", "Private", &[(CutoffLabel::OcGen, 300)]);
        b.add_simple("202", "4110", "NIT", &[(CutoffLabel::ScFem, 900)]);
        b.add_simple("303", "5110", "IIIT", &[]);
        (students, b.build())
    }

    #[test]
    fn batch_yields_students_times_options() {
        let (students, master) = batch_fixture();
        let out = run_batch(&students, &master, &mut NoProgress, &CancelToken::new());
        assert!(!out.cancelled);
        assert_eq!(out.students_processed, 3);
        // One option of four is outside the allocation.
        assert_eq!(out.results.len(), 3 * 3);
        let order: Vec<(&str, &str)> = out
            .results
            .iter()
            .map(|r| (r.student_id.as_str(), r.main_code.as_str()))
            .collect();
        assert_eq!(order[0], ("OC-GEN", "101_4110"));
        assert_eq!(order[1], ("OC-GEN", "202_4110"));
        assert_eq!(order[3], ("SC-FEM", "101_4110"));
        assert!(out
            .results
            .iter()
            .filter(|r| r.student_id == "XYZ-FEM")
            .all(|r| r.verdict == Verdict::NoCutoffData));
    }

    #[test]
    fn batch_is_idempotent() {
        let (students, master) = batch_fixture();
        let a = run_batch(&students, &master, &mut NoProgress, &CancelToken::new());
        let b = run_batch(&students, &master, &mut NoProgress, &CancelToken::new());
        assert_eq!(a, b);
    }

    struct CancelAfter {
        after: usize,
        token: CancelToken,
        seen: Vec<usize>,
    }

    impl ProgressReporter for CancelAfter {
        fn student_done(&mut self, done: usize, total: usize, _student: &StudentRecord) {
            assert_eq!(total, 3);
            self.seen.push(done);
            if done == self.after {
                self.token.cancel();
            }
        }
    }

    #[test]
    fn cancellation_keeps_complete_students() {
        let (students, master) = batch_fixture();
        let token = CancelToken::new();
        let mut progress = CancelAfter {
            after: 1,
            token: token.clone(),
            seen: vec![],
        };
        let out = run_batch(&students, &master, &mut progress, &token);
        assert!(out.cancelled);
        assert_eq!(out.students_processed, 1);
        assert_eq!(out.results.len(), 3);
        assert!(out.results.iter().all(|r| r.student_id == "OC-GEN"));
        assert_eq!(progress.seen, vec![1]);
    }

    #[test]
    fn choices_follow_the_list_and_report_misses() {
        let (_, master) = batch_fixture();
        let s = student("SC", "FEM", Some(500), Some(800));
        let choices = vec![
            ChoiceRow::new(Some(1), "202", "4110"),
            ChoiceRow::new(Some(2), "999", "1"),
            ChoiceRow::new(Some(3), "101", "4110"),
        ];
        let ev = evaluate_choices(&s, &choices, &master);
        assert_eq!(ev.results.len(), 2);
        assert_eq!(ev.results[0].choice_number, Some(1));
        assert_eq!(ev.results[0].verdict, Verdict::Likely);
        assert_eq!(ev.results[1].choice_number, Some(3));
        assert_eq!(ev.results[1].verdict, Verdict::Unlikely);
        assert_eq!(ev.join.matched.len(), 2);
        assert_eq!(ev.join.unmatched.len(), 1);
        assert_eq!(ev.join.unmatched[0].main_code, "999_1");
        assert!(ev.join.ambiguous.is_empty());
    }
}
