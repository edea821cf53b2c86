// A session keeps the outcome of the last successful run.

use seat_chance::insights::VerdictTally;
use seat_chance::schema::{read_choices, read_master, read_students, Table};
use seat_chance::verify::{order_ranges_by_program, validate_choices};
use seat_chance::verify::{ChoiceJoin, ChoiceValidation, ProgramRanges};

use crate::chance::io_common::{simplify_file_name, Provider};
use crate::chance::io_csv::read_csv_table;
use crate::chance::io_excel::read_excel_table;
use crate::chance::*;

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct SourceSpec {
    pub path: String,
    pub provider: Provider,
    pub worksheet: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub enum Workload {
    /// Every student of the batch against every option.
    Batch { students: SourceSpec },
    /// One student against a filled choice list.
    Choices {
        choices: SourceSpec,
        profile: StudentRecord,
    },
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RunRequest {
    pub master: SourceSpec,
    pub workload: Workload,
}

/// Only filled for a choice list.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ChoiceReport {
    pub join: ChoiceJoin,
    pub validation: ChoiceValidation,
    pub program_ranges: Vec<ProgramRanges>,
}

#[derive(PartialEq, Debug, Clone)]
pub struct RunOutput {
    pub master: MasterTable,
    pub results: Vec<EvaluationResult>,
    pub students_processed: usize,
    pub cancelled: bool,
    pub choices: Option<ChoiceReport>,
    pub tally: VerdictTally,
}

impl RunOutput {
    pub fn is_choice_mode(&self) -> bool {
        self.choices.is_some()
    }
}

pub fn load_table(src: &SourceSpec) -> ChanceResult<Table> {
    info!(
        "load_table: reading {:?} ({:?})",
        simplify_file_name(&src.path),
        src.provider
    );
    match src.provider {
        Provider::Csv => read_csv_table(&src.path),
        Provider::Xlsx => read_excel_table(&src.path, src.worksheet.as_deref()),
    }
}

fn load_master(src: &SourceSpec) -> ChanceResult<MasterTable> {
    let table = load_table(src)?;
    let master = read_master(&table).context(SchemaSnafu { path: src.path.as_str() })?;
    info!(
        "load_master: {} options, cutoff columns: {:?}",
        master.options.len(),
        master.labels.iter().map(|l| l.name()).collect::<Vec<&str>>()
    );
    Ok(master)
}

/// Holds the most recent successful [`RunOutput`].
#[derive(Default)]
pub struct Session {
    last: Option<RunOutput>,
}

impl Session {
    pub fn new() -> Session {
        Session::default()
    }

    pub fn last(&self) -> Option<&RunOutput> {
        self.last.as_ref()
    }

    /// Loads the inputs and evaluates them.
    ///
    /// A master table that cannot be loaded invalidates the previous output.
    /// Any other failure leaves it in place.
    pub fn run(
        &mut self,
        request: &RunRequest,
        progress: &mut dyn ProgressReporter,
        cancel: &CancelToken,
    ) -> ChanceResult<&RunOutput> {
        let master = match load_master(&request.master) {
            Ok(m) => m,
            Err(e) => {
                if self.last.take().is_some() {
                    warn!("run: the master table failed to load, clearing the previous results");
                }
                return Err(e);
            }
        };

        let output = match &request.workload {
            Workload::Batch { students } => {
                let table = load_table(students)?;
                let records =
                    read_students(&table).context(SchemaSnafu { path: students.path.as_str() })?;
                let outcome = run_batch(&records, &master, progress, cancel);
                let tally = VerdictTally::from_results(&outcome.results);
                RunOutput {
                    master,
                    results: outcome.results,
                    students_processed: outcome.students_processed,
                    cancelled: outcome.cancelled,
                    choices: None,
                    tally,
                }
            }
            Workload::Choices { choices, profile } => {
                let table = load_table(choices)?;
                let rows =
                    read_choices(&table).context(SchemaSnafu { path: choices.path.as_str() })?;
                let evaluation = evaluate_choices(profile, &rows, &master);
                let report = ChoiceReport {
                    validation: validate_choices(&rows, &master),
                    program_ranges: order_ranges_by_program(&evaluation.join.matched),
                    join: evaluation.join,
                };
                let tally = VerdictTally::from_results(&evaluation.results);
                progress.student_done(1, 1, profile);
                RunOutput {
                    master,
                    results: evaluation.results,
                    students_processed: 1,
                    cancelled: false,
                    choices: Some(report),
                    tally,
                }
            }
        };
        info!("run: {}", output.tally);
        Ok(self.last.insert(output))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_file(name: &str, content: &str) -> String {
        let p: PathBuf = std::env::temp_dir().join(format!("seatchance_session_{}", name));
        fs::write(&p, content).unwrap();
        p.display().to_string()
    }

    fn csv_source(path: &str) -> SourceSpec {
        SourceSpec {
            path: path.to_string(),
            provider: Provider::Csv,
            worksheet: None,
        }
    }

    const MASTER: &str = "College Code,Course Code,Type,Program,OC_GEN,SC_GEN\n\
        101,4110,IIT,Computer Science,300,2000\n\
        202,4110,NIT,Computer Science,1500,9000\n";

    const STUDENTS: &str = "NAME,STUDENT_ID,GENDER,CATEGORY,JEE_ADVACED_CRL_RANK,JEE_ADVNCED_CATEGORY_RANK,JEE_MAIN_CRL_RANK,JEE_MAIN_CATEGORY_RANK\n\
        Ravi,S1,M,OC,250,,1600,\n";

    #[test]
    fn failures_and_the_cache() {
        let master = temp_file("master.csv", MASTER);
        let students = temp_file("students.csv", STUDENTS);
        let bad_students = temp_file("bad_students.csv", "NAME,STUDENT_ID\nRavi,S1\n");
        let bad_master = temp_file("bad_master.csv", "COLLEGE_CODE,COURSE_CODE\n101,4110\n");

        let mut session = Session::new();
        let request = RunRequest {
            master: csv_source(&master),
            workload: Workload::Batch {
                students: csv_source(&students),
            },
        };
        let out = session
            .run(&request, &mut NoProgress, &CancelToken::new())
            .unwrap();
        assert_eq!(out.results.len(), 2);
        assert_eq!(out.tally.likely, 1);
        assert_eq!(out.tally.unlikely, 1);
        assert!(!out.is_choice_mode());

        // A bad student file keeps the previous results.
        let request_bad_students = RunRequest {
            master: csv_source(&master),
            workload: Workload::Batch {
                students: csv_source(&bad_students),
            },
        };
        let res = session.run(&request_bad_students, &mut NoProgress, &CancelToken::new());
        assert!(matches!(res, Err(ChanceError::Schema { .. })));
        assert_eq!(session.last().map(|o| o.results.len()), Some(2));

        // A bad master file clears them.
        let request_bad_master = RunRequest {
            master: csv_source(&bad_master),
            workload: Workload::Batch {
                students: csv_source(&students),
            },
        };
        let res = session.run(&request_bad_master, &mut NoProgress, &CancelToken::new());
        assert!(matches!(res, Err(ChanceError::Schema { .. })));
        assert!(session.last().is_none());

        for p in [master, students, bad_students, bad_master] {
            fs::remove_file(p).unwrap();
        }
    }

    #[test]
    fn choice_list_run() {
        let master = temp_file("choices_master.csv", MASTER);
        let choices = temp_file(
            "choices.csv",
            ",Institute,,Program,Choice No.\n\
             202,NIT X,4110,Computer Science,1\n\
             999,Unknown,1,Other,2\n\
             101,IIT Y,4110,Computer Science,3\n",
        );
        let profile = StudentRecord {
            student_id: "S9".to_string(),
            name: "Asha".to_string(),
            gender: Gender::Fem,
            category: Category::Sc,
            advanced: StageRanks {
                crl: None,
                category: Some(2500),
            },
            mains: StageRanks {
                crl: None,
                category: Some(800),
            },
        };
        let mut session = Session::new();
        let request = RunRequest {
            master: csv_source(&master),
            workload: Workload::Choices {
                choices: csv_source(&choices),
                profile,
            },
        };
        let out = session
            .run(&request, &mut NoProgress, &CancelToken::new())
            .unwrap();
        assert!(out.is_choice_mode());
        let verdicts: Vec<(Option<u32>, Verdict)> = out
            .results
            .iter()
            .map(|r| (r.choice_number, r.verdict))
            .collect();
        assert_eq!(
            verdicts,
            vec![(Some(1), Verdict::Likely), (Some(3), Verdict::Unlikely)]
        );
        let report = out.choices.as_ref().unwrap();
        assert_eq!(report.join.matched.len(), out.results.len());
        assert_eq!(report.join.unmatched.len(), 1);
        assert_eq!(report.validation.missing_in_master.len(), 1);
        assert_eq!(report.program_ranges[0].choice_ranges, "1, 3");

        fs::remove_file(master).unwrap();
        fs::remove_file(choices).unwrap();
    }
}
