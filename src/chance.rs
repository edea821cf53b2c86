use log::{debug, info, log, warn, Level};

use seat_chance::*;
use snafu::{prelude::*, Snafu};

use std::fs;

use text_diff::print_diff;

use crate::args::Args;
use crate::chance::config_reader::*;
use crate::chance::report::*;
use crate::chance::session::Session;

pub mod config_reader;
mod io_common;
mod io_csv;
mod io_excel;
pub mod report;
pub mod session;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ChanceError {
    #[snafu(display("Error opening Excel file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("Excel file {path} has no worksheet"))]
    EmptyExcel { path: String },
    #[snafu(display("Worksheet {name:?} not found in {path}"))]
    MissingWorksheet { path: String, name: String },
    #[snafu(display(
        "Excel file {path} has several worksheets {names:?}, the worksheet name must be provided"
    ))]
    AmbiguousWorksheet { path: String, names: Vec<String> },
    #[snafu(display("Error opening CSV file {path}"))]
    OpeningCsv { source: csv::Error, path: String },
    #[snafu(display("Error reading line {lineno} of {path}"))]
    CsvLineParse {
        source: csv::Error,
        path: String,
        lineno: usize,
    },
    #[snafu(display("Error writing CSV data"))]
    WritingCsv { source: csv::Error },
    #[snafu(display("Error writing {path}"))]
    WritingOutput {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error opening configuration {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing configuration {path}"))]
    ParsingJson {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("Field {field} must be a positive whole number"))]
    ParsingJsonNumber { field: String },
    #[snafu(display("Error opening reference file {path}"))]
    OpeningReference {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Invalid table {path}: {source}"))]
    Schema { source: SchemaError, path: String },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type ChanceResult<T> = Result<T, ChanceError>;

/// Logs the progress of a batch, every `every` students.
pub struct LogProgress {
    pub every: usize,
}

impl LogProgress {
    // The last student and every `every`-th one are logged at the info level.
    fn level(&self, done: usize, total: usize) -> Level {
        if done == total || (self.every > 0 && done % self.every == 0) {
            Level::Info
        } else {
            Level::Debug
        }
    }
}

impl ProgressReporter for LogProgress {
    fn student_done(&mut self, done: usize, total: usize, student: &StudentRecord) {
        log!(
            self.level(done, total),
            "progress: {}/{} students (last: {:?})",
            done,
            total,
            student.student_id
        );
    }
}

/// Runs the full pipeline: loads the inputs, evaluates, writes the outputs and
/// optionally checks them against a reference.
pub fn run_seatchance(args: &Args) -> ChanceResult<()> {
    let settings = resolve_settings(args)?;

    let mut session = Session::new();
    let cancel = CancelToken::new();
    let mut progress = LogProgress { every: 100 };
    let output = session.run(&settings.request, &mut progress, &cancel)?;

    log_summary(output);

    let results_csv = results_to_csv(&output.results, output.is_choice_mode())?;
    let dest = settings
        .output_file
        .clone()
        .unwrap_or_else(|| "stdout".to_string());
    write_output(&dest, &results_csv)?;

    if let Some(report) = &output.choices {
        if let Some(p) = &settings.unmatched_file {
            write_output(p, &unmatched_to_csv(&report.join.unmatched)?)?;
        }
        if let Some(p) = &settings.validation_file {
            write_output(p, &validation_to_csv(&report.validation)?)?;
        }
    } else if settings.unmatched_file.is_some() || settings.validation_file.is_some() {
        warn!("run_seatchance: the unmatched and validation outputs only apply to a choice list");
    }

    // The reference results, if provided for comparison
    if let Some(reference_p) = &settings.reference {
        let reference = read_reference(reference_p)?;
        let reference = reference.replace("\r\n", "\n");
        if reference != results_csv {
            warn!("Found differences with the reference results");
            print_diff(reference.as_str(), results_csv.as_str(), "\n");
            whatever!("Difference detected between the results and the reference {}", reference_p)
        }
        info!("run_seatchance: the results match the reference {:?}", reference_p);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use snafu::ErrorCompat;

    fn run_test(test_name: &str, config_lpath: &str, reference_lpath: &str) {
        let test_dir = format!("{}/tests/data", env!("CARGO_MANIFEST_DIR"));
        info!("Running test {}", test_name);
        let args = Args {
            config: Some(format!("{}/{}/{}", test_dir, test_name, config_lpath)),
            reference: Some(format!("{}/{}/{}", test_dir, test_name, reference_lpath)),
            ..Args::default()
        };
        let res = run_seatchance(&args);
        if let Err(e) = res {
            warn!("run_test: {:?}", e);
            eprintln!("An error occurred: {}", e);
            if let Some(bt) = ErrorCompat::backtrace(&e) {
                eprintln!("trace: {}", bt);
            }
            panic!("test {} failed: {}", test_name, e);
        }
    }

    fn test_wrapper(test_name: &str) {
        run_test(
            test_name,
            format!("{}_config.json", test_name).as_str(),
            format!("{}_expected.csv", test_name).as_str(),
        )
    }

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn progress_level() {
        let progress = LogProgress { every: 100 };
        assert_eq!(progress.level(1, 250), Level::Debug);
        assert_eq!(progress.level(100, 250), Level::Info);
        assert_eq!(progress.level(200, 250), Level::Info);
        assert_eq!(progress.level(201, 250), Level::Debug);
        assert_eq!(progress.level(250, 250), Level::Info);

        let last_only = LogProgress { every: 0 };
        assert_eq!(last_only.level(100, 250), Level::Debug);
        assert_eq!(last_only.level(250, 250), Level::Info);
    }

    #[test]
    fn batch_sample() {
        init();
        test_wrapper("batch_sample");
    }

    #[test]
    fn choices_sample() {
        init();
        test_wrapper("choices_sample");
    }
}
