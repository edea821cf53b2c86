// Output tables and the summaries printed after a run.

use seat_chance::insights::{category_match, cutoff_statistics_by_type};
use seat_chance::verify::{group_summary, ChoiceValidation};

use crate::chance::session::RunOutput;
use crate::chance::*;

pub const RESULT_COLUMNS: [&str; 13] = [
    "Student_ID",
    "Student_Name",
    "Student_Category",
    "Student_Gender",
    "College_Type",
    "College_Code",
    "Program_Name",
    "Course_Code",
    "Student_Rank_Used",
    "Rank_Type",
    "Best_Eligible_Cutoff",
    "Considered_Cutoffs_for_Option",
    "Seat_Chance",
];

const NOT_AVAILABLE: &str = "N/A";

// Fields of the master table summarized for a choice list, when present.
const GROUP_FIELDS: [&str; 5] = ["TYPE", "COLLEGE", "PROGRAM_TYPE", "DEPARTMENT", "ORDER"];

fn opt_to_text<T: ToString>(x: Option<T>) -> String {
    x.map(|v| v.to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

fn result_record(r: &EvaluationResult, choice_mode: bool) -> Vec<String> {
    let mut rec: Vec<String> = Vec::with_capacity(RESULT_COLUMNS.len() + 1);
    if choice_mode {
        rec.push(opt_to_text(r.choice_number));
    }
    let considered = if r.considered_cutoffs.is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        r.considered_display()
    };
    rec.extend([
        r.student_id.clone(),
        r.student_name.clone(),
        r.student_category.to_string(),
        r.student_gender.to_string(),
        r.institute_type.to_string(),
        r.college_code.clone(),
        r.program_name.clone(),
        r.course_code.clone(),
        opt_to_text(r.applicable_rank),
        r.rank_stage.description().to_string(),
        opt_to_text(r.best_eligible_cutoff),
        considered,
        r.verdict.code().to_string(),
    ]);
    rec
}

fn to_csv_string(header: &[&str], records: &[Vec<String>]) -> ChanceResult<String> {
    let mut wtr = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(vec![]);
    wtr.write_record(header).context(WritingCsvSnafu {})?;
    for rec in records.iter() {
        wtr.write_record(rec).context(WritingCsvSnafu {})?;
    }
    let data = match wtr.into_inner() {
        Ok(d) => d,
        Err(e) => whatever!("Failed to flush the CSV data: {}", e),
    };
    match String::from_utf8(data) {
        Ok(s) => Ok(s),
        Err(e) => whatever!("The CSV data is not valid UTF-8: {}", e),
    }
}

/// The results as CSV text. The choice mode adds a leading `Choice_Number`
/// column.
pub fn results_to_csv(results: &[EvaluationResult], choice_mode: bool) -> ChanceResult<String> {
    let mut header: Vec<&str> = Vec::new();
    if choice_mode {
        header.push("Choice_Number");
    }
    header.extend(RESULT_COLUMNS);
    let records: Vec<Vec<String>> = results
        .iter()
        .map(|r| result_record(r, choice_mode))
        .collect();
    to_csv_string(&header, &records)
}

const CHOICE_COLUMNS: [&str; 5] = [
    "Choice_Number",
    "College_Code",
    "Course_Code",
    "Main_Code",
    "Program",
];

fn choice_record(c: &ChoiceRow) -> Vec<String> {
    vec![
        opt_to_text(c.choice_number),
        c.college_code.clone(),
        c.course_code.clone(),
        c.main_code.clone(),
        c.program.clone().unwrap_or_else(|| NOT_AVAILABLE.to_string()),
    ]
}

/// The choices that have no option in the master table.
pub fn unmatched_to_csv(unmatched: &[ChoiceRow]) -> ChanceResult<String> {
    let records: Vec<Vec<String>> = unmatched.iter().map(choice_record).collect();
    to_csv_string(&CHOICE_COLUMNS, &records)
}

/// All the findings of [`seat_chance::verify::validate_choices`], one per line.
pub fn validation_to_csv(validation: &ChoiceValidation) -> ChanceResult<String> {
    let mut header: Vec<&str> = vec!["Check"];
    header.extend(CHOICE_COLUMNS);
    let mut records: Vec<Vec<String>> = Vec::new();
    for c in validation.missing_in_master.iter() {
        let mut rec = vec!["MISSING_IN_MASTER".to_string()];
        rec.extend(choice_record(c));
        records.push(rec);
    }
    for c in validation.duplicate_choices.iter() {
        let mut rec = vec!["DUPLICATE_CHOICE".to_string()];
        rec.extend(choice_record(c));
        records.push(rec);
    }
    for o in validation.not_chosen.iter() {
        records.push(vec![
            "NOT_CHOSEN".to_string(),
            NOT_AVAILABLE.to_string(),
            o.college_code.clone(),
            o.course_code.clone(),
            o.main_code.clone(),
            o.program_name().to_string(),
        ]);
    }
    to_csv_string(&header, &records)
}

/// Writes to a file, or to the standard output for `stdout` or an empty
/// destination.
pub fn write_output(dest: &str, content: &str) -> ChanceResult<()> {
    if dest.trim().is_empty() || dest == "stdout" {
        print!("{}", content);
        return Ok(());
    }
    fs::write(dest, content).context(WritingOutputSnafu { path: dest })?;
    info!("write_output: wrote {:?}", dest);
    Ok(())
}

/// Logs the summaries of a run.
pub fn log_summary(output: &RunOutput) {
    info!(
        "summary: {} students processed{}: {}",
        output.students_processed,
        if output.cancelled { " (cancelled)" } else { "" },
        output.tally
    );
    for dup in output.master.duplicates.iter() {
        warn!(
            "summary: master key {:?} is ambiguous (rows {:?})",
            dup.main_code, dup.rows
        );
    }
    for (institute_type, stats) in cutoff_statistics_by_type(&output.master.options) {
        for s in stats.iter() {
            debug!(
                "summary: cutoffs {} {}: count: {} mean: {:.1} min: {} max: {}",
                institute_type, s.label, s.count, s.mean, s.min, s.max
            );
        }
    }

    let report = match &output.choices {
        Some(r) => r,
        None => return,
    };
    if let Some(student) = output.results.first() {
        let picked: Vec<MasterOption> = report.join.matched.iter().map(|(_, o)| o.clone()).collect();
        if !student.student_category.is_open() && !category_match(&student.student_category, &picked) {
            warn!(
                "summary: none of the choices publishes a {} cutoff: the reservation is not being used",
                student.student_category
            );
        }
    }
    for c in report.join.unmatched.iter() {
        warn!(
            "summary: choice {} ({:?}) is not in the master table",
            opt_to_text(c.choice_number),
            c.main_code
        );
    }
    for c in report.join.ambiguous.iter() {
        warn!(
            "summary: choice {} ({:?}) matches several master rows",
            opt_to_text(c.choice_number),
            c.main_code
        );
    }
    if report.validation.is_clean() {
        info!("summary: every choice is in the master table, with no repetition");
    } else if !report.validation.duplicate_choices.is_empty() {
        warn!(
            "summary: {} choices repeat a college and course already in the list",
            report.validation.duplicate_choices.len()
        );
    }
    for p in report.program_ranges.iter() {
        info!(
            "summary: program {:?}: {} options, choices {}",
            p.program, p.options_filled, p.choice_ranges
        );
    }
    for field in GROUP_FIELDS {
        for g in group_summary(&report.join.matched, field) {
            info!(
                "summary: {} {:?}: {} options, first choice {}",
                field,
                g.value,
                g.options_filled,
                opt_to_text(g.first_choice)
            );
        }
    }
}
