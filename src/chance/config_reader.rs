use crate::args::Args;
use crate::chance::io_common::Provider;
use crate::chance::session::{RunRequest, SourceSpec, Workload};
use crate::chance::*;

use seat_chance::normalize::parse_rank;
use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;
use std::path::{Path, PathBuf};

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct FileSource {
    #[serde(rename = "filePath")]
    pub file_path: String,
    pub provider: Option<String>,
    #[serde(rename = "excelWorksheetName")]
    pub excel_worksheet_name: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize, Default)]
pub struct OutputSettings {
    #[serde(rename = "outputFile")]
    pub output_file: Option<String>,
    #[serde(rename = "unmatchedFile")]
    pub unmatched_file: Option<String>,
    #[serde(rename = "validationFile")]
    pub validation_file: Option<String>,
}

/// The candidate profile used with a choice list.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize, Default)]
pub struct StudentProfile {
    #[serde(rename = "studentId")]
    pub student_id: Option<String>,
    pub name: Option<String>,
    pub category: Option<String>,
    pub gender: Option<String>,
    #[serde(rename = "advancedCrlRank")]
    pub advanced_crl_rank: Option<JSValue>,
    #[serde(rename = "advancedCategoryRank")]
    pub advanced_category_rank: Option<JSValue>,
    #[serde(rename = "mainsCrlRank")]
    pub mains_crl_rank: Option<JSValue>,
    #[serde(rename = "mainsCategoryRank")]
    pub mains_category_rank: Option<JSValue>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ChanceConfig {
    #[serde(rename = "masterFile")]
    pub master_file: Option<FileSource>,
    #[serde(rename = "studentFile")]
    pub student_file: Option<FileSource>,
    pub mode: Option<String>,
    pub student: Option<StudentProfile>,
    #[serde(rename = "outputSettings")]
    pub output_settings: Option<OutputSettings>,
}

/// Everything needed for a run, after merging the configuration file and the
/// command line.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Settings {
    pub request: RunRequest,
    /// `None` or `stdout` prints the results.
    pub output_file: Option<String>,
    pub unmatched_file: Option<String>,
    pub validation_file: Option<String>,
    pub reference: Option<String>,
}

pub fn read_config(path: &str) -> ChanceResult<ChanceConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let config: ChanceConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu { path })?;
    debug!("read_config: {:?}", config);
    Ok(config)
}

pub fn read_reference(path: &str) -> ChanceResult<String> {
    fs::read_to_string(path).context(OpeningReferenceSnafu { path })
}

fn read_js_rank(field: &str, x: &Option<JSValue>) -> ChanceResult<Option<u64>> {
    match x {
        None | Some(JSValue::Null) => Ok(None),
        Some(JSValue::Number(n)) => n
            .as_u64()
            .filter(|x| *x > 0)
            .map(Some)
            .context(ParsingJsonNumberSnafu { field }),
        Some(JSValue::String(s)) if s.trim().is_empty() => Ok(None),
        Some(JSValue::String(s)) => parse_rank(s)
            .map(Some)
            .context(ParsingJsonNumberSnafu { field }),
        _ => None.context(ParsingJsonNumberSnafu { field }),
    }
}

fn resolve_path(root: &Option<PathBuf>, file_path: &str) -> String {
    match root {
        Some(r) => r.join(file_path).display().to_string(),
        None => file_path.to_string(),
    }
}

fn resolve_source(root: &Option<PathBuf>, fs_o: &Option<FileSource>) -> Option<(String, FileSource)> {
    fs_o.as_ref()
        .map(|cfs| (resolve_path(root, &cfs.file_path), cfs.clone()))
}

fn build_profile(profile: &StudentProfile, args: &Args) -> ChanceResult<StudentRecord> {
    let category = match args.category.as_ref().or(profile.category.as_ref()) {
        Some(c) => Category::parse(c),
        None => whatever!("The choices mode needs the student category (--category or student.category)"),
    };
    if let Category::Unrecognized(c) = &category {
        warn!("build_profile: unrecognized category {:?}: no cutoff column will apply", c);
    }
    let gender = Gender::parse(
        args.gender
            .as_ref()
            .or(profile.gender.as_ref())
            .map(|s| s.as_str())
            .unwrap_or("GEN"),
    );
    let rank = |flag: Option<u64>, field: &str, js: &Option<JSValue>| -> ChanceResult<Option<u64>> {
        match flag {
            Some(x) if x > 0 => Ok(Some(x)),
            Some(_) => ParsingJsonNumberSnafu { field }.fail(),
            None => read_js_rank(field, js),
        }
    };
    Ok(StudentRecord {
        student_id: args
            .student_id
            .clone()
            .or_else(|| profile.student_id.clone())
            .unwrap_or_else(|| "N/A".to_string()),
        name: args
            .name
            .clone()
            .or_else(|| profile.name.clone())
            .unwrap_or_else(|| "N/A".to_string()),
        gender,
        category,
        advanced: StageRanks {
            crl: rank(args.advanced_crl_rank, "advancedCrlRank", &profile.advanced_crl_rank)?,
            category: rank(
                args.advanced_category_rank,
                "advancedCategoryRank",
                &profile.advanced_category_rank,
            )?,
        },
        mains: StageRanks {
            crl: rank(args.mains_crl_rank, "mainsCrlRank", &profile.mains_crl_rank)?,
            category: rank(
                args.mains_category_rank,
                "mainsCategoryRank",
                &profile.mains_category_rank,
            )?,
        },
    })
}

/// Merges the command line with the configuration file, if any. The command
/// line takes precedence. Paths from the configuration file are relative to
/// its directory.
pub fn resolve_settings(args: &Args) -> ChanceResult<Settings> {
    let (config, root): (ChanceConfig, Option<PathBuf>) = match &args.config {
        Some(config_path) => {
            let config = read_config(config_path)?;
            let root = Path::new(config_path).parent().map(|p| p.to_path_buf());
            (config, root)
        }
        None => (
            ChanceConfig {
                master_file: None,
                student_file: None,
                mode: None,
                student: None,
                output_settings: None,
            },
            None,
        ),
    };

    let config_master = resolve_source(&root, &config.master_file);
    let master_path = match (&args.master, &config_master) {
        (Some(p), _) => p.clone(),
        (None, Some((p, _))) => p.clone(),
        (None, None) => whatever!("No master file: use --master or masterFile in the configuration"),
    };
    let master_cfs = config_master.map(|(_, cfs)| cfs);
    let master = SourceSpec {
        provider: Provider::detect(
            master_cfs.as_ref().and_then(|c| c.provider.as_deref()),
            &master_path,
        )?,
        worksheet: master_cfs.and_then(|c| c.excel_worksheet_name),
        path: master_path,
    };

    let config_input = resolve_source(&root, &config.student_file);
    let input_path = match (&args.input, &config_input) {
        (Some(p), _) => p.clone(),
        (None, Some((p, _))) => p.clone(),
        (None, None) => whatever!("No input file: use --input or studentFile in the configuration"),
    };
    let input_cfs = config_input.map(|(_, cfs)| cfs);
    let input = SourceSpec {
        provider: Provider::detect(
            args.input_type
                .as_deref()
                .or_else(|| input_cfs.as_ref().and_then(|c| c.provider.as_deref())),
            &input_path,
        )?,
        worksheet: args
            .excel_worksheet_name
            .clone()
            .or_else(|| input_cfs.and_then(|c| c.excel_worksheet_name)),
        path: input_path,
    };

    let mode = args
        .mode
        .clone()
        .or_else(|| config.mode.clone())
        .unwrap_or_else(|| "batch".to_string());
    let workload = match mode.trim().to_lowercase().as_str() {
        "batch" => Workload::Batch { students: input },
        "choices" => {
            let profile = build_profile(&config.student.clone().unwrap_or_default(), args)?;
            Workload::Choices {
                choices: input,
                profile,
            }
        }
        x => whatever!("Unknown mode {:?}: expected batch or choices", x),
    };

    let output_settings = config.output_settings.clone().unwrap_or_default();
    let settings = Settings {
        request: RunRequest { master, workload },
        output_file: args
            .out
            .as_deref()
            .map(|p| resolve_output(&None, p))
            .or_else(|| output_settings.output_file.map(|p| resolve_output(&root, &p))),
        unmatched_file: args
            .unmatched_out
            .as_deref()
            .map(|p| resolve_output(&None, p))
            .or_else(|| output_settings.unmatched_file.map(|p| resolve_output(&root, &p))),
        validation_file: output_settings
            .validation_file
            .map(|p| resolve_output(&root, &p)),
        reference: args.reference.clone(),
    };
    info!("resolve_settings: {:?}", settings);
    Ok(settings)
}

// An empty destination is the standard output.
fn resolve_output(root: &Option<PathBuf>, p: &str) -> String {
    match p.trim() {
        "" | "stdout" => "stdout".to_string(),
        _ => resolve_path(root, p),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn config_keys_are_camel_case() {
        let js = r#"{
            "masterFile": {"filePath": "master.xlsx", "excelWorksheetName": "2024"},
            "studentFile": {"filePath": "choices.csv", "provider": "csv"},
            "mode": "choices",
            "student": {"category": "SC", "gender": "FEM", "advancedCategoryRank": 500, "mainsCategoryRank": "900"},
            "outputSettings": {"outputFile": "out/results.csv"}
        }"#;
        let config: ChanceConfig = serde_json::from_str(js).unwrap();
        let master = config.master_file.unwrap();
        assert_eq!(master.excel_worksheet_name.as_deref(), Some("2024"));
        assert_eq!(master.provider, None);
        let student = config.student.unwrap();
        assert_eq!(
            read_js_rank("advancedCategoryRank", &student.advanced_category_rank).unwrap(),
            Some(500)
        );
        assert_eq!(
            read_js_rank("mainsCategoryRank", &student.mains_category_rank).unwrap(),
            Some(900)
        );
        assert_eq!(read_js_rank("mainsCrlRank", &student.mains_crl_rank).unwrap(), None);
    }

    #[test]
    fn bad_rank_in_profile_is_an_error() {
        let js: Option<JSValue> = Some(serde_json::json!(-4));
        assert!(matches!(
            read_js_rank("mainsCrlRank", &js),
            Err(ChanceError::ParsingJsonNumber { .. })
        ));
        let js: Option<JSValue> = Some(serde_json::json!("first"));
        assert!(read_js_rank("mainsCrlRank", &js).is_err());
    }

    #[test]
    fn command_line_alone_is_enough() {
        let args = Args::parse_from([
            "seatchance",
            "--master",
            "m.xlsx",
            "--input",
            "c.csv",
            "--mode",
            "choices",
            "--category",
            "obc",
            "--gender",
            "FEM",
            "--mains-category-rank",
            "1200",
        ]);
        let s = resolve_settings(&args).unwrap();
        assert_eq!(s.request.master.path, "m.xlsx");
        assert_eq!(s.request.master.provider, Provider::Xlsx);
        assert_eq!(s.output_file, None);
        match s.request.workload {
            Workload::Choices { choices, profile } => {
                assert_eq!(choices.provider, Provider::Csv);
                assert_eq!(profile.category, Category::Obc);
                assert_eq!(profile.gender, Gender::Fem);
                assert_eq!(profile.mains.category, Some(1200));
                assert_eq!(profile.advanced.category, None);
            }
            other => panic!("expected the choices mode, got {:?}", other),
        }
    }

    #[test]
    fn choices_mode_needs_a_category() {
        let args = Args::parse_from([
            "seatchance",
            "--master",
            "m.csv",
            "--input",
            "c.csv",
            "--mode",
            "choices",
        ]);
        assert!(resolve_settings(&args).is_err());
    }

    #[test]
    fn empty_output_is_stdout() {
        let args = Args::parse_from([
            "seatchance",
            "--master",
            "m.csv",
            "--input",
            "s.csv",
            "--out",
            "",
            "--unmatched-out",
            "stdout",
        ]);
        let s = resolve_settings(&args).unwrap();
        assert_eq!(s.output_file.as_deref(), Some("stdout"));
        assert_eq!(s.unmatched_file.as_deref(), Some("stdout"));

        let root = Some(PathBuf::from("data"));
        assert_eq!(resolve_output(&root, " "), "stdout");
        assert_eq!(
            resolve_output(&root, "out.csv"),
            PathBuf::from("data").join("out.csv").display().to_string()
        );
    }

    #[test]
    fn unknown_mode_is_an_error() {
        let args = Args::parse_from(["seatchance", "--master", "m.csv", "--input", "c.csv", "--mode", "all"]);
        assert!(resolve_settings(&args).is_err());
    }
}
