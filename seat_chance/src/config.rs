// ********* Input data structures ***********

use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::Display;

use crate::normalize::normalize_key;

/// Reservation category of a candidate.
///
/// Codes outside the five published ones are kept as `Unrecognized` so that a
/// single bad cell does not fail a whole batch. Such a category has no cutoff
/// column of its own.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub enum Category {
    Oc,
    Ews,
    Obc,
    Sc,
    St,
    Unrecognized(String),
}

impl Category {
    pub fn parse(s: &str) -> Category {
        match s.trim().to_uppercase().as_str() {
            "OC" => Category::Oc,
            "EWS" => Category::Ews,
            "OBC" => Category::Obc,
            "SC" => Category::Sc,
            "ST" => Category::St,
            _ => Category::Unrecognized(s.trim().to_string()),
        }
    }

    pub fn code(&self) -> &str {
        match self {
            Category::Oc => "OC",
            Category::Ews => "EWS",
            Category::Obc => "OBC",
            Category::Sc => "SC",
            Category::St => "ST",
            Category::Unrecognized(s) => s.as_str(),
        }
    }

    /// The open (unreserved) category.
    pub fn is_open(&self) -> bool {
        matches!(self, Category::Oc)
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// The seat pool gender. `Fem` is the female-supernumerary pool, `Gen` the
/// gender-neutral one.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum Gender {
    Gen,
    Fem,
}

impl Gender {
    /// Anything that is not `FEM` competes in the gender-neutral pool.
    pub fn parse(s: &str) -> Gender {
        if s.trim().eq_ignore_ascii_case("FEM") {
            Gender::Fem
        } else {
            Gender::Gen
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Gender::Gen => "GEN",
            Gender::Fem => "FEM",
        }
    }
}

impl Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// One of the ten category × gender cutoff columns of the master table.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub enum CutoffLabel {
    OcFem,
    OcGen,
    EwsFem,
    EwsGen,
    ObcFem,
    ObcGen,
    ScFem,
    ScGen,
    StFem,
    StGen,
}

impl CutoffLabel {
    /// All the labels, in the column order of the published master sheet.
    pub const ALL: [CutoffLabel; 10] = [
        CutoffLabel::OcFem,
        CutoffLabel::OcGen,
        CutoffLabel::EwsFem,
        CutoffLabel::EwsGen,
        CutoffLabel::ObcFem,
        CutoffLabel::ObcGen,
        CutoffLabel::ScFem,
        CutoffLabel::ScGen,
        CutoffLabel::StFem,
        CutoffLabel::StGen,
    ];

    pub fn for_category(category: &Category, gender: Gender) -> Option<CutoffLabel> {
        let label = match (category, gender) {
            (Category::Oc, Gender::Fem) => CutoffLabel::OcFem,
            (Category::Oc, Gender::Gen) => CutoffLabel::OcGen,
            (Category::Ews, Gender::Fem) => CutoffLabel::EwsFem,
            (Category::Ews, Gender::Gen) => CutoffLabel::EwsGen,
            (Category::Obc, Gender::Fem) => CutoffLabel::ObcFem,
            (Category::Obc, Gender::Gen) => CutoffLabel::ObcGen,
            (Category::Sc, Gender::Fem) => CutoffLabel::ScFem,
            (Category::Sc, Gender::Gen) => CutoffLabel::ScGen,
            (Category::St, Gender::Fem) => CutoffLabel::StFem,
            (Category::St, Gender::Gen) => CutoffLabel::StGen,
            (Category::Unrecognized(_), _) => return None,
        };
        Some(label)
    }

    /// The normalized column header, e.g. `SC_FEM`.
    pub fn name(&self) -> &'static str {
        match self {
            CutoffLabel::OcFem => "OC_FEM",
            CutoffLabel::OcGen => "OC_GEN",
            CutoffLabel::EwsFem => "EWS_FEM",
            CutoffLabel::EwsGen => "EWS_GEN",
            CutoffLabel::ObcFem => "OBC_FEM",
            CutoffLabel::ObcGen => "OBC_GEN",
            CutoffLabel::ScFem => "SC_FEM",
            CutoffLabel::ScGen => "SC_GEN",
            CutoffLabel::StFem => "ST_FEM",
            CutoffLabel::StGen => "ST_GEN",
        }
    }

    pub fn from_name(s: &str) -> Option<CutoffLabel> {
        CutoffLabel::ALL.iter().copied().find(|l| l.name() == s)
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl Display for CutoffLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// The closing ranks of one option, one optional value per label.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Default)]
pub struct CutoffTable([Option<u64>; 10]);

impl CutoffTable {
    pub const EMPTY: CutoffTable = CutoffTable([None; 10]);

    pub fn get(&self, label: CutoffLabel) -> Option<u64> {
        self.0[label.index()]
    }

    pub fn set(&mut self, label: CutoffLabel, value: Option<u64>) {
        self.0[label.index()] = value;
    }

    pub fn with(mut self, label: CutoffLabel, value: u64) -> CutoffTable {
        self.set(label, Some(value));
        self
    }

    /// The published values, in label order.
    pub fn present(&self) -> impl Iterator<Item = (CutoffLabel, u64)> + '_ {
        CutoffLabel::ALL
            .iter()
            .filter_map(move |l| self.get(*l).map(|v| (*l, v)))
    }
}

/// The stage of the entrance examination whose rank applies.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum RankStage {
    Advanced,
    Mains,
}

impl RankStage {
    pub fn description(&self) -> &'static str {
        match self {
            RankStage::Advanced => "JEE Advanced Rank",
            RankStage::Mains => "JEE Mains Rank",
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub enum InstituteType {
    Iit,
    Nit,
    Iiit,
    Gfti,
    /// Not part of the joint allocation. The raw label is kept for reports.
    Other(String),
}

impl InstituteType {
    pub fn parse(s: &str) -> InstituteType {
        match s.trim().to_uppercase().as_str() {
            "IIT" => InstituteType::Iit,
            "NIT" => InstituteType::Nit,
            "IIIT" => InstituteType::Iiit,
            "GFTI" => InstituteType::Gfti,
            _ => InstituteType::Other(s.trim().to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            InstituteType::Iit => "IIT",
            InstituteType::Nit => "NIT",
            InstituteType::Iiit => "IIIT",
            InstituteType::Gfti => "GFTI",
            InstituteType::Other(s) => s.as_str(),
        }
    }

    /// `None` for institutes outside the allocation: they are never evaluated.
    pub fn rank_stage(&self) -> Option<RankStage> {
        match self {
            InstituteType::Iit => Some(RankStage::Advanced),
            InstituteType::Nit | InstituteType::Iiit | InstituteType::Gfti => {
                Some(RankStage::Mains)
            }
            InstituteType::Other(_) => None,
        }
    }
}

impl Display for InstituteType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// One admission option: a course at a college.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct MasterOption {
    pub college_code: String,
    pub course_code: String,
    /// The join key, see [`normalize_key`].
    pub main_code: String,
    pub institute_type: InstituteType,
    pub cutoffs: CutoffTable,
    /// All the other columns of the master sheet (PROGRAM, COLLEGE, ...),
    /// keyed by normalized header.
    pub attributes: BTreeMap<String, String>,
}

impl MasterOption {
    pub fn new(college_code: &str, course_code: &str, institute_type: InstituteType) -> MasterOption {
        MasterOption {
            college_code: college_code.trim().to_string(),
            course_code: course_code.trim().to_string(),
            main_code: normalize_key(college_code, course_code),
            institute_type,
            cutoffs: CutoffTable::EMPTY,
            attributes: BTreeMap::new(),
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(|s| s.as_str())
    }

    pub fn program_name(&self) -> &str {
        self.attribute("PROGRAM").unwrap_or("N/A")
    }
}

/// A key that maps to several rows of the master table.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct DuplicateKey {
    pub main_code: String,
    /// Positions of the rows in the master table.
    pub rows: Vec<usize>,
}

/// The master table, as loaded for one session.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct MasterTable {
    pub options: Vec<MasterOption>,
    /// The cutoff columns that the source sheet actually provides.
    pub labels: Vec<CutoffLabel>,
    pub duplicates: Vec<DuplicateKey>,
}

#[derive(Eq, PartialEq, Debug, Clone, Copy, Default)]
pub struct StageRanks {
    pub crl: Option<u64>,
    pub category: Option<u64>,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct StudentRecord {
    pub student_id: String,
    pub name: String,
    pub gender: Gender,
    pub category: Category,
    pub advanced: StageRanks,
    pub mains: StageRanks,
}

impl StudentRecord {
    /// The rank compared at a given stage: the common rank list (CRL) rank
    /// for open candidates, the category rank otherwise.
    pub fn stage_rank(&self, stage: RankStage) -> Option<u64> {
        let ranks = match stage {
            RankStage::Advanced => self.advanced,
            RankStage::Mains => self.mains,
        };
        if self.category.is_open() {
            ranks.crl
        } else {
            ranks.category
        }
    }
}

/// One row of a student's filled choice list.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ChoiceRow {
    pub choice_number: Option<u32>,
    pub college_code: String,
    pub course_code: String,
    pub main_code: String,
    pub institute: Option<String>,
    pub program: Option<String>,
}

impl ChoiceRow {
    pub fn new(choice_number: Option<u32>, college_code: &str, course_code: &str) -> ChoiceRow {
        ChoiceRow {
            choice_number,
            college_code: college_code.trim().to_string(),
            course_code: course_code.trim().to_string(),
            main_code: normalize_key(college_code, course_code),
            institute: None,
            program: None,
        }
    }
}

// ******** Output data structures *********

#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum Verdict {
    Likely,
    Unlikely,
    NoCutoffData,
    RankMissing,
}

impl Verdict {
    pub fn code(&self) -> &'static str {
        match self {
            Verdict::Likely => "LIKELY",
            Verdict::Unlikely => "UNLIKELY",
            Verdict::NoCutoffData => "NO_CUTOFF_DATA",
            Verdict::RankMissing => "RANK_MISSING",
        }
    }
}

impl Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct ConsideredCutoff {
    pub label: CutoffLabel,
    pub value: u64,
}

/// The verdict for one (student, option) pair, with everything needed to
/// audit it.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct EvaluationResult {
    pub student_id: String,
    pub student_name: String,
    pub student_category: Category,
    pub student_gender: Gender,
    pub institute_type: InstituteType,
    pub college_code: String,
    pub course_code: String,
    pub main_code: String,
    pub program_name: String,
    /// Only set when evaluating a filled choice list.
    pub choice_number: Option<u32>,
    pub rank_stage: RankStage,
    pub applicable_rank: Option<u64>,
    pub best_eligible_cutoff: Option<u64>,
    pub considered_cutoffs: Vec<ConsideredCutoff>,
    pub verdict: Verdict,
}

impl EvaluationResult {
    /// `SC_FEM: 600, OC_GEN: 300`
    pub fn considered_display(&self) -> String {
        self.considered_cutoffs
            .iter()
            .map(|c| format!("{}: {}", c.label, c.value))
            .collect::<Vec<String>>()
            .join(", ")
    }
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct BatchOutcome {
    pub results: Vec<EvaluationResult>,
    pub students_processed: usize,
    /// Set when the run was interrupted. The results of the processed
    /// students are complete.
    pub cancelled: bool,
}

// ******** Errors *********

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum TableKind {
    Master,
    StudentBatch,
    ChoiceSheet,
}

impl Display for TableKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TableKind::Master => write!(f, "master table"),
            TableKind::StudentBatch => write!(f, "student batch"),
            TableKind::ChoiceSheet => write!(f, "choice sheet"),
        }
    }
}

/// Errors that prevent a table from being mapped onto its records.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum SchemaError {
    EmptyTable {
        table: TableKind,
    },
    MissingColumns {
        table: TableKind,
        missing: Vec<String>,
        detected: Vec<String>,
    },
}

impl Error for SchemaError {}

impl Display for SchemaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchemaError::EmptyTable { table } => write!(f, "the {} has no header row", table),
            SchemaError::MissingColumns {
                table,
                missing,
                detected,
            } => write!(
                f,
                "the {} is missing required columns (after normalization): {:?}; detected columns: {:?}",
                table, missing, detected
            ),
        }
    }
}
