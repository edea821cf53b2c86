use clap::Parser;

/// Estimates the admission chances of students from published closing ranks.
#[derive(Parser, Debug, Clone, Default)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) A configuration file in JSON format. Paths in this file are relative to
    /// its location. The other options override the values of this file.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,
    /// (file path) A reference file with the expected results in CSV format. If provided, seatchance will
    /// check that the results match the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (file path) The master table of options and closing ranks (CSV or Excel).
    #[clap(short, long, value_parser)]
    pub master: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the results will be written in CSV format to the given
    /// location, or to the standard output for 'stdout' or an empty value. Setting this option overrides
    /// the path that may be specified with the --config option.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path) The student batch, or the choice list of a single student with --mode choices.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (default auto) The type of the input: csv, xlsx or auto to decide from the file extension.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// (default batch) 'batch' evaluates every student of the input against every option. 'choices'
    /// evaluates a single student against the choice list in the input.
    #[clap(long, value_parser)]
    pub mode: Option<String>,

    /// (file path, 'stdout' or empty) With --mode choices, where to write the choices that are not in the
    /// master table. 'stdout' and an empty value both print them.
    #[clap(long, value_parser)]
    pub unmatched_out: Option<String>,

    /// When the input is an Excel file, indicates the name of the worksheet to use.
    #[clap(long, value_parser)]
    pub excel_worksheet_name: Option<String>,

    // The student profile for --mode choices
    /// (OC, EWS, OBC, SC or ST) The category of the student.
    #[clap(long, value_parser)]
    pub category: Option<String>,
    /// (FEM or GEN) FEM for the female-supernumerary seat pool.
    #[clap(long, value_parser)]
    pub gender: Option<String>,
    #[clap(long, value_parser)]
    pub advanced_crl_rank: Option<u64>,
    #[clap(long, value_parser)]
    pub advanced_category_rank: Option<u64>,
    #[clap(long, value_parser)]
    pub mains_crl_rank: Option<u64>,
    #[clap(long, value_parser)]
    pub mains_category_rank: Option<u64>,
    #[clap(long, value_parser)]
    pub name: Option<String>,
    #[clap(long, value_parser)]
    pub student_id: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
