use clap::Parser;

/// Optimal proportional-representation elections: finds the winner set of maximal quality
/// among all the subsets of candidates.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) The JSON file describing the election: score files, candidates and rules.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,
    /// (file path) A reference file containing the outcome of an election in JSON format. If provided, optpr will
    /// check that the computed summary matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the summary of the election will be written in JSON format to the given
    /// location. Setting this option overrides the output directory that may be specified with the --config option.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path) A CSV score file with a header row of candidate names and one ballot per row.
    /// Setting this option overrides the score files of the --config option, and the path is then relative to the
    /// directory of the configuration.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// The number of winners to elect. Required with --input if no configuration is given.
    #[clap(short, long, value_parser)]
    pub winners: Option<u32>,

    /// (fsimmons or harmonic, default fsimmons) How the total score of a ballot becomes quality.
    #[clap(long, value_parser)]
    pub quality_rule: Option<String>,

    /// (table or offset, default table) The table search needs integer scores without blanks. The offset search
    /// accepts real scores.
    #[clap(long, value_parser)]
    pub mode: Option<String>,

    /// (default 1) The largest score a ballot may give. Scores range from 0 to this value.
    #[clap(long, value_parser)]
    pub top_score: Option<u32>,

    /// (default 0.5) The offset added to the total score of each ballot in the offset search.
    #[clap(long, value_parser)]
    pub delta: Option<f64>,

    /// The label of a blank score, in addition to empty cells.
    #[clap(long, value_parser)]
    pub blank_label: Option<String>,

    /// (pav or random) Runs one of the built-in example elections instead of reading a configuration.
    #[clap(long, value_parser)]
    pub demo: Option<String>,

    /// Prints the reference quality values and checks the digamma approximations on this many random points.
    #[clap(long, value_parser)]
    pub psi_check: Option<u32>,

    /// If passed, blank scores in the table search are an error instead of switching to the offset search.
    #[clap(long, takes_value = false)]
    pub no_fallback: bool,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
