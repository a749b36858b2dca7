use clap::Parser;

/// Builds a social-preference graph from ranked peer surveys.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) JSON configuration describing the survey sources and the
    /// default view. For more information about the accepted fields, read the manual.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (directory or file path) A single survey source to load without a configuration
    /// file. Combine with --group and --input-type.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (default json) The format of --input: 'json' (a directory with one document per
    /// respondent) or 'xlsx' (a forms export with one row per respondent).
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// The cohort label attached to the records loaded through --input.
    #[clap(long, value_parser)]
    pub group: Option<String>,

    /// (comma-separated labels) Restricts the default allow-list to these cohorts.
    #[clap(long, value_parser, use_value_delimiter = true)]
    pub groups: Option<Vec<String>>,

    /// (comma-separated names) Explicit allow-list of students to display. Names are
    /// normalized the same way survey names are.
    #[clap(long, value_parser, use_value_delimiter = true)]
    pub students: Option<Vec<String>>,

    /// (file path) JSON file holding named student selections.
    #[clap(long, value_parser)]
    pub selection_file: Option<String>,

    /// The named selection to load from --selection-file as the allow-list.
    #[clap(long, value_parser)]
    pub selection: Option<String>,

    /// If specified, saves the active allow-list under this name in --selection-file.
    #[clap(long, value_parser)]
    pub save_selection: Option<String>,

    /// Highest preference rank kept in the view (1 shows first choices only). Values
    /// outside [1, 10] are accepted: 0 hides every edge.
    #[clap(long, value_parser)]
    pub max_rank: Option<u32>,

    /// Draw edges to students outside the allow-list, adding them as
    /// non-respondent nodes.
    #[clap(long, takes_value = false)]
    pub include_non_respondents: bool,

    /// (file path, 'stdout' or empty) Where to write the JSON summary of the view.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path) A reference summary in JSON format. If provided, sociograph will
    /// check that the generated summary matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
