use clap::Parser;

/// A voting booth for two candidates, John and Jane.
#[derive(Parser, Debug, Clone, Default)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) A JSON file with the settings of the booth.
    /// Relative paths inside this file are resolved from the directory of the file.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path, default vote_records.csv) The CSV file that records the votes.
    /// It is created if it does not exist. Setting this option overrides the path
    /// that may be specified with the --config option.
    #[clap(short, long, value_parser)]
    pub records: Option<String>,

    /// (file path, 'stdout' or empty) If specified, a summary of the session will be written
    /// in JSON format to the given location every time the votes are recorded.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
