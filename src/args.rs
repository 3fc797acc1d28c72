use clap::{Parser, Subcommand};

/// Power ratings of politicians: leaderboard, search and politician pages.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) A JSON configuration file. See the manual of the `power_ratings`
    /// crate for the accepted keys.
    #[clap(short, long, value_parser, global = true)]
    pub config: Option<String>,

    /// (directory path) The directory containing politicians.json and contests.json. Setting
    /// this option overrides the directory that may be specified with the --config option.
    #[clap(short, long, value_parser, global = true)]
    pub data: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the result will be written in JSON format
    /// to the given location. It is printed to the standard output otherwise.
    #[clap(short, long, value_parser, global = true)]
    pub out: Option<String>,

    /// (file path) A reference file containing the expected result in JSON format. If provided,
    /// firebrand will check that the result matches the reference.
    #[clap(short, long, value_parser, global = true)]
    pub reference: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard error.
    #[clap(long, takes_value = false, global = true)]
    pub verbose: bool,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// The top of the leaderboard.
    Leaderboard {
        /// (default 100) The number of politicians to list.
        #[clap(short, long, value_parser)]
        limit: Option<usize>,
    },
    /// Politicians whose name contains the query.
    Search {
        /// The text to search. Omitting it is an error, as for the search endpoint.
        #[clap(short, long, value_parser)]
        query: Option<String>,
        /// (default 100) The maximum number of results.
        #[clap(short, long, value_parser)]
        limit: Option<usize>,
    },
    /// The page of a single politician.
    Show {
        /// The id of the politician.
        #[clap(long, value_parser, required_unless_present = "name", conflicts_with = "name")]
        id: Option<u64>,
        /// The exact name of the politician.
        #[clap(long, value_parser)]
        name: Option<String>,
    },
    /// Replays the keystrokes of a search box through the debouncer.
    Replay {
        /// (file path) The JSON keystroke script.
        #[clap(short, long, value_parser)]
        script: String,
    },
}
