use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Args {
    /// Path to the event catalog (JSON array of events)
    #[arg(long, global = true, default_value = "data/events.json")]
    pub catalog_file: PathBuf,

    /// Path to the optional settings file
    #[arg(long, global = true, default_value = "eventscope.json")]
    pub config_file: PathBuf,

    /// Directory to store reports and snapshots
    #[arg(long, global = true, default_value = "data")]
    pub data_dir: PathBuf,

    /// Base URL of the detections API
    #[clap(long, global = true, env = "EVENTSCOPE_API_URL")]
    pub api_base_url: Option<String>,

    /// Evaluate as if today were this date (YYYY-MM-DD)
    #[arg(long, global = true)]
    pub today: Option<NaiveDate>,

    /// Store the report under <data-dir>/reports
    #[arg(long, global = true)]
    pub save: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Score how good a date is for a new event
    ScoreDate {
        /// Candidate date (YYYY-MM-DD)
        date: NaiveDate,
    },

    /// Classify local competition of every event
    Competition {
        /// Only classify events of this genre
        #[arg(long)]
        genre: Option<String>,

        /// Display window in days
        #[arg(long, default_value_t = 7)]
        window_days: u32,
    },

    /// Least saturated upcoming dates, genres and venues
    Opportunities {
        #[arg(long)]
        horizon_days: Option<u32>,

        #[arg(long)]
        top: Option<usize>,
    },

    /// Simulated digital buzz for one event or a ranking of all
    Buzz {
        #[arg(long)]
        event_id: Option<String>,

        /// Reference date for the weekly series (YYYY-MM-DD)
        #[arg(long)]
        as_of: Option<NaiveDate>,

        /// Other event ids to compare the trend against
        #[arg(long, value_delimiter = ',')]
        compare: Vec<String>,

        /// Trend window in weeks (4, 8 or 12)
        #[arg(long, default_value_t = 12)]
        weeks: usize,
    },

    /// Saturation calendar for one month
    Calendar { year: i32, month: u32 },

    /// Monthly, weekday, genre and venue metrics
    Temporal,

    /// Latest radio detections
    Mentions {
        #[arg(long)]
        city: Option<String>,

        /// MENCION or SPOT
        #[arg(long)]
        kind: Option<String>,

        /// Show stats for one artist instead of the list
        #[arg(long)]
        artist: Option<String>,
    },

    /// Artists ranked by radio activity
    Artists {
        #[arg(long)]
        city: Option<String>,

        #[arg(long)]
        kind: Option<String>,

        #[arg(long)]
        station: Option<String>,

        /// date, spots, mentions, total or confidence
        #[arg(long, default_value = "total")]
        sort_by: String,
    },

    /// Events ranked by radio activity
    EventsRanking {
        #[arg(long)]
        country: Option<String>,

        #[arg(long)]
        city: Option<String>,

        #[arg(long)]
        venue: Option<String>,

        /// 7, 14, 30, 60, 90 or "todos"
        #[arg(long)]
        range: Option<String>,

        /// spots, mentions or all
        #[arg(long, default_value = "all")]
        tab: String,
    },

    /// Refresh the detections snapshot periodically
    Watch,
}
