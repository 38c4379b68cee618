mod config;
mod export_cmd;
mod flight_cmds;
mod history_cmds;
mod images;
mod plan_cmds;
mod session;

use std::path::PathBuf;

use chrono::{Datelike, NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};

use wayfarer_core::FilterCriteria;
use wayfarer_core::model::{CabinClass, Passengers, TripKind, TripParameters};

use config::{CliOverrides, WayfarerConfig};

#[derive(Parser)]
#[command(name = "wayfarer", about = "Inspect and edit generated travel plans")]
struct Cli {
    /// Data directory (overrides WAYFARER_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Flights per page (overrides WAYFARER_PAGE_SIZE)
    #[arg(long, global = true)]
    page_size: Option<usize>,

    /// Directory of destination images (overrides WAYFARER_IMAGES_DIR)
    #[arg(long, global = true)]
    images_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a wayfarer config file with the default settings
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
    /// Install a plan from raw generation output and save it
    Import {
        /// File containing the model's answer ("-" for stdin)
        file: String,
        #[command(flatten)]
        trip: TripArgs,
    },
    /// Show the saved plan
    Show {
        /// Print the plan as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },
    /// List flights of the saved plan, page by page
    Flights {
        #[command(flatten)]
        filter: FilterArgs,
        /// Number of pages to display
        #[arg(long, default_value_t = 1)]
        pages: usize,
    },
    /// Select (or deselect) a flight by its number in the filtered list
    Select {
        number: usize,
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Toggle a checklist or packing item
    Toggle {
        #[command(subcommand)]
        target: ToggleTarget,
    },
    /// Fill any pending destination images and save
    Save,
    /// Remove the saved plan
    Discard {
        /// Skip the confirmation requirement
        #[arg(long)]
        yes: bool,
    },
    /// Export part of the saved plan as text
    Export {
        #[command(subcommand)]
        what: ExportCommands,
    },
    /// Past plan requests
    History {
        #[command(subcommand)]
        command: HistoryCommands,
    },
}

#[derive(Subcommand)]
pub enum ToggleTarget {
    /// Toggle checklist item NUMBER
    Checklist { number: usize },
    /// Toggle item ITEM of packing category CATEGORY
    Packing { category: usize, item: usize },
}

#[derive(Subcommand)]
pub enum ExportCommands {
    /// Checklist as `[x] task` lines
    Checklist {
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Packing list grouped by category
    Packing {
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Filtered flights as CSV
    Flights {
        #[command(flatten)]
        filter: FilterArgs,
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum HistoryCommands {
    /// List past requests, most recent first
    List,
    /// Print the trip parameters of one entry as JSON
    Show { id: i64 },
    /// Forget all past requests
    Clear {
        /// Confirm clearing the history
        #[arg(long)]
        yes: bool,
    },
}

/// Flight filter inputs, taken verbatim the way a form would send them.
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Airline name, or "any"
    #[arg(long)]
    pub airline: Option<String>,
    /// Stops: any, 0, 1 or 2+
    #[arg(long)]
    pub stops: Option<String>,
    /// Price ceiling; blank, non-numeric or non-positive means no ceiling
    #[arg(long)]
    pub max_price: Option<String>,
}

impl FilterArgs {
    pub fn criteria(&self) -> FilterCriteria {
        FilterCriteria::from_inputs(
            self.airline.as_deref().unwrap_or("any"),
            self.stops.as_deref().unwrap_or("any"),
            self.max_price.as_deref().unwrap_or(""),
        )
    }
}

/// Trip parameters the imported plan was generated for.
#[derive(Args, Debug, Clone)]
pub struct TripArgs {
    /// Departure city
    #[arg(long)]
    pub origin: String,
    /// Destination city (repeat for multi-city trips)
    #[arg(long = "dest", required = true)]
    pub destinations: Vec<String>,
    /// Year the trip takes place (defaults to the current year)
    #[arg(long)]
    pub year: Option<i32>,
    /// domestic or international
    #[arg(long, default_value = "international")]
    pub kind: TripKind,
    /// economy, premium_economy, business or first
    #[arg(long = "class", default_value = "economy")]
    pub cabin_class: CabinClass,
    #[arg(long, default_value_t = 1)]
    pub adults: u32,
    #[arg(long, default_value_t = 0)]
    pub children: u32,
    #[arg(long, default_value_t = 0)]
    pub infants: u32,
    /// First day of the trip (YYYY-MM-DD)
    #[arg(long)]
    pub start: Option<NaiveDate>,
    /// Last day of the trip (YYYY-MM-DD)
    #[arg(long)]
    pub end: Option<NaiveDate>,
    /// Request a stopover
    #[arg(long)]
    pub stopover: bool,
    /// Free-form travel style, e.g. "food and museums"
    #[arg(long, default_value = "")]
    pub style: String,
}

impl TripArgs {
    pub fn into_parameters(self) -> TripParameters {
        TripParameters {
            year: self.year.unwrap_or_else(|| Utc::now().year()),
            kind: self.kind,
            origin: self.origin,
            destinations: self.destinations,
            passengers: Passengers {
                adults: self.adults,
                children: self.children,
                infants: self.infants,
            },
            start_date: self.start,
            end_date: self.end,
            cabin_class: self.cabin_class,
            stopover: self.stopover,
            style: self.style,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so exports on stdout stay clean.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let overrides = CliOverrides {
        data_dir: cli.data_dir,
        page_size: cli.page_size,
        images_dir: cli.images_dir,
    };

    match cli.command {
        Commands::Init { force } => {
            config::cmd_init(force)?;
        }
        Commands::Import { file, trip } => {
            let resolved = WayfarerConfig::resolve(&overrides)?;
            plan_cmds::cmd_import(&resolved, &file, trip.into_parameters()).await?;
        }
        Commands::Show { json } => {
            let resolved = WayfarerConfig::resolve(&overrides)?;
            plan_cmds::cmd_show(&resolved, json)?;
        }
        Commands::Flights { filter, pages } => {
            let resolved = WayfarerConfig::resolve(&overrides)?;
            flight_cmds::cmd_flights(&resolved, &filter, pages).await?;
        }
        Commands::Select { number, filter } => {
            let resolved = WayfarerConfig::resolve(&overrides)?;
            flight_cmds::cmd_select(&resolved, number, &filter)?;
        }
        Commands::Toggle { target } => {
            let resolved = WayfarerConfig::resolve(&overrides)?;
            plan_cmds::cmd_toggle(&resolved, target)?;
        }
        Commands::Save => {
            let resolved = WayfarerConfig::resolve(&overrides)?;
            plan_cmds::cmd_save(&resolved).await?;
        }
        Commands::Discard { yes } => {
            let resolved = WayfarerConfig::resolve(&overrides)?;
            plan_cmds::cmd_discard(&resolved, yes)?;
        }
        Commands::Export { what } => {
            let resolved = WayfarerConfig::resolve(&overrides)?;
            export_cmd::run_export_command(&resolved, what)?;
        }
        Commands::History { command } => {
            let resolved = WayfarerConfig::resolve(&overrides)?;
            history_cmds::run_history_command(&resolved, command)?;
        }
    }

    Ok(())
}
