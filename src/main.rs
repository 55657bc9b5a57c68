//! CLI entry point for the validation tracker.
//!
//! Provides subcommands for listing the actors present in a validation log,
//! analyzing one actor's event sequence, and rendering the geolocated
//! sequence as a map artifact.

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::collections::BTreeSet;
use std::ffi::OsStr;
use std::path::Path;
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};
use validation_tracker::{
    charts::{diff_bar_chart, diff_scatter_chart},
    map::render_map,
    output::{export_rows, print_json, print_summary},
    parser::{ParseError, parse_dataset},
    record::{Dataset, Selection},
    view::render_view,
};

#[derive(Parser)]
#[command(name = "validation_tracker")]
#[command(about = "A tool to analyze field-validation event logs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the actors present in a validation log
    ListActors {
        /// Path to the CSV log
        #[arg(value_name = "FILE")]
        input: String,
    },
    /// Analyze one actor's event sequence and print summary statistics
    Analyze {
        /// Path to the CSV log
        #[arg(value_name = "FILE")]
        input: String,

        /// Actor to analyze (defaults to the first one in the log)
        #[arg(short, long)]
        actor: Option<String>,

        /// Dates to keep (YYYY-MM-DD, repeatable; default: all)
        #[arg(short, long = "date")]
        dates: Vec<NaiveDate>,

        /// Keep only rows whose gap is at least this many minutes
        #[arg(long)]
        min_gap: Option<f64>,

        /// Keep only rows whose gap is at most this many minutes
        #[arg(long)]
        max_gap: Option<f64>,

        /// CSV file to export the filtered table to
        #[arg(short, long)]
        output: Option<String>,

        /// Directory to write the bar and scatter charts to
        #[arg(long)]
        charts_dir: Option<String>,

        /// Print the summary as JSON instead of log lines
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Render the geolocated event sequence as a self-contained map document
    Map {
        /// Path to the CSV log
        #[arg(value_name = "FILE")]
        input: String,

        /// Actor to map (defaults to the first one in the log)
        #[arg(short, long)]
        actor: Option<String>,

        /// Dates to keep (YYYY-MM-DD, repeatable; default: all)
        #[arg(short, long = "date")]
        dates: Vec<NaiveDate>,

        /// File to write the map document to
        #[arg(short, long, default_value = "map.html")]
        output: String,

        /// Marker label shown in popups
        #[arg(long, default_value = "Envio")]
        title: String,

        /// Marker background color
        #[arg(long, default_value = "red")]
        marker_color: String,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path = std::env::var("LOG_FILE_PATH")
        .unwrap_or_else(|_| "logs/validation_tracker.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("validation_tracker.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse().unwrap()));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse().unwrap()));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::ListActors { input } => {
            let Some(dataset) = load_dataset(&input)? else {
                return Ok(());
            };

            let actors = dataset.group_keys();
            info!(schema = %dataset.schema, total = actors.len(), "Actor list");

            for actor in &actors {
                let events = dataset
                    .records
                    .iter()
                    .filter(|r| &r.group_key == actor)
                    .count();
                let dates = dataset.dates_for(actor).len();

                info!(actor = %actor, events, dates, "Actor");
            }
        }
        Commands::Analyze {
            input,
            actor,
            dates,
            min_gap,
            max_gap,
            output,
            charts_dir,
            json,
        } => {
            let Some(dataset) = load_dataset(&input)? else {
                return Ok(());
            };
            let Some(selection) = build_selection(&dataset, actor, dates, min_gap, max_gap)
            else {
                return Ok(());
            };

            let view = render_view(&dataset, &selection);

            info!(
                actor = %selection.group_key,
                total = view.summary.count,
                "Sequence analyzed"
            );
            if json {
                print_json(&view.summary)?;
            } else {
                print_summary(&view.summary);
            }

            if let Some(path) = output {
                export_rows(&path, &view.records)?;
                info!(path = %path, "Table view exported");
            }

            if let Some(dir) = charts_dir {
                std::fs::create_dir_all(&dir)?;
                let bar = diff_bar_chart(&view.records, "Gap between events");
                let scatter = diff_scatter_chart(&view.records, "Gap distribution");

                match (bar, scatter) {
                    (Some(bar), Some(scatter)) => {
                        let bar_path = format!("{}/gap_bar.svg", dir);
                        let scatter_path = format!("{}/gap_scatter.svg", dir);
                        std::fs::write(&bar_path, bar)?;
                        std::fs::write(&scatter_path, scatter)?;
                        info!(dir = %dir, "Charts written");
                    }
                    _ => warn!("Nothing to chart for this selection"),
                }
            }
        }
        Commands::Map {
            input,
            actor,
            dates,
            output,
            title,
            marker_color,
        } => {
            let Some(dataset) = load_dataset(&input)? else {
                return Ok(());
            };
            let Some(selection) = build_selection(&dataset, actor, dates, None, None) else {
                return Ok(());
            };

            let view = render_view(&dataset, &selection);
            let located = view.geolocated();

            match render_map(&located, &title, &marker_color) {
                Some(html) => {
                    std::fs::write(&output, html)?;
                    info!(path = %output, markers = located.len(), "Map written");
                }
                None => {
                    warn!(
                        actor = %selection.group_key,
                        "No geolocated events in this selection, no map produced"
                    );
                }
            }
        }
    }

    Ok(())
}

/// Parses the input log. An unrecognized schema is a graceful no-op, not an
/// error: the tool logs it and produces nothing.
fn load_dataset(input: &str) -> Result<Option<Dataset>> {
    match parse_dataset(input) {
        Ok(dataset) => {
            info!(
                schema = %dataset.schema,
                rows = dataset.records.len(),
                "Log loaded"
            );
            Ok(Some(dataset))
        }
        Err(ParseError::UnknownSchema) => {
            warn!(input, "Columns match no known validation schema, skipping");
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

/// Builds the selection for a run: the given actor or the first one present,
/// the date set, and the optional inclusive gap range.
fn build_selection(
    dataset: &Dataset,
    actor: Option<String>,
    dates: Vec<NaiveDate>,
    min_gap: Option<f64>,
    max_gap: Option<f64>,
) -> Option<Selection> {
    let group_key = match actor {
        Some(actor) => actor,
        None => match dataset.group_keys().into_iter().next() {
            Some(first) => first,
            None => {
                warn!("Log contains no actors");
                return None;
            }
        },
    };

    let diff_range = match (min_gap, max_gap) {
        (None, None) => None,
        (min, max) => Some((min.unwrap_or(0.0), max.unwrap_or(f64::INFINITY))),
    };

    Some(Selection {
        group_key,
        dates: BTreeSet::from_iter(dates),
        diff_range,
    })
}
