use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use schedule_tracks::logging::init_logging;
use schedule_tracks::{
    LayoutConfig, LogLevel, PersistenceError, TaskGraph, TaskRecord, TrackLayout,
    load_snapshot_from_csv, load_snapshot_from_json, save_layout_to_json,
};
use tracing::error;

/// Lay out a task snapshot into tracks.
#[derive(Debug, Parser)]
#[command(name = "schedule-tracks", version)]
struct CliArgs {
    /// Task snapshot (.json or .csv).
    snapshot: PathBuf,

    /// Layout config JSON file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Overrides SCHEDULE_TRACKS_LOG and the config's log level.
    #[arg(long)]
    log_level: Option<LogLevel>,

    /// Write the layout as JSON instead of printing a table.
    #[arg(long)]
    output: Option<PathBuf>,
}

fn load_records(path: &Path) -> Result<Vec<TaskRecord>, PersistenceError> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("csv") => load_snapshot_from_csv(path),
        _ => load_snapshot_from_json(path),
    }
}

fn render_tracks_as_text_table(layout: &TrackLayout) -> String {
    let header = ["track", "height", "paths", "start", "end"];
    let rows: Vec<[String; 5]> = layout
        .tracks
        .iter()
        .enumerate()
        .map(|(idx, track)| {
            [
                idx.to_string(),
                track.height.to_string(),
                track
                    .path_ids
                    .iter()
                    .map(|id| id.to_string())
                    .collect::<Vec<_>>()
                    .join(","),
                track.start.to_rfc3339(),
                track.end.to_rfc3339(),
            ]
        })
        .collect();

    let mut widths: Vec<usize> = header.iter().map(|h| h.len()).collect();
    for row in &rows {
        for (ci, cell) in row.iter().enumerate() {
            widths[ci] = widths[ci].max(cell.len());
        }
    }

    let mut sep = String::from("+");
    for w in &widths {
        sep.push_str(&"-".repeat(*w + 2));
        sep.push('+');
    }

    let render_row = |cells: Vec<&str>| {
        let mut line = String::from("|");
        for (ci, cell) in cells.iter().enumerate() {
            line.push(' ');
            line.push_str(cell);
            line.push_str(&" ".repeat(widths[ci] - cell.len()));
            line.push_str(" |");
        }
        line
    };

    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');
    out.push_str(&render_row(header.to_vec()));
    out.push('\n');
    out.push_str(&sep);
    out.push('\n');
    for row in &rows {
        out.push_str(&render_row(row.iter().map(String::as_str).collect()));
        out.push('\n');
    }
    out.push_str(&sep);
    out.push('\n');
    out.push_str(&format!("total stress: {}\n", layout.total_stress));
    out
}

fn run(args: CliArgs) -> Result<(), PersistenceError> {
    let config = match &args.config {
        Some(path) => LayoutConfig::from_json_file(path)?,
        None => LayoutConfig::default(),
    };
    init_logging(args.log_level, config.log_level);

    let records = load_records(&args.snapshot)?;
    let graph = TaskGraph::build(records)?;
    let layout = TrackLayout::compute_all(&graph, &config)?;

    match &args.output {
        Some(path) => save_layout_to_json(&layout, path)?,
        None => print!("{}", render_tracks_as_text_table(&layout)),
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = CliArgs::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
