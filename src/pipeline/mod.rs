// Drives the whole run: discover export files, order them chronologically,
// resolve each trip, append rows to the logbook CSV.

use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;
use walkdir::WalkDir;

use crate::geo::haversine_km;
use crate::geocode::{PlaceResolver, ReverseLookup};
use crate::timeline::{extract_segments, month_from_filename};

/// Pause after each reverse-geocoding call, to stay polite toward the
/// lookup service.
pub const LOOKUP_PACE: Duration = Duration::from_millis(200);

const INPUT_EXTENSION: &str = "json";

/// One line of the travel log. Column order is the output contract.
#[derive(Debug, Serialize, PartialEq)]
pub struct TripRow {
    pub month: u32,
    #[serde(rename = "from")]
    pub from_place: String,
    #[serde(rename = "to")]
    pub to_place: String,
    pub distance_km: f64,
    pub start_time: String,
    pub end_time: String,
}

#[derive(Debug, Default)]
pub struct RunSummary {
    pub files: usize,
    pub trips: usize,
    pub file_errors: usize,
}

/// Finds all export files directly inside `dir`, ordered by the month number
/// embedded in their filenames. Files without a recognizable month come
/// first; ties keep the directory listing order.
pub fn discover_input_files(dir: &Utf8Path) -> Result<Vec<Utf8PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.with_context(|| format!("Failed to read directory {dir}"))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = Utf8PathBuf::from_path_buf(entry.path().to_path_buf())
            .map_err(|_| anyhow::anyhow!("Non-UTF8 path: {:?}", entry.path()))?;

        if path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case(INPUT_EXTENSION))
        {
            files.push(path);
        }
    }

    files.sort_by_key(|path| month_from_filename(path.file_name().unwrap_or("")));
    Ok(files)
}

/// Processes every export file in `dir` and writes the travel log to
/// `output`. Per-file problems are logged and skipped; only a failure to
/// create or write the output file aborts the run.
pub fn run<L: ReverseLookup>(
    dir: &Utf8Path,
    output: &Utf8Path,
    resolver: &mut PlaceResolver<L>,
    pace: Duration,
) -> Result<RunSummary> {
    let files = discover_input_files(dir)?;

    let mut writer = csv::Writer::from_path(output)
        .with_context(|| format!("Failed to open output file {output}"))?;

    let mut summary = RunSummary::default();

    for path in &files {
        println!("\n📄 Processing {}...", path.file_name().unwrap_or_default());
        summary.files += 1;

        let segments = match extract_segments(path) {
            Ok(segments) => segments,
            Err(e) => {
                eprintln!("❌ Error processing {path}: {e:#}");
                summary.file_errors += 1;
                continue;
            }
        };

        for segment in segments {
            let distance_km = round2(haversine_km(segment.from, segment.to));

            let from_place = resolver.resolve(segment.from);
            thread::sleep(pace);
            let to_place = resolver.resolve(segment.to);
            thread::sleep(pace);

            println!("   ✅ {from_place} → {to_place} ({distance_km} km)");

            writer
                .serialize(TripRow {
                    month: segment.month,
                    from_place,
                    to_place,
                    distance_km,
                    start_time: segment.start_time,
                    end_time: segment.end_time,
                })
                .with_context(|| format!("Failed to write row to {output}"))?;
            summary.trips += 1;
        }
    }

    writer
        .flush()
        .with_context(|| format!("Failed to flush {output}"))?;

    Ok(summary)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
