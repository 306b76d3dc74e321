// Parses Google Timeline "Semantic Location History" export files into trip
// segments. One export file covers one month and carries the month name in
// its filename (e.g. "2024_MARCH.json").

use std::fs::File;
use std::io::BufReader;

use anyhow::{Context, Result};
use camino::Utf8Path;
use regex::Regex;
use serde::Deserialize;

use crate::geo::Coordinate;

/// One movement between two locations, as recorded in an export file.
#[derive(Debug, Clone, PartialEq)]
pub struct TripSegment {
    /// 1–12 from the filename's month name, 0 when none is recognized.
    pub month: u32,
    pub from: Coordinate,
    pub to: Coordinate,
    /// RFC 3339 strings passed through from the export; empty when absent.
    pub start_time: String,
    pub end_time: String,
}

lazy_static::lazy_static! {
    static ref MONTH_NAME: Regex = Regex::new(
        r"(?i)january|february|march|april|may|june|july|august|september|october|november|december"
    ).unwrap();
}

const MONTH_NAMES: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

/// Month number embedded in an export filename, or 0 if no English month
/// name occurs in it. Matching is case-insensitive; the leftmost occurrence
/// wins.
pub fn month_from_filename(filename: &str) -> u32 {
    MONTH_NAME
        .find(filename)
        .and_then(|m| {
            let name = m.as_str().to_lowercase();
            MONTH_NAMES.iter().position(|&n| n == name)
        })
        .map(|i| i as u32 + 1)
        .unwrap_or(0)
}

// Deserialization structs for the export format. Every field below the top
// level is optional: a segment missing any of them is skipped rather than
// failing the whole file.

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExportRoot {
    #[serde(default)]
    timeline_objects: Vec<TimelineObject>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TimelineObject {
    activity_segment: Option<RawActivitySegment>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawActivitySegment {
    start_location: Option<RawLocation>,
    end_location: Option<RawLocation>,
    duration: Option<RawDuration>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawLocation {
    latitude_e7: Option<i64>,
    longitude_e7: Option<i64>,
}

impl RawLocation {
    fn coordinate(&self) -> Option<Coordinate> {
        Some(Coordinate::from_e7(self.latitude_e7?, self.longitude_e7?))
    }
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct RawDuration {
    start_timestamp: Option<String>,
    end_timestamp: Option<String>,
}

/// Extracts all well-formed activity segments from one export file, stamped
/// with the filename-derived month.
///
/// A file without the `timelineObjects` collection yields an empty vec.
/// Elements that are not activity segments, or that lack a complete start or
/// end location, are skipped silently. Unreadable or malformed files are an
/// `Err`; the caller decides how to log it.
pub fn extract_segments(path: &Utf8Path) -> Result<Vec<TripSegment>> {
    let month = month_from_filename(path.file_name().unwrap_or(""));

    let file = File::open(path).with_context(|| format!("Failed to open {path}"))?;
    let root: ExportRoot = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse {path}"))?;

    let mut segments = Vec::new();
    for object in root.timeline_objects {
        let Some(activity) = object.activity_segment else {
            continue;
        };
        let (Some(from), Some(to)) = (
            activity.start_location.as_ref().and_then(RawLocation::coordinate),
            activity.end_location.as_ref().and_then(RawLocation::coordinate),
        ) else {
            continue;
        };

        let duration = activity.duration.unwrap_or_default();
        segments.push(TripSegment {
            month,
            from,
            to,
            start_time: duration.start_timestamp.unwrap_or_default(),
            end_time: duration.end_timestamp.unwrap_or_default(),
        });
    }

    Ok(segments)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_from_filename() {
        assert_eq!(month_from_filename("2024_JANUARY.json"), 1);
        assert_eq!(month_from_filename("2024_MARCH.json"), 3);
        assert_eq!(month_from_filename("december_trip.json"), 12);
        assert_eq!(month_from_filename("May2023.json"), 5);
        assert_eq!(month_from_filename("history.json"), 0);
        assert_eq!(month_from_filename(""), 0);
    }

    #[test]
    fn test_extract_segments() {
        let segments =
            extract_segments(Utf8Path::new("test_data/2024_MARCH.json")).unwrap();

        // Fixture holds one complete segment, one missing endLocation, one
        // placeVisit; only the complete one survives.
        assert_eq!(segments.len(), 1);

        let trip = &segments[0];
        assert_eq!(trip.month, 3);
        assert!((trip.from.lat - 37.7749).abs() < 1e-9);
        assert!((trip.from.lon - -122.4194).abs() < 1e-9);
        assert!((trip.to.lat - 34.0522).abs() < 1e-9);
        assert!((trip.to.lon - -118.2437).abs() < 1e-9);
        assert_eq!(trip.start_time, "2024-03-01T10:00:00Z");
        assert_eq!(trip.end_time, "2024-03-01T12:00:00Z");
    }

    #[test]
    fn test_missing_duration_yields_empty_timestamps() {
        let segments =
            extract_segments(Utf8Path::new("test_data/2024_APRIL_no_duration.json")).unwrap();
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].start_time, "");
        assert_eq!(segments[0].end_time, "");
    }

    #[test]
    fn test_missing_timeline_objects_key() {
        let segments =
            extract_segments(Utf8Path::new("test_data/no_timeline_objects.json")).unwrap();
        assert!(segments.is_empty());
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        assert!(extract_segments(Utf8Path::new("test_data/malformed.json")).is_err());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(extract_segments(Utf8Path::new("test_data/nope.json")).is_err());
    }
}
