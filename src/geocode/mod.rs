// Reverse geocoding with an in-memory memoization cache.
//
// The network client lives behind the `ReverseLookup` trait so the retry and
// caching behavior can be exercised against a mock.

pub mod nominatim;

pub use nominatim::NominatimClient;

use std::collections::HashMap;
use std::thread;
use std::time::Duration;

use crate::geo::Coordinate;

/// Address components returned by a reverse lookup, reduced to the fields the
/// logbook cares about.
#[derive(Debug, Clone, Default)]
pub struct Address {
    pub city: Option<String>,
    pub town: Option<String>,
    pub village: Option<String>,
    pub suburb: Option<String>,
    pub county: Option<String>,
    /// Full formatted address, e.g. "Golden Gate Bridge, San Francisco, ...".
    pub display_name: String,
}

impl Address {
    /// Picks the most relevant display name: the first present field in
    /// priority order, falling back to the first comma-separated segment of
    /// the full address.
    fn best_name(&self) -> Option<String> {
        [
            &self.city,
            &self.town,
            &self.village,
            &self.suburb,
            &self.county,
        ]
        .into_iter()
        .find_map(|field| field.clone())
        .or_else(|| {
            self.display_name
                .split(',')
                .next()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        })
    }
}

#[derive(Debug)]
pub enum LookupError {
    /// The request did not complete in time; worth retrying.
    TimedOut,
    /// Anything else. Not retried.
    Other(anyhow::Error),
}

/// A reverse geocoding backend. `Ok(None)` means the service answered but had
/// no address for the coordinate.
pub trait ReverseLookup {
    fn lookup(&self, coord: Coordinate) -> Result<Option<Address>, LookupError>;
}

const MAX_ATTEMPTS: usize = 3;
const RETRY_DELAY: Duration = Duration::from_millis(500);

/// Resolves coordinates to place names, memoizing results for the lifetime of
/// one run. Coordinates are keyed rounded to 4 decimal places (~11 m), so
/// nearby segment endpoints share a single external call.
pub struct PlaceResolver<L: ReverseLookup> {
    lookup: L,
    cache: HashMap<(i64, i64), String>,
    retry_delay: Duration,
}

impl<L: ReverseLookup> PlaceResolver<L> {
    pub fn new(lookup: L) -> Self {
        PlaceResolver {
            lookup,
            cache: HashMap::new(),
            retry_delay: RETRY_DELAY,
        }
    }

    /// Returns a display string for the coordinate: a resolved place name, or
    /// the formatted coordinate itself when resolution fails. Never errors —
    /// lookup failures degrade to the fallback string.
    ///
    /// A successful answer (including "service knows no address here") is
    /// cached. Exhausted timeouts and hard errors are not, so a later segment
    /// rounding to the same key gets a fresh attempt.
    pub fn resolve(&mut self, coord: Coordinate) -> String {
        let key = cache_key(coord);
        if let Some(name) = self.cache.get(&key) {
            return name.clone();
        }

        for attempt in 1..=MAX_ATTEMPTS {
            match self.lookup.lookup(coord) {
                Ok(answer) => {
                    let name = answer
                        .and_then(|addr| addr.best_name())
                        .unwrap_or_else(|| fallback_name(coord));
                    self.cache.insert(key, name.clone());
                    return name;
                }
                Err(LookupError::TimedOut) => {
                    if attempt < MAX_ATTEMPTS {
                        thread::sleep(self.retry_delay);
                    }
                }
                Err(LookupError::Other(e)) => {
                    eprintln!("⚠️  Error getting location name: {e}");
                    return fallback_name(coord);
                }
            }
        }

        fallback_name(coord)
    }
}

fn cache_key(coord: Coordinate) -> (i64, i64) {
    ((coord.lat * 1e4).round() as i64, (coord.lon * 1e4).round() as i64)
}

fn fallback_name(coord: Coordinate) -> String {
    format!("{:.6}, {:.6}", coord.lat, coord.lon)
}
