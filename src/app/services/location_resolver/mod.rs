//! Location resolver service for offline geocoding
//!
//! Maps (county, state) pairs or free-text place names to centroid
//! coordinates using static lookup tables, with a per-state centroid
//! fallback. No network calls: resolution is deterministic against tables
//! loaded once and shared read-only. Each resolver instance keeps its own
//! lookup cache so repeated runs and tests stay hermetic.

use crate::app::models::CaseRecord;
use crate::app::services::normalizer::field_parsers::to_title_case;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{debug, info};

pub mod tables;
pub mod variants;

#[cfg(test)]
pub mod tests;

pub use tables::{state_centroid, LocationTables};

use variants::{county_variants, normalize_county, strip_place_prefix, strip_place_suffix};

// =============================================================================
// Resolution Results
// =============================================================================

/// How a location was matched, in decreasing order of precision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchKind {
    /// County table hit via the county field
    County,
    /// City table hit via the county field (independent cities)
    IndependentCity,
    /// City table hit via the free-text place name
    City,
    /// County table hit via the suffix-stripped free-text place name
    CountyFallback,
    /// Per-state centroid fallback
    StateCentroid,
}

impl MatchKind {
    /// Canonical string form used in stats and logs
    pub fn as_str(self) -> &'static str {
        match self {
            MatchKind::County => "county",
            MatchKind::IndependentCity => "independent-city",
            MatchKind::City => "city",
            MatchKind::CountyFallback => "county-fallback",
            MatchKind::StateCentroid => "state-centroid",
        }
    }
}

impl std::fmt::Display for MatchKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A resolved centroid with its match precision
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResolvedLocation {
    pub latitude: f64,
    pub longitude: f64,
    pub match_kind: MatchKind,
}

/// One record the resolver could not place
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodeFailure {
    /// Index of the record within the batch
    pub index: usize,
    pub county: Option<String>,
    pub state: Option<String>,
    /// Human-readable failure reason
    pub reason: String,
}

/// Batch geocoding statistics for one run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeocodeStats {
    /// Records examined
    pub total: usize,

    /// Records that received coordinates
    pub resolved: usize,

    /// Resolution counts keyed by match kind
    pub by_match_kind: BTreeMap<String, usize>,

    /// Records that could not be placed, with reasons
    pub failures: Vec<GeocodeFailure>,
}

impl GeocodeStats {
    /// Geocoding success rate as a percentage
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.resolved as f64 / self.total as f64) * 100.0
        }
    }

    /// Copy of these stats with the failure list truncated for run logs
    pub fn truncated(&self, max_failures: usize) -> GeocodeStats {
        GeocodeStats {
            total: self.total,
            resolved: self.resolved,
            by_match_kind: self.by_match_kind.clone(),
            failures: self.failures.iter().take(max_failures).cloned().collect(),
        }
    }
}

// =============================================================================
// Location Resolver
// =============================================================================

/// Offline geocoder over shared centroid tables with a per-instance cache
#[derive(Debug, Clone)]
pub struct LocationResolver {
    tables: Arc<LocationTables>,
    cache: HashMap<String, Option<ResolvedLocation>>,
}

impl LocationResolver {
    /// Create a resolver over loaded lookup tables
    pub fn new(tables: Arc<LocationTables>) -> Self {
        Self {
            tables,
            cache: HashMap::new(),
        }
    }

    /// Resolve a location to centroid coordinates
    ///
    /// Priority order: county table via county-field variants, city table
    /// via the same variants (independent cities), city then county table
    /// via the free-text place name, and finally the per-state centroid.
    /// Returns `None` when the state is missing or nothing matches.
    pub fn resolve(
        &mut self,
        county: Option<&str>,
        state: Option<&str>,
        free_text: Option<&str>,
    ) -> Option<ResolvedLocation> {
        let state = state.map(str::trim).filter(|s| !s.is_empty())?;
        let county = county.map(str::trim).filter(|s| !s.is_empty());
        let free_text = free_text.map(str::trim).filter(|s| !s.is_empty());

        let cache_key = format!(
            "{}|{}|{}",
            county.unwrap_or("").to_lowercase(),
            state.to_lowercase(),
            free_text.unwrap_or("").to_lowercase()
        );
        if let Some(cached) = self.cache.get(&cache_key) {
            return *cached;
        }

        let resolved = self.resolve_uncached(county, state, free_text);
        self.cache.insert(cache_key, resolved);
        resolved
    }

    fn resolve_uncached(
        &self,
        county: Option<&str>,
        state: &str,
        free_text: Option<&str>,
    ) -> Option<ResolvedLocation> {
        let state_key = state.to_lowercase();

        if let Some(county) = county {
            let clean = normalize_county(county);
            let variants = county_variants(&clean);

            for variant in &variants {
                let key = format!("{}, {}", variant, state_key);
                if let Some((lat, lon)) = self.tables.county(&key) {
                    return Some(ResolvedLocation {
                        latitude: lat,
                        longitude: lon,
                        match_kind: MatchKind::County,
                    });
                }
            }

            for variant in &variants {
                let key = format!("{}, {}", variant, state_key);
                if let Some((lat, lon)) = self.tables.city(&key) {
                    return Some(ResolvedLocation {
                        latitude: lat,
                        longitude: lon,
                        match_kind: MatchKind::IndependentCity,
                    });
                }
            }
        }

        if let Some(text) = free_text {
            let place = strip_place_prefix(text);
            let key = format!("{}, {}", place, state_key);
            if let Some((lat, lon)) = self.tables.city(&key) {
                return Some(ResolvedLocation {
                    latitude: lat,
                    longitude: lon,
                    match_kind: MatchKind::City,
                });
            }
            if let Some((lat, lon)) = self.tables.county(&key) {
                return Some(ResolvedLocation {
                    latitude: lat,
                    longitude: lon,
                    match_kind: MatchKind::County,
                });
            }

            let stripped = strip_place_suffix(&place);
            let key = format!("{}, {}", stripped, state_key);
            if let Some((lat, lon)) = self.tables.county(&key) {
                return Some(ResolvedLocation {
                    latitude: lat,
                    longitude: lon,
                    match_kind: MatchKind::CountyFallback,
                });
            }
        }

        // Full-name lookup only; abbreviated states fall through to None
        if let Some((lat, lon)) = state_centroid(&to_title_case(state)) {
            return Some(ResolvedLocation {
                latitude: lat,
                longitude: lon,
                match_kind: MatchKind::StateCentroid,
            });
        }

        None
    }

    /// Geocode a batch of case records in place
    ///
    /// Records that already carry coordinates are left untouched. Failed
    /// records keep null coordinates and are reported in the returned stats
    /// with a reason string.
    pub fn resolve_all(&mut self, records: &mut [CaseRecord]) -> GeocodeStats {
        let mut stats = GeocodeStats {
            total: records.len(),
            ..GeocodeStats::default()
        };

        for (index, record) in records.iter_mut().enumerate() {
            if record.has_coordinates() {
                stats.resolved += 1;
                continue;
            }

            let county = record.county.as_deref();
            let state = record.state_province.as_deref();
            let free_text = record.city.as_deref();

            match self.resolve(county, state, free_text) {
                Some(resolved) => {
                    record.latitude = Some(resolved.latitude);
                    record.longitude = Some(resolved.longitude);
                    stats.resolved += 1;
                    *stats
                        .by_match_kind
                        .entry(resolved.match_kind.to_string())
                        .or_insert(0) += 1;
                }
                None => {
                    let reason = if county.is_none() || state.is_none() {
                        "missing county or state"
                    } else {
                        "county not found in lookup table"
                    };
                    debug!(
                        "Geocoding failed for record {}: {} ({:?}, {:?})",
                        index, reason, county, state
                    );
                    stats.failures.push(GeocodeFailure {
                        index,
                        county: county.map(str::to_string),
                        state: state.map(str::to_string),
                        reason: reason.to_string(),
                    });
                }
            }
        }

        info!(
            "Geocoded {}/{} records ({:.1}%)",
            stats.resolved,
            stats.total,
            stats.success_rate()
        );

        stats
    }

    /// Number of cached lookup results
    pub fn cache_size(&self) -> usize {
        self.cache.len()
    }
}
