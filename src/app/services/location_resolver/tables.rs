//! Centroid lookup tables for offline geocoding
//!
//! Loads the national incorporated-places export into county and city
//! centroid tables, and provides the static per-state centroid fallback.

use crate::{Error, Result};
use std::collections::HashMap;
use std::path::Path;
use tracing::{info, warn};

/// Columns expected in the incorporated-places CSV
const PLACE_NAME_COL: &str = "Name";
const PLACE_STATE_COL: &str = "State Name";
const PLACE_LAT_COL: &str = "Primary Lat Dec";
const PLACE_LON_COL: &str = "Primary Long Dec";
const PLACE_CLASS_COL: &str = "Class Code";

/// County and city centroid tables keyed by `"{name}, {state}"` (lowercase)
///
/// Loaded once per process and shared read-only between resolver instances.
#[derive(Debug, Clone, Default)]
pub struct LocationTables {
    counties: HashMap<String, (f64, f64)>,
    cities: HashMap<String, (f64, f64)>,
}

impl LocationTables {
    /// Create empty tables; resolution then relies on state centroids only
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load tables from a national incorporated-places CSV
    ///
    /// Census class codes starting with `H` are counties and equivalents;
    /// codes starting with `C` are incorporated cities and towns. Rows with
    /// unparseable coordinates are skipped.
    pub fn load_from_csv(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::file_not_found(path.display().to_string()));
        }

        let mut reader = csv::Reader::from_path(path).map_err(|e| {
            Error::csv_parsing(
                path.display().to_string(),
                "failed to open places lookup file",
                Some(e),
            )
        })?;

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| {
                Error::csv_parsing(
                    path.display().to_string(),
                    "failed to read places header row",
                    Some(e),
                )
            })?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let index_of = |name: &str| headers.iter().position(|h| h.as_str() == name);
        let (name_idx, state_idx, lat_idx, lon_idx, class_idx) = match (
            index_of(PLACE_NAME_COL),
            index_of(PLACE_STATE_COL),
            index_of(PLACE_LAT_COL),
            index_of(PLACE_LON_COL),
            index_of(PLACE_CLASS_COL),
        ) {
            (Some(n), Some(s), Some(la), Some(lo), Some(c)) => (n, s, la, lo, c),
            _ => {
                return Err(Error::location_lookup(format!(
                    "places lookup file missing required columns \
                     ({PLACE_NAME_COL}, {PLACE_STATE_COL}, {PLACE_LAT_COL}, \
                     {PLACE_LON_COL}, {PLACE_CLASS_COL})"
                )));
            }
        };

        let mut tables = Self::default();
        let mut skipped = 0usize;

        for record in reader.records() {
            let record = record.map_err(|e| {
                Error::csv_parsing(
                    path.display().to_string(),
                    "failed to read places record",
                    Some(e),
                )
            })?;

            let name = record.get(name_idx).unwrap_or("").trim().to_lowercase();
            let state = record.get(state_idx).unwrap_or("").trim().to_lowercase();
            let class_code = record
                .get(class_idx)
                .unwrap_or("")
                .trim()
                .to_uppercase();

            let lat = record.get(lat_idx).unwrap_or("").trim().parse::<f64>();
            let lon = record.get(lon_idx).unwrap_or("").trim().parse::<f64>();
            let (lat, lon) = match (lat, lon) {
                (Ok(lat), Ok(lon)) => (lat, lon),
                _ => {
                    skipped += 1;
                    continue;
                }
            };

            if name.is_empty() || state.is_empty() {
                skipped += 1;
                continue;
            }

            let key = format!("{}, {}", name, state);
            if class_code.starts_with('H') {
                tables.counties.insert(key, (lat, lon));
            } else if class_code.starts_with('C') {
                tables.cities.insert(key, (lat, lon));
            }
        }

        if skipped > 0 {
            warn!("Skipped {} places rows with missing name or coordinates", skipped);
        }
        info!(
            "Loaded location lookup tables: {} counties, {} cities/towns",
            tables.counties.len(),
            tables.cities.len()
        );

        Ok(tables)
    }

    /// Look up a county centroid by `"{name}, {state}"` key
    pub fn county(&self, key: &str) -> Option<(f64, f64)> {
        self.counties.get(key).copied()
    }

    /// Look up a city/town centroid by `"{name}, {state}"` key
    pub fn city(&self, key: &str) -> Option<(f64, f64)> {
        self.cities.get(key).copied()
    }

    /// Insert a county entry directly (test fixtures)
    pub fn insert_county(&mut self, name: &str, state: &str, lat: f64, lon: f64) {
        self.counties.insert(
            format!("{}, {}", name.trim().to_lowercase(), state.trim().to_lowercase()),
            (lat, lon),
        );
    }

    /// Insert a city entry directly (test fixtures)
    pub fn insert_city(&mut self, name: &str, state: &str, lat: f64, lon: f64) {
        self.cities.insert(
            format!("{}, {}", name.trim().to_lowercase(), state.trim().to_lowercase()),
            (lat, lon),
        );
    }

    /// Number of county entries loaded
    pub fn county_count(&self) -> usize {
        self.counties.len()
    }

    /// Number of city entries loaded
    pub fn city_count(&self) -> usize {
        self.cities.len()
    }
}

/// Approximate centroid for a US state or territory, keyed by title-cased
/// full name
///
/// Two-letter abbreviations other than "Dc" are not expanded; a state given
/// as "Ca" will not match. This mirrors the upstream lookup tables exactly.
pub fn state_centroid(state: &str) -> Option<(f64, f64)> {
    let coords = match state {
        "Alabama" => (32.806671, -86.791130),
        "Alaska" => (61.370716, -152.404419),
        "Arizona" => (33.729759, -111.431221),
        "Arkansas" => (34.969704, -92.373123),
        "California" => (36.116203, -119.681564),
        "Colorado" => (39.059811, -105.311104),
        "Connecticut" => (41.597782, -72.755371),
        "Delaware" => (39.318523, -75.507141),
        "District Of Columbia" => (38.9072, -77.0369),
        "Dc" => (38.9072, -77.0369),
        "Florida" => (27.766279, -81.686783),
        "Georgia" => (33.040619, -83.643074),
        "Hawaii" => (21.094318, -157.498337),
        "Idaho" => (44.240459, -114.478828),
        "Illinois" => (40.349457, -88.986137),
        "Indiana" => (39.849426, -86.258278),
        "Iowa" => (42.011539, -93.210526),
        "Kansas" => (38.526600, -96.726486),
        "Kentucky" => (37.668140, -84.670067),
        "Louisiana" => (31.169546, -91.867805),
        "Maine" => (44.693947, -69.381927),
        "Maryland" => (39.063946, -76.802101),
        "Massachusetts" => (42.230171, -71.530106),
        "Michigan" => (43.326618, -84.536095),
        "Minnesota" => (45.694454, -93.900192),
        "Mississippi" => (32.741646, -89.678696),
        "Missouri" => (38.456085, -92.288368),
        "Montana" => (46.921925, -110.454353),
        "Nebraska" => (41.125370, -98.268082),
        "Nevada" => (38.313515, -117.055374),
        "New Hampshire" => (43.452492, -71.563896),
        "New Jersey" => (40.298904, -74.521011),
        "New Mexico" => (34.840515, -106.248482),
        "New York" => (42.165726, -74.948051),
        "North Carolina" => (35.630066, -79.806419),
        "North Dakota" => (47.528912, -99.784012),
        "Ohio" => (40.388783, -82.764915),
        "Oklahoma" => (35.565342, -96.928917),
        "Oregon" => (44.572021, -122.070938),
        "Pennsylvania" => (40.590752, -77.209755),
        "Rhode Island" => (41.680893, -71.511780),
        "South Carolina" => (33.856892, -80.945007),
        "South Dakota" => (44.299782, -99.438828),
        "Tennessee" => (35.747845, -86.692345),
        "Texas" => (31.054487, -97.563461),
        "Utah" => (40.150032, -111.862434),
        "Vermont" => (44.045876, -72.710686),
        "Virginia" => (37.769337, -78.169968),
        "Washington" => (47.400902, -121.490494),
        "West Virginia" => (38.491226, -80.954453),
        "Wisconsin" => (44.268543, -89.616508),
        "Wyoming" => (42.755966, -107.302490),
        // US territories
        "Puerto Rico" => (18.2208, -66.5901),
        "Guam" => (13.4443, 144.7937),
        "U.S. Virgin Islands" => (18.3358, -64.8963),
        "American Samoa" => (-14.2710, -170.1322),
        "Northern Mariana Islands" => (15.0979, 145.6739),
        _ => return None,
    };
    Some(coords)
}
