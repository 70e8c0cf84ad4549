//! Tests for the location resolver service


// Test helper functions and fixtures
use crate::app::models::CaseRecord;
use crate::app::services::location_resolver::LocationTables;
use std::sync::Arc;

/// Build lookup tables with a few known counties and cities
pub fn test_tables() -> Arc<LocationTables> {
    let mut tables = LocationTables::empty();
    tables.insert_county("saint louis", "missouri", 38.6280, -90.4470);
    tables.insert_county("weld", "colorado", 40.5547, -104.3928);
    tables.insert_county("los angeles", "california", 34.3083, -118.2285);
    tables.insert_county("hillsborough", "florida", 27.9060, -82.3452);
    tables.insert_city("richmond", "virginia", 37.5407, -77.4360);
    tables.insert_city("jamestown", "virginia", 37.2207, -76.7783);
    Arc::new(tables)
}

/// Build a minimal case record carrying only location fields
pub fn location_record(county: Option<&str>, state: Option<&str>) -> CaseRecord {
    CaseRecord {
        external_id: "TEST_000000000000".to_string(),
        county: county.map(str::to_string),
        state_province: state.map(str::to_string),
        ..CaseRecord::default()
    }
}
