//! Field parsing utilities for surveillance CSV records
//!
//! This module provides helper functions for reading typed values out of
//! raw CSV records: header-based column lookup, date parsing in strict and
//! free-form flavors, magnitude coercion, and title-casing. Coercion
//! failures become `None`, never errors; the validator reports them
//! downstream.

use crate::constants::FLEXIBLE_DATE_FORMATS;
use chrono::{NaiveDate, NaiveDateTime};
use csv::StringRecord;
use std::collections::HashMap;

/// Column-name to index mapping built from a trimmed header row
#[derive(Debug, Clone)]
pub struct ColumnMap {
    pub name_to_index: HashMap<String, usize>,
}

impl ColumnMap {
    /// Build a mapping from a CSV header record, trimming whitespace
    pub fn from_headers(headers: &StringRecord) -> Self {
        let name_to_index = headers
            .iter()
            .enumerate()
            .map(|(index, name)| (name.trim().to_string(), index))
            .collect();
        Self { name_to_index }
    }

    /// Check whether a column is present
    pub fn contains(&self, name: &str) -> bool {
        self.name_to_index.contains_key(name)
    }
}

/// Get an optional trimmed field value from a CSV record
///
/// Missing columns and empty values both read as `None`.
pub fn get_optional_field<'a>(
    record: &'a StringRecord,
    mapping: &ColumnMap,
    field_name: &str,
) -> Option<&'a str> {
    mapping
        .name_to_index
        .get(field_name)
        .and_then(|&index| record.get(index))
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
}

/// Parse a date in one exact format; `None` on mismatch
pub fn parse_date_strict(value: &str, format: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), format).ok()
}

/// Parse a free-form date through the known format list; `None` when no
/// format matches
pub fn parse_date_flexible(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();

    for format in FLEXIBLE_DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Some(date);
        }
    }

    // Datetime-stamped exports carry a time component on the same formats
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%m/%d/%Y %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(dt.date());
        }
    }

    None
}

/// Coerce a magnitude field to a non-negative count; `None` for anything
/// non-numeric
pub fn parse_optional_count(value: &str) -> Option<i64> {
    let trimmed = value.trim();

    if let Ok(n) = trimmed.parse::<i64>() {
        return Some(n);
    }

    // Whole-number floats ("500.0") appear in some exports
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|f| f.is_finite() && f.fract() == 0.0)
        .map(|f| f as i64)
}

/// Title-case a string: uppercase each letter that follows a non-letter,
/// lowercase the rest ("LOS ANGELES" -> "Los Angeles", "CA" -> "Ca")
pub fn to_title_case(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    let mut prev_is_letter = false;

    for ch in value.chars() {
        if ch.is_alphabetic() {
            if prev_is_letter {
                result.extend(ch.to_lowercase());
            } else {
                result.extend(ch.to_uppercase());
            }
            prev_is_letter = true;
        } else {
            result.push(ch);
            prev_is_letter = false;
        }
    }

    result
}

/// Trim and title-case an optional field value
pub fn title_cased(value: Option<&str>) -> Option<String> {
    value.map(|s| to_title_case(s.trim()))
}

/// Convert a source header name to a snake_case metadata key
/// ("HPAI Strain" -> "hpai_strain")
pub fn metadata_key(header: &str) -> String {
    header.trim().to_lowercase().replace(' ', "_")
}
