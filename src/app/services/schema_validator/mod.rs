//! Schema validation for normalized case records
//!
//! Validation is advisory: every check reports a typed issue entry without
//! stopping the pipeline, and rows are retained with their violations
//! recorded. The single hard rule is the mandatory case date — downstream
//! storage cannot tolerate it being null, so those rows are removed from
//! the output set rather than defaulted.

use crate::app::models::{AnimalCategory, CaseRecord, CaseStatus, DataSource, Severity};
use crate::constants::REQUIRED_FIELDS;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

// =============================================================================
// Issue Types
// =============================================================================

/// Categories of validation findings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    MissingRequiredField,
    InvalidEnum,
    NullDate,
    FutureDate,
    InvalidCoordinate,
    BusinessRuleViolation,
}

impl IssueKind {
    /// Canonical string form used in summaries and logs
    pub fn as_str(self) -> &'static str {
        match self {
            IssueKind::MissingRequiredField => "missing_required_field",
            IssueKind::InvalidEnum => "invalid_enum",
            IssueKind::NullDate => "null_date",
            IssueKind::FutureDate => "future_date",
            IssueKind::InvalidCoordinate => "invalid_coordinate",
            IssueKind::BusinessRuleViolation => "business_rule_violation",
        }
    }
}

impl std::fmt::Display for IssueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Severity tier of a validation finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueSeverity {
    /// Minor issue; the value can be recomputed or ignored
    Warning,
    /// Significant issue affecting record quality
    Error,
    /// Structural issue affecting the whole batch
    Critical,
}

/// One validation finding covering `count` records
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub kind: IssueKind,

    /// Field the finding applies to, when field-specific
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,

    pub message: String,

    /// Number of records affected
    pub count: usize,

    pub severity: IssueSeverity,
}

impl ValidationIssue {
    fn new(
        kind: IssueKind,
        field: Option<&str>,
        message: impl Into<String>,
        count: usize,
        severity: IssueSeverity,
    ) -> Self {
        Self {
            kind,
            field: field.map(str::to_string),
            message: message.into(),
            count,
            severity,
        }
    }
}

/// Aggregate view of a validation run for the audit log
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationSummary {
    /// Number of issue entries reported
    pub total_issues: usize,

    /// Issue entry counts keyed by kind
    pub issues_by_kind: BTreeMap<String, usize>,

    /// Records that passed through validation
    pub records_validated: usize,

    /// Records removed by the null-date hard rule
    pub records_dropped: usize,

    /// First few issue entries for quick inspection
    pub sample_issues: Vec<ValidationIssue>,
}

impl ValidationSummary {
    /// Build a summary from a finished validation run
    pub fn from_issues(
        issues: &[ValidationIssue],
        records_validated: usize,
        records_dropped: usize,
    ) -> Self {
        let mut issues_by_kind = BTreeMap::new();
        for issue in issues {
            *issues_by_kind.entry(issue.kind.to_string()).or_insert(0) += 1;
        }
        Self {
            total_issues: issues.len(),
            issues_by_kind,
            records_validated,
            records_dropped,
            sample_issues: issues.iter().take(10).cloned().collect(),
        }
    }
}

// =============================================================================
// Schema Validator
// =============================================================================

/// Validates case records against the canonical schema and business rules
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaValidator;

impl SchemaValidator {
    /// Create a schema validator
    pub fn new() -> Self {
        Self
    }

    /// Validate records, returning the retained records and all findings
    ///
    /// Non-mutating except for dropping rows with a null case date.
    pub fn validate(&self, records: Vec<CaseRecord>) -> (Vec<CaseRecord>, Vec<ValidationIssue>) {
        let mut issues = Vec::new();
        let total = records.len();

        self.check_required_fields(&records, &mut issues);
        self.check_enums(&records, &mut issues);
        self.check_dates(&records, &mut issues);
        self.check_coordinates(&records, &mut issues);
        self.check_business_rules(&records, &mut issues);

        let retained: Vec<CaseRecord> = records
            .into_iter()
            .filter(|r| r.case_date.is_some())
            .collect();

        info!(
            "Validation complete: {} of {} records retained, {} issue entries",
            retained.len(),
            total,
            issues.len()
        );

        (retained, issues)
    }

    fn check_required_fields(&self, records: &[CaseRecord], issues: &mut Vec<ValidationIssue>) {
        if records.is_empty() {
            return;
        }

        for &field in REQUIRED_FIELDS {
            let is_missing = |r: &CaseRecord| match field {
                "case_date" => r.case_date.is_none(),
                "animal_category" => r.animal_category.trim().is_empty(),
                "country" => r.country.trim().is_empty(),
                "data_source" => r.data_source.trim().is_empty(),
                "status" => r.status.trim().is_empty(),
                _ => false,
            };

            let missing = records.iter().filter(|r| is_missing(r)).count();
            // Every record missing the field means the source column never
            // made it through normalization at all
            if missing == records.len() {
                issues.push(ValidationIssue::new(
                    IssueKind::MissingRequiredField,
                    Some(field),
                    format!("required field '{}' is missing from all records", field),
                    missing,
                    IssueSeverity::Critical,
                ));
            }
        }
    }

    fn check_enums(&self, records: &[CaseRecord], issues: &mut Vec<ValidationIssue>) {
        self.check_enum_field(
            records,
            "animal_category",
            |r| Some(r.animal_category.as_str()),
            AnimalCategory::is_valid,
            IssueSeverity::Error,
            issues,
        );
        self.check_enum_field(
            records,
            "data_source",
            |r| Some(r.data_source.as_str()),
            DataSource::is_valid,
            IssueSeverity::Error,
            issues,
        );
        self.check_enum_field(
            records,
            "status",
            |r| Some(r.status.as_str()),
            CaseStatus::is_valid,
            IssueSeverity::Error,
            issues,
        );
        // Severity can be recomputed from the affected count, so a bad
        // value is only a warning
        self.check_enum_field(
            records,
            "severity",
            |r| r.severity.as_deref(),
            Severity::is_valid,
            IssueSeverity::Warning,
            issues,
        );
    }

    fn check_enum_field(
        &self,
        records: &[CaseRecord],
        field: &str,
        value_of: fn(&CaseRecord) -> Option<&str>,
        is_valid: fn(&str) -> bool,
        severity: IssueSeverity,
        issues: &mut Vec<ValidationIssue>,
    ) {
        let mut invalid_count = 0usize;
        let mut invalid_values: Vec<String> = Vec::new();

        for record in records {
            if let Some(value) = value_of(record) {
                if !value.is_empty() && !is_valid(value) {
                    invalid_count += 1;
                    if !invalid_values.iter().any(|v| v == value) && invalid_values.len() < 5 {
                        invalid_values.push(value.to_string());
                    }
                }
            }
        }

        if invalid_count > 0 {
            issues.push(ValidationIssue::new(
                IssueKind::InvalidEnum,
                Some(field),
                format!("invalid {} values: {:?}", field, invalid_values),
                invalid_count,
                severity,
            ));
        }
    }

    fn check_dates(&self, records: &[CaseRecord], issues: &mut Vec<ValidationIssue>) {
        let null_dates = records.iter().filter(|r| r.case_date.is_none()).count();
        if null_dates > 0 {
            issues.push(ValidationIssue::new(
                IssueKind::NullDate,
                Some("case_date"),
                format!("found {} null case_date values", null_dates),
                null_dates,
                IssueSeverity::Error,
            ));
        }

        let today = Utc::now().date_naive();
        let future_dates = records
            .iter()
            .filter(|r| r.case_date.is_some_and(|d| d > today))
            .count();
        if future_dates > 0 {
            issues.push(ValidationIssue::new(
                IssueKind::FutureDate,
                Some("case_date"),
                format!("found {} future case_date values", future_dates),
                future_dates,
                IssueSeverity::Warning,
            ));
        }
    }

    fn check_coordinates(&self, records: &[CaseRecord], issues: &mut Vec<ValidationIssue>) {
        let invalid_lat = records
            .iter()
            .filter(|r| r.latitude.is_some_and(|lat| !(-90.0..=90.0).contains(&lat)))
            .count();
        if invalid_lat > 0 {
            issues.push(ValidationIssue::new(
                IssueKind::InvalidCoordinate,
                Some("latitude"),
                format!(
                    "found {} invalid latitude values (must be -90 to 90)",
                    invalid_lat
                ),
                invalid_lat,
                IssueSeverity::Error,
            ));
        }

        let invalid_lon = records
            .iter()
            .filter(|r| {
                r.longitude
                    .is_some_and(|lon| !(-180.0..=180.0).contains(&lon))
            })
            .count();
        if invalid_lon > 0 {
            issues.push(ValidationIssue::new(
                IssueKind::InvalidCoordinate,
                Some("longitude"),
                format!(
                    "found {} invalid longitude values (must be -180 to 180)",
                    invalid_lon
                ),
                invalid_lon,
                IssueSeverity::Error,
            ));
        }
    }

    fn check_business_rules(&self, records: &[CaseRecord], issues: &mut Vec<ValidationIssue>) {
        let violations = records
            .iter()
            .filter(|r| match (r.animals_dead, r.animals_affected) {
                (Some(dead), Some(affected)) => dead > affected,
                _ => false,
            })
            .count();
        if violations > 0 {
            issues.push(ValidationIssue::new(
                IssueKind::BusinessRuleViolation,
                None,
                format!(
                    "found {} cases where animals_dead > animals_affected",
                    violations
                ),
                violations,
                IssueSeverity::Warning,
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn valid_record(external_id: &str) -> CaseRecord {
        CaseRecord {
            external_id: external_id.to_string(),
            case_date: NaiveDate::from_ymd_opt(2024, 3, 15),
            status: "confirmed".to_string(),
            severity: Some("medium".to_string()),
            animal_category: "poultry".to_string(),
            animal_species: Some("Turkey".to_string()),
            animals_affected: Some(500),
            country: "USA".to_string(),
            state_province: Some("Iowa".to_string()),
            county: Some("Polk".to_string()),
            data_source: "usda".to_string(),
            ..CaseRecord::default()
        }
    }

    #[test]
    fn test_clean_records_pass() {
        let validator = SchemaValidator::new();
        let (retained, issues) = validator.validate(vec![valid_record("A"), valid_record("B")]);
        assert_eq!(retained.len(), 2);
        assert!(issues.is_empty());
    }

    #[test]
    fn test_null_case_date_dropped() {
        let mut bad = valid_record("B");
        bad.case_date = None;

        let validator = SchemaValidator::new();
        let (retained, issues) = validator.validate(vec![valid_record("A"), bad]);

        assert_eq!(retained.len(), 1);
        assert_eq!(retained[0].external_id, "A");
        assert!(issues
            .iter()
            .any(|i| i.kind == IssueKind::NullDate && i.severity == IssueSeverity::Error));
    }

    #[test]
    fn test_out_of_range_latitude_flagged_not_clamped() {
        let mut record = valid_record("A");
        record.latitude = Some(95.0);
        record.longitude = Some(-120.0);

        let validator = SchemaValidator::new();
        let (retained, issues) = validator.validate(vec![record]);

        // Flagged as an error but the value is untouched
        assert_eq!(retained[0].latitude, Some(95.0));
        let issue = issues
            .iter()
            .find(|i| i.kind == IssueKind::InvalidCoordinate)
            .unwrap();
        assert_eq!(issue.field.as_deref(), Some("latitude"));
        assert_eq!(issue.severity, IssueSeverity::Error);
        assert_eq!(issue.count, 1);
    }

    #[test]
    fn test_invalid_enum_reported_but_retained() {
        let mut record = valid_record("A");
        record.status = "active".to_string();

        let validator = SchemaValidator::new();
        let (retained, issues) = validator.validate(vec![record]);

        assert_eq!(retained.len(), 1);
        let issue = issues
            .iter()
            .find(|i| i.kind == IssueKind::InvalidEnum)
            .unwrap();
        assert_eq!(issue.field.as_deref(), Some("status"));
        assert_eq!(issue.severity, IssueSeverity::Error);
    }

    #[test]
    fn test_bad_severity_is_only_warning() {
        let mut record = valid_record("A");
        record.severity = Some("extreme".to_string());

        let validator = SchemaValidator::new();
        let (_, issues) = validator.validate(vec![record]);

        let issue = issues
            .iter()
            .find(|i| i.field.as_deref() == Some("severity"))
            .unwrap();
        assert_eq!(issue.severity, IssueSeverity::Warning);
    }

    #[test]
    fn test_future_date_warning() {
        let mut record = valid_record("A");
        record.case_date = Some(Utc::now().date_naive() + Duration::days(30));

        let validator = SchemaValidator::new();
        let (retained, issues) = validator.validate(vec![record]);

        assert_eq!(retained.len(), 1);
        assert!(issues
            .iter()
            .any(|i| i.kind == IssueKind::FutureDate && i.severity == IssueSeverity::Warning));
    }

    #[test]
    fn test_dead_exceeding_affected_is_warning() {
        let mut record = valid_record("A");
        record.animals_affected = Some(10);
        record.animals_dead = Some(25);

        let validator = SchemaValidator::new();
        let (retained, issues) = validator.validate(vec![record]);

        assert_eq!(retained.len(), 1);
        assert!(issues.iter().any(|i| {
            i.kind == IssueKind::BusinessRuleViolation && i.severity == IssueSeverity::Warning
        }));
    }

    #[test]
    fn test_entirely_missing_field_is_critical() {
        let mut a = valid_record("A");
        let mut b = valid_record("B");
        a.data_source = String::new();
        b.data_source = String::new();

        let validator = SchemaValidator::new();
        let (_, issues) = validator.validate(vec![a, b]);

        let issue = issues
            .iter()
            .find(|i| i.kind == IssueKind::MissingRequiredField)
            .unwrap();
        assert_eq!(issue.field.as_deref(), Some("data_source"));
        assert_eq!(issue.severity, IssueSeverity::Critical);
        assert_eq!(issue.count, 2);
    }

    #[test]
    fn test_summary_counts_by_kind() {
        let mut a = valid_record("A");
        a.status = "bogus".to_string();
        let mut b = valid_record("B");
        b.case_date = None;

        let validator = SchemaValidator::new();
        let before = 2;
        let (retained, issues) = validator.validate(vec![a, b]);
        let summary =
            ValidationSummary::from_issues(&issues, retained.len(), before - retained.len());

        assert_eq!(summary.records_validated, 1);
        assert_eq!(summary.records_dropped, 1);
        assert_eq!(summary.issues_by_kind.get("invalid_enum"), Some(&1));
        assert_eq!(summary.issues_by_kind.get("null_date"), Some(&1));
    }
}
