//! Minimal CSV reading and writing for the import templates
//!
//! Fields are comma separated; a field containing a comma, quote, CR or LF
//! is wrapped in double quotes with inner quotes doubled. The reader accepts
//! the same, including quoted fields spanning lines, and skips `#` comment
//! lines and blank lines between records.

use crate::error::{ImportError, ModelError};
use crate::labels::PredictedCostRange;
use crate::model::*;
use std::borrow::Cow;
use std::collections::HashMap;
use std::str::FromStr;

fn needs_quotes(field: &str) -> bool {
    field.contains([',', '"', '\n', '\r'])
}

/// Quote a field if it needs it
pub fn escape_field(field: &str) -> Cow<'_, str> {
    if needs_quotes(field) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

/// One record, without the trailing newline
pub fn format_record<S: AsRef<str>>(fields: &[S]) -> String {
    fields
        .iter()
        .map(|f| escape_field(f.as_ref()))
        .collect::<Vec<_>>()
        .join(",")
}

/// A parsed record and the 1-based line it starts on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    pub line: usize,
    pub fields: Vec<String>,
}

/// Split `text` into records, skipping comment and blank lines
pub fn parse_records(text: &str) -> Result<Vec<RawRecord>, ImportError> {
    let mut records = Vec::new();
    let mut chars = text.chars().peekable();
    let mut line = 1;

    while chars.peek().is_some() {
        let start_line = line;

        // comment or blank line
        match chars.peek() {
            Some('#') => {
                for c in chars.by_ref() {
                    if c == '\n' {
                        line += 1;
                        break;
                    }
                }
                continue;
            }
            Some('\n') => {
                chars.next();
                line += 1;
                continue;
            }
            Some('\r') => {
                chars.next();
                continue;
            }
            _ => {}
        }

        let mut fields = Vec::new();
        let mut field = String::new();
        let mut in_quotes = false;
        let mut quoted = false;

        loop {
            let Some(c) = chars.next() else {
                if in_quotes {
                    return Err(ImportError::UnterminatedQuote { row: start_line });
                }
                break;
            };

            if in_quotes {
                match c {
                    '"' if chars.peek() == Some(&'"') => {
                        chars.next();
                        field.push('"');
                    }
                    '"' => in_quotes = false,
                    '\n' => {
                        line += 1;
                        field.push(c);
                    }
                    _ => field.push(c),
                }
                continue;
            }

            match c {
                '"' if field.is_empty() && !quoted => {
                    in_quotes = true;
                    quoted = true;
                }
                ',' => {
                    fields.push(std::mem::take(&mut field));
                    quoted = false;
                }
                '\r' => {}
                '\n' => {
                    line += 1;
                    break;
                }
                _ => field.push(c),
            }
        }

        fields.push(field);
        records.push(RawRecord {
            line: start_line,
            fields,
        });
    }

    Ok(records)
}

/// Column positions of a header row, bound by name
#[derive(Debug, Clone)]
pub struct Header {
    index: HashMap<&'static str, usize>,
}

impl Header {
    /// Locate every column of `T` in `fields`. Extra columns are ignored
    /// and column order does not matter.
    pub fn bind<T: CsvRecord>(fields: &[String]) -> Result<Self, ImportError> {
        let mut index = HashMap::with_capacity(T::COLUMNS.len());
        for column in T::COLUMNS {
            let position = fields
                .iter()
                .position(|f| f.trim() == *column)
                .ok_or(ImportError::MissingColumn(*column))?;
            index.insert(*column, position);
        }
        Ok(Header { index })
    }
}

/// A data record viewed through its header
pub struct Row<'a> {
    header: &'a Header,
    record: &'a RawRecord,
}

impl<'a> Row<'a> {
    pub fn new(header: &'a Header, record: &'a RawRecord) -> Self {
        Row { header, record }
    }

    pub fn line(&self) -> usize {
        self.record.line
    }

    /// Trimmed text of a column; empty when the record is short
    pub fn text(&self, column: &'static str) -> &'a str {
        self.header
            .index
            .get(column)
            .and_then(|i| self.record.fields.get(*i))
            .map(|s| s.trim())
            .unwrap_or("")
    }

    pub fn parse<T>(&self, column: &'static str) -> Result<T, ImportError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        let raw = self.text(column);
        if raw.is_empty() {
            return Err(self.field_error(column, "value is required".to_string()));
        }
        raw.parse()
            .map_err(|e: T::Err| self.field_error(column, format!("'{}': {}", raw, e)))
    }

    /// `None` for a blank field
    pub fn parse_optional<T>(&self, column: &'static str) -> Result<Option<T>, ImportError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        if self.text(column).is_empty() {
            Ok(None)
        } else {
            self.parse(column).map(Some)
        }
    }

    pub fn field_error(&self, column: &'static str, message: String) -> ImportError {
        ImportError::Field {
            row: self.record.line,
            column,
            message,
        }
    }

    pub fn model_error(&self, source: ModelError) -> ImportError {
        ImportError::Model {
            row: self.record.line,
            source,
        }
    }
}

/// An entity with a CSV template
pub trait CsvRecord: Sized {
    /// Template file name
    const FILE_NAME: &'static str;
    /// Header columns in template order
    const COLUMNS: &'static [&'static str];

    fn to_row(&self) -> Vec<String>;

    fn from_row(row: &Row<'_>) -> Result<Self, ImportError>;
}

fn money(value: f64) -> String {
    format!("{:.2}", value)
}

impl CsvRecord for MonthlyCostSummary {
    const FILE_NAME: &'static str = "monthly_costs.csv";
    const COLUMNS: &'static [&'static str] = &[
        "month",
        "year",
        "medical_plan_payment",
        "rx_plan_payment",
        "member_enrollment",
    ];

    fn to_row(&self) -> Vec<String> {
        vec![
            self.month.clone(),
            self.year.to_string(),
            money(self.medical_plan_payment),
            money(self.rx_plan_payment),
            self.member_enrollment.to_string(),
        ]
    }

    fn from_row(row: &Row<'_>) -> Result<Self, ImportError> {
        MonthlyCostSummary::new(
            row.text("month"),
            row.parse("year")?,
            row.parse("medical_plan_payment")?,
            row.parse("rx_plan_payment")?,
            row.parse("member_enrollment")?,
        )
        .map_err(|e| row.model_error(e))
    }
}

impl CsvRecord for HighCostClaimant {
    const FILE_NAME: &'static str = "high_cost_claimants.csv";
    const COLUMNS: &'static [&'static str] =
        &["member_id", "medical_payment", "rx_payment", "predicted_cost_range"];

    fn to_row(&self) -> Vec<String> {
        vec![
            self.member_id.clone(),
            money(self.medical_payment),
            money(self.rx_payment),
            self.predicted_cost_range
                .map(|r| r.label().to_string())
                .unwrap_or_default(),
        ]
    }

    fn from_row(row: &Row<'_>) -> Result<Self, ImportError> {
        HighCostClaimant::new(
            row.text("member_id"),
            row.parse("medical_payment")?,
            row.parse("rx_payment")?,
            row.parse_optional::<PredictedCostRange>("predicted_cost_range")?,
        )
        .map_err(|e| row.model_error(e))
    }
}

impl CsvRecord for DiagnosisByCost {
    const FILE_NAME: &'static str = "diagnosis_by_cost.csv";
    const COLUMNS: &'static [&'static str] =
        &["diagnosis_code", "diagnosis_description", "total_cost", "percentage"];

    fn to_row(&self) -> Vec<String> {
        vec![
            self.diagnosis_code.clone(),
            self.diagnosis_description.clone(),
            money(self.total_cost),
            format!("{:.2}", self.percentage),
        ]
    }

    fn from_row(row: &Row<'_>) -> Result<Self, ImportError> {
        DiagnosisByCost::new(
            row.text("diagnosis_code"),
            row.text("diagnosis_description"),
            row.parse("total_cost")?,
            row.parse("percentage")?,
        )
        .map_err(|e| row.model_error(e))
    }
}

impl CsvRecord for DiagnosisByUtilization {
    const FILE_NAME: &'static str = "diagnosis_by_utilization.csv";
    const COLUMNS: &'static [&'static str] =
        &["diagnosis_code", "diagnosis_description", "claim_count", "percentage"];

    fn to_row(&self) -> Vec<String> {
        vec![
            self.diagnosis_code.clone(),
            self.diagnosis_description.clone(),
            self.claim_count.to_string(),
            format!("{:.2}", self.percentage),
        ]
    }

    fn from_row(row: &Row<'_>) -> Result<Self, ImportError> {
        DiagnosisByUtilization::new(
            row.text("diagnosis_code"),
            row.text("diagnosis_description"),
            row.parse("claim_count")?,
            row.parse("percentage")?,
        )
        .map_err(|e| row.model_error(e))
    }
}

impl CsvRecord for DrugClass {
    const FILE_NAME: &'static str = "drug_classes.csv";
    const COLUMNS: &'static [&'static str] =
        &["drug_class_name", "script_count", "patient_cost", "plan_payment"];

    fn to_row(&self) -> Vec<String> {
        vec![
            self.drug_class_name.clone(),
            self.script_count.to_string(),
            money(self.patient_cost),
            money(self.plan_payment),
        ]
    }

    fn from_row(row: &Row<'_>) -> Result<Self, ImportError> {
        DrugClass::new(
            row.text("drug_class_name"),
            row.parse("script_count")?,
            row.parse("patient_cost")?,
            row.parse("plan_payment")?,
        )
        .map_err(|e| row.model_error(e))
    }
}

impl CsvRecord for PreventiveScreening {
    const FILE_NAME: &'static str = "preventive_screenings.csv";
    const COLUMNS: &'static [&'static str] = &[
        "screening_name",
        "prior_year_members",
        "current_year_members",
        "prior_participation_percent",
        "current_participation_percent",
    ];

    fn to_row(&self) -> Vec<String> {
        vec![
            self.screening_name.clone(),
            self.prior_year_members.to_string(),
            self.current_year_members.to_string(),
            self.prior_participation_percent.to_string(),
            self.current_participation_percent.to_string(),
        ]
    }

    fn from_row(row: &Row<'_>) -> Result<Self, ImportError> {
        PreventiveScreening::new(
            row.text("screening_name"),
            row.parse("prior_year_members")?,
            row.parse("current_year_members")?,
            row.parse("prior_participation_percent")?,
            row.parse("current_participation_percent")?,
        )
        .map_err(|e| row.model_error(e))
    }
}

impl CsvRecord for ChronicConditionCompliance {
    const FILE_NAME: &'static str = "chronic_condition_compliance.csv";
    const COLUMNS: &'static [&'static str] =
        &["condition_name", "compliant_count", "non_compliant_count", "avg_pmpy"];

    fn to_row(&self) -> Vec<String> {
        vec![
            self.condition_name.clone(),
            self.compliant_count.to_string(),
            self.non_compliant_count.to_string(),
            money(self.avg_pmpy),
        ]
    }

    fn from_row(row: &Row<'_>) -> Result<Self, ImportError> {
        ChronicConditionCompliance::new(
            row.text("condition_name"),
            row.parse("compliant_count")?,
            row.parse("non_compliant_count")?,
            row.parse("avg_pmpy")?,
        )
        .map_err(|e| row.model_error(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_field() {
        assert_eq!(escape_field("ANTIHYPERTENSIVES"), "ANTIHYPERTENSIVES");
        assert_eq!(
            escape_field("Malignant neoplasm of upper lobe, right bronchus"),
            "\"Malignant neoplasm of upper lobe, right bronchus\""
        );
        assert_eq!(escape_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_parse_skips_comments_and_blank_lines() {
        let text = "# Title\n# - rule, with comma\n\nmonth,year\nApril,2024\n";
        let records = parse_records(text).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].line, 4);
        assert_eq!(records[0].fields, vec!["month", "year"]);
        assert_eq!(records[1].line, 5);
    }

    #[test]
    fn test_parse_quoted_fields() {
        let text = "a,\"b, c\",\"d \"\"e\"\"\"\r\n\"multi\nline\",x\n";
        let records = parse_records(text).unwrap();
        assert_eq!(records[0].fields, vec!["a", "b, c", "d \"e\""]);
        assert_eq!(records[1].fields, vec!["multi\nline", "x"]);
        assert_eq!(records[1].line, 2);
    }

    #[test]
    fn test_unterminated_quote() {
        let err = parse_records("ok\n\"never closed,1\n").unwrap_err();
        assert!(matches!(err, ImportError::UnterminatedQuote { row: 2 }));
    }

    #[test]
    fn test_format_then_parse_preserves_fields() {
        let fields = ["C34.11", "Malignant neoplasm of upper lobe, right bronchus", "1.00"];
        let line = format_record(&fields);
        let records = parse_records(&line).unwrap();
        assert_eq!(records[0].fields, fields);
    }

    #[test]
    fn test_header_binds_by_name() {
        let header = vec![
            "percentage".to_string(),
            "diagnosis_code".to_string(),
            "total_cost".to_string(),
            "diagnosis_description".to_string(),
        ];
        let bound = Header::bind::<DiagnosisByCost>(&header).unwrap();
        let record = RawRecord {
            line: 3,
            fields: vec!["12.5".into(), "A41.9".into(), "1000".into(), "Sepsis".into()],
        };
        let dx = DiagnosisByCost::from_row(&Row::new(&bound, &record)).unwrap();
        assert_eq!(dx.diagnosis_code, "A41.9");
        assert_eq!(dx.percentage, 12.5);

        let err = Header::bind::<DrugClass>(&header).unwrap_err();
        assert!(matches!(err, ImportError::MissingColumn("drug_class_name")));
    }

    #[test]
    fn test_row_errors_name_row_and_column() {
        let header = Header::bind::<DrugClass>(
            &DrugClass::COLUMNS.iter().map(|c| c.to_string()).collect::<Vec<_>>(),
        )
        .unwrap();
        let record = RawRecord {
            line: 9,
            fields: vec!["STATINS".into(), "many".into(), "1".into(), "2".into()],
        };
        let err = DrugClass::from_row(&Row::new(&header, &record)).unwrap_err();
        assert!(matches!(
            err,
            ImportError::Field { row: 9, column: "script_count", .. }
        ));

        let record = RawRecord {
            line: 10,
            fields: vec!["STATINS".into(), "5".into(), "-1".into(), "2".into()],
        };
        let err = DrugClass::from_row(&Row::new(&header, &record)).unwrap_err();
        assert!(matches!(err, ImportError::Model { row: 10, .. }));
    }

    #[test]
    fn test_blank_predicted_range_is_none() {
        let claimant = HighCostClaimant::new("M1", 10.0, 2.0, None).unwrap();
        let row = claimant.to_row();
        assert_eq!(row[3], "");

        let header = Header::bind::<HighCostClaimant>(
            &HighCostClaimant::COLUMNS.iter().map(|c| c.to_string()).collect::<Vec<_>>(),
        )
        .unwrap();
        let record = RawRecord { line: 2, fields: row };
        let back = HighCostClaimant::from_row(&Row::new(&header, &record)).unwrap();
        assert_eq!(back.predicted_cost_range, None);
    }
}
