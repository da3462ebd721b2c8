//! Column catalog for the generic user patch
//!
//! The writable user columns and the scalar kind each one accepts are
//! declared statically here. The catalog is checked once against the live
//! schema at startup; requests are validated against the catalog only.

use chrono::NaiveDate;
use common::error::{DatabaseError, DatabaseResult};
use serde::Serialize;
use serde_json::{Map, Value};
use sqlx::{PgPool, Row};
use tracing::info;

use crate::error::ApiError;

/// Scalar kind a column accepts from JSON
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    /// `YYYY-MM-DD` string
    Date,
    /// String restricted to a fixed set of values
    Enum(&'static [&'static str]),
    /// Not writable through the patch; only described for the schema check
    Opaque,
}

impl ColumnKind {
    fn expected(&self) -> String {
        match self {
            ColumnKind::Text | ColumnKind::Opaque => "string".to_string(),
            ColumnKind::Date => "date (YYYY-MM-DD)".to_string(),
            ColumnKind::Enum(values) => format!("one of [{}]", values.join(", ")),
        }
    }

    fn placeholder(&self, index: usize) -> String {
        match self {
            ColumnKind::Date => format!("${}::date", index),
            _ => format!("${}", index),
        }
    }
}

/// One column of the `users` table
#[derive(Debug, Clone, Copy)]
pub struct ColumnSpec {
    pub name: &'static str,
    /// `information_schema.columns.data_type`
    pub data_type: &'static str,
    pub kind: ColumnKind,
    pub nullable: bool,
    pub writable: bool,
}

const fn column(
    name: &'static str,
    data_type: &'static str,
    kind: ColumnKind,
    nullable: bool,
    writable: bool,
) -> ColumnSpec {
    ColumnSpec {
        name,
        data_type,
        kind,
        nullable,
        writable,
    }
}

pub const GENDERS: &[&str] = &["MALE", "FEMALE", "OTHER"];
pub const USER_STATUSES: &[&str] = &[
    "INITIATED",
    "PENDING",
    "VERIFIED",
    "REJECTED",
    "BLOCKED",
    "DELETED",
];

pub const USER_COLUMNS: &[ColumnSpec] = &[
    column("id", "uuid", ColumnKind::Opaque, false, false),
    column("name", "text", ColumnKind::Text, false, true),
    column("email", "text", ColumnKind::Text, false, true),
    column("phone", "text", ColumnKind::Text, true, true),
    column("dob", "date", ColumnKind::Date, true, true),
    column("gender", "text", ColumnKind::Enum(GENDERS), true, true),
    column("address", "text", ColumnKind::Text, true, true),
    column("documents", "jsonb", ColumnKind::Opaque, false, false),
    column("level_id", "uuid", ColumnKind::Opaque, true, false),
    column("status", "text", ColumnKind::Enum(USER_STATUSES), false, true),
    column("push_token", "text", ColumnKind::Text, true, true),
    column("approved_by", "uuid", ColumnKind::Opaque, true, false),
    column("created_at", "timestamp with time zone", ColumnKind::Opaque, false, false),
];

/// Expected versus received kind for one column
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnMismatch {
    pub column: String,
    pub expected: String,
    pub received: String,
}

/// A patch that passed both validation tiers
#[derive(Debug, Clone)]
pub struct ValidatedPatch {
    assignments: Vec<(&'static ColumnSpec, Option<String>)>,
}

impl ValidatedPatch {
    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// `col = $2, col2 = $3::date, ...`; `$1` is left for the row id
    pub fn set_clause(&self) -> String {
        self.assignments
            .iter()
            .enumerate()
            .map(|(i, (spec, _))| format!("{} = {}", spec.name, spec.kind.placeholder(i + 2)))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Bind values in placeholder order
    pub fn values(&self) -> impl Iterator<Item = &Option<String>> {
        self.assignments.iter().map(|(_, value)| value)
    }

    pub fn columns(&self) -> Vec<&'static str> {
        self.assignments.iter().map(|(spec, _)| spec.name).collect()
    }
}

fn writable_column(name: &str) -> Option<&'static ColumnSpec> {
    USER_COLUMNS.iter().find(|c| c.name == name && c.writable)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn check_value(spec: &ColumnSpec, value: &Value) -> Result<Option<String>, ColumnMismatch> {
    let mismatch = |received: String| ColumnMismatch {
        column: spec.name.to_string(),
        expected: if spec.nullable {
            format!("{} or null", spec.kind.expected())
        } else {
            spec.kind.expected()
        },
        received,
    };

    let text = match value {
        Value::Null if spec.nullable => return Ok(None),
        Value::String(text) => text,
        other => return Err(mismatch(json_kind(other).to_string())),
    };

    match spec.kind {
        ColumnKind::Date if NaiveDate::parse_from_str(text, "%Y-%m-%d").is_err() => {
            Err(mismatch(format!("string \"{}\"", text)))
        }
        ColumnKind::Enum(values) if !values.contains(&text.as_str()) => {
            Err(mismatch(format!("string \"{}\"", text)))
        }
        _ => Ok(Some(text.clone())),
    }
}

/// Validate a generic patch against the catalog
///
/// Unknown or read-only keys are reported first, all together; only a patch
/// with valid keys gets its values checked, again reporting every mismatch.
pub fn validate_patch(updates: &Map<String, Value>) -> Result<ValidatedPatch, ApiError> {
    let mut invalid: Vec<String> = updates
        .keys()
        .filter(|key| writable_column(key).is_none())
        .cloned()
        .collect();

    if !invalid.is_empty() {
        invalid.sort();
        return Err(ApiError::InvalidColumns(invalid));
    }

    let mut assignments = Vec::with_capacity(updates.len());
    let mut mismatches = Vec::new();

    for (key, value) in updates {
        // Keys were checked above
        let Some(spec) = writable_column(key) else {
            continue;
        };
        match check_value(spec, value) {
            Ok(bound) => assignments.push((spec, bound)),
            Err(mismatch) => mismatches.push(mismatch),
        }
    }

    if !mismatches.is_empty() {
        mismatches.sort_by(|a, b| a.column.cmp(&b.column));
        return Err(ApiError::TypeMismatch(mismatches));
    }

    Ok(ValidatedPatch { assignments })
}

/// A column as described by `information_schema`
#[derive(Debug, Clone)]
pub struct LiveColumn {
    pub name: String,
    pub data_type: String,
    pub nullable: bool,
}

/// Compare the catalog with the live columns, returning every discrepancy
pub fn catalog_discrepancies(live: &[LiveColumn]) -> Vec<String> {
    USER_COLUMNS
        .iter()
        .filter_map(|spec| match live.iter().find(|c| c.name == spec.name) {
            None => Some(format!("users.{} is missing", spec.name)),
            Some(col) if col.data_type != spec.data_type => Some(format!(
                "users.{} has type {}, expected {}",
                spec.name, col.data_type, spec.data_type
            )),
            Some(col) if col.nullable != spec.nullable => Some(format!(
                "users.{} nullability is {}, expected {}",
                spec.name, col.nullable, spec.nullable
            )),
            Some(_) => None,
        })
        .collect()
}

/// Check the catalog against the live `users` table once
pub async fn verify_user_columns(pool: &PgPool) -> DatabaseResult<()> {
    let rows = sqlx::query(
        r#"
        SELECT column_name::TEXT AS column_name,
               data_type::TEXT AS data_type,
               is_nullable::TEXT AS is_nullable
        FROM information_schema.columns
        WHERE table_schema = current_schema() AND table_name = 'users'
        "#,
    )
    .fetch_all(pool)
    .await
    .map_err(DatabaseError::Query)?;

    let live = rows
        .iter()
        .map(|row| -> Result<LiveColumn, sqlx::Error> {
            Ok(LiveColumn {
                name: row.try_get("column_name")?,
                data_type: row.try_get("data_type")?,
                nullable: row.try_get::<String, _>("is_nullable")? == "YES",
            })
        })
        .collect::<Result<Vec<_>, _>>()
        .map_err(DatabaseError::Query)?;

    let problems = catalog_discrepancies(&live);
    if !problems.is_empty() {
        return Err(DatabaseError::SchemaMismatch(problems));
    }

    info!("User column catalog matches the live schema");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn patch(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_unknown_column_is_reported_alone() {
        let err = validate_patch(&patch(json!({ "nonexistent_col": "x" }))).unwrap_err();
        match err {
            ApiError::InvalidColumns(cols) => assert_eq!(cols, vec!["nonexistent_col"]),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_invalid_columns_are_aggregated() {
        let err = validate_patch(&patch(json!({
            "name": "Ada",
            "id": "00000000-0000-0000-0000-000000000000",
            "bogus": 1,
            "created_at": "2024-01-01"
        })))
        .unwrap_err();
        match err {
            ApiError::InvalidColumns(cols) => assert_eq!(cols, vec!["bogus", "created_at", "id"]),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_invalid_columns_win_over_type_mismatches() {
        let err = validate_patch(&patch(json!({ "name": 42, "bogus": "x" }))).unwrap_err();
        assert!(matches!(err, ApiError::InvalidColumns(_)));
    }

    #[test]
    fn test_type_mismatches_are_aggregated() {
        let err = validate_patch(&patch(json!({
            "name": 42,
            "dob": "12/31/1990",
            "gender": "ROBOT",
            "address": "Main street 1"
        })))
        .unwrap_err();
        match err {
            ApiError::TypeMismatch(found) => {
                let columns: Vec<_> = found.iter().map(|m| m.column.as_str()).collect();
                assert_eq!(columns, vec!["dob", "gender", "name"]);
                assert_eq!(found[2].expected, "string");
                assert_eq!(found[2].received, "number");
                assert_eq!(found[1].expected, "one of [MALE, FEMALE, OTHER] or null");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_null_only_for_nullable_columns() {
        assert!(validate_patch(&patch(json!({ "phone": null }))).is_ok());

        let err = validate_patch(&patch(json!({ "email": null }))).unwrap_err();
        match err {
            ApiError::TypeMismatch(found) => assert_eq!(found[0].received, "null"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_set_clause_casts_dates() {
        let mut updates = Map::new();
        updates.insert("dob".into(), json!("1990-12-31"));
        let validated = validate_patch(&updates).unwrap();
        assert_eq!(validated.set_clause(), "dob = $2::date");
        assert_eq!(validated.len(), 1);
        assert_eq!(
            validated.values().cloned().collect::<Vec<_>>(),
            vec![Some("1990-12-31".to_string())]
        );
    }

    #[test]
    fn test_empty_patch_validates_to_nothing() {
        let validated = validate_patch(&Map::new()).unwrap();
        assert!(validated.is_empty());
    }

    #[test]
    fn test_catalog_discrepancies() {
        let mut live: Vec<LiveColumn> = USER_COLUMNS
            .iter()
            .map(|spec| LiveColumn {
                name: spec.name.to_string(),
                data_type: spec.data_type.to_string(),
                nullable: spec.nullable,
            })
            .collect();
        assert!(catalog_discrepancies(&live).is_empty());

        live.retain(|c| c.name != "phone");
        live.iter_mut()
            .filter(|c| c.name == "dob")
            .for_each(|c| c.data_type = "text".to_string());

        let problems = catalog_discrepancies(&live);
        assert_eq!(problems.len(), 2);
        assert!(problems.iter().any(|p| p.contains("users.phone is missing")));
        assert!(problems.iter().any(|p| p.contains("users.dob has type text")));
    }
}
