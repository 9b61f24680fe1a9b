//! Row structs and payloads for the `companies` and `jobs` tables.
//!
//! Rust fields are snake_case and match the storage columns; the serde
//! representation is lower camelCase (`numEmployees`, `companyHandle`, ...).

use rust_decimal::Decimal;
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;

use crate::sql::SqlValue;
use crate::validate::{equity_in_range, non_negative, not_blank, slug};
use crate::DbError;

// ---------------------------------------------------------------------------
// companies
// ---------------------------------------------------------------------------

/// Width of `companies.handle` (`VARCHAR(25)`).
pub const HANDLE_MAX_LEN: usize = 25;

/// A persisted company row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub handle: String,
    pub name: String,
    pub description: String,
    pub num_employees: Option<i32>,
    pub logo_url: Option<String>,
}

/// A job as listed under its company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyJob {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<Decimal>,
}

/// A company together with its jobs, ordered by job id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyDetail {
    #[serde(flatten)]
    pub company: Company,
    pub jobs: Vec<CompanyJob>,
}

/// One row of `companies LEFT JOIN jobs`.
#[derive(Debug, FromRow)]
pub(crate) struct CompanyJobRow {
    pub handle: String,
    pub name: String,
    pub description: String,
    pub num_employees: Option<i32>,
    pub logo_url: Option<String>,
    pub job_id: Option<i32>,
    pub job_title: Option<String>,
    pub job_salary: Option<i32>,
    pub job_equity: Option<Decimal>,
}

impl CompanyJobRow {
    pub fn company(&self) -> Company {
        Company {
            handle: self.handle.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            num_employees: self.num_employees,
            logo_url: self.logo_url.clone(),
        }
    }

    /// The joined job, if the row carries one.
    pub fn job(self) -> Option<CompanyJob> {
        match (self.job_id, self.job_title) {
            (Some(id), Some(title)) => Some(CompanyJob {
                id,
                title,
                salary: self.job_salary,
                equity: self.job_equity,
            }),
            _ => None,
        }
    }
}

/// Payload for creating a company.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewCompany {
    pub handle: String,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub num_employees: Option<i32>,
    #[serde(default)]
    pub logo_url: Option<String>,
}

impl NewCompany {
    pub fn from_json(value: serde_json::Value) -> Result<Self, DbError> {
        parse_payload(value, &[], &[])
    }

    pub fn validate(&self) -> Result<(), DbError> {
        slug("handle", &self.handle, HANDLE_MAX_LEN)?;
        not_blank("name", &self.name)?;
        non_negative("numEmployees", self.num_employees)
    }
}

/// Partial update for a company. `handle` cannot be changed.
///
/// Nullable columns use `Option<Option<_>>`: outer `None` leaves the column
/// alone, `Some(None)` sets it to NULL. `name` and `description` are NOT NULL
/// columns, so an explicit `null` for them is rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CompanyUpdate {
    #[serde(default, deserialize_with = "deserialize_non_null")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_non_null")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub num_employees: Option<Option<i32>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub logo_url: Option<Option<String>>,
}

impl CompanyUpdate {
    pub fn from_json(value: serde_json::Value) -> Result<Self, DbError> {
        parse_payload(value, &["handle"], &["name", "description"])
    }

    pub fn validate(&self) -> Result<(), DbError> {
        if let Some(name) = &self.name {
            not_blank("name", name)?;
        }
        non_negative("numEmployees", self.num_employees.flatten())
    }

    /// Supplied fields in fixed order: name, description, numEmployees, logoUrl.
    pub fn into_fields(self) -> Vec<(&'static str, SqlValue)> {
        let mut fields = Vec::new();
        if let Some(v) = self.name {
            fields.push(("name", SqlValue::Text(Some(v))));
        }
        if let Some(v) = self.description {
            fields.push(("description", SqlValue::Text(Some(v))));
        }
        if let Some(v) = self.num_employees {
            fields.push(("numEmployees", SqlValue::Int(v)));
        }
        if let Some(v) = self.logo_url {
            fields.push(("logoUrl", SqlValue::Text(v)));
        }
        fields
    }
}

// ---------------------------------------------------------------------------
// jobs
// ---------------------------------------------------------------------------

/// A persisted job row. `equity` serializes as a decimal string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<Decimal>,
    pub company_handle: String,
}

/// A job together with the company that posted it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobDetail {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<Decimal>,
    pub company: Company,
}

/// One row of `jobs JOIN companies`.
#[derive(Debug, FromRow)]
pub(crate) struct JobCompanyRow {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<Decimal>,
    pub handle: String,
    pub name: String,
    pub description: String,
    pub num_employees: Option<i32>,
    pub logo_url: Option<String>,
}

impl From<JobCompanyRow> for JobDetail {
    fn from(row: JobCompanyRow) -> Self {
        JobDetail {
            id: row.id,
            title: row.title,
            salary: row.salary,
            equity: row.equity,
            company: Company {
                handle: row.handle,
                name: row.name,
                description: row.description,
                num_employees: row.num_employees,
                logo_url: row.logo_url,
            },
        }
    }
}

/// Payload for creating a job.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewJob {
    pub title: String,
    #[serde(default)]
    pub salary: Option<i32>,
    #[serde(default)]
    pub equity: Option<Decimal>,
    pub company_handle: String,
}

impl NewJob {
    pub fn from_json(value: serde_json::Value) -> Result<Self, DbError> {
        parse_payload(value, &["id"], &[])
    }

    pub fn validate(&self) -> Result<(), DbError> {
        not_blank("title", &self.title)?;
        not_blank("companyHandle", &self.company_handle)?;
        non_negative("salary", self.salary)?;
        equity_in_range(self.equity)
    }
}

/// Partial update for a job. `id` and `companyHandle` cannot be changed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct JobUpdate {
    #[serde(default, deserialize_with = "deserialize_non_null")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub salary: Option<Option<i32>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub equity: Option<Option<Decimal>>,
}

impl JobUpdate {
    pub fn from_json(value: serde_json::Value) -> Result<Self, DbError> {
        parse_payload(value, &["id", "companyHandle"], &["title"])
    }

    pub fn validate(&self) -> Result<(), DbError> {
        if let Some(title) = &self.title {
            not_blank("title", title)?;
        }
        non_negative("salary", self.salary.flatten())?;
        equity_in_range(self.equity.flatten())
    }

    /// Supplied fields in fixed order: title, salary, equity.
    pub fn into_fields(self) -> Vec<(&'static str, SqlValue)> {
        let mut fields = Vec::new();
        if let Some(v) = self.title {
            fields.push(("title", SqlValue::Text(Some(v))));
        }
        if let Some(v) = self.salary {
            fields.push(("salary", SqlValue::Int(v)));
        }
        if let Some(v) = self.equity {
            fields.push(("equity", SqlValue::Decimal(v)));
        }
        fields
    }
}

// ---------------------------------------------------------------------------
// helpers
// ---------------------------------------------------------------------------

/// Present-but-null becomes `Some(None)`; used with `#[serde(default)]`.
fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Optional field that may be omitted but never set to `null`.
fn deserialize_non_null<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer)?
        .map(Some)
        .ok_or_else(|| D::Error::custom("null is not allowed for a non-nullable field"))
}

/// Decode a JSON payload, rejecting the listed immutable keys and explicit
/// nulls for the listed non-nullable keys by name.
fn parse_payload<T: DeserializeOwned>(
    value: serde_json::Value,
    immutable: &[&str],
    non_nullable: &[&str],
) -> Result<T, DbError> {
    if let Some(obj) = value.as_object() {
        if let Some(key) = immutable.iter().find(|k| obj.contains_key(**k)) {
            return Err(DbError::validation(format!("{key} cannot be set")));
        }
        if let Some(key) = non_nullable
            .iter()
            .find(|k| obj.get(**k).is_some_and(serde_json::Value::is_null))
        {
            return Err(DbError::validation(format!("{key} cannot be null")));
        }
    }
    serde_json::from_value(value).map_err(|e| DbError::validation(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::str::FromStr;

    #[test]
    fn company_update_rejects_handle() {
        let err = CompanyUpdate::from_json(json!({ "handle": "new", "name": "x" })).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn company_update_keeps_fixed_field_order() {
        let update = CompanyUpdate::from_json(json!({
            "logoUrl": null,
            "numEmployees": 10,
            "name": "Acme",
        }))
        .unwrap();

        let fields = update.into_fields();
        assert_eq!(
            fields,
            vec![
                ("name", SqlValue::Text(Some("Acme".into()))),
                ("numEmployees", SqlValue::Int(Some(10))),
                ("logoUrl", SqlValue::Text(None)),
            ]
        );
    }

    #[test]
    fn company_update_rejects_unknown_keys() {
        assert!(CompanyUpdate::from_json(json!({ "ceo": "x" }))
            .unwrap_err()
            .is_validation());
    }

    #[test]
    fn job_update_rejects_company_handle_and_id() {
        assert!(JobUpdate::from_json(json!({ "companyHandle": "c2" }))
            .unwrap_err()
            .is_validation());
        assert!(JobUpdate::from_json(json!({ "id": 3 }))
            .unwrap_err()
            .is_validation());
    }

    #[test]
    fn empty_update_has_no_fields() {
        let update = JobUpdate::from_json(json!({})).unwrap();
        assert!(update.into_fields().is_empty());
    }

    #[test]
    fn new_job_validation() {
        let job = NewJob::from_json(json!({
            "title": "Engineer",
            "salary": 100,
            "equity": 1.5,
            "companyHandle": "c1",
        }))
        .unwrap();
        assert!(job.validate().unwrap_err().is_validation());

        let job = NewJob::from_json(json!({
            "title": "Engineer",
            "salary": -1,
            "companyHandle": "c1",
        }))
        .unwrap();
        assert!(job.validate().unwrap_err().is_validation());
    }

    #[test]
    fn null_for_non_nullable_update_field_is_rejected() {
        let err = CompanyUpdate::from_json(json!({ "name": null, "description": "x" }))
            .unwrap_err();
        assert!(err.is_validation());
        assert!(CompanyUpdate::from_json(json!({ "description": null }))
            .unwrap_err()
            .is_validation());
        assert!(JobUpdate::from_json(json!({ "title": null, "salary": 1 }))
            .unwrap_err()
            .is_validation());

        // Direct serde decoding refuses the null too.
        assert!(serde_json::from_value::<CompanyUpdate>(json!({ "name": null })).is_err());
        assert!(serde_json::from_value::<JobUpdate>(json!({ "title": null })).is_err());
    }

    #[test]
    fn nullable_update_fields_still_accept_null() {
        let update = JobUpdate::from_json(json!({ "title": "t", "equity": null })).unwrap();
        assert_eq!(update.title.as_deref(), Some("t"));
        assert_eq!(update.equity, Some(None));
    }

    #[test]
    fn new_company_handle_length_and_charset() {
        let company = |handle: &str| NewCompany {
            handle: handle.into(),
            name: "Acme".into(),
            description: String::new(),
            num_employees: None,
            logo_url: None,
        };

        assert!(company("a-very-long-company-handle-over-25")
            .validate()
            .unwrap_err()
            .is_validation());
        assert!(company(&"a".repeat(HANDLE_MAX_LEN)).validate().is_ok());
        assert!(company("acme-2").validate().is_ok());
        for bad in ["a/b", "a.b", "a b", "acme_co", "Acme"] {
            assert!(company(bad).validate().unwrap_err().is_validation(), "{bad}");
        }
    }

    #[test]
    fn equity_serializes_as_string() {
        let job = Job {
            id: 1,
            title: "j1".into(),
            salary: Some(1),
            equity: Some(Decimal::from_str("0.45").unwrap()),
            company_handle: "c1".into(),
        };
        let value = serde_json::to_value(&job).unwrap();
        assert_eq!(value["equity"], json!("0.45"));
        assert_eq!(value["companyHandle"], json!("c1"));
    }

    #[test]
    fn company_detail_flattens_company_fields() {
        let detail = CompanyDetail {
            company: Company {
                handle: "c1".into(),
                name: "C1".into(),
                description: "Desc1".into(),
                num_employees: Some(1),
                logo_url: None,
            },
            jobs: vec![],
        };
        let value = serde_json::to_value(&detail).unwrap();
        assert_eq!(value["handle"], json!("c1"));
        assert_eq!(value["numEmployees"], json!(1));
        assert_eq!(value["jobs"], json!([]));
    }
}
