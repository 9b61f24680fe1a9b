//! Listing filters for companies and jobs.
//!
//! Raw `key=value` options are validated once by `from_params`; the typed
//! record then renders a [`FilterClause`] with no further checks.

use crate::sql::{FilterClause, SqlValue};
use crate::validate::{contains_pattern, parse_bool, parse_int};
use crate::DbError;

/// Validated company listing filters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompanyFilter {
    pub name_like: Option<String>,
    pub min_employees: Option<i32>,
    pub max_employees: Option<i32>,
}

impl CompanyFilter {
    pub const KEYS: [&'static str; 3] = ["nameLike", "minEmployees", "maxEmployees"];

    /// Validate raw options. Unknown keys, non-integer bounds and
    /// `minEmployees > maxEmployees` are rejected.
    pub fn from_params<I, K, V>(params: I) -> Result<Self, DbError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut filter = CompanyFilter::default();
        for (key, value) in params {
            let (key, value) = (key.as_ref(), value.as_ref());
            match key {
                "nameLike" => filter.name_like = non_blank(value),
                "minEmployees" => filter.min_employees = Some(parse_int(key, value)?),
                "maxEmployees" => filter.max_employees = Some(parse_int(key, value)?),
                other => return Err(unknown_key(other, &Self::KEYS)),
            }
        }

        if let (Some(min), Some(max)) = (filter.min_employees, filter.max_employees) {
            if min > max {
                return Err(DbError::validation(format!(
                    "minEmployees ({min}) cannot be greater than maxEmployees ({max})"
                )));
            }
        }

        Ok(filter)
    }

    pub fn is_empty(&self) -> bool {
        self.name_like.is_none() && self.min_employees.is_none() && self.max_employees.is_none()
    }

    /// Predicate over `companies`, in key order nameLike, minEmployees, maxEmployees.
    pub fn to_clause(&self) -> FilterClause {
        let mut clause = FilterClause::new();
        if let Some(name) = &self.name_like {
            clause.push_param("name ILIKE $", SqlValue::from(contains_pattern(name)));
        }
        if let Some(min) = self.min_employees {
            clause.push_param("num_employees >= $", SqlValue::from(min));
        }
        if let Some(max) = self.max_employees {
            clause.push_param("num_employees <= $", SqlValue::from(max));
        }
        clause
    }
}

/// Validated job listing filters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobFilter {
    pub title_like: Option<String>,
    pub min_salary: Option<i32>,
    pub has_equity: bool,
}

impl JobFilter {
    pub const KEYS: [&'static str; 3] = ["titleLike", "minSalary", "hasEquity"];

    pub fn from_params<I, K, V>(params: I) -> Result<Self, DbError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut filter = JobFilter::default();
        for (key, value) in params {
            let (key, value) = (key.as_ref(), value.as_ref());
            match key {
                "titleLike" => filter.title_like = non_blank(value),
                "minSalary" => filter.min_salary = Some(parse_int(key, value)?),
                "hasEquity" => filter.has_equity = parse_bool(key, value)?,
                other => return Err(unknown_key(other, &Self::KEYS)),
            }
        }
        Ok(filter)
    }

    pub fn is_empty(&self) -> bool {
        self.title_like.is_none() && self.min_salary.is_none() && !self.has_equity
    }

    /// Predicate over `jobs`, in key order titleLike, minSalary, hasEquity.
    /// `hasEquity` adds a null check and no parameter.
    pub fn to_clause(&self) -> FilterClause {
        let mut clause = FilterClause::new();
        if let Some(title) = &self.title_like {
            clause.push_param("title ILIKE $", SqlValue::from(contains_pattern(title)));
        }
        if let Some(min) = self.min_salary {
            clause.push_param("salary >= $", SqlValue::from(min));
        }
        if self.has_equity {
            clause.push_raw("equity IS NOT NULL");
        }
        clause
    }
}

fn non_blank(value: &str) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn unknown_key(key: &str, allowed: &[&str]) -> DbError {
    DbError::validation(format!(
        "unknown filter {key:?}; expected one of {}",
        allowed.join(", ")
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_company_filters_render_nothing() {
        let filter = CompanyFilter::from_params(Vec::<(&str, &str)>::new()).unwrap();
        assert!(filter.is_empty());
        let clause = filter.to_clause();
        assert_eq!(clause.predicate(), "");
        assert!(clause.values().is_empty());
        assert_eq!(clause.where_sql(), "");
    }

    #[test]
    fn name_like_alone() {
        let filter = CompanyFilter::from_params([("nameLike", "acme")]).unwrap();
        let clause = filter.to_clause();
        assert_eq!(clause.predicate(), "name ILIKE $1");
        assert_eq!(clause.values(), &[SqlValue::from("%acme%")]);
    }

    #[test]
    fn employee_bounds_are_and_joined_in_order() {
        let filter =
            CompanyFilter::from_params([("maxEmployees", "5"), ("minEmployees", "2")]).unwrap();
        let clause = filter.to_clause();
        assert_eq!(
            clause.predicate(),
            "num_employees >= $1 AND num_employees <= $2"
        );
        assert_eq!(clause.values(), &[SqlValue::from(2), SqlValue::from(5)]);
        assert_eq!(
            clause.where_sql(),
            " WHERE num_employees >= $1 AND num_employees <= $2"
        );
    }

    #[test]
    fn placeholders_follow_applied_filters_only() {
        let filter =
            CompanyFilter::from_params([("nameLike", "c"), ("maxEmployees", "3")]).unwrap();
        let clause = filter.to_clause();
        assert_eq!(clause.predicate(), "name ILIKE $1 AND num_employees <= $2");
        assert_eq!(clause.values(), &[SqlValue::from("%c%"), SqlValue::from(3)]);
    }

    #[test]
    fn inverted_bounds_are_rejected() {
        let err = CompanyFilter::from_params([("minEmployees", "5"), ("maxEmployees", "2")])
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn non_numeric_bound_is_rejected() {
        let err = CompanyFilter::from_params([("minEmployees", "lots")]).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn unknown_company_key_is_rejected() {
        let err = CompanyFilter::from_params([("nope", "x")]).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn blank_name_like_is_ignored() {
        let filter = CompanyFilter::from_params([("nameLike", "  ")]).unwrap();
        assert!(filter.is_empty());
    }

    #[test]
    fn has_equity_adds_predicate_without_parameter() {
        let filter = JobFilter::from_params([("hasEquity", "true")]).unwrap();
        let clause = filter.to_clause();
        assert_eq!(clause.predicate(), "equity IS NOT NULL");
        assert!(clause.values().is_empty());
    }

    #[test]
    fn has_equity_false_adds_nothing() {
        let filter = JobFilter::from_params([("hasEquity", "false")]).unwrap();
        assert!(filter.is_empty());
        assert_eq!(filter.to_clause().predicate(), "");
    }

    #[test]
    fn all_job_filters() {
        let filter = JobFilter::from_params([
            ("titleLike", "j"),
            ("minSalary", "75000"),
            ("hasEquity", "true"),
        ])
        .unwrap();
        let clause = filter.to_clause();
        assert_eq!(
            clause.predicate(),
            "title ILIKE $1 AND salary >= $2 AND equity IS NOT NULL"
        );
        assert_eq!(clause.values(), &[SqlValue::from("%j%"), SqlValue::from(75000)]);
    }

    #[test]
    fn min_salary_numbering_without_title() {
        let filter = JobFilter::from_params([("hasEquity", "true"), ("minSalary", "10")]).unwrap();
        let clause = filter.to_clause();
        assert_eq!(clause.predicate(), "salary >= $1 AND equity IS NOT NULL");
        assert_eq!(clause.values(), &[SqlValue::from(10)]);
    }

    #[test]
    fn job_filter_validation() {
        assert!(JobFilter::from_params([("hasEquity", "yes")])
            .unwrap_err()
            .is_validation());
        assert!(JobFilter::from_params([("minSalary", "abc")])
            .unwrap_err()
            .is_validation());
        assert!(JobFilter::from_params([("minEmployees", "1")])
            .unwrap_err()
            .is_validation());
    }
}
