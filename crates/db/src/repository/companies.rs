//! Company CRUD operations.

use sqlx::PgPool;
use tracing::{debug, info, instrument};

use crate::{
    filters::CompanyFilter,
    models::{Company, CompanyDetail, CompanyJobRow, CompanyUpdate, NewCompany},
    sql::{bind_values, sql_for_partial_update, ColumnMap},
    DbError,
};

/// External field names whose column differs.
pub const COLUMNS: ColumnMap =
    ColumnMap(&[("numEmployees", "num_employees"), ("logoUrl", "logo_url")]);

const RETURNING: &str = "handle, name, description, num_employees, logo_url";

/// Insert a new company.
///
/// Returns `DbError::Validation` if the handle is already taken; nothing is
/// written in that case.
#[instrument(skip(pool, company), fields(handle = %company.handle))]
pub async fn create(pool: &PgPool, company: NewCompany) -> Result<Company, DbError> {
    company.validate()?;

    let existing = sqlx::query_scalar::<_, String>("SELECT handle FROM companies WHERE handle = $1")
        .bind(&company.handle)
        .fetch_optional(pool)
        .await?;
    if existing.is_some() {
        return Err(DbError::validation(format!(
            "Duplicate company: {}",
            company.handle
        )));
    }

    let handle = company.handle.clone();
    let row = sqlx::query_as::<_, Company>(&format!(
        r#"
        INSERT INTO companies (handle, name, description, num_employees, logo_url)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING {RETURNING}
        "#
    ))
    .bind(company.handle)
    .bind(company.name)
    .bind(company.description)
    .bind(company.num_employees)
    .bind(company.logo_url)
    .fetch_one(pool)
    .await
    .map_err(|e| DbError::from_insert(e, || format!("Duplicate company: {handle}")))?;

    info!("company created");
    Ok(row)
}

/// List companies ordered by name, optionally filtered.
#[instrument(skip(pool))]
pub async fn find_all(pool: &PgPool, filter: &CompanyFilter) -> Result<Vec<Company>, DbError> {
    let clause = filter.to_clause();
    let sql = format!(
        "SELECT {RETURNING} FROM companies{} ORDER BY name",
        clause.where_sql()
    );
    debug!(%sql, params = clause.values().len(), "listing companies");

    let rows = bind_values(sqlx::query_as::<_, Company>(&sql), clause.into_values())
        .fetch_all(pool)
        .await?;

    Ok(rows)
}

/// Fetch a company and its jobs (ordered by job id).
#[instrument(skip(pool))]
pub async fn get(pool: &PgPool, handle: &str) -> Result<CompanyDetail, DbError> {
    let rows = sqlx::query_as::<_, CompanyJobRow>(
        r#"
        SELECT c.handle, c.name, c.description, c.num_employees, c.logo_url,
               j.id AS job_id, j.title AS job_title,
               j.salary AS job_salary, j.equity AS job_equity
        FROM companies AS c
        LEFT JOIN jobs AS j ON j.company_handle = c.handle
        WHERE c.handle = $1
        ORDER BY j.id
        "#,
    )
    .bind(handle)
    .fetch_all(pool)
    .await?;

    let company = rows
        .first()
        .map(CompanyJobRow::company)
        .ok_or_else(|| DbError::not_found(format!("No company: {handle}")))?;
    let jobs = rows.into_iter().filter_map(CompanyJobRow::job).collect();

    Ok(CompanyDetail { company, jobs })
}

/// Apply a partial update. The handle itself is never changed.
///
/// Returns `DbError::NotFound` if no company has this handle.
#[instrument(skip(pool))]
pub async fn update(pool: &PgPool, handle: &str, data: CompanyUpdate) -> Result<Company, DbError> {
    data.validate()?;
    let update = sql_for_partial_update(data.into_fields(), COLUMNS)?;

    let sql = format!(
        "UPDATE companies SET {} WHERE handle = ${} RETURNING {RETURNING}",
        update.set_clause(),
        update.next_placeholder(),
    );
    debug!(%sql, "updating company");

    let row = bind_values(sqlx::query_as::<_, Company>(&sql), update.values)
        .bind(handle)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| DbError::not_found(format!("No company: {handle}")))?;

    info!("company updated");
    Ok(row)
}

/// Permanently delete a company (its jobs go with it).
///
/// Returns `DbError::NotFound` if no row was deleted.
#[instrument(skip(pool))]
pub async fn remove(pool: &PgPool, handle: &str) -> Result<(), DbError> {
    let result = sqlx::query("DELETE FROM companies WHERE handle = $1")
        .bind(handle)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found(format!("No company: {handle}")));
    }

    info!("company removed");
    Ok(())
}
