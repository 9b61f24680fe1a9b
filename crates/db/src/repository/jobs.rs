//! Job CRUD operations.
//!
//! Equity is `NUMERIC` in storage and `rust_decimal::Decimal` here, so it
//! never passes through a float.

use sqlx::PgPool;
use tracing::{debug, info, instrument};

use crate::{
    filters::JobFilter,
    models::{Job, JobCompanyRow, JobDetail, JobUpdate, NewJob},
    sql::{bind_values, sql_for_partial_update, ColumnMap},
    DbError,
};

const RETURNING: &str = "id, title, salary, equity, company_handle";

/// Insert a new job for an existing company.
///
/// Returns `DbError::Validation` if `companyHandle` names no company; nothing
/// is inserted in that case.
#[instrument(skip(pool, job), fields(company = %job.company_handle))]
pub async fn create(pool: &PgPool, job: NewJob) -> Result<Job, DbError> {
    job.validate()?;

    let company = sqlx::query_scalar::<_, String>("SELECT handle FROM companies WHERE handle = $1")
        .bind(&job.company_handle)
        .fetch_optional(pool)
        .await?;
    if company.is_none() {
        return Err(DbError::validation(format!(
            "No company: {}",
            job.company_handle
        )));
    }

    let handle = job.company_handle.clone();
    let row = sqlx::query_as::<_, Job>(&format!(
        r#"
        INSERT INTO jobs (title, salary, equity, company_handle)
        VALUES ($1, $2, $3, $4)
        RETURNING {RETURNING}
        "#
    ))
    .bind(job.title)
    .bind(job.salary)
    .bind(job.equity)
    .bind(job.company_handle)
    .fetch_one(pool)
    .await
    .map_err(|e| DbError::from_insert(e, || format!("No company: {handle}")))?;

    info!(id = row.id, "job created");
    Ok(row)
}

/// List jobs ordered by title, optionally filtered.
#[instrument(skip(pool))]
pub async fn find_all(pool: &PgPool, filter: &JobFilter) -> Result<Vec<Job>, DbError> {
    let clause = filter.to_clause();
    let sql = format!(
        "SELECT {RETURNING} FROM jobs{} ORDER BY title, id",
        clause.where_sql()
    );
    debug!(%sql, params = clause.values().len(), "listing jobs");

    let rows = bind_values(sqlx::query_as::<_, Job>(&sql), clause.into_values())
        .fetch_all(pool)
        .await?;

    Ok(rows)
}

/// Fetch a job together with its company.
#[instrument(skip(pool))]
pub async fn get(pool: &PgPool, id: i32) -> Result<JobDetail, DbError> {
    let row = sqlx::query_as::<_, JobCompanyRow>(
        r#"
        SELECT j.id, j.title, j.salary, j.equity,
               c.handle, c.name, c.description, c.num_employees, c.logo_url
        FROM jobs AS j
        JOIN companies AS c ON c.handle = j.company_handle
        WHERE j.id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DbError::not_found(format!("No job: {id}")))?;

    Ok(row.into())
}

/// Apply a partial update to title / salary / equity.
///
/// Returns `DbError::NotFound` if no job has this id.
#[instrument(skip(pool))]
pub async fn update(pool: &PgPool, id: i32, data: JobUpdate) -> Result<Job, DbError> {
    data.validate()?;
    let update = sql_for_partial_update(data.into_fields(), ColumnMap::IDENTITY)?;

    let sql = format!(
        "UPDATE jobs SET {} WHERE id = ${} RETURNING {RETURNING}",
        update.set_clause(),
        update.next_placeholder(),
    );
    debug!(%sql, "updating job");

    let row = bind_values(sqlx::query_as::<_, Job>(&sql), update.values)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| DbError::not_found(format!("No job: {id}")))?;

    info!("job updated");
    Ok(row)
}

/// Permanently delete a job.
///
/// Returns `DbError::NotFound` if no row was deleted.
#[instrument(skip(pool))]
pub async fn remove(pool: &PgPool, id: i32) -> Result<(), DbError> {
    let result = sqlx::query("DELETE FROM jobs WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found(format!("No job: {id}")));
    }

    info!("job removed");
    Ok(())
}
