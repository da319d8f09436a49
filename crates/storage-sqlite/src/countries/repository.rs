use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::dsl::{max, sql};
use diesel::prelude::*;
use diesel::sql_types::{Double, Nullable, Text};
use diesel::sqlite::Sqlite;
use log::debug;
use std::sync::Arc;

use country_cache_core::countries::{
    name_key, Country, CountryQuery, CountryRepositoryTrait, CountrySort, CountryUpdate, MergeFn,
    ReconciliationSummary, SortDirection, SortField,
};
use country_cache_core::errors::Result;
use country_cache_core::utils::{from_naive_utc, now_utc};

use super::model::{CountryDB, NewCountryDB};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::IntoCore;
use crate::schema::countries;

/// Rows per multi-row INSERT; ten bound columns each keeps a statement
/// under SQLite's default limit of 999 parameters.
const INSERT_CHUNK_ROWS: usize = 90;

define_sql_function! {
    /// SQLite `lower()`, ASCII-only case folding.
    fn lower(x: Nullable<Text>) -> Nullable<Text>;
}

/// Escapes LIKE wildcards so user input only ever matches literally.
fn like_pattern(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len() + 2);
    escaped.push('%');
    for ch in needle.to_ascii_lowercase().chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

fn gdp_numeric() -> diesel::expression::SqlLiteral<Double> {
    sql::<Double>("CAST(estimated_gdp AS REAL)")
}

fn apply_sort<'a>(
    query: countries::BoxedQuery<'a, Sqlite>,
    sort: CountrySort,
) -> countries::BoxedQuery<'a, Sqlite> {
    use SortDirection::{Asc, Desc};
    let ordered = match (sort.field, sort.direction) {
        (SortField::Name, Asc) => query.order_by(countries::name.asc()),
        (SortField::Name, Desc) => query.order_by(countries::name.desc()),
        (SortField::Population, Asc) => query.order_by(countries::population.asc()),
        (SortField::Population, Desc) => query.order_by(countries::population.desc()),
        (SortField::EstimatedGdp, Asc) => query.order_by(gdp_numeric().asc()),
        (SortField::EstimatedGdp, Desc) => query.order_by(gdp_numeric().desc()),
        (SortField::Region, Asc) => query.order_by(countries::region.asc()),
        (SortField::Region, Desc) => query.order_by(countries::region.desc()),
        (SortField::CurrencyCode, Asc) => query.order_by(countries::currency_code.asc()),
        (SortField::CurrencyCode, Desc) => query.order_by(countries::currency_code.desc()),
    };
    ordered.then_order_by(countries::id.asc())
}

/// Repository for cached countries.
///
/// Reads use pooled connections; every write goes through the writer actor.
pub struct CountryRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl CountryRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl CountryRepositoryTrait for CountryRepository {
    fn list_countries(&self, query: &CountryQuery) -> Result<Vec<Country>> {
        let mut conn = get_connection(&self.pool)?;

        let mut statement = countries::table.into_boxed();

        if let Some(region) = query.region.as_deref() {
            statement = statement.filter(
                lower(countries::region)
                    .like(like_pattern(region))
                    .escape('\\'),
            );
        }
        if let Some(currency) = query.currency.as_deref() {
            statement = statement.filter(
                lower(countries::currency_code)
                    .like(like_pattern(currency))
                    .escape('\\'),
            );
        }

        statement = match query.sort {
            Some(sort) => apply_sort(statement, sort),
            None => statement.order_by(countries::id.asc()),
        };

        let rows = statement
            .select(CountryDB::as_select())
            .load::<CountryDB>(&mut conn)
            .into_core()?;
        rows.into_iter().map(Country::try_from).collect()
    }

    fn list_by_region(&self, region: &str) -> Result<Vec<Country>> {
        let mut conn = get_connection(&self.pool)?;

        let rows = countries::table
            .filter(lower(countries::region).eq(region.to_ascii_lowercase()))
            .order_by(countries::name.asc())
            .select(CountryDB::as_select())
            .load::<CountryDB>(&mut conn)
            .into_core()?;
        rows.into_iter().map(Country::try_from).collect()
    }

    fn get_by_name(&self, name: &str) -> Result<Option<Country>> {
        let mut conn = get_connection(&self.pool)?;

        let row = countries::table
            .filter(countries::name_key.eq(name_key(name)))
            .select(CountryDB::as_select())
            .first::<CountryDB>(&mut conn)
            .optional()
            .into_core()?;
        row.map(Country::try_from).transpose()
    }

    fn top_by_estimated_gdp(&self, limit: i64) -> Result<Vec<Country>> {
        let mut conn = get_connection(&self.pool)?;

        let rows = countries::table
            .order_by(gdp_numeric().desc())
            .then_order_by(countries::name.asc())
            .limit(limit)
            .select(CountryDB::as_select())
            .load::<CountryDB>(&mut conn)
            .into_core()?;
        rows.into_iter().map(Country::try_from).collect()
    }

    fn count(&self) -> Result<i64> {
        let mut conn = get_connection(&self.pool)?;
        countries::table
            .count()
            .get_result::<i64>(&mut conn)
            .into_core()
    }

    fn latest_refreshed_at(&self) -> Result<Option<DateTime<Utc>>> {
        let mut conn = get_connection(&self.pool)?;
        let latest = countries::table
            .select(max(countries::last_refreshed_at))
            .first::<Option<NaiveDateTime>>(&mut conn)
            .into_core()?;
        Ok(latest.map(from_naive_utc))
    }

    async fn reconcile(&self, batch_size: usize, merge: MergeFn) -> Result<ReconciliationSummary> {
        let batch_size = batch_size.max(1);
        self.writer
            .exec(move |conn| {
                let existing = countries::table
                    .order_by(countries::id.asc())
                    .select(CountryDB::as_select())
                    .load::<CountryDB>(conn)
                    .into_core()?
                    .into_iter()
                    .map(Country::try_from)
                    .collect::<Result<Vec<Country>>>()?;

                let plan = merge(existing)?;
                let summary = plan.summary();

                let inserts: Vec<NewCountryDB> =
                    plan.inserts.into_iter().map(NewCountryDB::from).collect();
                for chunk in inserts.chunks(INSERT_CHUNK_ROWS) {
                    diesel::insert_into(countries::table)
                        .values(chunk)
                        .execute(conn)
                        .into_core()?;
                }

                for (index, chunk) in plan.updates.chunks(batch_size).enumerate() {
                    for country in chunk {
                        let row = CountryDB::from(country);
                        diesel::update(countries::table.find(row.id))
                            .set(&row)
                            .execute(conn)
                            .into_core()?;
                    }
                    debug!("Flushed update batch {} ({} rows)", index + 1, chunk.len());
                }

                Ok(summary)
            })
            .await
    }

    async fn update_country(&self, name: String, changes: CountryUpdate) -> Result<Option<Country>> {
        self.writer
            .exec(move |conn| {
                let Some(row) = countries::table
                    .filter(countries::name_key.eq(name_key(&name)))
                    .select(CountryDB::as_select())
                    .first::<CountryDB>(conn)
                    .optional()
                    .into_core()?
                else {
                    return Ok(None);
                };

                let mut country = Country::try_from(row)?;
                changes.apply_to(&mut country, now_utc());

                let row = CountryDB::from(&country);
                diesel::update(countries::table.find(row.id))
                    .set(&row)
                    .execute(conn)
                    .into_core()?;
                Ok(Some(country))
            })
            .await
    }

    async fn delete_by_name(&self, name: String) -> Result<usize> {
        self.writer
            .exec(move |conn| {
                diesel::delete(countries::table.filter(countries::name_key.eq(name_key(&name))))
                    .execute(conn)
                    .into_core()
            })
            .await
    }
}
