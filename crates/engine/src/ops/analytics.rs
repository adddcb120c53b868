//! Yearly aggregation over the income set.
//!
//! One grouped query per reporting dimension, all filtered to the target
//! year. Empty groups and zero totals yield zeros, never an error.

use sea_orm::{DatabaseTransaction, Statement, TransactionTrait, prelude::*};

use crate::{EngineError, IncomeKind, ResultEngine, entities};

use super::{Engine, EntityRef, with_tx};

/// Fixed Arabic month names; reporting clients chart them verbatim.
pub fn month_label(month: i32) -> &'static str {
    match month {
        1 => "يناير",
        2 => "فبراير",
        3 => "مارس",
        4 => "أبريل",
        5 => "مايو",
        6 => "يونيو",
        7 => "يوليو",
        8 => "أغسطس",
        9 => "سبتمبر",
        10 => "أكتوبر",
        11 => "نوفمبر",
        12 => "ديسمبر",
        _ => "",
    }
}

/// The entity detail attached to a per-entity breakdown row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportEntity {
    pub id: String,
    pub name: String,
    pub province: Option<String>,
    pub main_entity: Option<EntityRef>,
}

/// Per-entity sums for one year, heaviest earner first.
#[derive(Clone, Debug, PartialEq)]
pub struct EntityBreakdown {
    pub entity_id: String,
    pub sum: f64,
    pub count: i64,
    pub average: f64,
    /// Share of the yearly total, in percent; 0 when the total is 0.
    pub percentage: f64,
    pub entity: ReportEntity,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MonthlyTotal {
    pub month: i32,
    pub label: &'static str,
    pub amount: f64,
    pub count: i64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct KindTotal {
    pub kind: String,
    pub label: String,
    pub amount: f64,
    pub count: i64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ProvinceTotal {
    pub province: String,
    pub amount: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReportTotals {
    pub income: f64,
    pub count: i64,
    /// Distinct entities with at least one income that year.
    pub entities: i64,
    pub average: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projections {
    pub next_month: i64,
    pub quarter: i64,
    pub year: i64,
    pub confidence: u8,
}

/// Produces the forward-looking figures of a yearly report from the observed
/// monthly average.
///
/// Kept behind a trait so the uplift heuristic can be swapped for an actual
/// forecasting model without touching report assembly.
pub trait Estimator {
    fn project(&self, monthly_avg: f64) -> Projections;
}

/// Fixed uplift factors: +10% for the coming month, +5% on a quarter, +8% on
/// a full year, with a constant confidence figure. A placeholder heuristic,
/// not a statistical model.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlaceholderEstimator;

impl Estimator for PlaceholderEstimator {
    fn project(&self, monthly_avg: f64) -> Projections {
        Projections {
            next_month: (monthly_avg * 1.10).round() as i64,
            quarter: (monthly_avg * 3.0 * 1.05).round() as i64,
            year: (monthly_avg * 12.0 * 1.08).round() as i64,
            confidence: 85,
        }
    }
}

/// Everything the reporting surface renders for one year.
#[derive(Clone, Debug, PartialEq)]
pub struct YearlyReport {
    pub year: i32,
    pub entities: Vec<EntityBreakdown>,
    pub monthly: Vec<MonthlyTotal>,
    pub kinds: Vec<KindTotal>,
    pub provinces: Vec<ProvinceTotal>,
    pub totals: ReportTotals,
    pub projections: Projections,
}

impl Engine {
    /// Build the yearly report with the default estimator.
    pub async fn yearly_report(&self, year: i32) -> ResultEngine<YearlyReport> {
        self.yearly_report_with(year, &PlaceholderEstimator).await
    }

    /// Build the yearly report, projecting with `estimator`.
    pub async fn yearly_report_with(
        &self,
        year: i32,
        estimator: &(dyn Estimator + Sync),
    ) -> ResultEngine<YearlyReport> {
        with_tx!(self, |db_tx| {
            let backend = self.database.get_database_backend();

            let entity_rows = db_tx
                .query_all(Statement::from_sql_and_values(
                    backend,
                    "SELECT entity_id, COALESCE(SUM(amount), 0) AS sum, \
                     COUNT(*) AS count, COALESCE(AVG(amount), 0) AS average \
                     FROM incomes WHERE year = ? \
                     GROUP BY entity_id ORDER BY sum DESC;",
                    vec![year.into()],
                ))
                .await?;

            let mut total_income = 0.0;
            let mut total_count = 0;
            let mut grouped = Vec::with_capacity(entity_rows.len());
            for row in entity_rows {
                let entity_id: String = row.try_get("", "entity_id")?;
                let sum: f64 = row.try_get("", "sum")?;
                let count: i64 = row.try_get("", "count")?;
                let average: f64 = row.try_get("", "average")?;
                total_income += sum;
                total_count += count;
                grouped.push((entity_id, sum, count, average));
            }

            let mut entity_breakdown = Vec::with_capacity(grouped.len());
            for (entity_id, sum, count, average) in grouped {
                let entity = self.report_entity(&db_tx, &entity_id).await?;
                let percentage = if total_income > 0.0 {
                    sum / total_income * 100.0
                } else {
                    0.0
                };
                entity_breakdown.push(EntityBreakdown {
                    entity_id,
                    sum,
                    count,
                    average,
                    percentage,
                    entity,
                });
            }

            let monthly_rows = db_tx
                .query_all(Statement::from_sql_and_values(
                    backend,
                    "SELECT month, COALESCE(SUM(amount), 0) AS sum, COUNT(*) AS count \
                     FROM incomes WHERE year = ? \
                     GROUP BY month ORDER BY month ASC;",
                    vec![year.into()],
                ))
                .await?;
            let mut monthly = Vec::with_capacity(monthly_rows.len());
            for row in monthly_rows {
                let month: i32 = row.try_get("", "month")?;
                monthly.push(MonthlyTotal {
                    month,
                    label: month_label(month),
                    amount: row.try_get("", "sum")?,
                    count: row.try_get("", "count")?,
                });
            }

            let kind_rows = db_tx
                .query_all(Statement::from_sql_and_values(
                    backend,
                    "SELECT kind, COALESCE(SUM(amount), 0) AS sum, COUNT(*) AS count \
                     FROM incomes WHERE year = ? \
                     GROUP BY kind ORDER BY kind ASC;",
                    vec![year.into()],
                ))
                .await?;
            let mut kinds = Vec::with_capacity(kind_rows.len());
            for row in kind_rows {
                let kind: String = row.try_get("", "kind")?;
                let label = match IncomeKind::try_from(kind.as_str()) {
                    Ok(known) => known.label().to_string(),
                    // A stored value outside the enum keeps its raw name.
                    Err(_) => kind.clone(),
                };
                kinds.push(KindTotal {
                    kind,
                    label,
                    amount: row.try_get("", "sum")?,
                    count: row.try_get("", "count")?,
                });
            }

            let province_rows = db_tx
                .query_all(Statement::from_sql_and_values(
                    backend,
                    "SELECT COALESCE(NULLIF(TRIM(e.province), ''), 'Unknown') AS province, \
                     COALESCE(SUM(i.amount), 0) AS sum \
                     FROM incomes AS i \
                     LEFT JOIN entities AS e ON e.id = i.entity_id \
                     WHERE i.year = ? \
                     GROUP BY COALESCE(NULLIF(TRIM(e.province), ''), 'Unknown') \
                     ORDER BY sum DESC;",
                    vec![year.into()],
                ))
                .await?;
            let mut provinces = Vec::with_capacity(province_rows.len());
            for row in province_rows {
                provinces.push(ProvinceTotal {
                    province: row.try_get("", "province")?,
                    amount: row.try_get("", "sum")?,
                });
            }

            let totals = ReportTotals {
                income: total_income,
                count: total_count,
                entities: entity_breakdown.len() as i64,
                average: if total_count > 0 {
                    total_income / total_count as f64
                } else {
                    0.0
                },
            };

            // Months without data do not dilute the average.
            let monthly_avg = if monthly.is_empty() {
                0.0
            } else {
                total_income / monthly.len() as f64
            };
            let projections = estimator.project(monthly_avg);

            Ok(YearlyReport {
                year,
                entities: entity_breakdown,
                monthly,
                kinds,
                provinces,
                totals,
                projections,
            })
        })
    }

    async fn report_entity(
        &self,
        db_tx: &DatabaseTransaction,
        entity_id: &str,
    ) -> ResultEngine<ReportEntity> {
        let entity = entities::Entity::find_by_id(entity_id.to_string())
            .one(db_tx)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("entity not exists".to_string()))?;
        let main_entity = match entity.main_entity_id.as_deref() {
            Some(parent_id) => entities::Entity::find_by_id(parent_id.to_string())
                .one(db_tx)
                .await?
                .map(|parent| EntityRef {
                    id: parent.id,
                    name: parent.name,
                }),
            None => None,
        };

        Ok(ReportEntity {
            id: entity.id,
            name: entity.name,
            province: entity.province,
            main_entity,
        })
    }
}
