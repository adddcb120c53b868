//! Reporting API endpoints

use api_types::analytics::{
    AnalyticsGet, AnalyticsResponse, EntityStat, MonthStat, Projections, ProvinceStat,
    ReportEntity, Totals, TypeStat,
};
use api_types::entity::EntityRef;
use axum::{
    Json,
    extract::{Query, State},
};
use chrono::{Datelike, Utc};

use crate::{ServerError, server::ServerState};

fn entity_stat(row: engine::EntityBreakdown) -> EntityStat {
    EntityStat {
        entity_id: row.entity_id,
        sum: row.sum,
        count: row.count,
        average: row.average,
        percentage: row.percentage,
        entity: ReportEntity {
            id: row.entity.id,
            name: row.entity.name,
            province: row.entity.province,
            main_entity: row.entity.main_entity.map(|parent| EntityRef {
                id: parent.id,
                name: parent.name,
            }),
        },
    }
}

/// Handle requests for the yearly report. Defaults to the current year when
/// no `year` parameter is given.
pub async fn report(
    State(state): State<ServerState>,
    Query(query): Query<AnalyticsGet>,
) -> Result<Json<AnalyticsResponse>, ServerError> {
    let year = query.year.unwrap_or_else(|| Utc::now().year());

    let report = state.engine.yearly_report(year).await?;

    Ok(Json(AnalyticsResponse {
        entities: report.entities.into_iter().map(entity_stat).collect(),
        monthly: report
            .monthly
            .into_iter()
            .map(|row| MonthStat {
                month: row.label.to_string(),
                amount: row.amount,
                count: row.count,
            })
            .collect(),
        types: report
            .kinds
            .into_iter()
            .map(|row| TypeStat {
                kind: row.label,
                amount: row.amount,
                count: row.count,
            })
            .collect(),
        provinces: report
            .provinces
            .into_iter()
            .map(|row| ProvinceStat {
                province: row.province,
                amount: row.amount,
            })
            .collect(),
        totals: Totals {
            income: report.totals.income,
            count: report.totals.count,
            entities: report.totals.entities,
            average: report.totals.average,
        },
        projections: Projections {
            next_month: report.projections.next_month,
            quarter: report.projections.quarter,
            year: report.projections.year,
            confidence: report.projections.confidence,
        },
    }))
}
