//! Queue history export endpoints

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, HeaderValue},
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::{error::AppResult, models::queue::QueueDetails};

use super::AuthenticatedUser;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Json,
}

#[derive(Deserialize, IntoParams)]
pub struct ExportQuery {
    pub from: NaiveDate,
    pub to: NaiveDate,
    /// Defaults to csv
    pub format: Option<ExportFormat>,
}

/// Export queue history over a date range as CSV or JSON
#[utoipa::path(
    get,
    path = "/export/queues",
    tag = "export",
    security(("bearer_auth" = [])),
    params(ExportQuery),
    responses(
        (status = 200, description = "Queue history export"),
        (status = 400, description = "Inverted date range")
    )
)]
pub async fn export_queues(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Query(query): Query<ExportQuery>,
) -> AppResult<axum::response::Response> {
    let queues = state
        .services
        .queues
        .list_range(query.from, query.to)
        .await?;

    match query.format.unwrap_or(ExportFormat::Csv) {
        ExportFormat::Json => Ok(Json(queues).into_response()),
        ExportFormat::Csv => {
            let body = to_csv(&queues);
            let filename = format!("queues_{}_{}.csv", query.from, query.to);

            let mut headers = HeaderMap::new();
            headers.insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static("text/csv; charset=utf-8"),
            );
            if let Ok(value) =
                HeaderValue::from_str(&format!("attachment; filename=\"{}\"", filename))
            {
                headers.insert(header::CONTENT_DISPOSITION, value);
            }
            Ok((headers, body).into_response())
        }
    }
}

const CSV_HEADER: &str = "queue_number,queue_date,status,queue_type,service,visitor,phone,institution,admin,filled_skd,start_time,end_time,created_at";

fn to_csv(queues: &[QueueDetails]) -> String {
    let mut out = String::from(CSV_HEADER);
    out.push('\n');

    for q in queues {
        let fields = [
            q.queue_number.to_string(),
            q.queue_date.to_string(),
            q.status.to_string(),
            q.queue_type.to_string(),
            q.service_name.clone(),
            q.visitor_name.clone().unwrap_or_default(),
            q.visitor_phone.clone().unwrap_or_default(),
            q.visitor_institution.clone().unwrap_or_default(),
            q.admin_name.clone().unwrap_or_default(),
            q.filled_skd.to_string(),
            q.start_time.map(|t| t.to_rfc3339()).unwrap_or_default(),
            q.end_time.map(|t| t.to_rfc3339()).unwrap_or_default(),
            q.created_at.to_rfc3339(),
        ];
        let row: Vec<String> = fields.iter().map(|f| escape_csv(f)).collect();
        out.push_str(&row.join(","));
        out.push('\n');
    }
    out
}

/// Quote a field when it contains a comma, quote, or newline
fn escape_csv(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::queue::{QueueStatus, QueueType};
    use chrono::{TimeZone, Utc};

    fn sample(name: &str) -> QueueDetails {
        QueueDetails {
            id: 1,
            queue_number: 5,
            queue_date: NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(),
            status: QueueStatus::Completed,
            queue_type: QueueType::Offline,
            service_name: "Perpustakaan".to_string(),
            visitor_name: Some(name.to_string()),
            visitor_phone: Some("081234567890".to_string()),
            visitor_institution: None,
            admin_name: Some("Petugas".to_string()),
            tracking_link: "abc123XYZ0".to_string(),
            filled_skd: true,
            start_time: Some(Utc.with_ymd_and_hms(2025, 4, 1, 2, 0, 0).unwrap()),
            end_time: Some(Utc.with_ymd_and_hms(2025, 4, 1, 2, 10, 0).unwrap()),
            created_at: Utc.with_ymd_and_hms(2025, 4, 1, 1, 30, 0).unwrap(),
        }
    }

    #[test]
    fn csv_has_header_and_one_row_per_queue() {
        let csv = to_csv(&[sample("Budi"), sample("Sari")]);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], CSV_HEADER);
        assert!(lines[1].starts_with("5,2025-04-01,COMPLETED,OFFLINE,Perpustakaan,Budi"));
    }

    #[test]
    fn fields_with_commas_are_quoted() {
        assert_eq!(escape_csv("PT Maju, Tbk"), "\"PT Maju, Tbk\"");
        assert_eq!(escape_csv("plain"), "plain");
        assert_eq!(escape_csv("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn empty_export_is_just_the_header() {
        let csv = to_csv(&[]);
        assert_eq!(csv, format!("{}\n", CSV_HEADER));
    }
}
