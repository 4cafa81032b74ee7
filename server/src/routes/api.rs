use std::fmt::Write as _;
use std::sync::Arc;

use axum::Json;
use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use prioritas_shared::{DatasetMeta, TableView};
use serde::Deserialize;
use tracing::error;

use crate::state::{AppState, ObservabilitySnapshot};
use crate::table::project_table;

const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";
const MAP_CACHE_CONTROL: &str = "public, max-age=300";

#[derive(Debug, Deserialize)]
pub struct MapQuery {
    field: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TableQuery {
    field: Option<String>,
    search: Option<String>,
}

pub async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    let dataset = &state.dataset;
    let observability = state.observability.snapshot();
    Json(serde_json::json!({
        "status": "ok",
        "regions": dataset.len(),
        "indicators": dataset.indicators().len(),
        "default_field": dataset.default_field(),
        "loaded_at": dataset.loaded_at,
        "source_url": dataset.source_url,
        "figure_cache_size": state.figure_cache.len(),
        "observability": {
            "map_requests_total": observability.map_requests_total,
            "map_cache_hits_total": observability.map_cache_hits_total,
            "map_not_modified_total": observability.map_not_modified_total,
            "table_requests_total": observability.table_requests_total,
            "unknown_field_requests_total": observability.unknown_field_requests_total,
        }
    }))
}

pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    let body = render_prometheus_metrics(
        state.dataset.len(),
        state.dataset.indicators().len(),
        state.figure_cache.len(),
        state.observability.snapshot(),
    );

    (
        [
            (header::CONTENT_TYPE, PROMETHEUS_CONTENT_TYPE),
            (header::CACHE_CONTROL, "no-store"),
        ],
        body,
    )
}

pub async fn get_fields(State(state): State<AppState>) -> Json<DatasetMeta> {
    Json(state.dataset.meta())
}

/// Choropleth figure for one indicator. The body only depends on the dataset and the field,
/// so it is served with a strong ETag.
pub async fn get_map(
    State(state): State<AppState>,
    Query(query): Query<MapQuery>,
    headers: HeaderMap,
) -> Response {
    state.observability.record_map_request();
    let field = match normalize_field(query.field.as_deref()) {
        Ok(field) => field,
        Err(status) => return status.into_response(),
    };

    let etag = map_etag(state.dataset.fingerprint, field);
    if if_none_match_matches(&headers, &etag) {
        state.observability.record_map_not_modified();
        return not_modified_response(MAP_CACHE_CONTROL, Some(etag.as_str()));
    }

    match state.figure_json(field) {
        Ok(json) => json_bytes_response(
            Arc::unwrap_or_clone(json),
            MAP_CACHE_CONTROL,
            Some(etag.as_str()),
        ),
        Err(e) => {
            error!(error = %e, field, "failed to serialize map figure");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

pub async fn get_table(
    State(state): State<AppState>,
    Query(query): Query<TableQuery>,
) -> Result<Json<TableView>, StatusCode> {
    state.observability.record_table_request();
    let field = normalize_field(query.field.as_deref())?;
    let search = normalize_search(query.search.as_deref());

    if state.dataset.indicator_index(field).is_none() {
        state.observability.record_unknown_field_request();
    }

    Ok(Json(project_table(&state.dataset, field, search)))
}

fn normalize_field(field: Option<&str>) -> Result<&str, StatusCode> {
    let field = field.map(str::trim).unwrap_or_default();
    if field.is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }
    Ok(field)
}

/// Empty search means "no filter".
fn normalize_search(search: Option<&str>) -> Option<&str> {
    search.filter(|text| !text.is_empty())
}

fn render_prometheus_metrics(
    region_count: usize,
    indicator_count: usize,
    figure_cache_size: usize,
    observability: ObservabilitySnapshot,
) -> String {
    let mut body = String::new();
    let mut gauge = |name: &str, help: &str, value: u64| {
        let _ = writeln!(body, "# HELP {name} {help}");
        let _ = writeln!(body, "# TYPE {name} gauge");
        let _ = writeln!(body, "{name} {value}");
    };
    gauge(
        "prioritas_regions",
        "Number of regions in the loaded dataset.",
        region_count as u64,
    );
    gauge(
        "prioritas_indicators",
        "Number of numeric indicator columns retained at load.",
        indicator_count as u64,
    );
    gauge(
        "prioritas_figure_cache_size",
        "Number of memoized map figures.",
        figure_cache_size as u64,
    );

    let counters = [
        (
            "prioritas_map_requests_total",
            "Total map figure requests.",
            observability.map_requests_total,
        ),
        (
            "prioritas_map_cache_hits_total",
            "Map figure requests served from the memo.",
            observability.map_cache_hits_total,
        ),
        (
            "prioritas_map_not_modified_total",
            "Map figure requests answered with 304.",
            observability.map_not_modified_total,
        ),
        (
            "prioritas_table_requests_total",
            "Total table projection requests.",
            observability.table_requests_total,
        ),
        (
            "prioritas_unknown_field_requests_total",
            "Requests naming an indicator the dataset does not carry.",
            observability.unknown_field_requests_total,
        ),
    ];
    for (name, help, value) in counters {
        let _ = writeln!(body, "# HELP {name} {help}");
        let _ = writeln!(body, "# TYPE {name} counter");
        let _ = writeln!(body, "{name} {value}");
    }

    body
}

fn map_etag(fingerprint: u32, field: &str) -> String {
    format!(
        "\"map-{fingerprint:08x}-{:08x}\"",
        crc32fast::hash(field.as_bytes())
    )
}

fn json_bytes_response(body: Bytes, cache_control: &'static str, etag: Option<&str>) -> Response {
    let mut response = Response::new(Body::from(body));
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static(cache_control),
    );
    if let Some(etag) = etag
        && let Ok(etag_header) = HeaderValue::from_str(etag)
    {
        headers.insert(header::ETAG, etag_header);
    }
    response
}

fn not_modified_response(cache_control: &'static str, etag: Option<&str>) -> Response {
    let mut response = StatusCode::NOT_MODIFIED.into_response();
    let headers = response.headers_mut();
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static(cache_control),
    );
    if let Some(etag) = etag
        && let Ok(etag_header) = HeaderValue::from_str(etag)
    {
        headers.insert(header::ETAG, etag_header);
    }
    response
}

fn normalize_etag(candidate: &str) -> &str {
    candidate.strip_prefix("W/").unwrap_or(candidate).trim()
}

fn if_none_match_matches(headers: &HeaderMap, etag: &str) -> bool {
    let Some(value) = headers.get(header::IF_NONE_MATCH) else {
        return false;
    };
    let Ok(raw) = value.to_str() else {
        return false;
    };

    raw.split(',').any(|candidate| {
        let candidate = candidate.trim();
        candidate == "*" || normalize_etag(candidate) == normalize_etag(etag)
    })
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use prioritas_shared::{DatasetMeta, MapFigure, TableView};
    use tower::ServiceExt;

    use super::{
        if_none_match_matches, map_etag, normalize_field, normalize_search,
        render_prometheus_metrics,
    };
    use crate::dataset::fixtures;
    use crate::state::{AppState, ObservabilitySnapshot};

    async fn spawn_test_server(state: AppState) -> (SocketAddr, tokio::task::JoinHandle<()>) {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind test listener");
        let addr = listener.local_addr().expect("listener address");
        let app = crate::app::build_app(state, "client/dist");
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve test app");
        });
        (addr, handle)
    }

    #[test]
    fn metrics_output_contains_prometheus_help_type_and_values() {
        let observability = ObservabilitySnapshot {
            map_requests_total: 12,
            map_cache_hits_total: 9,
            map_not_modified_total: 2,
            table_requests_total: 40,
            unknown_field_requests_total: 1,
        };

        let metrics = render_prometheus_metrics(514, 15, 3, observability);

        assert!(metrics.contains("# HELP prioritas_regions"));
        assert!(metrics.contains("# TYPE prioritas_regions gauge"));
        assert!(metrics.contains("# TYPE prioritas_map_requests_total counter"));
        assert!(metrics.contains("prioritas_regions 514"));
        assert!(metrics.contains("prioritas_indicators 15"));
        assert!(metrics.contains("prioritas_figure_cache_size 3"));
        assert!(metrics.contains("prioritas_map_requests_total 12"));
        assert!(metrics.contains("prioritas_map_cache_hits_total 9"));
        assert!(metrics.contains("prioritas_map_not_modified_total 2"));
        assert!(metrics.contains("prioritas_table_requests_total 40"));
        assert!(metrics.contains("prioritas_unknown_field_requests_total 1"));
    }

    #[test]
    fn normalize_field_rejects_missing_and_blank_values() {
        assert_eq!(normalize_field(None), Err(StatusCode::BAD_REQUEST));
        assert_eq!(normalize_field(Some("")), Err(StatusCode::BAD_REQUEST));
        assert_eq!(normalize_field(Some("   ")), Err(StatusCode::BAD_REQUEST));
        assert_eq!(
            normalize_field(Some("X".repeat(65).as_str())),
            Ok("X".repeat(65).as_str())
        );
        assert_eq!(normalize_field(Some(" K_Miskin ")), Ok("K_Miskin"));
    }

    #[test]
    fn normalize_search_treats_empty_as_no_filter() {
        assert_eq!(normalize_search(None), None);
        assert_eq!(normalize_search(Some("")), None);
        assert_eq!(normalize_search(Some("Bandung")), Some("Bandung"));
    }

    #[test]
    fn map_etag_varies_by_field_and_dataset() {
        assert_ne!(map_etag(1, "K_Miskin"), map_etag(1, "Ranking"));
        assert_ne!(map_etag(1, "K_Miskin"), map_etag(2, "K_Miskin"));
        assert!(map_etag(0xdead_beef, "K_Miskin").starts_with("\"map-deadbeef-"));
    }

    #[test]
    fn if_none_match_supports_weak_and_multiple_etags() {
        let mut headers = axum::http::HeaderMap::new();
        headers.insert(
            axum::http::header::IF_NONE_MATCH,
            axum::http::HeaderValue::from_static("W/\"other\", \"map-0000002a-00000001\""),
        );
        assert!(if_none_match_matches(&headers, "\"map-0000002a-00000001\""));
        assert!(!if_none_match_matches(&headers, "\"map-0000002a-00000002\""));
    }

    #[tokio::test]
    async fn fields_endpoint_lists_retained_indicators() {
        let app = crate::app::build_app(AppState::new(fixtures::two_regions()), "client/dist");
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/fields")
                    .body(Body::empty())
                    .expect("build request"),
            )
            .await
            .expect("fields response");
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        let meta: DatasetMeta = serde_json::from_slice(&body).expect("parse meta");
        assert_eq!(meta.default_field.as_deref(), Some("K_Miskin"));
        assert_eq!(meta.fields.len(), 2);
        assert_eq!(meta.fields[0].label, "Keparahan Kemiskinan");
        assert_eq!(meta.region_count, 2);
    }

    #[tokio::test]
    async fn map_and_table_require_a_field() {
        let app = crate::app::build_app(AppState::new(fixtures::two_regions()), "client/dist");
        for uri in ["/api/map", "/api/table?search=kota", "/api/map?field="] {
            let response = app
                .clone()
                .oneshot(Request::builder().uri(uri).body(Body::empty()).expect("request"))
                .await
                .expect("response");
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
        }
    }

    #[tokio::test]
    async fn table_endpoint_filters_by_search_text() {
        let state = AppState::new(fixtures::two_regions());
        let (addr, server_handle) = spawn_test_server(state).await;
        let base_url = format!("http://{addr}");

        let view = reqwest::Client::new()
            .get(format!("{base_url}/api/table"))
            .query(&[("field", "K_Miskin"), ("search", "BANDUNG")])
            .send()
            .await
            .expect("table request")
            .error_for_status()
            .expect("table status")
            .json::<TableView>()
            .await
            .expect("parse table");

        assert_eq!(view.rows.len(), 1);
        assert_eq!(view.rows[0].name.as_deref(), Some("Kota Bandung"));
        assert_eq!(view.rows[0].value, Some(5.0));
        assert_eq!(view.columns[2], "Keparahan Kemiskinan");

        let unfiltered = reqwest::Client::new()
            .get(format!("{base_url}/api/table?field=K_Miskin&search="))
            .send()
            .await
            .expect("table request")
            .json::<serde_json::Value>()
            .await
            .expect("parse table json");
        assert_eq!(unfiltered["rows"].as_array().map(Vec::len), Some(2));
        assert!(unfiltered["rows"][1]["value"].is_null());

        server_handle.abort();
        let _ = server_handle.await;
    }

    #[tokio::test]
    async fn unknown_field_degrades_instead_of_failing() {
        let state = AppState::new(fixtures::two_regions());
        let (addr, server_handle) = spawn_test_server(state).await;
        let base_url = format!("http://{addr}");
        let client = reqwest::Client::new();

        let figure = client
            .get(format!("{base_url}/api/map?field=Populasi"))
            .send()
            .await
            .expect("map request")
            .error_for_status()
            .expect("map status")
            .json::<MapFigure>()
            .await
            .expect("parse figure");
        assert_eq!(figure.no_data_count(), 2);

        let view = client
            .get(format!("{base_url}/api/table?field=Populasi"))
            .send()
            .await
            .expect("table request")
            .error_for_status()
            .expect("table status")
            .json::<TableView>()
            .await
            .expect("parse table");
        assert!(view.rows.iter().all(|row| row.value.is_none()));

        let health = client
            .get(format!("{base_url}/api/health"))
            .send()
            .await
            .expect("health request")
            .json::<serde_json::Value>()
            .await
            .expect("parse health");
        assert_eq!(health["status"], "ok");
        assert_eq!(health["regions"], 2);
        assert_eq!(
            health["observability"]["unknown_field_requests_total"].as_u64(),
            Some(2)
        );

        server_handle.abort();
        let _ = server_handle.await;
    }

    #[tokio::test]
    async fn long_field_and_search_degrade_instead_of_failing() {
        let state = AppState::new(fixtures::two_regions());
        let (addr, server_handle) = spawn_test_server(state).await;
        let base_url = format!("http://{addr}");
        let client = reqwest::Client::new();
        let long_field = "X".repeat(65);
        let long_search = "a".repeat(129);

        let view = client
            .get(format!("{base_url}/api/table"))
            .query(&[("field", "K_Miskin"), ("search", long_search.as_str())])
            .send()
            .await
            .expect("table request")
            .error_for_status()
            .expect("long search should succeed")
            .json::<TableView>()
            .await
            .expect("parse table");
        assert!(view.rows.is_empty());

        let view = client
            .get(format!("{base_url}/api/table"))
            .query(&[("field", long_field.as_str())])
            .send()
            .await
            .expect("table request")
            .error_for_status()
            .expect("long field should succeed")
            .json::<TableView>()
            .await
            .expect("parse table");
        assert_eq!(view.rows.len(), 2);
        assert!(view.rows.iter().all(|row| row.value.is_none()));

        let figure = client
            .get(format!("{base_url}/api/map"))
            .query(&[("field", long_field.as_str())])
            .send()
            .await
            .expect("map request")
            .error_for_status()
            .expect("long field map should succeed")
            .json::<MapFigure>()
            .await
            .expect("parse figure");
        assert_eq!(figure.no_data_count(), 2);

        server_handle.abort();
        let _ = server_handle.await;
    }

    #[tokio::test]
    async fn map_endpoint_returns_not_modified_when_etag_matches() {
        let state = AppState::new(fixtures::two_regions());
        let (addr, server_handle) = spawn_test_server(state).await;
        let base_url = format!("http://{addr}");
        let client = reqwest::Client::new();

        let first = client
            .get(format!("{base_url}/api/map?field=K_Miskin"))
            .send()
            .await
            .expect("map request should succeed");
        let first_status = first.status();
        let first_etag = first
            .headers()
            .get(reqwest::header::ETAG)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned)
            .expect("etag header should be present");
        let figure = first.json::<MapFigure>().await.expect("parse figure");

        assert_eq!(first_status, reqwest::StatusCode::OK);
        assert_eq!(figure.color_bar.title, "Keparahan Kemiskinan");
        assert!(!figure.regions[0].no_data);
        assert!(figure.regions[1].no_data);

        let second = client
            .get(format!("{base_url}/api/map?field=K_Miskin"))
            .header(reqwest::header::IF_NONE_MATCH, first_etag)
            .send()
            .await
            .expect("conditional map request should succeed");

        assert_eq!(second.status(), reqwest::StatusCode::NOT_MODIFIED);
        assert_eq!(
            second
                .headers()
                .get(reqwest::header::CACHE_CONTROL)
                .and_then(|value| value.to_str().ok()),
            Some("public, max-age=300")
        );

        let metrics = client
            .get(format!("{base_url}/api/metrics"))
            .send()
            .await
            .expect("metrics request")
            .text()
            .await
            .expect("metrics text");
        assert!(metrics.contains("prioritas_map_requests_total 2"));
        assert!(metrics.contains("prioritas_map_not_modified_total 1"));

        server_handle.abort();
        let _ = server_handle.await;
    }
}
