use prioritas_shared::{DatasetMeta, MapFigure, TableView};
use serde::de::DeserializeOwned;

/// Selector options and the default field.
pub async fn fetch_meta() -> Result<DatasetMeta, String> {
    get_json(gloo_net::http::Request::get("/api/fields")).await
}

pub async fn fetch_map(field: &str) -> Result<MapFigure, String> {
    get_json(gloo_net::http::Request::get("/api/map").query([("field", field)])).await
}

/// Full filtered table; paging happens client-side.
pub async fn fetch_table(field: &str, search: &str) -> Result<TableView, String> {
    let mut params = vec![("field", field)];
    if !search.is_empty() {
        params.push(("search", search));
    }
    get_json(gloo_net::http::Request::get("/api/table").query(params)).await
}

async fn get_json<T: DeserializeOwned>(
    request: gloo_net::http::RequestBuilder,
) -> Result<T, String> {
    let resp = request
        .send()
        .await
        .map_err(|e| format!("fetch error: {e}"))?;

    if !resp.ok() {
        return Err(format!("HTTP {}", resp.status()));
    }

    resp.json::<T>()
        .await
        .map_err(|e| format!("parse error: {e}"))
}
