use chrono::{DateTime, Utc};
use geo::{MultiPolygon, Simplify};
use geojson::{Feature, GeoJson};
use prioritas_shared::{DASHBOARD_TITLE, DatasetMeta, FieldOption, alias};
use serde_json::Value as JsonValue;
use tracing::{debug, info, warn};

use crate::config::{NAME_PROPERTY, PROVINCE_PROPERTY};
use crate::error::DataSourceError;

/// One administrative region (Kabupaten/Kota).
#[derive(Debug, Clone)]
pub struct Region {
    pub region_id: String,
    pub name: Option<String>,
    pub province: Option<String>,
    pub geometry: Option<MultiPolygon<f64>>,
    /// Aligned with [`RegionDataset::indicators`].
    values: Vec<Option<f64>>,
}

impl Region {
    pub fn value_at(&self, indicator_idx: usize) -> Option<f64> {
        self.values.get(indicator_idx).copied().flatten()
    }
}

/// Region records plus the indicator codes that survived loading. Built once, never mutated.
#[derive(Debug, Clone)]
pub struct RegionDataset {
    pub source_url: String,
    pub loaded_at: DateTime<Utc>,
    /// CRC32 of the raw payload.
    pub fingerprint: u32,
    indicators: Vec<&'static str>,
    regions: Vec<Region>,
}

impl RegionDataset {
    /// Parse a GeoJSON FeatureCollection, simplify boundaries at `tolerance` and keep only the
    /// columns the dashboard needs.
    pub fn parse(
        source_url: impl Into<String>,
        body: &[u8],
        tolerance: f64,
    ) -> Result<Self, DataSourceError> {
        let collection = match GeoJson::from_reader(body).map_err(geojson::Error::from)? {
            GeoJson::FeatureCollection(collection) => collection,
            GeoJson::Feature(_) => {
                return Err(DataSourceError::NotFeatureCollection { found: "Feature" });
            }
            GeoJson::Geometry(_) => {
                return Err(DataSourceError::NotFeatureCollection { found: "Geometry" });
            }
        };

        let features = collection.features;
        let indicators = numeric_indicators(&features);

        let regions = features
            .into_iter()
            .enumerate()
            .map(|(idx, feature)| build_region(idx, feature, &indicators, tolerance))
            .collect();

        Ok(Self {
            source_url: source_url.into(),
            loaded_at: Utc::now(),
            fingerprint: crc32fast::hash(body),
            indicators,
            regions,
        })
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Retained indicator codes, in registry order.
    pub fn indicators(&self) -> &[&'static str] {
        &self.indicators
    }

    pub fn indicator_index(&self, code: &str) -> Option<usize> {
        self.indicators.iter().position(|known| *known == code)
    }

    pub fn default_field(&self) -> Option<&'static str> {
        self.indicators.first().copied()
    }

    pub fn meta(&self) -> DatasetMeta {
        DatasetMeta {
            title: DASHBOARD_TITLE.to_string(),
            fields: self
                .indicators
                .iter()
                .map(|code| FieldOption {
                    code: (*code).to_string(),
                    label: alias::label(code).to_string(),
                })
                .collect(),
            default_field: self.default_field().map(str::to_string),
            region_count: self.regions.len(),
            loaded_at: self.loaded_at,
        }
    }
}

/// Fetch and parse the dataset. Called once before the server binds.
pub async fn load(
    client: &reqwest::Client,
    url: &str,
    tolerance: f64,
) -> Result<RegionDataset, DataSourceError> {
    let resp = client
        .get(url)
        .send()
        .await
        .map_err(|source| DataSourceError::Transport {
            url: url.to_string(),
            source,
        })?;

    let status = resp.status();
    if !status.is_success() {
        return Err(DataSourceError::Status {
            url: url.to_string(),
            status,
        });
    }

    let body = resp.bytes().await.map_err(|source| DataSourceError::Body {
        url: url.to_string(),
        source,
    })?;

    let dataset = RegionDataset::parse(url, &body, tolerance)?;
    info!(
        regions = dataset.len(),
        indicators = dataset.indicators().len(),
        bytes = body.len(),
        tolerance,
        "loaded region dataset"
    );
    if dataset.is_empty() {
        warn!("source returned an empty feature collection");
    }
    if dataset.default_field().is_none() {
        warn!("no numeric indicator columns found; selector will be disabled");
    }
    Ok(dataset)
}

/// Registry codes present as a property and numeric wherever non-null.
fn numeric_indicators(features: &[Feature]) -> Vec<&'static str> {
    alias::aliases()
        .map(|(code, _)| code)
        .filter(|code| {
            let mut present = false;
            let mut numeric = 0usize;
            for feature in features {
                match feature.properties.as_ref().and_then(|props| props.get(*code)) {
                    None => {}
                    Some(JsonValue::Null) => present = true,
                    Some(JsonValue::Number(_)) => {
                        present = true;
                        numeric += 1;
                    }
                    Some(other) => {
                        debug!(code, value = %other, "dropping non-numeric indicator column");
                        return false;
                    }
                }
            }
            if present && numeric == 0 {
                debug!(code, "dropping indicator column with no values");
            }
            numeric > 0
        })
        .collect()
}

fn build_region(idx: usize, feature: Feature, indicators: &[&str], tolerance: f64) -> Region {
    let props = feature.properties.as_ref();
    let text = |key: &str| {
        props
            .and_then(|props| props.get(key))
            .and_then(JsonValue::as_str)
            .map(str::to_string)
    };

    let values = indicators
        .iter()
        .map(|code| {
            props
                .and_then(|props| props.get(*code))
                .and_then(JsonValue::as_f64)
        })
        .collect();

    let name = text(NAME_PROPERTY);
    let province = text(PROVINCE_PROPERTY);

    let geometry = feature
        .geometry
        .and_then(|geometry| match geo::Geometry::<f64>::try_from(geometry) {
            Ok(geometry) => polygonal(geometry),
            Err(e) => {
                warn!(region = idx, error = %e, "skipping unreadable geometry");
                None
            }
        })
        .map(|shape| shape.simplify(&tolerance));

    Region {
        region_id: idx.to_string(),
        name,
        province,
        geometry,
        values,
    }
}

fn polygonal(geometry: geo::Geometry<f64>) -> Option<MultiPolygon<f64>> {
    match geometry {
        geo::Geometry::Polygon(polygon) => Some(MultiPolygon::new(vec![polygon])),
        geo::Geometry::MultiPolygon(multi) => Some(multi),
        geo::Geometry::GeometryCollection(collection) => {
            let polygons: Vec<_> = collection
                .into_iter()
                .filter_map(polygonal)
                .flat_map(|multi| multi.0)
                .collect();
            (!polygons.is_empty()).then(|| MultiPolygon::new(polygons))
        }
        _ => None,
    }
}
