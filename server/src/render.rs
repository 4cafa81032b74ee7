use geo::{BoundingRect, MultiPolygon};
use prioritas_shared::colors::{
    NO_DATA_COLOR, normalize, rgb_hex, sample_yl_or_rd, yl_or_rd_stops,
};
use prioritas_shared::{
    Bounds, ColorBar, HOME_CENTER, HOME_PROJECTION_SCALE, MAP_HEIGHT_PX, MapFigure, RegionShape,
    ShapeRings, ViewHint, alias,
};
use tracing::debug;

use crate::dataset::{Region, RegionDataset};

/// Build the choropleth for `selected_code` over every region in the dataset.
///
/// Unknown codes and null values render as "no data" rather than failing.
pub fn render_map(dataset: &RegionDataset, selected_code: &str) -> MapFigure {
    let indicator_idx = dataset.indicator_index(selected_code);
    if indicator_idx.is_none() {
        debug!(field = selected_code, "rendering unknown field as no data");
    }

    let value_of = |region: &Region| indicator_idx.and_then(|idx| region.value_at(idx));
    let range = value_range(dataset.regions().iter().filter_map(value_of));

    let mut fit_bounds: Option<Bounds> = None;
    let regions = dataset
        .regions()
        .iter()
        .map(|region| {
            let value = value_of(region);
            let fill = match (value, range) {
                (Some(value), Some((min, max))) => {
                    rgb_hex(sample_yl_or_rd(normalize(value, min, max)))
                }
                _ => NO_DATA_COLOR.to_string(),
            };

            if let Some(bounds) = region.geometry.as_ref().and_then(shape_bounds) {
                fit_bounds = Some(match fit_bounds {
                    Some(acc) => acc.union(bounds),
                    None => bounds,
                });
            }

            RegionShape {
                region_id: region.region_id.clone(),
                hover_name: region.name.clone(),
                value,
                fill,
                no_data: value.is_none(),
                polygons: region.geometry.as_ref().map(shape_rings).unwrap_or_default(),
            }
        })
        .collect();

    MapFigure {
        field: selected_code.to_string(),
        color_bar: ColorBar {
            title: alias::label(selected_code).to_string(),
            min: range.map(|(min, _)| min),
            max: range.map(|(_, max)| max),
            stops: yl_or_rd_stops(),
        },
        no_data_color: NO_DATA_COLOR.to_string(),
        view: ViewHint {
            center: HOME_CENTER,
            projection_scale: HOME_PROJECTION_SCALE,
            fit_bounds,
        },
        height: MAP_HEIGHT_PX,
        regions,
    }
}

fn value_range(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values.fold(None, |acc, value| match acc {
        None => Some((value, value)),
        Some((min, max)) => Some((min.min(value), max.max(value))),
    })
}

fn shape_bounds(shape: &MultiPolygon<f64>) -> Option<Bounds> {
    shape.bounding_rect().map(|rect| Bounds {
        min_lon: rect.min().x,
        min_lat: rect.min().y,
        max_lon: rect.max().x,
        max_lat: rect.max().y,
    })
}

fn shape_rings(shape: &MultiPolygon<f64>) -> ShapeRings {
    shape
        .iter()
        .map(|polygon| {
            std::iter::once(polygon.exterior())
                .chain(polygon.interiors())
                .map(|ring| ring.coords().map(|c| [c.x, c.y]).collect())
                .collect()
        })
        .collect()
}
