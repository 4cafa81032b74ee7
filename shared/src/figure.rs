use serde::{Deserialize, Serialize};

use crate::colors::ColorStop;

/// Initial view hint: centre of Indonesia.
pub const HOME_CENTER: GeoPoint = GeoPoint {
    lat: -2.0,
    lon: 118.0,
};
pub const HOME_PROJECTION_SCALE: f64 = 6.5;
pub const MAP_HEIGHT_PX: u32 = 600;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

/// Axis-aligned lon/lat box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl Bounds {
    pub fn union(self, other: Bounds) -> Bounds {
        Bounds {
            min_lon: self.min_lon.min(other.min_lon),
            min_lat: self.min_lat.min(other.min_lat),
            max_lon: self.max_lon.max(other.max_lon),
            max_lat: self.max_lat.max(other.max_lat),
        }
    }

    pub fn width(&self) -> f64 {
        self.max_lon - self.min_lon
    }

    pub fn height(&self) -> f64 {
        self.max_lat - self.min_lat
    }
}

/// Polygons -> rings -> `[lon, lat]` positions. The first ring of each polygon is the exterior.
pub type ShapeRings = Vec<Vec<Vec<[f64; 2]>>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionShape {
    pub region_id: String,
    pub hover_name: Option<String>,
    pub value: Option<f64>,
    pub fill: String,
    pub no_data: bool,
    pub polygons: ShapeRings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorBar {
    pub title: String,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub stops: Vec<ColorStop>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewHint {
    pub center: GeoPoint,
    pub projection_scale: f64,
    /// Union of all region bounds; takes precedence over `center` once known.
    pub fit_bounds: Option<Bounds>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapFigure {
    pub field: String,
    pub color_bar: ColorBar,
    pub no_data_color: String,
    pub view: ViewHint,
    pub height: u32,
    pub regions: Vec<RegionShape>,
}

impl MapFigure {
    pub fn no_data_count(&self) -> usize {
        self.regions.iter().filter(|region| region.no_data).count()
    }
}
