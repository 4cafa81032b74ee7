use prioritas_shared::{Bounds, ShapeRings, ViewHint};

/// Padding around fitted bounds, as a fraction of the data extent.
const FIT_PADDING: f64 = 0.05;

/// Plate carrée projection from lon/lat onto SVG user space (y grows downward).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub offset_x: f64,
    pub offset_y: f64,
    pub scale: f64,
}

impl Projection {
    /// Fit `bounds` inside a `width` x `height` canvas, centred, preserving aspect ratio.
    pub fn fit(bounds: Bounds, width: f64, height: f64) -> Option<Self> {
        let world_w = bounds.width();
        let world_h = bounds.height();

        if world_w <= 0.0 || world_h <= 0.0 || width <= 0.0 || height <= 0.0 {
            return None;
        }

        let scale_x = width / (world_w * (1.0 + FIT_PADDING * 2.0));
        let scale_y = height / (world_h * (1.0 + FIT_PADDING * 2.0));
        let scale = scale_x.min(scale_y);

        let center_x = (bounds.min_lon + bounds.max_lon) / 2.0;
        let center_y = (bounds.min_lat + bounds.max_lat) / 2.0;
        Some(Self {
            offset_x: width / 2.0 - center_x * scale,
            offset_y: height / 2.0 + center_y * scale,
            scale,
        })
    }

    /// Use the data bounds when present, otherwise frame the home hint.
    pub fn for_view(view: &ViewHint, width: f64, height: f64) -> Option<Self> {
        view.fit_bounds
            .and_then(|bounds| Self::fit(bounds, width, height))
            .or_else(|| Self::fit(hint_bounds(view, width, height), width, height))
    }

    pub fn project(&self, lon: f64, lat: f64) -> (f64, f64) {
        (
            lon * self.scale + self.offset_x,
            -lat * self.scale + self.offset_y,
        )
    }
}

/// Box around the hinted centre; a projection scale of 1 spans the whole globe.
fn hint_bounds(view: &ViewHint, width: f64, height: f64) -> Bounds {
    let half_lon = 180.0 / view.projection_scale.max(1.0);
    let half_lat = if width > 0.0 {
        half_lon * height / width
    } else {
        half_lon
    };
    Bounds {
        min_lon: view.center.lon - half_lon,
        min_lat: view.center.lat - half_lat,
        max_lon: view.center.lon + half_lon,
        max_lat: view.center.lat + half_lat,
    }
}

/// SVG path data for a region. Holes rely on `fill-rule="evenodd"`.
pub fn svg_path(polygons: &ShapeRings, projection: &Projection) -> String {
    let mut d = String::new();
    for ring in polygons.iter().flatten() {
        if ring.len() < 3 {
            continue;
        }
        for (idx, [lon, lat]) in ring.iter().enumerate() {
            let (x, y) = projection.project(*lon, *lat);
            let cmd = if idx == 0 { 'M' } else { 'L' };
            if !d.is_empty() {
                d.push(' ');
            }
            d.push_str(&format!("{cmd}{x:.1},{y:.1}"));
        }
        d.push_str(" Z");
    }
    d
}
