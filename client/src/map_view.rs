use leptos::prelude::*;

use prioritas_shared::MapFigure;

use crate::format::{format_tick, format_value, gradient_css};
use crate::projection::{Projection, svg_path};

pub const MAP_VIEW_WIDTH: f64 = 1000.0;

#[derive(Debug, Clone, PartialEq)]
struct RegionPath {
    region_id: String,
    d: String,
    fill: String,
    hover: String,
}

fn build_paths(figure: &MapFigure) -> Vec<RegionPath> {
    let height = figure.height as f64;
    let Some(projection) = Projection::for_view(&figure.view, MAP_VIEW_WIDTH, height) else {
        return Vec::new();
    };

    figure
        .regions
        .iter()
        .filter(|region| !region.polygons.is_empty())
        .map(|region| {
            let name = region.hover_name.as_deref().unwrap_or("-");
            let hover = if region.no_data {
                format!("{name} · tidak ada data")
            } else {
                format!(
                    "{name} · {}: {}",
                    figure.color_bar.title,
                    format_value(region.value)
                )
            };
            RegionPath {
                region_id: region.region_id.clone(),
                d: svg_path(&region.polygons, &projection),
                fill: region.fill.clone(),
                hover,
            }
        })
        .collect()
}

/// Every value a rendered path captures is part of its key.
fn path_key(path: &RegionPath) -> (String, String, String) {
    (path.region_id.clone(), path.fill.clone(), path.hover.clone())
}

#[component]
pub fn ChoroplethMap(figure: RwSignal<Option<MapFigure>>) -> impl IntoView {
    let hovered: RwSignal<Option<String>> = RwSignal::new(None);
    let paths = Memo::new(move |_| {
        figure.with(|figure| figure.as_ref().map(build_paths).unwrap_or_default())
    });
    let height = move || figure.with(|figure| figure.as_ref().map(|f| f.height).unwrap_or(600));

    view! {
        <div style="position: relative; width: 100%; max-width: 1200px; margin: 0 auto;">
            <svg
                viewBox=move || format!("0 0 {MAP_VIEW_WIDTH} {}", height())
                style="width: 100%; height: auto; display: block; background: transparent;"
                on:mouseleave=move |_| hovered.set(None)
            >
                <For
                    each=move || paths.get()
                    key=path_key
                    children=move |path| {
                        let hover = path.hover.clone();
                        view! {
                            <path
                                d=path.d
                                fill=path.fill
                                fill-rule="evenodd"
                                stroke="#ffffff"
                                stroke-width="0.5"
                                on:mouseenter=move |_| hovered.set(Some(hover.clone()))
                            />
                        }
                    }
                />
            </svg>
            <div style="position: absolute; left: 12px; top: 12px; padding: 4px 8px; background: rgba(255,255,255,0.85); border-radius: 4px; font-size: 0.85rem; pointer-events: none;"
                style:display=move || if hovered.with(Option::is_some) { "block" } else { "none" }
            >
                {move || hovered.get().unwrap_or_default()}
            </div>
            <ColorBarLegend figure=figure />
        </div>
    }
}

#[component]
fn ColorBarLegend(figure: RwSignal<Option<MapFigure>>) -> impl IntoView {
    let legend = move || {
        figure.with(|figure| {
            figure.as_ref().map(|figure| {
                (
                    figure.color_bar.clone(),
                    figure.no_data_color.clone(),
                    figure.no_data_count(),
                )
            })
        })
    };

    move || {
        legend().map(|(color_bar, no_data_color, no_data_count)| {
            let gradient = format!(
                "height: 12px; width: 220px; border-radius: 2px; background: {};",
                gradient_css(&color_bar.stops)
            );
            let min = color_bar.min.map(format_tick).unwrap_or_default();
            let max = color_bar.max.map(format_tick).unwrap_or_default();
            let swatch = format!(
                "display: inline-block; width: 12px; height: 12px; margin-right: 6px; vertical-align: middle; background: {no_data_color};"
            );
            view! {
                <div style="position: absolute; right: 16px; bottom: 16px; padding: 8px 10px; background: rgba(255,255,255,0.9); border-radius: 4px; font-size: 0.8rem;">
                    <div style="font-weight: bold; margin-bottom: 4px;">{color_bar.title}</div>
                    <div style=gradient></div>
                    <div style="display: flex; justify-content: space-between;">
                        <span>{min}</span>
                        <span>{max}</span>
                    </div>
                    <div style="margin-top: 4px;" style:display={if no_data_count > 0 { "block" } else { "none" }}>
                        <span style=swatch></span>
                        {format!("Tidak ada data ({no_data_count})")}
                    </div>
                </div>
            }
        })
    }
}
