use gloo_timers::future::TimeoutFuture;
use leptos::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;

use prioritas_shared::{DASHBOARD_TITLE, DatasetMeta, MapFigure, TableView};

use crate::api;
use crate::map_view::ChoroplethMap;
use crate::table_view::DataTable;

/// Quiet period after the last keystroke before the table refetches.
const SEARCH_DEBOUNCE_MS: u32 = 350;

fn input_value(e: &leptos::ev::Event) -> Option<String> {
    let target = e.target()?;
    let input = target.dyn_into::<web_sys::HtmlInputElement>().ok()?;
    Some(input.value())
}

fn select_value(e: &leptos::ev::Event) -> Option<String> {
    let target = e.target()?;
    let select = target.dyn_into::<web_sys::HtmlSelectElement>().ok()?;
    Some(select.value())
}

/// Bump a request counter and return the new generation. Responses that come back
/// with an older generation are dropped.
fn next_generation(nonce: RwSignal<u64>) -> u64 {
    nonce.update(|n| *n = n.wrapping_add(1));
    nonce.get_untracked()
}

/// What to do with a finished fetch. Responses from superseded requests are dropped
/// whether they succeeded or failed.
#[derive(Debug, PartialEq)]
enum FetchOutcome<T> {
    Apply(T),
    Fail(String),
    Stale,
}

fn settle<T>(latest: u64, generation: u64, result: Result<T, String>) -> FetchOutcome<T> {
    if latest != generation {
        return FetchOutcome::Stale;
    }
    match result {
        Ok(value) => FetchOutcome::Apply(value),
        Err(e) => FetchOutcome::Fail(e),
    }
}

/// First pending error across the independent fetches, if any.
fn banner_text(errors: [&Option<String>; 3]) -> Option<String> {
    errors.into_iter().flatten().next().cloned()
}

fn loaded_caption(meta: &DatasetMeta) -> String {
    format!(
        "{} wilayah · data dimuat {}",
        meta.region_count,
        meta.loaded_at.format("%Y-%m-%d %H:%M UTC")
    )
}

#[component]
pub fn App() -> impl IntoView {
    let meta: RwSignal<Option<DatasetMeta>> = RwSignal::new(None);
    let selected: RwSignal<Option<String>> = RwSignal::new(None);
    let search_input: RwSignal<String> = RwSignal::new(String::new());
    let search: RwSignal<String> = RwSignal::new(String::new());
    let page: RwSignal<usize> = RwSignal::new(0);
    let figure: RwSignal<Option<MapFigure>> = RwSignal::new(None);
    let table: RwSignal<Option<TableView>> = RwSignal::new(None);
    let meta_error: RwSignal<Option<String>> = RwSignal::new(None);
    let map_error: RwSignal<Option<String>> = RwSignal::new(None);
    let table_error: RwSignal<Option<String>> = RwSignal::new(None);
    let error = Memo::new(move |_| {
        banner_text([&meta_error.get(), &map_error.get(), &table_error.get()])
    });

    let map_nonce: RwSignal<u64> = RwSignal::new(0);
    let table_nonce: RwSignal<u64> = RwSignal::new(0);
    let search_nonce: RwSignal<u64> = RwSignal::new(0);

    spawn_local(async move {
        match api::fetch_meta().await {
            Ok(loaded) => {
                selected.set(loaded.default_field.clone());
                meta.set(Some(loaded));
            }
            Err(e) => {
                web_sys::console::warn_1(&format!("fields fetch failed: {e}").into());
                meta_error.set(Some(e));
            }
        }
    });

    // Map follows the selected field only.
    Effect::new(move || {
        let Some(field) = selected.get() else {
            return;
        };
        let generation = next_generation(map_nonce);
        spawn_local(async move {
            let result = api::fetch_map(&field).await;
            match settle(map_nonce.get_untracked(), generation, result) {
                FetchOutcome::Apply(loaded) => {
                    figure.set(Some(loaded));
                    map_error.set(None);
                }
                FetchOutcome::Fail(e) => {
                    web_sys::console::warn_1(&format!("map fetch failed: {e}").into());
                    map_error.set(Some(e));
                }
                FetchOutcome::Stale => {}
            }
        });
    });

    // Table follows field and committed search; any change restarts paging.
    Effect::new(move || {
        let Some(field) = selected.get() else {
            return;
        };
        let query = search.get();
        page.set(0);
        let generation = next_generation(table_nonce);
        spawn_local(async move {
            let result = api::fetch_table(&field, &query).await;
            match settle(table_nonce.get_untracked(), generation, result) {
                FetchOutcome::Apply(loaded) => {
                    table.set(Some(loaded));
                    table_error.set(None);
                }
                FetchOutcome::Fail(e) => {
                    web_sys::console::warn_1(&format!("table fetch failed: {e}").into());
                    table_error.set(Some(e));
                }
                FetchOutcome::Stale => {}
            }
        });
    });

    let on_field_change = move |e: leptos::ev::Event| {
        if let Some(code) = select_value(&e) {
            selected.set(Some(code));
        }
    };

    let on_search_input = move |e: leptos::ev::Event| {
        let Some(value) = input_value(&e) else {
            return;
        };
        search_input.set(value.clone());
        let generation = next_generation(search_nonce);
        spawn_local(async move {
            TimeoutFuture::new(SEARCH_DEBOUNCE_MS).await;
            if search_nonce.get_untracked() == generation && search.get_untracked() != value {
                search.set(value);
            }
        });
    };

    // Enter or blur commits immediately and cancels the pending debounce.
    let on_search_change = move |e: leptos::ev::Event| {
        let Some(value) = input_value(&e) else {
            return;
        };
        next_generation(search_nonce);
        search_input.set(value.clone());
        if search.get_untracked() != value {
            search.set(value);
        }
    };

    let field_options = move || {
        let current = selected.get();
        meta.with(|meta| {
            meta.as_ref()
                .map(|meta| meta.fields.clone())
                .unwrap_or_default()
                .into_iter()
                .map(|option| {
                    let is_selected = current.as_deref() == Some(option.code.as_str());
                    view! {
                        <option value=option.code selected=is_selected>{option.label}</option>
                    }
                })
                .collect_view()
        })
    };
    let no_fields = move || meta.with(|meta| meta.as_ref().is_none_or(|m| m.fields.is_empty()));

    view! {
        <div style="font-family: 'Inter', system-ui, sans-serif; color: #222; padding: 16px 24px;">
            <h1 style="text-align: center; font-size: 1.6rem; margin: 8px 0 20px;">{DASHBOARD_TITLE}</h1>
            <div
                style="background: #fdecea; color: #8a1f11; padding: 8px 12px; border-radius: 4px; margin-bottom: 12px;"
                style:display=move || if error.with(Option::is_some) { "block" } else { "none" }
            >
                {move || error.get().unwrap_or_default()}
            </div>
            <div style="width: 50%; min-width: 280px; margin: 0 auto 16px;">
                <label for="field-select" style="display: block; font-weight: 600; margin-bottom: 6px;">
                    "Pilih atribut prioritas:"
                </label>
                <select
                    id="field-select"
                    style="width: 100%; padding: 6px 8px; font-size: 0.95rem;"
                    disabled=no_fields
                    on:change=on_field_change
                >
                    {field_options}
                </select>
            </div>
            <ChoroplethMap figure=figure />
            <h2 style="font-size: 1.2rem; margin: 28px 0 10px;">"Tabel Data Wilayah"</h2>
            <input
                type="text"
                placeholder="Cari Kabupaten/Kota…"
                style="width: 100%; max-width: 420px; padding: 6px 10px; margin-bottom: 10px; font-size: 0.95rem;"
                prop:value=move || search_input.get()
                on:input=on_search_input
                on:change=on_search_change
            />
            <DataTable table=table page=page />
            <div style="margin-top: 16px; font-size: 0.75rem; color: #777;">
                {move || meta.with(|meta| meta.as_ref().map(loaded_caption).unwrap_or_default())}
            </div>
        </div>
    }
}
