use leptos::prelude::*;

use prioritas_shared::{TableRow, TableView};

use crate::format::{format_value, pager_label};

const CELL_STYLE: &str = "padding: 6px 10px; border-bottom: 1px solid #e5e5e5; text-align: left;";
const HEADER_STYLE: &str = "padding: 8px 10px; border-bottom: 2px solid #bdbdbd; text-align: left; background: #f5f5f5; font-weight: 600;";

fn row_cells(row: &TableRow) -> [String; 3] {
    [
        row.name.clone().unwrap_or_default(),
        row.province.clone().unwrap_or_default(),
        format_value(row.value),
    ]
}

/// Paged view over the filtered table. `page` is zero-based and owned by the caller
/// so it can be reset when the field or search changes.
#[component]
pub fn DataTable(table: RwSignal<Option<TableView>>, page: RwSignal<usize>) -> impl IntoView {
    let page_count = move || table.with(|t| t.as_ref().map(TableView::page_count).unwrap_or(0));
    let headers = move || {
        table.with(|t| {
            t.as_ref()
                .map(|t| t.columns.to_vec())
                .unwrap_or_default()
        })
    };
    let visible_rows = move || {
        let page = page.get();
        table.with(|t| {
            t.as_ref()
                .map(|t| t.page(page).iter().map(row_cells).collect::<Vec<_>>())
                .unwrap_or_default()
        })
    };

    let prev_disabled = move || page.get() == 0;
    let next_disabled = move || page.get() + 1 >= page_count();
    let on_prev = move |_| page.update(|p| *p = p.saturating_sub(1));
    let on_next = move |_| {
        let count = page_count();
        page.update(|p| {
            if *p + 1 < count {
                *p += 1;
            }
        });
    };

    view! {
        <div style="overflow-x: auto;">
            <table style="width: 100%; border-collapse: collapse; font-size: 0.9rem;">
                <thead>
                    <tr>
                        {move || {
                            headers()
                                .into_iter()
                                .map(|header| view! { <th style=HEADER_STYLE>{header}</th> })
                                .collect_view()
                        }}
                    </tr>
                </thead>
                <tbody>
                    {move || {
                        visible_rows()
                            .into_iter()
                            .map(|[name, province, value]| {
                                view! {
                                    <tr>
                                        <td style=CELL_STYLE>{name}</td>
                                        <td style=CELL_STYLE>{province}</td>
                                        <td style=CELL_STYLE>{value}</td>
                                    </tr>
                                }
                            })
                            .collect_view()
                    }}
                </tbody>
            </table>
            <div style="display: flex; align-items: center; justify-content: flex-end; gap: 8px; margin-top: 8px; font-size: 0.85rem;">
                <button disabled=prev_disabled on:click=on_prev>"‹"</button>
                <span>{move || pager_label(page.get(), page_count())}</span>
                <button disabled=next_disabled on:click=on_next>"›"</button>
            </div>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use prioritas_shared::TableRow;

    use super::row_cells;

    #[test]
    fn null_cells_render_empty() {
        let row = TableRow {
            name: Some("Kabupaten Sleman".to_string()),
            province: None,
            value: None,
        };
        assert_eq!(
            row_cells(&row),
            [
                "Kabupaten Sleman".to_string(),
                String::new(),
                String::new()
            ]
        );
    }

    #[test]
    fn values_use_cell_formatting() {
        let row = TableRow {
            name: Some("Kota Bandung".to_string()),
            province: Some("Jawa Barat".to_string()),
            value: Some(5.0),
        };
        assert_eq!(row_cells(&row)[2], "5");
    }
}
