use prioritas_shared::{NAME_COLUMN, PAGE_SIZE, PROVINCE_COLUMN, TableRow, TableView, alias};
use tracing::debug;

use crate::dataset::{Region, RegionDataset};

/// Project the dataset to name / province / aliased value, optionally filtered by region name.
///
/// Rows keep dataset order. Paging is left to the caller.
pub fn project_table(
    dataset: &RegionDataset,
    selected_code: &str,
    search_text: Option<&str>,
) -> TableView {
    let indicator_idx = dataset.indicator_index(selected_code);
    if indicator_idx.is_none() {
        debug!(field = selected_code, "projecting unknown field as null column");
    }

    let needle = search_text
        .filter(|text| !text.is_empty())
        .map(str::to_lowercase);

    let rows = dataset
        .regions()
        .iter()
        .filter(|region| match needle.as_deref() {
            Some(needle) => name_matches(region, needle),
            None => true,
        })
        .map(|region| TableRow {
            name: region.name.clone(),
            province: region.province.clone(),
            value: indicator_idx.and_then(|idx| region.value_at(idx)),
        })
        .collect();

    TableView {
        field: selected_code.to_string(),
        columns: [
            NAME_COLUMN.to_string(),
            PROVINCE_COLUMN.to_string(),
            alias::label(selected_code).to_string(),
        ],
        rows,
        page_size: PAGE_SIZE,
    }
}

/// `needle` must already be lowercased. Regions without a name never match.
fn name_matches(region: &Region, needle: &str) -> bool {
    region
        .name
        .as_deref()
        .is_some_and(|name| name.to_lowercase().contains(needle))
}
