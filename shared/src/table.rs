use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const PAGE_SIZE: usize = 20;
pub const NAME_COLUMN: &str = "Kabupaten/Kota";
pub const PROVINCE_COLUMN: &str = "Provinsi";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    pub name: Option<String>,
    pub province: Option<String>,
    pub value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableView {
    pub field: String,
    /// Display headers: name, province, aliased indicator.
    pub columns: [String; 3],
    pub rows: Vec<TableRow>,
    pub page_size: usize,
}

impl TableView {
    pub fn page(&self, page: usize) -> &[TableRow] {
        page_slice(&self.rows, page, self.page_size)
    }

    pub fn page_count(&self) -> usize {
        page_count(self.rows.len(), self.page_size)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldOption {
    pub code: String,
    pub label: String,
}

/// Everything the selector needs to render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetMeta {
    pub title: String,
    pub fields: Vec<FieldOption>,
    pub default_field: Option<String>,
    pub region_count: usize,
    pub loaded_at: DateTime<Utc>,
}

pub fn page_count(total: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    total.div_ceil(page_size)
}

/// Zero-based page of `rows`. Out-of-range pages are empty.
pub fn page_slice<T>(rows: &[T], page: usize, page_size: usize) -> &[T] {
    let Some(start) = page.checked_mul(page_size) else {
        return &[];
    };
    if start >= rows.len() {
        return &[];
    }
    let end = start.saturating_add(page_size).min(rows.len());
    &rows[start..end]
}
