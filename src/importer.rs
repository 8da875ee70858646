//! Spreadsheet importer
//!
//! Parses an uploaded `.xlsx`/`.xls` workbook into normalized manual
//! records. Headers are matched case-insensitively, missing cells become
//! empty strings, numeric columns coerce to 0, and date-like cells are
//! reduced to a `YYYY-MM-DD` prefix.

use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use std::collections::HashMap;
use std::io::Cursor;
use thiserror::Error;

use crate::models::{normalize_date_str, SENTINEL_DATE};
use crate::store::NewManualVideo;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("failed to read workbook: {0}")]
    Workbook(#[from] calamine::Error),

    #[error("workbook has no worksheets")]
    NoSheet,
}

/// True for the spreadsheet extensions the upload endpoint accepts.
pub fn has_spreadsheet_extension(file_name: &str) -> bool {
    let lower = file_name.to_ascii_lowercase();
    lower.ends_with(".xlsx") || lower.ends_with(".xls")
}

/// Parse the first worksheet of an uploaded workbook into insertable rows.
pub fn parse_workbook(bytes: &[u8]) -> Result<Vec<NewManualVideo>, ImportError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(ImportError::NoSheet)??;
    Ok(rows_from_range(&range))
}

fn rows_from_range(range: &Range<Data>) -> Vec<NewManualVideo> {
    let mut rows_iter = range.rows();

    let Some(header) = rows_iter.next() else {
        return Vec::new();
    };

    let columns: HashMap<String, usize> = header
        .iter()
        .enumerate()
        .map(|(i, cell)| (cell.to_string().trim().to_lowercase(), i))
        .collect();

    let field = |row: &[Data], name: &str| -> Option<Data> {
        columns.get(name).and_then(|&i| row.get(i)).cloned()
    };

    let mut records = Vec::new();
    for row in rows_iter {
        if row.iter().all(|cell| matches!(cell, Data::Empty)) {
            continue;
        }

        records.push(NewManualVideo {
            title: text_cell(field(row, "title")),
            channel: text_cell(field(row, "channel")),
            published: date_cell(field(row, "published")),
            views: count_cell(field(row, "views")),
            likes: count_cell(field(row, "likes")),
            comments: count_cell(field(row, "comments")),
            url: text_cell(field(row, "url")),
            keywords: text_cell(field(row, "keywords")).to_lowercase(),
        });
    }

    records
}

fn text_cell(cell: Option<Data>) -> String {
    match cell {
        Some(Data::String(s)) => s.trim().to_string(),
        Some(Data::Float(f)) if f.is_finite() && f.fract() == 0.0 => format!("{}", f as i64),
        Some(Data::Float(f)) => f.to_string(),
        Some(Data::Int(i)) => i.to_string(),
        Some(Data::Bool(b)) => b.to_string(),
        Some(Data::DateTimeIso(s)) => s.trim().to_string(),
        _ => String::new(),
    }
}

fn count_cell(cell: Option<Data>) -> i64 {
    let value = match cell {
        Some(Data::Int(i)) => i,
        Some(Data::Float(f)) if f.is_finite() => f as i64,
        Some(Data::String(s)) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .map(|f| f as i64)
            .unwrap_or(0),
        _ => 0,
    };
    value.max(0)
}

fn date_cell(cell: Option<Data>) -> String {
    match cell {
        Some(Data::DateTime(dt)) => dt
            .as_datetime()
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| SENTINEL_DATE.to_string()),
        Some(Data::DateTimeIso(s)) | Some(Data::String(s)) => normalize_date_str(&s),
        _ => SENTINEL_DATE.to_string(),
    }
}
