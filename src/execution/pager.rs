//! Paging arithmetic and page merging
//!
//! Pages of a two-dimensional result are traversed row-major: columns of a
//! row band first, then the next band starting at column 0. A merged result is
//! built by appending columns to existing rows or new rows to the end.

use super::result::{ExecutionResult, ResultData};
use crate::error::{ChartError, Result};

/// Page size requested per dimension when none is given
pub const DEFAULT_LIMIT: usize = 1000;

fn validate_dimensions(count: usize) -> Result<()> {
    if count == 1 || count == 2 {
        Ok(())
    } else {
        Err(ChartError::InvalidDimensionality(count))
    }
}

/// `limit`, `offset` and `total` must describe the same 1 or 2 dimensions
fn validate_paging(limit: &[usize], offset: &[usize], total: &[usize]) -> Result<()> {
    validate_dimensions(total.len())?;
    for len in [limit.len(), offset.len()] {
        if len != total.len() {
            return Err(ChartError::InvalidDimensionality(len));
        }
    }
    Ok(())
}

/// Offset of the page following the one at `offset`.
///
/// Returns `None` once the first dimension is exhausted.
pub fn next_offset(limit: &[usize], offset: &[usize], total: &[usize]) -> Result<Option<Vec<usize>>> {
    validate_paging(limit, offset, total)?;
    let next_rows = offset[0] + limit[0];

    let next = if total.len() == 1 {
        vec![next_rows]
    } else if offset[1] + limit[1] < total[1] {
        vec![offset[0], offset[1] + limit[1]]
    } else {
        vec![next_rows, 0]
    };

    Ok(next_page_exists(&next, total).then_some(next))
}

/// Limit to request at `next_offset` so that no page reaches past `total`.
pub fn next_limit(limit: &[usize], next_offset: &[usize], total: &[usize]) -> Result<Vec<usize>> {
    validate_paging(limit, next_offset, total)?;
    let single = |limit: usize, offset: usize, total: usize| {
        if offset + limit > total {
            total.saturating_sub(offset)
        } else {
            limit
        }
    };

    // a new row band must not inherit the shrunken column limit of the previous band
    if total.len() == 2 && next_offset[1] == 0 && limit[0] < total[1] {
        return Ok(vec![single(limit[0], next_offset[0], total[0]), limit[0]]);
    }

    Ok((0..total.len())
        .map(|i| single(limit[i], next_offset[i], total[i]))
        .collect())
}

pub fn next_page_exists(next_offset: &[usize], total: &[usize]) -> bool {
    matches!((next_offset.first(), total.first()), (Some(offset), Some(total)) if offset < total)
}

/// Merge `page` into the accumulated result.
///
/// Header items of a dimension are taken only from pages at the edge of the
/// other dimension (its offset is 0), so column pages of one row band do not
/// repeat the row headers.
pub fn merge_page(mut merged: ExecutionResult, page: &ExecutionResult) -> Result<ExecutionResult> {
    let dimensions = page.paging.offset.len();
    validate_dimensions(dimensions)?;
    if merged.paging.offset.len() != dimensions || page.paging.total.len() != dimensions {
        return Err(ChartError::InvalidDimensionality(dimensions));
    }
    let row_offset = page.paging.offset[0];

    let data = std::mem::take(&mut merged.data);
    merged.data = merge_data(data, &page.data, row_offset)
        .ok_or(ChartError::InvalidDimensionality(dimensions))?;

    if dimensions == 2 {
        for dimension in 0..2 {
            let other = 1 - dimension;
            if page.paging.offset[other] == 0 {
                merge_header_items(&mut merged, page, dimension);
            }
        }
    } else {
        merge_header_items(&mut merged, page, 0);
    }

    merged.paging.count = (0..dimensions)
        .map(|d| {
            merged
                .header_items
                .get(d)
                .and_then(|headers| headers.first())
                .map_or(0, Vec::len)
        })
        .collect();

    Ok(merged)
}

fn merge_data(data: ResultData, page: &ResultData, row_offset: usize) -> Option<ResultData> {
    match (data, page) {
        (ResultData::TwoDim(mut rows), ResultData::TwoDim(page_rows)) => {
            if row_offset < rows.len() {
                // same row band: append columns
                for (i, columns) in page_rows.iter().enumerate() {
                    match rows.get_mut(i + row_offset) {
                        Some(row) => row.extend(columns.iter().cloned()),
                        None => rows.push(columns.clone()),
                    }
                }
            } else {
                rows.extend(page_rows.iter().cloned());
            }
            Some(ResultData::TwoDim(rows))
        }
        (ResultData::OneDim(mut values), ResultData::OneDim(page_values)) => {
            values.extend(page_values.iter().cloned());
            Some(ResultData::OneDim(values))
        }
        (ResultData::TwoDim(rows), ResultData::OneDim(page_values)) if rows.is_empty() => {
            Some(ResultData::OneDim(page_values.clone()))
        }
        (ResultData::OneDim(values), ResultData::TwoDim(page_rows)) if values.is_empty() => {
            Some(ResultData::TwoDim(page_rows.clone()))
        }
        _ => None,
    }
}

fn merge_header_items(merged: &mut ExecutionResult, page: &ExecutionResult, dimension: usize) {
    let (Some(target), Some(source)) = (
        merged.header_items.get_mut(dimension),
        page.header_items.get(dimension),
    ) else {
        return;
    };
    for (existing, items) in target.iter_mut().zip(source.iter()) {
        existing.extend(items.iter().cloned());
    }
}

fn join(values: &[usize]) -> String {
    values
        .iter()
        .map(usize::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

fn split_uri(uri: &str) -> (&str, Option<&str>) {
    match uri.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (uri, None),
    }
}

/// Set `limit` and `offset` query parameters, keeping the others in place.
///
/// Values are comma joined and commas are left unescaped.
pub fn replace_limit_and_offset_in_uri(uri: &str, limit: &[usize], offset: &[usize]) -> String {
    let (path, query) = split_uri(uri);
    let mut params: Vec<String> = query
        .into_iter()
        .flat_map(|q| q.split('&'))
        .filter(|param| !param.is_empty())
        .filter(|param| {
            let key = param.split('=').next().unwrap_or_default();
            key != "limit" && key != "offset"
        })
        .map(str::to_string)
        .collect();
    params.push(format!("limit={}", join(limit)));
    params.push(format!("offset={}", join(offset)));

    format!("{}?{}", path, params.join("&"))
}

/// Read a comma joined query parameter (`limit=1,2`) from a uri
pub fn query_values(uri: &str, key: &str) -> Result<Option<Vec<usize>>> {
    let (_, query) = split_uri(uri);
    let Some(raw) = query
        .into_iter()
        .flat_map(|q| q.split('&'))
        .find_map(|param| param.strip_prefix(key)?.strip_prefix('='))
    else {
        return Ok(None);
    };

    raw.split(',')
        .map(|v| {
            v.trim()
                .parse::<usize>()
                .map_err(|_| ChartError::InvalidUri(format!("bad {} value '{}' in {}", key, v, uri)))
        })
        .collect::<Result<Vec<_>>>()
        .map(Some)
}

/// Dimension count encoded as `dimensions=N` in a result uri
pub fn dimension_count_from_uri(uri: &str) -> Result<usize> {
    let count = query_values(uri, "dimensions")?
        .and_then(|values| values.first().copied())
        .ok_or_else(|| ChartError::InvalidUri(format!("missing dimensions in {}", uri)))?;
    validate_dimensions(count)?;
    Ok(count)
}
