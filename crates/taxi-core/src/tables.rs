//! Loading of the vertex and segment reference tables.
//!
//! Both tables are CSV. Headers are located with the matchers in
//! [`crate::schema`]; a missing header is fatal, a bad row is logged and
//! dropped.

use crate::error::{Result, TaxiError};
use crate::models::{Segment, Vertex, VertexId};
use crate::schema;
use std::io::Read;
use std::path::Path;

const VERTEX_TABLE: &str = "vertex";
const SEGMENT_TABLE: &str = "segment";

/// Read the vertex table. Later rows override earlier rows with the same index.
pub fn read_vertices<R: Read>(reader: R) -> Result<Vec<Vertex>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);
    let headers = csv_reader.headers()?.clone();
    let headers: Vec<&str> = headers.iter().collect();

    let id_col = schema::vertex_id_column().require(VERTEX_TABLE, &headers)?;
    let lat_col = schema::latitude_column().require(VERTEX_TABLE, &headers)?;
    let lon_col = schema::longitude_column().require(VERTEX_TABLE, &headers)?;

    let mut vertices = Vec::new();
    for (row, record) in csv_reader.records().enumerate() {
        let parsed = record.map_err(TaxiError::from).and_then(|record| {
            let field = |col: usize| record.get(col).unwrap_or("").to_string();
            parse_vertex_row(row, &field(id_col), &field(lat_col), &field(lon_col))
        });
        match parsed {
            Ok(vertex) => vertices.push(vertex),
            Err(err) => tracing::warn!("Skipping vertex row: {}", err),
        }
    }

    tracing::debug!("Loaded {} vertex rows", vertices.len());
    Ok(vertices)
}

/// Read the segment table, dropping rows whose vertex list does not parse.
pub fn read_segments<R: Read>(reader: R) -> Result<Vec<Segment>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);
    let headers = csv_reader.headers()?.clone();
    let headers: Vec<&str> = headers.iter().collect();

    let ident_col = schema::ident_column().require(SEGMENT_TABLE, &headers)?;
    let list_col = schema::vertex_list_column().require(SEGMENT_TABLE, &headers)?;

    let mut segments = Vec::new();
    for (row, record) in csv_reader.records().enumerate() {
        let parsed = record.map_err(TaxiError::from).and_then(|record| {
            let ident = record.get(ident_col).unwrap_or("").trim().to_string();
            let vertices = parse_vertex_list(record.get(list_col).unwrap_or("")).map_err(
                |reason| TaxiError::MalformedRow {
                    table: SEGMENT_TABLE.to_string(),
                    row,
                    reason,
                },
            )?;
            Ok(Segment { ident, vertices })
        });
        match parsed {
            Ok(segment) => segments.push(segment),
            Err(err) => tracing::warn!("Skipping segment row: {}", err),
        }
    }

    tracing::debug!("Loaded {} segment rows", segments.len());
    Ok(segments)
}

pub fn read_vertices_from_path(path: impl AsRef<Path>) -> Result<Vec<Vertex>> {
    read_vertices(std::fs::File::open(path)?)
}

pub fn read_segments_from_path(path: impl AsRef<Path>) -> Result<Vec<Segment>> {
    read_segments(std::fs::File::open(path)?)
}

/// Split a vertex list on `;`, else `,`, else whitespace.
///
/// Every piece must be an integer; an empty list is rejected.
pub fn parse_vertex_list(raw: &str) -> std::result::Result<Vec<VertexId>, String> {
    let raw = raw.trim();
    let pieces: Vec<&str> = if raw.contains(';') {
        raw.split(';').collect()
    } else if raw.contains(',') {
        raw.split(',').collect()
    } else {
        raw.split_whitespace().collect()
    };

    let vertices = pieces
        .into_iter()
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .map(|piece| {
            piece
                .parse::<VertexId>()
                .map_err(|_| format!("invalid vertex index '{}'", piece))
        })
        .collect::<std::result::Result<Vec<_>, _>>()?;

    if vertices.is_empty() {
        return Err("empty vertex list".to_string());
    }
    Ok(vertices)
}

fn parse_vertex_row(row: usize, id: &str, lat: &str, lon: &str) -> Result<Vertex> {
    let malformed = |reason: String| TaxiError::MalformedRow {
        table: VERTEX_TABLE.to_string(),
        row,
        reason,
    };
    let index = parse_index(id).ok_or_else(|| malformed(format!("invalid index '{}'", id)))?;
    let lat: f64 = lat
        .parse()
        .map_err(|_| malformed(format!("invalid latitude '{}'", lat)))?;
    let lon: f64 = lon
        .parse()
        .map_err(|_| malformed(format!("invalid longitude '{}'", lon)))?;
    if !lat.is_finite() || !lon.is_finite() {
        return Err(malformed("non-finite coordinate".to_string()));
    }
    Ok(Vertex { index, lat, lon })
}

/// Spreadsheet exports sometimes write integer ids as "12.0".
fn parse_index(raw: &str) -> Option<VertexId> {
    if let Ok(index) = raw.parse::<VertexId>() {
        return Some(index);
    }
    let value: f64 = raw.parse().ok()?;
    if value.fract() == 0.0 && value >= 0.0 && value <= VertexId::MAX as f64 {
        Some(value as VertexId)
    } else {
        None
    }
}
