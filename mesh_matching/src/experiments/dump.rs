/*
 *  Copyright (C) 2025  Markus Elias Gerber
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  You should have received a copy of the GNU General Public License
 *  along with this program.  If not, see <https://www.gnu.org/licenses/>.
 */

use std::{
    collections::BTreeMap,
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use log::{debug, info};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{mesh, MeshError, PageRecord, PageSet, Strategy};

/// Size classes with objects this big or bigger are never meshed
pub const MAX_MESHABLE_OBJECT_SIZE: usize = 4096;

/// One span (page) of a mesh dump.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanRecord {
    pub name: String,
    #[serde(rename = "object-size")]
    pub object_size: usize,
    pub length: usize,
    pub bitmap: String,
}

impl SpanRecord {
    /// Parses the bitmap, `index` is only used for error messages
    pub fn to_record(&self, index: usize) -> Result<PageRecord, MeshError> {
        let found = self.bitmap.chars().count();
        if found != self.length {
            return Err(MeshError::LengthMismatch {
                index,
                expected: self.length,
                found,
            });
        }
        PageRecord::parse_indexed(index, &self.bitmap)
    }
}

/// Reads a dump with one JSON object per line and groups the spans by
/// object size. Empty lines are skipped.
pub fn parse_mesh_dump<R: BufRead>(reader: R) -> Result<BTreeMap<usize, Vec<SpanRecord>>, MeshError> {
    let mut size_classes: BTreeMap<usize, Vec<SpanRecord>> = BTreeMap::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let span: SpanRecord = serde_json::from_str(&line)?;
        let found = span.bitmap.chars().count();
        if found != span.length {
            return Err(MeshError::LengthMismatch {
                index,
                expected: span.length,
                found,
            });
        }

        size_classes.entry(span.object_size).or_default().push(span);
    }

    debug!("Read mesh dump with {} size classes", size_classes.len());
    Ok(size_classes)
}

pub fn read_mesh_dump<P: AsRef<Path>>(path: P) -> Result<BTreeMap<usize, Vec<SpanRecord>>, MeshError> {
    let file = File::open(path)?;
    parse_mesh_dump(BufReader::new(file))
}

/// Builds the page set of one size class
pub fn span_set(spans: &[SpanRecord]) -> Result<PageSet, MeshError> {
    let records = spans
        .iter()
        .enumerate()
        .map(|(i, span)| span.to_record(i))
        .collect::<Result<Vec<_>, _>>()?;
    PageSet::from_records(records)
}

/// Meshing outcome of one size class
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SizeClassReport {
    pub object_size: usize,
    pub spans: usize,
    pub meshes: usize,
    pub heap_bytes: usize,
    pub freed_bytes: usize,
}

/// Meshes every size class below [`MAX_MESHABLE_OBJECT_SIZE`] separately.
///
/// Classes are reported from the biggest object size to the smallest.
pub fn analyze_dump<R: Rng + ?Sized>(
    size_classes: &BTreeMap<usize, Vec<SpanRecord>>,
    strategy: &Strategy,
    rng: &mut R,
) -> Result<Vec<SizeClassReport>, MeshError> {
    let mut reports = Vec::new();

    for (&object_size, spans) in size_classes.iter().rev() {
        if object_size >= MAX_MESHABLE_OBJECT_SIZE || spans.is_empty() {
            continue;
        }

        let mut set = span_set(spans)?;
        if matches!(strategy, Strategy::Simple) && set.len() % 2 == 1 {
            // neighbours only, the last span needs a partner that never meshes
            let mut records: Vec<PageRecord> = set.iter().map(|(_, r)| r.clone()).collect();
            let full = vec![true; set.bitmap_len()];
            records.push(PageRecord::from_bits(&full));
            set = PageSet::from_records(records)?;
        }

        let result = mesh(set, strategy, rng)?;
        let length = result.set().bitmap_len();
        let report = SizeClassReport {
            object_size,
            spans: spans.len(),
            meshes: result.meshed_count(),
            heap_bytes: object_size * length * spans.len(),
            freed_bytes: result.freed_bytes(object_size),
        };

        info!(
            "{:>5}: {} spans ({} meshes)",
            report.object_size, report.spans, report.meshes
        );
        reports.push(report);
    }

    Ok(reports)
}
