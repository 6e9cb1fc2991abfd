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

use log::trace;

use crate::{MeshError, PageRecord};

/// Index of a record inside its [`PageSet`].
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct RecordId(usize);

impl RecordId {
    #[inline]
    pub fn index(&self) -> usize {
        self.0
    }
}

/// All pages of one matching run.
///
/// The set owns its records; buckets and strategies only hold [`RecordId`]s.
/// The matched state lives next to the records, so a record's bucket
/// membership can never diverge from whether it was already meshed.
#[derive(Clone, Debug)]
pub struct PageSet {
    records: Vec<PageRecord>,
    matched: Vec<bool>,
    bitmap_len: usize,
}

impl PageSet {
    /// Parses a batch of textual bitmaps.
    ///
    /// Fails if any bitmap has a different length than the first one.
    pub fn from_bitmaps<I, S>(bitmaps: I) -> Result<Self, MeshError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let records = bitmaps
            .into_iter()
            .enumerate()
            .map(|(i, s)| PageRecord::parse_indexed(i, s.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;

        Self::from_records(records)
    }

    pub fn from_records(records: Vec<PageRecord>) -> Result<Self, MeshError> {
        let bitmap_len = records.first().map(|r| r.len()).unwrap_or(0);

        if !records.is_empty() && bitmap_len == 0 {
            return Err(MeshError::EmptyBitmap);
        }

        if let Some((index, record)) = records
            .iter()
            .enumerate()
            .find(|(_, r)| r.len() != bitmap_len)
        {
            return Err(MeshError::LengthMismatch {
                index,
                expected: bitmap_len,
                found: record.len(),
            });
        }

        trace!(
            "Created page set with {} records of length {}",
            records.len(),
            bitmap_len
        );

        Ok(PageSet {
            matched: vec![false; records.len()],
            records,
            bitmap_len,
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Length of every bitmap in this set (`0` for an empty set)
    #[inline]
    pub fn bitmap_len(&self) -> usize {
        self.bitmap_len
    }

    #[inline]
    pub fn get(&self, id: RecordId) -> &PageRecord {
        &self.records[id.0]
    }

    #[inline]
    pub fn occupancy(&self, id: RecordId) -> usize {
        self.records[id.0].occupancy()
    }

    #[inline]
    pub fn is_matched(&self, id: RecordId) -> bool {
        self.matched[id.0]
    }

    #[inline]
    pub fn is_compatible(&self, a: RecordId, b: RecordId) -> bool {
        self.records[a.0].is_compatible(&self.records[b.0])
    }

    pub fn ids(&self) -> impl Iterator<Item = RecordId> {
        (0..self.records.len()).map(RecordId)
    }

    pub fn unmatched_ids(&self) -> Vec<RecordId> {
        self.ids().filter(|id| !self.is_matched(*id)).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (RecordId, &PageRecord)> {
        self.records.iter().enumerate().map(|(i, r)| (RecordId(i), r))
    }

    /// Marks both records as meshed with each other.
    ///
    /// Callers must only pass compatible, unmatched records.
    #[inline]
    pub(crate) fn mark_matched(&mut self, a: RecordId, b: RecordId) {
        debug_assert!(a != b, "record {} meshed with itself", a.0);
        debug_assert!(!self.matched[a.0] && !self.matched[b.0], "record already matched");
        debug_assert!(self.is_compatible(a, b), "incompatible records meshed");

        self.matched[a.0] = true;
        self.matched[b.0] = true;
    }

    /// Stable ascending sort of `ids` by occupancy
    pub(crate) fn sort_by_occupancy(&self, ids: &mut [RecordId]) {
        ids.sort_by_key(|id| self.records[id.0].occupancy());
    }

    /// Removes all matched records from `ids`, keeping the order
    pub(crate) fn retain_unmatched(&self, ids: &mut Vec<RecordId>) {
        ids.retain(|id| !self.matched[id.0]);
    }
}
