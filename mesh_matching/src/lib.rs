mod cutoff;
mod error;
mod mesh_result;
mod page_record;
mod page_set;
mod splitter;
mod strategy;
mod util;

#[cfg(test)]
mod test;

#[cfg(feature = "experiments")]
pub mod experiments;

pub use crate::cutoff::{compatibility_probability, CutoffConfig, CutoffTable};
pub use crate::error::MeshError;
pub use crate::mesh_result::MeshResult;
pub use crate::page_record::PageRecord;
pub use crate::page_set::{PageSet, RecordId};
pub use crate::splitter::{Splitter, TieBreak};
pub use crate::strategy::{mesh, mesh_buckets, Strategy};
pub use crate::util::bit_array::BitArray;
pub mod modules;
