use std::fmt;

use serde::{Deserialize, Serialize};

/// Position of a parcel in the registry layer it was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParcelId(pub u32);

/// Label of a connected cluster of overlapping parcels, contiguous from 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClusterId(pub u32);

impl ParcelId {
    #[inline] pub fn index(self) -> usize { self.0 as usize }
}

impl ClusterId {
    #[inline] pub fn index(self) -> usize { self.0 as usize }
}

impl From<usize> for ParcelId {
    #[inline] fn from(idx: usize) -> Self { Self(idx as u32) }
}

impl From<usize> for ClusterId {
    #[inline] fn from(idx: usize) -> Self { Self(idx as u32) }
}

impl fmt::Display for ParcelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "parcel {}", self.0) }
}

impl fmt::Display for ClusterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "cluster {}", self.0) }
}
