use anyhow::{Context, Result};
use geo::Relate;
use smallvec::SmallVec;

use crate::{geom::Geometries, graph::Graph, types::ParcelId};

/// DE-9IM pattern for two areal geometries that partially overlap:
/// interiors meet, and each has interior outside the other.
const OVERLAPS: &str = "T*T***T**";

/// DE-9IM pattern for "a is within b" (interior of a meets b, nothing of a lies outside b).
const WITHIN: &str = "T*F**F***";

/// DE-9IM pattern for "a contains b".
const CONTAINS: &str = "T*****FF*";

/// Result of a pairwise spatial scan over a collection.
#[derive(Debug, Clone)]
pub(crate) struct OverlapScan {
    /// Symmetric partial-overlap relation, one node per shape.
    pub(crate) graph: Graph,
    /// Shapes lying entirely inside (or equal to) another shape.
    pub(crate) nested: Vec<ParcelId>,
}

impl Geometries {
    /// Test every pair of shapes with intersecting bounding boxes once, recording
    /// partial overlaps as graph edges and full containment separately.
    /// Containment and equality are not overlaps; boundary touches are neither.
    pub(crate) fn scan_overlaps(&self) -> Result<OverlapScan> {
        let mut adjacencies = vec![SmallVec::<[u32; 4]>::new(); self.len()];
        let mut nested = vec![false; self.len()];

        for i in 0..self.len() {
            for j in self.candidates(i).into_iter().filter(|&j| j > i) {
                let im = self.shapes()[i].relate(&self.shapes()[j]);

                let overlaps = im.matches(OVERLAPS)
                    .with_context(|| format!("[overlap] relate failed for shapes {i} and {j}"))?;
                if overlaps {
                    adjacencies[i].push(j as u32);
                    adjacencies[j].push(i as u32);
                    continue
                }

                if im.matches(WITHIN)? { nested[i] = true }
                if im.matches(CONTAINS)? { nested[j] = true }
            }
        }

        for neighbors in &mut adjacencies { neighbors.sort_unstable() }

        Ok(OverlapScan {
            graph: Graph::new(self.len(), &adjacencies),
            nested: nested.iter().enumerate()
                .filter_map(|(i, &flag)| flag.then_some(ParcelId::from(i)))
                .collect(),
        })
    }

    /// Build the symmetric overlap relation over all shapes.
    pub fn overlap_graph(&self) -> Result<Graph> {
        Ok(self.scan_overlaps()?.graph)
    }
}
