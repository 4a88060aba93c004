use geo::{BooleanOps, BoundingRect, Coord, MultiPolygon, Rect};
use rstar::{RTree, AABB};

use crate::geom::{BoundingBox, Crs};

/// An ordered collection of MultiPolygons sharing one CRS, indexed by an R-tree.
/// Shapes are identified by their position in the collection.
#[derive(Debug, Clone)]
pub struct Geometries {
    shapes: Vec<MultiPolygon<f64>>,
    rtree: RTree<BoundingBox>,
    crs: Crs,
}

impl Geometries {
    /// Construct a Geometries object from a vector of MultiPolygons.
    /// Empty shapes are kept in `shapes` but have no entry in the R-tree.
    pub fn new(shapes: Vec<MultiPolygon<f64>>, crs: Crs) -> Self {
        Self {
            rtree: RTree::bulk_load(
                shapes.iter().enumerate()
                    .filter_map(|(i, shape)| shape.bounding_rect().map(|rect| BoundingBox::new(i, rect)))
                    .collect()
            ),
            shapes,
            crs,
        }
    }

    /// Get the number of MultiPolygons.
    #[inline] pub fn len(&self) -> usize { self.shapes.len() }

    /// Check if there are no MultiPolygons.
    #[inline] pub fn is_empty(&self) -> bool { self.shapes.is_empty() }

    /// Get a reference to the list of MultiPolygons.
    #[inline] pub fn shapes(&self) -> &[MultiPolygon<f64>] { &self.shapes }

    /// Get the CRS shared by all shapes.
    #[inline] pub fn crs(&self) -> Crs { self.crs }


    /// Query the R-tree for bounding boxes intersecting the given envelope.
    #[inline]
    pub(crate) fn query(&self, envelope: &AABB<[f64; 2]>) -> impl Iterator<Item = &BoundingBox> {
        self.rtree.locate_in_envelope_intersecting(envelope)
    }

    /// Indices of shapes whose bounding boxes intersect the bounding box of shape `i`, excluding `i`.
    pub(crate) fn candidates(&self, i: usize) -> Vec<usize> {
        let Some(rect) = self.shapes[i].bounding_rect() else { return Vec::new() };
        let envelope = AABB::from_corners(rect.min().into(), rect.max().into());

        let mut found = self.query(&envelope)
            .map(BoundingBox::idx)
            .filter(|&j| j != i)
            .collect::<Vec<_>>();
        found.sort_unstable();
        found
    }

    /// Compute the bounding rectangle of all MultiPolygons.
    pub fn bounds(&self) -> Option<Rect<f64>> {
        self.shapes.iter()
            .filter_map(|shape| shape.bounding_rect())
            .reduce(|a, b| Rect::new(
                Coord {
                    x: a.min().x.min(b.min().x),
                    y: a.min().y.min(b.min().y),
                },
                Coord {
                    x: a.max().x.max(b.max().x),
                    y: a.max().y.max(b.max().y),
                }
            ))
    }

    /// Compute the union of all MultiPolygons into a single MultiPolygon.
    /// This method may be slow for large numbers of complex polygons.
    pub fn union(&self) -> MultiPolygon<f64> {
        self.shapes.iter().cloned()
            .reduce(|a, b| a.union(&b))
            .unwrap_or_else(|| MultiPolygon(vec![]))
    }
}
