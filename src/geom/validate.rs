use anyhow::{bail, ensure, Context, Result};
use geo::{line_intersection::{line_intersection, LineIntersection}, Area, CoordsIter, Line, MultiPolygon, Polygon, Rect};
use rstar::RTree;

use crate::geom::{BoundingBox, Geometries};

/// A polygon edge, tagged with its ring and its position along the ring.
struct Edge {
    ring: usize,
    pos: usize,
    ring_len: usize,
    line: Line<f64>,
}

impl Edge {
    /// True if the two edges are consecutive along the same ring.
    #[inline]
    fn is_adjacent(&self, other: &Edge) -> bool {
        self.ring == other.ring && {
            let (a, b) = (self.pos.min(other.pos), self.pos.max(other.pos));
            b - a == 1 || (a == 0 && b + 1 == self.ring_len)
        }
    }
}

/// Check that a polygon's rings do not cross or fold back onto themselves.
/// Rings may touch each other at a vertex.
fn check_simple(polygon: &Polygon<f64>) -> Result<()> {
    let edges = std::iter::once(polygon.exterior())
        .chain(polygon.interiors())
        .enumerate()
        .flat_map(|(ring, ls)| {
            let ring_len = ls.lines().count();
            ls.lines()
                .enumerate()
                .filter(|(_, line)| line.start != line.end)
                .map(move |(pos, line)| Edge { ring, pos, ring_len, line })
        })
        .collect::<Vec<_>>();

    let rtree = RTree::bulk_load(
        edges.iter().enumerate()
            .map(|(i, edge)| BoundingBox::new(i, Rect::new(edge.line.start, edge.line.end)))
            .collect()
    );

    for (i, edge) in edges.iter().enumerate() {
        let envelope = BoundingBox::new(i, Rect::new(edge.line.start, edge.line.end)).aabb();
        for j in rtree.locate_in_envelope_intersecting(&envelope).map(BoundingBox::idx) {
            if j <= i { continue }
            let other = &edges[j];

            match line_intersection(edge.line, other.line) {
                Some(LineIntersection::SinglePoint { intersection, is_proper: true }) if !edge.is_adjacent(other) => {
                    bail!("ring {} crosses ring {} at ({:.6}, {:.6})", edge.ring, other.ring, intersection.x, intersection.y)
                }
                Some(LineIntersection::Collinear { intersection }) if intersection.start != intersection.end => {
                    bail!("ring {} overlaps itself or ring {} near ({:.6}, {:.6})",
                        edge.ring, other.ring, intersection.start.x, intersection.start.y)
                }
                _ => {}
            }
        }
    }

    Ok(())
}

/// Check a single shape for emptiness, non-finite coordinates, short rings,
/// zero area and self-intersections.
pub(crate) fn validate_shape(shape: &MultiPolygon<f64>) -> Result<()> {
    ensure!(!shape.0.is_empty(), "geometry is empty");
    ensure!(shape.coords_iter().all(|c| c.x.is_finite() && c.y.is_finite()), "geometry has non-finite coordinates");

    for (p, polygon) in shape.0.iter().enumerate() {
        for (r, ring) in std::iter::once(polygon.exterior()).chain(polygon.interiors()).enumerate() {
            ensure!(ring.0.len() >= 4, "polygon {p} ring {r} has {} coordinates (need at least 4)", ring.0.len());
        }
        check_simple(polygon).with_context(|| format!("polygon {p} is self-intersecting"))?;
    }

    let area = shape.unsigned_area();
    ensure!(area.is_finite() && area > 0.0, "geometry has zero area");

    Ok(())
}

impl Geometries {
    /// Validate every shape, failing on the first malformed one with its index.
    pub fn validate(&self) -> Result<()> {
        for (i, shape) in self.shapes().iter().enumerate() {
            validate_shape(shape)
                .with_context(|| format!("[validate] invalid geometry at index {i}"))?;
        }
        Ok(())
    }
}
