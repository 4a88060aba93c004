use std::collections::VecDeque;

use crate::{graph::Graph, types::{ClusterId, ParcelId}};

/// Connected components of an overlap graph.
/// `assignments[i]` is the cluster of parcel `i`; members of each cluster are
/// stored contiguously (CSR) in ascending parcel order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Clusters {
    assignments: Vec<ClusterId>,
    offsets: Vec<u32>,
    members: Vec<ParcelId>,
}

impl Clusters {
    /// Build clusters from a per-node labelling with contiguous labels `0..count`.
    fn from_assignments(assignments: Vec<ClusterId>, count: usize) -> Self {
        let mut sizes = vec![0u32; count];
        for &c in &assignments { sizes[c.index()] += 1 }

        let offsets = std::iter::once(0u32)
            .chain(sizes.iter().scan(0u32, |acc, &len| { *acc += len; Some(*acc) }))
            .collect::<Vec<_>>();

        let mut cursor = offsets[..count].to_vec();
        let mut members = vec![ParcelId(0); assignments.len()];
        for (i, &c) in assignments.iter().enumerate() {
            members[cursor[c.index()] as usize] = ParcelId::from(i);
            cursor[c.index()] += 1;
        }

        Self { assignments, offsets, members }
    }

    /// Number of distinct clusters.
    #[inline] pub fn len(&self) -> usize { self.offsets.len().saturating_sub(1) }

    /// True when there are no clusters (no parcels).
    #[inline] pub fn is_empty(&self) -> bool { self.len() == 0 }

    /// Number of labelled parcels.
    #[inline] pub fn parcel_count(&self) -> usize { self.assignments.len() }

    /// Cluster label for every parcel, indexed by parcel position.
    #[inline] pub fn assignments(&self) -> &[ClusterId] { &self.assignments }

    /// Cluster containing the given parcel.
    #[inline] pub fn cluster_of(&self, parcel: ParcelId) -> ClusterId { self.assignments[parcel.index()] }

    /// Parcels belonging to the given cluster, in ascending order.
    #[inline]
    pub fn members(&self, cluster: ClusterId) -> &[ParcelId] {
        let c = cluster.index();
        &self.members[self.offsets[c] as usize .. self.offsets[c + 1] as usize]
    }

    /// Iterate over `(cluster, members)` in label order.
    pub fn iter(&self) -> impl Iterator<Item = (ClusterId, &[ParcelId])> + '_ {
        (0..self.len()).map(move |c| (ClusterId::from(c), self.members(ClusterId::from(c))))
    }

    /// Number of clusters with more than one member.
    pub fn merged_count(&self) -> usize {
        self.iter().filter(|(_, members)| members.len() > 1).count()
    }
}

impl Graph {
    /// Label the connected components of the graph by breadth-first search.
    /// Labels are assigned in order of each component's lowest node.
    pub fn components(&self) -> Clusters {
        const UNSET: u32 = u32::MAX;

        let mut labels = vec![UNSET; self.node_count()];
        let mut count = 0u32;

        for u in 0..self.node_count() {
            if labels[u] != UNSET { continue }

            labels[u] = count;
            let mut queue = VecDeque::from([u]);
            while let Some(v) = queue.pop_front() {
                for w in self.edges(v) {
                    if labels[w] == UNSET {
                        labels[w] = count;
                        queue.push_back(w);
                    }
                }
            }
            count += 1;
        }

        Clusters::from_assignments(labels.into_iter().map(ClusterId).collect(), count as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(xs: &[u32]) -> Vec<ParcelId> { xs.iter().copied().map(ParcelId).collect() }

    #[test]
    fn chain_forms_a_single_cluster() {
        // 0 - 1 - 2, with 0 and 2 not adjacent
        let graph = Graph::new(3, &[vec![1], vec![0, 2], vec![1]]);
        let clusters = graph.components();

        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters.members(ClusterId(0)), ids(&[0, 1, 2]).as_slice());
        assert_eq!(clusters.merged_count(), 1);
    }

    #[test]
    fn isolated_nodes_are_singletons() {
        let graph = Graph::new(2, &[vec![], vec![]]);
        let clusters = graph.components();

        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters.cluster_of(ParcelId(0)), ClusterId(0));
        assert_eq!(clusters.cluster_of(ParcelId(1)), ClusterId(1));
        assert_eq!(clusters.merged_count(), 0);
    }

    #[test]
    fn empty_graph_has_no_clusters() {
        let clusters = Graph::new::<Vec<u32>>(0, &[]).components();

        assert!(clusters.is_empty());
        assert_eq!(clusters.parcel_count(), 0);
        assert_eq!(clusters.iter().count(), 0);
    }

    #[test]
    fn labels_are_contiguous_and_ordered_by_lowest_member() {
        // components: {0, 3}, {1}, {2, 4, 5}
        let graph = Graph::new(6, &[
            vec![3],
            vec![],
            vec![4],
            vec![0],
            vec![2, 5],
            vec![4],
        ]);
        let clusters = graph.components();

        assert_eq!(clusters.len(), 3);
        assert_eq!(
            clusters.assignments(),
            &[ClusterId(0), ClusterId(1), ClusterId(2), ClusterId(0), ClusterId(2), ClusterId(2)],
        );
        assert_eq!(clusters.members(ClusterId(0)), ids(&[0, 3]).as_slice());
        assert_eq!(clusters.members(ClusterId(1)), ids(&[1]).as_slice());
        assert_eq!(clusters.members(ClusterId(2)), ids(&[2, 4, 5]).as_slice());
    }

    #[test]
    fn labels_match_reachability() {
        let graph = Graph::new(7, &[
            vec![1],
            vec![0, 2],
            vec![1],
            vec![4],
            vec![3],
            vec![],
            vec![],
        ]);
        let clusters = graph.components();

        // Reachability by repeated relaxation over the edge list.
        let n = graph.node_count();
        let mut reach = vec![vec![false; n]; n];
        for i in 0..n { reach[i][i] = true }
        for _ in 0..n {
            for (i, j) in graph.pairs() {
                for k in 0..n {
                    if reach[k][i] || reach[k][j] { reach[k][i] = true; reach[k][j] = true }
                }
            }
        }

        for i in 0..n {
            for j in 0..n {
                let same = clusters.cluster_of(ParcelId::from(i)) == clusters.cluster_of(ParcelId::from(j));
                assert_eq!(same, reach[i][j], "nodes {i} and {j}");
            }
        }
    }
}
