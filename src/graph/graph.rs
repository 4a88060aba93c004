/// An unweighted, undirected graph in compressed sparse row format.
/// Every undirected edge is stored once in each endpoint's neighbor list.
#[derive(Debug, Default, Clone)]
pub struct Graph {
    size: usize,
    offsets: Vec<u32>,
    edges: Vec<u32>,
}

impl Graph {
    /// Construct a graph from per-node adjacency lists.
    pub(crate) fn new<S: AsRef<[u32]>>(num_nodes: usize, edges: &[S]) -> Self {
        assert!(edges.len() == num_nodes, "edges.len() must equal num_nodes");
        edges.iter().enumerate().for_each(|(i, neighbors)| {
            assert!(neighbors.as_ref().iter().all(|&j| (j as usize) < num_nodes),
                "edges[{i}] references a node out of range");
            assert!(neighbors.as_ref().iter().all(|&j| j as usize != i),
                "edges[{i}] contains a self edge");
        });

        Self {
            size: num_nodes,
            offsets: std::iter::once(0u32).chain(
                edges.iter()
                    .map(|v| v.as_ref().len() as u32)
                    .scan(0u32, |acc, len| {*acc += len; Some(*acc)})
            ).collect::<Vec<u32>>(),
            edges: edges.iter().flat_map(|v| v.as_ref().iter().copied()).collect(),
        }
    }

    /// Get the number of nodes in the graph.
    #[inline] pub fn node_count(&self) -> usize { self.size }

    /// Get the number of directed edge entries (twice the number of undirected edges).
    #[inline] pub fn edge_count(&self) -> usize { self.edges.len() }

    /// Get the range of edges for a given node.
    #[inline]
    fn range(&self, node: usize) -> std::ops::Range<usize> {
        self.offsets[node] as usize .. self.offsets[node + 1] as usize
    }

    /// Get the degree (number of neighbors) of a given node.
    #[inline] pub fn degree(&self, node: usize) -> usize { self.range(node).len() }

    /// Get an iterator over the neighbors of a given node.
    #[inline]
    pub fn edges(&self, node: usize) -> impl Iterator<Item = usize> + '_ {
        self.range(node).map(move |v| self.edges[v] as usize)
    }

    /// Check whether `a` and `b` are adjacent.
    #[inline]
    pub fn has_edge(&self, a: usize, b: usize) -> bool {
        self.edges(a).any(|v| v == b)
    }

    /// Iterate over each undirected edge once, as `(i, j)` with `i < j`.
    pub fn pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..self.size).flat_map(move |i| self.edges(i).filter(move |&j| j > i).map(move |j| (i, j)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_test_graph() -> Graph {
        Graph::new(4, &[
            vec![1, 2],       // 0
            vec![0, 2],       // 1
            vec![0, 1, 3],    // 2
            vec![2],          // 3
        ])
    }

    #[test]
    fn csr_graph_construction() {
        let graph = make_test_graph();

        assert_eq!(graph.node_count(), 4);
        assert_eq!(graph.edge_count(), 8);

        // Offsets are cumulative neighbor counts, len = nodes + 1
        assert_eq!(graph.offsets, vec![0, 2, 4, 7, 8]);
        assert_eq!(graph.edges, vec![1, 2, 0, 2, 0, 1, 3, 2]);

        for window in graph.offsets.windows(2) { assert!(window[0] <= window[1]) }
    }

    #[test]
    fn degree_and_neighbors() {
        let graph = make_test_graph();

        assert_eq!(graph.degree(0), 2);
        assert_eq!(graph.degree(2), 3);
        assert_eq!(graph.degree(3), 1);
        assert_eq!(graph.edges(2).collect::<Vec<_>>(), vec![0, 1, 3]);
        assert!(graph.has_edge(2, 3));
        assert!(!graph.has_edge(0, 3));
    }

    #[test]
    fn pairs_lists_each_undirected_edge_once() {
        let graph = make_test_graph();
        assert_eq!(graph.pairs().collect::<Vec<_>>(), vec![(0, 1), (0, 2), (1, 2), (2, 3)]);
    }

    #[test]
    fn empty_graph_is_valid() {
        let graph = Graph::new::<Vec<u32>>(0, &[]);

        assert_eq!(graph.node_count(), 0);
        assert_eq!(graph.edge_count(), 0);
        assert_eq!(graph.offsets, vec![0]);
        assert_eq!(graph.pairs().count(), 0);
    }

    #[test]
    fn isolated_nodes_have_zero_degree() {
        let graph = Graph::new(3, &[vec![], vec![], vec![]]);

        assert_eq!(graph.offsets, vec![0, 0, 0, 0]);
        for n in 0..3 {
            assert_eq!(graph.degree(n), 0);
            assert!(graph.edges(n).next().is_none());
        }
    }

    #[test]
    #[should_panic(expected = "edges.len() must equal num_nodes")]
    fn new_panics_when_edges_len_mismatch() {
        Graph::new(0, &[vec![]]);
    }

    #[test]
    #[should_panic(expected = "edges[0] contains a self edge")]
    fn new_panics_on_self_edge() {
        Graph::new(1, &[vec![0]]);
    }

    #[test]
    #[should_panic]
    fn degree_panics_for_out_of_bounds_node() {
        let graph = make_test_graph();
        graph.degree(graph.node_count());
    }
}
