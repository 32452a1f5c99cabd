//! Graph algorithms for task dependency analysis.
//!
//! Nodes are dense `usize` indices assigned by the caller after scoping, and
//! edges live in plain adjacency vectors, so the graph owns no references to
//! the tasks it describes.

use std::collections::VecDeque;

/// Directed dependency graph over dense node indices.
///
/// An edge `from -> to` means `from` must finish before `to` starts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyGraph {
    /// Incoming edges per node
    predecessors: Vec<Vec<usize>>,

    /// Outgoing edges per node
    successors: Vec<Vec<usize>>,
}

/// Result of a topological sort.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopologicalOrder {
    /// Nodes whose predecessors could all be ordered, in visit order
    pub order: Vec<usize>,

    /// Nodes that never reached zero indegree (on or downstream of a cycle),
    /// in index order
    pub excluded: Vec<usize>,
}

impl TopologicalOrder {
    pub fn has_cycle(&self) -> bool {
        !self.excluded.is_empty()
    }
}

/// The heaviest chain found by [`DependencyGraph::longest_path`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LongestPath {
    /// Node indices from chain start to chain end
    pub nodes: Vec<usize>,

    /// Sum of node weights along the chain
    pub length: i64,
}

impl DependencyGraph {
    /// Create a graph with `node_count` nodes and no edges.
    pub fn with_nodes(node_count: usize) -> Self {
        Self {
            predecessors: vec![Vec::new(); node_count],
            successors: vec![Vec::new(); node_count],
        }
    }

    pub fn len(&self) -> usize {
        self.successors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.successors.is_empty()
    }

    /// Add an edge `from -> to`. Repeated edges are kept as parallel edges.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of range.
    pub fn add_edge(&mut self, from: usize, to: usize) {
        self.predecessors[to].push(from);
        self.successors[from].push(to);
    }

    pub fn predecessors(&self, node: usize) -> &[usize] {
        &self.predecessors[node]
    }

    pub fn successors(&self, node: usize) -> &[usize] {
        &self.successors[node]
    }

    /// Topological order by Kahn's algorithm.
    ///
    /// The ready queue is FIFO and seeded in index order, so the result is
    /// deterministic for a given edge insertion order.
    pub fn topological_order(&self) -> TopologicalOrder {
        let mut indegree: Vec<usize> = self.predecessors.iter().map(Vec::len).collect();
        let mut queue: VecDeque<usize> = (0..self.len()).filter(|&n| indegree[n] == 0).collect();
        let mut order = Vec::with_capacity(self.len());

        while let Some(node) = queue.pop_front() {
            order.push(node);
            for &next in &self.successors[node] {
                indegree[next] -= 1;
                if indegree[next] == 0 {
                    queue.push_back(next);
                }
            }
        }

        let excluded = (0..self.len()).filter(|&n| indegree[n] > 0).collect();
        TopologicalOrder { order, excluded }
    }

    /// Heaviest chain where each node contributes `weights[node]`.
    ///
    /// Relaxation runs over `topo.order` only. Nodes left out of the order
    /// still start at their own weight and can be relaxed from an ordered
    /// predecessor, but never propagate further. Among equally heavy chain
    /// ends, the lowest index wins. Returns `None` for an empty graph.
    ///
    /// # Panics
    ///
    /// Panics if `weights` is shorter than the node count.
    pub fn longest_path(&self, topo: &TopologicalOrder, weights: &[i64]) -> Option<LongestPath> {
        let mut dist: Vec<i64> = weights[..self.len()].to_vec();
        let mut parent: Vec<Option<usize>> = vec![None; self.len()];

        for &node in &topo.order {
            for &next in &self.successors[node] {
                let candidate = dist[node] + weights[next];
                if candidate > dist[next] {
                    dist[next] = candidate;
                    parent[next] = Some(node);
                }
            }
        }

        let mut end: Option<usize> = None;
        for node in 0..self.len() {
            if end.is_none_or(|best| dist[node] > dist[best]) {
                end = Some(node);
            }
        }
        let end = end?;

        let mut nodes = Vec::new();
        let mut cursor = Some(end);
        while let Some(node) = cursor {
            nodes.push(node);
            cursor = parent[node];
        }
        nodes.reverse();

        Some(LongestPath {
            nodes,
            length: dist[end],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(len: usize) -> DependencyGraph {
        let mut graph = DependencyGraph::with_nodes(len);
        for i in 1..len {
            graph.add_edge(i - 1, i);
        }
        graph
    }

    #[test]
    fn test_empty_graph() {
        let graph = DependencyGraph::with_nodes(0);
        let topo = graph.topological_order();
        assert!(topo.order.is_empty());
        assert!(!topo.has_cycle());
        assert_eq!(graph.longest_path(&topo, &[]), None);
    }

    #[test]
    fn test_topological_order_chain() {
        let graph = chain(4);
        let topo = graph.topological_order();
        assert_eq!(topo.order, vec![0, 1, 2, 3]);
        assert!(topo.excluded.is_empty());
    }

    #[test]
    fn test_topological_order_is_fifo() {
        // 2 -> 0, 1 and 2 are roots
        let mut graph = DependencyGraph::with_nodes(3);
        graph.add_edge(2, 0);
        let topo = graph.topological_order();
        assert_eq!(topo.order, vec![1, 2, 0]);
    }

    #[test]
    fn test_cycle_excludes_downstream_nodes() {
        // 0 -> 1 -> 2 -> 1, 2 -> 3
        let mut graph = DependencyGraph::with_nodes(4);
        graph.add_edge(0, 1);
        graph.add_edge(1, 2);
        graph.add_edge(2, 1);
        graph.add_edge(2, 3);
        let topo = graph.topological_order();
        assert_eq!(topo.order, vec![0]);
        assert_eq!(topo.excluded, vec![1, 2, 3]);
        assert!(topo.has_cycle());
    }

    #[test]
    fn test_parallel_edges_keep_indegree_consistent() {
        let mut graph = DependencyGraph::with_nodes(2);
        graph.add_edge(0, 1);
        graph.add_edge(0, 1);
        let topo = graph.topological_order();
        assert_eq!(topo.order, vec![0, 1]);
        assert_eq!(graph.predecessors(1), &[0, 0]);
    }

    #[test]
    fn test_longest_path_chain() {
        let graph = chain(3);
        let topo = graph.topological_order();
        let path = graph.longest_path(&topo, &[2, 3, 4]).unwrap();
        assert_eq!(path.nodes, vec![0, 1, 2]);
        assert_eq!(path.length, 9);
    }

    #[test]
    fn test_longest_path_prefers_weight_over_count() {
        // 0 -> 1 -> 2 (1+1+1) vs 3 -> 4 (5+5)
        let mut graph = DependencyGraph::with_nodes(5);
        graph.add_edge(0, 1);
        graph.add_edge(1, 2);
        graph.add_edge(3, 4);
        let topo = graph.topological_order();
        let path = graph.longest_path(&topo, &[1, 1, 1, 5, 5]).unwrap();
        assert_eq!(path.nodes, vec![3, 4]);
        assert_eq!(path.length, 10);
    }

    #[test]
    fn test_longest_path_diamond_takes_heavier_branch() {
        // 0 -> {1, 2} -> 3
        let mut graph = DependencyGraph::with_nodes(4);
        graph.add_edge(0, 1);
        graph.add_edge(0, 2);
        graph.add_edge(1, 3);
        graph.add_edge(2, 3);
        let topo = graph.topological_order();
        let path = graph.longest_path(&topo, &[1, 2, 6, 1]).unwrap();
        assert_eq!(path.nodes, vec![0, 2, 3]);
        assert_eq!(path.length, 8);
    }

    #[test]
    fn test_longest_path_tie_takes_lowest_index() {
        let graph = DependencyGraph::with_nodes(3);
        let topo = graph.topological_order();
        let path = graph.longest_path(&topo, &[4, 4, 2]).unwrap();
        assert_eq!(path.nodes, vec![0]);
    }
}
