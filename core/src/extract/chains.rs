//! Chain recovery for edge-only meshes.
//!
//! Builds the vertex adjacency graph from the edge list and walks it into
//! simple chains. Only path-shaped graphs (every vertex of degree 1 or 2)
//! are accepted.

use std::collections::HashSet;

use crate::error::{CarveError, CarveResult};

/// An ordered vertex chain; closed chains do not repeat their first vertex.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexChain {
    pub vertices: Vec<usize>,
    pub closed: bool,
}

/// Walk an edge graph over `vertex_count` vertices into simple chains.
///
/// Open chains are walked first, starting from degree-1 vertices, then the
/// remaining degree-2 vertices yield closed loops. Each chain is produced
/// once.
pub fn trace_chains(vertex_count: usize, edges: &[(usize, usize)]) -> CarveResult<Vec<VertexChain>> {
    let mut neighbors: Vec<Vec<usize>> = vec![Vec::new(); vertex_count];
    let mut seen: HashSet<(usize, usize)> = HashSet::new();

    for &(a, b) in edges {
        if a >= vertex_count || b >= vertex_count {
            return Err(CarveError::NoGeometry(format!(
                "edge ({}, {}) references a missing vertex",
                a, b
            )));
        }
        if a == b || !seen.insert((a.min(b), a.max(b))) {
            continue;
        }
        neighbors[a].push(b);
        neighbors[b].push(a);
    }

    if let Some((vertex, list)) = neighbors
        .iter()
        .enumerate()
        .find(|(_, list)| list.len() != 1 && list.len() != 2)
    {
        return Err(CarveError::NotPathShaped {
            vertex,
            degree: list.len(),
        });
    }

    let mut visited = vec![false; vertex_count];
    let mut chains = Vec::new();

    // Open chains first so no walk starts in the middle of one.
    for degree in [1, 2] {
        for start in 0..vertex_count {
            if visited[start] || neighbors[start].len() != degree {
                continue;
            }
            chains.push(walk_chain(start, &neighbors, &mut visited));
        }
    }

    Ok(chains)
}

fn walk_chain(start: usize, neighbors: &[Vec<usize>], visited: &mut [bool]) -> VertexChain {
    let mut chain = vec![start];
    visited[start] = true;

    let mut prev: Option<usize> = None;
    let mut current = start;
    loop {
        let next = neighbors[current].iter().copied().find(|&n| Some(n) != prev);
        match next {
            Some(n) if n == start => {
                return VertexChain { vertices: chain, closed: true };
            }
            Some(n) if !visited[n] => {
                visited[n] = true;
                chain.push(n);
                prev = Some(current);
                current = n;
            }
            _ => {
                return VertexChain { vertices: chain, closed: false };
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_chain() {
        let chains = trace_chains(4, &[(0, 1), (1, 2), (2, 3)]).unwrap();
        assert_eq!(chains.len(), 1);
        assert_eq!(chains[0].vertices, vec![0, 1, 2, 3]);
        assert!(!chains[0].closed);
    }

    #[test]
    fn test_open_chain_walked_from_its_end() {
        // Vertex 0 sits mid-chain; the walk starts at an end instead.
        let chains = trace_chains(3, &[(0, 1), (2, 0)]).unwrap();
        assert_eq!(chains.len(), 1);
        assert_eq!(chains[0].vertices, vec![1, 0, 2]);
    }

    #[test]
    fn test_closed_loop_and_open_chain() {
        let chains = trace_chains(5, &[(0, 1), (1, 2), (2, 0), (3, 4)]).unwrap();
        assert_eq!(chains.len(), 2);
        let open = chains.iter().find(|c| !c.closed).unwrap();
        let closed = chains.iter().find(|c| c.closed).unwrap();
        assert_eq!(open.vertices, vec![3, 4]);
        assert_eq!(closed.vertices.len(), 3);
    }

    #[test]
    fn test_branching_vertex_is_not_path_shaped() {
        let err = trace_chains(4, &[(0, 1), (0, 2), (0, 3)]).unwrap_err();
        assert_eq!(err, CarveError::NotPathShaped { vertex: 0, degree: 3 });
    }

    #[test]
    fn test_isolated_vertex_is_not_path_shaped() {
        let err = trace_chains(3, &[(0, 1)]).unwrap_err();
        assert_eq!(err, CarveError::NotPathShaped { vertex: 2, degree: 0 });
    }

    #[test]
    fn test_duplicate_edges_are_ignored() {
        let chains = trace_chains(2, &[(0, 1), (1, 0)]).unwrap();
        assert_eq!(chains.len(), 1);
        assert_eq!(chains[0].vertices, vec![0, 1]);
    }
}
