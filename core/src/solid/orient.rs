//! Normal-consistency pass for closed face sets.
//!
//! Flood-fills face adjacency so neighbouring faces traverse their shared
//! edge in opposite directions, then flips any component whose signed
//! volume is negative. Vertex positions are never touched.

use std::collections::{HashMap, VecDeque};

use crate::geometry::Point3;

/// Directed edges of a face loop, closing edge included.
pub(crate) fn face_edges(face: &[usize]) -> impl Iterator<Item = (usize, usize)> + '_ {
    let n = face.len();
    (0..n).map(move |i| (face[i], face[(i + 1) % n]))
}

/// Six times the signed volume enclosed by `faces`, fan-triangulated.
fn signed_volume6(vertices: &[Point3], faces: &[&Vec<usize>]) -> f64 {
    let mut volume = 0.0;
    for face in faces {
        if face.len() < 3 {
            continue;
        }
        let p0 = vertices[face[0]].coords;
        for i in 1..face.len() - 1 {
            let p1 = vertices[face[i]].coords;
            let p2 = vertices[face[i + 1]].coords;
            volume += p0.dot(&p1.cross(&p2));
        }
    }
    volume
}

/// Signed volume of a closed face set; positive when normals point outward.
pub fn signed_volume(vertices: &[Point3], faces: &[Vec<usize>]) -> f64 {
    let refs: Vec<&Vec<usize>> = faces.iter().collect();
    signed_volume6(vertices, &refs) / 6.0
}

/// Make face winding consistent and outward-facing. Returns the number of
/// faces that were reversed.
pub fn make_normals_consistent(vertices: &[Point3], faces: &mut [Vec<usize>]) -> usize {
    let mut edge_faces: HashMap<(usize, usize), Vec<usize>> = HashMap::new();
    for (f, face) in faces.iter().enumerate() {
        for (a, b) in face_edges(face) {
            edge_faces.entry((a.min(b), a.max(b))).or_default().push(f);
        }
    }

    let mut flipped = vec![false; faces.len()];
    let mut component = vec![usize::MAX; faces.len()];
    let mut components: Vec<Vec<usize>> = Vec::new();

    for seed in 0..faces.len() {
        if component[seed] != usize::MAX {
            continue;
        }
        let id = components.len();
        let mut members = vec![seed];
        component[seed] = id;

        let mut queue = VecDeque::from([seed]);
        while let Some(f) = queue.pop_front() {
            let edges: Vec<(usize, usize)> = face_edges(&faces[f]).collect();
            for (a, b) in edges {
                let Some(neighbors) = edge_faces.get(&(a.min(b), a.max(b))) else {
                    continue;
                };
                for &g in neighbors {
                    if component[g] != usize::MAX {
                        continue;
                    }
                    // A consistent neighbour walks the shared edge as b -> a.
                    if face_edges(&faces[g]).any(|e| e == (a, b)) {
                        faces[g].reverse();
                        flipped[g] = !flipped[g];
                    }
                    component[g] = id;
                    members.push(g);
                    queue.push_back(g);
                }
            }
        }
        components.push(members);
    }

    for members in &components {
        let refs: Vec<&Vec<usize>> = members.iter().map(|&f| &faces[f]).collect();
        if signed_volume6(vertices, &refs) < 0.0 {
            for &f in members {
                faces[f].reverse();
                flipped[f] = !flipped[f];
            }
        }
    }

    flipped.iter().filter(|&&f| f).count()
}
