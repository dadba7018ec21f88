use super::*;
use crate::geometry::utils_2d::{polygon_signed_area, ring_is_simple};

fn square(x0: f64, y0: f64, size: f64) -> StencilPolygon {
    StencilPolygon::new(vec![
        [x0, y0],
        [x0 + size, y0],
        [x0 + size, y0 + size],
        [x0, y0 + size],
    ])
}

fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> StencilPolygon {
    StencilPolygon::new(vec![[x0, y0], [x1, y0], [x1, y1], [x0, y1]])
}

#[test]
fn test_node_segments_splits_crossing() {
    let graph = node_segments(
        &[([0.0, 0.0], [2.0, 2.0]), ([0.0, 2.0], [2.0, 0.0])],
        1e-9,
    );
    assert_eq!(graph.vertices.len(), 5);
    assert_eq!(graph.edges.len(), 4);
}

#[test]
fn test_node_segments_collinear_overlap() {
    let graph = node_segments(
        &[([0.0, 0.0], [10.0, 0.0]), ([5.0, 0.0], [15.0, 0.0])],
        1e-9,
    );
    assert_eq!(graph.vertices.len(), 4);
    assert_eq!(graph.edges.len(), 3);
}

#[test]
fn test_polygonize_figure_eight_gives_two_lobes() {
    let pts = [[0.0, 0.0], [2.0, 2.0], [2.0, 0.0], [0.0, 2.0]];
    let segments: Vec<_> = (0..4).map(|i| (pts[i], pts[(i + 1) % 4])).collect();
    let rings = polygonize(&node_segments(&segments, 1e-9), 1e-9);

    assert_eq!(rings.len(), 2);
    for ring in &rings {
        assert!((polygon_signed_area(ring) - 1.0).abs() < 1e-9);
    }
}

#[test]
fn test_polygonize_prunes_filaments() {
    // Closed square with a dangling tail
    let segments = vec![
        ([0.0, 0.0], [1.0, 0.0]),
        ([1.0, 0.0], [1.0, 1.0]),
        ([1.0, 1.0], [0.0, 1.0]),
        ([0.0, 1.0], [0.0, 0.0]),
        ([1.0, 1.0], [3.0, 2.0]),
    ];
    let rings = polygonize(&node_segments(&segments, 1e-9), 1e-9);
    assert_eq!(rings.len(), 1);
    assert!((polygon_signed_area(&rings[0]) - 1.0).abs() < 1e-9);
}

#[test]
fn test_polygonize_open_polyline_encloses_nothing() {
    let segments = vec![([0.0, 0.0], [1.0, 0.0]), ([1.0, 0.0], [1.0, 1.0])];
    assert!(polygonize(&node_segments(&segments, 1e-9), 1e-9).is_empty());
}

#[test]
fn test_union_of_overlapping_squares() {
    let shape = union_polygons(&[square(0.0, 0.0, 2.0), square(1.0, 1.0, 2.0)], 1e-9).unwrap();
    assert_eq!(shape.polygons.len(), 1);
    assert!((shape.area() - 7.0).abs() < 1e-9);

    let poly = &shape.polygons[0];
    assert!(poly.holes.is_empty());
    assert_eq!(poly.exterior.len(), 8);
    assert!(polygon_signed_area(&poly.exterior) > 0.0);
}

#[test]
fn test_union_keeps_disjoint_polygons() {
    let shape = union_polygons(&[square(0.0, 0.0, 1.0), square(5.0, 0.0, 1.0)], 1e-9).unwrap();
    assert_eq!(shape.polygons.len(), 2);
    assert!((shape.area() - 2.0).abs() < 1e-9);
}

#[test]
fn test_union_preserves_input_hole() {
    let input = StencilPolygon::with_holes(
        vec![[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0]],
        vec![vec![[3.0, 4.0], [3.0, 7.0], [6.0, 7.0], [6.0, 4.0]]],
    );
    let shape = union_polygons(&[input], 1e-9).unwrap();
    assert_eq!(shape.polygons.len(), 1);
    assert_eq!(shape.polygons[0].holes.len(), 1);
    assert!(polygon_signed_area(&shape.polygons[0].holes[0]) < 0.0);
    assert!((shape.area() - 91.0).abs() < 1e-9);
}

#[test]
fn test_union_of_frame_creates_hole() {
    let shape = union_polygons(
        &[
            rect(0.0, 0.0, 3.0, 1.0),
            rect(0.0, 2.0, 3.0, 3.0),
            rect(0.0, 0.0, 1.0, 3.0),
            rect(2.0, 0.0, 3.0, 3.0),
        ],
        1e-9,
    )
    .unwrap();
    assert_eq!(shape.polygons.len(), 1);
    assert_eq!(shape.polygons[0].holes.len(), 1);
    assert!((shape.area() - 8.0).abs() < 1e-9);
}

#[test]
fn test_union_island_inside_hole_is_separate_polygon() {
    let frame = StencilPolygon::with_holes(
        vec![[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0]],
        vec![vec![[2.0, 2.0], [2.0, 8.0], [8.0, 8.0], [8.0, 2.0]]],
    );
    let shape = union_polygons(&[frame, square(4.0, 4.0, 2.0)], 1e-9).unwrap();
    assert_eq!(shape.polygons.len(), 2);
    let with_hole = shape.polygons.iter().filter(|p| p.holes.len() == 1).count();
    assert_eq!(with_hole, 1);
    assert!((shape.area() - 68.0).abs() < 1e-9);
}

#[test]
fn test_union_splits_pinched_squares() {
    let shape = union_polygons(&[square(0.0, 0.0, 1.0), square(1.0, 1.0, 1.0)], 1e-9).unwrap();
    assert_eq!(shape.polygons.len(), 2);
    for poly in &shape.polygons {
        assert!(ring_is_simple(&poly.exterior, 1e-9));
    }
}

#[test]
fn test_union_of_self_intersecting_ring_uses_winding() {
    // Bowtie: both lobes are filled under the winding rule.
    let bowtie = StencilPolygon::new(vec![[0.0, 0.0], [2.0, 2.0], [2.0, 0.0], [0.0, 2.0]]);
    let shape = union_polygons(&[bowtie], 1e-9).unwrap();
    assert_eq!(shape.polygons.len(), 2);
    assert!((shape.area() - 2.0).abs() < 1e-9);
}
