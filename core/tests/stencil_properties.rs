use carve_core::camera::{project_point, unproject_point};
use carve_core::combine::combine_shapes;
use carve_core::geometry::utils_2d::polygon_area;
use carve_core::geometry::{ApproxEq, Matrix4, Point3, Vector3};
use carve_core::solid::is_closed_surface;
use carve_core::{
    build_stencils, extrude_shape, triangulate_shape, CameraFrame, CarveConfig, CarveFlags, Carver, FacetedMesh, Path,
    ProjectionMode, SourceCarver, StencilPolygon, StencilShape,
};

fn quad(min: [f64; 2], max: [f64; 2], z: f64) -> Vec<Point3> {
    vec![
        Point3::new(min[0], min[1], z),
        Point3::new(max[0], min[1], z),
        Point3::new(max[0], max[1], z),
        Point3::new(min[0], max[1], z),
    ]
}

fn triangulated_area(shape: &StencilShape) -> f64 {
    let t = triangulate_shape(shape, 1e-9).unwrap();
    t.triangles
        .iter()
        .map(|tri| polygon_area(&tri.map(|i| t.vertices[i])))
        .sum()
}

#[test]
fn test_union_of_overlapping_carvers_has_union_area() {
    let camera = CameraFrame::orthographic(10.0).unwrap();
    let config = CarveConfig::default();
    let a = SourceCarver::new(Carver::PathSet(vec![Path::closed(quad([0.0, 0.0], [2.0, 2.0], -1.0))]));
    let b = SourceCarver::new(Carver::PathSet(vec![Path::closed(quad([1.0, 1.0], [3.0, 3.0], -1.0))]));

    let shapes = vec![a.extract(&camera, &config).unwrap(), b.extract(&camera, &config).unwrap()];
    let combined = combine_shapes(shapes, true, config.merge_tolerance).unwrap();
    assert_eq!(combined.len(), 1);
    assert!((combined[0].area() - 7.0).abs() < 1e-9);
    assert!((triangulated_area(&combined[0]) - 7.0).abs() < 1e-9);
}

#[test]
fn test_silhouette_edges_match_ring_points() {
    let shape = StencilShape::new(vec![
        StencilPolygon::with_holes(
            vec![[0.0, 0.0], [6.0, 0.0], [6.0, 6.0], [0.0, 6.0]],
            vec![
                vec![[1.0, 1.0], [1.0, 2.0], [2.0, 2.0], [2.0, 1.0]],
                vec![[3.0, 3.0], [3.0, 5.0], [5.0, 5.0], [5.0, 3.0]],
            ],
        ),
        StencilPolygon::new(vec![[10.0, 0.0], [12.0, 0.0], [11.0, 2.0]]),
    ]);
    let t = triangulate_shape(&shape, 1e-9).unwrap();
    assert_eq!(t.boundary_edges().len(), shape.point_count());
    assert!((triangulated_area(&shape) - (36.0 - 1.0 - 4.0 + 2.0)).abs() < 1e-9);
}

#[test]
fn test_orthographic_lift_projects_back() {
    let view = Matrix4::new_rotation(Vector3::new(0.3, -0.2, 0.1)) * Matrix4::new_translation(&Vector3::new(0.0, 0.0, -4.0));
    let camera = CameraFrame::new(view, ProjectionMode::Orthographic, 8.0).unwrap();
    let from_cam = camera.inverse_view().unwrap();

    for p in [[0.0, 0.0], [1.5, -2.0], [-3.25, 0.75]] {
        for near in [true, false] {
            let world = unproject_point(&from_cam, camera.mode, camera.far_dist, p, near);
            let back = project_point(&camera.view_matrix, camera.mode, &world, 0.0).unwrap();
            assert!(back.approx_eq(&p));
        }
    }
}

#[test]
fn test_every_stencil_is_closed() {
    let config = CarveConfig::default();
    let cube = FacetedMesh {
        vertices: vec![
            Point3::new(-1.0, -1.0, -6.0),
            Point3::new(1.0, -1.0, -6.0),
            Point3::new(1.0, 1.0, -6.0),
            Point3::new(-1.0, 1.0, -6.0),
            Point3::new(-1.0, -1.0, -4.0),
            Point3::new(1.0, -1.0, -4.0),
            Point3::new(1.0, 1.0, -4.0),
            Point3::new(-1.0, 1.0, -4.0),
        ],
        faces: vec![
            vec![0, 3, 2, 1],
            vec![4, 5, 6, 7],
            vec![0, 1, 5, 4],
            vec![1, 2, 6, 5],
            vec![2, 3, 7, 6],
            vec![3, 0, 4, 7],
        ],
        edges: Vec::new(),
    };
    let ring = SourceCarver::new(Carver::PathSet(vec![
        Path::closed(quad([-3.0, -3.0], [3.0, 3.0], -5.0)),
        Path::closed(quad([-1.0, -1.0], [1.0, 1.0], -5.0)),
    ]));
    let carvers = vec![SourceCarver::new(Carver::FacetedMesh(cube)), ring];

    for camera in [CameraFrame::orthographic(20.0).unwrap(), CameraFrame::perspective(20.0).unwrap()] {
        let meshes = build_stencils(&carvers, &camera, CarveFlags::default(), &config).unwrap();
        assert_eq!(meshes.len(), 2);
        for mesh in &meshes {
            assert!(is_closed_surface(&mesh.faces));
        }
    }
}

fn both_cameras() -> [CameraFrame; 2] {
    [CameraFrame::orthographic(10.0).unwrap(), CameraFrame::perspective(10.0).unwrap()]
}

fn assert_watertight(carvers: &[SourceCarver], flags: CarveFlags) {
    for camera in both_cameras() {
        let meshes = build_stencils(carvers, &camera, flags, &CarveConfig::default()).unwrap();
        assert_eq!(meshes.len(), 1, "{:?}", camera.mode);
        let counts = carve_core::solid::edge_face_counts(&meshes[0].faces);
        let bad: Vec<_> = counts.iter().filter(|(_, c)| **c != 2).collect();
        assert!(bad.is_empty(), "{:?}: non-manifold edges {:?}", camera.mode, bad);
        assert!(meshes[0].is_closed());
    }
}

#[test]
fn test_figure_eight_stencil_is_closed() {
    let points = [[0.0, 0.0], [2.0, 2.0], [2.0, 0.0], [0.0, 2.0]]
        .iter()
        .map(|p| Point3::new(p[0], p[1], -2.0))
        .collect();
    let carver = SourceCarver::new(Carver::PathSet(vec![Path::closed(points)]));
    assert_watertight(&[carver], CarveFlags::default());
}

#[test]
fn test_corner_touching_union_is_closed() {
    let carvers = vec![
        SourceCarver::new(Carver::PathSet(vec![Path::closed(quad([0.0, 0.0], [1.0, 1.0], -2.0))])),
        SourceCarver::new(Carver::PathSet(vec![Path::closed(quad([1.0, 1.0], [2.0, 2.0], -2.0))])),
    ];
    let flags = CarveFlags {
        union_stencils: true,
        ..CarveFlags::default()
    };
    assert_watertight(&carvers, flags);
}

#[test]
fn test_faces_touching_at_a_corner_are_closed() {
    let mesh = FacetedMesh {
        vertices: vec![
            Point3::new(0.0, 0.0, -2.0),
            Point3::new(1.0, 0.0, -2.0),
            Point3::new(1.0, 1.0, -2.0),
            Point3::new(2.0, 1.0, -2.0),
            Point3::new(2.0, 2.0, -2.0),
        ],
        faces: vec![vec![0, 1, 2], vec![2, 3, 4]],
        edges: Vec::new(),
    };
    assert_watertight(&[SourceCarver::new(Carver::FacetedMesh(mesh))], CarveFlags::default());
}

#[test]
fn test_perspective_cone_apex_at_eye() {
    let eye = Vector3::new(2.0, 1.0, 3.0);
    // Camera at `eye` looking down -Z.
    let view = Matrix4::new_translation(&-eye);
    let camera = CameraFrame::new(view, ProjectionMode::Perspective, 10.0).unwrap();
    let carver = SourceCarver::new(Carver::PathSet(vec![Path::closed(quad([1.0, 0.0], [3.0, 2.0], -2.0))]));

    let shape = carver.extract(&camera, &CarveConfig::default()).unwrap();
    let t = triangulate_shape(&shape, 1e-9).unwrap();
    let solid = extrude_shape(&t, &camera.inverse_view().unwrap(), camera.mode, camera.far_dist).unwrap();

    assert_eq!(solid.vertices.len(), 5);
    assert!(solid.is_closed());
    assert!(solid.signed_volume() > 0.0);
    assert!(solid.vertices[4].approx_eq(&Point3::from(eye)));
    assert!(camera.eye().unwrap().approx_eq(&Point3::from(eye)));
}
