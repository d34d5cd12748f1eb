use puzzle_cube::{
    PuzzleError,
    resources::geometry::{GeometryCache, RoundedBox},
};

fn length(v: [f32; 3]) -> f32 {
    (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
}

#[test]
fn should_center_the_default_cell_on_the_origin() {
    let mesh = RoundedBox::cube(1.0, 0.15, 10).build().unwrap();
    let (min, max) = mesh.bounding_box();

    for axis in 0..3 {
        assert!((min[axis] + max[axis]).abs() < 1e-5, "axis {} not centred", axis);
        assert!((max[axis] - min[axis] - 1.0).abs() < 1e-3, "axis {} has the wrong extent", axis);
    }
}

#[test]
fn should_center_boxes_of_any_proportions() {
    let boxes = [
        (1.0, 2.0, 0.5, 0.2, 4),
        (3.0, 0.7, 1.2, 0.3, 7),
        (0.4, 0.4, 2.5, 0.0, 1),
    ];
    for (w, h, d, r, s) in boxes {
        let mesh = RoundedBox::new(w, h, d, r, s).build().unwrap();
        let (min, max) = mesh.bounding_box();
        for (axis, extent) in [w, h, d].into_iter().enumerate() {
            assert!(
                (min[axis] + max[axis]).abs() < 1e-5,
                "{}x{}x{} is off centre on axis {}",
                w,
                h,
                d,
                axis
            );
            assert!((max[axis] - min[axis] - extent).abs() < 1e-3);
        }
    }
}

#[test]
fn should_wind_every_face_counter_clockwise_from_outside() {
    fn sub(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
        [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
    }
    fn cross(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
        [
            a[1] * b[2] - a[2] * b[1],
            a[2] * b[0] - a[0] * b[2],
            a[0] * b[1] - a[1] * b[0],
        ]
    }

    for params in [RoundedBox::cube(1.0, 0.15, 6), RoundedBox::new(1.0, 2.0, 0.5, 0.2, 4)] {
        let mesh = params.build().unwrap();
        for triangle in mesh.indices.chunks(3) {
            let [a, b, c] = [0, 1, 2].map(|i| mesh.vertices[triangle[i] as usize].position);
            let face = cross(sub(b, a), sub(c, a));
            if length(face) < 1e-7 {
                // collapsed quads and slivers along the tiny corner arcs
                continue;
            }
            let centroid = [0, 1, 2].map(|i| (a[i] + b[i] + c[i]) / 3.0);
            // the box is convex and centred, so outward means away from the origin
            let facing: f32 = (0..3).map(|i| face[i] * centroid[i]).sum();
            assert!(facing > 0.0, "triangle {:?} faces inwards", triangle);
        }
    }
}

#[test]
fn should_tessellate_corners_and_bevel_by_smoothness() {
    let smoothness = 10;
    let mesh = RoundedBox::cube(1.0, 0.15, smoothness).build().unwrap();

    let outline = 4 * (smoothness as usize + 1);
    let rings = 2 * (2 * smoothness as usize + 1);
    assert_eq!(mesh.vertices.len(), rings * outline + 2);
    assert_eq!(mesh.triangle_count(), (rings - 1) * outline * 2 + 2 * outline);

    let coarse = RoundedBox::cube(1.0, 0.15, 2).build().unwrap();
    assert!(coarse.vertices.len() < mesh.vertices.len());
}

#[test]
fn should_produce_a_closed_index_list_with_unit_normals() {
    let mesh = RoundedBox::new(1.0, 2.0, 0.5, 0.2, 4).build().unwrap();

    assert_eq!(mesh.indices.len() % 3, 0);
    assert!(mesh.indices.iter().all(|i| (*i as usize) < mesh.vertices.len()));
    for vertex in &mesh.vertices {
        assert!((length(vertex.normal) - 1.0).abs() < 1e-4);
    }
}

#[test]
fn should_point_cap_normals_away_from_the_box() {
    let mesh = RoundedBox::cube(1.0, 0.15, 6).build().unwrap();
    let (min, max) = mesh.bounding_box();

    for vertex in &mesh.vertices {
        let z = vertex.position[2];
        if (z - max[2]).abs() < 1e-6 {
            assert!(vertex.normal[2] > 0.99);
        } else if (z - min[2]).abs() < 1e-6 {
            assert!(vertex.normal[2] < -0.99);
        }
    }
}

#[test]
fn should_keep_a_thin_box_when_depth_is_below_the_bevel() {
    let mesh = RoundedBox::new(1.0, 1.0, 0.2, 0.15, 4).build().unwrap();
    let (min, max) = mesh.bounding_box();

    // the straight section collapses, leaving only the two bevels
    assert!((max[2] - min[2] - 0.3).abs() < 1e-4);
    assert!((min[2] + max[2]).abs() < 1e-5);
}

#[test]
fn should_accept_a_zero_corner_radius() {
    let mesh = RoundedBox::cube(1.0, 0.0, 3).build().unwrap();
    let (min, max) = mesh.bounding_box();
    assert!((max[0] - min[0] - 1.0).abs() < 1e-3);
}

#[test]
fn should_reject_a_corner_radius_of_half_the_side() {
    let err = RoundedBox::cube(1.0, 0.5, 10).build().unwrap_err();
    assert_eq!(
        err,
        PuzzleError::InvalidCornerRadius {
            radius: 0.5,
            limit: 0.5
        }
    );

    let narrow = RoundedBox::new(0.4, 2.0, 2.0, 0.25, 10).validate();
    assert!(matches!(narrow, Err(PuzzleError::InvalidCornerRadius { .. })));

    let negative = RoundedBox::cube(1.0, -0.1, 10).validate();
    assert!(matches!(negative, Err(PuzzleError::InvalidCornerRadius { .. })));
}

#[test]
fn should_reject_degenerate_dimensions_and_smoothness() {
    assert!(matches!(
        RoundedBox::new(0.0, 1.0, 1.0, 0.1, 4).validate(),
        Err(PuzzleError::InvalidDimensions { .. })
    ));
    assert!(matches!(
        RoundedBox::new(1.0, f32::NAN, 1.0, 0.1, 4).validate(),
        Err(PuzzleError::InvalidDimensions { .. })
    ));
    assert_eq!(
        RoundedBox::cube(1.0, 0.1, 0).validate(),
        Err(PuzzleError::InvalidSmoothness(0))
    );
}

#[test]
fn should_build_each_distinct_geometry_once() {
    let mut cache = GeometryCache::new();
    let params = RoundedBox::cube(1.0, 0.15, 10);

    let (first_id, first) = cache.get_or_build(&params).unwrap();
    let (second_id, second) = cache.get_or_build(&params).unwrap();
    assert_eq!(first_id, second_id);
    assert!(std::sync::Arc::ptr_eq(&first, &second));
    assert_eq!(cache.builds(), 1);

    let (other_id, _) = cache.get_or_build(&RoundedBox::cube(1.0, 0.2, 10)).unwrap();
    assert_ne!(other_id, first_id);
    assert_eq!(cache.builds(), 2);
    assert!(cache.mesh(first_id).is_some());
}

#[test]
fn should_not_cache_failed_builds() {
    let mut cache = GeometryCache::new();
    assert!(cache.get_or_build(&RoundedBox::cube(1.0, 0.6, 10)).is_err());
    assert_eq!(cache.builds(), 0);
}
