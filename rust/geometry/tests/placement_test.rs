// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Repeated placements of one geometry definition, including a mirrored copy
use ifc_view_core::{RawPart, IDENTITY_TRANSFORM};
use ifc_view_geometry::{convert_parts, Aabb, MeshUnit};

/// Unit cube with counter-clockwise faces seen from outside
fn unit_cube(owner_id: u32) -> RawPart {
    #[rustfmt::skip]
    let positions = vec![
        0.0, 0.0, 0.0,  1.0, 0.0, 0.0,  1.0, 1.0, 0.0,  0.0, 1.0, 0.0,
        0.0, 0.0, 1.0,  1.0, 0.0, 1.0,  1.0, 1.0, 1.0,  0.0, 1.0, 1.0,
    ];
    #[rustfmt::skip]
    let indices = vec![
        0, 2, 1,  0, 3, 2, // bottom
        4, 5, 6,  4, 6, 7, // top
        0, 1, 5,  0, 5, 4, // front
        3, 7, 6,  3, 6, 2, // back
        0, 4, 7,  0, 7, 3, // left
        1, 2, 6,  1, 6, 5, // right
    ];
    RawPart::new(owner_id, 500, positions, indices)
}

fn assert_normals_point_outward(unit: &MeshUnit) {
    let center = unit.bounds().center();
    let mesh = unit.mesh();
    for (p, n) in mesh.positions.chunks_exact(3).zip(mesh.normals.chunks_exact(3)) {
        let outward = [
            p[0] as f64 - center[0],
            p[1] as f64 - center[1],
            p[2] as f64 - center[2],
        ];
        let dot = outward[0] * n[0] as f64 + outward[1] * n[1] as f64 + outward[2] * n[2] as f64;
        assert!(dot > 0.0, "normal {:?} at {:?} points inward", n, p);
    }
}

#[test]
fn test_repeated_and_mirrored_placements() {
    let mut shifted = IDENTITY_TRANSFORM;
    shifted[12] = 10.0;

    // x' = 3 - x
    let mut mirrored = IDENTITY_TRANSFORM;
    mirrored[0] = -1.0;
    mirrored[12] = 3.0;

    let batch = convert_parts(vec![
        unit_cube(1),
        unit_cube(1).with_transform(shifted),
        unit_cube(2).with_transform(mirrored),
    ]);

    assert_eq!(batch.meshes.len(), 3);
    assert!(batch.failures.is_empty());

    for unit in &batch.meshes {
        assert_eq!(unit.vertex_count(), 8);
        assert_eq!(unit.triangle_count(), 12);
        assert_normals_point_outward(unit);
    }

    assert_eq!(batch.meshes[1].bounds().min, [10.0, 0.0, 0.0]);
    assert_eq!(batch.meshes[2].bounds().min, [2.0, 0.0, 0.0]);
    assert_eq!(batch.meshes[2].bounds().max, [3.0, 1.0, 1.0]);

    let total = Aabb::union_all(batch.meshes.iter().map(|m| m.bounds())).unwrap();
    assert_eq!(total.min, [0.0, 0.0, 0.0]);
    assert_eq!(total.max, [11.0, 1.0, 1.0]);
}

#[test]
fn test_placeholder_parts_in_large_batch() {
    let mut parts = Vec::new();
    for owner_id in 0..50 {
        if owner_id % 5 == 0 {
            parts.push(RawPart::new(owner_id, 0, vec![], vec![]));
        } else {
            parts.push(unit_cube(owner_id));
        }
    }

    let batch = convert_parts(parts);
    assert_eq!(batch.stats.placements, 50);
    assert_eq!(batch.stats.empty, 10);
    assert_eq!(batch.stats.converted, 40);
    assert_eq!(batch.stats.failed, 0);
    assert!(batch.meshes.iter().all(|m| m.owner_id % 5 != 0));
}
