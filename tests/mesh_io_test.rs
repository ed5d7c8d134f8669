use approx::assert_relative_eq;
use mesh_voxelizer::{
    BBox3, ColorRgba32, Error, LoadedGeometry, Mesh, MeshFormat, TempFolder, Triangle,
};
use nalgebra::Vector3;
use serial_test::serial;
use std::fs;

/// Signed volume of a closed mesh, positive for outward-facing triangles
fn signed_volume(mesh: &Mesh) -> f32 {
    let mut v6_sum = 0.0f32;
    for i in 0..mesh.triangle_count() {
        let (a, b, c) = mesh.get_triangle_vertices(i).unwrap();
        v6_sum += a.dot(&b.cross(&c));
    }
    v6_sum / 6.0
}

fn triangle_mesh() -> Mesh {
    let mut mesh = Mesh::new();
    let v0 = mesh.add_vertex(Vector3::new(0.0, 0.0, 0.0));
    let v1 = mesh.add_vertex(Vector3::new(10.0, 0.0, 0.0));
    let v2 = mesh.add_vertex(Vector3::new(5.0, 10.0, 0.0));
    mesh.add_triangle(Triangle::new(v0, v1, v2));
    mesh
}

#[test]
#[serial]
fn test_stl_save_and_load() {
    let mesh_original = triangle_mesh();

    let tmp = TempFolder::new().expect("Failed to create temp folder");
    let output_path = tmp.path().join("test_roundtrip.stl");
    mesh_original
        .save_stl(&output_path)
        .expect("Failed to save STL");

    // 80 byte header, count, one 50 byte record
    assert_eq!(fs::metadata(&output_path).unwrap().len(), 134);

    let mesh_loaded = Mesh::load_stl(&output_path).expect("Failed to load STL");
    assert_eq!(mesh_loaded.triangle_count(), 1, "Triangle count mismatch");
    // Three vertices per triangle since STL does not share vertices
    assert_eq!(mesh_loaded.vertex_count(), 3, "Vertex count should be 3");

    for i in 0..3 {
        let original = mesh_original.get_vertex(i).unwrap();
        let loaded = mesh_loaded.get_vertex(i).unwrap();
        assert_relative_eq!(original, loaded, epsilon = 1e-6);
    }
}

#[test]
#[serial]
fn test_stl_drops_colors() {
    let tmp = TempFolder::new().unwrap();
    let path = tmp.path().join("colored.stl");
    let mut cube = Mesh::box_with_extents(Vector3::repeat(2.0));
    cube.set_uniform_color(ColorRgba32::new(10, 20, 30, 255));
    cube.save(&path).unwrap();

    let loaded = Mesh::load_flattened(&path).unwrap();
    assert_eq!(loaded.triangle_count(), 12);
    assert_eq!(loaded.vertex_count(), 36);
    assert!(!loaded.has_vertex_colors());
    assert_relative_eq!(signed_volume(&loaded), 8.0, epsilon = 1e-4);
}

#[test]
#[serial]
fn test_ascii_stl_load() {
    let tmp = TempFolder::new().unwrap();
    let path = tmp.path().join("ascii.stl");
    fs::write(
        &path,
        "solid t\n facet normal 0 0 1\n  outer loop\n   vertex 0 0 0\n   vertex 1 0 0\n   vertex 0 1 0\n  endloop\n endfacet\nendsolid t\n",
    )
    .unwrap();
    let mesh = Mesh::load_stl(&path).unwrap();
    assert_eq!(mesh.triangle_count(), 1);
}

#[test]
#[serial]
fn test_obj_colored_roundtrip() {
    let tmp = TempFolder::new().unwrap();
    let path = tmp.path().join("cube.obj");
    let mut cube = Mesh::from_bbox(&BBox3::new(Vector3::zeros(), Vector3::repeat(1.0)));
    cube.set_uniform_color(ColorRgba32::new(200, 100, 50, 255));
    cube.save(&path).unwrap();

    let loaded = Mesh::load_flattened(&path).unwrap();
    assert_eq!(loaded.vertex_count(), 8);
    assert_eq!(loaded.triangles(), cube.triangles());
    assert_eq!(
        loaded.vertex_colors().unwrap()[3],
        ColorRgba32::new(200, 100, 50, 255)
    );
    for (a, b) in loaded.vertices().iter().zip(cube.vertices()) {
        assert_relative_eq!(*a, *b, epsilon = 1e-6);
    }
}

#[test]
#[serial]
fn test_obj_scene_is_detected() {
    let tmp = TempFolder::new().unwrap();
    let path = tmp.path().join("scene.obj");
    fs::write(
        &path,
        "o first\nv 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n\
         o second\nv 5 0 0\nv 6 0 0\nv 5 1 0\nv 6 1 0\nf 4 5 6\nf 5 7 6\n",
    )
    .unwrap();

    match Mesh::load(&path).unwrap() {
        LoadedGeometry::Scene(scene) => {
            assert_eq!(scene.part_count(), 2);
            let (name, second) = scene.parts().nth(1).unwrap();
            assert_eq!(name, "second");
            assert_eq!(second.vertex_count(), 4);
            assert_eq!(second.get_triangle(0), Some(Triangle::new(0, 1, 2)));
            assert_eq!(second.get_triangle(1), Some(Triangle::new(1, 3, 2)));
        }
        LoadedGeometry::Mesh(_) => panic!("expected a scene"),
    }

    let flat = Mesh::load_flattened(&path).unwrap();
    assert_eq!(flat.vertex_count(), 7);
    assert_eq!(flat.triangle_count(), 3);
}

#[test]
fn test_unknown_extension_rejected() {
    assert!(matches!(
        Mesh::load("model.glb"),
        Err(Error::UnsupportedFormat(_))
    ));
    assert!(matches!(
        MeshFormat::from_path("model.ply"),
        Err(Error::UnsupportedFormat(_))
    ));
}

#[test]
#[serial]
fn test_malformed_obj_reports_line() {
    let tmp = TempFolder::new().unwrap();
    let path = tmp.path().join("bad.obj");
    fs::write(&path, "v 0 0 0\nv 1 0 0\nf 1 2 9\n").unwrap();
    match Mesh::load(&path) {
        Err(Error::FileLoad(message)) => assert!(message.contains("Line 3")),
        other => panic!("unexpected result: {:?}", other.map(|g| g.is_scene())),
    }
}
