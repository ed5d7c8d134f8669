use mesh_voxelizer::{
    voxelize, BBox3, ColorRgba32, Error, LogFile, Mesh, TempFolder, VoxelizeOptions, Voxelizer,
};
use nalgebra::Vector3;
use serial_test::serial;
use std::fs;
use std::path::Path;

fn unit_cube() -> Mesh {
    Mesh::from_bbox(&BBox3::new(Vector3::zeros(), Vector3::repeat(1.0)))
}

fn write_unit_cube(dir: &Path, name: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    unit_cube().save(&path).expect("Failed to save cube");
    path
}

#[test]
#[serial]
fn test_unit_cube_half_pitch() {
    let tmp = TempFolder::new().unwrap();
    let input = write_unit_cube(tmp.path(), "cube.obj");

    let grid = voxelize(&input, 0.5, None).unwrap();
    assert_eq!(grid.shape(), [2, 2, 2]);
    assert_eq!(grid.filled_count(), 8);

    let mut points = grid.points();
    assert_eq!(points.len(), 8);
    points.sort_by(|a, b| {
        a.x.total_cmp(&b.x)
            .then(a.y.total_cmp(&b.y))
            .then(a.z.total_cmp(&b.z))
    });
    assert_eq!(points[0], Vector3::new(0.25, 0.25, 0.25));
    assert_eq!(points[7], Vector3::new(0.75, 0.75, 0.75));
}

#[test]
#[serial]
fn test_no_output_writes_nothing() {
    let tmp = TempFolder::new().unwrap();
    let input = write_unit_cube(tmp.path(), "cube.obj");

    voxelize(&input, 0.25, None).unwrap();
    let names: Vec<_> = fs::read_dir(tmp.path())
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    assert_eq!(names, vec![std::ffi::OsString::from("cube.obj")]);
}

#[test]
#[serial]
fn test_interior_is_filled() {
    let tmp = TempFolder::new().unwrap();
    let input = write_unit_cube(tmp.path(), "cube.obj");

    let grid = voxelize(&input, 0.25, None).unwrap();
    assert_eq!(grid.shape(), [4, 4, 4]);
    assert_eq!(grid.filled_count(), 64);
    assert!(grid.is_filled([1, 2, 1]));
}

#[test]
#[serial]
fn test_colored_input_writes_colored_cubes() {
    let tmp = TempFolder::new().unwrap();
    let input = tmp.path().join("colored.obj");
    let output = tmp.path().join("colored_voxels.obj");

    // Byte-scaled colors
    let mut text = String::new();
    for v in unit_cube().vertices() {
        text.push_str(&format!("v {} {} {} 200 100 50\n", v.x, v.y, v.z));
    }
    for t in unit_cube().triangles() {
        text.push_str(&format!("f {} {} {}\n", t.v0 + 1, t.v1 + 1, t.v2 + 1));
    }
    fs::write(&input, text).unwrap();

    let grid = voxelize(&input, 0.25, Some(&output)).unwrap();
    let n = grid.filled_count();
    assert_eq!(n, 64);

    let boxes = Mesh::load_flattened(&output).unwrap();
    assert_eq!(boxes.vertex_count(), 8 * n);
    assert_eq!(boxes.triangle_count(), 12 * n);
    let colors = boxes.vertex_colors().expect("output should carry colors");
    assert!(colors
        .iter()
        .all(|&c| c == ColorRgba32::new(200, 100, 50, 255)));

    let bbox = boxes.bounding_box();
    assert!((bbox.min() - Vector3::zeros()).norm() < 1e-5);
    assert!((bbox.max() - Vector3::repeat(1.0)).norm() < 1e-5);
}

#[test]
#[serial]
fn test_uncolored_input_writes_plain_boxes() {
    let tmp = TempFolder::new().unwrap();
    let input = write_unit_cube(tmp.path(), "cube.obj");
    let output = tmp.path().join("cube_voxels.obj");

    let grid = voxelize(&input, 0.5, Some(&output)).unwrap();
    let boxes = Mesh::load_flattened(&output).unwrap();
    assert_eq!(boxes.vertex_count(), 8 * grid.filled_count());
    assert_eq!(boxes.triangle_count(), 12 * grid.filled_count());
    assert!(!boxes.has_vertex_colors());
}

#[test]
#[serial]
fn test_smaller_pitch_never_gives_fewer_voxels() {
    let tmp = TempFolder::new().unwrap();
    let input = write_unit_cube(tmp.path(), "cube.obj");

    let counts: Vec<usize> = [0.1, 0.2, 0.25, 0.5]
        .iter()
        .map(|&pitch| voxelize(&input, pitch, None).unwrap().filled_count())
        .collect();
    assert!(counts.windows(2).all(|w| w[0] >= w[1]), "{:?}", counts);
    assert_eq!(counts[3], 8);
}

#[test]
#[serial]
fn test_scene_input_is_flattened() {
    let tmp = TempFolder::new().unwrap();
    let input = tmp.path().join("scene.obj");

    let mut text = String::new();
    for (name, shift) in [("left", 0.0f32), ("right", 2.2)] {
        text.push_str(&format!("o {}\n", name));
        for v in unit_cube().vertices() {
            text.push_str(&format!("v {} {} {}\n", v.x + shift, v.y, v.z));
        }
        for t in unit_cube().triangles() {
            text.push_str(&format!("f {} {} {}\n", t.v0 as i64 - 8, t.v1 as i64 - 8, t.v2 as i64 - 8));
        }
    }
    fs::write(&input, text).unwrap();
    assert!(Mesh::load(&input).unwrap().is_scene());

    let grid = voxelize(&input, 0.5, None).unwrap();
    let expected = Mesh::load_flattened(&input)
        .unwrap()
        .voxelized(0.5)
        .unwrap()
        .fill();
    assert_eq!(grid, expected);
    assert!(grid.filled_count() >= 16);
}

#[test]
#[serial]
fn test_stl_input_and_output() {
    let tmp = TempFolder::new().unwrap();
    let input = write_unit_cube(tmp.path(), "cube.stl");
    let output = tmp.path().join("cube_voxels.stl");

    let grid = voxelize(&input, 0.5, Some(&output)).unwrap();
    assert_eq!(grid.filled_count(), 8);
    let boxes = Mesh::load_stl(&output).unwrap();
    assert_eq!(boxes.triangle_count(), 8 * 12);
}

#[test]
#[serial]
fn test_log_file_records_steps() {
    let tmp = TempFolder::new().unwrap();
    let input = write_unit_cube(tmp.path(), "cube.obj");
    let log_path = tmp.path().join("voxelize.log");

    {
        let log = LogFile::new(Some(&log_path), false).unwrap();
        let options = VoxelizeOptions::default()
            .with_pitch(0.5)
            .with_output(tmp.path().join("cube_voxels.obj"));
        Voxelizer::new(options)
            .unwrap()
            .with_log(log)
            .run(&input)
            .unwrap();
    }

    let content = fs::read_to_string(&log_path).unwrap();
    assert!(content.contains("Mesh has vertex colors: false"));
    assert!(content.contains("Filled voxels: 8"));
    assert!(content.contains("Saved voxel mesh"));
}

#[test]
#[serial]
fn test_errors() {
    let tmp = TempFolder::new().unwrap();
    let input = write_unit_cube(tmp.path(), "cube.obj");

    assert!(matches!(
        voxelize(&input, 0.0, None),
        Err(Error::InvalidParameter(_))
    ));
    assert!(matches!(
        voxelize(tmp.path().join("missing.obj"), 0.5, None),
        Err(Error::FileLoad(_))
    ));
    assert!(matches!(
        voxelize(tmp.path().join("mesh.glb"), 0.5, None),
        Err(Error::UnsupportedFormat(_))
    ));

    let empty = tmp.path().join("empty.obj");
    fs::write(&empty, "v 0 0 0\nv 1 0 0\n").unwrap();
    assert!(matches!(
        voxelize(&empty, 0.5, None),
        Err(Error::EmptyVoxelization(_))
    ));
}
