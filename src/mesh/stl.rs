//! STL file I/O support for Mesh
//!
//! Binary files are read and written; ASCII files are read. STL has no vertex
//! sharing and no color, so loaded meshes carry three vertices per triangle and
//! saved meshes lose their color attribute.

use super::Mesh;
use crate::{Error, Result, Triangle};
use nalgebra::Vector3;
use std::fs::File;
use std::io::{BufWriter, Cursor, Read, Write};
use std::path::Path;

const HEADER_LEN: usize = 80;
const TRIANGLE_RECORD_LEN: u64 = 50;

/// Save mesh to binary STL file
pub(super) fn save_stl(mesh: &Mesh, path: &Path) -> Result<()> {
    let file = File::create(path).map_err(|e| {
        Error::FileSave(format!("Failed to create STL file {}: {}", path.display(), e))
    })?;

    let mut writer = BufWriter::new(file);

    // Write header (80 bytes)
    let mut header = String::from("mesh-voxelizer binary STL");
    header.truncate(HEADER_LEN);
    while header.len() < HEADER_LEN {
        header.push(' ');
    }
    writer
        .write_all(header.as_bytes())
        .map_err(|e| Error::FileSave(format!("Failed to write STL header: {}", e)))?;

    let triangle_count = u32::try_from(mesh.triangle_count()).map_err(|_| {
        Error::FileSave(format!(
            "{} triangles do not fit in a binary STL",
            mesh.triangle_count()
        ))
    })?;
    writer
        .write_all(&triangle_count.to_le_bytes())
        .map_err(|e| Error::FileSave(format!("Failed to write triangle count: {}", e)))?;

    for i in 0..mesh.triangle_count() {
        let (v1, v2, v3) = mesh.get_triangle_vertices(i)?;
        let normal = Mesh::face_normal(v1, v2, v3).unwrap_or_else(|| Vector3::new(0.0, 0.0, 1.0));

        write_f32_array(&mut writer, &[normal.x, normal.y, normal.z])?;
        write_f32_array(&mut writer, &[v1.x, v1.y, v1.z])?;
        write_f32_array(&mut writer, &[v2.x, v2.y, v2.z])?;
        write_f32_array(&mut writer, &[v3.x, v3.y, v3.z])?;
        writer
            .write_all(&[0u8, 0u8])
            .map_err(|e| Error::FileSave(format!("Failed to write attribute: {}", e)))?;
    }

    writer
        .flush()
        .map_err(|e| Error::FileSave(format!("Failed to flush STL file: {}", e)))
}

/// Write f32 array in little-endian format
fn write_f32_array<W: Write>(writer: &mut W, values: &[f32]) -> Result<()> {
    for &value in values {
        writer
            .write_all(&value.to_le_bytes())
            .map_err(|e| Error::FileSave(format!("Failed to write float: {}", e)))?;
    }
    Ok(())
}

/// Read a little-endian vector
fn read_vector<R: Read>(reader: &mut R) -> Result<Vector3<f32>> {
    let mut bytes = [0u8; 12];
    reader
        .read_exact(&mut bytes)
        .map_err(|e| Error::FileLoad(format!("Failed to read float: {}", e)))?;
    let f = |i: usize| f32::from_le_bytes([bytes[i], bytes[i + 1], bytes[i + 2], bytes[i + 3]]);
    Ok(Vector3::new(f(0), f(4), f(8)))
}

/// Read u32 in little-endian format
fn read_u32<R: Read>(reader: &mut R) -> Result<u32> {
    let mut bytes = [0u8; 4];
    reader
        .read_exact(&mut bytes)
        .map_err(|e| Error::FileLoad(format!("Failed to read u32: {}", e)))?;
    Ok(u32::from_le_bytes(bytes))
}

/// Load mesh from a binary or ASCII STL file
pub(super) fn load_stl(path: &Path) -> Result<Mesh> {
    let bytes = std::fs::read(path).map_err(|e| {
        Error::FileLoad(format!("Failed to open STL file {}: {}", path.display(), e))
    })?;

    // "solid" headers also appear in binary files; a consistent record count wins
    if looks_like_ascii(&bytes) && !has_binary_size(&bytes) {
        let text = std::str::from_utf8(&bytes)
            .map_err(|e| Error::FileLoad(format!("ASCII STL is not valid UTF-8: {}", e)))?;
        return parse_ascii_stl(text);
    }

    if bytes.len() < HEADER_LEN + 4 {
        return Err(Error::FileLoad(format!(
            "STL file {} is too short ({} bytes)",
            path.display(),
            bytes.len()
        )));
    }

    let mut reader = Cursor::new(&bytes[HEADER_LEN..]);
    let triangle_count = read_u32(&mut reader)?;
    let expected = HEADER_LEN as u64 + 4 + triangle_count as u64 * TRIANGLE_RECORD_LEN;
    if (bytes.len() as u64) < expected {
        return Err(Error::FileLoad(format!(
            "STL file declares {} triangles but is only {} bytes",
            triangle_count,
            bytes.len()
        )));
    }

    let mut mesh = Mesh::new();
    for _ in 0..triangle_count {
        // Normal is recomputed on save
        let _normal = read_vector(&mut reader)?;
        let v1 = read_vector(&mut reader)?;
        let v2 = read_vector(&mut reader)?;
        let v3 = read_vector(&mut reader)?;

        let mut attr = [0u8; 2];
        reader
            .read_exact(&mut attr)
            .map_err(|e| Error::FileLoad(format!("Failed to read attribute: {}", e)))?;

        let i0 = mesh.add_vertex(v1);
        let i1 = mesh.add_vertex(v2);
        let i2 = mesh.add_vertex(v3);
        mesh.add_triangle(Triangle::new(i0, i1, i2));
    }

    Ok(mesh)
}

/// True when the length matches the triangle count stored after the header
fn has_binary_size(bytes: &[u8]) -> bool {
    let Some(count) = bytes.get(HEADER_LEN..HEADER_LEN + 4) else {
        return false;
    };
    let count = u32::from_le_bytes([count[0], count[1], count[2], count[3]]) as u64;
    bytes.len() as u64 == HEADER_LEN as u64 + 4 + count * TRIANGLE_RECORD_LEN
}

fn looks_like_ascii(bytes: &[u8]) -> bool {
    let head = String::from_utf8_lossy(&bytes[..bytes.len().min(512)]).to_lowercase();
    head.trim_start().starts_with("solid") && (head.contains("facet") || head.contains("endsolid"))
}

fn parse_ascii_stl(text: &str) -> Result<Mesh> {
    let mut mesh = Mesh::new();
    let mut pending: Vec<Vector3<f32>> = Vec::with_capacity(3);

    for (line_no, line) in text.lines().enumerate() {
        let mut tokens = line.split_whitespace();
        match tokens.next() {
            Some("vertex") => {
                let coords = tokens
                    .take(3)
                    .map(|t| t.parse::<f32>())
                    .collect::<std::result::Result<Vec<f32>, _>>()
                    .map_err(|_| {
                        Error::FileLoad(format!("Line {}: invalid vertex", line_no + 1))
                    })?;
                if coords.len() != 3 {
                    return Err(Error::FileLoad(format!(
                        "Line {}: vertex needs 3 coordinates",
                        line_no + 1
                    )));
                }
                pending.push(Vector3::new(coords[0], coords[1], coords[2]));
            }
            Some("endloop") => {
                if pending.len() != 3 {
                    return Err(Error::FileLoad(format!(
                        "Line {}: facet has {} vertices, expected 3",
                        line_no + 1,
                        pending.len()
                    )));
                }
                let i0 = mesh.add_vertex(pending[0]);
                let i1 = mesh.add_vertex(pending[1]);
                let i2 = mesh.add_vertex(pending[2]);
                mesh.add_triangle(Triangle::new(i0, i1, i2));
                pending.clear();
            }
            _ => {}
        }
    }

    Ok(mesh)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ascii_stl() {
        let text = "solid tri\n\
                    facet normal 0 0 1\n\
                    outer loop\n\
                    vertex 0 0 0\n\
                    vertex 1 0 0\n\
                    vertex 0 1 0\n\
                    endloop\n\
                    endfacet\n\
                    endsolid tri\n";
        let mesh = parse_ascii_stl(text).unwrap();
        assert_eq!(mesh.triangle_count(), 1);
        assert_eq!(mesh.get_vertex(1), Some(Vector3::new(1.0, 0.0, 0.0)));
    }

    #[test]
    fn test_ascii_detection() {
        assert!(looks_like_ascii(b"solid t\nfacet normal 0 0 1\n"));
        assert!(looks_like_ascii(b"solid empty\nendsolid empty\n"));
        let mut binary = b"solid but actually binary".to_vec();
        binary.resize(84, 0);
        assert!(!looks_like_ascii(&binary));
    }

    #[test]
    fn test_binary_with_solid_header_loads_as_binary() {
        let tmp = crate::TempFolder::new().unwrap();
        let path = tmp.path().join("solid_header.stl");

        let mut bytes = b"solid facet endsolid".to_vec();
        bytes.resize(HEADER_LEN, b' ');
        bytes.extend_from_slice(&1u32.to_le_bytes());
        for value in [0.0f32, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0] {
            bytes.extend_from_slice(&value.to_le_bytes());
        }
        bytes.extend_from_slice(&[0, 0]);
        assert!(looks_like_ascii(&bytes));
        assert!(has_binary_size(&bytes));
        std::fs::write(&path, &bytes).unwrap();

        let mesh = load_stl(&path).unwrap();
        assert_eq!(mesh.triangle_count(), 1);
        assert_eq!(mesh.get_vertex(1), Some(Vector3::new(1.0, 0.0, 0.0)));
    }

    #[test]
    fn test_binary_size_check() {
        let ascii = b"solid t\nfacet normal 0 0 1\nendsolid t\n";
        assert!(!has_binary_size(ascii));
        let mut empty = vec![b' '; HEADER_LEN];
        empty.extend_from_slice(&0u32.to_le_bytes());
        assert!(has_binary_size(&empty));
    }

    #[test]
    fn test_parse_ascii_stl_rejects_short_facet() {
        let text = "solid t\nfacet normal 0 0 1\nouter loop\nvertex 0 0 0\nendloop\nendfacet\n";
        assert!(matches!(parse_ascii_stl(text), Err(Error::FileLoad(_))));
    }
}
