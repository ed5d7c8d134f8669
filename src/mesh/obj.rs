//! Wavefront OBJ I/O support for Mesh
//!
//! Vertex colors follow the common `v x y z r g b [a]` extension. Colors are
//! written as floats in 0..1; on load, values above 1 are taken as 0..255.

use super::Mesh;
use crate::utils::Utils;
use crate::{ColorFloat, ColorRgba32, Error, LoadedGeometry, Result, Scene, Triangle};
use nalgebra::Vector3;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

struct ObjObject {
    name: String,
    triangles: Vec<Triangle>,
}

#[derive(Default)]
struct ObjData {
    vertices: Vec<Vector3<f32>>,
    colors: Vec<Option<[f32; 4]>>,
    objects: Vec<ObjObject>,
}

impl ObjData {
    fn current_object(&mut self) -> &mut ObjObject {
        if self.objects.is_empty() {
            self.objects.push(ObjObject {
                name: String::new(),
                triangles: Vec::new(),
            });
        }
        let last = self.objects.len() - 1;
        &mut self.objects[last]
    }

    /// Per-vertex colors, only when every vertex carries one
    fn vertex_colors(&self) -> Option<Vec<ColorRgba32>> {
        if self.colors.is_empty() || self.colors.iter().any(Option::is_none) {
            return None;
        }
        let byte_scale = self
            .colors
            .iter()
            .flatten()
            .any(|c| c[..3].iter().any(|&v| v > 1.0));
        Some(
            self.colors
                .iter()
                .flatten()
                .map(|c| {
                    if byte_scale {
                        ColorRgba32::from(ColorFloat::new(
                            c[0] / 255.0,
                            c[1] / 255.0,
                            c[2] / 255.0,
                            if c[3] > 1.0 { c[3] / 255.0 } else { c[3] },
                        ))
                    } else {
                        ColorRgba32::from(ColorFloat::new(c[0], c[1], c[2], c[3]))
                    }
                })
                .collect(),
        )
    }
}

pub(super) fn load_obj(path: &Path) -> Result<LoadedGeometry> {
    let file = File::open(path).map_err(|e| {
        Error::FileLoad(format!("Failed to open OBJ file {}: {}", path.display(), e))
    })?;
    let data = parse_obj(BufReader::new(file))?;
    into_geometry(data)
}

fn parse_obj<R: BufRead>(reader: R) -> Result<ObjData> {
    let mut data = ObjData::default();

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        let line = match line.find('#') {
            Some(idx) => &line[..idx],
            None => line.as_str(),
        };
        let mut tokens = line.split_whitespace();
        let Some(keyword) = tokens.next() else {
            continue;
        };

        match keyword {
            "v" => {
                let values = tokens
                    .map(|t| {
                        t.parse::<f32>().map_err(|_| {
                            Error::FileLoad(format!(
                                "Line {}: invalid vertex value '{}'",
                                line_no + 1,
                                Utils::shorten(t, 20)
                            ))
                        })
                    })
                    .collect::<Result<Vec<f32>>>()?;
                if values.len() < 3 {
                    return Err(Error::FileLoad(format!(
                        "Line {}: vertex needs 3 coordinates, got {}",
                        line_no + 1,
                        values.len()
                    )));
                }
                data.vertices
                    .push(Vector3::new(values[0], values[1], values[2]));
                let color = match values.len() {
                    6 => Some([values[3], values[4], values[5], 1.0]),
                    7 => Some([values[3], values[4], values[5], values[6]]),
                    _ => None,
                };
                data.colors.push(color);
            }
            "f" => {
                let count = data.vertices.len();
                let indices = tokens
                    .map(|t| resolve_index(t, count, line_no + 1))
                    .collect::<Result<Vec<u32>>>()?;
                if indices.len() < 3 {
                    return Err(Error::FileLoad(format!(
                        "Line {}: face needs at least 3 vertices, got {}",
                        line_no + 1,
                        indices.len()
                    )));
                }
                let object = data.current_object();
                for i in 1..indices.len() - 1 {
                    object
                        .triangles
                        .push(Triangle::new(indices[0], indices[i], indices[i + 1]));
                }
            }
            "o" => {
                let name = tokens.collect::<Vec<_>>().join(" ");
                match data.objects.last_mut() {
                    // An object without faces yet just gets renamed
                    Some(last) if last.triangles.is_empty() => last.name = name,
                    _ => data.objects.push(ObjObject {
                        name,
                        triangles: Vec::new(),
                    }),
                }
            }
            _ => {}
        }
    }

    Ok(data)
}

/// Resolve one `f` token (`i`, `i/t`, `i//n`, `i/t/n`) to a 0-based index
fn resolve_index(token: &str, vertex_count: usize, line_no: usize) -> Result<u32> {
    let head = token.split('/').next().unwrap_or_default();
    let raw = head.parse::<i64>().map_err(|_| {
        Error::FileLoad(format!(
            "Line {}: invalid face index '{}'",
            line_no,
            Utils::shorten(token, 20)
        ))
    })?;
    let index = if raw > 0 {
        raw - 1
    } else if raw < 0 {
        vertex_count as i64 + raw
    } else {
        -1
    };
    if index < 0 || index as usize >= vertex_count {
        return Err(Error::FileLoad(format!(
            "Line {}: face index {} out of range (have {} vertices)",
            line_no, raw, vertex_count
        )));
    }
    Ok(index as u32)
}

fn into_geometry(data: ObjData) -> Result<LoadedGeometry> {
    let colors = data.vertex_colors();
    let ObjData {
        vertices, objects, ..
    } = data;
    let objects: Vec<ObjObject> = objects
        .into_iter()
        .filter(|o| !o.triangles.is_empty())
        .collect();

    if objects.len() <= 1 {
        let triangles = objects
            .into_iter()
            .next()
            .map(|o| o.triangles)
            .unwrap_or_default();
        return Ok(LoadedGeometry::Mesh(Mesh::from_parts(
            vertices, triangles, colors,
        )?));
    }

    let mut scene = Scene::new();
    for object in objects {
        // Keep only the vertices this object references, in first-use order
        let mut remap: HashMap<u32, u32> = HashMap::new();
        let mut part_vertices = Vec::new();
        let mut part_colors = colors.as_ref().map(|_| Vec::new());
        let mut part_triangles = Vec::with_capacity(object.triangles.len());

        for tri in &object.triangles {
            let mut local = [0u32; 3];
            for (slot, &global) in local.iter_mut().zip(tri.indices().iter()) {
                *slot = *remap.entry(global).or_insert_with(|| {
                    part_vertices.push(vertices[global as usize]);
                    if let (Some(out), Some(all)) = (part_colors.as_mut(), colors.as_ref()) {
                        out.push(all[global as usize]);
                    }
                    (part_vertices.len() - 1) as u32
                });
            }
            part_triangles.push(Triangle::new(local[0], local[1], local[2]));
        }

        scene.add_part(
            object.name,
            Mesh::from_parts(part_vertices, part_triangles, part_colors)?,
        );
    }

    Ok(LoadedGeometry::Scene(scene))
}

pub(super) fn save_obj(mesh: &Mesh, path: &Path) -> Result<()> {
    let file = File::create(path).map_err(|e| {
        Error::FileSave(format!("Failed to create OBJ file {}: {}", path.display(), e))
    })?;
    let mut writer = BufWriter::new(file);
    write_obj(mesh, &mut writer)
        .and_then(|_| writer.flush())
        .map_err(|e| Error::FileSave(format!("Failed to write OBJ file {}: {}", path.display(), e)))
}

fn write_obj<W: Write>(mesh: &Mesh, writer: &mut W) -> std::io::Result<()> {
    writeln!(writer, "# mesh-voxelizer")?;
    writeln!(
        writer,
        "# {} vertices, {} triangles",
        mesh.vertex_count(),
        mesh.triangle_count()
    )?;

    match mesh.vertex_colors().filter(|_| mesh.has_vertex_colors()) {
        Some(colors) => {
            for (v, c) in mesh.vertices().iter().zip(colors) {
                let c = ColorFloat::from(*c);
                writeln!(
                    writer,
                    "v {:.8} {:.8} {:.8} {:.8} {:.8} {:.8}",
                    v.x, v.y, v.z, c.r, c.g, c.b
                )?;
            }
        }
        None => {
            for v in mesh.vertices() {
                writeln!(writer, "v {:.8} {:.8} {:.8}", v.x, v.y, v.z)?;
            }
        }
    }

    for tri in mesh.triangles() {
        writeln!(writer, "f {} {} {}", tri.v0 + 1, tri.v1 + 1, tri.v2 + 1)?;
    }
    Ok(())
}
