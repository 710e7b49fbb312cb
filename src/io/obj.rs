//! Wavefront OBJ format support.
//!
//! Only `v` (position) and `f` (face) records are read; texture coordinates,
//! normals, groups, and materials are skipped. Face corners may use the
//! `v`, `v/vt`, `v//vn`, and `v/vt/vn` forms, with 1-based or negative
//! (relative) indices.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use log::debug;
use nalgebra::Point3;

use crate::error::{MeshError, Result};
use crate::mesh::{build_mesh, HalfEdgeMesh};

/// Positions and polygon index lists as stored in a file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawGeometry {
    /// Vertex positions.
    pub positions: Vec<Point3<f64>>,
    /// Zero-based vertex indices per face, in file order.
    pub faces: Vec<Vec<u32>>,
}

/// Parse OBJ text into raw geometry.
///
/// `path` is only used in error messages.
pub fn parse<R: BufRead>(reader: R, path: &Path) -> Result<RawGeometry> {
    let mut geometry = RawGeometry::default();

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let parse_err = |message: String| MeshError::Parse {
            path: path.to_path_buf(),
            line: i + 1,
            message,
        };

        let mut parts = line.split_whitespace();
        match parts.next() {
            Some("v") => {
                let mut coords = [0.0_f64; 3];
                for c in &mut coords {
                    let token = parts
                        .next()
                        .ok_or_else(|| parse_err("vertex needs three coordinates".to_string()))?;
                    *c = token
                        .parse()
                        .map_err(|_| parse_err(format!("invalid coordinate '{}'", token)))?;
                }
                geometry.positions.push(Point3::from(coords));
            }
            Some("f") => {
                let count = geometry.positions.len();
                let face = parts
                    .map(|corner| resolve_index(corner, count).map_err(&parse_err))
                    .collect::<Result<Vec<u32>>>()?;
                if face.len() < 3 {
                    return Err(parse_err(format!("face has {} corners", face.len())));
                }
                geometry.faces.push(face);
            }
            _ => {}
        }
    }

    Ok(geometry)
}

/// Turn one face corner token into a zero-based vertex index.
fn resolve_index(corner: &str, count: usize) -> std::result::Result<u32, String> {
    let token = corner.split('/').next().unwrap_or(corner);
    let index: i64 = token
        .parse()
        .map_err(|_| format!("invalid face index '{}'", corner))?;

    let resolved = match index {
        0 => return Err("face index 0 is not valid in OBJ".to_string()),
        i if i > 0 => i - 1,
        i => count as i64 + i,
    };
    u32::try_from(resolved).map_err(|_| format!("face index {} is out of range", index))
}

/// Read raw geometry from an OBJ file.
pub fn read<P: AsRef<Path>>(path: P) -> Result<RawGeometry> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let geometry = parse(BufReader::new(file), path)?;
    debug!(
        "Read {}: {} positions, {} faces",
        path.display(),
        geometry.positions.len(),
        geometry.faces.len()
    );
    Ok(geometry)
}

/// Load a mesh from an OBJ file.
///
/// # Example
///
/// ```no_run
/// use loupe::io::obj;
///
/// let mesh = obj::load("model.obj").unwrap();
/// ```
pub fn load<P: AsRef<Path>>(path: P) -> Result<HalfEdgeMesh> {
    let geometry = read(path)?;
    Ok(build_mesh(&geometry.positions, &geometry.faces)?)
}

/// Write a mesh as OBJ text.
pub fn write<W: Write>(mesh: &HalfEdgeMesh, writer: W) -> Result<()> {
    let mut out = BufWriter::new(writer);

    for p in mesh.positions() {
        writeln!(out, "v {} {} {}", p.x, p.y, p.z)?;
    }

    for f in mesh.face_ids() {
        write!(out, "f")?;
        for v in mesh.face_vertices(f) {
            // OBJ is 1-based
            write!(out, " {}", v.index() + 1)?;
        }
        writeln!(out)?;
    }

    out.flush()?;
    Ok(())
}

/// Save a mesh to an OBJ file.
pub fn save<P: AsRef<Path>>(mesh: &HalfEdgeMesh, path: P) -> Result<()> {
    write(mesh, File::create(path)?)
}
