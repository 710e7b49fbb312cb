//! Loupe CLI - inspect, subdivide, and pick on meshes from the command line.
//!
//! Usage: loupe <COMMAND> [OPTIONS] <INPUT> ...
//!
//! Run `loupe --help` for available commands. Set `RUST_LOG=loupe=debug` to
//! see per-pass statistics.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use clap::{Parser, Subcommand};
use log::info;
use nalgebra::Point3;

use loupe::algo::pick::nearest_vertex;
use loupe::algo::Progress;
use loupe::error::MeshError;
use loupe::io;
use loupe::mesh::{triangulate, HalfEdgeMesh, VertexId};
use loupe::sequence::MeshSequence;

/// Deepest level the CLI will compute; each level quadruples the face count.
const MAX_LEVEL: usize = 8;

#[derive(Parser)]
#[command(name = "loupe")]
#[command(author, version, about = "Loop subdivision and vertex picking CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display mesh information
    Info {
        /// Input mesh file
        input: PathBuf,

        /// Subdivision level to report on
        #[arg(short, long, default_value = "0")]
        level: usize,
    },

    /// Subdivide a mesh
    Subdivide {
        /// Input mesh file
        input: PathBuf,

        /// Output mesh file
        output: PathBuf,

        /// Number of subdivision iterations
        #[arg(short, long, default_value = "1")]
        iterations: usize,
    },

    /// Find the vertex nearest to a point
    Pick {
        /// Input mesh file
        input: PathBuf,

        /// Query point X
        #[arg(allow_hyphen_values = true)]
        x: f64,

        /// Query point Y
        #[arg(allow_hyphen_values = true)]
        y: f64,

        /// Query point Z
        #[arg(allow_hyphen_values = true)]
        z: f64,

        /// Maximum distance from the query point
        #[arg(short = 'd', long, default_value = "0.1")]
        max_dist: f64,

        /// Subdivision level to pick on
        #[arg(short, long, default_value = "0")]
        level: usize,
    },
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Info { input, level } => {
            cmd_info(&input, level)?;
        }

        Commands::Subdivide {
            input,
            output,
            iterations,
        } => {
            cmd_subdivide(&input, &output, iterations)?;
        }

        Commands::Pick {
            input,
            x,
            y,
            z,
            max_dist,
            level,
        } => {
            cmd_pick(&input, Point3::new(x, y, z), max_dist, level)?;
        }
    }

    Ok(())
}

/// Create a progress reporter that displays a progress bar on the terminal.
fn create_progress() -> Progress {
    let max_percent = Arc::new(AtomicUsize::new(0));

    Progress::new(move |current, total, message| {
        if total == 0 {
            return;
        }

        let percent = if current >= total {
            100
        } else {
            (current * 100) / total
        };

        // Only redraw when the bar moves forward
        if max_percent.fetch_max(percent, Ordering::Relaxed) >= percent && percent != 100 {
            return;
        }

        let bar_width = 30;
        let filled = (percent * bar_width) / 100;
        eprint!(
            "\r[{}{}] {:3}% {}",
            "=".repeat(filled),
            " ".repeat(bar_width - filled),
            percent,
            message
        );
        let _ = std::io::stderr().flush();

        if current >= total {
            eprintln!();
        }
    })
}

/// Load a mesh as level 0 of a sequence, triangulating polygons.
fn load_sequence(input: &Path) -> Result<MeshSequence, MeshError> {
    let mesh = io::load(input)?;
    info!(
        "Loaded {}: {} vertices, {} faces",
        input.display(),
        mesh.vertex_count(),
        mesh.face_count()
    );
    Ok(MeshSequence::new(triangulate(&mesh)?))
}

fn level_of<'a>(
    sequence: &'a mut MeshSequence,
    level: usize,
) -> Result<&'a HalfEdgeMesh, MeshError> {
    if level > MAX_LEVEL {
        return Err(MeshError::LevelOutOfRange {
            level,
            len: MAX_LEVEL + 1,
        });
    }
    let progress = if level > 0 { create_progress() } else { Progress::none() };
    Ok(sequence.ensure_level_with_progress(level, &progress)?)
}

fn cmd_info(input: &Path, level: usize) -> Result<(), Box<dyn std::error::Error>> {
    let mut sequence = load_sequence(input)?;
    let mesh = level_of(&mut sequence, level)?;

    println!("File: {}", input.display());
    println!("Level: {}", level);
    println!("Vertices: {}", mesh.vertex_count());
    println!("Faces: {}", mesh.face_count());
    println!("Edges: {}", mesh.edge_count());
    println!("Half-edges: {}", mesh.halfedge_count());
    println!("Euler characteristic: {}", mesh.euler_characteristic());

    if let Some((min, max)) = mesh.bounding_box() {
        println!(
            "Bounding box: ({:.3}, {:.3}, {:.3}) to ({:.3}, {:.3}, {:.3})",
            min.x, min.y, min.z, max.x, max.y, max.z
        );
        let diag = max - min;
        println!("Dimensions: {:.3} x {:.3} x {:.3}", diag.x, diag.y, diag.z);
    }

    let boundary_verts = mesh
        .vertex_ids()
        .filter(|&v| mesh.is_boundary_vertex(v))
        .count();
    if !mesh.is_valid() {
        println!("Topology: Non-manifold (some vertices join separate fans)");
    } else if boundary_verts == 0 {
        println!("Topology: Closed (no boundary)");
    } else {
        println!(
            "Topology: Open ({} boundary vertices, {} boundary edges)",
            boundary_verts,
            mesh.boundary_edge_count()
        );
    }

    Ok(())
}

fn cmd_subdivide(
    input: &Path,
    output: &Path,
    iterations: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut sequence = load_sequence(input)?;
    let base = sequence.base();
    println!("Loaded: {} vertices, {} faces", base.vertex_count(), base.face_count());

    println!("Applying Loop subdivision ({} iterations)...", iterations);
    let start = Instant::now();
    let mesh = level_of(&mut sequence, iterations)?;
    let elapsed = start.elapsed();

    println!("Result: {} vertices, {} faces", mesh.vertex_count(), mesh.face_count());
    io::save(mesh, output)?;
    println!("Saved: {} ({:.2?})", output.display(), elapsed);

    Ok(())
}

fn cmd_pick(
    input: &Path,
    point: Point3<f64>,
    max_dist: f64,
    level: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut sequence = load_sequence(input)?;
    let mesh = level_of(&mut sequence, level)?;

    match nearest_vertex(mesh, &point, max_dist) {
        Some(index) => {
            let v = VertexId::from(index);
            let p = mesh.position(v);
            let kind = if mesh.is_boundary_vertex(v) { "boundary" } else { "interior" };
            println!(
                "Vertex {} at ({:.6}, {:.6}, {:.6}), {}, distance {:.6}",
                index,
                p.x,
                p.y,
                p.z,
                kind,
                (p - point).norm()
            );
        }
        None => println!("No vertex within {} of the query point", max_dist),
    }

    Ok(())
}
