//! Benchmarks for mesh operations.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use loupe::prelude::*;
use nalgebra::Point3;

fn grid_geometry(n: u32) -> (Vec<Point3<f64>>, Vec<[u32; 3]>) {
    let mut vertices = Vec::with_capacity(((n + 1) * (n + 1)) as usize);
    let mut faces = Vec::with_capacity((n * n * 2) as usize);

    for j in 0..=n {
        for i in 0..=n {
            vertices.push(Point3::new(i as f64, j as f64, 0.0));
        }
    }

    for j in 0..n {
        for i in 0..n {
            let v00 = j * (n + 1) + i;
            let v10 = v00 + 1;
            let v01 = v00 + (n + 1);
            let v11 = v01 + 1;

            faces.push([v00, v10, v11]);
            faces.push([v00, v11, v01]);
        }
    }

    (vertices, faces)
}

fn create_grid_mesh(n: u32) -> HalfEdgeMesh {
    let (vertices, faces) = grid_geometry(n);
    build_from_triangles(&vertices, &faces).unwrap()
}

fn bench_mesh_construction(c: &mut Criterion) {
    let (vertices, faces) = grid_geometry(50);

    c.bench_function("build_grid_50x50", |b| {
        b.iter(|| build_from_triangles(black_box(&vertices), black_box(&faces)).unwrap());
    });
}

fn bench_mesh_traversal(c: &mut Criterion) {
    let mesh = create_grid_mesh(50);

    c.bench_function("one_ring_all", |b| {
        b.iter(|| {
            let mut count = 0;
            for v in mesh.vertex_ids() {
                count += mesh.one_ring(v).unwrap().len();
            }
            count
        });
    });
}

fn bench_subdivision(c: &mut Criterion) {
    let mesh = create_grid_mesh(20);

    c.bench_function("loop_subdivide_grid_20x20", |b| {
        b.iter(|| subdivide(black_box(&mesh)).unwrap());
    });
}

fn bench_picking(c: &mut Criterion) {
    let mesh = subdivide(&create_grid_mesh(50)).unwrap();
    let query = Point3::new(25.3, 17.8, 0.1);

    c.bench_function("nearest_vertex_subdivided_grid", |b| {
        b.iter(|| nearest_vertex(&mesh, black_box(&query), 1.0));
    });
}

criterion_group!(
    benches,
    bench_mesh_construction,
    bench_mesh_traversal,
    bench_subdivision,
    bench_picking
);
criterion_main!(benches);
