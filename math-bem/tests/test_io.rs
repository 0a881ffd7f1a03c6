//! File interface tests: Gmsh meshes, job files and exports on disk

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use approx::assert_relative_eq;
use math_audio_bem_potential::core::io::{
    ExportData, GridConfig, PlaneFieldRecord, PlaneJobConfig, export, load_config, read_gmsh,
    save_config,
};
use math_audio_bem_potential::core::*;
use num_complex::Complex64;

/// Octahedron with outward-facing triangles, two physical groups
const OCTAHEDRON_MSH: &str = "$MeshFormat
2.2 0 8
$EndMeshFormat
$Nodes
6
1 1 0 0
2 -1 0 0
3 0 1 0
4 0 -1 0
5 0 0 1
6 0 0 -1
$EndNodes
$Elements
9
1 15 2 1 1 5
2 2 2 1 1 1 3 5
3 2 2 1 1 3 2 5
4 2 2 1 1 2 4 5
5 2 2 1 1 4 1 5
6 2 2 2 2 3 1 6
7 2 2 2 2 2 3 6
8 2 2 2 2 4 2 6
9 2 2 2 2 1 4 6
$EndElements
";

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("bem_potential_{}_{}", name, std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn test_read_octahedron() {
    let dir = scratch_dir("octahedron");
    let path = dir.join("octahedron.msh");
    fs::write(&path, OCTAHEDRON_MSH).unwrap();

    let grid = read_gmsh(&path).unwrap();
    assert_eq!(grid.vertex_count(), 6);
    assert_eq!(grid.element_count(), 8);
    assert_eq!(grid.domain_indices().iter().filter(|&&d| d == 2).count(), 4);

    // Outward normals: every centroid-to-normal dot product is positive
    for g in grid.geometries() {
        let outward: f64 = (0..3).map(|d| g.center[d] * g.normal[d]).sum();
        assert!(outward > 0.0);
    }

    // Closed surface: the double layer of a unit density is -1 inside
    let grid = Arc::new(grid);
    let space = function_space(grid, "DP", 0).unwrap();
    let density = GridFunction::constant(space, Complex64::new(1.0, 0.0));
    let potential = laplace_double_layer_potential(&Context::default());
    let values = potential
        .evaluate_at_points(
            &density,
            &ndarray::array![[0.1, 0.05, -0.1], [3.0, 0.0, 0.0]],
            potential.quadrature_strategy(),
            &EvaluationOptions::sequential(),
        )
        .unwrap();
    assert_relative_eq!(values[[0, 0]].re, -1.0, epsilon = 0.01);
    assert_relative_eq!(values[[1, 0]].re, 0.0, epsilon = 0.01);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn test_job_with_gmsh_grid_writes_outputs() {
    let dir = scratch_dir("job");
    fs::write(dir.join("octahedron.msh"), OCTAHEDRON_MSH).unwrap();

    let mut config = PlaneJobConfig::default();
    config.grid = GridConfig::Gmsh {
        file: PathBuf::from("octahedron.msh"),
    };
    config.plane.dimensions = [5, 4];
    config.parameters.evaluation = EvaluationOptions::sequential();
    let job_path = dir.join("job.toml");
    save_config(&config, &job_path).unwrap();

    let loaded = load_config(&job_path).unwrap();
    let job = loaded.build(&dir).unwrap();
    let field = job.run().unwrap();
    assert_eq!(field.len(), 20);

    let json_path = dir.join("field.json");
    let vtk_path = dir.join("field.vtk");
    for path in [&json_path, &vtk_path] {
        export(
            path,
            ExportData::Plane {
                name: "laplace single layer",
                evaluation: &field,
            },
        )
        .unwrap();
    }

    let record = PlaneFieldRecord::load_json(&json_path).unwrap();
    assert_eq!(record.dimensions, [5, 4]);
    assert_eq!(record.samples.len(), 20);
    assert_relative_eq!(record.samples[7].magnitude, field.magnitudes()[7], epsilon = 1e-12);

    let vtk = fs::read_to_string(&vtk_path).unwrap();
    assert!(vtk.contains("DIMENSIONS 5 4 1"));
    assert!(vtk.contains("POINTS 20 double"));

    let mesh_path = dir.join("density.msh");
    export(
        &mesh_path,
        ExportData::GridFunction {
            name: "density",
            function: &job.density,
        },
    )
    .unwrap();
    let reread = read_gmsh(&mesh_path).unwrap();
    assert_eq!(reread.element_count(), 8);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn test_missing_mesh_file_is_io_error() {
    let mut config = PlaneJobConfig::default();
    config.grid = GridConfig::Gmsh {
        file: PathBuf::from("does-not-exist.msh"),
    };
    let err = config.build(&std::env::temp_dir()).err().unwrap();
    assert!(matches!(err, BemError::Io(_)));
    assert!(!err.is_input_error());
}
