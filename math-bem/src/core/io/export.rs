//! Export of grid functions and plane evaluations
//!
//! - legacy ASCII VTK for ParaView (`.vtk`)
//! - JSON records of plane evaluations (`.json`)
//! - Gmsh meshes with data views (`.msh`)

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::core::error::{BemError, Result};
use crate::core::grid_function::GridFunction;
use crate::core::io::gmsh::save_gmsh;
use crate::core::postprocess::{PlaneEvaluation, PlaneLimits};
use crate::core::space::SpaceKind;

/// Something that can be written by [`export`]
#[derive(Debug, Clone, Copy)]
pub enum ExportData<'a> {
    /// Potential values sampled on a plane
    Plane {
        /// Name of the data set
        name: &'a str,
        /// Evaluation result
        evaluation: &'a PlaneEvaluation,
    },
    /// Density on the boundary grid
    GridFunction {
        /// Name of the data set
        name: &'a str,
        /// Grid function
        function: &'a GridFunction,
    },
}

/// Write data to `path`, picking the format from the extension
///
/// | extension | plane | grid function |
/// |-----------|-------|---------------|
/// | `.vtk`    | yes   | yes           |
/// | `.json`   | yes   | no            |
/// | `.msh`    | no    | yes           |
pub fn export<P: AsRef<Path>>(path: P, data: ExportData<'_>) -> Result<()> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    match (ext.as_str(), data) {
        ("vtk", ExportData::Plane { name, evaluation }) => {
            fs::write(path, export_plane_vtk(evaluation, name)?)?;
        }
        ("vtk", ExportData::GridFunction { name, function }) => {
            fs::write(path, export_grid_function_vtk(function, name)?)?;
        }
        ("json", ExportData::Plane { name, evaluation }) => {
            PlaneFieldRecord::from_evaluation(evaluation, name).save_json(path)?;
        }
        ("msh", ExportData::GridFunction { name, function }) => {
            save_gmsh(path, function.space().grid(), Some((name, function)))?;
        }
        _ => {
            return Err(BemError::UnsupportedFormat(format!(
                "cannot export {} to {}",
                data.kind(),
                path.display()
            )));
        }
    }

    log::info!("Wrote {} to {}", data.kind(), path.display());
    Ok(())
}

impl ExportData<'_> {
    fn kind(&self) -> &'static str {
        match self {
            ExportData::Plane { .. } => "plane evaluation",
            ExportData::GridFunction { .. } => "grid function",
        }
    }
}

/// Legacy VTK unstructured grid with the grid function attached
///
/// DP0 data is written as `CELL_DATA`, P1 data as `POINT_DATA`; each gets a
/// real, an imaginary and a magnitude scalar field.
pub fn export_grid_function_vtk(function: &GridFunction, name: &str) -> Result<String> {
    let mut out = String::new();
    write_grid_function_vtk(&mut out, function, name).map_err(fmt_error)?;
    Ok(out)
}

fn write_grid_function_vtk(
    out: &mut String,
    function: &GridFunction,
    name: &str,
) -> std::fmt::Result {
    let grid = function.space().grid();
    let name = sanitize(name);

    writeln!(out, "# vtk DataFile Version 3.0")?;
    writeln!(out, "{}", name)?;
    writeln!(out, "ASCII")?;
    writeln!(out, "DATASET UNSTRUCTURED_GRID")?;

    writeln!(out, "POINTS {} double", grid.vertex_count())?;
    for v in grid.vertices().rows() {
        writeln!(out, "{} {} {}", v[0], v[1], v[2])?;
    }

    let n_elements = grid.element_count();
    writeln!(out, "CELLS {} {}", n_elements, 4 * n_elements)?;
    for e in grid.elements() {
        writeln!(out, "3 {} {} {}", e[0], e[1], e[2])?;
    }
    writeln!(out, "CELL_TYPES {}", n_elements)?;
    for _ in 0..n_elements {
        // VTK_TRIANGLE
        writeln!(out, "5")?;
    }

    let coefficients = function.coefficients();
    match function.space().kind() {
        SpaceKind::Dp0 => writeln!(out, "CELL_DATA {}", coefficients.len())?,
        SpaceKind::P1 => writeln!(out, "POINT_DATA {}", coefficients.len())?,
    }
    write_complex_scalars(out, &name, coefficients.iter())
}

/// Legacy VTK structured grid (`nx × ny × 1`) with the plane values
///
/// Every component `c` gets `<name>_<c>_real`, `_imag` and `_abs` scalars;
/// `<name>_magnitude` holds the per-point norm over all components.
pub fn export_plane_vtk(evaluation: &PlaneEvaluation, name: &str) -> Result<String> {
    let mut out = String::new();
    write_plane_vtk(&mut out, evaluation, name).map_err(fmt_error)?;
    Ok(out)
}

fn write_plane_vtk(
    out: &mut String,
    evaluation: &PlaneEvaluation,
    name: &str,
) -> std::fmt::Result {
    let (nx, ny) = evaluation.dimensions;
    let name = sanitize(name);

    writeln!(out, "# vtk DataFile Version 3.0")?;
    writeln!(out, "{}", name)?;
    writeln!(out, "ASCII")?;
    writeln!(out, "DATASET STRUCTURED_GRID")?;
    writeln!(out, "DIMENSIONS {} {} 1", nx, ny)?;
    writeln!(out, "POINTS {} double", evaluation.len())?;
    for p in evaluation.points.rows() {
        writeln!(out, "{} {} {}", p[0], p[1], p[2])?;
    }

    writeln!(out, "POINT_DATA {}", evaluation.len())?;
    for c in 0..evaluation.component_count() {
        let column = evaluation.values.column(c);
        write_complex_scalars(out, &format!("{}_{}", name, c), column.iter())?;
    }
    writeln!(out, "SCALARS {}_magnitude double 1", name)?;
    writeln!(out, "LOOKUP_TABLE default")?;
    for m in evaluation.magnitudes() {
        writeln!(out, "{}", m)?;
    }
    Ok(())
}

fn write_complex_scalars<'a, I>(out: &mut String, name: &str, values: I) -> std::fmt::Result
where
    I: Iterator<Item = &'a Complex64> + Clone,
{
    let parts: [(&str, fn(&Complex64) -> f64); 3] =
        [("real", |v| v.re), ("imag", |v| v.im), ("abs", |v| v.norm())];
    for (suffix, part) in parts {
        writeln!(out, "SCALARS {}_{} double 1", name, suffix)?;
        writeln!(out, "LOOKUP_TABLE default")?;
        for v in values.clone() {
            writeln!(out, "{}", part(v))?;
        }
    }
    Ok(())
}

/// VTK field names cannot contain whitespace
fn sanitize(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect();
    if cleaned.is_empty() {
        "field".to_string()
    } else {
        cleaned
    }
}

fn fmt_error(e: std::fmt::Error) -> BemError {
    BemError::Io(std::io::Error::other(e))
}

/// One sample of a plane evaluation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaneSample {
    /// x coordinate
    pub x: f64,
    /// y coordinate
    pub y: f64,
    /// z coordinate
    pub z: f64,
    /// Real part of every component
    pub real: Vec<f64>,
    /// Imaginary part of every component
    pub imag: Vec<f64>,
    /// Norm over all components
    pub magnitude: f64,
}

/// JSON record of a plane evaluation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaneFieldRecord {
    /// Name of the data set
    pub name: String,
    /// Library version that wrote the record
    pub version: String,
    /// `[nx, ny]`
    pub dimensions: [usize; 2],
    /// Plane extent
    pub limits: PlaneLimits,
    /// Values per point
    pub component_count: usize,
    /// Samples in evaluation order
    pub samples: Vec<PlaneSample>,
}

impl PlaneFieldRecord {
    /// Build a record from an evaluation
    pub fn from_evaluation(evaluation: &PlaneEvaluation, name: &str) -> Self {
        let magnitudes = evaluation.magnitudes();
        let samples = evaluation
            .points
            .rows()
            .into_iter()
            .zip(evaluation.values.rows())
            .zip(magnitudes.iter())
            .map(|((p, v), &magnitude)| PlaneSample {
                x: p[0],
                y: p[1],
                z: p[2],
                real: v.iter().map(|c| c.re).collect(),
                imag: v.iter().map(|c| c.im).collect(),
                magnitude,
            })
            .collect();

        Self {
            name: name.to_string(),
            version: crate::VERSION.to_string(),
            dimensions: [evaluation.dimensions.0, evaluation.dimensions.1],
            limits: evaluation.limits,
            component_count: evaluation.component_count(),
            samples,
        }
    }

    /// Save to JSON file
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json =
            serde_json::to_string_pretty(self).map_err(|e| BemError::Parse(e.to_string()))?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Load from JSON file
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(|e| BemError::Parse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::grid::structured_grid;
    use crate::core::space::function_space;
    use ndarray::{Array2, array};
    use std::sync::Arc;

    fn sample_plane() -> PlaneEvaluation {
        PlaneEvaluation {
            points: array![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]],
            values: Array2::from_shape_vec(
                (2, 1),
                vec![Complex64::new(3.0, 4.0), Complex64::new(-1.0, 0.0)],
            )
            .unwrap(),
            dimensions: (2, 1),
            limits: PlaneLimits::horizontal(0.0, 1.0, 0.0, 0.0, 0.0),
        }
    }

    #[test]
    fn test_plane_vtk_layout() {
        let text = export_plane_vtk(&sample_plane(), "single layer").unwrap();
        assert!(text.contains("DATASET STRUCTURED_GRID"));
        assert!(text.contains("DIMENSIONS 2 1 1"));
        assert!(text.contains("SCALARS single_layer_0_real double 1"));
        assert!(text.contains("SCALARS single_layer_magnitude double 1"));
    }

    #[test]
    fn test_grid_function_vtk_sections() {
        let grid = Arc::new(structured_grid((0.0, 0.0), (1.0, 1.0), (1, 1)).unwrap());

        let dp0 = function_space(grid.clone(), "DP", 0).unwrap();
        let f = GridFunction::constant(dp0, Complex64::new(1.0, 0.0));
        let text = export_grid_function_vtk(&f, "density").unwrap();
        assert!(text.contains("CELLS 2 8"));
        assert!(text.contains("CELL_DATA 2"));

        let p1 = function_space(grid, "P", 1).unwrap();
        let g = GridFunction::constant(p1, Complex64::new(0.0, 1.0));
        let text = export_grid_function_vtk(&g, "density").unwrap();
        assert!(text.contains("POINT_DATA 4"));
    }

    #[test]
    fn test_record_magnitudes() {
        let record = PlaneFieldRecord::from_evaluation(&sample_plane(), "test");
        assert_eq!(record.samples.len(), 2);
        assert!((record.samples[0].magnitude - 5.0).abs() < 1e-12);
        assert_eq!(record.samples[1].real, vec![-1.0]);
        assert_eq!(record.dimensions, [2, 1]);
    }

    #[test]
    fn test_unsupported_extension() {
        let plane = sample_plane();
        let result = export(
            "plane.msh",
            ExportData::Plane {
                name: "p",
                evaluation: &plane,
            },
        );
        assert!(matches!(result, Err(BemError::UnsupportedFormat(_))));

        let result = export(
            "plane.csv",
            ExportData::Plane {
                name: "p",
                evaluation: &plane,
            },
        );
        assert!(matches!(result, Err(BemError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_json_export_round_trip_on_disk() {
        let path = std::env::temp_dir().join(format!("plane_export_{}.json", std::process::id()));
        let plane = sample_plane();
        export(
            &path,
            ExportData::Plane {
                name: "p",
                evaluation: &plane,
            },
        )
        .unwrap();

        let record = PlaneFieldRecord::load_json(&path).unwrap();
        assert_eq!(record.component_count, 1);
        assert_eq!(record.samples[0].imag, vec![4.0]);
        let _ = fs::remove_file(&path);
    }
}
