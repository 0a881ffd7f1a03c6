//! JSON/TOML configuration for plane sampling jobs
//!
//! A [`PlaneJobConfig`] describes everything needed to sample a potential
//! on a plane: the grid, the function space, the density, the operator,
//! the plane itself and the evaluation parameters.
//!
//! ## Example TOML Configuration
//!
//! ```toml
//! description = "Laplace single layer of a unit sphere"
//!
//! [grid]
//! type = "sphere"
//! subdivisions = 3
//! radius = 1.0
//!
//! [space]
//! family = "DP"
//! order = 0
//!
//! [density]
//! type = "constant"
//! re = 1.0
//!
//! [operator]
//! potential = "single_layer"
//! kernel = { type = "laplace" }
//!
//! [plane]
//! limits = { xmin = -2.0, xmax = 2.0, ymin = -2.0, ymax = 2.0, zmin = 0.0, zmax = 0.0 }
//! dimensions = [41, 41]
//!
//! [parameters.quadrature]
//! far_order = 2
//! near_order = 4
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::core::context::{Context, GlobalParameters};
use crate::core::error::{BemError, Result};
use crate::core::grid::{
    Grid, grid_from_element_data, grid_from_sphere, structured_grid, uv_sphere_grid,
};
use crate::core::grid_function::GridFunction;
use crate::core::io::gmsh::read_gmsh;
use crate::core::kernels::{HelmholtzKernel, LaplaceKernel, ModifiedHelmholtzKernel};
use crate::core::postprocess::{PlaneEvaluation, PlaneLimits, evaluate_potential_on_plane};
use crate::core::potential::{KernelPotential, PotentialKind, PotentialOperator};
use crate::core::space::{FunctionSpace, function_space};
use crate::core::types::{Point3, dot};

/// Plane sampling job
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaneJobConfig {
    /// Job description
    #[serde(default)]
    pub description: String,

    /// Boundary grid
    pub grid: GridConfig,

    /// Function space of the density
    #[serde(default)]
    pub space: SpaceConfig,

    /// Density on the boundary
    #[serde(default)]
    pub density: DensityConfig,

    /// Potential operator
    pub operator: OperatorConfig,

    /// Sampling plane
    pub plane: PlaneConfig,

    /// Quadrature and evaluation parameters
    #[serde(default)]
    pub parameters: GlobalParameters,

    /// Output configuration
    #[serde(default)]
    pub output: OutputConfig,
}

/// Where the boundary grid comes from
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GridConfig {
    /// Icosphere
    Sphere {
        /// Refinement level (0 = icosahedron)
        #[serde(default = "default_subdivisions")]
        subdivisions: usize,
        /// Sphere radius
        #[serde(default = "default_one")]
        radius: f64,
        /// Sphere centre
        #[serde(default)]
        origin: Point3,
    },
    /// Latitude/longitude sphere
    UvSphere {
        /// Sphere radius
        #[serde(default = "default_one")]
        radius: f64,
        /// Polar divisions
        n_theta: usize,
        /// Azimuthal divisions
        n_phi: usize,
    },
    /// Flat rectangle in the z = 0 plane
    Structured {
        /// `(x, y)` of the lower left corner
        lower_left: [f64; 2],
        /// `(x, y)` of the upper right corner
        upper_right: [f64; 2],
        /// Cells per axis
        subdivisions: [usize; 2],
    },
    /// Gmsh MSH 2.2 file (relative to the configuration file)
    Gmsh {
        /// Mesh file
        file: PathBuf,
    },
    /// Inline vertices and triangles
    Inline {
        /// Vertex coordinates
        vertices: Vec<Point3>,
        /// Triangle connectivity
        elements: Vec<[usize; 3]>,
        /// Per-element domain index
        #[serde(default)]
        domain_indices: Vec<usize>,
    },
}

fn default_subdivisions() -> usize {
    2
}
fn default_one() -> f64 {
    1.0
}

/// Function space family and order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpaceConfig {
    /// `"DP"` or `"P"`
    #[serde(default = "default_family")]
    pub family: String,
    /// 0 for DP, 1 for P
    #[serde(default)]
    pub order: usize,
}

fn default_family() -> String {
    "DP".to_string()
}

impl Default for SpaceConfig {
    fn default() -> Self {
        Self {
            family: default_family(),
            order: 0,
        }
    }
}

/// Density on the boundary
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DensityConfig {
    /// Constant value
    Constant {
        /// Real part
        #[serde(default = "default_one")]
        re: f64,
        /// Imaginary part
        #[serde(default)]
        im: f64,
    },
    /// `exp(i k d·x)` with `d` normalized
    PlaneWave {
        /// Wave number
        wavenumber: f64,
        /// Propagation direction
        direction: Point3,
    },
    /// One Cartesian coordinate of the point
    Coordinate {
        /// 0 = x, 1 = y, 2 = z
        axis: usize,
    },
}

impl Default for DensityConfig {
    fn default() -> Self {
        DensityConfig::Constant { re: 1.0, im: 0.0 }
    }
}

/// Kernel selection
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum KernelConfig {
    /// `1/(4πr)`
    Laplace,
    /// `e^{ikr}/(4πr)`
    Helmholtz {
        /// Wave number `k`
        wavenumber: f64,
    },
    /// `e^{-ωr}/(4πr)`
    ModifiedHelmholtz {
        /// Decay rate `ω`
        omega: f64,
    },
}

/// Potential operator selection
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OperatorConfig {
    /// Kernel
    pub kernel: KernelConfig,
    /// Which boundary integral
    #[serde(default = "default_potential")]
    pub potential: PotentialKind,
}

fn default_potential() -> PotentialKind {
    PotentialKind::SingleLayer
}

/// Sampling plane
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PlaneConfig {
    /// Plane extent
    pub limits: PlaneLimits,
    /// Samples along the two parametric axes
    pub dimensions: [usize; 2],
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OutputConfig {
    /// Result file (`.json` or `.vtk`)
    #[serde(default)]
    pub file: Option<PathBuf>,

    /// Also write the grid and density as Gmsh
    #[serde(default)]
    pub mesh_file: Option<PathBuf>,
}

impl OutputConfig {
    /// Output paths with relative entries resolved against `base_dir`
    pub fn resolved(&self, base_dir: &Path) -> OutputConfig {
        OutputConfig {
            file: self.file.as_deref().map(|f| resolve_path(base_dir, f)),
            mesh_file: self.mesh_file.as_deref().map(|f| resolve_path(base_dir, f)),
        }
    }
}

fn resolve_path(base_dir: &Path, file: &Path) -> PathBuf {
    if file.is_absolute() {
        file.to_path_buf()
    } else {
        base_dir.join(file)
    }
}

/// Configuration file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// JSON format
    Json,
    /// TOML format
    Toml,
}

impl ConfigFormat {
    /// Detect format from file extension
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Self> {
        let ext = path.as_ref().extension()?.to_str()?;
        match ext.to_lowercase().as_str() {
            "json" => Some(ConfigFormat::Json),
            "toml" => Some(ConfigFormat::Toml),
            _ => None,
        }
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Serialize error
    #[error("Serialize error: {0}")]
    SerializeError(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

impl From<ConfigError> for BemError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Io(e) => BemError::Io(e),
            ConfigError::ParseError(msg) | ConfigError::SerializeError(msg) => {
                BemError::Parse(msg)
            }
            ConfigError::UnsupportedFormat(msg) => BemError::UnsupportedFormat(msg),
        }
    }
}

/// Load a job configuration from a file
///
/// Format is auto-detected from file extension (.json or .toml)
pub fn load_config<P: AsRef<Path>>(path: P) -> std::result::Result<PlaneJobConfig, ConfigError> {
    let path = path.as_ref();
    let format = ConfigFormat::from_path(path)
        .ok_or_else(|| ConfigError::UnsupportedFormat(path.display().to_string()))?;

    let content = fs::read_to_string(path)?;
    parse_config(&content, format)
}

/// Parse a job configuration from a string
pub fn parse_config(
    content: &str,
    format: ConfigFormat,
) -> std::result::Result<PlaneJobConfig, ConfigError> {
    match format {
        ConfigFormat::Json => {
            serde_json::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
        }
        ConfigFormat::Toml => {
            toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
        }
    }
}

/// Save a job configuration to a file
pub fn save_config<P: AsRef<Path>>(
    config: &PlaneJobConfig,
    path: P,
) -> std::result::Result<(), ConfigError> {
    let path = path.as_ref();
    let format = ConfigFormat::from_path(path)
        .ok_or_else(|| ConfigError::UnsupportedFormat(path.display().to_string()))?;

    let content = serialize_config(config, format)?;
    fs::write(path, content)?;
    Ok(())
}

/// Serialize a job configuration to a string
pub fn serialize_config(
    config: &PlaneJobConfig,
    format: ConfigFormat,
) -> std::result::Result<String, ConfigError> {
    match format {
        ConfigFormat::Json => serde_json::to_string_pretty(config)
            .map_err(|e| ConfigError::SerializeError(e.to_string())),
        ConfigFormat::Toml => {
            toml::to_string_pretty(config).map_err(|e| ConfigError::SerializeError(e.to_string()))
        }
    }
}

impl Default for PlaneJobConfig {
    /// Laplace single layer of a unit-density unit sphere on the `z = 0` plane
    fn default() -> Self {
        Self {
            description: "Laplace single layer of a unit sphere".to_string(),
            grid: GridConfig::Sphere {
                subdivisions: 3,
                radius: 1.0,
                origin: [0.0; 3],
            },
            space: SpaceConfig::default(),
            density: DensityConfig::default(),
            operator: OperatorConfig {
                kernel: KernelConfig::Laplace,
                potential: PotentialKind::SingleLayer,
            },
            plane: PlaneConfig {
                limits: PlaneLimits::horizontal(-2.0, 2.0, -2.0, 2.0, 0.0),
                dimensions: [41, 41],
            },
            parameters: GlobalParameters::default(),
            output: OutputConfig::default(),
        }
    }
}

impl GridConfig {
    /// Build the grid; relative mesh paths are resolved against `base_dir`
    pub fn build(&self, base_dir: &Path) -> Result<Grid> {
        match self {
            GridConfig::Sphere {
                subdivisions,
                radius,
                origin,
            } => grid_from_sphere(*subdivisions, *radius, *origin),
            GridConfig::UvSphere {
                radius,
                n_theta,
                n_phi,
            } => uv_sphere_grid(*radius, *n_theta, *n_phi),
            GridConfig::Structured {
                lower_left,
                upper_right,
                subdivisions,
            } => structured_grid(
                (lower_left[0], lower_left[1]),
                (upper_right[0], upper_right[1]),
                (subdivisions[0], subdivisions[1]),
            ),
            GridConfig::Gmsh { file } => read_gmsh(resolve_path(base_dir, file)),
            GridConfig::Inline {
                vertices,
                elements,
                domain_indices,
            } => grid_from_element_data(vertices, elements, domain_indices),
        }
    }
}

impl DensityConfig {
    /// Interpolate the density into `space`
    pub fn build(&self, space: Arc<FunctionSpace>) -> Result<GridFunction> {
        match *self {
            DensityConfig::Constant { re, im } => {
                Ok(GridFunction::constant(space, Complex64::new(re, im)))
            }
            DensityConfig::PlaneWave {
                wavenumber,
                direction,
            } => {
                let len = dot(&direction, &direction).sqrt();
                if !(len.is_finite() && len > 0.0) {
                    return Err(BemError::InvalidParameters(format!(
                        "plane wave direction must be non-zero, got {:?}",
                        direction
                    )));
                }
                let d = direction.map(|c| c / len);
                Ok(GridFunction::from_fn(space, |x, _, _| {
                    Complex64::new(0.0, wavenumber * dot(&d, x)).exp()
                }))
            }
            DensityConfig::Coordinate { axis } => {
                if axis > 2 {
                    return Err(BemError::InvalidParameters(format!(
                        "coordinate axis must be 0, 1 or 2, got {}",
                        axis
                    )));
                }
                Ok(GridFunction::from_fn(space, |x, _, _| {
                    Complex64::new(x[axis], 0.0)
                }))
            }
        }
    }
}

impl OperatorConfig {
    /// Create the potential operator
    pub fn build(&self, context: &Context) -> Result<Box<dyn PotentialOperator>> {
        let op: Box<dyn PotentialOperator> = match self.kernel {
            KernelConfig::Laplace => {
                Box::new(KernelPotential::new(LaplaceKernel, self.potential, context))
            }
            KernelConfig::Helmholtz { wavenumber } => {
                check_kernel_parameter("wavenumber", wavenumber)?;
                Box::new(KernelPotential::new(
                    HelmholtzKernel::new(wavenumber),
                    self.potential,
                    context,
                ))
            }
            KernelConfig::ModifiedHelmholtz { omega } => {
                check_kernel_parameter("omega", omega)?;
                Box::new(KernelPotential::new(
                    ModifiedHelmholtzKernel::new(omega),
                    self.potential,
                    context,
                ))
            }
        };
        Ok(op)
    }
}

fn check_kernel_parameter(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(BemError::InvalidParameters(format!(
            "{} must be finite and >= 0, got {}",
            name, value
        )))
    }
}

/// Everything a job needs, built from its configuration
pub struct PlaneJob {
    /// Density on the boundary
    pub density: GridFunction,
    /// Potential operator
    pub operator: Box<dyn PotentialOperator>,
    /// Parameters the job runs with
    pub parameters: GlobalParameters,
    /// Plane configuration
    pub plane: PlaneConfig,
}

impl PlaneJob {
    /// Sample the potential on the plane
    pub fn run(&self) -> Result<PlaneEvaluation> {
        evaluate_potential_on_plane(
            self.operator.as_ref(),
            &self.density,
            &self.plane.limits,
            (self.plane.dimensions[0], self.plane.dimensions[1]),
            Some(&self.parameters.evaluation),
            None,
        )
    }
}

impl PlaneJobConfig {
    /// Build grid, space, density and operator
    pub fn build(&self, base_dir: &Path) -> Result<PlaneJob> {
        self.parameters.validate()?;
        self.plane.limits.validate()?;

        let grid = Arc::new(self.grid.build(base_dir)?);
        log::info!(
            "Grid: {} vertices, {} elements, area {:.4}",
            grid.vertex_count(),
            grid.element_count(),
            grid.surface_area()
        );

        let space = function_space(grid, &self.space.family, self.space.order)?;
        let density = self.density.build(space)?;
        let context = Context::from_parameters(&self.parameters)?;
        let operator = self.operator.build(&context)?;

        Ok(PlaneJob {
            density,
            operator,
            parameters: self.parameters,
            plane: self.plane,
        })
    }
}
