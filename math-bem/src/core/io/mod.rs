//! Input/Output: job configuration, Gmsh meshes and result export

pub mod config;
pub mod export;
pub mod gmsh;

pub use config::*;
pub use export::*;
pub use gmsh::*;
