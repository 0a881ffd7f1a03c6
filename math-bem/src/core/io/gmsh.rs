//! Reader and writer for ASCII Gmsh meshes (MSH 2.2)
//!
//! ## Format Overview
//!
//! - `$MeshFormat` holds `version file-type data-size`; only ASCII 2.x is read
//! - `$Nodes`: a count line, then `id x y z` per node
//! - `$Elements`: a count line, then `id type n-tags tags... nodes...`
//! - Only type 2 (3-node triangle) elements become grid elements; the first
//!   tag (physical group) becomes the domain index
//! - `$ElementData` / `$NodeData` blocks are written for grid functions

use std::collections::HashMap;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use ndarray::Array2;

use crate::core::error::{BemError, Result};
use crate::core::grid::Grid;
use crate::core::grid_function::GridFunction;
use crate::core::space::SpaceKind;

/// Gmsh element type of a 3-node triangle
const GMSH_TRIANGLE: usize = 2;

/// Read a Gmsh file into a grid
pub fn read_gmsh<P: AsRef<Path>>(path: P) -> Result<Grid> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;
    let grid = parse_gmsh(&content)?;
    log::debug!(
        "Read {} vertices and {} triangles from {}",
        grid.vertex_count(),
        grid.element_count(),
        path.display()
    );
    Ok(grid)
}

/// Parse Gmsh MSH 2.2 content
pub fn parse_gmsh(content: &str) -> Result<Grid> {
    let lines: Vec<&str> = content.lines().map(str::trim).collect();

    let mut node_ids: HashMap<usize, usize> = HashMap::new();
    let mut coords: Vec<f64> = Vec::new();
    let mut raw_elements: Vec<([usize; 3], usize)> = Vec::new();
    let mut skipped = 0usize;

    let mut i = 0;
    while i < lines.len() {
        match lines[i] {
            "$MeshFormat" => {
                let header = lines.get(i + 1).copied().unwrap_or("");
                check_format(header)?;
                i += 2;
            }
            "$Nodes" => {
                let count = parse_count(&lines, i + 1, "$Nodes")?;
                for (offset, line) in section_lines(&lines, i + 2, count, "$Nodes")?
                    .iter()
                    .enumerate()
                {
                    let fields: Vec<&str> = line.split_whitespace().collect();
                    if fields.len() < 4 {
                        return Err(parse_error(i + 3 + offset, "expected `id x y z`"));
                    }
                    let id = parse_field::<usize>(fields[0], i + 3 + offset)?;
                    if node_ids.insert(id, node_ids.len()).is_some() {
                        return Err(parse_error(
                            i + 3 + offset,
                            &format!("duplicate node id {}", id),
                        ));
                    }
                    for field in &fields[1..4] {
                        coords.push(parse_field::<f64>(field, i + 3 + offset)?);
                    }
                }
                i += 2 + count;
            }
            "$Elements" => {
                let count = parse_count(&lines, i + 1, "$Elements")?;
                for (offset, line) in section_lines(&lines, i + 2, count, "$Elements")?
                    .iter()
                    .enumerate()
                {
                    let line_no = i + 3 + offset;
                    let fields = line
                        .split_whitespace()
                        .map(|f| parse_field::<usize>(f, line_no))
                        .collect::<Result<Vec<_>>>()?;
                    if fields.len() < 3 {
                        return Err(parse_error(line_no, "truncated element"));
                    }
                    let element_type = fields[1];
                    let n_tags = fields[2];
                    if element_type != GMSH_TRIANGLE {
                        skipped += 1;
                        continue;
                    }
                    if fields.len().checked_sub(6) != Some(n_tags) {
                        return Err(parse_error(line_no, "triangle needs exactly 3 nodes"));
                    }
                    let domain = if n_tags > 0 { fields[3] } else { 0 };
                    let nodes = &fields[3 + n_tags..];
                    raw_elements.push(([nodes[0], nodes[1], nodes[2]], domain));
                }
                i += 2 + count;
            }
            _ => i += 1,
        }
    }

    if skipped > 0 {
        log::debug!("Ignored {} non-triangle Gmsh elements", skipped);
    }

    let mut elements = Vec::with_capacity(raw_elements.len());
    let mut domains = Vec::with_capacity(raw_elements.len());
    for (nodes, domain) in raw_elements {
        let mut element = [0usize; 3];
        for (slot, id) in element.iter_mut().zip(nodes) {
            *slot = *node_ids.get(&id).ok_or_else(|| {
                BemError::Parse(format!("element references unknown node {}", id))
            })?;
        }
        elements.push(element);
        domains.push(domain);
    }

    let vertices = Array2::from_shape_vec((node_ids.len(), 3), coords)
        .map_err(|e| BemError::Parse(e.to_string()))?;
    Grid::new(vertices, elements, domains)
}

/// Write a grid (and optionally a grid function on it) in Gmsh MSH 2.2
///
/// DP0 data goes into `$ElementData`, P1 data into `$NodeData`; real and
/// imaginary parts are written as two separate views.
pub fn write_gmsh(grid: &Grid, data: Option<(&str, &GridFunction)>) -> Result<String> {
    if let Some((_, function)) = data {
        if !std::ptr::eq(function.space().grid().as_ref(), grid) {
            return Err(BemError::InvalidSpace(
                "grid function is defined on a different grid".to_string(),
            ));
        }
    }

    let mut out = String::new();
    write_mesh(&mut out, grid, data).map_err(|e| BemError::Io(std::io::Error::other(e)))?;
    Ok(out)
}

fn write_mesh(
    out: &mut String,
    grid: &Grid,
    data: Option<(&str, &GridFunction)>,
) -> std::fmt::Result {
    writeln!(out, "$MeshFormat\n2.2 0 8\n$EndMeshFormat")?;

    writeln!(out, "$Nodes\n{}", grid.vertex_count())?;
    for (i, v) in grid.vertices().rows().into_iter().enumerate() {
        writeln!(out, "{} {} {} {}", i + 1, v[0], v[1], v[2])?;
    }
    writeln!(out, "$EndNodes")?;

    writeln!(out, "$Elements\n{}", grid.element_count())?;
    for (e, (nodes, domain)) in grid
        .elements()
        .iter()
        .zip(grid.domain_indices())
        .enumerate()
    {
        writeln!(
            out,
            "{} {} 2 {} {} {} {} {}",
            e + 1,
            GMSH_TRIANGLE,
            domain,
            domain,
            nodes[0] + 1,
            nodes[1] + 1,
            nodes[2] + 1
        )?;
    }
    writeln!(out, "$EndElements")?;

    let Some((name, function)) = data else {
        return Ok(());
    };
    let section = match function.space().kind() {
        SpaceKind::Dp0 => "ElementData",
        SpaceKind::P1 => "NodeData",
    };
    let coefficients = function.coefficients();
    for (suffix, imaginary) in [("real", false), ("imag", true)] {
        // string tag, real tag (time), integer tags (step, components, count)
        writeln!(
            out,
            "${}\n1\n\"{} ({})\"\n1\n0.0\n3\n0\n1\n{}",
            section,
            name,
            suffix,
            coefficients.len()
        )?;
        for (k, c) in coefficients.iter().enumerate() {
            let value = if imaginary { c.im } else { c.re };
            writeln!(out, "{} {}", k + 1, value)?;
        }
        writeln!(out, "$End{}", section)?;
    }
    Ok(())
}

/// Write a grid (and optional data) to a Gmsh file
pub fn save_gmsh<P: AsRef<Path>>(
    path: P,
    grid: &Grid,
    data: Option<(&str, &GridFunction)>,
) -> Result<()> {
    fs::write(path, write_gmsh(grid, data)?)?;
    Ok(())
}

fn check_format(header: &str) -> Result<()> {
    let fields: Vec<&str> = header.split_whitespace().collect();
    let version = fields.first().copied().unwrap_or("");
    if !version.starts_with('2') {
        return Err(BemError::UnsupportedFormat(format!(
            "Gmsh version {:?}, only 2.x is supported",
            version
        )));
    }
    if fields.get(1).copied() != Some("0") {
        return Err(BemError::UnsupportedFormat(
            "binary Gmsh files are not supported".to_string(),
        ));
    }
    Ok(())
}

fn parse_count(lines: &[&str], index: usize, section: &str) -> Result<usize> {
    lines
        .get(index)
        .and_then(|l| l.parse::<usize>().ok())
        .ok_or_else(|| BemError::Parse(format!("missing entry count after {}", section)))
}

fn section_lines<'a>(
    lines: &'a [&'a str],
    start: usize,
    count: usize,
    section: &str,
) -> Result<&'a [&'a str]> {
    start
        .checked_add(count)
        .and_then(|end| lines.get(start..end))
        .ok_or_else(|| BemError::Parse(format!("{} section is truncated", section)))
}

fn parse_field<T: std::str::FromStr>(field: &str, line_no: usize) -> Result<T> {
    field
        .parse::<T>()
        .map_err(|_| parse_error(line_no, &format!("cannot parse {:?}", field)))
}

fn parse_error(line_no: usize, message: &str) -> BemError {
    BemError::Parse(format!("line {}: {}", line_no, message))
}
