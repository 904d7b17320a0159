//! Restart input from VTU files written by [`super::write_vtu`].
//!
//! The stored order of each piece comes from its sub-cell count
//! (`(p+2)^d` cells). Only the interior `(p+1)^d` plot points, which are the
//! solution points, are kept; the caller interpolates when the stored order
//! differs from the run order.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::{debug, warn};

use crate::config::Equation;
use crate::error::{FrError, Result};
use crate::mesh::CellStatus;

/// Primitive data of one element at its stored order's solution points.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RestartPiece {
    /// Stored polynomial order
    pub order: usize,
    /// Density (or the transported scalar), x fastest
    pub density: Vec<f64>,
    /// Velocity (empty for scalar equations)
    pub velocity: Vec<[f64; 3]>,
    /// Pressure (empty for scalar equations)
    pub pressure: Vec<f64>,
}

/// Contents of a restart file.
#[derive(Clone, Debug, Default)]
pub struct RestartData {
    /// Simulation time from the `TIME` comment
    pub time: Option<f64>,
    /// Cell status from the `IBLANK_CELL` comment
    pub iblank: Option<Vec<CellStatus>>,
    /// One piece per element, in element order
    pub pieces: Vec<RestartPiece>,
}

/// Open and parse a restart file.
pub fn read_restart_file(
    path: impl AsRef<Path>,
    n_dims: usize,
    equation: Equation,
) -> Result<RestartData> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| FrError::RestartFileMissing {
        path: path.to_path_buf(),
        source,
    })?;
    let data = read_restart(BufReader::new(file), n_dims, equation)?;
    debug!(path = %path.display(), pieces = data.pieces.len(), "read restart file");
    Ok(data)
}

/// Parse restart data from a reader.
pub fn read_restart<R: BufRead>(reader: R, n_dims: usize, equation: Equation) -> Result<RestartData> {
    let lines: Vec<String> = reader.lines().collect::<std::io::Result<_>>()?;
    let mut out = RestartData::default();

    let mut pos = 0;
    let mut found_grid = false;
    while pos < lines.len() {
        let line = lines[pos].trim();
        pos += 1;
        if line.starts_with("<UnstructuredGrid") {
            found_grid = true;
            break;
        }
        if !line.starts_with("<!--") {
            continue;
        }
        let mut tokens = line
            .trim_start_matches("<!--")
            .trim_end_matches("-->")
            .split_whitespace();
        match tokens.next() {
            Some("TIME") => out.time = tokens.next().and_then(|t| t.parse().ok()),
            Some("IBLANK_CELL") => {
                let status = tokens
                    .map(|t| t.parse::<i32>().ok().and_then(CellStatus::from_iblank))
                    .collect::<Option<Vec<_>>>()
                    .ok_or_else(|| FrError::RestartMalformed {
                        element: 0,
                        reason: "invalid IBLANK_CELL value".into(),
                    })?;
                out.iblank = Some(status);
            }
            _ => {}
        }
    }
    if !found_grid {
        return Err(FrError::RestartMissingTag("UnstructuredGrid"));
    }
    if out.time.is_none() {
        warn!("restart file has no TIME comment; starting from t = 0");
    }

    let flow = equation == Equation::NavierStokes;
    while pos < lines.len() {
        let line = lines[pos].trim();
        pos += 1;
        if !line.starts_with("<Piece") {
            continue;
        }
        let element = out.pieces.len();
        let (piece, next) = read_piece(&lines, pos, line, element, n_dims, flow)?;
        out.pieces.push(piece);
        pos = next;
    }
    Ok(out)
}

/// Value of `name="..."` in a tag line.
fn attribute<'a>(line: &'a str, name: &str) -> Option<&'a str> {
    let key = format!("{name}=\"");
    let start = line.find(&key)? + key.len();
    let len = line[start..].find('"')?;
    Some(&line[start..start + len])
}

fn read_piece(
    lines: &[String],
    mut pos: usize,
    header: &str,
    element: usize,
    n_dims: usize,
    flow: bool,
) -> Result<(RestartPiece, usize)> {
    let malformed = |reason: String| FrError::RestartMalformed { element, reason };
    let n_cells: usize = attribute(header, "NumberOfCells")
        .and_then(|v| v.parse().ok())
        .ok_or_else(|| malformed("missing NumberOfCells".into()))?;
    let order = order_from_cells(n_cells, n_dims)
        .ok_or_else(|| malformed(format!("{n_cells} cells is not a plot grid")))?;
    let n1 = order + 3;

    let mut piece = RestartPiece {
        order,
        ..Default::default()
    };
    let mut have_density = false;
    while pos < lines.len() {
        let line = lines[pos].trim();
        pos += 1;
        if line.starts_with("</Piece") {
            break;
        }
        if !line.starts_with("<DataArray") {
            continue;
        }
        let Some(name) = attribute(line, "Name") else {
            continue;
        };
        let Some(data_line) = lines.get(pos) else {
            break;
        };
        match name {
            "Density" | "Velocity" | "Pressure" => {
                let values = data_line
                    .split_whitespace()
                    .map(str::parse::<f64>)
                    .collect::<std::result::Result<Vec<_>, _>>()
                    .map_err(|e| malformed(format!("{name}: {e}")))?;
                let n_comp = if name == "Velocity" { 3 } else { 1 };
                let interior = interior_values(&values, n1, n_dims, n_comp)
                    .ok_or_else(|| malformed(format!("{name} has {} values", values.len())))?;
                match name {
                    "Density" => {
                        piece.density = interior;
                        have_density = true;
                    }
                    "Velocity" => {
                        piece.velocity = interior.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect();
                    }
                    _ => piece.pressure = interior,
                }
                pos += 1;
            }
            _ => {}
        }
    }

    if !have_density {
        return Err(FrError::RestartMissingTag("Density"));
    }
    if flow && piece.velocity.is_empty() {
        return Err(FrError::RestartMissingTag("Velocity"));
    }
    if flow && piece.pressure.is_empty() {
        return Err(FrError::RestartMissingTag("Pressure"));
    }
    Ok((piece, pos))
}

/// Stored order from the sub-cell count `(p+2)^d`.
fn order_from_cells(n_cells: usize, n_dims: usize) -> Option<usize> {
    let root = (n_cells as f64).powf(1.0 / n_dims as f64).round() as usize;
    (root >= 2 && root.pow(n_dims as u32) == n_cells).then(|| root - 2)
}

/// Drop the boundary layer of an `n1^d` grid, keeping `n_comp` values per point.
fn interior_values(values: &[f64], n1: usize, n_dims: usize, n_comp: usize) -> Option<Vec<f64>> {
    if values.len() != n1.pow(n_dims as u32) * n_comp {
        return None;
    }
    let inner = 1..n1 - 1;
    let nk = if n_dims == 3 { n1 } else { 1 };
    let mut out = Vec::with_capacity((n1 - 2).pow(n_dims as u32) * n_comp);
    for k in 0..nk {
        if n_dims == 3 && !inner.contains(&k) {
            continue;
        }
        for j in inner.clone() {
            for i in inner.clone() {
                let p = i + n1 * (j + n1 * k);
                out.extend_from_slice(&values[p * n_comp..(p + 1) * n_comp]);
            }
        }
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn grid_line(n1: usize, n_dims: usize, n_comp: usize) -> String {
        let n = n1.pow(n_dims as u32);
        (0..n * n_comp)
            .map(|i| format!("{}", i / n_comp))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn piece(order: usize) -> String {
        let n1 = order + 3;
        let cells = (order + 2) * (order + 2);
        format!(
            "<Piece NumberOfPoints=\"{}\" NumberOfCells=\"{cells}\">\n\
             <PointData>\n\
             <DataArray type=\"Float64\" Name=\"Density\" format=\"ascii\">\n{}\n</DataArray>\n\
             <DataArray type=\"Float64\" Name=\"Velocity\" NumberOfComponents=\"3\" format=\"ascii\">\n{}\n</DataArray>\n\
             <DataArray type=\"Float64\" Name=\"Pressure\" format=\"ascii\">\n{}\n</DataArray>\n\
             </PointData>\n</Piece>\n",
            n1 * n1,
            grid_line(n1, 2, 1),
            grid_line(n1, 2, 3),
            grid_line(n1, 2, 1),
        )
    }

    #[test]
    fn test_order_from_cells() {
        assert_eq!(order_from_cells(16, 2), Some(2));
        assert_eq!(order_from_cells(27, 3), Some(1));
        assert_eq!(order_from_cells(8, 3), Some(0));
        assert_eq!(order_from_cells(10, 2), None);
    }

    #[test]
    fn test_interior_2d() {
        // 4x4 grid: interior points 5, 6, 9, 10
        let values: Vec<f64> = (0..16).map(f64::from).collect();
        assert_eq!(interior_values(&values, 4, 2, 1).unwrap(), vec![5.0, 6.0, 9.0, 10.0]);
    }

    #[test]
    fn test_interior_3d() {
        let values: Vec<f64> = (0..27).map(f64::from).collect();
        assert_eq!(interior_values(&values, 3, 3, 1).unwrap(), vec![13.0]);
    }

    #[test]
    fn test_read_two_pieces() {
        let text = format!(
            "<?xml version=\"1.0\"?>\n<!-- TIME 2.5 -->\n<!-- IBLANK_CELL 1 -1 -->\n<UnstructuredGrid>\n{}{}</UnstructuredGrid>\n",
            piece(1),
            piece(2)
        );
        let data = read_restart(text.as_bytes(), 2, Equation::NavierStokes).unwrap();
        assert_relative_eq!(data.time.unwrap(), 2.5);
        assert_eq!(data.iblank.unwrap(), vec![CellStatus::Normal, CellStatus::Fringe]);
        assert_eq!(data.pieces.len(), 2);
        assert_eq!(data.pieces[0].order, 1);
        assert_eq!(data.pieces[0].density, vec![5.0, 6.0, 9.0, 10.0]);
        assert_eq!(data.pieces[0].velocity[0], [5.0, 5.0, 5.0]);
        assert_eq!(data.pieces[1].order, 2);
        assert_eq!(data.pieces[1].pressure.len(), 9);
    }

    #[test]
    fn test_missing_grid_tag() {
        let text = "<!-- TIME 1.0 -->\n<Piece NumberOfCells=\"9\">\n";
        assert!(matches!(
            read_restart(text.as_bytes(), 2, Equation::NavierStokes),
            Err(FrError::RestartMissingTag("UnstructuredGrid"))
        ));
    }

    #[test]
    fn test_missing_time_is_not_fatal() {
        let text = format!("<UnstructuredGrid>\n{}", piece(0));
        let data = read_restart(text.as_bytes(), 2, Equation::NavierStokes).unwrap();
        assert!(data.time.is_none());
        assert_eq!(data.pieces[0].density, vec![4.0]);
    }

    #[test]
    fn test_missing_pressure_is_error_for_flow() {
        let text = "<UnstructuredGrid>\n<Piece NumberOfPoints=\"9\" NumberOfCells=\"4\">\n\
                    <DataArray type=\"Float64\" Name=\"Density\" format=\"ascii\">\n1 1 1 1 1 1 1 1 1\n</DataArray>\n</Piece>\n";
        assert!(matches!(
            read_restart(text.as_bytes(), 2, Equation::NavierStokes),
            Err(FrError::RestartMissingTag("Velocity"))
        ));
        let data = read_restart(text.as_bytes(), 2, Equation::AdvectionDiffusion).unwrap();
        assert_eq!(data.pieces[0].density, vec![1.0]);
    }

    #[test]
    fn test_missing_file() {
        let err = read_restart_file("/nonexistent/restart.vtu", 2, Equation::NavierStokes);
        assert!(matches!(err, Err(FrError::RestartFileMissing { .. })));
    }
}
