//! VTU (XML UnstructuredGrid) output of element plot grids.
//!
//! Each element is written as its own `<Piece>`: the `(p+3)^d` plot points
//! and `(p+2)^d` linear sub-cells (VTK_QUAD or VTK_HEXAHEDRON).

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::info;

use crate::element::PlotData;
use crate::error::Result;
use crate::mesh::CellStatus;

const VTK_QUAD: u8 = 9;
const VTK_HEXAHEDRON: u8 = 12;

/// XML writer with indentation tracking.
struct VtuWriter<W: Write> {
    writer: BufWriter<W>,
    indent: usize,
}

impl<W: Write> VtuWriter<W> {
    fn new(writer: W) -> Self {
        Self {
            writer: BufWriter::new(writer),
            indent: 0,
        }
    }

    fn write_indent(&mut self) -> std::io::Result<()> {
        for _ in 0..self.indent {
            write!(self.writer, "  ")?;
        }
        Ok(())
    }

    fn write_header(&mut self, time: f64, iblank: Option<&[CellStatus]>) -> std::io::Result<()> {
        writeln!(self.writer, "<?xml version=\"1.0\"?>")?;
        writeln!(
            self.writer,
            "<VTKFile type=\"UnstructuredGrid\" version=\"0.1\" byte_order=\"LittleEndian\">"
        )?;
        writeln!(self.writer, "<!-- TIME {:.16e} -->", time)?;
        if let Some(status) = iblank {
            write!(self.writer, "<!-- IBLANK_CELL")?;
            for s in status {
                write!(self.writer, " {}", s.iblank())?;
            }
            writeln!(self.writer, " -->")?;
        }
        self.indent += 1;
        Ok(())
    }

    fn write_footer(&mut self) -> std::io::Result<()> {
        self.indent -= 1;
        writeln!(self.writer, "</VTKFile>")?;
        self.writer.flush()?;
        Ok(())
    }

    fn start_element(&mut self, name: &str, attrs: &[(&str, &str)]) -> std::io::Result<()> {
        self.write_indent()?;
        write!(self.writer, "<{}", name)?;
        for (key, value) in attrs {
            write!(self.writer, " {}=\"{}\"", key, value)?;
        }
        writeln!(self.writer, ">")?;
        self.indent += 1;
        Ok(())
    }

    fn end_element(&mut self, name: &str) -> std::io::Result<()> {
        self.indent -= 1;
        self.write_indent()?;
        writeln!(self.writer, "</{}>", name)?;
        Ok(())
    }

    /// Data array with all values on the line after the opening tag.
    fn write_data_array<T: std::fmt::Display>(
        &mut self,
        ty: &str,
        name: Option<&str>,
        data: &[T],
        components: usize,
    ) -> std::io::Result<()> {
        self.write_indent()?;
        write!(self.writer, "<DataArray type=\"{}\"", ty)?;
        if let Some(name) = name {
            write!(self.writer, " Name=\"{}\"", name)?;
        }
        if components > 1 {
            write!(self.writer, " NumberOfComponents=\"{}\"", components)?;
        }
        writeln!(self.writer, " format=\"ascii\">")?;

        self.indent += 1;
        self.write_indent()?;
        for (i, v) in data.iter().enumerate() {
            if i > 0 {
                write!(self.writer, " ")?;
            }
            write!(self.writer, "{}", v)?;
        }
        writeln!(self.writer)?;
        self.indent -= 1;

        self.write_indent()?;
        writeln!(self.writer, "</DataArray>")?;
        Ok(())
    }

    fn write_piece(&mut self, plot: &PlotData) -> std::io::Result<()> {
        let n1 = plot.order + 3;
        let cells = sub_cells(n1, plot.n_dims);
        let n_points = plot.points.len().to_string();
        let n_cells = cells.len().to_string();
        self.start_element(
            "Piece",
            &[
                ("NumberOfPoints", n_points.as_str()),
                ("NumberOfCells", n_cells.as_str()),
            ],
        )?;

        self.start_element("PointData", &[])?;
        let density: Vec<Sci> = plot.density.iter().map(|&v| Sci(v)).collect();
        self.write_data_array("Float64", Some("Density"), &density, 1)?;
        let velocity: Vec<Sci> = plot.velocity.iter().flatten().map(|&v| Sci(v)).collect();
        self.write_data_array("Float64", Some("Velocity"), &velocity, 3)?;
        let pressure: Vec<Sci> = plot.pressure.iter().map(|&v| Sci(v)).collect();
        self.write_data_array("Float64", Some("Pressure"), &pressure, 1)?;
        let entropy: Vec<Sci> = plot.entropy_err.iter().map(|&v| Sci(v)).collect();
        self.write_data_array("Float64", Some("EntropyErr"), &entropy, 1)?;
        self.end_element("PointData")?;

        self.start_element("Points", &[])?;
        let coords: Vec<Sci> = plot
            .points
            .iter()
            .flat_map(|p| [Sci(p.x), Sci(p.y), Sci(p.z)])
            .collect();
        self.write_data_array("Float64", None, &coords, 3)?;
        self.end_element("Points")?;

        self.start_element("Cells", &[])?;
        let nv = if plot.n_dims == 2 { 4 } else { 8 };
        let connectivity: Vec<usize> = cells.iter().flatten().copied().collect();
        self.write_data_array("Int32", Some("connectivity"), &connectivity, 1)?;
        let offsets: Vec<usize> = (1..=cells.len()).map(|i| i * nv).collect();
        self.write_data_array("Int32", Some("offsets"), &offsets, 1)?;
        let ty = if plot.n_dims == 2 { VTK_QUAD } else { VTK_HEXAHEDRON };
        self.write_data_array("UInt8", Some("types"), &vec![ty; cells.len()], 1)?;
        self.end_element("Cells")?;

        self.end_element("Piece")
    }
}

/// `{:.16e}` formatting for floats.
struct Sci(f64);

impl std::fmt::Display for Sci {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.16e}", self.0)
    }
}

/// Linear sub-cells of an `n1^d` point grid (x fastest).
fn sub_cells(n1: usize, n_dims: usize) -> Vec<Vec<usize>> {
    let id = |i: usize, j: usize, k: usize| i + n1 * (j + n1 * k);
    let mut cells = Vec::new();
    let nk = if n_dims == 3 { n1 - 1 } else { 1 };
    for k in 0..nk {
        for j in 0..n1 - 1 {
            for i in 0..n1 - 1 {
                let mut c = vec![id(i, j, k), id(i + 1, j, k), id(i + 1, j + 1, k), id(i, j + 1, k)];
                if n_dims == 3 {
                    c.extend([
                        id(i, j, k + 1),
                        id(i + 1, j, k + 1),
                        id(i + 1, j + 1, k + 1),
                        id(i, j + 1, k + 1),
                    ]);
                }
                cells.push(c);
            }
        }
    }
    cells
}

/// Write element plot data as one VTU document.
pub fn write_vtu<W: Write>(
    writer: W,
    plots: &[PlotData],
    time: f64,
    iblank: Option<&[CellStatus]>,
) -> Result<()> {
    let mut w = VtuWriter::new(writer);
    w.write_header(time, iblank)?;
    w.start_element("UnstructuredGrid", &[])?;
    for plot in plots {
        w.write_piece(plot)?;
    }
    w.end_element("UnstructuredGrid")?;
    w.write_footer()?;
    Ok(())
}

/// Write element plot data to `path`.
pub fn write_vtu_file(
    path: impl AsRef<Path>,
    plots: &[PlotData],
    time: f64,
    iblank: Option<&[CellStatus]>,
) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)?;
    write_vtu(file, plots, time, iblank)?;
    info!(path = %path.display(), n_elements = plots.len(), time, "wrote VTU output");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;

    fn plot(order: usize) -> PlotData {
        let n1 = order + 3;
        let n = n1 * n1;
        PlotData {
            n_dims: 2,
            order,
            points: (0..n)
                .map(|i| Point::new_2d((i % n1) as f64, (i / n1) as f64))
                .collect(),
            density: vec![1.0; n],
            velocity: vec![[0.5, 0.0, 0.0]; n],
            pressure: vec![2.0; n],
            entropy_err: vec![0.0; n],
        }
    }

    #[test]
    fn test_sub_cell_counts() {
        assert_eq!(sub_cells(4, 2).len(), 9);
        assert_eq!(sub_cells(4, 3).len(), 27);
        assert_eq!(sub_cells(3, 2)[0], vec![0, 1, 4, 3]);
    }

    #[test]
    fn test_vtu_layout() {
        let mut buf = Vec::new();
        let status = [CellStatus::Normal, CellStatus::Fringe];
        write_vtu(&mut buf, &[plot(1), plot(1)], 0.5, Some(&status)).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("<!-- TIME 5.0000000000000000e-1 -->"));
        assert!(text.contains("<!-- IBLANK_CELL 1 -1 -->"));
        assert_eq!(text.matches("<Piece NumberOfPoints=\"16\" NumberOfCells=\"9\">").count(), 2);
        assert!(text.contains("Name=\"Velocity\" NumberOfComponents=\"3\""));
        assert!(text.trim_end().ends_with("</VTKFile>"));
    }
}
