//! Solution output and restart input.
//!
//! - **VTU output** (`vtu`): one `<Piece>` per element holding its
//!   `(p+3)^d` plot grid, preceded by `TIME` and optional `IBLANK_CELL`
//!   comments.
//! - **Restart input** (`restart`): reads the same layout back, recovering
//!   the stored order from each piece's sub-cell count.
//!
//! # File layout
//!
//! ```text
//! <?xml version="1.0"?>
//! <VTKFile type="UnstructuredGrid" version="0.1" byte_order="LittleEndian">
//! <!-- TIME 1.2500000000e0 -->
//! <!-- IBLANK_CELL 1 1 -1 0 -->
//!   <UnstructuredGrid>
//!     <Piece NumberOfPoints="25" NumberOfCells="16">
//!       <PointData>
//!         <DataArray type="Float64" Name="Density" format="ascii">
//!           1.0 1.0 ...
//!         </DataArray>
//!         ...
//! ```
//!
//! Plot-grid values are ordered x fastest. The interior `(p+1)^d` points of
//! the grid are the solution points.

mod restart;
mod vtu;

pub use restart::{read_restart, read_restart_file, RestartData, RestartPiece};
pub use vtu::{write_vtu, write_vtu_file};
