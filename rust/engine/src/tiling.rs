// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Tile grids for unitized elements.

use section_geometry::{box_mesh, calculate_normals, Mesh, Vector3};
use tracing::debug;

use crate::assembly::{AssemblyFrame, Element, UnitCell};
use crate::error::{Error, Result};
use crate::material::SurfaceMaterial;
use crate::solid::{NodeMetadata, Solid};

/// Upper bound on the tiles of one unitized element.
pub const MAX_TILE_CELLS: usize = 250_000;

/// Number of cells needed to cover the assembly footprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileGrid {
    pub rows: usize,
    pub cols: usize,
}

impl TileGrid {
    /// Smallest grid of `cell`s covering `frame`; never less than 1 x 1.
    pub fn fit(frame: &AssemblyFrame, cell: &UnitCell) -> Self {
        let count = |extent: f64, step: f64| (extent / step).ceil().max(1.0) as usize;
        Self {
            rows: count(frame.height, cell.height),
            cols: count(frame.width, cell.width),
        }
    }

    /// Total cells, or `None` if the product does not fit in `usize`.
    pub fn cell_count(&self) -> Option<usize> {
        self.rows.checked_mul(self.cols)
    }

    /// Cell count, rejecting grids larger than [`MAX_TILE_CELLS`].
    pub fn bounded_cell_count(&self) -> Result<usize> {
        match self.cell_count() {
            Some(cells) if cells <= MAX_TILE_CELLS => Ok(cells),
            _ => Err(Error::malformed(format!(
                "unit grid of {} x {} cells exceeds {MAX_TILE_CELLS}",
                self.cols, self.rows
            ))),
        }
    }
}

/// Builds one merged mesh of tiles for a unitized element.
#[derive(Debug, Clone, Copy)]
pub struct TileGridLayout {
    frame: AssemblyFrame,
    debug: bool,
}

impl TileGridLayout {
    pub fn new(frame: AssemblyFrame, debug: bool) -> Self {
        Self { frame, debug }
    }

    /// Tile `element` over the assembly footprint.
    ///
    /// Cell (row, col) is centered on `(col * width, row * height)`, so the
    /// first cell straddles the local origin. The metadata offsets point at
    /// the grid's lower-left corner, which lets the compositor re-center
    /// the whole grid on the footprint.
    pub fn build_unitized(&self, element: &Element, cell: &UnitCell, material: SurfaceMaterial) -> Result<Solid> {
        let grid = TileGrid::fit(&self.frame, cell);
        let cells = grid.bounded_cell_count()?;
        if self.debug {
            debug!(element = %element.name, cols = grid.cols, rows = grid.rows, "tile grid");
        }

        let tile = box_mesh(
            element.carved_width(cell.width),
            element.carved_height(cell.height),
            element.carved_thickness(),
        );

        let mut mesh = Mesh::with_capacity(
            tile.vertex_count() * cells,
            tile.indices.len() * cells,
        );
        if !tile.is_empty() {
            for row in 0..grid.rows {
                for col in 0..grid.cols {
                    let offset = Vector3::new(col as f64 * cell.width, row as f64 * cell.height, 0.0);
                    mesh.merge_translated(&tile, &offset);
                }
            }
            calculate_normals(&mut mesh);
        }

        let metadata = NodeMetadata {
            name: element.name.clone(),
            width: grid.cols as f64 * cell.width,
            height: grid.rows as f64 * cell.height,
            offset_x: cell.width / 2.0,
            offset_y: cell.height / 2.0,
        };
        Ok(Solid::mesh(mesh, material, metadata))
    }
}
