use crate::foundation::cancel::{CancelToken, MESH_POLL_ROWS};
use crate::foundation::core::{PixelGrid, Rgb8};
use crate::foundation::error::{PixcelError, PixcelResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// One maximal monochrome rectangle, anchored at its top-left pixel.
pub struct Cell {
    /// Color shared by every pixel of the rectangle.
    pub color: Rgb8,
    /// Columns spanned (>= 1).
    pub width: u32,
    /// Rows spanned (>= 1).
    pub height: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// Cells whose anchor lies on row `y`, left to right.
///
/// Columns covered by taller cells from earlier rows have no entry here; a table
/// layout engine skips them on its own. Use [`Layout::placed_cells`] when the absolute
/// position of every cell is needed.
pub struct Row {
    /// Row index of every anchor in this row.
    pub y: u32,
    /// Cells in raster order. May be empty.
    pub cells: Vec<Cell>,
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// The full cell partition of one pixel grid.
pub struct Layout {
    /// Grid width in pixels.
    pub width: u32,
    /// Grid height in pixels.
    pub height: u32,
    /// One row per grid row, top to bottom.
    pub rows: Vec<Row>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
/// A [`Cell`] with its reconstructed absolute origin.
pub struct PlacedCell {
    pub x: u32,
    pub y: u32,
    pub cell: Cell,
}

impl Layout {
    /// Total number of emitted cells.
    pub fn cell_count(&self) -> usize {
        self.rows.iter().map(|r| r.cells.len()).sum()
    }

    /// Recover each cell's absolute origin.
    ///
    /// Mirrors the table model: per-column counters track how many more rows a cell
    /// from an earlier row still occupies, and each row's cells fill the remaining
    /// free columns left to right.
    pub fn placed_cells(&self) -> Vec<PlacedCell> {
        let mut occupied = vec![0u32; self.width as usize];
        let mut out = Vec::with_capacity(self.cell_count());

        for row in &self.rows {
            let mut x = 0usize;
            for cell in &row.cells {
                while x < occupied.len() && occupied[x] > 0 {
                    x += 1;
                }
                out.push(PlacedCell {
                    x: x as u32,
                    y: row.y,
                    cell: *cell,
                });
                let end = (x + cell.width as usize).min(occupied.len());
                for slot in &mut occupied[x..end] {
                    *slot = cell.height;
                }
                x = end;
            }
            for slot in &mut occupied {
                *slot = slot.saturating_sub(1);
            }
        }
        out
    }

    /// Paint the layout back into an opaque grid.
    pub fn rasterize(&self) -> PixelGrid {
        let mut image = image::RgbaImage::new(self.width, self.height);
        for placed in self.placed_cells() {
            let Rgb8 { r, g, b } = placed.cell.color;
            let x_end = (placed.x + placed.cell.width).min(self.width);
            let y_end = (placed.y + placed.cell.height).min(self.height);
            for y in placed.y..y_end {
                for x in placed.x..x_end {
                    image.put_pixel(x, y, image::Rgba([r, g, b, 255]));
                }
            }
        }
        PixelGrid::from_rgba_image(image)
    }
}

/// Partition `grid` into maximal same-color rectangles.
///
/// Raster-order greedy meshing: at every unvisited anchor the width is grown first,
/// then the height row by row while the whole candidate row is unvisited and of the
/// anchor color. Colors compare on alpha-premultiplied RGB, so all fully
/// transparent pixels are one black color. `cancel` is polled every
/// [`MESH_POLL_ROWS`] rows.
pub fn mesh_grid(grid: &PixelGrid, cancel: &CancelToken) -> PixcelResult<Layout> {
    if grid.is_degenerate() {
        return Err(PixcelError::InvalidDimensions);
    }

    let width = grid.width();
    let height = grid.height();
    let mut visited = VisitedMask::new(width, height);
    let mut rows = Vec::with_capacity(height as usize);

    for y in 0..height {
        if y % MESH_POLL_ROWS == 0 {
            cancel.check()?;
        }

        let mut cells = Vec::new();
        for x in 0..width {
            if visited.get(x, y) {
                continue;
            }

            let color = grid.rgb(x, y);

            let mut w = 1;
            while x + w < width && !visited.get(x + w, y) && grid.rgb(x + w, y) == color {
                w += 1;
            }

            let mut h = 1;
            while y + h < height
                && (x..x + w).all(|cx| !visited.get(cx, y + h) && grid.rgb(cx, y + h) == color)
            {
                h += 1;
            }

            visited.mark(x, y, w, h);
            cells.push(Cell {
                color,
                width: w,
                height: h,
            });
        }
        rows.push(Row { y, cells });
    }

    let layout = Layout {
        width,
        height,
        rows,
    };
    tracing::debug!(width, height, cells = layout.cell_count(), "meshed grid");
    Ok(layout)
}

/// Flat row-major visited flags for one meshing pass.
struct VisitedMask {
    width: usize,
    bits: Vec<bool>,
}

impl VisitedMask {
    fn new(width: u32, height: u32) -> Self {
        Self {
            width: width as usize,
            bits: vec![false; width as usize * height as usize],
        }
    }

    fn get(&self, x: u32, y: u32) -> bool {
        self.bits[y as usize * self.width + x as usize]
    }

    fn mark(&mut self, x: u32, y: u32, w: u32, h: u32) {
        for row in y as usize..(y + h) as usize {
            let start = row * self.width + x as usize;
            self.bits[start..start + w as usize].fill(true);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/mesh/mesher.rs"]
mod tests;
