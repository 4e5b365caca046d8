use ndarray::Array1;
use std::fmt;

/// Zero-based (layer, row, column) address of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellId {
    pub layer: usize,
    pub row: usize,
    pub col: usize,
}

impl CellId {
    pub fn new(layer: usize, row: usize, col: usize) -> Self {
        CellId { layer, row, col }
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.layer, self.row, self.col)
    }
}

/// Layered rectangular grid with uniform row and column spacing.
#[derive(Debug, Clone, PartialEq)]
pub struct StructuredGrid {
    pub nlay: usize,
    pub nrow: usize,
    pub ncol: usize,
    pub delr: f64,      // Column width along x (meters)
    pub delc: f64,      // Row height along y (meters)
    pub top: f64,       // Top elevation of layer 1
    pub botm: Vec<f64>, // Bottom elevation of each layer
}

impl StructuredGrid {
    pub fn new(
        nlay: usize,
        nrow: usize,
        ncol: usize,
        delr: f64,
        delc: f64,
        top: f64,
        botm: Vec<f64>,
    ) -> Self {
        StructuredGrid {
            nlay,
            nrow,
            ncol,
            delr,
            delc,
            top,
            botm,
        }
    }

    /// Square N x N grid spanning `length` with `nlay` equally thick layers
    /// below a top at zero. Spacing is `length / (n - 1)`.
    pub fn square(nlay: usize, n: usize, length: f64, thickness: f64) -> Self {
        let spacing = length / (n.max(2) - 1) as f64;
        let botm = equal_layer_bottoms(0.0, thickness, nlay);
        Self::new(nlay, n, n, spacing, spacing, 0.0, botm)
    }

    pub fn shape(&self) -> (usize, usize, usize) {
        (self.nlay, self.nrow, self.ncol)
    }

    pub fn ncells(&self) -> usize {
        self.nlay * self.nrow * self.ncol
    }

    /// Zero-based node number in layer-major order.
    pub fn node(&self, cell: CellId) -> usize {
        (cell.layer * self.nrow + cell.row) * self.ncol + cell.col
    }

    pub fn cell(&self, node: usize) -> CellId {
        let per_layer = self.nrow * self.ncol;
        CellId::new(node / per_layer, (node % per_layer) / self.ncol, node % self.ncol)
    }

    pub fn in_bounds(&self, cell: CellId) -> bool {
        cell.layer < self.nlay && cell.row < self.nrow && cell.col < self.ncol
    }

    pub fn width(&self) -> f64 {
        self.ncol as f64 * self.delr
    }

    pub fn height(&self) -> f64 {
        self.nrow as f64 * self.delc
    }

    pub fn layer_top(&self, layer: usize) -> f64 {
        if layer == 0 {
            self.top
        } else {
            self.botm[layer - 1]
        }
    }

    pub fn layer_thickness(&self, layer: usize) -> f64 {
        self.layer_top(layer) - self.botm[layer]
    }

    /// Cell-centre x coordinates, west to east.
    pub fn x_centers(&self) -> Array1<f64> {
        Array1::from_iter((0..self.ncol).map(|j| (j as f64 + 0.5) * self.delr))
    }

    /// Cell-centre y coordinates; row 0 is the northern edge.
    pub fn y_centers(&self) -> Array1<f64> {
        Array1::from_iter((0..self.nrow).map(|i| self.height() - (i as f64 + 0.5) * self.delc))
    }

    /// Mid-layer elevations, top to bottom.
    pub fn z_centers(&self) -> Array1<f64> {
        Array1::from_iter((0..self.nlay).map(|k| 0.5 * (self.layer_top(k) + self.botm[k])))
    }
}

/// Bottoms of `nlay` layers of equal thickness filling `thickness` below `top`.
pub fn equal_layer_bottoms(top: f64, thickness: f64, nlay: usize) -> Vec<f64> {
    if nlay == 0 {
        return Vec::new();
    }
    let dz = thickness / nlay as f64;
    Array1::linspace(top - dz, top - thickness, nlay).to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn square_grid_matches_tutorial_layout() {
        let grid = StructuredGrid::square(10, 101, 400.0, 50.0);
        assert_eq!(grid.shape(), (10, 101, 101));
        assert_relative_eq!(grid.delr, 4.0);
        assert_relative_eq!(grid.botm[0], -5.0);
        assert_relative_eq!(grid.botm[9], -50.0);
        assert_relative_eq!(grid.layer_thickness(3), 5.0);
    }

    #[test]
    fn node_numbering_is_layer_major() {
        let grid = StructuredGrid::new(3, 4, 5, 1.0, 1.0, 1.0, vec![0.0; 3]);
        let cell = CellId::new(2, 3, 4);
        assert_eq!(grid.node(cell), grid.ncells() - 1);
        assert_eq!(grid.cell(grid.node(cell)), cell);
        assert_eq!(grid.node(CellId::new(1, 0, 0)), 20);
        assert!(!grid.in_bounds(CellId::new(0, 4, 0)));
    }

    #[test]
    fn centres_follow_map_orientation() {
        let grid = StructuredGrid::new(2, 2, 3, 2.0, 1.0, 0.0, vec![-1.0, -3.0]);
        assert_relative_eq!(grid.x_centers()[0], 1.0);
        assert_relative_eq!(grid.y_centers()[0], 1.5);
        assert_relative_eq!(grid.z_centers()[1], -2.0);
    }
}
