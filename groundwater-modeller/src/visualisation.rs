use crate::grid::{CellId, StructuredGrid};
use crate::heads::{HeadField, INACTIVE_HEAD};
use crate::postprocess::RunResults;
use ndarray::{Array3, ArrayView2, Axis};
use plotters::coord::Shift;
use plotters::prelude::*;
use std::path::{Path, PathBuf};
use tracing::info;

type Rect = [(f64, f64); 2];

const NO_DATA: RGBColor = RGBColor(200, 200, 200);
const GRID_LINE: RGBColor = RGBColor(128, 128, 128);
const COLORBAR_WIDTH: u32 = 90;
const COLORBAR_STEPS: usize = 64;

/// Colour range with optional banding.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Scale {
    lo: f64,
    hi: f64,
    interval: f64, // Band width, 0 for a continuous ramp
}

impl Scale {
    /// Position of `value` on the gradient, `None` for missing data.
    fn normalise(&self, value: f64) -> Option<f64> {
        if !value.is_finite() || value.abs() >= INACTIVE_HEAD {
            return None;
        }
        if self.hi <= self.lo {
            return Some(0.5);
        }
        let mut v = value.clamp(self.lo, self.hi);
        if self.interval > 0.0 {
            let band = ((v - self.lo) / self.interval).floor();
            // Centre of the band, kept inside the range
            v = (self.lo + (band + 0.5) * self.interval).min(self.hi);
        }
        Some((v - self.lo) / (self.hi - self.lo))
    }
}

pub struct FieldVisualiser {
    output_dir: PathBuf,
    width: u32,
    height: u32,
    range: Option<(f64, f64)>,
    contour_interval: f64,
    gradient: Box<dyn colorgrad::Gradient>,
}

impl FieldVisualiser {
    pub fn new(output_dir: &Path, width: u32, height: u32) -> anyhow::Result<Self> {
        std::fs::create_dir_all(output_dir)?;

        Ok(Self {
            output_dir: output_dir.to_path_buf(),
            width,
            height,
            range: None,
            contour_interval: 0.0,
            gradient: Box::new(colorgrad::preset::rd_yl_bu()),
        })
    }

    /// Fixes the head colour range instead of fitting it to the data.
    pub fn with_range(mut self, vmin: Option<f64>, vmax: Option<f64>) -> Self {
        self.range = match (vmin, vmax) {
            (None, None) => None,
            (lo, hi) => Some((lo.unwrap_or(f64::NEG_INFINITY), hi.unwrap_or(f64::INFINITY))),
        };
        self
    }

    pub fn with_contour_interval(mut self, interval: f64) -> Self {
        self.contour_interval = interval.max(0.0);
        self
    }

    fn head_scale(&self, heads: &HeadField) -> Scale {
        let (data_lo, data_hi) = heads.min_max().unwrap_or((0.0, 1.0));
        let (lo, hi) = match self.range {
            Some((lo, hi)) => (
                if lo.is_finite() { lo } else { data_lo },
                if hi.is_finite() { hi } else { data_hi },
            ),
            None => (data_lo, data_hi),
        };
        Scale {
            lo,
            hi,
            interval: self.contour_interval,
        }
    }

    /// Map view of one layer, north at the top. CHD cells in the layer are
    /// outlined.
    pub fn plot_layer(
        &self,
        heads: &HeadField,
        grid: &StructuredGrid,
        layer: usize,
        chd: &[CellId],
        name: &str,
    ) -> Result<PathBuf, Box<dyn std::error::Error>> {
        let scale = self.head_scale(heads);
        let title = format!("Heads, model layer {}", layer + 1);
        self.draw_map(&heads.layer(layer), grid, layer, chd, scale, &title, name)
    }

    /// Residual map of one layer on a range symmetric about zero.
    pub fn plot_residual(
        &self,
        residual: &Array3<f64>,
        grid: &StructuredGrid,
        layer: usize,
        chd: &[CellId],
        name: &str,
    ) -> Result<PathBuf, Box<dyn std::error::Error>> {
        let data = residual.index_axis(Axis(0), layer);
        let max_abs = data
            .iter()
            .filter(|v| v.is_finite())
            .fold(0.0_f64, |acc, v| acc.max(v.abs()));
        let scale = Scale {
            lo: -max_abs,
            hi: max_abs,
            interval: 0.0,
        };
        let title = format!("Flow residual, model layer {}", layer + 1);
        self.draw_map(&data, grid, layer, chd, scale, &title, name)
    }

    /// Vertical section along `row`, columns left to right, top layer up.
    pub fn plot_row_section(
        &self,
        heads: &HeadField,
        grid: &StructuredGrid,
        row: usize,
        chd: &[CellId],
        name: &str,
    ) -> Result<PathBuf, Box<dyn std::error::Error>> {
        let scale = self.head_scale(heads);
        let section = heads.row_section(row);

        let mut cells = Vec::with_capacity(section.len());
        for ((k, j), &value) in section.indexed_iter() {
            let x0 = j as f64 * grid.delr;
            cells.push(([(x0, grid.botm[k]), (x0 + grid.delr, grid.layer_top(k))], value));
        }
        let outlines: Vec<Rect> = chd
            .iter()
            .filter(|c| c.row == row && c.layer < grid.nlay)
            .map(|c| {
                let x0 = c.col as f64 * grid.delr;
                [(x0, grid.botm[c.layer]), (x0 + grid.delr, grid.layer_top(c.layer))]
            })
            .collect();

        let bottom = grid.botm.last().copied().unwrap_or(grid.top - 1.0);
        let title = format!("Heads, row {}", row + 1);
        self.draw_cells(
            name,
            &title,
            (0.0, grid.width()),
            (bottom, grid.top),
            ("Distance (m)", "Elevation (m)"),
            &cells,
            &outlines,
            scale,
        )
    }

    /// The standard figure set of a run: first and bottom layer, the section
    /// along row `nrow / 4` and the bottom-layer residual. Stops at the first
    /// figure that fails.
    pub fn plot_run(
        &self,
        results: &RunResults,
        grid: &StructuredGrid,
    ) -> anyhow::Result<Vec<PathBuf>> {
        let bottom = grid.nlay.saturating_sub(1);
        let row = grid.nrow / 4;
        let chd = &results.chd_cells;
        let heads = &results.heads;

        let plots = [
            ("layer 1", self.plot_layer(heads, grid, 0, chd, "heads_layer_1")),
            (
                "bottom layer",
                self.plot_layer(heads, grid, bottom, chd, &format!("heads_layer_{}", bottom + 1)),
            ),
            (
                "row section",
                self.plot_row_section(heads, grid, row, chd, &format!("heads_row_{}", row + 1)),
            ),
            (
                "residual",
                self.plot_residual(&results.residual, grid, bottom, chd, &format!("residual_layer_{}", bottom + 1)),
            ),
        ];

        let mut paths = Vec::with_capacity(plots.len());
        for (what, result) in plots {
            paths.push(result.map_err(|e| anyhow::anyhow!("Failed to plot {what}: {e}"))?);
        }
        Ok(paths)
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_map(
        &self,
        data: &ArrayView2<'_, f64>,
        grid: &StructuredGrid,
        layer: usize,
        chd: &[CellId],
        scale: Scale,
        title: &str,
        name: &str,
    ) -> Result<PathBuf, Box<dyn std::error::Error>> {
        let cell_rect = |i: usize, j: usize| -> Rect {
            let x0 = j as f64 * grid.delr;
            let y1 = grid.height() - i as f64 * grid.delc;
            [(x0, y1 - grid.delc), (x0 + grid.delr, y1)]
        };

        let cells: Vec<(Rect, f64)> = data
            .indexed_iter()
            .map(|((i, j), &v)| (cell_rect(i, j), v))
            .collect();
        let outlines: Vec<Rect> = chd
            .iter()
            .filter(|c| c.layer == layer)
            .map(|c| cell_rect(c.row, c.col))
            .collect();

        self.draw_cells(
            name,
            title,
            (0.0, grid.width()),
            (0.0, grid.height()),
            ("x (m)", "y (m)"),
            &cells,
            &outlines,
            scale,
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_cells(
        &self,
        name: &str,
        title: &str,
        x_range: (f64, f64),
        y_range: (f64, f64),
        labels: (&str, &str),
        cells: &[(Rect, f64)],
        outlines: &[Rect],
        scale: Scale,
    ) -> Result<PathBuf, Box<dyn std::error::Error>> {
        let filename = self.output_dir.join(format!("{name}.png"));
        {
            let root =
                BitMapBackend::new(&filename, (self.width, self.height)).into_drawing_area();
            root.fill(&WHITE)?;
            let split = self.width.saturating_sub(COLORBAR_WIDTH).max(1);
            let (plot_area, bar_area) = root.split_horizontally(split);

            let caption = format!("{} [{:.2}, {:.2}]", title, scale.lo, scale.hi);
            let mut chart = ChartBuilder::on(&plot_area)
                .caption(&caption, ("sans-serif", 24))
                .margin(10)
                .x_label_area_size(40)
                .y_label_area_size(50)
                .build_cartesian_2d(x_range.0..x_range.1, y_range.0..y_range.1)?;

            chart
                .configure_mesh()
                .disable_mesh()
                .x_desc(labels.0)
                .y_desc(labels.1)
                .draw()?;

            chart.draw_series(cells.iter().map(|(rect, value)| {
                let color = self.value_to_color(*value, &scale);
                Rectangle::new(*rect, color.filled())
            }))?;
            chart.draw_series(
                cells
                    .iter()
                    .map(|(rect, _)| Rectangle::new(*rect, GRID_LINE.stroke_width(1))),
            )?;
            chart.draw_series(
                outlines
                    .iter()
                    .map(|rect| Rectangle::new(*rect, BLACK.stroke_width(2))),
            )?;

            self.draw_colorbar(&bar_area, &scale)?;
            root.present()?;
        }
        info!("Saved figure: {}", filename.display());
        Ok(filename)
    }

    fn draw_colorbar(
        &self,
        area: &DrawingArea<BitMapBackend<'_>, Shift>,
        scale: &Scale,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let lo = scale.lo;
        let hi = if scale.hi > scale.lo { scale.hi } else { scale.lo + 1.0 };
        let mut bar = ChartBuilder::on(area)
            .margin(10)
            .margin_top(50)
            .margin_bottom(50)
            .y_label_area_size(45)
            .build_cartesian_2d(0.0..1.0, lo..hi)?;
        bar.configure_mesh()
            .disable_mesh()
            .disable_x_axis()
            .y_labels(6)
            .draw()?;

        let dh = (hi - lo) / COLORBAR_STEPS as f64;
        bar.draw_series((0..COLORBAR_STEPS).map(|i| {
            let y0 = lo + i as f64 * dh;
            let color = self.value_to_color(y0 + 0.5 * dh, scale);
            Rectangle::new([(0.0, y0), (1.0, y0 + dh)], color.filled())
        }))?;
        Ok(())
    }

    fn value_to_color(&self, value: f64, scale: &Scale) -> RGBColor {
        match scale.normalise(value) {
            Some(t) => {
                let color_rgba = self.gradient.at(t as f32).to_rgba8();
                RGBColor(color_rgba[0], color_rgba[1], color_rgba[2])
            }
            None => NO_DATA,
        }
    }
}
