use super::{begin, end, line, GridArray, Package};
use crate::grid::StructuredGrid;
use crate::settings::WriteOptions;
use std::io::{self, Write};

/// Structured discretization. Wraps the grid it describes.
#[derive(Debug, Clone, PartialEq)]
pub struct Dis {
    pub name: String,
    pub grid: StructuredGrid,
    pub length_units: Option<String>,
}

impl Default for Dis {
    fn default() -> Self {
        Dis::new(StructuredGrid::new(1, 1, 1, 1.0, 1.0, 1.0, vec![0.0]))
    }
}

impl Dis {
    pub fn new(grid: StructuredGrid) -> Self {
        Dis {
            name: "dis".to_string(),
            grid,
            length_units: None,
        }
    }
}

impl Package for Dis {
    fn package_type(&self) -> &'static str {
        "dis"
    }

    fn package_name(&self) -> &str {
        &self.name
    }

    fn write_blocks(&self, out: &mut dyn Write, opts: &WriteOptions) -> io::Result<()> {
        let g = &self.grid;

        begin(out, "options")?;
        if let Some(units) = &self.length_units {
            line(out, opts, 1, &format!("LENGTH_UNITS  {units}"))?;
        }
        end(out, "options")?;

        begin(out, "dimensions")?;
        line(out, opts, 1, &format!("NLAY  {}", g.nlay))?;
        line(out, opts, 1, &format!("NROW  {}", g.nrow))?;
        line(out, opts, 1, &format!("NCOL  {}", g.ncol))?;
        end(out, "dimensions")?;

        begin(out, "griddata")?;
        GridArray::Constant(g.delr).write(out, opts, "delr")?;
        GridArray::Constant(g.delc).write(out, opts, "delc")?;
        GridArray::Constant(g.top).write(out, opts, "top")?;
        let botm = if g.botm.windows(2).all(|w| w[0] == w[1]) && !g.botm.is_empty() {
            GridArray::Constant(g.botm[0])
        } else {
            GridArray::Layered(g.botm.clone())
        };
        botm.write(out, opts, "botm")?;
        end(out, "griddata")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layered_bottoms_and_dimensions() {
        let dis = Dis::new(StructuredGrid::square(10, 101, 400.0, 50.0));
        let text = dis.render(&WriteOptions::default());
        assert!(text.contains("  NLAY  10\n  NROW  101\n  NCOL  101\n"));
        assert!(text.contains("  delr\n    CONSTANT      4.00000000\n"));
        assert!(text.contains("  botm  LAYERED\n"));
        assert_eq!(text.matches("CONSTANT").count(), 3 + 10);
    }

    #[test]
    fn uniform_bottom_is_constant() {
        let grid = StructuredGrid::new(3, 4, 5, 1.0, 1.0, 1.0, vec![0.0; 3]);
        let text = Dis::new(grid).render(&WriteOptions::default());
        assert!(text.contains("  botm\n    CONSTANT      0.00000000\n"));
    }

    #[test]
    fn length_units_go_in_the_options_block() {
        let mut dis = Dis::default();
        assert!(dis.render(&WriteOptions::default()).starts_with("BEGIN options\nEND options\n"));
        dis.length_units = Some("meters".to_string());
        let text = dis.render(&WriteOptions::default());
        assert!(text.starts_with("BEGIN options\n  LENGTH_UNITS  meters\nEND options\n"));
    }
}
