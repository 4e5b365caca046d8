use super::{begin, end, line, GridArray, Package};
use crate::settings::WriteOptions;
use std::io::{self, Write};

/// Node property flow: cell type and hydraulic conductivity.
#[derive(Debug, Clone, PartialEq)]
pub struct Npf {
    pub name: String,
    /// 0 = confined, 1 = convertible
    pub icelltype: GridArray<i32>,
    pub k: GridArray<f64>,
    pub save_specific_discharge: bool,
}

impl Default for Npf {
    fn default() -> Self {
        Npf::new(GridArray::Constant(0), GridArray::Constant(1.0))
    }
}

impl Npf {
    pub fn new(icelltype: GridArray<i32>, k: GridArray<f64>) -> Self {
        Npf {
            name: "npf".to_string(),
            icelltype,
            k,
            save_specific_discharge: false,
        }
    }
}

impl Package for Npf {
    fn package_type(&self) -> &'static str {
        "npf"
    }

    fn package_name(&self) -> &str {
        &self.name
    }

    fn write_blocks(&self, out: &mut dyn Write, opts: &WriteOptions) -> io::Result<()> {
        begin(out, "options")?;
        if self.save_specific_discharge {
            line(out, opts, 1, "SAVE_SPECIFIC_DISCHARGE")?;
        }
        end(out, "options")?;

        begin(out, "griddata")?;
        self.icelltype.write(out, opts, "icelltype")?;
        self.k.write(out, opts, "k")?;
        end(out, "griddata")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn convertible_layers_with_specific_discharge() {
        let mut npf = Npf::new(GridArray::Constant(1), GridArray::Constant(1.0));
        npf.save_specific_discharge = true;
        let text = npf.render(&WriteOptions::default());
        assert!(text.contains("  SAVE_SPECIFIC_DISCHARGE\n"));
        assert!(text.contains("  icelltype\n    CONSTANT 1\n"));
        assert!(text.contains("  k\n    CONSTANT      1.00000000\n"));
    }
}
