use super::{begin, end, GridArray, Package};
use crate::settings::WriteOptions;
use std::io::{self, Write};

/// Initial heads.
#[derive(Debug, Clone, PartialEq)]
pub struct Ic {
    pub name: String,
    pub strt: GridArray<f64>,
}

impl Default for Ic {
    fn default() -> Self {
        Ic::new(GridArray::Constant(1.0))
    }
}

impl Ic {
    pub fn new(strt: GridArray<f64>) -> Self {
        Ic {
            name: "ic".to_string(),
            strt,
        }
    }
}

impl Package for Ic {
    fn package_type(&self) -> &'static str {
        "ic"
    }

    fn package_name(&self) -> &str {
        &self.name
    }

    fn write_blocks(&self, out: &mut dyn Write, opts: &WriteOptions) -> io::Result<()> {
        begin(out, "options")?;
        end(out, "options")?;

        begin(out, "griddata")?;
        self.strt.write(out, opts, "strt")?;
        end(out, "griddata")
    }
}
