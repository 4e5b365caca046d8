//! MODFLOW 6 input packages.
//!
//! Every package knows how to write its own blocks. File names and the
//! name-file entries that point at them are owned by the simulation and
//! model that hold the package.

mod array;
mod chd;
mod dis;
mod ic;
mod ims;
mod npf;
mod oc;
mod tdis;
mod wel;

pub use array::{ArrayValue, GridArray};
pub use chd::Chd;
pub use dis::Dis;
pub use ic::Ic;
pub use ims::{Complexity, Ims, LinearAcceleration};
pub use npf::Npf;
pub use oc::{Oc, OutputKind, SaveFrequency};
pub use tdis::{PeriodData, Tdis, TimeUnits};
pub use wel::Wel;

use crate::settings::WriteOptions;
use std::fmt;
use std::io::{self, Write};

pub trait Package: fmt::Debug {
    /// Lower-case package type, e.g. `dis`. Also the file extension.
    fn package_type(&self) -> &'static str;

    fn package_name(&self) -> &str;

    /// Name-file type tag, e.g. `DIS6`.
    fn ftype(&self) -> String {
        format!("{}6", self.package_type().to_uppercase())
    }

    fn write_blocks(&self, out: &mut dyn Write, opts: &WriteOptions) -> io::Result<()>;

    /// Package contents as they would be written to disk.
    fn render(&self, opts: &WriteOptions) -> String {
        let mut buf = Vec::new();
        // Writing into a Vec cannot fail
        let _ = self.write_blocks(&mut buf, opts);
        String::from_utf8_lossy(&buf).into_owned()
    }
}

impl fmt::Display for dyn Package + '_ {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "package_name = {}", self.package_name())?;
        writeln!(f, "package_type = {}", self.package_type())?;
        write!(f, "{}", self.render(&WriteOptions::default()))
    }
}

pub(crate) fn begin(out: &mut dyn Write, block: &str) -> io::Result<()> {
    writeln!(out, "BEGIN {block}")
}

pub(crate) fn end(out: &mut dyn Write, block: &str) -> io::Result<()> {
    writeln!(out, "END {block}")?;
    writeln!(out)
}

pub(crate) fn line(out: &mut dyn Write, opts: &WriteOptions, depth: usize, text: &str) -> io::Result<()> {
    writeln!(out, "{}{}", opts.indent(depth), text)
}

/// Writes `BEGIN period n` .. `END period n` around the given body lines.
pub(crate) fn period_block<I>(
    out: &mut dyn Write,
    opts: &WriteOptions,
    period: usize,
    lines: I,
) -> io::Result<()>
where
    I: IntoIterator<Item = String>,
{
    let block = format!("period  {period}");
    begin(out, &block)?;
    for text in lines {
        line(out, opts, 1, &text)?;
    }
    end(out, &block)
}

/// One-based `layer row col` as the solver expects.
pub(crate) fn cellid(cell: crate::grid::CellId) -> String {
    format!("{} {} {}", cell.layer + 1, cell.row + 1, cell.col + 1)
}
