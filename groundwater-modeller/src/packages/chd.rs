use super::{begin, cellid, end, line, period_block, Package};
use crate::settings::WriteOptions;
use crate::stress::HeadRecord;
use std::io::{self, Write};

/// Constant-head boundary, one record set held for the first stress period.
#[derive(Debug, Clone, PartialEq)]
pub struct Chd {
    pub name: String,
    pub records: Vec<HeadRecord>,
    /// Written as MAXBOUND when sizes are not set automatically
    pub maxbound: Option<usize>,
}

impl Chd {
    pub fn new(records: Vec<HeadRecord>) -> Self {
        Chd {
            name: "chd_0".to_string(),
            records,
            maxbound: None,
        }
    }

    pub fn maxbound(&self, auto_set_sizes: bool) -> usize {
        match self.maxbound {
            Some(n) if !auto_set_sizes => n,
            _ => self.records.len(),
        }
    }
}

impl Package for Chd {
    fn package_type(&self) -> &'static str {
        "chd"
    }

    fn package_name(&self) -> &str {
        &self.name
    }

    fn write_blocks(&self, out: &mut dyn Write, opts: &WriteOptions) -> io::Result<()> {
        begin(out, "options")?;
        end(out, "options")?;

        begin(out, "dimensions")?;
        line(out, opts, 1, &format!("MAXBOUND  {}", self.maxbound(opts.auto_set_sizes)))?;
        end(out, "dimensions")?;

        let lines = self
            .records
            .iter()
            .map(|r| format!("{} {}", cellid(r.cell), opts.float(r.head)));
        period_block(out, opts, 1, lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::CellId;

    fn two_cells() -> Chd {
        Chd::new(vec![
            HeadRecord::new(CellId::new(0, 0, 0), 1.0),
            HeadRecord::new(CellId::new(2, 3, 4), 0.0),
        ])
    }

    #[test]
    fn records_are_written_one_based() {
        let text = two_cells().render(&WriteOptions::default());
        assert!(text.contains("  MAXBOUND  2\n"));
        assert!(text.contains("BEGIN period  1\n  1 1 1      1.00000000\n  3 4 5      0.00000000\nEND period  1\n"));
    }

    #[test]
    fn stored_maxbound_survives_when_sizes_are_manual() {
        let mut chd = two_cells();
        chd.maxbound = Some(5);
        assert_eq!(chd.maxbound(true), 2);
        assert_eq!(chd.maxbound(false), 5);

        let opts = WriteOptions {
            auto_set_sizes: false,
            ..WriteOptions::default()
        };
        assert!(chd.render(&opts).contains("MAXBOUND  5"));
    }
}
