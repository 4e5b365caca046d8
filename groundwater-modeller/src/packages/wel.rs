use super::{begin, cellid, end, line, period_block, Package};
use crate::settings::WriteOptions;
use crate::stress::WellRecord;
use std::io::{self, Write};

/// Wells for the first stress period. Negative rates extract water.
#[derive(Debug, Clone, PartialEq)]
pub struct Wel {
    pub name: String,
    pub records: Vec<WellRecord>,
    pub maxbound: Option<usize>,
}

impl Wel {
    pub fn new(records: Vec<WellRecord>) -> Self {
        Wel {
            name: "wel_0".to_string(),
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

    pub fn total_rate(&self) -> f64 {
        self.records.iter().map(|r| r.rate).sum()
    }
}

impl Package for Wel {
    fn package_type(&self) -> &'static str {
        "wel"
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
            .map(|r| format!("{} {}", cellid(r.cell), opts.float(r.rate)));
        period_block(out, opts, 1, lines)
    }
}
