use super::{begin, end, line, period_block, Package};
use crate::settings::WriteOptions;
use serde::{Deserialize, Serialize};
use std::io::{self, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputKind {
    Head,
    Budget,
}

impl OutputKind {
    fn keyword(self) -> &'static str {
        match self {
            OutputKind::Head => "HEAD",
            OutputKind::Budget => "BUDGET",
        }
    }
}

/// Which time steps of a period an output record applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaveFrequency {
    All,
    First,
    Last,
    Frequency(usize),
}

impl SaveFrequency {
    fn keyword(self) -> String {
        match self {
            SaveFrequency::All => "ALL".to_string(),
            SaveFrequency::First => "FIRST".to_string(),
            SaveFrequency::Last => "LAST".to_string(),
            SaveFrequency::Frequency(n) => format!("FREQUENCY {n}"),
        }
    }
}

/// Output control: binary output files and what gets saved or printed.
#[derive(Debug, Clone, PartialEq)]
pub struct Oc {
    pub name: String,
    pub head_file: Option<String>,
    pub budget_file: Option<String>,
    pub save: Vec<(OutputKind, SaveFrequency)>,
    pub print: Vec<(OutputKind, SaveFrequency)>,
}

impl Default for Oc {
    fn default() -> Self {
        Oc {
            name: "oc".to_string(),
            head_file: None,
            budget_file: None,
            save: Vec::new(),
            print: Vec::new(),
        }
    }
}

impl Oc {
    pub fn saves(&self, kind: OutputKind) -> bool {
        self.save.iter().any(|(k, _)| *k == kind)
    }
}

impl Package for Oc {
    fn package_type(&self) -> &'static str {
        "oc"
    }

    fn package_name(&self) -> &str {
        &self.name
    }

    fn write_blocks(&self, out: &mut dyn Write, opts: &WriteOptions) -> io::Result<()> {
        begin(out, "options")?;
        if let Some(file) = &self.budget_file {
            line(out, opts, 1, &format!("BUDGET  FILEOUT  {file}"))?;
        }
        if let Some(file) = &self.head_file {
            line(out, opts, 1, &format!("HEAD  FILEOUT  {file}"))?;
        }
        end(out, "options")?;

        if self.save.is_empty() && self.print.is_empty() {
            return Ok(());
        }
        let saves = self
            .save
            .iter()
            .map(|(k, f)| format!("SAVE  {}  {}", k.keyword(), f.keyword()));
        let prints = self
            .print
            .iter()
            .map(|(k, f)| format!("PRINT  {}  {}", k.keyword(), f.keyword()));
        period_block(out, opts, 1, saves.chain(prints))
    }
}
