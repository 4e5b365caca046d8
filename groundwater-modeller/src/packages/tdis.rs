use super::{begin, end, line, Package};
use crate::settings::WriteOptions;
use serde::{Deserialize, Serialize};
use std::io::{self, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnits {
    Unknown,
    Seconds,
    Minutes,
    Hours,
    #[default]
    Days,
    Years,
}

impl TimeUnits {
    fn keyword(self) -> &'static str {
        match self {
            TimeUnits::Unknown => "unknown",
            TimeUnits::Seconds => "seconds",
            TimeUnits::Minutes => "minutes",
            TimeUnits::Hours => "hours",
            TimeUnits::Days => "days",
            TimeUnits::Years => "years",
        }
    }
}

/// Length, step count and step multiplier of one stress period.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeriodData {
    pub perlen: f64,
    pub nstp: usize,
    pub tsmult: f64,
}

impl PeriodData {
    pub fn new(perlen: f64, nstp: usize, tsmult: f64) -> Self {
        PeriodData { perlen, nstp, tsmult }
    }
}

impl Default for PeriodData {
    fn default() -> Self {
        PeriodData::new(1.0, 1, 1.0)
    }
}

/// Temporal discretization.
#[derive(Debug, Clone, PartialEq)]
pub struct Tdis {
    pub name: String,
    pub time_units: TimeUnits,
    pub periods: Vec<PeriodData>,
}

impl Default for Tdis {
    fn default() -> Self {
        Tdis::new(TimeUnits::Days, vec![PeriodData::default()])
    }
}

impl Tdis {
    pub fn new(time_units: TimeUnits, periods: Vec<PeriodData>) -> Self {
        Tdis {
            name: "tdis".to_string(),
            time_units,
            periods,
        }
    }

    pub fn nper(&self) -> usize {
        self.periods.len()
    }

    pub fn total_time(&self) -> f64 {
        self.periods.iter().map(|p| p.perlen).sum()
    }
}

impl Package for Tdis {
    fn package_type(&self) -> &'static str {
        "tdis"
    }

    fn package_name(&self) -> &str {
        &self.name
    }

    fn write_blocks(&self, out: &mut dyn Write, opts: &WriteOptions) -> io::Result<()> {
        begin(out, "options")?;
        line(out, opts, 1, &format!("TIME_UNITS  {}", self.time_units.keyword()))?;
        end(out, "options")?;

        begin(out, "dimensions")?;
        line(out, opts, 1, &format!("NPER  {}", self.nper()))?;
        end(out, "dimensions")?;

        begin(out, "perioddata")?;
        for p in &self.periods {
            let text = format!("{} {} {}", opts.float(p.perlen), p.nstp, opts.float(p.tsmult));
            line(out, opts, 1, &text)?;
        }
        end(out, "perioddata")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ten_annual_periods() {
        let tdis = Tdis::new(TimeUnits::Days, vec![PeriodData::new(365.0, 1, 1.0); 10]);
        assert_eq!(tdis.nper(), 10);
        assert_eq!(tdis.total_time(), 3650.0);
        let text = tdis.render(&WriteOptions::default());
        assert!(text.contains("  NPER  10\n"));
        assert_eq!(text.matches("   365.00000000 1").count(), 10);
    }
}
