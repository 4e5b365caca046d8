use super::{begin, end, line, Package};
use crate::settings::WriteOptions;
use serde::{Deserialize, Serialize};
use std::io::{self, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Simple,
    Moderate,
    Complex,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinearAcceleration {
    Cg,
    Bicgstab,
}

/// Iterative model solution settings. Unset options are left to the solver.
#[derive(Debug, Clone, PartialEq)]
pub struct Ims {
    pub name: String,
    pub complexity: Option<Complexity>,
    pub linear_acceleration: Option<LinearAcceleration>,
    pub outer_maximum: Option<usize>,
    pub outer_dvclose: Option<f64>,
    pub inner_maximum: Option<usize>,
    pub inner_dvclose: Option<f64>,
}

impl Default for Ims {
    fn default() -> Self {
        Ims {
            name: "ims".to_string(),
            complexity: None,
            linear_acceleration: None,
            outer_maximum: None,
            outer_dvclose: None,
            inner_maximum: None,
            inner_dvclose: None,
        }
    }
}

impl Package for Ims {
    fn package_type(&self) -> &'static str {
        "ims"
    }

    fn package_name(&self) -> &str {
        &self.name
    }

    fn write_blocks(&self, out: &mut dyn Write, opts: &WriteOptions) -> io::Result<()> {
        begin(out, "options")?;
        if let Some(c) = self.complexity {
            let keyword = match c {
                Complexity::Simple => "simple",
                Complexity::Moderate => "moderate",
                Complexity::Complex => "complex",
            };
            line(out, opts, 1, &format!("COMPLEXITY  {keyword}"))?;
        }
        end(out, "options")?;

        if self.outer_maximum.is_some() || self.outer_dvclose.is_some() {
            begin(out, "nonlinear")?;
            if let Some(v) = self.outer_dvclose {
                line(out, opts, 1, &format!("OUTER_DVCLOSE {}", opts.float(v)))?;
            }
            if let Some(n) = self.outer_maximum {
                line(out, opts, 1, &format!("OUTER_MAXIMUM  {n}"))?;
            }
            end(out, "nonlinear")?;
        }

        begin(out, "linear")?;
        if let Some(n) = self.inner_maximum {
            line(out, opts, 1, &format!("INNER_MAXIMUM  {n}"))?;
        }
        if let Some(v) = self.inner_dvclose {
            line(out, opts, 1, &format!("INNER_DVCLOSE {}", opts.float(v)))?;
        }
        if let Some(a) = self.linear_acceleration {
            let keyword = match a {
                LinearAcceleration::Cg => "cg",
                LinearAcceleration::Bicgstab => "bicgstab",
            };
            line(out, opts, 1, &format!("LINEAR_ACCELERATION  {keyword}"))?;
        }
        end(out, "linear")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_ims_writes_empty_blocks() {
        let text = Ims::default().render(&WriteOptions::default());
        assert_eq!(text, "BEGIN options\nEND options\n\nBEGIN linear\nEND linear\n\n");
    }

    #[test]
    fn tutorial_options_are_written() {
        let ims = Ims {
            complexity: Some(Complexity::Simple),
            linear_acceleration: Some(LinearAcceleration::Bicgstab),
            ..Ims::default()
        };
        let text = ims.render(&WriteOptions::default());
        assert!(text.contains("  COMPLEXITY  simple\n"));
        assert!(text.contains("  LINEAR_ACCELERATION  bicgstab\n"));
        assert!(!text.contains("nonlinear"));
    }
}
