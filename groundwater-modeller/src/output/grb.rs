use super::binary::{count, product, BinaryReader};
use super::error::{OutputError, OutputResult};
use std::collections::HashMap;
use std::path::Path;

const HEADER_LEN: usize = 50;

#[derive(Debug, Clone, PartialEq)]
enum Values {
    Integer(Vec<i32>),
    Double(Vec<f64>),
}

/// Binary grid file (`.dis.grb`) written by the discretization package.
///
/// Holds the cell connectivity in compressed sparse row form: `ia` has one
/// entry per cell plus one, `ja` lists the connected cells, and the first
/// entry of every row is the cell itself.
#[derive(Debug, Clone)]
pub struct GridFile {
    pub grid_type: String,
    pub version: String,
    names: Vec<String>,
    values: HashMap<String, Values>,
}

impl GridFile {
    pub fn open(path: &Path) -> OutputResult<Self> {
        Self::parse(BinaryReader::open(path)?)
    }

    pub fn from_bytes(bytes: Vec<u8>) -> OutputResult<Self> {
        Self::parse(BinaryReader::from_bytes(bytes))
    }

    fn parse(mut reader: BinaryReader) -> OutputResult<Self> {
        let grid_line = reader.read_text(HEADER_LEN, "grid header")?;
        let version_line = reader.read_text(HEADER_LEN, "version header")?;
        let ntxt = header_value(&reader.read_text(HEADER_LEN, "NTXT header")?, "NTXT")?;
        let lentxt = header_value(&reader.read_text(HEADER_LEN, "LENTXT header")?, "LENTXT")?;

        let grid_type = grid_line
            .strip_prefix("GRID")
            .map(|s| s.trim().to_string())
            .ok_or_else(|| OutputError::Malformed(format!("not a grid file: '{grid_line}'")))?;
        let version = version_line
            .strip_prefix("VERSION")
            .map(|s| s.trim().to_string())
            .unwrap_or_default();

        let mut definitions = Vec::with_capacity(ntxt);
        for _ in 0..ntxt {
            let line = reader.read_text(lentxt, "variable definition")?;
            definitions.push(Definition::parse(&line)?);
        }

        let mut names = Vec::with_capacity(ntxt);
        let mut values = HashMap::with_capacity(ntxt);
        for def in definitions {
            let n = product(&def.dims, &def.name)?;
            let data = match def.kind.as_str() {
                "INTEGER" => Values::Integer(reader.read_i32s(n, &def.name)?),
                "DOUBLE" => Values::Double(reader.read_f64s(n, &def.name)?),
                other => {
                    return Err(OutputError::Malformed(format!(
                        "variable '{}' has unknown type '{}'",
                        def.name, other
                    )))
                }
            };
            names.push(def.name.clone());
            values.insert(def.name, data);
        }

        Ok(GridFile {
            grid_type,
            version,
            names,
            values,
        })
    }

    /// Variable names in file order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn integers(&self, name: &str) -> OutputResult<&[i32]> {
        match self.values.get(name) {
            Some(Values::Integer(v)) => Ok(v),
            Some(Values::Double(_)) => Err(OutputError::Malformed(format!("'{name}' is not INTEGER"))),
            None => Err(OutputError::Malformed(format!("grid file has no '{name}'"))),
        }
    }

    pub fn doubles(&self, name: &str) -> OutputResult<&[f64]> {
        match self.values.get(name) {
            Some(Values::Double(v)) => Ok(v),
            Some(Values::Integer(_)) => Err(OutputError::Malformed(format!("'{name}' is not DOUBLE"))),
            None => Err(OutputError::Malformed(format!("grid file has no '{name}'"))),
        }
    }

    fn scalar(&self, name: &str) -> OutputResult<usize> {
        let v = self
            .integers(name)?
            .first()
            .copied()
            .ok_or_else(|| OutputError::Malformed(format!("'{name}' is empty")))?;
        count(v, name)
    }

    pub fn ncells(&self) -> OutputResult<usize> {
        self.scalar("NCELLS")
    }

    pub fn nja(&self) -> OutputResult<usize> {
        self.scalar("NJA")
    }

    /// `(nlay, nrow, ncol)` for structured grids, `(1, 1, ncells)` otherwise.
    pub fn shape(&self) -> OutputResult<(usize, usize, usize)> {
        if self.grid_type == "DIS" {
            Ok((self.scalar("NLAY")?, self.scalar("NROW")?, self.scalar("NCOL")?))
        } else {
            Ok((1, 1, self.ncells()?))
        }
    }

    /// Zero-based row pointers, `ncells + 1` long.
    pub fn ia(&self) -> OutputResult<Vec<usize>> {
        let ia = self.integers("IA")?;
        if ia.len() != self.ncells()? + 1 {
            return Err(OutputError::Malformed(format!(
                "IA has {} entries for {} cells",
                ia.len(),
                self.ncells()?
            )));
        }
        let ia = ia
            .iter()
            .map(|&v| one_based(v, "IA"))
            .collect::<OutputResult<Vec<usize>>>()?;
        if ia.windows(2).any(|w| w[0] > w[1]) || ia.last() != Some(&self.nja()?) {
            return Err(OutputError::Malformed(
                "IA must be non-decreasing and end at NJA".to_string(),
            ));
        }
        Ok(ia)
    }

    /// Zero-based connected cell numbers, `nja` long.
    pub fn ja(&self) -> OutputResult<Vec<usize>> {
        self.integers("JA")?
            .iter()
            .map(|&v| one_based(v, "JA"))
            .collect()
    }
}

struct Definition {
    name: String,
    kind: String,
    dims: Vec<usize>,
}

impl Definition {
    /// Parses `NAME TYPE NDIM n d1 .. dn`.
    fn parse(line: &str) -> OutputResult<Self> {
        let bad = || OutputError::Malformed(format!("bad variable definition '{line}'"));
        let mut tokens = line.split_whitespace();
        let name = tokens.next().ok_or_else(bad)?.to_string();
        let kind = tokens.next().ok_or_else(bad)?.to_uppercase();
        if tokens.next() != Some("NDIM") {
            return Err(bad());
        }
        let ndim: usize = tokens.next().and_then(|t| t.parse().ok()).ok_or_else(bad)?;
        let dims = (0..ndim)
            .map(|_| tokens.next().and_then(|t| t.parse().ok()).ok_or_else(bad))
            .collect::<OutputResult<Vec<usize>>>()?;
        Ok(Definition { name, kind, dims })
    }
}

fn header_value(line: &str, key: &str) -> OutputResult<usize> {
    line.strip_prefix(key)
        .and_then(|rest| rest.trim().parse().ok())
        .ok_or_else(|| OutputError::Malformed(format!("expected '{key} n', found '{line}'")))
}

fn one_based(value: i32, what: &str) -> OutputResult<usize> {
    if value < 1 {
        return Err(OutputError::Malformed(format!("{what} entry {value} is not one-based")));
    }
    Ok(value as usize - 1)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::output::binary::fixture;

    /// Grid file for a single-layer 1 x 3 strip: cells 1-2-3 in a row.
    pub(crate) fn strip_grb() -> Vec<u8> {
        let defs = [
            "NCELLS INTEGER NDIM 0 # NCELLS = NLAY*NROW*NCOL",
            "NLAY INTEGER NDIM 0",
            "NROW INTEGER NDIM 0",
            "NCOL INTEGER NDIM 0",
            "NJA INTEGER NDIM 0",
            "XORIGIN DOUBLE NDIM 0",
            "DELR DOUBLE NDIM 1 3",
            "IA INTEGER NDIM 1 4",
            "JA INTEGER NDIM 1 7",
        ];
        let mut bytes = Vec::new();
        fixture::text_left(&mut bytes, "GRID DIS", HEADER_LEN);
        fixture::text_left(&mut bytes, "VERSION 1", HEADER_LEN);
        fixture::text_left(&mut bytes, &format!("NTXT {}", defs.len()), HEADER_LEN);
        fixture::text_left(&mut bytes, "LENTXT 100", HEADER_LEN);
        for d in defs {
            fixture::text_left(&mut bytes, d, 100);
        }
        fixture::i32s(&mut bytes, &[3, 1, 1, 3, 7]);
        fixture::f64s(&mut bytes, &[0.0]);
        fixture::f64s(&mut bytes, &[1.0, 1.0, 1.0]);
        fixture::i32s(&mut bytes, &[1, 3, 6, 8]);
        fixture::i32s(&mut bytes, &[1, 2, 2, 1, 3, 3, 2]);
        bytes
    }

    #[test]
    fn reads_structured_connectivity() {
        let grb = GridFile::from_bytes(strip_grb()).unwrap();
        assert_eq!(grb.grid_type, "DIS");
        assert_eq!(grb.version, "1");
        assert_eq!(grb.shape().unwrap(), (1, 1, 3));
        assert_eq!(grb.nja().unwrap(), 7);
        assert_eq!(grb.ia().unwrap(), vec![0, 2, 5, 7]);
        assert_eq!(&grb.ja().unwrap()[..3], &[0, 1, 1]);
        assert_eq!(grb.doubles("DELR").unwrap(), &[1.0, 1.0, 1.0]);
        assert_eq!(grb.names()[0], "NCELLS");
    }

    #[test]
    fn inconsistent_row_pointers_are_malformed() {
        let mut bytes = strip_grb();
        // IA is followed by the 7 JA values; swap its middle entries
        let ia_start = bytes.len() - 7 * 4 - 4 * 4;
        bytes[ia_start + 4..ia_start + 8].copy_from_slice(&6i32.to_le_bytes());
        bytes[ia_start + 8..ia_start + 12].copy_from_slice(&3i32.to_le_bytes());
        let grb = GridFile::from_bytes(bytes).unwrap();
        assert!(matches!(grb.ia(), Err(OutputError::Malformed(_))));
    }

    #[test]
    fn wrong_type_lookup_is_malformed() {
        let grb = GridFile::from_bytes(strip_grb()).unwrap();
        assert!(grb.doubles("IA").is_err());
        assert!(grb.integers("BOTM").is_err());
    }

    #[test]
    fn rejects_non_grid_files() {
        let mut bytes = Vec::new();
        fixture::text_left(&mut bytes, "HEAD", HEADER_LEN * 4);
        assert!(GridFile::from_bytes(bytes).is_err());
    }
}
