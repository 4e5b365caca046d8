use super::binary::{count, product, BinaryReader};
use super::error::{OutputError, OutputResult};
use super::KstpKper;
use std::path::Path;

/// One entry of a list-based budget record.
#[derive(Debug, Clone, PartialEq)]
pub struct ListEntry {
    pub id1: i32,
    pub id2: i32,
    pub q: f64,
    pub aux: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BudgetData {
    /// One value per cell or connection
    Array(Vec<f64>),
    /// Values for selected cells, with model and package identifiers
    List {
        model1: String,
        package1: String,
        model2: String,
        package2: String,
        aux_names: Vec<String>,
        entries: Vec<ListEntry>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct BudgetRecord {
    pub kstp: usize,
    pub kper: usize,
    pub text: String,
    pub ndim1: usize,
    pub ndim2: usize,
    pub ndim3: usize,
    pub imeth: i32,
    pub delt: f64,
    pub pertim: f64,
    pub totim: f64,
    pub data: BudgetData,
}

impl BudgetRecord {
    pub fn kstpkper(&self) -> KstpKper {
        (self.kstp - 1, self.kper - 1)
    }
}

/// Cell-by-cell budget file (`.cbc`, `.cbb` or `.bud`).
#[derive(Debug, Clone)]
pub struct CellBudgetFile {
    records: Vec<BudgetRecord>,
}

impl CellBudgetFile {
    pub fn open(path: &Path) -> OutputResult<Self> {
        Self::parse(BinaryReader::open(path)?)
    }

    pub fn from_bytes(bytes: Vec<u8>) -> OutputResult<Self> {
        Self::parse(BinaryReader::from_bytes(bytes))
    }

    fn parse(mut reader: BinaryReader) -> OutputResult<Self> {
        let mut records = Vec::new();
        while !reader.at_end() {
            records.push(read_record(&mut reader)?);
        }
        Ok(CellBudgetFile { records })
    }

    pub fn records(&self) -> &[BudgetRecord] {
        &self.records
    }

    /// Distinct record names in file order.
    pub fn record_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for r in &self.records {
            if !names.contains(&r.text.as_str()) {
                names.push(&r.text);
            }
        }
        names
    }

    pub fn kstpkper(&self) -> Vec<KstpKper> {
        let mut out: Vec<KstpKper> = Vec::new();
        for r in &self.records {
            if !out.contains(&r.kstpkper()) {
                out.push(r.kstpkper());
            }
        }
        out
    }

    /// Records named `text` (case-insensitive) saved at `kstpkper`.
    pub fn get_data(&self, text: &str, kstpkper: KstpKper) -> OutputResult<Vec<&BudgetRecord>> {
        let found: Vec<&BudgetRecord> = self
            .records
            .iter()
            .filter(|r| r.text.eq_ignore_ascii_case(text.trim()) && r.kstpkper() == kstpkper)
            .collect();
        if found.is_empty() {
            return Err(OutputError::RecordNotFound {
                text: text.to_string(),
                kstp: kstpkper.0,
                kper: kstpkper.1,
            });
        }
        Ok(found)
    }

    /// FLOW-JA-FACE connection flows for one snapshot.
    pub fn flowja(&self, kstpkper: KstpKper) -> OutputResult<Vec<f64>> {
        let record = self.get_data("FLOW-JA-FACE", kstpkper)?[0];
        match &record.data {
            BudgetData::Array(values) => Ok(values.clone()),
            BudgetData::List { .. } => Err(OutputError::Malformed(
                "FLOW-JA-FACE stored as a list".to_string(),
            )),
        }
    }
}

fn read_record(reader: &mut BinaryReader) -> OutputResult<BudgetRecord> {
    let kstp = count(reader.read_i32("kstp")?, "kstp")?;
    let kper = count(reader.read_i32("kper")?, "kper")?;
    let text = reader.read_text(16, "text")?;
    let ndim1 = count(reader.read_i32("ndim1")?, "ndim1")?;
    let ndim2 = count(reader.read_i32("ndim2")?, "ndim2")?;
    let raw_ndim3 = reader.read_i32("ndim3")?;
    if kstp == 0 || kper == 0 {
        return Err(OutputError::Malformed(format!(
            "budget record '{text}' has zero step or period"
        )));
    }

    // A negative third dimension flags the compact header
    let (imeth, delt, pertim, totim) = if raw_ndim3 < 0 {
        (
            reader.read_i32("imeth")?,
            reader.read_f64("delt")?,
            reader.read_f64("pertim")?,
            reader.read_f64("totim")?,
        )
    } else {
        (0, 0.0, 0.0, 0.0)
    };
    let ndim3 = raw_ndim3.unsigned_abs() as usize;

    let data = match imeth {
        0 | 1 => BudgetData::Array(reader.read_f64s(product(&[ndim1, ndim2, ndim3], "budget array")?, "budget array")?),
        6 => read_list(reader)?,
        other => {
            return Err(OutputError::UnsupportedMethod { text, imeth: other });
        }
    };

    Ok(BudgetRecord {
        kstp,
        kper,
        text,
        ndim1,
        ndim2,
        ndim3,
        imeth,
        delt,
        pertim,
        totim,
        data,
    })
}

fn read_list(reader: &mut BinaryReader) -> OutputResult<BudgetData> {
    let model1 = reader.read_text(16, "txt1id1")?;
    let package1 = reader.read_text(16, "txt2id1")?;
    let model2 = reader.read_text(16, "txt1id2")?;
    let package2 = reader.read_text(16, "txt2id2")?;
    let ndat = count(reader.read_i32("ndat")?, "ndat")?;
    if ndat == 0 {
        return Err(OutputError::Malformed("list record with ndat = 0".to_string()));
    }
    let mut aux_names = Vec::with_capacity((ndat - 1).min(reader.remaining() as usize / 16));
    for _ in 1..ndat {
        aux_names.push(reader.read_text(16, "auxtxt")?);
    }
    let nlist = count(reader.read_i32("nlist")?, "nlist")?;
    let mut entries = Vec::with_capacity(nlist.min(reader.remaining() as usize / 8));
    for _ in 0..nlist {
        let id1 = reader.read_i32("id1")?;
        let id2 = reader.read_i32("id2")?;
        let mut values = reader.read_f64s(ndat, "list values")?;
        let aux = values.split_off(1);
        entries.push(ListEntry {
            id1,
            id2,
            q: values[0],
            aux,
        });
    }
    Ok(BudgetData::List {
        model1,
        package1,
        model2,
        package2,
        aux_names,
        entries,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::binary::fixture;

    fn header(out: &mut Vec<u8>, kper: i32, text: &str, ndim1: i32, imeth: i32) {
        fixture::i32s(out, &[1, kper]);
        fixture::text(out, text, 16);
        fixture::i32s(out, &[ndim1, 1, -1, imeth]);
        fixture::f64s(out, &[1.0, 1.0, kper as f64]);
    }

    fn sample() -> Vec<u8> {
        let mut bytes = Vec::new();
        header(&mut bytes, 1, "FLOW-JA-FACE", 4, 1);
        fixture::f64s(&mut bytes, &[0.0, -1.5, 0.0, 1.5]);

        header(&mut bytes, 1, "CHD", 2, 6);
        fixture::text_left(&mut bytes, "DEMO", 16);
        fixture::text_left(&mut bytes, "DEMO", 16);
        fixture::text_left(&mut bytes, "DEMO", 16);
        fixture::text_left(&mut bytes, "CHD_0", 16);
        fixture::i32s(&mut bytes, &[2]);
        fixture::text_left(&mut bytes, "AUX1", 16);
        fixture::i32s(&mut bytes, &[1]);
        fixture::i32s(&mut bytes, &[1, 1]);
        fixture::f64s(&mut bytes, &[1.5, 9.0]);

        header(&mut bytes, 2, "FLOW-JA-FACE", 4, 1);
        fixture::f64s(&mut bytes, &[0.0, -2.0, 0.0, 2.0]);
        bytes
    }

    #[test]
    fn parses_array_and_list_records() {
        let cbc = CellBudgetFile::from_bytes(sample()).unwrap();
        assert_eq!(cbc.records().len(), 3);
        assert_eq!(cbc.record_names(), vec!["FLOW-JA-FACE", "CHD"]);
        assert_eq!(cbc.kstpkper(), vec![(0, 0), (0, 1)]);

        let chd = cbc.get_data("chd", (0, 0)).unwrap();
        match &chd[0].data {
            BudgetData::List {
                package2,
                aux_names,
                entries,
                ..
            } => {
                assert_eq!(package2, "CHD_0");
                assert_eq!(aux_names, &vec!["AUX1".to_string()]);
                assert_eq!(entries[0].q, 1.5);
                assert_eq!(entries[0].aux, vec![9.0]);
            }
            other => panic!("expected list data, got {other:?}"),
        }
    }

    #[test]
    fn flowja_selects_the_requested_snapshot() {
        let cbc = CellBudgetFile::from_bytes(sample()).unwrap();
        assert_eq!(cbc.flowja((0, 1)).unwrap(), vec![0.0, -2.0, 0.0, 2.0]);
        assert!(matches!(
            cbc.flowja((0, 5)),
            Err(OutputError::RecordNotFound { .. })
        ));
    }

    #[test]
    fn unsupported_methods_are_rejected() {
        let mut bytes = Vec::new();
        header(&mut bytes, 1, "STORAGE", 1, 3);
        assert!(matches!(
            CellBudgetFile::from_bytes(bytes),
            Err(OutputError::UnsupportedMethod { imeth: 3, .. })
        ));
    }

    #[test]
    fn corrupt_dimensions_are_errors() {
        let mut bytes = Vec::new();
        fixture::i32s(&mut bytes, &[1, 1]);
        fixture::text(&mut bytes, "FLOW-JA-FACE", 16);
        fixture::i32s(&mut bytes, &[i32::MAX, i32::MAX, -i32::MAX, 1]);
        fixture::f64s(&mut bytes, &[1.0, 1.0, 1.0]);
        assert!(matches!(
            CellBudgetFile::from_bytes(bytes),
            Err(OutputError::Malformed(_))
        ));

        // Fits in usize but not in the file
        let mut bytes = Vec::new();
        header(&mut bytes, 1, "FLOW-JA-FACE", i32::MAX, 1);
        fixture::f64s(&mut bytes, &[0.0, 1.0]);
        assert!(matches!(
            CellBudgetFile::from_bytes(bytes),
            Err(OutputError::Truncated { .. })
        ));
    }
}
