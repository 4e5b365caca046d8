use super::binary::{count, product, BinaryReader};
use super::error::{OutputError, OutputResult};
use super::KstpKper;
use ndarray::Array3;
use std::path::Path;

/// Header written before every layer of a head snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadRecordHeader {
    pub kstp: usize,
    pub kper: usize,
    pub pertim: f64,
    pub totim: f64,
    pub text: String,
    pub ncol: usize,
    pub nrow: usize,
    pub ilay: usize,
}

/// Dependent-variable file (`.hds`), one record per layer per saved step.
#[derive(Debug, Clone)]
pub struct HeadFile {
    records: Vec<(HeadRecordHeader, Vec<f64>)>,
}

impl HeadFile {
    pub fn open(path: &Path) -> OutputResult<Self> {
        Self::parse(BinaryReader::open(path)?)
    }

    pub fn from_bytes(bytes: Vec<u8>) -> OutputResult<Self> {
        Self::parse(BinaryReader::from_bytes(bytes))
    }

    fn parse(mut reader: BinaryReader) -> OutputResult<Self> {
        let mut records = Vec::new();
        while !reader.at_end() {
            let header = HeadRecordHeader {
                kstp: count(reader.read_i32("kstp")?, "kstp")?,
                kper: count(reader.read_i32("kper")?, "kper")?,
                pertim: reader.read_f64("pertim")?,
                totim: reader.read_f64("totim")?,
                text: reader.read_text(16, "text")?,
                ncol: count(reader.read_i32("ncol")?, "ncol")?,
                nrow: count(reader.read_i32("nrow")?, "nrow")?,
                ilay: count(reader.read_i32("ilay")?, "ilay")?,
            };
            if header.kstp == 0 || header.kper == 0 || header.ilay == 0 {
                return Err(OutputError::Malformed(format!(
                    "head record at byte {} has zero step, period or layer",
                    reader.position()
                )));
            }
            let data = reader.read_f64s(product(&[header.ncol, header.nrow], "head layer")?, "head values")?;
            records.push((header, data));
        }
        Ok(HeadFile { records })
    }

    pub fn headers(&self) -> impl Iterator<Item = &HeadRecordHeader> {
        self.records.iter().map(|(h, _)| h)
    }

    /// Saved (time step, stress period) pairs in file order.
    pub fn kstpkper(&self) -> Vec<KstpKper> {
        let mut out: Vec<KstpKper> = Vec::new();
        for h in self.headers() {
            let key = (h.kstp - 1, h.kper - 1);
            if out.last() != Some(&key) {
                out.push(key);
            }
        }
        out
    }

    /// Simulation times of the saved snapshots.
    pub fn times(&self) -> Vec<f64> {
        let mut out: Vec<f64> = Vec::new();
        for h in self.headers() {
            if out.last() != Some(&h.totim) {
                out.push(h.totim);
            }
        }
        out
    }

    /// Head array of shape `(nlay, nrow, ncol)` for one snapshot.
    pub fn get_data(&self, kstpkper: KstpKper) -> OutputResult<Array3<f64>> {
        let (kstp, kper) = kstpkper;
        let layers: Vec<&(HeadRecordHeader, Vec<f64>)> = self
            .records
            .iter()
            .filter(|(h, _)| h.kstp == kstp + 1 && h.kper == kper + 1)
            .collect();
        let Some((first, _)) = layers.first() else {
            return Err(OutputError::RecordNotFound {
                text: "HEAD".to_string(),
                kstp,
                kper,
            });
        };

        let (nrow, ncol) = (first.nrow, first.ncol);
        let nlay = layers.iter().map(|(h, _)| h.ilay).max().unwrap_or(1);
        let mut heads = Array3::<f64>::zeros((nlay, nrow, ncol));
        for (h, data) in layers {
            if h.nrow != nrow || h.ncol != ncol {
                return Err(OutputError::Malformed(format!(
                    "layer {} is {}x{}, expected {}x{}",
                    h.ilay, h.nrow, h.ncol, nrow, ncol
                )));
            }
            for (i, v) in data.iter().enumerate() {
                heads[[h.ilay - 1, i / ncol, i % ncol]] = *v;
            }
        }
        Ok(heads)
    }

    /// Last saved snapshot.
    pub fn get_last(&self) -> OutputResult<Array3<f64>> {
        let last = self
            .kstpkper()
            .last()
            .copied()
            .ok_or_else(|| OutputError::Malformed("head file has no records".to_string()))?;
        self.get_data(last)
    }
}
