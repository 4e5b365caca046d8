use super::error::{OutputError, OutputResult};
use std::io::{Cursor, ErrorKind, Read};
use std::path::Path;

/// Sequential little-endian reader over a whole file held in memory.
pub(crate) struct BinaryReader {
    cursor: Cursor<Vec<u8>>,
    len: u64,
}

impl BinaryReader {
    pub fn open(path: &Path) -> OutputResult<Self> {
        Ok(Self::from_bytes(std::fs::read(path)?))
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        let len = bytes.len() as u64;
        BinaryReader {
            cursor: Cursor::new(bytes),
            len,
        }
    }

    pub fn at_end(&self) -> bool {
        self.cursor.position() >= self.len
    }

    pub fn position(&self) -> u64 {
        self.cursor.position()
    }

    pub fn remaining(&self) -> u64 {
        self.len.saturating_sub(self.cursor.position())
    }

    /// Fails with `Truncated` unless `count` values of `width` bytes are left.
    fn ensure(&self, count: usize, width: usize, what: &str) -> OutputResult<()> {
        let needed = (count as u64).checked_mul(width as u64);
        match needed {
            Some(n) if n <= self.remaining() => Ok(()),
            _ => Err(OutputError::Truncated {
                what: what.to_string(),
                offset: self.position(),
            }),
        }
    }

    fn fill(&mut self, buf: &mut [u8], what: &str) -> OutputResult<()> {
        let offset = self.cursor.position();
        self.cursor.read_exact(buf).map_err(|e| match e.kind() {
            ErrorKind::UnexpectedEof => OutputError::Truncated {
                what: what.to_string(),
                offset,
            },
            _ => OutputError::Io(e),
        })
    }

    pub fn read_i32(&mut self, what: &str) -> OutputResult<i32> {
        let mut buf = [0u8; 4];
        self.fill(&mut buf, what)?;
        Ok(i32::from_le_bytes(buf))
    }

    pub fn read_f64(&mut self, what: &str) -> OutputResult<f64> {
        let mut buf = [0u8; 8];
        self.fill(&mut buf, what)?;
        Ok(f64::from_le_bytes(buf))
    }

    /// Fixed-width text field with surrounding blanks removed.
    pub fn read_text(&mut self, len: usize, what: &str) -> OutputResult<String> {
        self.ensure(len, 1, what)?;
        let mut buf = vec![0u8; len];
        self.fill(&mut buf, what)?;
        Ok(String::from_utf8_lossy(&buf)
            .trim_matches(|c: char| c.is_whitespace() || c == '\0')
            .to_string())
    }

    pub fn read_f64s(&mut self, count: usize, what: &str) -> OutputResult<Vec<f64>> {
        self.ensure(count, 8, what)?;
        let mut values = Vec::with_capacity(count);
        for _ in 0..count {
            values.push(self.read_f64(what)?);
        }
        Ok(values)
    }

    pub fn read_i32s(&mut self, count: usize, what: &str) -> OutputResult<Vec<i32>> {
        self.ensure(count, 4, what)?;
        let mut values = Vec::with_capacity(count);
        for _ in 0..count {
            values.push(self.read_i32(what)?);
        }
        Ok(values)
    }
}

/// Converts a count read from disk, rejecting negatives.
pub(crate) fn count(value: i32, what: &str) -> OutputResult<usize> {
    usize::try_from(value).map_err(|_| OutputError::Malformed(format!("negative {what}: {value}")))
}

/// Product of array dimensions read from disk, rejecting overflow.
pub(crate) fn product(dims: &[usize], what: &str) -> OutputResult<usize> {
    dims.iter()
        .try_fold(1usize, |acc, &d| acc.checked_mul(d))
        .ok_or_else(|| OutputError::Malformed(format!("{what} dimensions {dims:?} overflow")))
}

/// Byte builders used by the reader tests.
#[cfg(test)]
pub(crate) mod fixture {
    pub fn i32s(out: &mut Vec<u8>, values: &[i32]) {
        for v in values {
            out.extend_from_slice(&v.to_le_bytes());
        }
    }

    pub fn f64s(out: &mut Vec<u8>, values: &[f64]) {
        for v in values {
            out.extend_from_slice(&v.to_le_bytes());
        }
    }

    /// Right-justified text padded with blanks, as the solver writes it.
    pub fn text(out: &mut Vec<u8>, text: &str, len: usize) {
        out.extend_from_slice(format!("{text:>len$}").as_bytes());
    }

    /// Left-justified text padded with blanks.
    pub fn text_left(out: &mut Vec<u8>, text: &str, len: usize) {
        out.extend_from_slice(format!("{text:<len$}").as_bytes());
    }
}
