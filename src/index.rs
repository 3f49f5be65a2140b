use crate::*;

/// Largest index that fits in an i32.
pub const MAX_INT32: i64 = i32::MAX as i64;

/// Sequential indices that wrap around: `i0, i0+1, ..., imax, imin,
/// imin+1, ...` forever.
#[derive(Clone, Debug)]
pub struct IndexGenerator {
    imin: i64,
    imax: i64,
    next: i64,
}

impl IndexGenerator {
    pub fn new(imin: i64, imax: i64, i0: Option<i64>) -> Result<Self> {
        let i0 = i0.unwrap_or(imin);
        if imax <= imin {
            return Err(Error::IndexBounds(imin, imax));
        }
        if i0 < imin || i0 > imax {
            return Err(Error::IndexStart(i0, imin, imax));
        }
        Ok(IndexGenerator { imin, imax, next: i0 })
    }
}

impl Default for IndexGenerator {
    // index 0 is special and negative indices are avoided
    fn default() -> Self {
        IndexGenerator { imin: 1, imax: MAX_INT32, next: 1 }
    }
}

impl Iterator for IndexGenerator {
    type Item = i64;
    fn next(&mut self) -> Option<i64> {
        let index = self.next;
        self.next = if index >= self.imax { self.imin } else { index + 1 };
        Some(index)
    }
}
