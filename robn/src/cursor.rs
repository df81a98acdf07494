//! Bounds-checked reads over a blob.

use crate::{
    error::{
        Error,
        Result,
    },
    tag::Tag,
};

/// A read position into a borrowed blob.
///
/// Every read checks the remaining length first and fails with
/// [`Error::Truncated`] without advancing. Cursors never outlive the blob
/// they borrow and never escape a decode call.
#[derive(Clone, Debug)]
pub struct Cursor<'a> {
    buf: &'a [u8],
    offset: usize,
}

impl<'a> Cursor<'a> {
    #[inline]
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, offset: 0 }
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.offset
    }

    /// Rewinds or fast-forwards within the blob. Used by the cross-kind
    /// vector path to re-decode from the start of a vector.
    #[inline]
    pub(crate) fn set_position(&mut self, position: usize) {
        debug_assert!(position <= self.buf.len());
        self.offset = position;
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.offset
    }

    #[inline]
    pub fn is_at_end(&self) -> bool {
        self.remaining() == 0
    }

    #[inline]
    fn ensure(&self, needed: usize) -> Result<()> {
        if needed > self.remaining() {
            Err(Error::Truncated {
                offset: self.offset,
                needed,
                remaining: self.remaining(),
            })
        }
        else {
            Ok(())
        }
    }

    #[inline]
    pub fn read_byte(&mut self) -> Result<u8> {
        self.ensure(1)?;
        let byte = self.buf[self.offset];
        self.offset += 1;
        Ok(byte)
    }

    #[inline]
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        self.ensure(N)?;
        let mut array = [0; N];
        array.copy_from_slice(&self.buf[self.offset..self.offset + N]);
        self.offset += N;
        Ok(array)
    }

    /// Borrows the next `n` bytes and advances past them.
    #[inline]
    pub fn read_slice(&mut self, n: usize) -> Result<&'a [u8]> {
        self.ensure(n)?;
        let slice = &self.buf[self.offset..self.offset + n];
        self.offset += n;
        Ok(slice)
    }

    /// Reads one type tag byte.
    #[inline]
    pub fn read_tag(&mut self) -> Result<Tag> {
        Ok(Tag::from(self.read_byte()?))
    }

    /// The unread remainder of the blob, without advancing.
    #[inline]
    pub fn rest(&self) -> &'a [u8] {
        &self.buf[self.offset..]
    }

    #[inline]
    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.ensure(n)?;
        self.offset += n;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_advance_monotonically() {
        let mut cursor = Cursor::new(&[1, 2, 3, 4]);
        assert_eq!(cursor.read_byte().unwrap(), 1);
        assert_eq!(cursor.position(), 1);
        assert_eq!(cursor.read_array::<2>().unwrap(), [2, 3]);
        assert_eq!(cursor.position(), 3);
        assert_eq!(cursor.read_slice(1).unwrap(), &[4]);
        assert!(cursor.is_at_end());
    }

    #[test]
    fn truncated_reads_fail_without_advancing() {
        let mut cursor = Cursor::new(&[1, 2]);
        cursor.read_byte().unwrap();
        let error = cursor.read_array::<4>().unwrap_err();
        assert_eq!(
            error,
            Error::Truncated {
                offset: 1,
                needed: 4,
                remaining: 1,
            }
        );
        assert_eq!(cursor.position(), 1);
        assert_eq!(cursor.read_byte().unwrap(), 2);
    }

    #[test]
    fn skip_is_bounds_checked() {
        let mut cursor = Cursor::new(&[0; 3]);
        cursor.skip(2).unwrap();
        assert!(cursor.skip(2).is_err());
        assert_eq!(cursor.position(), 2);
    }
}
