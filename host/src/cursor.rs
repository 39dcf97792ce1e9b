//! Module for cursors over a byte slice.
//!

use crate::codec::{Decode, Encode, Error, FixedSize};

/// Not a byte writer. It is just a cursor to track where a byte slice is being written.
pub struct WriteCursor<'d> {
    pos: usize,
    data: &'d mut [u8],
}

impl<'d> WriteCursor<'d> {
    /// Creates a new write cursor at the beginning of the data.
    pub fn new(data: &'d mut [u8]) -> Self {
        Self { pos: 0, data }
    }

    /// Append byte slice
    pub fn append(&mut self, data: &[u8]) -> Result<(), Error> {
        if self.available() < data.len() {
            Err(Error::InsufficientSpace)
        } else {
            self.data[self.pos..self.pos + data.len()].copy_from_slice(data);
            self.pos += data.len();
            Ok(())
        }
    }

    /// Write fixed sized type
    pub fn write<E: Encode>(&mut self, data: E) -> Result<(), Error> {
        if self.available() < data.size() {
            Err(Error::InsufficientSpace)
        } else {
            data.encode(&mut self.data[self.pos..self.pos + data.size()])?;
            self.pos += data.size();
            Ok(())
        }
    }

    /// Returns amount of bytes that remain available.
    pub fn available(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Returns the current length of the data written.
    pub fn len(&self) -> usize {
        self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.pos == 0
    }

    /// Returns the byte slice that was written by this cursor.
    pub fn finish(self) -> &'d mut [u8] {
        &mut self.data[..self.pos]
    }
}

/// Forward-only reader that never reads past the end of its slice.
///
/// Every read checks the remaining length first and leaves the position untouched on failure.
#[derive(Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug)]
pub struct ReadCursor<'d> {
    pos: usize,
    data: &'d [u8],
}

impl<'d> ReadCursor<'d> {
    pub fn new(data: &'d [u8]) -> Self {
        Self { pos: 0, data }
    }

    pub fn read<T: Decode<'d> + FixedSize>(&mut self) -> Result<T, Error> {
        if self.available() < T::SIZE {
            return Err(Error::InsufficientSpace);
        }
        let val = T::decode(&self.data[self.pos..self.pos + T::SIZE])?;
        self.pos += T::SIZE;
        Ok(val)
    }

    /// Reads a fixed size array, e.g. an identifier field.
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], Error> {
        let mut out = [0; N];
        out.copy_from_slice(self.slice(N)?);
        Ok(out)
    }

    pub fn slice(&mut self, nbytes: usize) -> Result<&'d [u8], Error> {
        if self.available() < nbytes {
            Err(Error::InsufficientSpace)
        } else {
            let src = &self.data[self.pos..self.pos + nbytes];
            self.pos += nbytes;
            Ok(src)
        }
    }

    pub fn available(&self) -> usize {
        self.data.len() - self.pos
    }

    /// True once every byte has been consumed.
    pub fn is_empty(&self) -> bool {
        self.available() == 0
    }

    /// Moves the cursor to the end of the data, ending any further reads.
    pub fn exhaust(&mut self) {
        self.pos = self.data.len();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_stops_at_end() {
        let data = [0x01, 0xaa, 0xfe];
        let mut cursor = ReadCursor::new(&data[..]);
        assert_eq!(cursor.read::<u8>(), Ok(0x01));
        assert_eq!(cursor.read::<u16>(), Ok(0xfeaa));
        assert_eq!(cursor.read::<u8>(), Err(Error::InsufficientSpace));
        assert!(cursor.is_empty());
    }

    #[test]
    fn failed_read_does_not_advance() {
        let data = [0x01, 0x02, 0x03];
        let mut cursor = ReadCursor::new(&data[..]);
        assert_eq!(cursor.slice(4), Err(Error::InsufficientSpace));
        assert_eq!(cursor.available(), 3);
        assert_eq!(cursor.read_array::<2>(), Ok([0x01, 0x02]));
        assert!(!cursor.is_empty());
        assert_eq!(cursor.slice(1), Ok(&[0x03][..]));
    }

    #[test]
    fn write_cursor_rejects_overflow() {
        let mut buf = [0u8; 3];
        let mut w = WriteCursor::new(&mut buf[..]);
        w.append(&[0x02, 0x01]).unwrap();
        assert_eq!(w.write(0xfeaau16), Err(Error::InsufficientSpace));
        w.write(0x06u8).unwrap();
        assert_eq!(w.available(), 0);
        assert_eq!(w.finish(), &[0x02, 0x01, 0x06]);
    }
}
