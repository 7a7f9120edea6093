use crate::error::{Error, Result};

#[derive(Clone, Copy)]
pub struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.bytes.len().saturating_sub(self.pos)
    }

    pub fn read_u1(&mut self) -> Result<u8> {
        let b = *self.bytes.get(self.pos).ok_or(Error::UnexpectedEof)?;
        self.pos += 1;
        Ok(b)
    }

    pub fn read_u2(&mut self) -> Result<u16> {
        let bytes = self.read_n::<2>()?;
        Ok(u16::from_be_bytes(bytes))
    }

    pub fn read_u4(&mut self) -> Result<u32> {
        let bytes = self.read_n::<4>()?;
        Ok(u32::from_be_bytes(bytes))
    }

    pub fn read_i4(&mut self) -> Result<i32> {
        Ok(self.read_u4()? as i32)
    }

    pub fn read_i8(&mut self) -> Result<i64> {
        let bytes = self.read_n::<8>()?;
        Ok(i64::from_be_bytes(bytes))
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self.pos.checked_add(len).ok_or(Error::UnexpectedEof)?;
        if end > self.bytes.len() {
            return Err(Error::UnexpectedEof);
        }
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    pub fn ensure_empty(&self) -> Result<()> {
        if self.remaining() == 0 {
            Ok(())
        } else {
            Err(Error::Other("unexpected trailing bytes"))
        }
    }

    fn read_n<const N: usize>(&mut self) -> Result<[u8; N]> {
        let end = self.pos.checked_add(N).ok_or(Error::UnexpectedEof)?;
        if end > self.bytes.len() {
            return Err(Error::UnexpectedEof);
        }
        let mut out = [0u8; N];
        out.copy_from_slice(&self.bytes[self.pos..end]);
        self.pos = end;
        Ok(out)
    }
}

/// A growable big-endian byte buffer, used by every class-file writer
/// (the top-level writer and each attribute's scratch buffer). Attributes
/// are built into their own `Writer` first so their length can be prefixed
/// once it is known, then spliced into the enclosing buffer.
#[derive(Default, Clone)]
pub struct Writer {
    bytes: Vec<u8>,
}

impl Writer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn write_u1(&mut self, v: u8) {
        self.bytes.push(v);
    }

    pub fn write_u2(&mut self, v: u16) {
        self.bytes.extend_from_slice(&v.to_be_bytes());
    }

    pub fn write_u4(&mut self, v: u32) {
        self.bytes.extend_from_slice(&v.to_be_bytes());
    }

    pub fn write_i4(&mut self, v: i32) {
        self.write_u4(v as u32);
    }

    pub fn write_i8(&mut self, v: i64) {
        self.bytes.extend_from_slice(&v.to_be_bytes());
    }

    pub fn write_bytes(&mut self, data: &[u8]) {
        self.bytes.extend_from_slice(data);
    }

    /// Appends `attr` as a single `attribute_info` entry: its name's constant
    /// pool index, its byte length, then its body.
    pub fn write_attribute(&mut self, name_index: u16, body: &Writer) {
        self.write_u2(name_index);
        self.write_u4(body.len() as u32);
        self.write_bytes(&body.bytes);
    }
}
