// Licensed under the Apache-2.0 license

//! Outer token object writer

use crate::EatError;

/// Writes `{"<name>":<section>,...}` into a fixed buffer
pub struct TokenWriter<'a> {
    buffer: &'a mut [u8],
    pos: usize,
    sections: usize,
}

impl<'a> TokenWriter<'a> {
    pub fn new(buffer: &'a mut [u8]) -> Result<Self, EatError> {
        let mut writer = Self {
            buffer,
            pos: 0,
            sections: 0,
        };
        writer.write_bytes(b"{")?;
        Ok(writer)
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), EatError> {
        let end_pos = self
            .pos
            .checked_add(bytes.len())
            .ok_or(EatError::BufferTooSmall)?;
        let dest = self
            .buffer
            .get_mut(self.pos..end_pos)
            .ok_or(EatError::BufferTooSmall)?;
        dest.copy_from_slice(bytes);
        self.pos = end_pos;
        Ok(())
    }

    /// Append a section
    ///
    /// # Arguments
    ///
    /// * `name` - Section name, written as a JSON key without escaping
    /// * `json` - Encoded section
    pub fn section(&mut self, name: &str, json: &[u8]) -> Result<(), EatError> {
        if name.bytes().any(|b| b == b'"' || b == b'\\' || b < 0x20) {
            return Err(EatError::InvalidData);
        }
        if self.sections > 0 {
            self.write_bytes(b",")?;
        }
        self.write_bytes(b"\"")?;
        self.write_bytes(name.as_bytes())?;
        self.write_bytes(b"\":")?;
        self.write_bytes(json)?;
        self.sections += 1;
        Ok(())
    }

    /// Close the object
    ///
    /// # Returns
    ///
    /// * `usize` - Total token length
    pub fn finish(mut self) -> Result<usize, EatError> {
        self.write_bytes(b"}")?;
        Ok(self.pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_layout() {
        let mut buf = [0u8; 64];
        let mut writer = TokenWriter::new(&mut buf).unwrap();
        writer.section("header", br#"{"a":1}"#).unwrap();
        writer.section("sign", br#"{"r":"00"}"#).unwrap();
        let len = writer.finish().unwrap();
        assert_eq!(&buf[..len], br#"{"header":{"a":1},"sign":{"r":"00"}}"#);
    }

    #[test]
    fn test_buffer_too_small() {
        let mut buf = [0u8; 12];
        let mut writer = TokenWriter::new(&mut buf).unwrap();
        assert_eq!(
            writer.section("header", br#"{"a":1}"#),
            Err(EatError::BufferTooSmall)
        );

        let mut empty = [0u8; 0];
        assert_eq!(
            TokenWriter::new(&mut empty).err(),
            Some(EatError::BufferTooSmall)
        );
    }

    #[test]
    fn test_invalid_name() {
        let mut buf = [0u8; 32];
        let mut writer = TokenWriter::new(&mut buf).unwrap();
        assert_eq!(writer.section("a\"b", b"1"), Err(EatError::InvalidData));
    }
}
