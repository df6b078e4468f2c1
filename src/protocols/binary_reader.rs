use std::io::Cursor;

use byteorder::{LittleEndian, ReadBytesExt};
use thiserror::Error;

/// Little-endian cursor over an instruction payload.
pub struct BinaryReader<'a> {
    buffer: &'a [u8],
    offset: usize,
}

impl<'a> BinaryReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            buffer: data,
            offset: 0,
        }
    }

    /// Reader positioned after a discriminator of `width` bytes.
    pub fn after(data: &'a [u8], width: usize) -> Result<Self, BinaryReaderError> {
        let mut reader = Self::new(data);
        reader.skip(width)?;
        Ok(reader)
    }

    pub fn skip(&mut self, length: usize) -> Result<(), BinaryReaderError> {
        self.check_bounds(length)?;
        self.offset += length;
        Ok(())
    }

    pub fn read_fixed_array(&mut self, length: usize) -> Result<&'a [u8], BinaryReaderError> {
        self.check_bounds(length)?;
        let slice = &self.buffer[self.offset..self.offset + length];
        self.offset += length;
        Ok(slice)
    }

    pub fn read_u8(&mut self) -> Result<u8, BinaryReaderError> {
        self.check_bounds(1)?;
        let value = self.buffer[self.offset];
        self.offset += 1;
        Ok(value)
    }

    pub fn read_u32(&mut self) -> Result<u32, BinaryReaderError> {
        self.check_bounds(4)?;
        let mut cursor = Cursor::new(&self.buffer[self.offset..self.offset + 4]);
        let value = cursor
            .read_u32::<LittleEndian>()
            .map_err(BinaryReaderError::Io)?;
        self.offset += 4;
        Ok(value)
    }

    pub fn read_u64(&mut self) -> Result<u64, BinaryReaderError> {
        self.check_bounds(8)?;
        let mut cursor = Cursor::new(&self.buffer[self.offset..self.offset + 8]);
        let value = cursor
            .read_u64::<LittleEndian>()
            .map_err(BinaryReaderError::Io)?;
        self.offset += 8;
        Ok(value)
    }

    pub fn read_i64(&mut self) -> Result<i64, BinaryReaderError> {
        self.check_bounds(8)?;
        let mut cursor = Cursor::new(&self.buffer[self.offset..self.offset + 8]);
        let value = cursor
            .read_i64::<LittleEndian>()
            .map_err(BinaryReaderError::Io)?;
        self.offset += 8;
        Ok(value)
    }

    /// Bincode string: u64 length prefix.
    pub fn read_bincode_string(&mut self) -> Result<String, BinaryReaderError> {
        let length = usize::try_from(self.read_u64()?).map_err(|_| {
            BinaryReaderError::BufferOverflow {
                length: usize::MAX,
                offset: self.offset,
                buffer_len: self.buffer.len(),
            }
        })?;
        self.read_utf8(length)
    }

    /// Remaining bytes as text, used for unprefixed trailing strings.
    pub fn read_remaining_string(&mut self) -> Result<String, BinaryReaderError> {
        self.read_utf8(self.remaining())
    }

    pub fn read_pubkey(&mut self) -> Result<String, BinaryReaderError> {
        let bytes = self.read_fixed_array(32)?;
        Ok(bs58::encode(bytes).into_string())
    }

    /// Token program `COption<Pubkey>`: one tag byte, then the key when set.
    pub fn read_option_pubkey(&mut self) -> Result<Option<String>, BinaryReaderError> {
        match self.read_u8()? {
            0 => Ok(None),
            1 => self.read_pubkey().map(Some),
            tag => Err(BinaryReaderError::InvalidOptionTag(tag)),
        }
    }

    pub fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.offset)
    }

    fn read_utf8(&mut self, length: usize) -> Result<String, BinaryReaderError> {
        let bytes = self.read_fixed_array(length)?;
        String::from_utf8(bytes.to_vec()).map_err(BinaryReaderError::InvalidString)
    }

    fn check_bounds(&self, length: usize) -> Result<(), BinaryReaderError> {
        if self.offset.saturating_add(length) > self.buffer.len() {
            return Err(BinaryReaderError::BufferOverflow {
                length,
                offset: self.offset,
                buffer_len: self.buffer.len(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum BinaryReaderError {
    #[error("buffer overflow: trying to read {length} bytes at offset {offset} from buffer of length {buffer_len}")]
    BufferOverflow {
        length: usize,
        offset: usize,
        buffer_len: usize,
    },
    #[error("failed to read value: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to read string: {0}")]
    InvalidString(#[from] std::string::FromUtf8Error),
    #[error("invalid option tag {0}")]
    InvalidOptionTag(u8),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_little_endian_values() {
        let mut data = vec![7u8];
        data.extend(513u32.to_le_bytes());
        data.extend(u64::MAX.to_le_bytes());
        data.extend((-5i64).to_le_bytes());
        let mut reader = BinaryReader::new(&data);
        assert_eq!(reader.read_u8().unwrap(), 7);
        assert_eq!(reader.read_u32().unwrap(), 513);
        assert_eq!(reader.read_u64().unwrap(), u64::MAX);
        assert_eq!(reader.read_i64().unwrap(), -5);
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn reads_length_prefixed_strings() {
        let mut data = 4u64.to_le_bytes().to_vec();
        data.extend(b"seed");
        data.extend(b"ok");
        let mut reader = BinaryReader::new(&data);
        assert_eq!(reader.read_bincode_string().unwrap(), "seed");
        assert_eq!(reader.read_remaining_string().unwrap(), "ok");
    }

    #[test]
    fn reads_optional_pubkey() {
        let mut data = vec![1u8];
        data.extend([0u8; 32]);
        data.push(0);
        let mut reader = BinaryReader::new(&data);
        assert_eq!(
            reader.read_option_pubkey().unwrap().as_deref(),
            Some("11111111111111111111111111111111")
        );
        assert_eq!(reader.read_option_pubkey().unwrap(), None);
        assert!(matches!(
            BinaryReader::new(&[2]).read_option_pubkey(),
            Err(BinaryReaderError::InvalidOptionTag(2))
        ));
    }

    #[test]
    fn reports_overflow() {
        let mut reader = BinaryReader::new(&[1, 2, 3]);
        let err = reader.read_u64().unwrap_err();
        assert!(matches!(
            err,
            BinaryReaderError::BufferOverflow {
                length: 8,
                offset: 0,
                buffer_len: 3
            }
        ));
        assert!(BinaryReader::after(&[1, 2], 4).is_err());
    }
}
