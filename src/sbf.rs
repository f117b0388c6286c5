use std::io::Write;

use crate::{error::ConvertError, segments::ClassifiedImage};

pub const SBF_MAGIC: [u8; 4] = *b"SBF\0";
pub const SBF_BITS_64: u8 = 64;
pub const SBF_ENDIAN_LITTLE: u8 = 1;

/// magic(4) bits(1) endian(1) flags(2) entry(8) text_off(4) text_sz(4)
/// data_off(4) data_sz(4) bss_sz(4)
pub const HEADER_SIZE: usize = 36;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SbfHeader {
    pub magic: [u8; 4],
    pub bits: u8,
    pub endian: u8,
    pub flags: u16,
    pub entry_point: u64,
    pub text_offset: u32,
    pub text_size: u32,
    pub data_offset: u32,
    pub data_size: u32,
    pub bss_size: u32,
}

fn fit(field: &'static str, value: u64) -> Result<u32, ConvertError> {
    u32::try_from(value).map_err(|_| ConvertError::FieldOverflow { field, value })
}

impl SbfHeader {
    pub fn new(image: &ClassifiedImage) -> Result<Self, ConvertError> {
        let text_size = image.text_bytes.len() as u64;
        let data_size = image.data_bytes.len() as u64;
        let text_offset = HEADER_SIZE as u64;
        let data_offset = text_offset + text_size;

        Ok(Self {
            magic: SBF_MAGIC,
            bits: SBF_BITS_64,
            endian: SBF_ENDIAN_LITTLE,
            flags: 0,
            entry_point: image.entry_point,
            text_offset: fit("text_offset", text_offset)?,
            text_size: fit("text_size", text_size)?,
            data_offset: fit("data_offset", data_offset)?,
            data_size: fit("data_size", data_size)?,
            bss_size: fit("bss_size", image.bss_size)?,
        })
    }

    pub fn to_bin(&self) -> Vec<u8> {
        let mut result = Vec::with_capacity(HEADER_SIZE);
        result.extend(self.magic);
        result.push(self.bits);
        result.push(self.endian);
        result.extend(self.flags.to_le_bytes());
        result.extend(self.entry_point.to_le_bytes());
        for field in [
            self.text_offset,
            self.text_size,
            self.data_offset,
            self.data_size,
            self.bss_size,
        ] {
            result.extend(field.to_le_bytes());
        }
        result
    }

    #[cfg(test)]
    pub fn parse(bytes: &[u8]) -> Result<Self, ConvertError> {
        use crate::elf::{checked_slice, read_u16, read_u32, read_u64};

        let header = checked_slice(bytes, 0, HEADER_SIZE as u64, "SBF header")?;
        let mut magic = [0u8; 4];
        magic.copy_from_slice(&header[..4]);
        Ok(Self {
            magic,
            bits: header[4],
            endian: header[5],
            flags: read_u16(header, 6, "flags")?,
            entry_point: read_u64(header, 8, "entry_point")?,
            text_offset: read_u32(header, 16, "text_offset")?,
            text_size: read_u32(header, 20, "text_size")?,
            data_offset: read_u32(header, 24, "data_offset")?,
            data_size: read_u32(header, 28, "data_size")?,
            bss_size: read_u32(header, 32, "bss_size")?,
        })
    }
}

/// Header followed by TEXT then DATA, with no padding in between.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SbfImage {
    header: SbfHeader,
    text: Vec<u8>,
    data: Vec<u8>,
}

impl SbfImage {
    pub fn build(image: ClassifiedImage) -> Result<Self, ConvertError> {
        let header = SbfHeader::new(&image)?;
        Ok(Self {
            header,
            text: image.text_bytes,
            data: image.data_bytes,
        })
    }

    pub fn header(&self) -> &SbfHeader {
        &self.header
    }

    pub fn len(&self) -> usize {
        HEADER_SIZE + self.text.len() + self.data.len()
    }

    pub fn write_to<W: Write>(&self, mut out: W) -> std::io::Result<()> {
        out.write_all(&self.header.to_bin())?;
        out.write_all(&self.text)?;
        out.write_all(&self.data)?;
        out.flush()
    }

    #[cfg(test)]
    pub fn to_bin(&self) -> Vec<u8> {
        let mut result = Vec::with_capacity(self.len());
        result.extend(self.header.to_bin());
        result.extend(&self.text);
        result.extend(&self.data);
        result
    }
}
