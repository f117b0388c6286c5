pub mod defs;
#[cfg(test)]
pub mod fixture;

use std::fmt::Display;

use paste::paste;

use crate::error::ConvertError;

/// Returns `bytes[offset..offset + len]`, or `CorruptInput` when the range
/// leaves the buffer.
pub fn checked_slice<'a>(
    bytes: &'a [u8],
    offset: u64,
    len: u64,
    what: &'static str,
) -> Result<&'a [u8], ConvertError> {
    let corrupt = || ConvertError::CorruptInput {
        what,
        offset,
        len,
        available: bytes.len(),
    };
    let end = offset.checked_add(len).ok_or_else(corrupt)?;
    if end > bytes.len() as u64 {
        return Err(corrupt());
    }
    Ok(&bytes[offset as usize..end as usize])
}

macro_rules! le_readers {
    ( $($ty:ident),* ) => {
        $(
            paste! {
                pub fn [<read_ $ty>](bytes: &[u8], offset: usize, what: &'static str) -> Result<$ty, ConvertError> {
                    const SIZE: usize = std::mem::size_of::<$ty>();
                    let slice = checked_slice(bytes, offset as u64, SIZE as u64, what)?;
                    let mut buf = [0u8; SIZE];
                    buf.copy_from_slice(slice);
                    Ok($ty::from_le_bytes(buf))
                }
            }
        )*
    };
}

le_readers!(u16, u32, u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElfHeader {
    pub entry_point: u64,
    pub program_header_offset: u64,
    pub program_header_entry_size: u16,
    pub program_header_count: u16,
}

impl ElfHeader {
    /// Validates the identification bytes and decodes the fields needed to
    /// walk the program header table.
    pub fn parse(bytes: &[u8]) -> Result<Self, ConvertError> {
        if bytes.get(..defs::ELF_MAGIC.len()) != Some(&defs::ELF_MAGIC[..]) {
            return Err(ConvertError::InvalidFormat);
        }

        let ident = checked_slice(bytes, 0, defs::ELF_IDENT_DATA as u64 + 1, "ELF ident")?;
        let class = ident[defs::ELF_IDENT_CLASS];
        let data = ident[defs::ELF_IDENT_DATA];
        if class != defs::ELF_CLASS_64_BIT || data != defs::ELF_DATA_LITTLE_ENDIAN {
            return Err(ConvertError::UnsupportedFormat { class, data });
        }

        checked_slice(bytes, 0, defs::ELF_HEADER_SIZE as u64, "ELF header")?;

        Ok(Self {
            entry_point: read_u64(bytes, defs::ELF_HEADER_ENTRY, "e_entry")?,
            program_header_offset: read_u64(bytes, defs::ELF_HEADER_PHOFF, "e_phoff")?,
            program_header_entry_size: read_u16(bytes, defs::ELF_HEADER_PHENTSIZE, "e_phentsize")?,
            program_header_count: read_u16(bytes, defs::ELF_HEADER_PHNUM, "e_phnum")?,
        })
    }

    /// Decodes every entry of the program header table, in index order.
    pub fn program_headers(&self, bytes: &[u8]) -> Result<Vec<ProgramHeaderEntry>, ConvertError> {
        let count = self.program_header_count as u64;
        let entry_size = self.program_header_entry_size as u64;
        if count == 0 {
            return Ok(vec![]);
        }
        if entry_size < defs::PROGRAM_HEADER_MIN_SIZE as u64 {
            return Err(ConvertError::CorruptInput {
                what: "program header entry",
                offset: self.program_header_offset,
                len: defs::PROGRAM_HEADER_MIN_SIZE as u64,
                available: entry_size as usize,
            });
        }

        let table = checked_slice(
            bytes,
            self.program_header_offset,
            count * entry_size,
            "program header table",
        )?;

        table
            .chunks_exact(entry_size as usize)
            .map(ProgramHeaderEntry::parse)
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgramHeaderEntry {
    pub segment_type: u32,
    pub flags: u32,
    pub file_offset: u64,
    pub virtual_address: u64,
    pub file_size: u64,
    pub memory_size: u64,
}

impl ProgramHeaderEntry {
    pub fn parse(entry: &[u8]) -> Result<Self, ConvertError> {
        Ok(Self {
            segment_type: read_u32(entry, defs::PROGRAM_HEADER_TYPE, "p_type")?,
            flags: read_u32(entry, defs::PROGRAM_HEADER_FLAGS, "p_flags")?,
            file_offset: read_u64(entry, defs::PROGRAM_HEADER_OFFSET, "p_offset")?,
            virtual_address: read_u64(entry, defs::PROGRAM_HEADER_VADDR, "p_vaddr")?,
            file_size: read_u64(entry, defs::PROGRAM_HEADER_FILESZ, "p_filesz")?,
            memory_size: read_u64(entry, defs::PROGRAM_HEADER_MEMSZ, "p_memsz")?,
        })
    }

    pub fn is_load(&self) -> bool {
        self.segment_type == defs::PROGRAM_TYPE_LOAD
    }

    pub fn is_executable(&self) -> bool {
        self.flags & defs::PROGRAM_HEADER_EXEC != 0
    }

    pub fn is_writable(&self) -> bool {
        self.flags & defs::PROGRAM_HEADER_WRITE != 0
    }

    /// Memory reserved past the file image.
    pub fn bss_size(&self) -> u64 {
        self.memory_size.saturating_sub(self.file_size)
    }

    pub fn data<'a>(&self, bytes: &'a [u8]) -> Result<&'a [u8], ConvertError> {
        checked_slice(bytes, self.file_offset, self.file_size, "segment")
    }

    pub fn type_name(&self) -> &'static str {
        match self.segment_type {
            defs::PROGRAM_TYPE_LOAD => "LOAD",
            defs::PROGRAM_TYPE_DYNAMIC => "DYNAMIC",
            defs::PROGRAM_TYPE_INTERP => "INTERP",
            defs::PROGRAM_TYPE_NOTE => "NOTE",
            _ => "OTHER",
        }
    }
}

impl Display for ProgramHeaderEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let flag = |bit, c| if self.flags & bit != 0 { c } else { '-' };
        write!(
            f,
            "{} {}{}{} offset=0x{:x} vaddr=0x{:x} filesz={} memsz={}",
            self.type_name(),
            flag(defs::PROGRAM_HEADER_READ, 'R'),
            flag(defs::PROGRAM_HEADER_WRITE, 'W'),
            flag(defs::PROGRAM_HEADER_EXEC, 'X'),
            self.file_offset,
            self.virtual_address,
            self.file_size,
            self.memory_size
        )
    }
}
