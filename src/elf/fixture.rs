//! Synthesizes small ELF64 little-endian images for tests.

use super::defs;

const PROGRAM_HEADER_SIZE: usize = 56;
const VIRTUAL_ADDRESS_START: u64 = 0x400000;

struct Segment {
    segment_type: u32,
    flags: u32,
    data: Vec<u8>,
    memory_size: u64,
}

#[derive(Default)]
pub struct ElfBuilder {
    entry: u64,
    segments: Vec<Segment>,
}

impl ElfBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entry(mut self, entry: u64) -> Self {
        self.entry = entry;
        self
    }

    pub fn segment(mut self, segment_type: u32, flags: u32, data: &[u8], memory_size: u64) -> Self {
        self.segments.push(Segment {
            segment_type,
            flags,
            data: data.to_vec(),
            memory_size,
        });
        self
    }

    /// Header, then the program header table, then segment bytes in order.
    pub fn build(&self) -> Vec<u8> {
        let mut result = vec![0u8; defs::ELF_HEADER_SIZE];
        result[..4].copy_from_slice(&defs::ELF_MAGIC);
        result[defs::ELF_IDENT_CLASS] = defs::ELF_CLASS_64_BIT;
        result[defs::ELF_IDENT_DATA] = defs::ELF_DATA_LITTLE_ENDIAN;
        result[6] = 1;
        put(&mut result, 0x10, &2u16.to_le_bytes());
        put(&mut result, 0x12, &62u16.to_le_bytes());
        put(&mut result, 0x14, &1u32.to_le_bytes());
        put(&mut result, defs::ELF_HEADER_ENTRY, &self.entry.to_le_bytes());
        put(&mut result, defs::ELF_HEADER_PHOFF, &(defs::ELF_HEADER_SIZE as u64).to_le_bytes());
        put(&mut result, 0x34, &(defs::ELF_HEADER_SIZE as u16).to_le_bytes());
        put(&mut result, defs::ELF_HEADER_PHENTSIZE, &(PROGRAM_HEADER_SIZE as u16).to_le_bytes());
        put(&mut result, defs::ELF_HEADER_PHNUM, &(self.segments.len() as u16).to_le_bytes());

        let mut data_offset = defs::ELF_HEADER_SIZE + PROGRAM_HEADER_SIZE * self.segments.len();
        for segment in &self.segments {
            let mut entry = vec![0u8; PROGRAM_HEADER_SIZE];
            let offset = data_offset as u64;
            put(&mut entry, defs::PROGRAM_HEADER_TYPE, &segment.segment_type.to_le_bytes());
            put(&mut entry, defs::PROGRAM_HEADER_FLAGS, &segment.flags.to_le_bytes());
            put(&mut entry, defs::PROGRAM_HEADER_OFFSET, &offset.to_le_bytes());
            put(&mut entry, defs::PROGRAM_HEADER_VADDR, &(VIRTUAL_ADDRESS_START + offset).to_le_bytes());
            put(&mut entry, 24, &(VIRTUAL_ADDRESS_START + offset).to_le_bytes());
            put(&mut entry, defs::PROGRAM_HEADER_FILESZ, &(segment.data.len() as u64).to_le_bytes());
            put(&mut entry, defs::PROGRAM_HEADER_MEMSZ, &segment.memory_size.to_le_bytes());
            put(&mut entry, 48, &0x1000u64.to_le_bytes());
            result.extend(entry);
            data_offset += segment.data.len();
        }

        for segment in &self.segments {
            result.extend(&segment.data);
        }
        result
    }
}

fn put(buf: &mut [u8], offset: usize, bytes: &[u8]) {
    buf[offset..offset + bytes.len()].copy_from_slice(bytes);
}
