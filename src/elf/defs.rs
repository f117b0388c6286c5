pub const ELF_MAGIC: [u8; 4] = [0x7F, 0x45, 0x4c, 0x46];

pub const ELF_IDENT_CLASS: usize = 4;
pub const ELF_IDENT_DATA: usize = 5;

pub const ELF_CLASS_64_BIT: u8 = 0x2;

pub const ELF_DATA_LITTLE_ENDIAN: u8 = 0x1;

pub const ELF_HEADER_SIZE: usize = 64;

pub const ELF_HEADER_ENTRY: usize = 0x18;
pub const ELF_HEADER_PHOFF: usize = 0x20;
pub const ELF_HEADER_PHENTSIZE: usize = 0x36;
pub const ELF_HEADER_PHNUM: usize = 0x38;

pub const PROGRAM_TYPE_NULL: u32 = 0;
pub const PROGRAM_TYPE_LOAD: u32 = 1;
pub const PROGRAM_TYPE_DYNAMIC: u32 = 2;
pub const PROGRAM_TYPE_INTERP: u32 = 3;
pub const PROGRAM_TYPE_NOTE: u32 = 4;

pub const PROGRAM_HEADER_EXEC: u32 = 0x1;
pub const PROGRAM_HEADER_WRITE: u32 = 0x2;
pub const PROGRAM_HEADER_READ: u32 = 0x4;

/* Offsets inside one Elf64_Phdr entry */
pub const PROGRAM_HEADER_TYPE: usize = 0;
pub const PROGRAM_HEADER_FLAGS: usize = 4;
pub const PROGRAM_HEADER_OFFSET: usize = 8;
pub const PROGRAM_HEADER_VADDR: usize = 16;
pub const PROGRAM_HEADER_FILESZ: usize = 32;
pub const PROGRAM_HEADER_MEMSZ: usize = 40;

/// Bytes of an entry that must be present to read every field we use.
pub const PROGRAM_HEADER_MIN_SIZE: usize = 48;
