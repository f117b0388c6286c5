use std::{
    fmt::Display,
    fs,
    io::BufWriter,
    path::Path,
};

use log::{debug, info};

use crate::{
    elf::ElfHeader,
    error::ConvertError,
    sbf::{SbfHeader, SbfImage},
    segments::{self, MergePolicy},
};

#[derive(Debug, Clone, Copy, Default)]
pub struct Options {
    pub merge_policy: MergePolicy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub header: SbfHeader,
    pub total_size: usize,
    pub has_text: bool,
}

impl Display for Summary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let h = &self.header;
        writeln!(f, "Entry:  0x{:x}", h.entry_point)?;
        writeln!(f, "Header: {} bytes", crate::sbf::HEADER_SIZE)?;
        writeln!(f, "Text:   {} bytes at 0x{:x}", h.text_size, h.text_offset)?;
        writeln!(f, "Data:   {} bytes at 0x{:x}", h.data_size, h.data_offset)?;
        writeln!(f, "BSS:    {} bytes", h.bss_size)?;
        write!(f, "Total:  {} bytes", self.total_size)
    }
}

/// Runs the whole pipeline over an in-memory ELF image.
pub fn convert(bytes: &[u8], options: &Options) -> Result<(SbfImage, bool), ConvertError> {
    let header = ElfHeader::parse(bytes)?;
    info!(
        "ELF: entry=0x{:x} phoff=0x{:x} phnum={}",
        header.entry_point, header.program_header_offset, header.program_header_count
    );

    let classified = segments::classify(&header, bytes, options.merge_policy)?;
    let has_text = classified.has_text();
    Ok((SbfImage::build(classified)?, has_text))
}

/// Reads `input`, converts it, and only then creates `output`.
pub fn convert_file(input: &Path, output: &Path, options: &Options) -> Result<Summary, ConvertError> {
    let bytes = fs::read(input).map_err(|e| ConvertError::io(input, e))?;
    debug!("read {} bytes from {}", bytes.len(), input.display());

    let (image, has_text) = convert(&bytes, options)?;

    let file = fs::File::create(output).map_err(|e| ConvertError::io(output, e))?;
    image
        .write_to(BufWriter::new(file))
        .map_err(|e| ConvertError::io(output, e))?;
    info!("wrote {} bytes to {}", image.len(), output.display());

    Ok(Summary {
        header: *image.header(),
        total_size: image.len(),
        has_text,
    })
}

#[cfg(test)]
mod tests {
    use rstest::*;
    use tempfile::tempdir;

    use super::*;
    use crate::elf::{defs::*, fixture::ElfBuilder};

    #[fixture]
    fn elf() -> Vec<u8> {
        ElfBuilder::new()
            .entry(0x401000)
            .segment(PROGRAM_TYPE_LOAD, PROGRAM_HEADER_READ, &[0x7F; 0x40], 0x40)
            .segment(PROGRAM_TYPE_LOAD, PROGRAM_HEADER_READ | PROGRAM_HEADER_EXEC, &[0x90; 100], 100)
            .segment(PROGRAM_TYPE_LOAD, PROGRAM_HEADER_READ | PROGRAM_HEADER_WRITE, &[0x55; 0x1800], 0x2000)
            .build()
    }

    #[rstest]
    fn test_convert(elf: Vec<u8>) {
        let (image, has_text) = convert(&elf, &Options::default()).unwrap();
        let header = image.header();

        assert!(has_text);
        assert_eq!(header.entry_point, 0x401000);
        assert_eq!(header.text_offset, 36);
        assert_eq!(header.text_size, 100);
        assert_eq!(header.data_offset, 136);
        assert_eq!(header.data_size, 0x1800);
        assert_eq!(header.bss_size, 0x800);
        assert_eq!(image.len(), 36 + 100 + 0x1800);

        let bin = image.to_bin();
        assert_eq!(&bin[36..136], &[0x90; 100][..]);
        assert!(bin[136..].iter().all(|b| *b == 0x55));
    }

    #[rstest]
    fn test_convert_file(elf: Vec<u8>) {
        let dir = tempdir().unwrap();
        let input = dir.path().join("kernel.elf");
        let output = dir.path().join("kernel.sbf");
        fs::write(&input, &elf).unwrap();

        let summary = convert_file(&input, &output, &Options::default()).unwrap();

        let written = fs::read(&output).unwrap();
        assert_eq!(written.len(), summary.total_size);
        assert_eq!(SbfHeader::parse(&written).unwrap(), summary.header);
        assert!(summary.to_string().contains("Total:  6280 bytes"));
    }

    #[rstest]
    fn test_missing_input_writes_nothing() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("out.sbf");

        let err = convert_file(&dir.path().join("nope.elf"), &output, &Options::default()).unwrap_err();
        assert!(matches!(err, ConvertError::NotFound { .. }));
        assert!(!output.exists());
    }

    #[rstest]
    #[case::bad_magic(0, 0x00)]
    #[case::class32(4, 1)]
    fn test_rejected_input_writes_nothing(elf: Vec<u8>, #[case] index: usize, #[case] value: u8) {
        let dir = tempdir().unwrap();
        let input = dir.path().join("bad.elf");
        let output = dir.path().join("bad.sbf");
        let mut bytes = elf;
        bytes[index] = value;
        fs::write(&input, &bytes).unwrap();

        let err = convert_file(&input, &output, &Options::default()).unwrap_err();
        if index == 0 {
            assert!(matches!(err, ConvertError::InvalidFormat));
        } else {
            assert!(matches!(err, ConvertError::UnsupportedFormat { class: 1, data: 1 }));
        }
        assert!(!output.exists());
    }

    #[rstest]
    fn test_no_text_still_converts() {
        let elf = ElfBuilder::new()
            .segment(PROGRAM_TYPE_LOAD, PROGRAM_HEADER_WRITE, &[1; 8], 8)
            .build();

        let (image, has_text) = convert(&elf, &Options::default()).unwrap();
        assert!(!has_text);
        assert_eq!(image.header().text_size, 0);
        assert_eq!(image.header().data_offset, 36);
        assert_eq!(image.header().data_size, 8);
    }
}
