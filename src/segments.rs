use log::{debug, info, warn};

use crate::{
    elf::{ElfHeader, ProgramHeaderEntry},
    error::ConvertError,
};

/// What happens when a second TEXT or DATA segment shows up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MergePolicy {
    /// The later segment replaces the earlier one.
    #[default]
    LastWins,
    /// Segments of the same class are appended in encounter order.
    Concatenate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentClass {
    Text,
    Data,
    Ignored,
}

impl SegmentClass {
    /// Executable wins over writable; everything else is dropped.
    pub fn of(entry: &ProgramHeaderEntry) -> Self {
        if entry.is_executable() {
            Self::Text
        } else if entry.is_writable() {
            Self::Data
        } else {
            Self::Ignored
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ClassifiedImage {
    pub text_bytes: Vec<u8>,
    pub data_bytes: Vec<u8>,
    pub bss_size: u64,
    pub entry_point: u64,
    found_text: bool,
}

impl ClassifiedImage {
    pub fn new(entry_point: u64) -> Self {
        Self {
            entry_point,
            ..Default::default()
        }
    }

    pub fn has_text(&self) -> bool {
        self.found_text
    }

    fn add_text(&mut self, bytes: &[u8], policy: MergePolicy) {
        if self.found_text && policy == MergePolicy::LastWins {
            warn!(
                "replacing earlier TEXT segment ({} bytes) with a later one",
                self.text_bytes.len()
            );
        }
        store(&mut self.text_bytes, bytes, policy);
        self.found_text = true;
    }

    fn add_data(&mut self, bytes: &[u8], policy: MergePolicy) {
        if !self.data_bytes.is_empty() && policy == MergePolicy::LastWins {
            warn!(
                "replacing earlier DATA segment ({} bytes) with a later one",
                self.data_bytes.len()
            );
        }
        store(&mut self.data_bytes, bytes, policy);
    }
}

fn store(region: &mut Vec<u8>, bytes: &[u8], policy: MergePolicy) {
    match policy {
        MergePolicy::LastWins => {
            region.clear();
            region.extend_from_slice(bytes);
        }
        MergePolicy::Concatenate => region.extend_from_slice(bytes),
    }
}

pub fn classify(
    header: &ElfHeader,
    bytes: &[u8],
    policy: MergePolicy,
) -> Result<ClassifiedImage, ConvertError> {
    let mut image = ClassifiedImage::new(header.entry_point);

    for (i, entry) in header.program_headers(bytes)?.iter().enumerate() {
        if !entry.is_load() {
            debug!("phdr[{i}] {entry}: not loadable, skipped");
            continue;
        }

        let segment_data = entry.data(bytes)?;

        match SegmentClass::of(entry) {
            SegmentClass::Text => {
                info!("phdr[{i}] TEXT {entry}");
                image.add_text(segment_data, policy);
            }
            SegmentClass::Data => {
                info!("phdr[{i}] DATA {entry}");
                image.add_data(segment_data, policy);
                let bss = entry.bss_size();
                if bss > 0 {
                    info!("phdr[{i}] BSS {bss} bytes");
                    image.bss_size = image.bss_size.checked_add(bss).ok_or(
                        ConvertError::FieldOverflow {
                            field: "bss_size",
                            value: bss,
                        },
                    )?;
                }
            }
            SegmentClass::Ignored => debug!("phdr[{i}] {entry}: read-only, dropped"),
        }
    }

    if !image.has_text() {
        warn!("no executable segment found; the image will have an empty TEXT region");
    }

    Ok(image)
}
