use bytemuck::*;
use serde::Serialize;

use crate::addr::MappingType;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("image of {len} bytes is too small to hold a cartridge header")]
    TooSmall { len: usize },
}

#[derive(Debug, Clone)]
pub struct Rom {
    pub data: Vec<u8>,
}

impl Rom {
    pub fn from_bytes(mut data: Vec<u8>) -> Self {
        // copier dumps prepend 512 bytes of their own metadata
        if data.len() & 0x3ff == 0x200 {
            log::debug!("stripping 512 byte copier header");
            data.drain(..0x200);
        }
        Self { data }
    }

    pub fn read_header(&self, offset: usize) -> Option<Header> {
        let bytes = self.data.get(offset..offset + size_of::<Header>())?;
        Some(pod_read_unaligned(bytes))
    }

    pub fn available_headers(&self) -> impl Iterator<Item = (Header, MappingType)> {
        MappingType::ALL
            .into_iter()
            .filter_map(|ty| Some((self.read_header(ty.header_offset())?, ty)))
    }

    pub fn get_best_header(&self) -> Option<(Header, MappingType)> {
        // on a tie the earlier candidate (LoROM) wins
        self.available_headers()
            .fold(None, |best: Option<(Header, MappingType, i32)>, (hdr, ty)| {
                let score = hdr.score(ty);
                log::debug!("{ty} header candidate scored {score}");
                match best {
                    Some((_, _, best_score)) if best_score >= score => best,
                    _ => Some((hdr, ty, score)),
                }
            })
            .map(|(hdr, ty, _)| (hdr, ty))
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Zeroable, TransparentWrapper, Pod)]
#[repr(transparent)]
pub struct Title(pub [u8; 21]);

impl core::fmt::Display for Title {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        let text: String = self
            .0
            .iter()
            .take_while(|&&c| c != 0)
            .map(|&c| match c {
                0x20..=0x7e => c as char,
                _ => char::REPLACEMENT_CHARACTER,
            })
            .collect();
        f.write_str(text.trim())
    }
}

/// Interrupt vectors as stored in the header, in table order.
#[derive(Debug, Clone, Copy, Zeroable, Pod)]
#[repr(C)]
pub struct VectorTable {
    pub cop: [u8; 2],
    pub brk: [u8; 2],
    pub abort: [u8; 2],
    pub nmi: [u8; 2],
    pub reset: [u8; 2],
    pub irq: [u8; 2],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Vectors {
    pub cop: u16,
    pub brk: u16,
    pub abort: u16,
    pub nmi: u16,
    pub reset: u16,
    pub irq: u16,
}

impl VectorTable {
    pub const fn decode(&self) -> Vectors {
        Vectors {
            cop: u16::from_le_bytes(self.cop),
            brk: u16::from_le_bytes(self.brk),
            abort: u16::from_le_bytes(self.abort),
            nmi: u16::from_le_bytes(self.nmi),
            reset: u16::from_le_bytes(self.reset),
            irq: u16::from_le_bytes(self.irq),
        }
    }
}

impl Vectors {
    pub const fn entries(&self) -> [(&'static str, u16); 6] {
        [
            ("cop", self.cop),
            ("brk", self.brk),
            ("abort", self.abort),
            ("nmi", self.nmi),
            ("reset", self.reset),
            ("irq", self.irq),
        ]
    }
}

/// The 64 bytes starting at the mapping's header offset.
#[derive(Debug, Clone, Copy, Zeroable, Pod)]
#[repr(C)]
pub struct Header {
    pub title: Title,
    pub mode: u8,
    pub chipset: u8,
    pub rom_size: u8,
    pub ram_size: u8,
    pub country: u8,
    pub developer_id: u8,
    pub rom_version: u8,
    pub checksum_cpl: [u8; 2],
    pub checksum: [u8; 2],
    pub reserved0: [u8; 4],
    pub native: VectorTable,
    pub reserved1: [u8; 4],
    pub emulation: VectorTable,
}

impl Header {
    pub const fn checksum(&self) -> u16 {
        u16::from_le_bytes(self.checksum)
    }

    pub const fn checksum_cpl(&self) -> u16 {
        u16::from_le_bytes(self.checksum_cpl)
    }

    pub const fn reset_vector(&self) -> u16 {
        u16::from_le_bytes(self.emulation.reset)
    }

    pub fn score(&self, mapping: MappingType) -> i32 {
        let mut score = 0;
        if self.reset_vector() >= 0x8000 {
            score += 8;
        }
        if self.checksum() ^ self.checksum_cpl() == 0xffff {
            score += 6;
        }
        if self.mode & 0x0f == mapping.expected_mode() {
            score += 5;
        }
        score
    }
}

/// Flat summary of a header, for export.
#[derive(Debug, Clone, Serialize)]
pub struct HeaderInfo {
    pub mapping: MappingType,
    pub header_offset: usize,
    pub title: String,
    pub map_mode: u8,
    pub rom_type: u8,
    pub rom_size_byte: u8,
    pub sram_size_byte: u8,
    pub region: u8,
    pub developer_id: u8,
    pub version: u8,
    pub checksum_complement: u16,
    pub checksum: u16,
    pub native_vectors: Vectors,
    pub emulation_vectors: Vectors,
}

#[derive(Debug, Clone)]
pub struct Cart {
    pub rom: Rom,
    header: Header,
    mapping: MappingType,
}

impl Cart {
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, Error> {
        let rom = Rom::from_bytes(bytes);
        let (header, mapping) = rom
            .get_best_header()
            .ok_or(Error::TooSmall { len: rom.len() })?;
        log::debug!(
            "picked {mapping} header at {:#06x}, reset vector ${:04X}",
            mapping.header_offset(),
            header.reset_vector()
        );
        Ok(Self {
            rom,
            header,
            mapping,
        })
    }

    pub const fn header(&self) -> &Header {
        &self.header
    }

    pub const fn mapping(&self) -> MappingType {
        self.mapping
    }

    pub const fn reset_vector(&self) -> u16 {
        self.header.reset_vector()
    }

    pub fn banks(&self) -> impl Iterator<Item = &[u8]> {
        self.rom.data.chunks(self.mapping.bank_size())
    }

    pub fn info(&self) -> HeaderInfo {
        let hdr = &self.header;
        HeaderInfo {
            mapping: self.mapping,
            header_offset: self.mapping.header_offset(),
            title: hdr.title.to_string(),
            map_mode: hdr.mode,
            rom_type: hdr.chipset,
            rom_size_byte: hdr.rom_size,
            sram_size_byte: hdr.ram_size,
            region: hdr.country,
            developer_id: hdr.developer_id,
            version: hdr.rom_version,
            checksum_complement: hdr.checksum_cpl(),
            checksum: hdr.checksum(),
            native_vectors: hdr.native.decode(),
            emulation_vectors: hdr.emulation.decode(),
        }
    }
}
