use serde::Serialize;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Addr {
    pub bank: u8,
    pub addr: u16,
}

impl Addr {
    pub const fn new(bank: u8, addr: u16) -> Self {
        Self { bank, addr }
    }

    pub const fn add16(mut self, val: u16) -> Self {
        self.addr = self.addr.wrapping_add(val);
        self
    }
}

impl core::fmt::Display for Addr {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "{:02X}:{:04X}", self.bank, self.addr)
    }
}

impl core::fmt::Debug for Addr {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "{:02X}:{:04X}", self.bank, self.addr)
    }
}

/// Linear file offset of `bank:addr16` on a LoROM cart.
pub const fn lorom_offset(bank: u8, addr16: u16) -> u64 {
    bank as u64 * 0x8000 + (addr16 & 0x7fff) as u64
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum MappingType {
    #[serde(rename = "LoROM")]
    LoRom,
    #[serde(rename = "HiROM")]
    HiRom,
}

impl MappingType {
    pub const ALL: [Self; 2] = [Self::LoRom, Self::HiRom];

    pub const fn linear_offset(&self, addr: Addr) -> u64 {
        match self {
            Self::LoRom => lorom_offset(addr.bank, addr.addr),
            Self::HiRom => (((addr.bank & 0x3f) as u64) << 16) | addr.addr as u64,
        }
    }

    pub const fn header_offset(&self) -> usize {
        match self {
            Self::LoRom => 0x7fc0,
            Self::HiRom => 0xffc0,
        }
    }

    pub const fn bank_size(&self) -> usize {
        match self {
            Self::LoRom => 0x8000,
            Self::HiRom => 0x10000,
        }
    }

    /// CPU address the first byte of every bank is visible at.
    pub const fn bank_origin(&self) -> u16 {
        match self {
            Self::LoRom => 0x8000,
            Self::HiRom => 0x0000,
        }
    }

    /// Low nibble of the header's map mode byte.
    pub const fn expected_mode(&self) -> u8 {
        match self {
            Self::LoRom => 0,
            Self::HiRom => 1,
        }
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Self::LoRom => "LoROM",
            Self::HiRom => "HiROM",
        }
    }
}

impl core::fmt::Display for MappingType {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.write_str(self.name())
    }
}
