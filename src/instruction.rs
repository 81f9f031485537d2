use crate::pf;

/// Operand shape of an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddrMode {
    /// No operand
    Implied,
    /// Immediate, always one byte
    Imm8,
    /// Immediate, accumulator width
    ImmM,
    /// Immediate, index width
    ImmX,
    /// Absolute
    A,
    /// Absolute Indexed, Y
    Ay,
    /// Direct Indexed, X
    Dx,
    /// Absolute Long
    Al,
    /// Program counter relative, 8-bit displacement
    Near,
}

/// Widths of the accumulator (M) and index registers (X).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegisterWidths {
    pub m8: bool,
    pub x8: bool,
}

impl RegisterWidths {
    /// Both registers are 8-bit after reset.
    pub const RESET: Self = Self { m8: true, x8: true };

    /// `rep`: cleared bits widen the registers to 16 bits.
    pub const fn apply_rep(&mut self, flags: u8) {
        if flags & pf::M != 0 {
            self.m8 = false;
        }
        if flags & pf::X != 0 {
            self.x8 = false;
        }
    }

    /// `sep`: set bits narrow the registers to 8 bits.
    pub const fn apply_sep(&mut self, flags: u8) {
        if flags & pf::M != 0 {
            self.m8 = true;
        }
        if flags & pf::X != 0 {
            self.x8 = true;
        }
    }
}

impl Default for RegisterWidths {
    fn default() -> Self {
        Self::RESET
    }
}

impl AddrMode {
    /// Full instruction length, opcode included.
    pub const fn size(&self, widths: RegisterWidths) -> u8 {
        match self {
            Self::Implied => 1,
            Self::Imm8 | Self::Dx | Self::Near => 2,
            Self::ImmM => 3 - widths.m8 as u8,
            Self::ImmX => 3 - widths.x8 as u8,
            Self::A | Self::Ay => 3,
            Self::Al => 4,
        }
    }

    /// Renders the operand of an instruction located at `pc`.
    ///
    /// `operand` is expected to hold `size - 1` bytes. A clipped operand is
    /// rendered as if the missing bytes were zero, except for the immediate
    /// modes, whose digit count follows the number of bytes present.
    pub fn format(&self, operand: &[u8], pc: u16) -> String {
        let b = |i: usize| operand.get(i).copied().unwrap_or(0);
        let w = u16::from_le_bytes([b(0), b(1)]);
        match self {
            Self::Implied => String::new(),
            Self::Imm8 => format!("#${:02X}", b(0)),
            Self::ImmM | Self::ImmX if operand.len() >= 2 => format!("#${w:04X}"),
            Self::ImmM | Self::ImmX => format!("#${:02X}", b(0)),
            Self::A => format!("${w:04X}"),
            Self::Ay => format!("${w:04X},Y"),
            Self::Dx => format!("${:02X},X", b(0)),
            Self::Al => format!("${:06X}", u32::from_le_bytes([b(0), b(1), b(2), 0])),
            Self::Near => format!("${:04X}", near_target(pc, b(0))),
        }
    }
}

/// Target of a 2-byte branch at `pc` with displacement `rel`.
pub const fn near_target(pc: u16, rel: u8) -> u16 {
    pc.wrapping_add(2).wrapping_add(rel as i8 as i16 as u16)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mnemonic {
    Bne,
    Bpl,
    Bra,
    Clc,
    Cpx,
    Inx,
    Iny,
    Jml,
    Jmp,
    Jsl,
    Jsr,
    Lda,
    Ldx,
    Ldy,
    Phk,
    Phx,
    Plb,
    Pld,
    Rep,
    Rti,
    Rtl,
    Rts,
    Sep,
    Sta,
    Stz,
    Tax,
    Tay,
    Txs,
    Xce,
}

impl Mnemonic {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Bne => "bne",
            Self::Bpl => "bpl",
            Self::Bra => "bra",
            Self::Clc => "clc",
            Self::Cpx => "cpx",
            Self::Inx => "inx",
            Self::Iny => "iny",
            Self::Jml => "jml",
            Self::Jmp => "jmp",
            Self::Jsl => "jsl",
            Self::Jsr => "jsr",
            Self::Lda => "lda",
            Self::Ldx => "ldx",
            Self::Ldy => "ldy",
            Self::Phk => "phk",
            Self::Phx => "phx",
            Self::Plb => "plb",
            Self::Pld => "pld",
            Self::Rep => "rep",
            Self::Rti => "rti",
            Self::Rtl => "rtl",
            Self::Rts => "rts",
            Self::Sep => "sep",
            Self::Sta => "sta",
            Self::Stz => "stz",
            Self::Tax => "tax",
            Self::Tay => "tay",
            Self::Txs => "txs",
            Self::Xce => "xce",
        }
    }

    /// Far call, near call, absolute jump or far jump.
    pub const fn is_flow_call(&self) -> bool {
        matches!(self, Self::Jsl | Self::Jsr | Self::Jmp | Self::Jml)
    }

    pub const fn is_return(&self) -> bool {
        matches!(self, Self::Rts | Self::Rtl | Self::Rti)
    }
}

impl core::fmt::Display for Mnemonic {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OpcodeEntry {
    pub mnemonic: Mnemonic,
    pub mode: AddrMode,
}

/// Looks up the decodable subset of the instruction set.
pub const fn lookup(op: u8) -> Option<OpcodeEntry> {
    use {AddrMode::*, Mnemonic::*};
    let (mnemonic, mode) = match op {
        0x10 => (Bpl, Near),
        0x18 => (Clc, Implied),
        0x20 => (Jsr, A),
        0x22 => (Jsl, Al),
        0x2B => (Pld, Implied),
        0x40 => (Rti, Implied),
        0x4B => (Phk, Implied),
        0x4C => (Jmp, A),
        0x5C => (Jml, Al),
        0x60 => (Rts, Implied),
        0x6B => (Rtl, Implied),
        0x74 => (Stz, Dx),
        0x80 => (Bra, Near),
        0x8D => (Sta, A),
        0x9A => (Txs, Implied),
        0x9C => (Stz, A),
        0xA0 => (Ldy, ImmX),
        0xA2 => (Ldx, ImmX),
        0xA8 => (Tay, Implied),
        0xA9 => (Lda, ImmM),
        0xAA => (Tax, Implied),
        0xAB => (Plb, Implied),
        0xB9 => (Lda, Ay),
        0xC2 => (Rep, Imm8),
        0xC8 => (Iny, Implied),
        0xD0 => (Bne, Near),
        0xDA => (Phx, Implied),
        0xE0 => (Cpx, ImmX),
        0xE2 => (Sep, Imm8),
        0xE8 => (Inx, Implied),
        0xFB => (Xce, Implied),
        _ => return None,
    };
    Some(OpcodeEntry { mnemonic, mode })
}

#[cfg(test)]
mod tests {
    use super::*;

    const WIDE: RegisterWidths = RegisterWidths { m8: false, x8: false };

    #[test]
    fn table_has_31_entries() {
        assert_eq!((0..=255u8).filter_map(lookup).count(), 31);
    }

    #[test]
    fn lookup_known_and_unknown() {
        assert_eq!(
            lookup(0xa9),
            Some(OpcodeEntry {
                mnemonic: Mnemonic::Lda,
                mode: AddrMode::ImmM
            })
        );
        assert_eq!(lookup(0x00), None);
        assert_eq!(lookup(0xea), None);
    }

    #[test]
    fn fixed_sizes() {
        for widths in [RegisterWidths::RESET, WIDE] {
            assert_eq!(AddrMode::Implied.size(widths), 1);
            assert_eq!(AddrMode::Imm8.size(widths), 2);
            assert_eq!(AddrMode::A.size(widths), 3);
            assert_eq!(AddrMode::Ay.size(widths), 3);
            assert_eq!(AddrMode::Dx.size(widths), 2);
            assert_eq!(AddrMode::Al.size(widths), 4);
            assert_eq!(AddrMode::Near.size(widths), 2);
        }
    }

    #[test]
    fn width_dependent_sizes() {
        let m16 = RegisterWidths { m8: false, x8: true };
        let x16 = RegisterWidths { m8: true, x8: false };
        assert_eq!(AddrMode::ImmM.size(RegisterWidths::RESET), 2);
        assert_eq!(AddrMode::ImmM.size(m16), 3);
        assert_eq!(AddrMode::ImmM.size(x16), 2);
        assert_eq!(AddrMode::ImmX.size(RegisterWidths::RESET), 2);
        assert_eq!(AddrMode::ImmX.size(x16), 3);
        assert_eq!(AddrMode::ImmX.size(m16), 2);
    }

    #[test]
    fn format_plain_modes() {
        assert_eq!(AddrMode::Implied.format(&[], 0x8000), "");
        assert_eq!(AddrMode::Imm8.format(&[0x30], 0x8000), "#$30");
        assert_eq!(AddrMode::ImmM.format(&[0x0f], 0x8000), "#$0F");
        assert_eq!(AddrMode::ImmX.format(&[0xff, 0x1f], 0x8000), "#$1FFF");
        assert_eq!(AddrMode::A.format(&[0x00, 0x21], 0x8000), "$2100");
        assert_eq!(AddrMode::Ay.format(&[0x34, 0x12], 0x8000), "$1234,Y");
        assert_eq!(AddrMode::Dx.format(&[0x05], 0x8000), "$05,X");
        assert_eq!(AddrMode::Al.format(&[0x5b, 0x84, 0x00], 0x8000), "$00845B");
        assert_eq!(AddrMode::Al.format(&[0xf8, 0x8a, 0x01], 0x8000), "$018AF8");
    }

    #[test]
    fn near_forward_and_backward() {
        assert_eq!(AddrMode::Near.format(&[0x7e], 0x8000), "$8080");
        assert_eq!(AddrMode::Near.format(&[0x80], 0x8000), "$7F82");
        assert_eq!(AddrMode::Near.format(&[0xfe], 0x8010), "$8010");
    }

    #[test]
    fn near_wraps_at_64k() {
        assert_eq!(near_target(0xfffe, 0x01), 0x0001);
        assert_eq!(near_target(0x0000, 0x80), 0xff82);
    }

    #[test]
    fn clipped_operands_read_as_zero() {
        assert_eq!(AddrMode::A.format(&[0x34], 0x8000), "$0034");
        assert_eq!(AddrMode::Al.format(&[], 0x8000), "$000000");
        assert_eq!(AddrMode::Near.format(&[], 0x8000), "$8002");
        assert_eq!(AddrMode::Imm8.format(&[], 0x8000), "#$00");
    }

    #[test]
    fn rep_and_sep_toggle_widths() {
        let mut widths = RegisterWidths::default();
        widths.apply_rep(pf::M);
        assert_eq!(widths, RegisterWidths { m8: false, x8: true });
        widths.apply_rep(pf::X | pf::M);
        assert_eq!(widths, WIDE);
        widths.apply_sep(pf::X);
        assert_eq!(widths, RegisterWidths { m8: false, x8: true });
        widths.apply_sep(0x0f);
        assert_eq!(widths, RegisterWidths { m8: false, x8: true });
        widths.apply_sep(0xff);
        assert_eq!(widths, RegisterWidths::RESET);
    }

    #[test]
    fn flow_classes() {
        let calls: Vec<_> = (0..=255u8)
            .filter_map(lookup)
            .filter(|e| e.mnemonic.is_flow_call())
            .map(|e| e.mnemonic.name())
            .collect();
        assert_eq!(calls, ["jsr", "jsl", "jmp", "jml"]);
        assert!(Mnemonic::Rtl.is_return());
        assert!(!Mnemonic::Bra.is_return());
    }
}
