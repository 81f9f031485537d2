use std::collections::BTreeSet;

use serde::Serialize;

use crate::{
    addr::{Addr, MappingType},
    instruction::{AddrMode, Mnemonic, RegisterWidths, lookup},
};

/// Number of bytes scanned from the reset vector unless told otherwise.
pub const DEFAULT_WINDOW: usize = 0x180;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedInstruction {
    pub pc: u16,
    pub mnemonic: Mnemonic,
    pub mode: AddrMode,
    /// Operand bytes, possibly fewer than the mode asks for at the end of the window.
    pub operand: Vec<u8>,
    pub text: String,
    pub size: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedLine {
    Byte { pc: u16, value: u8 },
    Instruction(DecodedInstruction),
}

impl DecodedLine {
    pub const fn pc(&self) -> u16 {
        match self {
            Self::Byte { pc, .. } => *pc,
            Self::Instruction(instr) => instr.pc,
        }
    }
}

impl core::fmt::Display for DecodedLine {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Byte { pc, value } => write!(f, "{pc:04X}: .byte ${value:02X}"),
            Self::Instruction(instr) if instr.text.is_empty() => {
                write!(f, "{:04X}: {}", instr.pc, instr.mnemonic)
            }
            Self::Instruction(instr) => {
                write!(f, "{:04X}: {} {}", instr.pc, instr.mnemonic, instr.text)
            }
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Disassembly {
    pub lines: Vec<String>,
    /// Sorted, deduplicated `JSR $xxxx`-style descriptors.
    pub calls: Vec<String>,
    /// Sorted, deduplicated branch descriptors.
    pub branches: Vec<String>,
    #[serde(skip)]
    pub decoded: Vec<DecodedLine>,
    /// File offset the scan stopped at.
    pub end_offset: usize,
    pub terminated_by_return: bool,
}

/// Linear decoder for the code at a reset vector.
#[derive(Debug, Clone, Copy)]
pub struct Disassembler {
    mapping: MappingType,
    window: usize,
}

impl Disassembler {
    pub const fn new(mapping: MappingType) -> Self {
        Self {
            mapping,
            window: DEFAULT_WINDOW,
        }
    }

    pub const fn with_window(mut self, window: usize) -> Self {
        self.window = window;
        self
    }

    pub fn run(&self, data: &[u8], reset: u16) -> Disassembly {
        let origin = Addr::new(0, reset);
        let start = usize::try_from(self.mapping.linear_offset(origin)).unwrap_or(usize::MAX);
        let end = data.len().min(start.saturating_add(self.window));
        log::debug!("decoding {start:#x}..{end:#x} from reset vector {origin}");

        let mut widths = RegisterWidths::RESET;
        let mut decoded = vec![];
        let mut calls = BTreeSet::new();
        let mut branches = BTreeSet::new();
        let mut terminated_by_return = false;

        let mut i = start;
        while i < end {
            let pc = origin.add16((i - start) as u16).addr;
            let op = data[i];
            let Some(entry) = lookup(op) else {
                log::trace!("{pc:04X}: unknown opcode {op:02X}");
                decoded.push(DecodedLine::Byte { pc, value: op });
                i += 1;
                continue;
            };

            let size = entry.mode.size(widths);
            let operand = &data[i + 1..end.min(i + size as usize)];
            let text = entry.mode.format(operand, pc);
            log::trace!("{pc:04X}: {} {text} ({widths:?})", entry.mnemonic);

            if entry.mnemonic.is_flow_call() {
                calls.insert(format!("{} {text}", entry.mnemonic.name().to_uppercase()));
            }
            if entry.mode == AddrMode::Near {
                branches.insert(format!("{} {text}", entry.mnemonic.name().to_uppercase()));
            }
            if let Some(&flags) = operand.first() {
                match entry.mnemonic {
                    Mnemonic::Rep => widths.apply_rep(flags),
                    Mnemonic::Sep => widths.apply_sep(flags),
                    _ => {}
                }
            }

            decoded.push(DecodedLine::Instruction(DecodedInstruction {
                pc,
                mnemonic: entry.mnemonic,
                mode: entry.mode,
                operand: operand.to_vec(),
                text,
                size,
            }));
            i += size as usize;

            if entry.mnemonic.is_return() {
                terminated_by_return = true;
                break;
            }
        }

        log::debug!(
            "stopped at {i:#x} after {} lines ({})",
            decoded.len(),
            if terminated_by_return {
                "return"
            } else {
                "end of window"
            }
        );
        Disassembly {
            lines: decoded.iter().map(ToString::to_string).collect(),
            calls: calls.into_iter().collect(),
            branches: branches.into_iter().collect(),
            decoded,
            end_offset: i,
            terminated_by_return,
        }
    }
}

/// Decodes up to `max_bytes` of LoROM bank 0 starting at `reset`.
pub fn disassemble(data: &[u8], reset: u16, max_bytes: usize) -> Disassembly {
    Disassembler::new(MappingType::LoRom)
        .with_window(max_bytes)
        .run(data, reset)
}
