use std::{io::Write, path::Path};

use bootscan::{
    cart::{Cart, HeaderInfo},
    disasm::Disassembly,
};
use serde::Serialize;

use crate::error::Result;

#[derive(Serialize)]
struct Report<'a> {
    rom: &'a Path,
    header: HeaderInfo,
    disassembly: &'a Disassembly,
}

pub fn write_text(
    out: &mut impl Write,
    rom: &Path,
    cart: &Cart,
    disasm: &Disassembly,
    max_lines: usize,
) -> Result<()> {
    let title = cart.header().title;
    writeln!(out, "=== {title} ===")?;
    writeln!(out, "ROM: {}", rom.display())?;
    writeln!(out, "Title: {title}")?;
    writeln!(out, "Mapping: {}", cart.mapping())?;
    writeln!(out, "RESET: ${:04X}", cart.reset_vector())?;

    writeln!(out, "\n--- First instructions (reset window) ---")?;
    for line in disasm.lines.iter().take(max_lines) {
        writeln!(out, "{line}")?;
    }
    if disasm.lines.len() > max_lines {
        writeln!(out, "... {} more", disasm.lines.len() - max_lines)?;
    }

    writeln!(out, "\n--- Detected calls ---")?;
    for call in &disasm.calls {
        writeln!(out, "{call}")?;
    }

    writeln!(out, "\n--- Detected branches ---")?;
    for branch in &disasm.branches {
        writeln!(out, "{branch}")?;
    }
    Ok(())
}

pub fn write_json(out: &mut impl Write, rom: &Path, cart: &Cart, disasm: &Disassembly) -> Result<()> {
    let report = Report {
        rom,
        header: cart.info(),
        disassembly: disasm,
    };
    serde_json::to_writer_pretty(&mut *out, &report)?;
    writeln!(out)?;
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use bootscan::disasm::Disassembler;

    /// Two LoROM banks with a short reset handler and a string.
    pub(crate) fn sample_cart() -> Cart {
        let mut data = vec![0; 0x10000];
        data[..12].copy_from_slice(&[
            0x78, 0x18, 0xfb, 0xc2, 0x30, 0x22, 0x5b, 0x84, 0x00, 0xd0, 0xfe, 0x60,
        ]);
        data[0x100..0x10b].copy_from_slice(b"HELLO WORLD");
        let hdr = 0x7fc0;
        data[hdr..hdr + 13].copy_from_slice(b"BOOTSCAN TEST");
        data[hdr + 0x15] = 0x20;
        data[hdr + 0x1c..hdr + 0x20].copy_from_slice(&[0x34, 0x12, 0xcb, 0xed]);
        data[hdr + 0x2a..hdr + 0x2c].copy_from_slice(&[0x00, 0x81]);
        data[hdr + 0x3c..hdr + 0x3e].copy_from_slice(&[0x00, 0x80]);
        Cart::from_bytes(data).unwrap()
    }

    pub(crate) fn sample_disasm(cart: &Cart) -> Disassembly {
        Disassembler::new(cart.mapping()).run(&cart.rom.data, cart.reset_vector())
    }

    #[test]
    fn sample_listing() {
        let cart = sample_cart();
        assert_eq!(
            sample_disasm(&cart).lines,
            [
                "8000: .byte $78",
                "8001: clc",
                "8002: xce",
                "8003: rep #$30",
                "8005: jsl $00845B",
                "8009: bne $8009",
                "800B: rts",
            ]
        );
    }

    #[test]
    fn text_report() {
        let cart = sample_cart();
        let disasm = sample_disasm(&cart);
        let mut out = vec![];
        write_text(&mut out, Path::new("test.sfc"), &cart, &disasm, 3).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "=== BOOTSCAN TEST ===\n\
             ROM: test.sfc\n\
             Title: BOOTSCAN TEST\n\
             Mapping: LoROM\n\
             RESET: $8000\n\
             \n\
             --- First instructions (reset window) ---\n\
             8000: .byte $78\n\
             8001: clc\n\
             8002: xce\n\
             ... 4 more\n\
             \n\
             --- Detected calls ---\n\
             JSL $00845B\n\
             \n\
             --- Detected branches ---\n\
             BNE $8009\n"
        );
    }

    #[test]
    fn json_report() {
        let cart = sample_cart();
        let disasm = sample_disasm(&cart);
        let mut out = vec![];
        write_json(&mut out, Path::new("test.sfc"), &cart, &disasm).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["rom"], "test.sfc");
        assert_eq!(value["header"]["mapping"], "LoROM");
        assert_eq!(value["header"]["title"], "BOOTSCAN TEST");
        assert_eq!(value["header"]["checksum"], 0xedcb);
        assert_eq!(value["header"]["emulation_vectors"]["reset"], 0x8000);
        assert_eq!(value["header"]["native_vectors"]["nmi"], 0x8100);
        assert_eq!(value["disassembly"]["calls"][0], "JSL $00845B");
        assert_eq!(value["disassembly"]["lines"][6], "800B: rts");
        assert_eq!(value["disassembly"]["terminated_by_return"], true);
    }
}
