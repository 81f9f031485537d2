//! Exports a cartridge as a skeleton reverse-engineering project.
//!
//! Layout of the output directory:
//!
//! ```text
//! README.md
//! assets/header.json
//! assets/strings_ascii.txt
//! code/banks/bank_XX.bin
//! code/rom_layout.asm
//! code/vectors.txt
//! code/reset_disasm.asm
//! ```

use std::{
    fmt::Write as _,
    path::{Path, PathBuf},
};

use bootscan::{
    cart::{Cart, Vectors},
    disasm::Disassembly,
    strings::{MIN_LEN, ascii_strings},
};

use crate::error::{Error, Result};

fn create_dir(path: PathBuf) -> Result<PathBuf> {
    std::fs::create_dir_all(&path).map_err(|source| Error::Write {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

fn write_file(path: PathBuf, contents: impl AsRef<[u8]>) -> Result<()> {
    log::debug!("writing {}", path.display());
    std::fs::write(&path, contents).map_err(|source| Error::Write { path, source })
}

fn rom_layout(cart: &Cart) -> String {
    let mapping = cart.mapping();
    let mut s = String::new();
    s.push_str("; Generated layout, one segment per ROM bank.\n");
    s.push_str(".cpu 65816\n\n");
    let _ = writeln!(s, "; Mapping: {mapping}");
    let _ = writeln!(s, "; Title: {}\n", cart.header().title);
    for idx in 0..cart.banks().count() {
        let _ = writeln!(s, ".segment \"BANK{idx:02X}\"");
        let _ = writeln!(s, ".org ${:04X}", mapping.bank_origin());
        let _ = writeln!(s, ".incbin \"banks/bank_{idx:02X}.bin\"\n");
    }
    s
}

fn vector_section(s: &mut String, name: &str, vectors: &Vectors) {
    let _ = writeln!(s, "[{name}]");
    for (name, addr) in vectors.entries() {
        let _ = writeln!(s, "{name} = ${addr:04X}");
    }
    s.push('\n');
}

fn vectors(cart: &Cart) -> String {
    let info = cart.info();
    let mut s = String::new();
    s.push_str("; Interrupt vectors from the cartridge header\n");
    let _ = writeln!(s, "; Header @ 0x{:06X}\n", info.header_offset);
    vector_section(&mut s, "native", &info.native_vectors);
    vector_section(&mut s, "emulation", &info.emulation_vectors);
    s
}

fn reset_listing(cart: &Cart, disasm: &Disassembly) -> String {
    let mut s = String::new();
    let _ = writeln!(s, "; Linear disassembly from RESET ${:04X}", cart.reset_vector());
    for line in &disasm.lines {
        let _ = writeln!(s, "{line}");
    }
    if !disasm.calls.is_empty() {
        s.push_str("\n; Calls\n");
        for call in &disasm.calls {
            let _ = writeln!(s, ";   {call}");
        }
    }
    if !disasm.branches.is_empty() {
        s.push_str("\n; Branches\n");
        for branch in &disasm.branches {
            let _ = writeln!(s, ";   {branch}");
        }
    }
    s
}

fn readme(rom: &Path, cart: &Cart) -> String {
    let name = rom
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!(
        "# Reverse-engineering workspace\n\
         \n\
         Generated from `{name}`.\n\
         \n\
         - `code/banks/*.bin`: the ROM split into {mapping} banks (not meant to be committed).\n\
         - `code/rom_layout.asm`: assembler layout that `.incbin`s every bank.\n\
         - `code/vectors.txt`: native and emulation mode interrupt vectors.\n\
         - `code/reset_disasm.asm`: linear disassembly of the reset handler.\n\
         - `assets/header.json`: cartridge header fields.\n\
         - `assets/strings_ascii.txt`: printable ASCII runs with their file offsets.\n\
         \n\
         Start from the `reset` vector and replace `.incbin` ranges with annotated\n\
         source as routines get understood.\n",
        mapping = cart.mapping(),
    )
}

pub fn write_project(rom: &Path, cart: &Cart, disasm: &Disassembly, out: &Path) -> Result<()> {
    let code = create_dir(out.join("code"))?;
    let banks = create_dir(code.join("banks"))?;
    let assets = create_dir(out.join("assets"))?;

    write_file(
        assets.join("header.json"),
        serde_json::to_string_pretty(&cart.info())?,
    )?;
    let strings: String = ascii_strings(&cart.rom.data, MIN_LEN)
        .iter()
        .map(|s| format!("{s}\n"))
        .collect();
    write_file(assets.join("strings_ascii.txt"), strings)?;

    for (idx, bank) in cart.banks().enumerate() {
        write_file(banks.join(format!("bank_{idx:02X}.bin")), bank)?;
    }
    write_file(code.join("rom_layout.asm"), rom_layout(cart))?;
    write_file(code.join("vectors.txt"), vectors(cart))?;
    write_file(code.join("reset_disasm.asm"), reset_listing(cart, disasm))?;
    write_file(out.join("README.md"), readme(rom, cart))?;
    Ok(())
}
