pub mod addr;
pub mod cart;
pub mod disasm;
pub mod instruction;
pub mod strings;

/// Processor status bits that affect decoding.
pub mod pf {
    pub const X: u8 = 1 << 4;
    pub const M: u8 = 1 << 5;
}
