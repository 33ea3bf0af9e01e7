//! 6502 processor status register (P) flag bits.

pub const FLAG_CARRY: u8 = 1 << 0;
pub const FLAG_ZERO: u8 = 1 << 1;
pub const FLAG_INTERRUPT_DISABLE: u8 = 1 << 2;
pub const FLAG_DECIMAL: u8 = 1 << 3; // Stored, but the 2A03 has no BCD mode
pub const FLAG_BREAK: u8 = 1 << 4; // Only exists in pushed copies of P
pub const FLAG_UNUSED: u8 = 1 << 5; // Always 1 when read on 6502
pub const FLAG_OVERFLOW: u8 = 1 << 6;
pub const FLAG_NEGATIVE: u8 = 1 << 7;

/// P after reset: I and the unused bit set.
pub const STATUS_POWER_ON: u8 = FLAG_INTERRUPT_DISABLE | FLAG_UNUSED;

/// Byte pushed for P. `software` is true for BRK/PHP (B = 1) and false for NMI/IRQ entry (B = 0).
/// Bit 5 is always set.
pub fn status_for_push(p: u8, software: bool) -> u8 {
    let p = p | FLAG_UNUSED;
    if software { p | FLAG_BREAK } else { p & !FLAG_BREAK }
}

/// P restored from a pulled byte (PLP/RTI): B cleared, bit 5 set, the rest verbatim.
pub fn status_from_pull(byte: u8) -> u8 {
    (byte & !FLAG_BREAK) | FLAG_UNUSED
}
