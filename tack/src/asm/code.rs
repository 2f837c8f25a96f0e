//! Mnemonic to bit-field tables for compute instructions.

/// Computation field, 7 bits: the memory select bit followed by the
/// ALU control bits.
#[rustfmt::skip]
pub fn comp(text: &str) -> Option<u16> {
    match text {
        "0"   => Some(0b0101010),
        "1"   => Some(0b0111111),
        "-1"  => Some(0b0111010),
        "D"   => Some(0b0001100),
        "A"   => Some(0b0110000),
        "!D"  => Some(0b0001101),
        "!A"  => Some(0b0110001),
        "-D"  => Some(0b0001111),
        "-A"  => Some(0b0110011),
        "D+1" => Some(0b0011111),
        "A+1" => Some(0b0110111),
        "D-1" => Some(0b0001110),
        "A-1" => Some(0b0110010),
        "D+A" => Some(0b0000010),
        "D-A" => Some(0b0010011),
        "A-D" => Some(0b0000111),
        "D&A" => Some(0b0000000),
        "D|A" => Some(0b0010101),

        "M"   => Some(0b1110000),
        "!M"  => Some(0b1110001),
        "-M"  => Some(0b1110011),
        "M+1" => Some(0b1110111),
        "M-1" => Some(0b1110010),
        "D+M" => Some(0b1000010),
        "D-M" => Some(0b1010011),
        "M-D" => Some(0b1000111),
        "D&M" => Some(0b1000000),
        "D|M" => Some(0b1010101),
        _ => None,
    }
}

/// Destination field, 3 bits: A, D, M.
#[rustfmt::skip]
pub fn dest(text: &str) -> Option<u16> {
    match text {
        "M"   => Some(0b001),
        "D"   => Some(0b010),
        "MD"  => Some(0b011),
        "A"   => Some(0b100),
        "AM"  => Some(0b101),
        "AD"  => Some(0b110),
        "AMD" => Some(0b111),
        _ => None,
    }
}

/// Jump field, 3 bits.
#[rustfmt::skip]
pub fn jump(text: &str) -> Option<u16> {
    match text {
        "JGT" => Some(0b001),
        "JEQ" => Some(0b010),
        "JGE" => Some(0b011),
        "JLT" => Some(0b100),
        "JNE" => Some(0b101),
        "JLE" => Some(0b110),
        "JMP" => Some(0b111),
        _ => None,
    }
}
