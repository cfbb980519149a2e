//! Formatting functions for disassembled instructions

use crate::disassembler::DisassembledLine;

/// Format a single line as assembly text.
///
/// Register operands print as `Rn`; LDI's immediate prints in decimal. Data
/// bytes print as `.byte $XX`.
pub fn format_instruction(line: &DisassembledLine) -> String {
    let mnemonic = match line.mnemonic {
        Some(mnemonic) => mnemonic,
        None => return format!(".byte ${:02X}", line.opcode),
    };

    let operands: Vec<String> = line
        .operand_bytes
        .iter()
        .enumerate()
        .map(|(i, &byte)| {
            if i == 1 && mnemonic.has_immediate() {
                byte.to_string()
            } else {
                format!("R{}", byte)
            }
        })
        .collect();

    if operands.is_empty() {
        mnemonic.to_string()
    } else {
        format!("{} {}", mnemonic, operands.join(","))
    }
}

/// Format lines as a listing: address, raw bytes in binary, then assembly.
///
/// ```text
/// 00: 10000010 00000000 00001000  LDI R0,8
/// ```
pub fn format_listing(lines: &[DisassembledLine]) -> String {
    let mut out = String::new();
    for line in lines {
        let bytes: Vec<String> = line.bytes().iter().map(|b| format!("{:08b}", b)).collect();
        out.push_str(&format!(
            "{:02X}: {:<26}  {}\n",
            line.address,
            bytes.join(" "),
            format_instruction(line)
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disassembler::disassemble;

    #[test]
    fn test_format_register_operands() {
        let lines = disassemble(&[0b1010_0000, 0x00, 0x01], 0);
        assert_eq!(format_instruction(&lines[0]), "ADD R0,R1");
    }

    #[test]
    fn test_format_data_byte() {
        let lines = disassemble(&[0xEE], 0);
        assert_eq!(format_instruction(&lines[0]), ".byte $EE");
    }

    #[test]
    fn test_format_listing() {
        let lines = disassemble(&[0b0100_0111, 0x00], 0x05);
        assert_eq!(
            format_listing(&lines),
            format!("05: {:<26}  PRN R0\n", "01000111 00000000")
        );
    }
}
