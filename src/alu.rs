//! # ALU (Arithmetic Logic Unit)
//!
//! Pure arithmetic, logic and compare operations on byte registers:
//! - ADD, SUB, MUL, DIV, MOD: wrapping arithmetic, result in the destination
//! - AND, OR, XOR, NOT: bitwise logic
//! - SHL, SHR: logical shifts (shifting by 8 or more yields 0)
//! - INC, DEC: wrapping increment/decrement
//! - CMP: sets the E/G/L flags, leaves both registers untouched
//!
//! The ALU never touches the PC, the stack or memory.

use crate::{ExecutionError, Flags, Mnemonic};

/// Operations the ALU can perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AluOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    And,
    Or,
    Xor,
    Not,
    Shl,
    Shr,
    Inc,
    Dec,
    Cmp,
}

impl AluOp {
    /// Returns true for operations that read only the destination register.
    pub fn is_unary(self) -> bool {
        matches!(self, AluOp::Not | AluOp::Inc | AluOp::Dec)
    }
}

impl TryFrom<Mnemonic> for AluOp {
    type Error = ExecutionError;

    fn try_from(mnemonic: Mnemonic) -> Result<Self, Self::Error> {
        Ok(match mnemonic {
            Mnemonic::Add => AluOp::Add,
            Mnemonic::Sub => AluOp::Sub,
            Mnemonic::Mul => AluOp::Mul,
            Mnemonic::Div => AluOp::Div,
            Mnemonic::Mod => AluOp::Mod,
            Mnemonic::And => AluOp::And,
            Mnemonic::Or => AluOp::Or,
            Mnemonic::Xor => AluOp::Xor,
            Mnemonic::Not => AluOp::Not,
            Mnemonic::Shl => AluOp::Shl,
            Mnemonic::Shr => AluOp::Shr,
            Mnemonic::Inc => AluOp::Inc,
            Mnemonic::Dec => AluOp::Dec,
            Mnemonic::Cmp => AluOp::Cmp,
            other => return Err(ExecutionError::UnsupportedAluOperation(other)),
        })
    }
}

impl From<AluOp> for Mnemonic {
    fn from(op: AluOp) -> Self {
        match op {
            AluOp::Add => Mnemonic::Add,
            AluOp::Sub => Mnemonic::Sub,
            AluOp::Mul => Mnemonic::Mul,
            AluOp::Div => Mnemonic::Div,
            AluOp::Mod => Mnemonic::Mod,
            AluOp::And => Mnemonic::And,
            AluOp::Or => Mnemonic::Or,
            AluOp::Xor => Mnemonic::Xor,
            AluOp::Not => Mnemonic::Not,
            AluOp::Shl => Mnemonic::Shl,
            AluOp::Shr => Mnemonic::Shr,
            AluOp::Inc => Mnemonic::Inc,
            AluOp::Dec => Mnemonic::Dec,
            AluOp::Cmp => Mnemonic::Cmp,
        }
    }
}

/// Applies `op` to `dest`, using `operand` as the second value for binary
/// operations (ignored by NOT, INC and DEC).
///
/// Only CMP writes `flags`; every other operation leaves them untouched.
///
/// # Errors
///
/// Returns [`ExecutionError::DivisionByZero`] for DIV or MOD with a zero
/// operand. `dest` is left unchanged in that case.
///
/// # Examples
///
/// ```
/// use ls8::{alu, AluOp, Flags};
///
/// let mut flags = Flags::default();
/// let mut r0 = 200;
/// alu::apply(AluOp::Add, &mut r0, 100, &mut flags).unwrap();
/// assert_eq!(r0, 44);
///
/// alu::apply(AluOp::Cmp, &mut r0, 44, &mut flags).unwrap();
/// assert!(flags.equal && !flags.greater && !flags.less);
/// ```
pub fn apply(op: AluOp, dest: &mut u8, operand: u8, flags: &mut Flags) -> Result<(), ExecutionError> {
    let a = *dest;
    let b = operand;

    *dest = match op {
        AluOp::Add => a.wrapping_add(b),
        AluOp::Sub => a.wrapping_sub(b),
        AluOp::Mul => a.wrapping_mul(b),
        AluOp::Div => a.checked_div(b).ok_or(ExecutionError::DivisionByZero {
            mnemonic: Mnemonic::Div,
        })?,
        AluOp::Mod => a.checked_rem(b).ok_or(ExecutionError::DivisionByZero {
            mnemonic: Mnemonic::Mod,
        })?,
        AluOp::And => a & b,
        AluOp::Or => a | b,
        AluOp::Xor => a ^ b,
        AluOp::Not => !a,
        AluOp::Shl => a.checked_shl(b as u32).unwrap_or(0),
        AluOp::Shr => a.checked_shr(b as u32).unwrap_or(0),
        AluOp::Inc => a.wrapping_add(1),
        AluOp::Dec => a.wrapping_sub(1),
        AluOp::Cmp => {
            *flags = compare(a, b);
            a
        }
    };

    Ok(())
}

/// Unsigned comparison of two bytes. Exactly one flag is set in the result.
pub fn compare(a: u8, b: u8) -> Flags {
    Flags {
        equal: a == b,
        greater: a > b,
        less: a < b,
    }
}
