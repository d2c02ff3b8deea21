//! Condition-flag computation.
//!
//! Every flag-setting instruction maps to one [FlagOp] class; ZF and SF
//! are common to all classes, CF and OF depend on the class.

/// The four x86-like condition flags.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Flags {
    pub zero: bool,
    pub sign: bool,
    pub carry: bool,
    pub overflow: bool,
}

/// Operation classes with distinct CF/OF behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagOp {
    Add,
    Sub,
    Mul,
    Div,
    And,
    Or,
    Xor,
    /// Shift left; the count is passed via `b`.
    Shl,
    /// Shift right; the count is passed via `b`, the original value via `a`.
    Shr,
    Mov,
    Load,
    Ldb,
    Pop,
}

/// Recompute all four flags. `result` is the 32-bit outcome reinterpreted
/// as signed; `a` and `b` are the raw source operands.
pub fn update(flags: &mut Flags, result: i32, a: u32, b: u32, op: FlagOp) {
    flags.zero = result == 0;
    flags.sign = result < 0;

    match op {
        FlagOp::Add => {
            flags.carry = u64::from(a) + u64::from(b) > u64::from(u32::MAX);
            let (sa, sb) = (a as i32, b as i32);
            flags.overflow =
                (sa > 0 && sb > 0 && result <= 0) || (sa < 0 && sb < 0 && result >= 0);
        }
        FlagOp::Sub => {
            flags.carry = a < b;
            let (sa, sb) = (a as i32, b as i32);
            flags.overflow =
                (sa >= 0 && sb < 0 && result < 0) || (sa < 0 && sb >= 0 && result > 0);
        }
        FlagOp::Mul => {
            let full = i64::from(a as i32) * i64::from(b as i32);
            let overflow = full != i64::from(result);
            flags.carry = overflow;
            flags.overflow = overflow;
        }
        FlagOp::Shl => {
            let shift = b & 0x1F;
            flags.carry = shift > 0 && (a >> (32 - shift)) & 1 != 0;
            flags.overflow = shift == 1 && (flags.carry ^ flags.sign);
        }
        FlagOp::Shr => {
            let shift = b & 0x1F;
            flags.carry = shift > 0 && (a >> (shift - 1)) & 1 != 0;
            flags.overflow = shift == 1 && (a >> 31) & 1 != 0;
        }
        FlagOp::Ldb => {
            // SF comes from the loaded byte as a signed 8-bit value
            flags.sign = ((result & 0xFF) as u8 as i8) < 0;
            flags.carry = false;
            flags.overflow = false;
        }
        FlagOp::Div
        | FlagOp::And
        | FlagOp::Or
        | FlagOp::Xor
        | FlagOp::Mov
        | FlagOp::Load
        | FlagOp::Pop => {
            flags.carry = false;
            flags.overflow = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flags_after(result: i32, a: u32, b: u32, op: FlagOp) -> Flags {
        let mut flags = Flags::default();
        update(&mut flags, result, a, b, op);
        flags
    }

    #[test]
    fn zero_and_sign_track_the_result() {
        let f = flags_after(0, 1, 1, FlagOp::Sub);
        assert!(f.zero);
        assert!(!f.sign);

        let f = flags_after(-5, 0, 5, FlagOp::Sub);
        assert!(!f.zero);
        assert!(f.sign);
    }

    #[test]
    fn add_sets_carry_on_unsigned_wrap() {
        let a = u32::MAX;
        let result = (a as i32).wrapping_add(1);
        let f = flags_after(result, a, 1, FlagOp::Add);
        assert!(f.carry);
        assert!(!f.overflow);
        assert!(f.zero);
    }

    #[test]
    fn add_sets_overflow_on_signed_wrap() {
        let a = i32::MAX as u32;
        let result = (a as i32).wrapping_add(1);
        let f = flags_after(result, a, 1, FlagOp::Add);
        assert!(f.overflow);
        assert!(!f.carry);
        assert!(f.sign);
    }

    #[test]
    fn sub_sets_carry_on_unsigned_borrow() {
        let f = flags_after(3i32.wrapping_sub(5), 3, 5, FlagOp::Sub);
        assert!(f.carry);
        assert!(!f.overflow);
    }

    #[test]
    fn sub_sets_overflow_on_signed_wrap() {
        let a = i32::MIN as u32;
        let result = (a as i32).wrapping_sub(1);
        let f = flags_after(result, a, 1, FlagOp::Sub);
        assert!(f.overflow);
    }

    #[test]
    fn mul_flags_signal_truncation() {
        let a = 0x10000u32;
        let product = (a as i32).wrapping_mul(a as i32);
        let f = flags_after(product, a, a, FlagOp::Mul);
        assert!(f.carry);
        assert!(f.overflow);

        let f = flags_after(6, 2, 3, FlagOp::Mul);
        assert!(!f.carry);
        assert!(!f.overflow);
    }

    #[test]
    fn shl_carry_is_the_last_bit_shifted_out() {
        let a = 0x8000_0000u32;
        let f = flags_after((a << 1) as i32, a, 1, FlagOp::Shl);
        assert!(f.carry);
        // result is zero and positive, so OF = CF ^ SF = 1
        assert!(f.overflow);

        let f = flags_after((1u32 << 4) as i32, 1, 4, FlagOp::Shl);
        assert!(!f.carry);
        assert!(!f.overflow);
    }

    #[test]
    fn shr_carry_and_overflow() {
        let f = flags_after((3u32 >> 1) as i32, 3, 1, FlagOp::Shr);
        assert!(f.carry);
        assert!(!f.overflow);

        let a = 0x8000_0001u32;
        let f = flags_after((a >> 1) as i32, a, 1, FlagOp::Shr);
        assert!(f.carry);
        assert!(f.overflow);
    }

    #[test]
    fn shift_count_zero_clears_carry_and_overflow() {
        let f = flags_after(0x80 as i32, 0x80, 0, FlagOp::Shl);
        assert!(!f.carry);
        assert!(!f.overflow);
    }

    #[test]
    fn ldb_sign_comes_from_the_byte() {
        let f = flags_after(0xFF, 0xFF, 0, FlagOp::Ldb);
        assert!(f.sign);
        assert!(!f.zero);

        let f = flags_after(0x7F, 0x7F, 0, FlagOp::Ldb);
        assert!(!f.sign);
    }

    #[test]
    fn bitwise_classes_clear_carry_and_overflow() {
        let mut flags = Flags { zero: false, sign: false, carry: true, overflow: true };
        update(&mut flags, 1, 1, 1, FlagOp::And);
        assert!(!flags.carry);
        assert!(!flags.overflow);
    }
}
