//! Property-based tests for register invariants.
//!
//! These verify that register operations maintain the modular-arithmetic
//! invariants across all input combinations.

use emu_core::Register;
use proptest::prelude::*;

fn width_mask(width: u8) -> u16 {
    if width == 16 {
        0xffff
    } else {
        (1 << width) - 1
    }
}

proptest! {
    /// Loading any value then reading equals the value modulo 2^n.
    #[test]
    fn load_is_modular(value in any::<u16>(), width in 1u8..=16) {
        let mut r = Register::new(0, width);
        r.load(value);
        prop_assert_eq!(r.value(), value & width_mask(width));
    }

    /// A shift left then rotate right with the shifted-out carry restores
    /// the original value - carry threads through losslessly.
    #[test]
    fn shift_roundtrip(value in any::<u8>()) {
        let mut r = Register::new(u16::from(value), 8);
        let carry = r.logical_shift_left();
        r.rotate_right(carry);
        prop_assert_eq!(r.value(), u16::from(value));

        let carry = r.logical_shift_right();
        r.rotate_left(carry);
        prop_assert_eq!(r.value(), u16::from(value));
    }

    /// Add then subtract with threaded carry restores the original value.
    #[test]
    fn add_subtract_roundtrip(a in any::<u8>(), b in any::<u8>()) {
        let mut r = Register::new(u16::from(a), 8);
        r.add(u16::from(b), false);
        r.subtract(u16::from(b), true);
        prop_assert_eq!(r.value(), u16::from(a));
    }

    /// Binary display always round-trips through string equality.
    #[test]
    fn display_width_is_fixed(value in any::<u16>(), width in 1u8..=16) {
        let r = Register::new(value, width);
        let s = r.to_string();
        prop_assert_eq!(s.len(), usize::from(width));
        prop_assert!(r == s.as_str());
    }

    /// Compare never modifies the register and reports CMP flags.
    #[test]
    fn compare_is_pure(a in any::<u8>(), b in any::<u8>()) {
        let r = Register::new(u16::from(a), 8);
        let (carry, zero, _negative) = r.compare(u16::from(b));
        prop_assert_eq!(r.value(), u16::from(a));
        prop_assert_eq!(carry, a >= b);
        prop_assert_eq!(zero, a == b);
    }
}
