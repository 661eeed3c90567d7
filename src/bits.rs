//! Pulls fixed-width fields out of unsigned words.
//!
//! `field::<4, _>(0xd12f_u16, 4)` is the second nibble, `1`. Field widths are
//! checked when the call is compiled: asking for a field wider than the word
//! (or zero bits wide) fails the build, and signed words don't implement
//! [`Unsigned`] at all.
use std::marker::PhantomData;

/// An unsigned machine word that fields can be cut from.
pub trait Unsigned: Copy {
    const BITS: u32;

    fn widen(self) -> u64;

    /// keeps the low `Self::BITS` bits of `v`
    fn truncate(v: u64) -> Self;
}

macro_rules! impl_unsigned {
    ($($t:ty),*) => {
        $(
            impl Unsigned for $t {
                const BITS: u32 = <$t>::BITS;

                fn widen(self) -> u64 {
                    self as u64
                }

                fn truncate(v: u64) -> Self {
                    v as $t
                }
            }
        )*
    };
}

impl_unsigned!(u8, u16, u32, u64);

struct WidthCheck<W, const O: u32>(PhantomData<W>);

impl<W: Unsigned, const O: u32> WidthCheck<W, O> {
    const OK: () = assert!(
        O >= 1 && O <= W::BITS,
        "field width must be between 1 and the width of the word"
    );
}

/// The `O` most significant bits of `input << offset`, with the shift done at
/// the width of `W`. Offsets past the end of the word give 0.
pub fn field<const O: u32, W: Unsigned>(input: W, offset: u32) -> W {
    #[allow(clippy::let_unit_value)]
    let () = WidthCheck::<W, O>::OK;

    let mask = u64::MAX >> (64 - W::BITS);
    let shifted = input.widen().checked_shl(offset).unwrap_or(0) & mask;
    W::truncate(shifted >> (W::BITS - O))
}
