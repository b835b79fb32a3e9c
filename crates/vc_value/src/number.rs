use core::fmt;

// -----------------------------------------------------------------------------
// Number

/// A JSON number.
///
/// Integers and floats are kept apart so that `5` and `5.0` survive a
/// round trip unchanged. A `Number` never holds NaN or an infinity.
///
/// Non-negative integers are always stored as unsigned, so `from_i64(3)` and
/// `from_u64(3)` compare equal.
#[derive(Clone, Copy, PartialEq)]
pub struct Number {
    n: N,
}

#[derive(Clone, Copy, PartialEq)]
enum N {
    PosInt(u64),
    /// Always less than zero.
    NegInt(i64),
    /// Always finite.
    Float(f64),
}

impl Number {
    #[inline]
    pub const fn from_u64(value: u64) -> Self {
        Self {
            n: N::PosInt(value),
        }
    }

    #[inline]
    pub const fn from_i64(value: i64) -> Self {
        if value < 0 {
            Self {
                n: N::NegInt(value),
            }
        } else {
            Self {
                n: N::PosInt(value as u64),
            }
        }
    }

    /// Returns `None` for NaN and infinities, which JSON cannot express.
    #[inline]
    pub fn from_f64(value: f64) -> Option<Self> {
        value.is_finite().then_some(Self { n: N::Float(value) })
    }

    /// `true` if the number was written without a fraction or exponent.
    #[inline]
    pub const fn is_integer(&self) -> bool {
        !matches!(self.n, N::Float(_))
    }

    #[inline]
    pub const fn is_f64(&self) -> bool {
        matches!(self.n, N::Float(_))
    }

    pub const fn as_u64(&self) -> Option<u64> {
        match self.n {
            N::PosInt(v) => Some(v),
            _ => None,
        }
    }

    pub const fn as_i64(&self) -> Option<i64> {
        match self.n {
            N::PosInt(v) if v <= i64::MAX as u64 => Some(v as i64),
            N::NegInt(v) => Some(v),
            _ => None,
        }
    }

    /// Lossy for integers beyond 2^53.
    pub const fn as_f64(&self) -> f64 {
        match self.n {
            N::PosInt(v) => v as f64,
            N::NegInt(v) => v as f64,
            N::Float(v) => v,
        }
    }

    /// The exact integral value, if there is one.
    ///
    /// Floats with no fractional part (`5.0`, `-1e3`) count as integral.
    pub fn as_integral(&self) -> Option<i128> {
        match self.n {
            N::PosInt(v) => Some(v as i128),
            N::NegInt(v) => Some(v as i128),
            N::Float(v) => {
                let truncated = v as i128;
                (truncated as f64 == v).then_some(truncated)
            }
        }
    }
}

// -----------------------------------------------------------------------------
// Conversion

macro_rules! impl_from_unsigned {
    ($($ty:ty),*) => {$(
        impl From<$ty> for Number {
            #[inline]
            fn from(value: $ty) -> Self {
                Number::from_u64(value as u64)
            }
        }
    )*};
}

macro_rules! impl_from_signed {
    ($($ty:ty),*) => {$(
        impl From<$ty> for Number {
            #[inline]
            fn from(value: $ty) -> Self {
                Number::from_i64(value as i64)
            }
        }
    )*};
}

impl_from_unsigned!(u8, u16, u32, u64, usize);
impl_from_signed!(i8, i16, i32, i64, isize);

// -----------------------------------------------------------------------------
// Format

impl fmt::Display for Number {
    /// Floats always carry a `.` or an exponent, so they read back as floats.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.n {
            N::PosInt(v) => fmt::Display::fmt(&v, f),
            N::NegInt(v) => fmt::Display::fmt(&v, f),
            N::Float(v) => fmt::Debug::fmt(&v, f),
        }
    }
}

impl fmt::Debug for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Number({self})")
    }
}

#[cfg(test)]
mod tests {
    use super::Number;
    use alloc::string::ToString;

    #[test]
    fn integer_and_float_stay_distinct() {
        let int = Number::from_i64(5);
        let float = Number::from_f64(5.0).unwrap();
        assert_ne!(int, float);
        assert_eq!(int.to_string(), "5");
        assert_eq!(float.to_string(), "5.0");
        assert_eq!(float.as_integral(), Some(5));
    }

    #[test]
    fn signedness_is_normalized() {
        assert_eq!(Number::from_i64(7), Number::from_u64(7));
        assert_eq!(Number::from_i64(-7).as_u64(), None);
        assert_eq!(Number::from_u64(u64::MAX).as_i64(), None);
        assert_eq!(Number::from_u64(u64::MAX).as_integral(), Some(u64::MAX as i128));
    }

    #[test]
    fn non_finite_is_rejected() {
        assert!(Number::from_f64(f64::NAN).is_none());
        assert!(Number::from_f64(f64::INFINITY).is_none());
        assert_eq!(Number::from_f64(0.5).unwrap().as_integral(), None);
    }
}
