use std::{
    fmt,
    iter::Sum,
    ops::{Add, AddAssign, Neg, Sub, SubAssign},
};

use serde::{Deserialize, Serialize};

/// Signed monetary value stored as an exact count of minor currency units (cents).
///
/// Single amounts are limited to the `i64` range of cents while sums are kept in
/// `i128`, so adding up stored amounts cannot overflow. Division truncates toward zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Amount(i128);

const CENTS_PER_UNIT: i128 = 100;

impl Amount {
    pub const ZERO: Amount = Amount(0);

    pub const fn from_cents(cents: i64) -> Self {
        Self(cents as i128)
    }

    /// Builds an amount from whole currency units, e.g. `from_units(20)` is 20.00.
    pub const fn from_units(units: i64) -> Self {
        Self(units as i128 * CENTS_PER_UNIT)
    }

    pub const fn cents(self) -> i128 {
        self.0
    }

    pub fn add(self, other: Amount) -> Amount {
        Amount(self.0.saturating_add(other.0))
    }

    pub fn subtract(self, other: Amount) -> Amount {
        Amount(self.0.saturating_sub(other.0))
    }

    pub fn negate(self) -> Amount {
        Amount(self.0.saturating_neg())
    }

    /// Multiplies by an integer. Returns `None` when the product is not representable.
    pub fn multiply(self, factor: i64) -> Option<Amount> {
        self.0.checked_mul(i128::from(factor)).map(Amount)
    }

    /// Divides by an integer, truncating toward zero. Returns `None` for a zero divisor.
    pub fn divide(self, divisor: i64) -> Option<Amount> {
        self.0.checked_div(i128::from(divisor)).map(Amount)
    }

    /// Sum that reports overflow instead of saturating.
    pub fn checked_add(self, other: Amount) -> Option<Amount> {
        self.0.checked_add(other.0).map(Amount)
    }

    /// Adds two optional amounts; an absent side yields the other one unchanged.
    pub fn add_optional(a: Option<Amount>, b: Option<Amount>) -> Option<Amount> {
        match (a, b) {
            (Some(a), Some(b)) => Some(a + b),
            (Some(a), None) => Some(a),
            (None, b) => b,
        }
    }

    pub fn is_positive(self) -> bool {
        self.0 > 0
    }

    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn abs(self) -> Amount {
        Amount(self.0.abs())
    }

    /// Parses locale-formatted text such as `12`, `-3,5` or `1.234,50`.
    ///
    /// `decimal_separator` splits units from cents; the other of `.`/`,` is
    /// accepted as grouping. At most two fraction digits are allowed.
    pub fn parse(text: &str, decimal_separator: char) -> Option<Amount> {
        let trimmed = text.trim();
        let (negative, digits) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
        };
        if digits.is_empty() {
            return None;
        }
        let grouping = if decimal_separator == ',' { '.' } else { ',' };
        let (whole, fraction) = match digits.split_once(decimal_separator) {
            Some((whole, fraction)) => (whole, fraction),
            None => (digits, ""),
        };
        let whole: String = whole.chars().filter(|ch| *ch != grouping).collect();
        if whole.is_empty() && fraction.is_empty() {
            return None;
        }
        if !whole.chars().all(|ch| ch.is_ascii_digit())
            || !fraction.chars().all(|ch| ch.is_ascii_digit())
            || fraction.len() > 2
        {
            return None;
        }
        let units: i64 = if whole.is_empty() { 0 } else { whole.parse().ok()? };
        let cents: i64 = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<i64>().ok()? * 10,
            _ => fraction.parse().ok()?,
        };
        let value = units.checked_mul(100)?.checked_add(cents)?;
        Some(Amount::from_cents(if negative { -value } else { value }))
    }

    /// Renders the amount with the given decimal separator and two fraction digits.
    pub fn format(self, decimal_separator: char) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        let absolute = self.0.unsigned_abs();
        format!(
            "{sign}{}{decimal_separator}{:02}",
            absolute / CENTS_PER_UNIT as u128,
            absolute % CENTS_PER_UNIT as u128
        )
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format('.'))
    }
}

impl Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Amount) -> Amount {
        Amount::add(self, rhs)
    }
}

impl AddAssign for Amount {
    fn add_assign(&mut self, rhs: Amount) {
        *self = Amount::add(*self, rhs);
    }
}

impl Sub for Amount {
    type Output = Amount;

    fn sub(self, rhs: Amount) -> Amount {
        self.subtract(rhs)
    }
}

impl SubAssign for Amount {
    fn sub_assign(&mut self, rhs: Amount) {
        *self = self.subtract(rhs);
    }
}

impl Neg for Amount {
    type Output = Amount;

    fn neg(self) -> Amount {
        self.negate()
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Amount>>(iter: I) -> Amount {
        iter.fold(Amount::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Amount> for Amount {
    fn sum<I: Iterator<Item = &'a Amount>>(iter: I) -> Amount {
        iter.copied().sum()
    }
}
