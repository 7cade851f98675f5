//! Money type for representing rupee amounts
//!
//! Internally stores amounts in paise (i64) so that every stored value is
//! already rounded to two decimal places. On the wire (JSON) amounts are
//! decimal rupee numbers, e.g. `120.5`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

/// Represents a monetary amount stored as paise (hundredths of a rupee)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Money(i64);

impl Money {
    /// Create a Money amount from paise
    ///
    /// # Examples
    /// ```
    /// use gstbill_cli::models::Money;
    /// let amount = Money::from_paise(1050); // ₹10.50
    /// assert_eq!(amount.to_string(), "10.50");
    /// ```
    pub const fn from_paise(paise: i64) -> Self {
        Self(paise)
    }

    /// Round a decimal rupee amount to the nearest paisa (half away from zero)
    ///
    /// # Examples
    /// ```
    /// use gstbill_cli::models::Money;
    /// assert_eq!(Money::from_rupees(1234.56).paise(), 123456);
    /// assert_eq!(Money::from_rupees(0.005).paise(), 1);
    /// ```
    pub fn from_rupees(amount: f64) -> Self {
        if !amount.is_finite() {
            return Self::zero();
        }
        Self(round_half_away(amount * 100.0))
    }

    /// Create a zero Money amount
    pub const fn zero() -> Self {
        Self(0)
    }

    /// Get the amount in paise
    pub const fn paise(&self) -> i64 {
        self.0
    }

    /// Get the whole rupees portion (truncated toward zero)
    pub const fn rupees(&self) -> i64 {
        self.0 / 100
    }

    /// Get the paise portion (0-99)
    pub const fn paise_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Get the amount as decimal rupees
    pub fn as_rupees(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Check if the amount is zero
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Check if the amount is negative
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Get the absolute value
    pub const fn abs(&self) -> Self {
        Self(self.0.abs())
    }

    /// Multiply by a (possibly fractional) quantity, rounding to the paisa
    ///
    /// # Examples
    /// ```
    /// use gstbill_cli::models::Money;
    /// let rate = Money::from_rupees(33.33);
    /// assert_eq!(rate.times(1.5).paise(), 5000); // 49.995 -> 50.00
    /// ```
    pub fn times(&self, qty: f64) -> Self {
        if !qty.is_finite() {
            return Self::zero();
        }
        Self(round_half_away(self.0 as f64 * qty))
    }

    /// Take a percentage of this amount, rounding to the paisa
    ///
    /// # Examples
    /// ```
    /// use gstbill_cli::models::Money;
    /// assert_eq!(Money::from_rupees(150.0).percent(9.0), Money::from_rupees(13.5));
    /// ```
    pub fn percent(&self, rate: f64) -> Self {
        if !rate.is_finite() {
            return Self::zero();
        }
        Self(round_half_away(rate * self.0 as f64 / 100.0))
    }

    /// Parse a money amount from a string
    ///
    /// Accepts formats: "10.50", "-10.50", "₹10.50", "Rs 10.50", "1,20,000.00", "10"
    pub fn parse(s: &str) -> Result<Self, MoneyParseError> {
        let s = s.trim();

        let (negative, s) = if let Some(stripped) = s.strip_prefix('-') {
            (true, stripped)
        } else {
            (false, s)
        };

        let s = s
            .strip_prefix('₹')
            .or_else(|| s.strip_prefix("Rs."))
            .or_else(|| s.strip_prefix("Rs"))
            .unwrap_or(s)
            .trim();
        let cleaned: String = s.chars().filter(|c| *c != ',').collect();

        let (whole, frac) = cleaned.split_once('.').unwrap_or((cleaned.as_str(), ""));
        let digits = |part: &str| part.chars().all(|c| c.is_ascii_digit());
        if (whole.is_empty() && frac.is_empty()) || !digits(whole) || !digits(frac) {
            return Err(MoneyParseError::InvalidFormat(s.to_string()));
        }

        let rupees: i64 = if whole.is_empty() {
            0
        } else {
            whole
                .parse()
                .map_err(|_| MoneyParseError::InvalidFormat(s.to_string()))?
        };

        // Two paise digits, rounded half away from zero on the third
        let mut frac_digits = frac.bytes().map(|b| i64::from(b - b'0'));
        let tens = frac_digits.next().unwrap_or(0);
        let ones = frac_digits.next().unwrap_or(0);
        let round_up = frac_digits.next().is_some_and(|d| d >= 5);
        let paise = rupees
            .checked_mul(100)
            .and_then(|p| p.checked_add(tens * 10 + ones + i64::from(round_up)))
            .ok_or_else(|| MoneyParseError::InvalidFormat(s.to_string()))?;

        Ok(Self(if negative { -paise } else { paise }))
    }

    /// Format with a currency symbol
    pub fn format_with_symbol(&self, symbol: &str) -> String {
        if self.is_negative() {
            format!("-{}{}.{:02}", symbol, self.rupees().abs(), self.paise_part())
        } else {
            format!("{}{}.{:02}", symbol, self.rupees(), self.paise_part())
        }
    }
}

fn round_half_away(value: f64) -> i64 {
    // f64::round rounds half away from zero; the nudge absorbs binary
    // representation error such as 1.005 * 100 = 100.49999999999999
    let nudged = value + value.signum() * 1e-7;
    nudged.round() as i64
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_negative() {
            write!(f, "-{}.{:02}", self.rupees().abs(), self.paise_part())
        } else {
            write!(f, "{}.{:02}", self.rupees(), self.paise_part())
        }
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_rupees())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let rupees = f64::deserialize(deserializer)?;
        Ok(Self::from_rupees(rupees))
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self(self.0 + other.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self(self.0 - other.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self {
        Self(-self.0)
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

impl<'a> std::iter::Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

/// Error type for money parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoneyParseError {
    InvalidFormat(String),
}

impl fmt::Display for MoneyParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoneyParseError::InvalidFormat(s) => write!(f, "Invalid money format: {}", s),
        }
    }
}

impl std::error::Error for MoneyParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_paise() {
        let m = Money::from_paise(1050);
        assert_eq!(m.paise(), 1050);
        assert_eq!(m.rupees(), 10);
        assert_eq!(m.paise_part(), 50);
    }

    #[test]
    fn test_from_rupees_rounds_half_away_from_zero() {
        assert_eq!(Money::from_rupees(10.505).paise(), 1051);
        assert_eq!(Money::from_rupees(-10.505).paise(), -1051);
        assert_eq!(Money::from_rupees(1.005).paise(), 101);
        assert_eq!(Money::from_rupees(f64::NAN).paise(), 0);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_paise(1050).to_string(), "10.50");
        assert_eq!(Money::from_paise(0).to_string(), "0.00");
        assert_eq!(Money::from_paise(-1050).to_string(), "-10.50");
        assert_eq!(Money::from_paise(5).format_with_symbol("₹"), "₹0.05");
    }

    #[test]
    fn test_times_and_percent() {
        let rate = Money::from_rupees(25.0);
        assert_eq!(rate.times(3.0), Money::from_rupees(75.0));
        assert_eq!(rate.times(-2.0), Money::from_rupees(-50.0));
        assert_eq!(Money::from_rupees(177.0).percent(18.0).paise(), 3186);
        assert_eq!(Money::from_paise(1).percent(50.0).paise(), 1);
    }

    #[test]
    fn test_parse() {
        assert_eq!(Money::parse("10.50").unwrap().paise(), 1050);
        assert_eq!(Money::parse("₹10.50").unwrap().paise(), 1050);
        assert_eq!(Money::parse("Rs 1,20,000").unwrap().paise(), 12_000_000);
        assert_eq!(Money::parse("-10.5").unwrap().paise(), -1050);
        assert_eq!(Money::parse(".75").unwrap().paise(), 75);
        assert!(Money::parse("ten").is_err());
    }

    #[test]
    fn test_parse_rounds_extra_fraction_digits() {
        assert_eq!(Money::parse("1.239").unwrap(), Money::from_rupees(1.239));
        assert_eq!(Money::parse("1.234").unwrap().paise(), 123);
        assert_eq!(Money::parse("-1.235").unwrap().paise(), -124);
        assert_eq!(Money::parse("0.995").unwrap().paise(), 100);
    }

    #[test]
    fn test_parse_rejects_malformed_fractions() {
        assert!(Money::parse("1.€").is_err());
        assert!(Money::parse("12.₹5").is_err());
        assert!(Money::parse("1.-5").is_err());
        assert!(Money::parse("1.+5").is_err());
        assert!(Money::parse("+-5").is_err());
        assert!(Money::parse("--5").is_err());
        assert!(Money::parse("1.2.3").is_err());
        assert!(Money::parse(".").is_err());
        assert!(Money::parse("").is_err());
    }

    #[test]
    fn test_sum() {
        let amounts = vec![Money::from_paise(100), Money::from_paise(250)];
        let total: Money = amounts.iter().sum();
        assert_eq!(total.paise(), 350);
    }

    #[test]
    fn test_serialization_uses_decimal_rupees() {
        let m = Money::from_paise(12050);
        let json = serde_json::to_string(&m).unwrap();
        assert_eq!(json, "120.5");

        let deserialized: Money = serde_json::from_str("120").unwrap();
        assert_eq!(deserialized.paise(), 12000);
    }
}
