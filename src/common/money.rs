use bigdecimal::{BigDecimal, ParseBigDecimalError, ToPrimitive};
use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

const SCALE: i64 = 10_000;
const CENT: i64 = SCALE / 100;
/// Percentages are stored in hundredths of a percent.
const PERCENT_SCALE: i64 = 100;
const FULL_PERCENT: i64 = 100 * PERCENT_SCALE;

#[derive(Debug, Clone, Copy, Default)]
/// A struct representing a monetary value with four decimal places of precision.
///
/// # Why Use Money? It is a Value Object.
/// Storing amounts as a scaled `i64` keeps balance arithmetic exact: crediting a
/// payer and debiting the split members always cancels out, which floating point
/// cannot promise once a ledger has a few hundred entries. Values are rounded to
/// whole cents only where the ledger rules call for it (debt matching, split
/// amounts, display).
///
/// # Examples
/// ```
/// use roomie_ledger::common::money::Money;
///
/// let amount: Money = "12.3".parse().unwrap();
/// assert_eq!(amount.as_i64(), 123_000);
/// assert_eq!(amount.to_string_2dp(), "12.30");
/// ```
pub struct Money(i64);

impl Money {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn from_cents(cents: i64) -> Self {
        Money(cents * CENT)
    }

    pub fn zero() -> Self {
        Money(0)
    }

    /// The smallest amount the ledger distinguishes from zero.
    pub fn cent() -> Self {
        Money(CENT)
    }

    pub fn as_i64(&self) -> i64 {
        self.0
    }

    pub fn abs(self) -> Self {
        Money(self.0.abs())
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }

    pub fn is_negative(&self) -> bool {
        self.0 < 0
    }

    pub fn checked_add(self, rhs: Money) -> Option<Money> {
        self.0.checked_add(rhs.0).map(Money)
    }

    pub fn checked_sub(self, rhs: Money) -> Option<Money> {
        self.0.checked_sub(rhs.0).map(Money)
    }

    /// Rounds half away from zero to a whole number of cents.
    pub fn round_to_cents(self) -> Self {
        Money(round_div(i128::from(self.0), i128::from(CENT)) as i64 * CENT)
    }

    /// `self * numerator / denominator`, rounded to the nearest cent.
    ///
    /// The product is taken in `i128` so that scaling a large total by a
    /// percentage expressed in hundredths cannot overflow. A zero denominator
    /// yields zero.
    pub fn mul_ratio(self, numerator: i64, denominator: i64) -> Self {
        if denominator == 0 {
            return Money::zero();
        }
        let units = round_div(
            i128::from(self.0) * i128::from(numerator),
            i128::from(denominator),
        );
        Money(units as i64).round_to_cents()
    }

    /// The cent-rounded share of this amount that `pct` represents.
    pub fn percent(self, pct: Percentage) -> Self {
        self.mul_ratio(pct.as_hundredths(), FULL_PERCENT)
    }

    pub fn to_string_2dp(&self) -> String {
        let cents = self.round_to_cents().0 / CENT;
        let bd = BigDecimal::from(cents) / BigDecimal::from(100);
        format!("{:.2}", bd)
    }
}

/// Integer division rounding half away from zero.
fn round_div(numerator: i128, denominator: i128) -> i128 {
    let (numerator, denominator) = if denominator < 0 {
        (-numerator, -denominator)
    } else {
        (numerator, denominator)
    };
    let half = denominator / 2;
    if numerator >= 0 {
        (numerator + half) / denominator
    } else {
        (numerator - half) / denominator
    }
}

fn parse_scaled(s: &str, scale: i64) -> Result<i64, ParseBigDecimalError> {
    let t = s.trim();
    if t.is_empty() {
        return Err(ParseBigDecimalError::Other("empty amount".into()));
    }

    let bd: BigDecimal = t.parse()?;

    let scaled = (bd * BigDecimal::from(scale)).round(0);
    scaled
        .to_i64()
        .ok_or_else(|| ParseBigDecimalError::Other("amount overflow".into()))
}

impl std::str::FromStr for Money {
    type Err = ParseBigDecimalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_scaled(s, SCALE).map(Money)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_2dp())
    }
}

impl PartialEq for Money {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}
impl Eq for Money {}

impl PartialOrd for Money {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Money {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}

impl Add for Money {
    type Output = Money;
    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl Sub for Money {
    type Output = Money;
    fn sub(self, rhs: Money) -> Money {
        Money(self.0 - rhs.0)
    }
}

impl Neg for Money {
    type Output = Money;
    fn neg(self) -> Money {
        Money(-self.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Money) {
        *self = *self - rhs;
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::zero(), Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Money {
        iter.copied().sum()
    }
}

/// A share of a total, kept with two decimal places (hundredths of a percent).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Percentage(i64);

impl Percentage {
    pub const ZERO: Percentage = Percentage(0);
    pub const FULL: Percentage = Percentage(FULL_PERCENT);

    pub fn from_hundredths(value: i64) -> Self {
        Percentage(value)
    }

    pub fn from_whole(value: i64) -> Self {
        Percentage(value * PERCENT_SCALE)
    }

    pub fn as_hundredths(&self) -> i64 {
        self.0
    }

    /// Parses text typed into a percentage field.
    ///
    /// Never fails: unparseable input reads as 0 and the result is clamped to
    /// `[0, 100]`. A dangling or leading dot (`"12."`, `".5"`) is accepted.
    pub fn parse_lenient(text: &str) -> Self {
        let t = text.trim().trim_end_matches('.');
        let t: Cow<'_, str> = if t.starts_with('.') {
            Cow::Owned(format!("0{t}"))
        } else {
            Cow::Borrowed(t)
        };
        // Clamped before scaling so digits too long for an i64 still read as 100.
        let value = t
            .parse::<BigDecimal>()
            .unwrap_or_default()
            .clamp(BigDecimal::from(0), BigDecimal::from(100));
        (value * BigDecimal::from(PERCENT_SCALE))
            .round(0)
            .to_i64()
            .map(Percentage)
            .unwrap_or(Percentage::ZERO)
    }

    /// `total / count` hundredths, rounded to two decimal places.
    pub(crate) fn share_of(total: i64, count: usize) -> Self {
        if count == 0 {
            return Percentage::ZERO;
        }
        Percentage(round_div(i128::from(total), count as i128) as i64)
    }

    pub fn to_string_2dp(&self) -> String {
        let bd = BigDecimal::from(self.0) / BigDecimal::from(PERCENT_SCALE);
        format!("{:.2}", bd)
    }
}

impl std::str::FromStr for Percentage {
    type Err = ParseBigDecimalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_scaled(s, PERCENT_SCALE).map(Percentage)
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_2dp())
    }
}

impl Add for Percentage {
    type Output = Percentage;
    fn add(self, rhs: Percentage) -> Percentage {
        Percentage(self.0 + rhs.0)
    }
}

impl Sub for Percentage {
    type Output = Percentage;
    fn sub(self, rhs: Percentage) -> Percentage {
        Percentage(self.0 - rhs.0)
    }
}

impl Sum for Percentage {
    fn sum<I: Iterator<Item = Percentage>>(iter: I) -> Percentage {
        iter.fold(Percentage::ZERO, Add::add)
    }
}
