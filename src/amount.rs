use std::fmt;
use std::iter::Sum;

/// Fixed-point decimal with 4 decimal places, stored as a scaled integer.
///
/// Money enters and leaves the ledger in cents; the extra two places absorb
/// proportional attribution without drifting before the cent boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(i64);

impl Amount {
    const SCALE: i64 = 10_000;
    const CENT: i64 = Self::SCALE / 100;

    pub const ZERO: Amount = Amount(0);

    /// Tolerance under which a balance or a sum mismatch is treated as noise (0.01).
    pub const EPSILON: Amount = Amount(Self::CENT);

    /// Largest magnitude, in whole units, accepted from outside input.
    pub const MAX_UNITS: i64 = 1_000_000_000_000;

    /// Convert a float rounded to four places.
    ///
    /// Returns `None` for NaN, infinities and magnitudes of [`Amount::MAX_UNITS`]
    /// or more, so that sums over a journal stay far from `i64` limits.
    pub fn try_from_float(value: f64) -> Option<Self> {
        if !value.is_finite() || value.abs() >= Self::MAX_UNITS as f64 {
            return None;
        }
        Some(Amount((value * Self::SCALE as f64).round() as i64))
    }

    #[cfg(test)]
    pub(crate) fn from_float(value: f64) -> Self {
        Self::try_from_float(value).expect("amount out of range")
    }

    pub fn from_scaled(value: i64) -> Self {
        Amount(value)
    }

    pub fn from_cents(cents: i64) -> Self {
        Amount(cents * Self::CENT)
    }

    pub fn from_units(units: i64) -> Self {
        Amount(units * Self::SCALE)
    }

    pub fn scaled(self) -> i64 {
        self.0
    }

    pub fn abs(self) -> Self {
        Amount(self.0.saturating_abs())
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// True when the magnitude is strictly below [`Amount::EPSILON`].
    pub fn is_negligible(self) -> bool {
        self.0.unsigned_abs() < Self::CENT as u64
    }

    /// True when `self` and `other` differ by at most [`Amount::EPSILON`].
    pub fn approx_eq(self, other: Amount) -> bool {
        self.0.abs_diff(other.0) <= Self::CENT as u64
    }

    /// Round half away from zero to two decimal places.
    pub fn round_cents(self) -> Self {
        Amount((div_round(self.0 as i128, Self::CENT as i128) as i64).saturating_mul(Self::CENT))
    }

    /// `self * num / den`, rounded half away from zero to four decimal places.
    ///
    /// Returns zero when `den` is zero.
    pub fn scale(self, num: Amount, den: Amount) -> Self {
        if den.is_zero() {
            return Amount::ZERO;
        }
        Amount(div_round(self.0 as i128 * num.0 as i128, den.0 as i128) as i64)
    }

    /// `self * num / den`, rounded half away from zero straight to cents.
    ///
    /// Rounding once avoids the double-rounding error of `scale` followed by
    /// `round_cents`. Returns zero when `den` is zero.
    pub fn scale_to_cents(self, num: Amount, den: Amount) -> Self {
        if den.is_zero() {
            return Amount::ZERO;
        }
        let numerator = self.0 as i128 * num.0 as i128;
        let denominator = den.0 as i128 * Self::CENT as i128;
        Amount((div_round(numerator, denominator) as i64).saturating_mul(Self::CENT))
    }
}

/// Integer division rounding half away from zero.
fn div_round(num: i128, den: i128) -> i128 {
    let (num, den) = if den < 0 { (-num, -den) } else { (num, den) };
    let half = den / 2;
    if num >= 0 {
        (num + half) / den
    } else {
        -((-num + half) / den)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cents = self.round_cents().0 / Self::CENT;
        let sign = if cents < 0 { "-" } else { "" };
        let abs = cents.abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

impl std::ops::Add for Amount {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Amount(self.0.saturating_add(rhs.0))
    }
}

impl std::ops::Sub for Amount {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Amount(self.0.saturating_sub(rhs.0))
    }
}

impl std::ops::Neg for Amount {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Amount(self.0.saturating_neg())
    }
}

impl std::ops::AddAssign for Amount {
    fn add_assign(&mut self, rhs: Self) {
        self.0 = self.0.saturating_add(rhs.0);
    }
}

impl std::ops::SubAssign for Amount {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 = self.0.saturating_sub(rhs.0);
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Amount::ZERO, |acc, amount| acc + amount)
    }
}

impl<'a> Sum<&'a Amount> for Amount {
    fn sum<I: Iterator<Item = &'a Amount>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_float_converts_correctly() {
        assert_eq!(Amount::from_float(100.0), Amount::from_scaled(1_000_000));
        assert_eq!(Amount::from_float(1.5), Amount::from_scaled(15_000));
        assert_eq!(Amount::from_float(0.0001), Amount::from_scaled(1));
        assert_eq!(Amount::from_float(-50.25), Amount::from_scaled(-502_500));
    }

    #[test]
    fn try_from_float_rejects_out_of_range() {
        assert_eq!(Amount::try_from_float(f64::INFINITY), None);
        assert_eq!(Amount::try_from_float(f64::NEG_INFINITY), None);
        assert_eq!(Amount::try_from_float(f64::NAN), None);
        assert_eq!(Amount::try_from_float(1e300), None);
        assert_eq!(Amount::try_from_float(-1e12), None);
        assert_eq!(
            Amount::try_from_float(123_456_789.5),
            Some(Amount::from_scaled(1_234_567_895_000))
        );
    }

    #[test]
    fn arithmetic_saturates_instead_of_wrapping() {
        let max = Amount::from_scaled(i64::MAX);
        assert_eq!(max + Amount::from_scaled(1), max);
        assert_eq!(-max - Amount::from_scaled(10), Amount::from_scaled(i64::MIN));
        assert_eq!(Amount::from_scaled(i64::MIN).abs(), max);
        assert!(!max.approx_eq(Amount::from_scaled(i64::MIN)));
    }

    #[test]
    fn cents_and_units_agree() {
        assert_eq!(Amount::from_cents(3334), Amount::from_float(33.34));
        assert_eq!(Amount::from_units(90), Amount::from_cents(9000));
    }

    #[test]
    fn display_rounds_to_cents() {
        assert_eq!(Amount::from_units(100).to_string(), "100.00");
        assert_eq!(Amount::from_float(1.5).to_string(), "1.50");
        assert_eq!(Amount::from_scaled(49).to_string(), "0.00");
        assert_eq!(Amount::from_scaled(50).to_string(), "0.01");
        assert_eq!(Amount::ZERO.to_string(), "0.00");
    }

    #[test]
    fn display_formats_negative() {
        assert_eq!(Amount::from_float(-50.25).to_string(), "-50.25");
        assert_eq!(Amount::from_scaled(-50).to_string(), "-0.01");
        assert_eq!(Amount::from_scaled(-49).to_string(), "0.00");
    }

    #[test]
    fn round_cents_is_half_away_from_zero() {
        assert_eq!(Amount::from_scaled(12_350).round_cents(), Amount::from_cents(124));
        assert_eq!(Amount::from_scaled(12_349).round_cents(), Amount::from_cents(123));
        assert_eq!(Amount::from_scaled(-12_350).round_cents(), Amount::from_cents(-124));
        assert_eq!(Amount::from_scaled(-12_349).round_cents(), Amount::from_cents(-123));
    }

    #[test]
    fn scale_keeps_four_places() {
        let split = Amount::from_units(30);
        let contributed = Amount::from_units(60);
        let total = Amount::from_units(90);
        assert_eq!(split.scale(contributed, total), Amount::from_units(20));

        // 10 * 1/3 = 3.3333
        let third = Amount::from_units(10).scale(Amount::from_units(1), Amount::from_units(3));
        assert_eq!(third, Amount::from_scaled(33_333));
    }

    #[test]
    fn scale_to_cents_rounds_once() {
        let (one, three) = (Amount::from_units(1), Amount::from_units(3));
        let share = Amount::from_units(100).scale_to_cents(one, three);
        assert_eq!(share, Amount::from_cents(3333));

        // 0.0499 / 10 = 0.00499: rounding to 0.0050 first would then give 0.01
        let tiny = Amount::from_scaled(499);
        let (one, ten) = (Amount::from_units(1), Amount::from_units(10));
        assert_eq!(tiny.scale(one, ten).round_cents(), Amount::from_cents(1));
        assert_eq!(tiny.scale_to_cents(one, ten), Amount::ZERO);
    }

    #[test]
    fn scale_by_zero_denominator_is_zero() {
        let amount = Amount::from_units(10);
        assert_eq!(amount.scale(Amount::from_units(1), Amount::ZERO), Amount::ZERO);
        assert_eq!(
            amount.scale_to_cents(Amount::from_units(1), Amount::ZERO),
            Amount::ZERO
        );
    }

    #[test]
    fn tolerance_helpers() {
        assert!(Amount::from_scaled(99).is_negligible());
        assert!(!Amount::EPSILON.is_negligible());
        assert!(Amount::from_units(100).approx_eq(Amount::from_float(100.01)));
        assert!(!Amount::from_units(100).approx_eq(Amount::from_float(100.02)));
    }

    #[test]
    fn arithmetic() {
        let mut a = Amount::from_scaled(100);
        a += Amount::from_scaled(50);
        assert_eq!(a, Amount::from_scaled(150));
        a -= Amount::from_scaled(30);
        assert_eq!(a, Amount::from_scaled(120));
        assert_eq!(-a, Amount::from_scaled(-120));
        assert_eq!(a - Amount::from_scaled(200), Amount::from_scaled(-80));
    }

    #[test]
    fn sums_iterators() {
        let amounts = [
            Amount::from_cents(3334),
            Amount::from_cents(3333),
            Amount::from_cents(3333),
        ];
        assert_eq!(amounts.iter().sum::<Amount>(), Amount::from_units(100));
        assert_eq!(amounts.into_iter().sum::<Amount>(), Amount::from_units(100));
    }

    #[test]
    fn negative_ordering() {
        let negative = Amount::from_scaled(-100);
        let positive = Amount::from_scaled(100);
        assert!(negative < Amount::ZERO);
        assert!(Amount::ZERO < positive);
    }
}
