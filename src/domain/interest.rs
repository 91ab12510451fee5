use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Amount;

const DAYS_PER_YEAR: i64 = 365;
/// Basis points in 100%
const BPS_SCALE: i64 = 10_000;

/// The single wallet account: its balance and interest state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountBalance {
    pub balance: Amount,
    pub currency: String,
    /// 720 = 7.20% per year
    pub annual_interest_rate_bps: u32,
    pub last_accrual: DateTime<Utc>,
}

/// Interest owed for a period, computed but not yet applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Accrual {
    pub days: i64,
    pub amount: Amount,
}

impl AccountBalance {
    /// Annual rate as a percentage, e.g. 7.2
    pub fn annual_rate_percent(&self) -> Decimal {
        Decimal::new(self.annual_interest_rate_bps as i64, 2)
    }

    /// Interest due at `now`, or None when less than a full day has passed
    /// or the interest is too large to represent.
    pub fn pending_accrual(&self, now: DateTime<Utc>) -> Option<Accrual> {
        let days = whole_days_between(self.last_accrual, now);
        if days < 1 {
            return None;
        }

        Some(Accrual {
            days,
            amount: calculate_interest(self.balance, self.annual_interest_rate_bps, days)?,
        })
    }
}

/// Simple interest prorated by day, rounded to paise:
/// principal * rate% * days / (365 * 100)
///
/// Returns None on overflow.
pub fn calculate_interest(principal: Amount, annual_rate_bps: u32, days: i64) -> Option<Amount> {
    let numerator = principal
        .checked_mul(Decimal::from(annual_rate_bps))?
        .checked_mul(Decimal::from(days))?;
    let denominator = Decimal::from(DAYS_PER_YEAR * BPS_SCALE);
    numerator
        .checked_div(denominator)
        .map(|interest| interest.round_dp(2))
}

/// Whole days elapsed from `from` to `to`, floored. Zero if `to` is earlier.
pub fn whole_days_between(from: DateTime<Utc>, to: DateTime<Utc>) -> i64 {
    (to - from).num_days().max(0)
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};
    use rust_decimal_macros::dec;

    use super::*;

    fn account(balance: Amount, last_accrual: DateTime<Utc>) -> AccountBalance {
        AccountBalance {
            balance,
            currency: "INR".into(),
            annual_interest_rate_bps: 720,
            last_accrual,
        }
    }

    #[test]
    fn test_calculate_interest() {
        // 25000 * 7.2 * 1 / 36500
        assert_eq!(calculate_interest(dec!(25000), 720, 1), Some(dec!(4.93)));
        assert_eq!(calculate_interest(dec!(36500), 1000, 1), Some(dec!(10.00)));
        assert_eq!(calculate_interest(dec!(36500), 1000, 3), Some(dec!(30.00)));
        assert_eq!(calculate_interest(dec!(0), 720, 30), Some(dec!(0)));
    }

    #[test]
    fn test_interest_overflow_is_none() {
        assert_eq!(calculate_interest(Decimal::MAX, 720, 365), None);

        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let acct = account(Decimal::MAX, start);
        assert_eq!(acct.pending_accrual(start + Duration::days(30)), None);
    }

    #[test]
    fn test_whole_days_floor() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        assert_eq!(whole_days_between(start, start + Duration::hours(23)), 0);
        assert_eq!(whole_days_between(start, start + Duration::hours(24)), 1);
        assert_eq!(whole_days_between(start, start + Duration::hours(71)), 2);
        assert_eq!(whole_days_between(start, start - Duration::days(3)), 0);
    }

    #[test]
    fn test_pending_accrual() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let acct = account(dec!(36500), start);

        assert_eq!(acct.pending_accrual(start + Duration::hours(12)), None);

        let accrual = acct.pending_accrual(start + Duration::days(2)).unwrap();
        assert_eq!(accrual.days, 2);
        assert_eq!(accrual.amount, dec!(14.40));
    }

    #[test]
    fn test_rate_percent() {
        let acct = account(dec!(1), Utc::now());
        assert_eq!(acct.annual_rate_percent(), dec!(7.20));
    }
}
