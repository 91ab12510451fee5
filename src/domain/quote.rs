use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::Amount;

/// How long a quote stays valid after it is issued.
pub const QUOTE_TTL_SECONDS: i64 = 5 * 60;

/// Noise band applied to base rates, in parts per million either side (1%).
const RATE_JITTER_PPM: i64 = 10_000;

/// A time-bounded conversion rate offer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FxQuote {
    pub from_currency: String,
    pub to_currency: String,
    /// Units of `to_currency` per unit of `from_currency`
    pub rate: Amount,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl FxQuote {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Convert an amount of `from_currency`, rounded to two decimals.
    /// None if the product does not fit in an `Amount`.
    pub fn convert(&self, amount: Amount) -> Option<Amount> {
        amount.checked_mul(self.rate).map(|value| value.round_dp(2))
    }
}

/// Base conversion rates keyed by "FROM-TO".
#[derive(Debug, Clone)]
pub struct FxRateTable {
    rates: HashMap<String, Amount>,
    fallback: Amount,
}

impl Default for FxRateTable {
    fn default() -> Self {
        let rates = [
            ("GBP-INR", dec!(103.45)),
            ("USD-INR", dec!(83.25)),
            ("EUR-INR", dec!(90.15)),
            ("AUD-INR", dec!(54.30)),
            ("CAD-INR", dec!(61.20)),
        ]
        .into_iter()
        .map(|(pair, rate)| (pair.to_string(), rate))
        .collect();

        Self {
            rates,
            fallback: dec!(80.00),
        }
    }
}

impl FxRateTable {
    pub fn with_rate(mut self, from: &str, to: &str, rate: Amount) -> Self {
        self.rates.insert(pair_key(from, to), rate);
        self
    }

    /// Base rate for a pair; unknown pairs get the fallback rate.
    pub fn base_rate(&self, from: &str, to: &str) -> Amount {
        self.rates
            .get(&pair_key(from, to))
            .copied()
            .unwrap_or(self.fallback)
    }

    /// Issue a quote: base rate with up to ±1% uniform noise, four decimals.
    pub fn quote<R: Rng>(
        &self,
        from: &str,
        to: &str,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> FxQuote {
        let base = self.base_rate(from, to);
        let jitter = Decimal::new(rng.gen_range(-RATE_JITTER_PPM..=RATE_JITTER_PPM), 6);
        let rate = (base * (Decimal::ONE + jitter)).round_dp(4);

        FxQuote {
            from_currency: from.to_uppercase(),
            to_currency: to.to_uppercase(),
            rate,
            issued_at: now,
            expires_at: now + Duration::seconds(QUOTE_TTL_SECONDS),
        }
    }
}

fn pair_key(from: &str, to: &str) -> String {
    format!("{}-{}", from.to_uppercase(), to.to_uppercase())
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn test_known_pair_stays_in_band() {
        let table = FxRateTable::default();
        let mut rng = StdRng::seed_from_u64(7);
        let now = Utc::now();

        for _ in 0..500 {
            let quote = table.quote("GBP", "INR", now, &mut rng);
            assert!(quote.rate >= dec!(102.4155), "rate {} below band", quote.rate);
            assert!(quote.rate <= dec!(104.4845), "rate {} above band", quote.rate);
            assert!(quote.rate.scale() <= 4);
        }
    }

    #[test]
    fn test_unknown_pair_uses_fallback() {
        let table = FxRateTable::default();
        assert_eq!(table.base_rate("JPY", "INR"), dec!(80.00));
        assert_eq!(table.base_rate("usd", "inr"), dec!(83.25));
    }

    #[test]
    fn test_quote_expiry() {
        let table = FxRateTable::default();
        let now = Utc::now();
        let quote = table.quote("USD", "INR", now, &mut rand::thread_rng());

        assert_eq!(quote.expires_at - quote.issued_at, Duration::minutes(5));
        assert!(!quote.is_expired(now + Duration::minutes(5)));
        assert!(quote.is_expired(now + Duration::minutes(5) + Duration::seconds(1)));
    }

    #[test]
    fn test_convert_rounds_to_paise() {
        let quote = FxQuote {
            from_currency: "GBP".into(),
            to_currency: "INR".into(),
            rate: dec!(103.4567),
            issued_at: Utc::now(),
            expires_at: Utc::now(),
        };
        assert_eq!(quote.convert(dec!(100)), Some(dec!(10345.67)));
        assert_eq!(quote.convert(Decimal::MAX), None);
    }

    #[test]
    fn test_custom_rate() {
        let table = FxRateTable::default().with_rate("SGD", "INR", dec!(62.10));
        assert_eq!(table.base_rate("SGD", "INR"), dec!(62.10));
    }
}
