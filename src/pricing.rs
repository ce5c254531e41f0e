//! # Pricing Module
//!
//! Blended cost estimation for weekly token totals.
//!
//! The logs do not reliably carry a model id for every record, so the estimate uses a
//! single blended rate per million tokens (input and output together) rather than
//! per-model pricing. The rate is configurable via `--rate-per-million` or
//! `CLAUDE_USAGE_RATE_PER_MILLION`.

/// Average blended USD rate per million tokens
pub const DEFAULT_RATE_PER_MILLION: f64 = 9.0;

const TOKENS_PER_MILLION: f64 = 1_000_000.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pricing {
    pub per_million: f64,
}

impl Default for Pricing {
    fn default() -> Self {
        Self {
            per_million: DEFAULT_RATE_PER_MILLION,
        }
    }
}

impl Pricing {
    /// Negative or non-finite rates fall back to the default rate.
    pub fn new(per_million: f64) -> Self {
        if per_million.is_finite() && per_million >= 0.0 {
            Self { per_million }
        } else {
            Self::default()
        }
    }

    pub fn cost_for_tokens(&self, tokens: u64) -> f64 {
        tokens as f64 / TOKENS_PER_MILLION * self.per_million
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cost_of_zero_tokens_is_zero() {
        assert_eq!(Pricing::default().cost_for_tokens(0), 0.0);
    }

    #[test]
    fn test_cost_of_one_million_tokens_is_the_rate() {
        assert!((Pricing::default().cost_for_tokens(1_000_000) - 9.0).abs() < 1e-10);
        assert!((Pricing::new(3.5).cost_for_tokens(1_000_000) - 3.5).abs() < 1e-10);
    }

    #[test]
    fn test_cost_is_proportional() {
        let p = Pricing::new(9.0);
        let one = p.cost_for_tokens(250_000);
        let four = p.cost_for_tokens(1_000_000);
        assert!((four - one * 4.0).abs() < 1e-10);
    }

    #[test]
    fn test_invalid_rate_falls_back() {
        assert_eq!(Pricing::new(-1.0), Pricing::default());
        assert_eq!(Pricing::new(f64::NAN), Pricing::default());
    }
}
