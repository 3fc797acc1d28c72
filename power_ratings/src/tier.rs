use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// The named skill brackets, from lowest to highest.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Tier {
    Bronze,
    Silver,
    Gold,
    Platinum,
    Master,
    Grandmaster,
}

/// Minimum rating of each tier, in ascending order.
pub const TIERS: [(Tier, f64); 6] = [
    (Tier::Bronze, 0.0),
    (Tier::Silver, 1000.0),
    (Tier::Gold, 1500.0),
    (Tier::Platinum, 2000.0),
    (Tier::Master, 2250.0),
    (Tier::Grandmaster, 2500.0),
];

impl Tier {
    /// The highest tier whose threshold does not exceed `mu`.
    ///
    /// Ratings below zero (or NaN) never come out of the rating pipeline;
    /// they fall back to the lowest tier.
    ///
    /// ```
    /// use power_ratings::Tier;
    ///
    /// assert_eq!(Tier::classify(1999.9), Tier::Gold);
    /// assert_eq!(Tier::classify(2500.0), Tier::Grandmaster);
    /// ```
    pub fn classify(mu: f64) -> Tier {
        TIERS
            .iter()
            .rev()
            .find(|(_, threshold)| *threshold <= mu)
            .map(|(tier, _)| *tier)
            .unwrap_or(Tier::Bronze)
    }

    pub fn threshold(&self) -> f64 {
        TIERS
            .iter()
            .find(|(tier, _)| tier == self)
            .map(|(_, threshold)| *threshold)
            .unwrap_or(0.0)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Tier::Bronze => "Bronze",
            Tier::Silver => "Silver",
            Tier::Gold => "Gold",
            Tier::Platinum => "Platinum",
            Tier::Master => "Master",
            Tier::Grandmaster => "Grandmaster",
        }
    }
}

impl Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundaries() {
        assert_eq!(Tier::classify(0.0), Tier::Bronze);
        assert_eq!(Tier::classify(999.99), Tier::Bronze);
        assert_eq!(Tier::classify(1000.0), Tier::Silver);
        assert_eq!(Tier::classify(1500.0), Tier::Gold);
        assert_eq!(Tier::classify(1999.9), Tier::Gold);
        assert_eq!(Tier::classify(2000.0), Tier::Platinum);
        assert_eq!(Tier::classify(2249.0), Tier::Platinum);
        assert_eq!(Tier::classify(2250.0), Tier::Master);
        assert_eq!(Tier::classify(2500.0), Tier::Grandmaster);
        assert_eq!(Tier::classify(3700.0), Tier::Grandmaster);
    }

    #[test]
    fn highest_threshold_not_above_rating() {
        let mut mu = 0.0;
        while mu < 2500.0 {
            let tier = Tier::classify(mu);
            assert!(tier.threshold() <= mu);
            assert!(TIERS
                .iter()
                .filter(|(_, t)| *t > tier.threshold())
                .all(|(_, t)| *t > mu));
            mu += 12.5;
        }
    }

    #[test]
    fn out_of_range_ratings() {
        assert_eq!(Tier::classify(-10.0), Tier::Bronze);
        assert_eq!(Tier::classify(f64::NAN), Tier::Bronze);
    }

    #[test]
    fn names() {
        assert_eq!(Tier::Platinum.to_string(), "Platinum");
        assert_eq!(serde_json::to_string(&Tier::Master).unwrap(), "\"Master\"");
    }
}
