use std::fmt;

use crate::models::{Fuel, Threshold};
use crate::price::format_ratio;

/// Outcome of comparing alcohol and gasoline prices.
#[derive(Clone, Debug, PartialEq)]
pub enum Recommendation {
    /// One of the prices is missing or could not be parsed.
    InvalidInput,
    /// One of the prices is zero or negative.
    NonPositiveInput,
    Fuel {
        fuel: Fuel,
        /// Alcohol price as a percentage of the gasoline price, unrounded.
        ratio: f64,
        threshold: Threshold,
        station: Option<String>,
    },
}

impl Recommendation {
    pub fn fuel(&self) -> Option<Fuel> {
        match self {
            Self::Fuel { fuel, .. } => Some(*fuel),
            _ => None,
        }
    }

    pub fn ratio(&self) -> Option<f64> {
        match self {
            Self::Fuel { ratio, .. } => Some(*ratio),
            _ => None,
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidInput => f.write_str("Enter valid prices for both fuels."),
            Self::NonPositiveInput => f.write_str("Prices must be greater than zero."),
            Self::Fuel {
                fuel,
                ratio,
                threshold,
                station,
            } => {
                let at = station
                    .as_deref()
                    .map(|name| format!(" at {name}"))
                    .unwrap_or_default();

                let relation = match fuel {
                    Fuel::Alcohol => "within",
                    Fuel::Gasoline => "above",
                };

                write!(
                    f,
                    "{fuel} is the better choice{at}: alcohol costs {}% of gasoline, {relation} the {threshold} threshold.",
                    format_ratio(*ratio),
                )
            }
        }
    }
}

/// Picks the cheaper fuel: alcohol pays off while its price is at most
/// `threshold` percent of the gasoline price.
pub fn evaluate(
    alcohol_price: Option<f64>,
    gasoline_price: Option<f64>,
    threshold: Threshold,
    station_name: &str,
) -> Recommendation {
    let (Some(alcohol), Some(gasoline)) = (alcohol_price, gasoline_price) else {
        return Recommendation::InvalidInput;
    };

    if !alcohol.is_finite() || !gasoline.is_finite() {
        return Recommendation::InvalidInput;
    }

    if alcohol <= 0.0 || gasoline <= 0.0 {
        return Recommendation::NonPositiveInput;
    }

    let ratio = alcohol / gasoline * 100.0;
    let fuel = if ratio <= threshold.percent() {
        Fuel::Alcohol
    } else {
        Fuel::Gasoline
    };

    let station = station_name.trim();

    Recommendation::Fuel {
        fuel,
        ratio,
        threshold,
        station: (!station.is_empty()).then(|| station.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::{evaluate, Recommendation};
    use crate::models::{Fuel, Threshold};

    #[test]
    fn gasoline_above_threshold() {
        let r = evaluate(Some(3.0), Some(4.2), Threshold::Seventy, "");

        assert_eq!(r.fuel(), Some(Fuel::Gasoline));
        assert!((r.ratio().unwrap() - 71.428_571).abs() < 1e-4);
        assert_eq!(
            r.to_string(),
            "Gasoline is the better choice: alcohol costs 71,4% of gasoline, above the 70% threshold."
        );
    }

    #[test]
    fn alcohol_within_threshold() {
        let r = evaluate(Some(2.9), Some(4.2), Threshold::Seventy, " Posto Shell ");

        assert_eq!(r.fuel(), Some(Fuel::Alcohol));
        assert_eq!(
            r.to_string(),
            "Alcohol is the better choice at Posto Shell: alcohol costs 69,0% of gasoline, within the 70% threshold."
        );
    }

    #[test]
    fn threshold_choice_matters() {
        let seventy = evaluate(Some(3.0), Some(4.2), Threshold::Seventy, "");
        let seventy_five = evaluate(Some(3.0), Some(4.2), Threshold::SeventyFive, "");

        assert_eq!(seventy.fuel(), Some(Fuel::Gasoline));
        assert_eq!(seventy_five.fuel(), Some(Fuel::Alcohol));
    }

    #[test]
    fn boundary_is_alcohol() {
        assert_eq!(
            evaluate(Some(7.0), Some(10.0), Threshold::Seventy, "").fuel(),
            Some(Fuel::Alcohol)
        );
        assert_eq!(
            evaluate(Some(3.0), Some(4.0), Threshold::SeventyFive, "").fuel(),
            Some(Fuel::Alcohol)
        );
        assert_eq!(
            evaluate(Some(7.01), Some(10.0), Threshold::Seventy, "").fuel(),
            Some(Fuel::Gasoline)
        );
    }

    #[test]
    fn comparison_uses_unrounded_ratio() {
        // 70.04% displays as 70,0 but is still above the threshold.
        let r = evaluate(Some(7.004), Some(10.0), Threshold::Seventy, "");

        assert_eq!(r.fuel(), Some(Fuel::Gasoline));
        assert!(r.to_string().contains("70,0%"));
    }

    #[test]
    fn rejects_bad_input() {
        assert_eq!(
            evaluate(None, Some(4.2), Threshold::Seventy, "x"),
            Recommendation::InvalidInput
        );
        assert_eq!(
            evaluate(Some(3.0), None, Threshold::Seventy, "x"),
            Recommendation::InvalidInput
        );
        assert_eq!(
            evaluate(Some(f64::NAN), Some(4.2), Threshold::Seventy, ""),
            Recommendation::InvalidInput
        );
        assert_eq!(
            evaluate(Some(0.0), Some(4.2), Threshold::Seventy, ""),
            Recommendation::NonPositiveInput
        );
        assert_eq!(
            evaluate(Some(3.0), Some(-1.0), Threshold::SeventyFive, ""),
            Recommendation::NonPositiveInput
        );
        assert_eq!(Recommendation::NonPositiveInput.fuel(), None);
    }
}
