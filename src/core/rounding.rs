//! Presentation rounding applied when results are serialized.
//!
//! Calculators keep full precision in memory; these helpers are wired into
//! result types through `#[serde(serialize_with = ...)]` so money leaves the
//! crate at cent precision and rates leave as percentages.

use serde::Serializer;

pub fn round_money(value: f64) -> f64 {
    round_to(value, 2)
}

/// Fraction to percent at two decimals: `0.06125` becomes `6.13`.
pub fn round_percent(value: f64) -> f64 {
    round_to(value * 100.0, 2)
}

fn round_to(value: f64, decimals: i32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let scale = 10f64.powi(decimals);
    let rounded = (value * scale).round() / scale;
    // Avoid emitting -0.0 for tiny negative residues.
    if rounded == 0.0 { 0.0 } else { rounded }
}

pub(crate) fn money<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(round_money(*value))
}

pub(crate) fn percent<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(round_percent(*value))
}

pub(crate) fn opt_money<S: Serializer>(
    value: &Option<f64>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match value {
        Some(v) => serializer.serialize_some(&round_money(*v)),
        None => serializer.serialize_none(),
    }
}

pub(crate) fn opt_percent<S: Serializer>(
    value: &Option<f64>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match value {
        Some(v) => serializer.serialize_some(&round_percent(*v)),
        None => serializer.serialize_none(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn money_rounds_half_away_from_zero_to_cents() {
        assert_eq!(round_money(1896.2040), 1896.2);
        assert_eq!(round_money(10.005_000_1), 10.01);
        assert_eq!(round_money(-0.001), 0.0);
    }

    #[test]
    fn percent_scales_fraction_by_hundred() {
        assert_eq!(round_percent(0.065), 6.5);
        assert_eq!(round_percent(0.123456), 12.35);
        assert_eq!(round_percent(0.0), 0.0);
    }

    #[test]
    fn non_finite_values_pass_through() {
        assert!(round_money(f64::INFINITY).is_infinite());
        assert!(round_percent(f64::NAN).is_nan());
    }

    #[test]
    fn serializers_round_at_the_boundary() {
        #[derive(serde::Serialize)]
        struct Sample {
            #[serde(serialize_with = "money")]
            amount: f64,
            #[serde(serialize_with = "percent")]
            rate: f64,
            #[serde(serialize_with = "opt_money")]
            missing: Option<f64>,
        }

        let json = serde_json::to_string(&Sample {
            amount: 12.3456,
            rate: 0.22,
            missing: None,
        })
        .expect("sample should serialize");
        assert_eq!(json, r#"{"amount":12.35,"rate":22.0,"missing":null}"#);
    }
}
