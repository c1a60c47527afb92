use serde::Serialize;
use tracing::debug;

use super::rounding::money;

pub const FIRST_BEND_POINT: f64 = 1_174.0;
pub const SECOND_BEND_POINT: f64 = 7_078.0;
pub const EARLIEST_CLAIMING_AGE: f64 = 62.0;
pub const LATEST_CLAIMING_AGE: f64 = 70.0;
pub const DEFAULT_FULL_RETIREMENT_AGE: f64 = 67.0;

const EARLY_REDUCTION_PER_MONTH: f64 = 5.0 / 9.0 / 100.0;
const DELAYED_CREDIT_PER_MONTH: f64 = 2.0 / 3.0 / 100.0;
const COMPUTATION_YEARS: usize = 35;
const BREAK_EVEN_HORIZON_AGE: u32 = 100;

/// 90% up to the first bend point, 32% to the second, 15% beyond.
pub fn primary_insurance_amount(aime: f64) -> f64 {
    let aime = aime.max(0.0);
    let first = aime.min(FIRST_BEND_POINT);
    let second = (aime.min(SECOND_BEND_POINT) - FIRST_BEND_POINT).max(0.0);
    let above = (aime - SECOND_BEND_POINT).max(0.0);
    first * 0.90 + second * 0.32 + above * 0.15
}

pub fn clamp_claiming_age(age: f64) -> f64 {
    age.clamp(EARLIEST_CLAIMING_AGE, LATEST_CLAIMING_AGE)
}

/// Multiplier on the PIA for claiming at `claiming_age`.
pub fn claiming_adjustment(claiming_age: f64, full_retirement_age: f64) -> f64 {
    let months = ((clamp_claiming_age(claiming_age) - full_retirement_age) * 12.0).round();
    if months < 0.0 {
        (1.0 + months * EARLY_REDUCTION_PER_MONTH).max(0.0)
    } else {
        1.0 + months * DELAYED_CREDIT_PER_MONTH
    }
}

/// Highest 35 years of indexed earnings spread over 420 months.
pub fn average_indexed_monthly_earnings(annual_earnings: &[f64]) -> f64 {
    let mut years: Vec<f64> = annual_earnings.iter().copied().filter(|e| *e > 0.0).collect();
    years.sort_by(|a, b| b.total_cmp(a));
    let total: f64 = years.iter().take(COMPUTATION_YEARS).sum();
    total / (COMPUTATION_YEARS * 12) as f64
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BenefitComparison {
    #[serde(serialize_with = "money")]
    pub at_62: f64,
    #[serde(serialize_with = "money")]
    pub at_full_retirement_age: f64,
    #[serde(serialize_with = "money")]
    pub at_70: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CumulativeBenefit {
    pub age: u32,
    #[serde(serialize_with = "money")]
    pub earlier_total: f64,
    #[serde(serialize_with = "money")]
    pub later_total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakEvenAnalysis {
    pub earlier_age: f64,
    pub later_age: f64,
    #[serde(serialize_with = "money")]
    pub earlier_monthly: f64,
    #[serde(serialize_with = "money")]
    pub later_monthly: f64,
    /// Age at which waiting has paid out as much as claiming earlier; `None`
    /// if that never happens by age 100.
    pub break_even_age: Option<f64>,
    pub cumulative: Vec<CumulativeBenefit>,
}

/// Cumulative benefits from claiming at `earlier_age` versus `later_age`.
pub fn break_even_age(
    pia: f64,
    earlier_age: f64,
    later_age: f64,
    full_retirement_age: f64,
) -> BreakEvenAnalysis {
    let earlier_age = clamp_claiming_age(earlier_age.min(later_age));
    let later_age = clamp_claiming_age(later_age.max(earlier_age));
    let earlier_monthly = pia * claiming_adjustment(earlier_age, full_retirement_age);
    let later_monthly = pia * claiming_adjustment(later_age, full_retirement_age);

    let horizon = BREAK_EVEN_HORIZON_AGE as f64;
    let break_even_age = (later_monthly > earlier_monthly)
        .then(|| {
            (later_monthly * later_age - earlier_monthly * earlier_age)
                / (later_monthly - earlier_monthly)
        })
        .filter(|age| *age <= horizon);

    let collected = |monthly: f64, claim: f64, age: f64| monthly * ((age - claim) * 12.0).max(0.0);
    let cumulative = (earlier_age.ceil() as u32..=BREAK_EVEN_HORIZON_AGE)
        .map(|age| CumulativeBenefit {
            age,
            earlier_total: collected(earlier_monthly, earlier_age, age as f64),
            later_total: collected(later_monthly, later_age, age as f64),
        })
        .collect();

    BreakEvenAnalysis {
        earlier_age,
        later_age,
        earlier_monthly,
        later_monthly,
        break_even_age,
        cumulative,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BenefitEstimate {
    #[serde(serialize_with = "money")]
    pub aime: f64,
    #[serde(serialize_with = "money")]
    pub pia: f64,
    pub claiming_age: f64,
    pub full_retirement_age: f64,
    pub adjustment_factor: f64,
    #[serde(serialize_with = "money")]
    pub monthly_benefit: f64,
    #[serde(serialize_with = "money")]
    pub annual_benefit: f64,
    pub comparison: BenefitComparison,
    /// Claiming age against full retirement age; `None` when they coincide.
    pub break_even: Option<BreakEvenAnalysis>,
}

pub fn estimate_benefit(aime: f64, claiming_age: f64, full_retirement_age: f64) -> BenefitEstimate {
    let pia = primary_insurance_amount(aime);
    let claiming_age = clamp_claiming_age(claiming_age);
    let adjustment_factor = claiming_adjustment(claiming_age, full_retirement_age);
    let monthly_benefit = pia * adjustment_factor;

    let comparison = BenefitComparison {
        at_62: pia * claiming_adjustment(EARLIEST_CLAIMING_AGE, full_retirement_age),
        at_full_retirement_age: pia * claiming_adjustment(full_retirement_age, full_retirement_age),
        at_70: pia * claiming_adjustment(LATEST_CLAIMING_AGE, full_retirement_age),
    };

    let reference_age = clamp_claiming_age(full_retirement_age);
    let break_even = ((claiming_age - reference_age).abs() >= 1.0 / 12.0).then(|| {
        break_even_age(
            pia,
            claiming_age.min(reference_age),
            claiming_age.max(reference_age),
            full_retirement_age,
        )
    });

    debug!(aime, claiming_age, pia, monthly_benefit, "benefit estimated");
    BenefitEstimate {
        aime,
        pia,
        claiming_age,
        full_retirement_age,
        adjustment_factor,
        monthly_benefit,
        annual_benefit: monthly_benefit * 12.0,
        comparison,
        break_even,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::{prop_assert, proptest};

    const EPS: f64 = 1e-9;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn pia_applies_bend_points() {
        assert_approx(primary_insurance_amount(1_000.0), 900.0);
        assert_approx(primary_insurance_amount(5_000.0), 1_056.6 + 3_826.0 * 0.32);
        assert_approx(
            primary_insurance_amount(10_000.0),
            1_056.6 + 5_904.0 * 0.32 + 2_922.0 * 0.15,
        );
        assert_approx(primary_insurance_amount(-10.0), 0.0);
    }

    #[test]
    fn adjustment_reduces_early_and_credits_late() {
        assert_approx(claiming_adjustment(62.0, 67.0), 1.0 - 60.0 * 5.0 / 900.0);
        assert_approx(claiming_adjustment(67.0, 67.0), 1.0);
        assert_approx(claiming_adjustment(70.0, 67.0), 1.24);
        assert_approx(claiming_adjustment(66.5, 67.0), 1.0 - 6.0 * 5.0 / 900.0);
    }

    #[test]
    fn claiming_age_is_clamped() {
        assert_approx(claiming_adjustment(55.0, 67.0), claiming_adjustment(62.0, 67.0));
        assert_approx(claiming_adjustment(75.0, 67.0), claiming_adjustment(70.0, 67.0));
        assert_approx(estimate_benefit(2_000.0, 72.0, 67.0).claiming_age, 70.0);
    }

    #[test]
    fn comparison_uses_the_same_pia() {
        let estimate = estimate_benefit(5_000.0, 62.0, 67.0);
        assert_approx(estimate.comparison.at_full_retirement_age, estimate.pia);
        assert_approx(estimate.comparison.at_62, estimate.monthly_benefit);
        assert_approx(estimate.comparison.at_70, estimate.pia * 1.24);
        assert_approx(estimate.annual_benefit, estimate.monthly_benefit * 12.0);
    }

    #[test]
    fn aime_uses_top_thirty_five_years() {
        let mut earnings = vec![60_000.0; 35];
        earnings.extend([1_000.0, 0.0, -5.0, 2_000.0]);
        assert_approx(average_indexed_monthly_earnings(&earnings), 5_000.0);
        assert_approx(average_indexed_monthly_earnings(&[42_000.0]), 100.0);
        assert_approx(average_indexed_monthly_earnings(&[]), 0.0);
    }

    #[test]
    fn early_versus_full_age_breaks_even_at_77() {
        let analysis = break_even_age(2_000.0, 62.0, 67.0, 67.0);
        let age = analysis.break_even_age.expect("waiting catches up");
        assert!((age - 77.0).abs() < 1e-9, "got {age}");

        let row = analysis
            .cumulative
            .iter()
            .find(|row| row.age == 77)
            .expect("age 77 row");
        assert!((row.earlier_total - row.later_total).abs() < 1e-6);
        assert_eq!(analysis.cumulative.first().map(|r| r.age), Some(62));
        assert_eq!(analysis.cumulative.last().map(|r| r.age), Some(100));
    }

    #[test]
    fn estimate_at_full_age_has_no_break_even() {
        assert!(estimate_benefit(3_000.0, 67.0, 67.0).break_even.is_none());
        let delayed = estimate_benefit(3_000.0, 70.0, 67.0);
        let analysis = delayed.break_even.expect("delayed claim compared");
        assert_approx(analysis.earlier_age, 67.0);
        assert_approx(analysis.later_age, 70.0);
        assert!(analysis.break_even_age.is_some_and(|age| age > 70.0 && age < 100.0));
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(128))]

        #[test]
        fn prop_pia_is_monotonic(aime in 0u32..20_000, bump in 1u32..500) {
            let low = primary_insurance_amount(aime as f64);
            let high = primary_insurance_amount((aime + bump) as f64);
            prop_assert!(high >= low);
            prop_assert!(high - low <= bump as f64 * 0.90 + 1e-9);
        }

        #[test]
        fn prop_later_claims_pay_more(months in 0u32..96) {
            let age = EARLIEST_CLAIMING_AGE + months as f64 / 12.0;
            let now = claiming_adjustment(age, 67.0);
            let next = claiming_adjustment(age + 1.0 / 12.0, 67.0);
            prop_assert!(next > now);
        }
    }
}
