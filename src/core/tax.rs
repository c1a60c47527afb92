use serde::Serialize;
use tracing::debug;

use super::rounding::{money, percent};
use super::types::{BracketSlice, FilingStatus, TaxBracket};

const fn bracket(upper_bound: f64, rate: f64) -> TaxBracket {
    TaxBracket { upper_bound, rate }
}

pub const SINGLE_BRACKETS_2024: &[TaxBracket] = &[
    bracket(11_600.0, 0.10),
    bracket(47_150.0, 0.12),
    bracket(100_525.0, 0.22),
    bracket(191_950.0, 0.24),
    bracket(243_725.0, 0.32),
    bracket(609_350.0, 0.35),
    bracket(f64::INFINITY, 0.37),
];

pub const MARRIED_JOINT_BRACKETS_2024: &[TaxBracket] = &[
    bracket(23_200.0, 0.10),
    bracket(94_300.0, 0.12),
    bracket(201_050.0, 0.22),
    bracket(383_900.0, 0.24),
    bracket(487_450.0, 0.32),
    bracket(731_200.0, 0.35),
    bracket(f64::INFINITY, 0.37),
];

pub const HEAD_OF_HOUSEHOLD_BRACKETS_2024: &[TaxBracket] = &[
    bracket(16_550.0, 0.10),
    bracket(63_100.0, 0.12),
    bracket(100_500.0, 0.22),
    bracket(191_950.0, 0.24),
    bracket(243_700.0, 0.32),
    bracket(609_350.0, 0.35),
    bracket(f64::INFINITY, 0.37),
];

const SINGLE_LONG_TERM_GAINS_2024: &[TaxBracket] = &[
    bracket(47_025.0, 0.0),
    bracket(518_900.0, 0.15),
    bracket(f64::INFINITY, 0.20),
];

const MARRIED_JOINT_LONG_TERM_GAINS_2024: &[TaxBracket] = &[
    bracket(94_050.0, 0.0),
    bracket(583_750.0, 0.15),
    bracket(f64::INFINITY, 0.20),
];

const HEAD_OF_HOUSEHOLD_LONG_TERM_GAINS_2024: &[TaxBracket] = &[
    bracket(63_000.0, 0.0),
    bracket(551_350.0, 0.15),
    bracket(f64::INFINITY, 0.20),
];

const NET_INVESTMENT_INCOME_TAX_RATE: f64 = 0.038;
const LONG_TERM_HOLDING_MONTHS: u32 = 12;

impl FilingStatus {
    pub fn brackets(self) -> &'static [TaxBracket] {
        match self {
            FilingStatus::Single => SINGLE_BRACKETS_2024,
            FilingStatus::MarriedJoint => MARRIED_JOINT_BRACKETS_2024,
            FilingStatus::HeadOfHousehold => HEAD_OF_HOUSEHOLD_BRACKETS_2024,
        }
    }

    pub fn standard_deduction(self) -> f64 {
        match self {
            FilingStatus::Single => 14_600.0,
            FilingStatus::MarriedJoint => 29_200.0,
            FilingStatus::HeadOfHousehold => 21_900.0,
        }
    }

    pub fn long_term_gains_brackets(self) -> &'static [TaxBracket] {
        match self {
            FilingStatus::Single => SINGLE_LONG_TERM_GAINS_2024,
            FilingStatus::MarriedJoint => MARRIED_JOINT_LONG_TERM_GAINS_2024,
            FilingStatus::HeadOfHousehold => HEAD_OF_HOUSEHOLD_LONG_TERM_GAINS_2024,
        }
    }

    pub fn niit_threshold(self) -> f64 {
        match self {
            FilingStatus::Single | FilingStatus::HeadOfHousehold => 200_000.0,
            FilingStatus::MarriedJoint => 250_000.0,
        }
    }
}

pub trait TaxEvaluator {
    type Input;
    type Assessment;

    fn evaluate(&self, input: &Self::Input) -> Self::Assessment;
}

/// Tax on `taxable_income` where each bracket only taxes its own slice.
/// Returns the total and one slice per bracket touched.
pub fn progressive_tax(taxable_income: f64, brackets: &[TaxBracket]) -> (f64, Vec<BracketSlice>) {
    let mut total = 0.0;
    let mut lower_bound = 0.0;
    let mut slices = Vec::new();

    for bracket in brackets {
        if taxable_income <= lower_bound {
            break;
        }
        let taxable_amount = taxable_income.min(bracket.upper_bound) - lower_bound;
        let tax = taxable_amount * bracket.rate;
        total += tax;
        slices.push(BracketSlice {
            rate: bracket.rate,
            lower_bound,
            upper_bound: bracket.upper_bound.is_finite().then_some(bracket.upper_bound),
            taxable_amount,
            tax,
        });
        lower_bound = bracket.upper_bound;
    }

    (total, slices)
}

/// Rate of the first bracket whose upper bound covers `amount`.
pub fn marginal_rate(amount: f64, brackets: &[TaxBracket]) -> f64 {
    brackets
        .iter()
        .find(|b| amount <= b.upper_bound)
        .or(brackets.last())
        .map_or(0.0, |b| b.rate)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IncomeTaxInput {
    pub income: f64,
    pub filing_status: FilingStatus,
    /// Itemized deductions; the standard deduction applies when larger.
    pub deduction: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeTaxAssessment {
    pub filing_status: FilingStatus,
    #[serde(serialize_with = "money")]
    pub gross_income: f64,
    #[serde(serialize_with = "money")]
    pub standard_deduction: f64,
    #[serde(serialize_with = "money")]
    pub deduction_used: f64,
    pub itemized: bool,
    #[serde(serialize_with = "money")]
    pub taxable_income: f64,
    #[serde(serialize_with = "money")]
    pub total_tax: f64,
    #[serde(serialize_with = "percent")]
    pub effective_rate: f64,
    #[serde(serialize_with = "percent")]
    pub marginal_rate: f64,
    #[serde(serialize_with = "money")]
    pub after_tax_income: f64,
    pub bracket_breakdown: Vec<BracketSlice>,
}

/// 2024 federal ordinary income tax.
#[derive(Debug, Clone, Copy, Default)]
pub struct FederalIncomeTax;

impl TaxEvaluator for FederalIncomeTax {
    type Input = IncomeTaxInput;
    type Assessment = IncomeTaxAssessment;

    fn evaluate(&self, input: &IncomeTaxInput) -> IncomeTaxAssessment {
        let status = input.filing_status;
        let standard_deduction = status.standard_deduction();
        let deduction_used = input.deduction.max(standard_deduction);
        let taxable_income = (input.income - deduction_used).max(0.0);
        let brackets = status.brackets();
        let (total_tax, bracket_breakdown) = progressive_tax(taxable_income, brackets);

        debug!(income = input.income, ?status, taxable_income, total_tax, "income tax evaluated");
        IncomeTaxAssessment {
            filing_status: status,
            gross_income: input.income,
            standard_deduction,
            deduction_used,
            itemized: input.deduction > standard_deduction,
            taxable_income,
            total_tax,
            effective_rate: if input.income > 0.0 {
                total_tax / input.income
            } else {
                0.0
            },
            marginal_rate: marginal_rate(taxable_income, brackets),
            after_tax_income: input.income - total_tax,
            bracket_breakdown,
        }
    }
}

pub fn compute_tax(income: f64, filing_status: FilingStatus, deduction: f64) -> IncomeTaxAssessment {
    FederalIncomeTax.evaluate(&IncomeTaxInput {
        income,
        filing_status,
        deduction,
    })
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CapitalGainInput {
    pub purchase_price: f64,
    pub sale_price: f64,
    pub holding_months: u32,
    pub filing_status: FilingStatus,
    /// Taxable ordinary income the gain is stacked on.
    pub ordinary_income: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CapitalGainsAssessment {
    #[serde(serialize_with = "money")]
    pub gain: f64,
    pub long_term: bool,
    /// Preferential rate when long-term, the effective ordinary rate on the
    /// gain otherwise.
    #[serde(serialize_with = "percent")]
    pub tax_rate: f64,
    #[serde(serialize_with = "money")]
    pub capital_gains_tax: f64,
    #[serde(serialize_with = "money")]
    pub niit: f64,
    #[serde(serialize_with = "money")]
    pub total_tax: f64,
    #[serde(serialize_with = "money")]
    pub net_proceeds: f64,
    #[serde(serialize_with = "percent")]
    pub effective_rate: f64,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CapitalGainsTax;

impl TaxEvaluator for CapitalGainsTax {
    type Input = CapitalGainInput;
    type Assessment = CapitalGainsAssessment;

    fn evaluate(&self, input: &CapitalGainInput) -> CapitalGainsAssessment {
        let gain = input.sale_price - input.purchase_price;
        let long_term = input.holding_months >= LONG_TERM_HOLDING_MONTHS;
        if gain <= 0.0 {
            return CapitalGainsAssessment {
                gain,
                long_term,
                tax_rate: 0.0,
                capital_gains_tax: 0.0,
                niit: 0.0,
                total_tax: 0.0,
                net_proceeds: input.sale_price,
                effective_rate: 0.0,
            };
        }

        let status = input.filing_status;
        let ordinary = input.ordinary_income.max(0.0);
        let total_income = ordinary + gain;
        let (tax_rate, capital_gains_tax) = if long_term {
            let rate = marginal_rate(total_income, status.long_term_gains_brackets());
            (rate, gain * rate)
        } else {
            let (with_gain, _) = progressive_tax(total_income, status.brackets());
            let (without_gain, _) = progressive_tax(ordinary, status.brackets());
            let tax = with_gain - without_gain;
            (tax / gain, tax)
        };

        let niit = (gain.min(total_income - status.niit_threshold())).max(0.0)
            * NET_INVESTMENT_INCOME_TAX_RATE;
        let total_tax = capital_gains_tax + niit;

        CapitalGainsAssessment {
            gain,
            long_term,
            tax_rate,
            capital_gains_tax,
            niit,
            total_tax,
            net_proceeds: input.sale_price - total_tax,
            effective_rate: total_tax / gain,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelfEmploymentInput {
    pub net_earnings: f64,
    /// W-2 wages already counted against the Social Security wage base.
    pub other_wages: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelfEmploymentAssessment {
    #[serde(serialize_with = "money")]
    pub net_earnings: f64,
    #[serde(serialize_with = "money")]
    pub taxable_earnings: f64,
    #[serde(serialize_with = "money")]
    pub social_security_tax: f64,
    #[serde(serialize_with = "money")]
    pub medicare_tax: f64,
    #[serde(serialize_with = "money")]
    pub additional_medicare_tax: f64,
    #[serde(serialize_with = "money")]
    pub total_tax: f64,
    #[serde(serialize_with = "money")]
    pub deductible_portion: f64,
    #[serde(serialize_with = "money")]
    pub quarterly_payment: f64,
    #[serde(serialize_with = "percent")]
    pub effective_rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelfEmploymentTax {
    pub earnings_factor: f64,
    pub social_security_rate: f64,
    pub social_security_wage_base: f64,
    pub medicare_rate: f64,
    pub additional_medicare_rate: f64,
    pub additional_medicare_threshold: f64,
}

impl Default for SelfEmploymentTax {
    /// 2024 rates, single-filer additional Medicare threshold.
    fn default() -> Self {
        Self {
            earnings_factor: 0.9235,
            social_security_rate: 0.124,
            social_security_wage_base: 168_600.0,
            medicare_rate: 0.029,
            additional_medicare_rate: 0.009,
            additional_medicare_threshold: 200_000.0,
        }
    }
}

impl TaxEvaluator for SelfEmploymentTax {
    type Input = SelfEmploymentInput;
    type Assessment = SelfEmploymentAssessment;

    fn evaluate(&self, input: &SelfEmploymentInput) -> SelfEmploymentAssessment {
        let taxable_earnings = (input.net_earnings * self.earnings_factor).max(0.0);
        let remaining_wage_base = (self.social_security_wage_base - input.other_wages).max(0.0);
        let social_security_tax = taxable_earnings.min(remaining_wage_base) * self.social_security_rate;
        let medicare_tax = taxable_earnings * self.medicare_rate;
        let additional_medicare_tax = (taxable_earnings - self.additional_medicare_threshold)
            .max(0.0)
            * self.additional_medicare_rate;
        let total_tax = social_security_tax + medicare_tax + additional_medicare_tax;

        SelfEmploymentAssessment {
            net_earnings: input.net_earnings,
            taxable_earnings,
            social_security_tax,
            medicare_tax,
            additional_medicare_tax,
            total_tax,
            deductible_portion: total_tax / 2.0,
            quarterly_payment: total_tax / 4.0,
            effective_rate: if input.net_earnings > 0.0 {
                total_tax / input.net_earnings
            } else {
                0.0
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RefundInput {
    pub income: f64,
    pub filing_status: FilingStatus,
    pub withholding: f64,
    pub deduction: f64,
    /// Nonrefundable credits; they reduce tax to zero at most.
    pub credits: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefundEstimate {
    #[serde(serialize_with = "money")]
    pub taxable_income: f64,
    #[serde(serialize_with = "money")]
    pub tax_before_credits: f64,
    #[serde(serialize_with = "money")]
    pub credits_applied: f64,
    #[serde(serialize_with = "money")]
    pub tax_after_credits: f64,
    #[serde(serialize_with = "money")]
    pub withholding: f64,
    /// Positive for a refund, negative for an amount owed.
    #[serde(serialize_with = "money")]
    pub refund: f64,
    pub is_refund: bool,
    #[serde(serialize_with = "percent")]
    pub effective_rate: f64,
    #[serde(serialize_with = "percent")]
    pub marginal_rate: f64,
    pub bracket_breakdown: Vec<BracketSlice>,
}

pub fn estimate_refund(input: &RefundInput) -> RefundEstimate {
    let assessment = compute_tax(input.income, input.filing_status, input.deduction);
    let credits_applied = input.credits.clamp(0.0, assessment.total_tax);
    let tax_after_credits = assessment.total_tax - credits_applied;
    let refund = input.withholding - tax_after_credits;

    RefundEstimate {
        taxable_income: assessment.taxable_income,
        tax_before_credits: assessment.total_tax,
        credits_applied,
        tax_after_credits,
        withholding: input.withholding,
        refund,
        is_refund: refund > 0.0,
        effective_rate: if input.income > 0.0 {
            tax_after_credits / input.income
        } else {
            0.0
        },
        marginal_rate: assessment.marginal_rate,
        bracket_breakdown: assessment.bracket_breakdown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::{prop_assert, proptest};

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn single_filer_pays_each_slice_at_its_rate() {
        let assessment = compute_tax(100_000.0, FilingStatus::Single, 0.0);
        assert_approx(assessment.deduction_used, 14_600.0);
        assert_approx(assessment.taxable_income, 85_400.0);
        assert_approx(assessment.total_tax, 1_160.0 + 4_266.0 + 8_415.0);
        assert_approx(assessment.marginal_rate, 0.22);
        assert_approx(assessment.effective_rate, 0.13841);
        assert_eq!(assessment.bracket_breakdown.len(), 3);
        assert_eq!(assessment.bracket_breakdown[2].upper_bound, Some(100_525.0));
        assert!(!assessment.itemized);
    }

    #[test]
    fn married_joint_uses_its_own_table() {
        let assessment = compute_tax(200_000.0, FilingStatus::MarriedJoint, 0.0);
        assert_approx(assessment.taxable_income, 170_800.0);
        assert_approx(assessment.total_tax, 2_320.0 + 8_532.0 + 16_830.0);
    }

    #[test]
    fn itemized_deduction_applies_when_larger() {
        let assessment = compute_tax(90_000.0, FilingStatus::HeadOfHousehold, 30_000.0);
        assert!(assessment.itemized);
        assert_approx(assessment.taxable_income, 60_000.0);
        assert_approx(assessment.total_tax, 1_655.0 + (60_000.0 - 16_550.0) * 0.12);
    }

    #[test]
    fn income_below_deduction_owes_nothing() {
        let assessment = compute_tax(10_000.0, FilingStatus::Single, 0.0);
        assert_approx(assessment.taxable_income, 0.0);
        assert_approx(assessment.total_tax, 0.0);
        assert!(assessment.bracket_breakdown.is_empty());
        assert_approx(assessment.marginal_rate, 0.10);
        assert_approx(compute_tax(0.0, FilingStatus::Single, 0.0).effective_rate, 0.0);
    }

    #[test]
    fn top_bracket_is_open_ended() {
        let (tax, slices) = progressive_tax(1_000_000.0, SINGLE_BRACKETS_2024);
        let top = slices.last().expect("top slice");
        assert_eq!(top.upper_bound, None);
        assert_approx(top.taxable_amount, 1_000_000.0 - 609_350.0);
        assert_approx(slices.iter().map(|s| s.tax).sum::<f64>(), tax);
        assert_approx(marginal_rate(1_000_000.0, SINGLE_BRACKETS_2024), 0.37);
    }

    #[test]
    fn long_term_gain_takes_the_preferential_rate() {
        let assessment = CapitalGainsTax.evaluate(&CapitalGainInput {
            purchase_price: 20_000.0,
            sale_price: 30_000.0,
            holding_months: 18,
            filing_status: FilingStatus::Single,
            ordinary_income: 40_000.0,
        });
        assert!(assessment.long_term);
        assert_approx(assessment.tax_rate, 0.15);
        assert_approx(assessment.capital_gains_tax, 1_500.0);
        assert_approx(assessment.niit, 0.0);
        assert_approx(assessment.net_proceeds, 28_500.0);

        let zero_rate = CapitalGainsTax.evaluate(&CapitalGainInput {
            purchase_price: 20_000.0,
            sale_price: 25_000.0,
            holding_months: 12,
            filing_status: FilingStatus::Single,
            ordinary_income: 30_000.0,
        });
        assert_approx(zero_rate.tax_rate, 0.0);
        assert_approx(zero_rate.total_tax, 0.0);
    }

    #[test]
    fn net_investment_income_tax_applies_above_threshold() {
        let assessment = CapitalGainsTax.evaluate(&CapitalGainInput {
            purchase_price: 0.0,
            sale_price: 100_000.0,
            holding_months: 24,
            filing_status: FilingStatus::Single,
            ordinary_income: 300_000.0,
        });
        assert_approx(assessment.capital_gains_tax, 15_000.0);
        assert_approx(assessment.niit, 3_800.0);
        assert_approx(assessment.total_tax, 18_800.0);
    }

    #[test]
    fn short_term_gain_is_stacked_on_ordinary_income() {
        let assessment = CapitalGainsTax.evaluate(&CapitalGainInput {
            purchase_price: 5_000.0,
            sale_price: 15_000.0,
            holding_months: 6,
            filing_status: FilingStatus::Single,
            ordinary_income: 50_000.0,
        });
        assert!(!assessment.long_term);
        assert_approx(assessment.capital_gains_tax, 2_200.0);
        assert_approx(assessment.tax_rate, 0.22);
    }

    #[test]
    fn short_term_gain_also_owes_net_investment_income_tax() {
        let assessment = CapitalGainsTax.evaluate(&CapitalGainInput {
            purchase_price: 10_000.0,
            sale_price: 30_000.0,
            holding_months: 3,
            filing_status: FilingStatus::Single,
            ordinary_income: 190_000.0,
        });
        assert!(!assessment.long_term);
        // 1,950 at 24% and 18,050 at 32%.
        assert_approx(assessment.capital_gains_tax, 468.0 + 5_776.0);
        // Only the 10,000 above the 200,000 threshold is subject to NIIT.
        assert_approx(assessment.niit, 380.0);
        assert_approx(assessment.total_tax, 6_624.0);
    }

    #[test]
    fn losses_are_untaxed() {
        let assessment = CapitalGainsTax.evaluate(&CapitalGainInput {
            purchase_price: 10_000.0,
            sale_price: 8_000.0,
            holding_months: 30,
            filing_status: FilingStatus::MarriedJoint,
            ordinary_income: 500_000.0,
        });
        assert_approx(assessment.gain, -2_000.0);
        assert_approx(assessment.total_tax, 0.0);
        assert_approx(assessment.net_proceeds, 8_000.0);
    }

    #[test]
    fn self_employment_tax_components() {
        let se = SelfEmploymentTax::default();
        let modest = se.evaluate(&SelfEmploymentInput {
            net_earnings: 50_000.0,
            other_wages: 0.0,
        });
        assert_approx(modest.taxable_earnings, 46_175.0);
        assert_approx(modest.social_security_tax, 5_725.7);
        assert_approx(modest.medicare_tax, 1_339.075);
        assert_approx(modest.total_tax, 7_064.775);
        assert_approx(modest.deductible_portion, 3_532.3875);
        assert_approx(modest.quarterly_payment, 1_766.19375);

        let with_wages = se.evaluate(&SelfEmploymentInput {
            net_earnings: 50_000.0,
            other_wages: 160_000.0,
        });
        assert_approx(with_wages.social_security_tax, 8_600.0 * 0.124);

        let high = se.evaluate(&SelfEmploymentInput {
            net_earnings: 300_000.0,
            other_wages: 0.0,
        });
        assert_approx(high.social_security_tax, 168_600.0 * 0.124);
        assert_approx(high.additional_medicare_tax, 77_050.0 * 0.009);
    }

    #[test]
    fn refund_applies_nonrefundable_credits() {
        let base = RefundInput {
            income: 60_000.0,
            filing_status: FilingStatus::Single,
            withholding: 6_000.0,
            deduction: 0.0,
            credits: 0.0,
        };
        let estimate = estimate_refund(&base);
        assert_approx(estimate.tax_before_credits, 5_216.0);
        assert_approx(estimate.refund, 784.0);
        assert!(estimate.is_refund);

        let credited = estimate_refund(&RefundInput {
            credits: 8_000.0,
            ..base
        });
        assert_approx(credited.credits_applied, 5_216.0);
        assert_approx(credited.tax_after_credits, 0.0);
        assert_approx(credited.refund, 6_000.0);

        let owed = estimate_refund(&RefundInput {
            withholding: 1_000.0,
            ..base
        });
        assert_approx(owed.refund, -4_216.0);
        assert!(!owed.is_refund);
    }

    #[test]
    fn assessment_serializes_rates_as_percent() {
        let json = serde_json::to_value(compute_tax(100_000.0, FilingStatus::Single, 0.0))
            .expect("assessment should serialize");
        assert_eq!(json["marginalRate"], 22.0);
        assert_eq!(json["filingStatus"], "single");
        assert_eq!(json["bracketBreakdown"][0]["rate"], 10.0);
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(128))]

        #[test]
        fn prop_tax_is_continuous_and_monotonic(
            table in 0usize..3,
            income in 0u32..1_000_000,
            step in 1u32..100
        ) {
            let brackets = [
                SINGLE_BRACKETS_2024,
                MARRIED_JOINT_BRACKETS_2024,
                HEAD_OF_HOUSEHOLD_BRACKETS_2024,
            ][table];
            let low = income as f64;
            let high = low + step as f64 / 100.0;
            let (tax_low, _) = progressive_tax(low, brackets);
            let (tax_high, _) = progressive_tax(high, brackets);
            let delta = tax_high - tax_low;
            prop_assert!(delta >= -1e-9);
            prop_assert!(delta <= (high - low) * 0.37 + 1e-6);
        }

        #[test]
        fn prop_boundary_tax_equals_full_slices_below(table in 0usize..3) {
            let brackets = [
                SINGLE_BRACKETS_2024,
                MARRIED_JOINT_BRACKETS_2024,
                HEAD_OF_HOUSEHOLD_BRACKETS_2024,
            ][table];
            let mut lower = 0.0;
            let mut cumulative = 0.0;
            for bracket in brackets.iter().filter(|b| b.upper_bound.is_finite()) {
                cumulative += (bracket.upper_bound - lower) * bracket.rate;
                let (at_bound, _) = progressive_tax(bracket.upper_bound, brackets);
                prop_assert!((at_bound - cumulative).abs() < 1e-6);
                lower = bracket.upper_bound;
            }
        }
    }
}
