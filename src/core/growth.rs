use serde::Serialize;
use tracing::debug;

use super::rounding::{money, opt_money, opt_percent, percent};
use super::types::{GrowthPoint, GrowthProjection, GrowthScenario};

const ZERO_RATE: f64 = 1e-12;
const MAX_LONGEVITY_YEARS: u32 = 100;
const MAX_DRAWDOWN_YEARS: u32 = 50;

const EMPLOYEE_DEFERRAL_LIMIT_2024: f64 = 23_000.0;
const EMPLOYEE_DEFERRAL_LIMIT_CATCH_UP_2024: f64 = 30_500.0;
const IRA_LIMIT_2024: f64 = 7_000.0;
const IRA_CATCH_UP_2024: f64 = 1_000.0;
const CATCH_UP_AGE: u32 = 50;

pub trait GrowthProjector {
    fn project(&self, scenario: &GrowthScenario) -> GrowthProjection;
}

/// Closed-form future value, no taxes.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompoundProjector;

impl GrowthProjector for CompoundProjector {
    fn project(&self, scenario: &GrowthScenario) -> GrowthProjection {
        let final_balance = closed_form_balance(scenario, scenario.periods);
        let total_contributions = scenario.total_contributions();
        let yearly_series = year_boundaries(scenario)
            .map(|(year, periods)| {
                let balance = closed_form_balance(scenario, periods);
                let contributions =
                    scenario.initial_principal + scenario.periodic_contribution * periods as f64;
                GrowthPoint {
                    year,
                    balance,
                    contributions,
                    growth: balance - contributions,
                }
            })
            .collect();

        GrowthProjection {
            final_balance,
            total_contributions,
            total_growth: final_balance - total_contributions,
            tax_paid: 0.0,
            after_tax_value: final_balance,
            yearly_series,
        }
    }
}

/// Pre-tax contributions, untaxed growth, the whole balance taxed on withdrawal.
#[derive(Debug, Clone, Copy)]
pub struct TraditionalAccount {
    pub withdrawal_tax_rate: f64,
}

impl GrowthProjector for TraditionalAccount {
    fn project(&self, scenario: &GrowthScenario) -> GrowthProjection {
        let mut projection = CompoundProjector.project(scenario);
        projection.tax_paid = projection.final_balance * self.withdrawal_tax_rate;
        projection.after_tax_value = projection.final_balance - projection.tax_paid;
        projection
    }
}

/// After-tax contributions, tax-free growth and withdrawals.
///
/// Each contribution is invested as `contribution * (1 - contribution_tax_rate)`,
/// an approximate after-tax equivalent rather than a take-home-pay model. The
/// initial principal is treated as money already inside the account.
#[derive(Debug, Clone, Copy)]
pub struct RothAccount {
    pub contribution_tax_rate: f64,
}

impl GrowthProjector for RothAccount {
    fn project(&self, scenario: &GrowthScenario) -> GrowthProjection {
        let after_tax = GrowthScenario {
            periodic_contribution: scenario.periodic_contribution
                * (1.0 - self.contribution_tax_rate),
            ..*scenario
        };
        let mut projection = CompoundProjector.project(&after_tax);
        projection.tax_paid = scenario.periodic_contribution
            * self.contribution_tax_rate
            * scenario.periods as f64;
        projection
    }
}

/// Ordinary brokerage account: each period's return is taxed as it accrues.
#[derive(Debug, Clone, Copy)]
pub struct TaxableAccount {
    pub tax_rate: f64,
}

impl GrowthProjector for TaxableAccount {
    fn project(&self, scenario: &GrowthScenario) -> GrowthProjection {
        let rate = scenario.rate_per_period();
        let ppy = scenario.periods_per_year.max(1);
        let mut balance = scenario.initial_principal;
        let mut contributions = scenario.initial_principal;
        let mut tax_paid = 0.0;
        let mut yearly_series = vec![GrowthPoint {
            year: 0,
            balance,
            contributions,
            growth: 0.0,
        }];

        for period in 1..=scenario.periods {
            let period_return = balance * rate;
            let tax = period_return.max(0.0) * self.tax_rate;
            balance += period_return - tax + scenario.periodic_contribution;
            contributions += scenario.periodic_contribution;
            tax_paid += tax;

            if period % ppy == 0 || period == scenario.periods {
                yearly_series.push(GrowthPoint {
                    year: period.div_ceil(ppy),
                    balance,
                    contributions,
                    growth: balance - contributions,
                });
            }
        }

        GrowthProjection {
            final_balance: balance,
            total_contributions: contributions,
            total_growth: balance - contributions,
            tax_paid,
            after_tax_value: balance,
            yearly_series,
        }
    }
}

pub fn project(
    principal: f64,
    periodic_contribution: f64,
    annual_rate: f64,
    periods: u32,
    periods_per_year: u32,
) -> GrowthProjection {
    let scenario = GrowthScenario::new(principal, periodic_contribution, annual_rate, periods)
        .with_periods_per_year(periods_per_year);
    debug!(principal, periodic_contribution, annual_rate, periods, "projecting growth");
    CompoundProjector.project(&scenario)
}

/// Compound interest with a monthly contribution regardless of how often
/// interest compounds.
pub fn compound_interest(
    principal: f64,
    monthly_contribution: f64,
    annual_rate: f64,
    years: u32,
    compounding_per_year: u32,
) -> GrowthProjection {
    let ppy = compounding_per_year.max(1);
    let per_period = monthly_contribution * 12.0 / ppy as f64;
    project(principal, per_period, annual_rate, years * ppy, ppy)
}

fn closed_form_balance(scenario: &GrowthScenario, periods: u32) -> f64 {
    let rate = scenario.rate_per_period();
    let n = periods as f64;
    let growth = (1.0 + rate).powf(n);
    let contributions = if rate.abs() <= ZERO_RATE {
        scenario.periodic_contribution * n
    } else {
        scenario.periodic_contribution * (growth - 1.0) / rate
    };
    scenario.initial_principal * growth + contributions
}

/// `(year, elapsed periods)` at each year end, year 0 first, plus a trailing
/// partial year.
fn year_boundaries(scenario: &GrowthScenario) -> impl Iterator<Item = (u32, u32)> {
    let ppy = scenario.periods_per_year.max(1);
    let full_years = scenario.periods / ppy;
    let partial = scenario.periods % ppy != 0;
    let periods = scenario.periods;
    (0..=full_years)
        .map(move |year| (year, year * ppy))
        .chain(partial.then_some((full_years + 1, periods)))
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AccountTreatment {
    Traditional,
    Roth,
    Taxable,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreatmentRates {
    pub current_tax_rate: f64,
    pub retirement_tax_rate: f64,
    pub investment_tax_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxTreatmentComparison {
    pub traditional: GrowthProjection,
    pub roth: GrowthProjection,
    pub taxable: GrowthProjection,
    pub best: AccountTreatment,
    /// Traditional after-tax value minus the taxable account's.
    #[serde(serialize_with = "money")]
    pub deferral_advantage: f64,
}

pub fn compare_tax_treatments(
    scenario: &GrowthScenario,
    rates: TreatmentRates,
) -> TaxTreatmentComparison {
    let traditional = TraditionalAccount {
        withdrawal_tax_rate: rates.retirement_tax_rate,
    }
    .project(scenario);
    let roth = RothAccount {
        contribution_tax_rate: rates.current_tax_rate,
    }
    .project(scenario);
    let taxable = TaxableAccount {
        tax_rate: rates.investment_tax_rate,
    }
    .project(scenario);

    let mut best = AccountTreatment::Traditional;
    let mut best_value = traditional.after_tax_value;
    if roth.after_tax_value > best_value {
        best = AccountTreatment::Roth;
        best_value = roth.after_tax_value;
    }
    if taxable.after_tax_value > best_value {
        best = AccountTreatment::Taxable;
    }

    TaxTreatmentComparison {
        deferral_advantage: traditional.after_tax_value - taxable.after_tax_value,
        traditional,
        roth,
        taxable,
        best,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmployerMatchPlan {
    pub current_balance: f64,
    pub annual_salary: f64,
    pub contribution_rate: f64,
    pub match_rate: f64,
    /// Share of salary eligible for matching.
    pub match_limit_rate: f64,
    pub annual_return: f64,
    pub years: u32,
    pub salary_growth: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchYear {
    pub year: u32,
    #[serde(serialize_with = "money")]
    pub salary: f64,
    #[serde(serialize_with = "money")]
    pub employee_contribution: f64,
    #[serde(serialize_with = "money")]
    pub employer_contribution: f64,
    #[serde(serialize_with = "money")]
    pub balance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployerMatchProjection {
    #[serde(serialize_with = "money")]
    pub final_balance: f64,
    #[serde(serialize_with = "money")]
    pub total_employee_contributions: f64,
    #[serde(serialize_with = "money")]
    pub total_employer_contributions: f64,
    #[serde(serialize_with = "money")]
    pub total_contributions: f64,
    #[serde(serialize_with = "money")]
    pub investment_growth: f64,
    pub yearly: Vec<MatchYear>,
}

pub fn employer_match(salary: f64, contribution_rate: f64, match_rate: f64, match_limit_rate: f64) -> f64 {
    let employee = salary * contribution_rate;
    (employee * match_rate).min(salary * match_limit_rate * match_rate)
}

pub fn project_employer_match(plan: &EmployerMatchPlan) -> EmployerMatchProjection {
    let monthly_return = plan.annual_return / 12.0;
    let mut balance = plan.current_balance;
    let mut salary = plan.annual_salary;
    let mut total_employee = 0.0;
    let mut total_employer = 0.0;
    let mut yearly = Vec::with_capacity(plan.years as usize);

    for year in 1..=plan.years {
        let employee = salary * plan.contribution_rate;
        let employer = employer_match(
            salary,
            plan.contribution_rate,
            plan.match_rate,
            plan.match_limit_rate,
        );
        total_employee += employee;
        total_employer += employer;

        let monthly_deposit = (employee + employer) / 12.0;
        for _ in 0..12 {
            balance = balance * (1.0 + monthly_return) + monthly_deposit;
        }

        yearly.push(MatchYear {
            year,
            salary,
            employee_contribution: employee,
            employer_contribution: employer,
            balance,
        });
        salary *= 1.0 + plan.salary_growth;
    }

    let total_contributions = total_employee + total_employer;
    debug!(years = plan.years, final_balance = balance, "employer match projected");
    EmployerMatchProjection {
        final_balance: balance,
        total_employee_contributions: total_employee,
        total_employer_contributions: total_employer,
        total_contributions,
        investment_growth: balance - total_contributions - plan.current_balance,
        yearly,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionLimitCheck {
    #[serde(serialize_with = "money")]
    pub current_contribution: f64,
    #[serde(serialize_with = "money")]
    pub employee_limit: f64,
    #[serde(serialize_with = "money")]
    pub remaining_room: f64,
    pub can_increase: bool,
    #[serde(serialize_with = "opt_percent")]
    pub max_contribution_rate: Option<f64>,
    pub catch_up_eligible: bool,
}

/// 2024 401(k) employee deferral limits.
pub fn contribution_limit_check(
    annual_salary: f64,
    contribution_rate: f64,
    age: u32,
) -> ContributionLimitCheck {
    let catch_up_eligible = age >= CATCH_UP_AGE;
    let employee_limit = if catch_up_eligible {
        EMPLOYEE_DEFERRAL_LIMIT_CATCH_UP_2024
    } else {
        EMPLOYEE_DEFERRAL_LIMIT_2024
    };
    let current_contribution = annual_salary * contribution_rate;
    ContributionLimitCheck {
        current_contribution,
        employee_limit,
        remaining_room: (employee_limit - current_contribution).max(0.0),
        can_increase: current_contribution < employee_limit,
        max_contribution_rate: (annual_salary > 0.0)
            .then(|| (employee_limit / annual_salary).min(1.0)),
        catch_up_eligible,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IraComparisonInput {
    pub current_tax_rate: f64,
    pub retirement_tax_rate: f64,
    pub annual_contribution: f64,
    pub years: u32,
    pub annual_return: f64,
    pub current_age: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IraComparison {
    #[serde(serialize_with = "money")]
    pub contribution_limit: f64,
    #[serde(serialize_with = "money")]
    pub annual_contribution: f64,
    #[serde(serialize_with = "money")]
    pub annual_tax_deduction: f64,
    pub traditional: GrowthProjection,
    pub roth: GrowthProjection,
    pub recommended: AccountTreatment,
    #[serde(serialize_with = "money")]
    pub difference: f64,
    #[serde(serialize_with = "opt_percent")]
    pub advantage: Option<f64>,
}

pub fn compare_ira(input: &IraComparisonInput) -> IraComparison {
    let contribution_limit = if input.current_age >= CATCH_UP_AGE {
        IRA_LIMIT_2024 + IRA_CATCH_UP_2024
    } else {
        IRA_LIMIT_2024
    };
    let annual_contribution = input.annual_contribution.clamp(0.0, contribution_limit);
    let scenario = GrowthScenario::new(
        0.0,
        annual_contribution / 12.0,
        input.annual_return,
        input.years * 12,
    );

    let traditional = TraditionalAccount {
        withdrawal_tax_rate: input.retirement_tax_rate,
    }
    .project(&scenario);
    let roth = RothAccount {
        contribution_tax_rate: input.current_tax_rate,
    }
    .project(&scenario);

    let difference = roth.after_tax_value - traditional.after_tax_value;
    let larger = traditional.after_tax_value.max(roth.after_tax_value);
    IraComparison {
        contribution_limit,
        annual_contribution,
        annual_tax_deduction: annual_contribution * input.current_tax_rate,
        recommended: if difference > 0.0 {
            AccountTreatment::Roth
        } else {
            AccountTreatment::Traditional
        },
        difference: difference.abs(),
        advantage: (larger > 0.0).then(|| difference.abs() / larger),
        traditional,
        roth,
    }
}

pub fn rule_of_72(annual_rate: f64) -> Option<f64> {
    (annual_rate > 0.0).then(|| 72.0 / (annual_rate * 100.0))
}

/// Compound annual growth rate; `None` when undefined.
pub fn cagr(initial_value: f64, final_value: f64, years: f64) -> Option<f64> {
    if initial_value <= 0.0 || final_value < 0.0 || years <= 0.0 {
        return None;
    }
    Some((final_value / initial_value).powf(1.0 / years) - 1.0)
}

/// Price change plus dividends, in currency units.
pub fn total_return(initial_value: f64, final_value: f64, dividends: f64) -> f64 {
    final_value - initial_value + dividends
}

pub fn annualized_return(total_return: f64, years: f64) -> Option<f64> {
    if years <= 0.0 || total_return <= -1.0 {
        return None;
    }
    Some((1.0 + total_return).powf(1.0 / years) - 1.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentReturn {
    #[serde(serialize_with = "money")]
    pub total_return: f64,
    #[serde(serialize_with = "opt_percent")]
    pub total_return_rate: Option<f64>,
    #[serde(serialize_with = "opt_percent")]
    pub cagr: Option<f64>,
    #[serde(serialize_with = "opt_money")]
    pub doubling_years: Option<f64>,
}

pub fn investment_return(
    initial_value: f64,
    final_value: f64,
    dividends: f64,
    years: f64,
) -> InvestmentReturn {
    let total_return = total_return(initial_value, final_value, dividends);
    let cagr = cagr(initial_value, final_value + dividends, years);
    InvestmentReturn {
        total_return,
        total_return_rate: (initial_value > 0.0).then(|| total_return / initial_value),
        cagr,
        doubling_years: cagr.and_then(rule_of_72),
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetirementGoal {
    pub current_age: u32,
    pub retirement_age: u32,
    pub current_savings: f64,
    pub monthly_contribution: f64,
    pub annual_return: f64,
    pub desired_annual_income: f64,
    /// Sustainable withdrawal rate, 0.04 for the 4% rule.
    pub withdrawal_rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgeBalance {
    pub age: u32,
    #[serde(serialize_with = "money")]
    pub balance: f64,
    #[serde(serialize_with = "money")]
    pub contributions: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RetirementGap {
    pub years_to_retirement: u32,
    #[serde(serialize_with = "money")]
    pub projected_savings: f64,
    #[serde(serialize_with = "money")]
    pub required_savings: f64,
    #[serde(serialize_with = "money")]
    pub savings_gap: f64,
    /// Additional monthly saving that closes the gap; `None` when no months remain.
    #[serde(serialize_with = "opt_money")]
    pub required_monthly_contribution: Option<f64>,
    pub on_track: bool,
    #[serde(serialize_with = "money")]
    pub safe_withdrawal: f64,
    #[serde(serialize_with = "percent")]
    pub withdrawal_rate: f64,
    pub yearly: Vec<AgeBalance>,
}

pub fn retirement_gap(goal: &RetirementGoal) -> RetirementGap {
    let years = goal.retirement_age.saturating_sub(goal.current_age);
    let months = years * 12;
    let scenario = GrowthScenario::new(
        goal.current_savings,
        goal.monthly_contribution,
        goal.annual_return,
        months,
    );
    let projection = CompoundProjector.project(&scenario);
    let projected_savings = projection.final_balance;
    let required_savings = goal.desired_annual_income / goal.withdrawal_rate;
    let savings_gap = (required_savings - projected_savings).max(0.0);

    let monthly_rate = goal.annual_return / 12.0;
    let required_monthly_contribution = if savings_gap <= 0.0 {
        Some(0.0)
    } else if months == 0 {
        None
    } else if monthly_rate.abs() <= ZERO_RATE {
        Some(savings_gap / months as f64)
    } else {
        Some(savings_gap * monthly_rate / ((1.0 + monthly_rate).powf(months as f64) - 1.0))
    };

    let yearly = projection
        .yearly_series
        .iter()
        .map(|point| AgeBalance {
            age: goal.current_age + point.year,
            balance: point.balance,
            contributions: point.contributions,
        })
        .collect();

    RetirementGap {
        years_to_retirement: years,
        projected_savings,
        required_savings,
        savings_gap,
        required_monthly_contribution,
        on_track: projected_savings >= required_savings,
        safe_withdrawal: projected_savings * goal.withdrawal_rate,
        withdrawal_rate: goal.withdrawal_rate,
        yearly,
    }
}

/// Years until withdrawals exhaust the balance, capped at 100; `None` when
/// returns cover the withdrawal indefinitely.
pub fn savings_longevity(balance: f64, annual_withdrawal: f64, annual_return: f64) -> Option<u32> {
    if balance <= 0.0 {
        return Some(0);
    }
    if annual_withdrawal <= balance * annual_return {
        return None;
    }
    let mut remaining = balance;
    let mut years = 0;
    while remaining > 0.0 && years < MAX_LONGEVITY_YEARS {
        remaining = remaining * (1.0 + annual_return) - annual_withdrawal;
        years += 1;
    }
    Some(years)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeSources {
    #[serde(serialize_with = "money")]
    pub savings_withdrawal: f64,
    #[serde(serialize_with = "money")]
    pub social_security: f64,
    #[serde(serialize_with = "money")]
    pub pension: f64,
    #[serde(serialize_with = "money")]
    pub other: f64,
    #[serde(serialize_with = "money")]
    pub total: f64,
}

impl IncomeSources {
    fn scaled(&self, factor: f64) -> Self {
        Self {
            savings_withdrawal: self.savings_withdrawal * factor,
            social_security: self.social_security * factor,
            pension: self.pension * factor,
            other: self.other * factor,
            total: self.total * factor,
        }
    }
}

/// Share of total income from each source, as fractions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeShares {
    #[serde(serialize_with = "percent")]
    pub savings: f64,
    #[serde(serialize_with = "percent")]
    pub social_security: f64,
    #[serde(serialize_with = "percent")]
    pub pension: f64,
    #[serde(serialize_with = "percent")]
    pub other: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RetirementIncome {
    #[serde(serialize_with = "money")]
    pub retirement_savings: f64,
    #[serde(serialize_with = "percent")]
    pub withdrawal_rate: f64,
    pub monthly: IncomeSources,
    pub annual: IncomeSources,
    pub shares: IncomeShares,
}

/// Monthly income from a savings withdrawal plus guaranteed sources.
pub fn retirement_income(
    savings: f64,
    monthly_social_security: f64,
    monthly_pension: f64,
    monthly_other: f64,
    withdrawal_rate: f64,
) -> RetirementIncome {
    let savings_withdrawal = savings * withdrawal_rate / 12.0;
    let total = savings_withdrawal + monthly_social_security + monthly_pension + monthly_other;
    let monthly = IncomeSources {
        savings_withdrawal,
        social_security: monthly_social_security,
        pension: monthly_pension,
        other: monthly_other,
        total,
    };
    let share = |amount: f64| if total > 0.0 { amount / total } else { 0.0 };
    RetirementIncome {
        retirement_savings: savings,
        withdrawal_rate,
        annual: monthly.scaled(12.0),
        shares: IncomeShares {
            savings: share(savings_withdrawal),
            social_security: share(monthly_social_security),
            pension: share(monthly_pension),
            other: share(monthly_other),
        },
        monthly,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequiredSavings {
    #[serde(serialize_with = "money")]
    pub target_monthly_income: f64,
    #[serde(serialize_with = "money")]
    pub guaranteed_income: f64,
    #[serde(serialize_with = "money")]
    pub income_gap: f64,
    #[serde(serialize_with = "money")]
    pub required_savings: f64,
    #[serde(serialize_with = "percent")]
    pub withdrawal_rate: f64,
}

/// Savings whose withdrawal covers the monthly income Social Security and
/// pensions leave uncovered. `withdrawal_rate` must be positive.
pub fn required_savings(
    target_monthly_income: f64,
    monthly_social_security: f64,
    monthly_pension: f64,
    withdrawal_rate: f64,
) -> RequiredSavings {
    let guaranteed_income = monthly_social_security + monthly_pension;
    let income_gap = (target_monthly_income - guaranteed_income).max(0.0);
    RequiredSavings {
        target_monthly_income,
        guaranteed_income,
        income_gap,
        required_savings: income_gap * 12.0 / withdrawal_rate,
        withdrawal_rate,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawdownYear {
    pub year: u32,
    #[serde(serialize_with = "money")]
    pub starting_balance: f64,
    #[serde(serialize_with = "money")]
    pub withdrawals: f64,
    #[serde(serialize_with = "money")]
    pub investment_return: f64,
    #[serde(serialize_with = "money")]
    pub ending_balance: f64,
    #[serde(serialize_with = "money")]
    pub monthly_income: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RetirementDrawdown {
    pub years: Vec<DrawdownYear>,
    /// Years until the balance runs out; `None` if it lasts the full horizon.
    pub depleted_after_years: Option<u32>,
}

/// Yearly withdrawals that rise with inflation, over at most 50 years.
pub fn project_drawdown(
    starting_balance: f64,
    monthly_income: f64,
    annual_return: f64,
    inflation: f64,
) -> RetirementDrawdown {
    let mut years = Vec::new();
    let mut balance = starting_balance;
    let mut income = monthly_income;
    let mut depleted_after_years = None;

    while balance > 0.0 && (years.len() as u32) < MAX_DRAWDOWN_YEARS {
        let withdrawals = income * 12.0;
        let investment_return = balance * annual_return;
        let ending = balance + investment_return - withdrawals;
        years.push(DrawdownYear {
            year: years.len() as u32,
            starting_balance: balance,
            withdrawals,
            investment_return,
            ending_balance: ending.max(0.0),
            monthly_income: income,
        });
        if ending <= 0.0 {
            depleted_after_years = Some(years.len() as u32);
        }
        balance = ending;
        income *= 1.0 + inflation;
    }
    if starting_balance <= 0.0 {
        depleted_after_years = Some(0);
    }

    debug!(
        starting_balance,
        monthly_income,
        years = years.len(),
        "retirement drawdown projected"
    );
    RetirementDrawdown {
        years,
        depleted_after_years,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StockPosition {
    pub purchase_price: f64,
    pub shares: f64,
    pub current_price: f64,
    pub dividends: f64,
    pub dividends_reinvested: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockReturn {
    /// Shares held, including any bought with reinvested dividends.
    pub shares: f64,
    #[serde(serialize_with = "money")]
    pub initial_investment: f64,
    #[serde(serialize_with = "money")]
    pub current_value: f64,
    #[serde(serialize_with = "money")]
    pub capital_gain: f64,
    /// Cash dividends, or the current value of the shares they bought.
    #[serde(serialize_with = "money")]
    pub dividend_value: f64,
    #[serde(serialize_with = "money")]
    pub total_return: f64,
    #[serde(serialize_with = "opt_percent")]
    pub total_return_rate: Option<f64>,
    pub dividends_reinvested: bool,
}

/// Reinvested dividends are assumed to buy at the midpoint of the purchase
/// and current prices.
pub fn stock_return(position: &StockPosition) -> StockReturn {
    let initial_investment = position.purchase_price * position.shares;
    let capital_gain = (position.current_price - position.purchase_price) * position.shares;
    let average_price = (position.purchase_price + position.current_price) / 2.0;

    let (shares, dividend_value) =
        if position.dividends_reinvested && position.dividends > 0.0 && average_price > 0.0 {
            let added = position.dividends / average_price;
            (position.shares + added, added * position.current_price)
        } else {
            (position.shares, position.dividends)
        };
    let total_return = capital_gain + dividend_value;

    StockReturn {
        shares,
        initial_investment,
        current_value: shares * position.current_price,
        capital_gain,
        dividend_value,
        total_return,
        total_return_rate: (initial_investment > 0.0).then(|| total_return / initial_investment),
        dividends_reinvested: position.dividends_reinvested,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lot {
    pub price: f64,
    pub shares: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CostBasis {
    pub total_shares: f64,
    #[serde(serialize_with = "money")]
    pub total_cost: f64,
    #[serde(serialize_with = "money")]
    pub average_cost_per_share: f64,
}

pub fn cost_basis(lots: &[Lot]) -> CostBasis {
    let total_shares: f64 = lots.iter().map(|lot| lot.shares).sum();
    let total_cost: f64 = lots.iter().map(|lot| lot.price * lot.shares).sum();
    CostBasis {
        total_shares,
        total_cost,
        average_cost_per_share: if total_shares > 0.0 {
            total_cost / total_shares
        } else {
            0.0
        },
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NamedInvestment {
    pub name: String,
    pub initial_value: f64,
    pub final_value: f64,
    pub dividends: f64,
    pub years: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentSummary {
    pub name: String,
    #[serde(flatten)]
    pub returns: InvestmentReturn,
    /// Total return rate spread evenly over the holding period.
    #[serde(serialize_with = "opt_percent")]
    pub annualized_return: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentComparison {
    pub investments: Vec<InvestmentSummary>,
    /// Name of the investment with the highest CAGR.
    pub best: Option<String>,
}

pub fn compare_investments(investments: &[NamedInvestment]) -> InvestmentComparison {
    let investments: Vec<InvestmentSummary> = investments
        .iter()
        .map(|inv| {
            let returns =
                investment_return(inv.initial_value, inv.final_value, inv.dividends, inv.years);
            InvestmentSummary {
                name: inv.name.clone(),
                annualized_return: returns
                    .total_return_rate
                    .and_then(|rate| annualized_return(rate, inv.years)),
                returns,
            }
        })
        .collect();
    let best = investments
        .iter()
        .filter_map(|summary| summary.returns.cagr.map(|cagr| (cagr, summary)))
        .max_by(|(a, _), (b, _)| a.total_cmp(b))
        .map(|(_, summary)| summary.name.clone());
    InvestmentComparison { investments, best }
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

    fn assert_approx_tol(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() <= tol,
            "expected {expected}, got {actual}, tolerance {tol}"
        );
    }

    #[test]
    fn zero_rate_contributions_are_linear() {
        let projection = project(1_000.0, 100.0, 0.0, 12, 12);
        assert_approx(projection.final_balance, 2_200.0);
        assert_approx(projection.total_growth, 0.0);
    }

    #[test]
    fn closed_form_matches_known_future_value() {
        // 10,000 at 5% compounded annually for 10 years.
        let projection = project(10_000.0, 0.0, 0.05, 10, 1);
        assert_approx_tol(projection.final_balance, 16_288.946_267, 1e-5);
        // 100/month at 6% for 30 years.
        let annuity = project(0.0, 100.0, 0.06, 360, 12);
        assert_approx_tol(annuity.final_balance, 100_451.50, 0.01);
        assert_approx(annuity.total_contributions, 36_000.0);
    }

    #[test]
    fn cagr_recovers_projection_rate() {
        let projection = project(1_000.0, 0.0, 0.07, 10, 1);
        let rate = cagr(1_000.0, projection.final_balance, 10.0).expect("defined");
        assert_approx_tol(rate, 0.07, 1e-12);
    }

    #[test]
    fn yearly_series_includes_start_and_partial_year() {
        let projection = project(500.0, 10.0, 0.04, 30, 12);
        let years: Vec<u32> = projection.yearly_series.iter().map(|p| p.year).collect();
        assert_eq!(years, [0, 1, 2, 3]);
        assert_approx(projection.yearly_series[0].balance, 500.0);
        let last = projection.yearly_series.last().expect("series not empty");
        assert_approx(last.balance, projection.final_balance);
    }

    #[test]
    fn compound_interest_converts_monthly_contribution() {
        let quarterly = compound_interest(0.0, 100.0, 0.0, 2, 4);
        assert_approx(quarterly.final_balance, 2_400.0);
        assert_eq!(quarterly.yearly_series.len(), 3);
    }

    #[test]
    fn traditional_taxes_the_whole_balance() {
        let scenario = GrowthScenario::new(1_000.0, 100.0, 0.06, 120);
        let pre_tax = CompoundProjector.project(&scenario);
        let traditional = TraditionalAccount {
            withdrawal_tax_rate: 0.25,
        }
        .project(&scenario);
        assert_approx(traditional.final_balance, pre_tax.final_balance);
        assert_approx(traditional.after_tax_value, pre_tax.final_balance * 0.75);
    }

    #[test]
    fn roth_and_traditional_match_at_equal_rates() {
        let scenario = GrowthScenario::new(0.0, 500.0, 0.07, 240);
        let comparison = compare_tax_treatments(
            &scenario,
            TreatmentRates {
                current_tax_rate: 0.22,
                retirement_tax_rate: 0.22,
                investment_tax_rate: 0.15,
            },
        );
        assert_approx_tol(
            comparison.roth.after_tax_value,
            comparison.traditional.after_tax_value,
            1e-6,
        );
        assert_approx(comparison.roth.tax_paid, 500.0 * 0.22 * 240.0);
        assert!(comparison.deferral_advantage < comparison.traditional.after_tax_value);
    }

    #[test]
    fn taxable_drag_is_applied_every_period() {
        let scenario = GrowthScenario::new(10_000.0, 0.0, 0.12, 12);
        let taxable = TaxableAccount { tax_rate: 0.25 }.project(&scenario);
        // Net 0.75% per month compounding.
        assert_approx_tol(taxable.final_balance, 10_000.0 * 1.0075f64.powi(12), 1e-6);
        assert_approx_tol(
            taxable.tax_paid,
            10_000.0 * (1.0075f64.powi(12) - 1.0) / 3.0,
            1e-6,
        );

        let untaxed = TaxableAccount { tax_rate: 0.0 }.project(&scenario);
        assert_approx_tol(
            untaxed.final_balance,
            CompoundProjector.project(&scenario).final_balance,
            1e-6,
        );
    }

    #[test]
    fn employer_match_respects_the_limit() {
        assert_approx(employer_match(100_000.0, 0.06, 0.5, 0.06), 3_000.0);
        assert_approx(employer_match(100_000.0, 0.06, 0.5, 0.04), 2_000.0);
        assert_approx(employer_match(100_000.0, 0.02, 1.0, 0.06), 2_000.0);
    }

    #[test]
    fn employer_match_projection_without_growth_sums_contributions() {
        let projection = project_employer_match(&EmployerMatchPlan {
            current_balance: 10_000.0,
            annual_salary: 80_000.0,
            contribution_rate: 0.10,
            match_rate: 0.5,
            match_limit_rate: 0.06,
            annual_return: 0.0,
            years: 3,
            salary_growth: 0.0,
        });
        assert_approx(projection.total_employee_contributions, 24_000.0);
        assert_approx(projection.total_employer_contributions, 7_200.0);
        assert_approx(projection.final_balance, 10_000.0 + 31_200.0);
        assert_approx(projection.investment_growth, 0.0);
        assert_eq!(projection.yearly.len(), 3);
    }

    #[test]
    fn employer_match_escalates_salary() {
        let projection = project_employer_match(&EmployerMatchPlan {
            current_balance: 0.0,
            annual_salary: 50_000.0,
            contribution_rate: 0.05,
            match_rate: 1.0,
            match_limit_rate: 0.03,
            annual_return: 0.07,
            years: 2,
            salary_growth: 0.10,
        });
        assert_approx(projection.yearly[1].salary, 55_000.0);
        assert_approx(projection.yearly[1].employer_contribution, 1_650.0);
        assert!(projection.investment_growth > 0.0);
    }

    #[test]
    fn contribution_limits_include_catch_up() {
        let young = contribution_limit_check(100_000.0, 0.10, 35);
        assert_approx(young.employee_limit, 23_000.0);
        assert_approx(young.remaining_room, 13_000.0);
        assert!(young.can_increase);
        assert!(!young.catch_up_eligible);

        let older = contribution_limit_check(200_000.0, 0.20, 52);
        assert_approx(older.employee_limit, 30_500.0);
        assert!(!older.can_increase);
        assert_approx(older.remaining_room, 0.0);
    }

    #[test]
    fn ira_comparison_caps_contribution_and_prefers_lower_tax_later() {
        let comparison = compare_ira(&IraComparisonInput {
            current_tax_rate: 0.12,
            retirement_tax_rate: 0.24,
            annual_contribution: 10_000.0,
            years: 25,
            annual_return: 0.07,
            current_age: 55,
        });
        assert_approx(comparison.contribution_limit, 8_000.0);
        assert_approx(comparison.annual_contribution, 8_000.0);
        assert_approx(comparison.annual_tax_deduction, 960.0);
        assert_eq!(comparison.recommended, AccountTreatment::Roth);
        assert!(comparison.difference > 0.0);

        let flipped = compare_ira(&IraComparisonInput {
            current_tax_rate: 0.32,
            retirement_tax_rate: 0.12,
            annual_contribution: 5_000.0,
            years: 25,
            annual_return: 0.07,
            current_age: 30,
        });
        assert_approx(flipped.contribution_limit, 7_000.0);
        assert_eq!(flipped.recommended, AccountTreatment::Traditional);
    }

    #[test]
    fn rule_of_72_and_investment_return() {
        assert_approx(rule_of_72(0.08).expect("positive rate"), 9.0);
        assert_eq!(rule_of_72(0.0), None);

        let summary = investment_return(10_000.0, 14_000.0, 1_000.0, 5.0);
        assert_approx(summary.total_return, 5_000.0);
        assert_approx(summary.total_return_rate.expect("defined"), 0.5);
        assert_approx_tol(summary.cagr.expect("defined"), 1.5f64.powf(0.2) - 1.0, 1e-12);
        assert_eq!(investment_return(0.0, 10.0, 0.0, 1.0).cagr, None);
        assert_approx_tol(annualized_return(0.21, 2.0).expect("defined"), 0.1, 1e-12);
    }

    #[test]
    fn retirement_gap_contribution_closes_the_gap() {
        let goal = RetirementGoal {
            current_age: 35,
            retirement_age: 65,
            current_savings: 50_000.0,
            monthly_contribution: 500.0,
            annual_return: 0.06,
            desired_annual_income: 80_000.0,
            withdrawal_rate: 0.04,
        };
        let gap = retirement_gap(&goal);
        assert_approx(gap.required_savings, 2_000_000.0);
        assert!(!gap.on_track);
        let extra = gap.required_monthly_contribution.expect("months remain");
        let topped_up = retirement_gap(&RetirementGoal {
            monthly_contribution: goal.monthly_contribution + extra,
            ..goal
        });
        assert_approx_tol(topped_up.projected_savings, 2_000_000.0, 1e-4);
        assert_eq!(gap.yearly.first().map(|p| p.age), Some(35));
        assert_eq!(gap.yearly.last().map(|p| p.age), Some(65));
    }

    #[test]
    fn retirement_gap_at_retirement_age_has_no_monthly_path() {
        let gap = retirement_gap(&RetirementGoal {
            current_age: 65,
            retirement_age: 65,
            current_savings: 100_000.0,
            monthly_contribution: 0.0,
            annual_return: 0.05,
            desired_annual_income: 40_000.0,
            withdrawal_rate: 0.04,
        });
        assert_eq!(gap.required_monthly_contribution, None);
        assert_approx(gap.savings_gap, 900_000.0);
    }

    #[test]
    fn savings_longevity_cases() {
        assert_eq!(savings_longevity(1_000_000.0, 40_000.0, 0.05), None);
        assert_eq!(savings_longevity(100_000.0, 25_000.0, 0.0), Some(4));
        assert_eq!(savings_longevity(0.0, 1.0, 0.05), Some(0));
        let capped = savings_longevity(1_000_000.0, 50_001.0, 0.05);
        assert_eq!(capped, Some(MAX_LONGEVITY_YEARS));
    }

    #[test]
    fn retirement_income_combines_sources() {
        let income = retirement_income(1_000_000.0, 2_000.0, 500.0, 0.0, 0.04);
        assert_approx(income.monthly.savings_withdrawal, 40_000.0 / 12.0);
        assert_approx(income.annual.total, 70_000.0);
        assert_approx(income.annual.social_security, 24_000.0);
        let shares = income.shares;
        assert_approx(shares.savings + shares.social_security + shares.pension + shares.other, 1.0);
        assert_approx(shares.other, 0.0);

        let nothing = retirement_income(0.0, 0.0, 0.0, 0.0, 0.04);
        assert_approx(nothing.shares.savings, 0.0);
    }

    #[test]
    fn required_savings_covers_the_income_gap() {
        let required = required_savings(6_000.0, 2_000.0, 500.0, 0.04);
        assert_approx(required.guaranteed_income, 2_500.0);
        assert_approx(required.income_gap, 3_500.0);
        assert_approx(required.required_savings, 1_050_000.0);

        let covered = required_savings(2_000.0, 2_500.0, 0.0, 0.04);
        assert_approx(covered.income_gap, 0.0);
        assert_approx(covered.required_savings, 0.0);
    }

    #[test]
    fn drawdown_runs_until_depleted() {
        let drawdown = project_drawdown(100_000.0, 1_000.0, 0.0, 0.0);
        assert_eq!(drawdown.years.len(), 9);
        assert_eq!(drawdown.depleted_after_years, Some(9));
        let last = drawdown.years.last().expect("at least one year");
        assert_approx(last.starting_balance, 4_000.0);
        assert_approx(last.ending_balance, 0.0);
        assert_eq!(drawdown.years[0].year, 0);
    }

    #[test]
    fn drawdown_indexes_income_and_stops_at_the_horizon() {
        let drawdown = project_drawdown(1_000_000.0, 1_000.0, 0.05, 0.03);
        assert_eq!(drawdown.years.len(), MAX_DRAWDOWN_YEARS as usize);
        assert_eq!(drawdown.depleted_after_years, None);
        assert_approx(drawdown.years[1].monthly_income, 1_030.0);
        assert_approx(drawdown.years[0].investment_return, 50_000.0);
        assert_approx(drawdown.years[1].starting_balance, 1_038_000.0);

        assert_eq!(project_drawdown(0.0, 1_000.0, 0.05, 0.03).depleted_after_years, Some(0));
    }

    #[test]
    fn stock_return_with_and_without_reinvestment() {
        let position = StockPosition {
            purchase_price: 50.0,
            shares: 100.0,
            current_price: 75.0,
            dividends: 250.0,
            dividends_reinvested: false,
        };
        let cash = stock_return(&position);
        assert_approx(cash.initial_investment, 5_000.0);
        assert_approx(cash.capital_gain, 2_500.0);
        assert_approx(cash.total_return, 2_750.0);
        assert_approx(cash.total_return_rate.expect("positive cost"), 0.55);

        let reinvested = stock_return(&StockPosition {
            dividends_reinvested: true,
            ..position
        });
        assert_approx(reinvested.shares, 104.0);
        assert_approx(reinvested.dividend_value, 300.0);
        assert_approx(reinvested.current_value, 7_800.0);
        assert_approx(reinvested.total_return, 2_800.0);
    }

    #[test]
    fn cost_basis_averages_lots() {
        let basis = cost_basis(&[
            Lot { price: 10.0, shares: 100.0 },
            Lot { price: 20.0, shares: 50.0 },
        ]);
        assert_approx(basis.total_shares, 150.0);
        assert_approx(basis.total_cost, 2_000.0);
        assert_approx(basis.average_cost_per_share, 2_000.0 / 150.0);
        assert_approx(cost_basis(&[]).average_cost_per_share, 0.0);
    }

    #[test]
    fn compare_investments_picks_the_highest_cagr() {
        let investment = |name: &str, final_value: f64, years: f64| NamedInvestment {
            name: name.to_string(),
            initial_value: 10_000.0,
            final_value,
            dividends: 0.0,
            years,
        };
        let comparison = compare_investments(&[
            investment("index fund", 15_000.0, 5.0),
            investment("bond fund", 12_000.0, 2.0),
        ]);
        assert_eq!(comparison.best.as_deref(), Some("bond fund"));
        let bond = &comparison.investments[1];
        assert_approx_tol(
            bond.annualized_return.expect("defined"),
            1.2f64.sqrt() - 1.0,
            1e-12,
        );
        assert_eq!(compare_investments(&[]).best, None);
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(64))]

        #[test]
        fn prop_taxable_never_outgrows_untaxed(
            principal in 0u32..100_000,
            contribution in 0u32..2_000,
            rate_bp in 0u32..1_500,
            tax_bp in 0u32..5_000,
            periods in 1u32..480
        ) {
            let scenario = GrowthScenario::new(
                principal as f64,
                contribution as f64,
                rate_bp as f64 / 10_000.0,
                periods,
            );
            let untaxed = CompoundProjector.project(&scenario);
            let taxable = TaxableAccount { tax_rate: tax_bp as f64 / 10_000.0 }.project(&scenario);
            prop_assert!(taxable.final_balance <= untaxed.final_balance * (1.0 + 1e-12) + 1e-6);
            prop_assert!(taxable.tax_paid >= 0.0);
            prop_assert!(taxable.yearly_series.len() == untaxed.yearly_series.len());
        }

        #[test]
        fn prop_cagr_round_trip(
            principal in 1u32..1_000_000,
            rate_bp in 1u32..3_000,
            years in 1u32..60
        ) {
            let rate = rate_bp as f64 / 10_000.0;
            let projection = project(principal as f64, 0.0, rate, years, 1);
            let recovered = cagr(principal as f64, projection.final_balance, years as f64);
            prop_assert!(recovered.is_some_and(|r| (r - rate).abs() < 1e-9));
        }
    }
}
