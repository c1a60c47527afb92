use serde::Serialize;
use tracing::{debug, warn};

use super::rounding::{money, opt_money, percent};
use super::types::{AmortizationRow, LoanTerms, MAX_PERIODS, PayoffStatus};

/// Residual balance, relative to the principal, treated as fully repaid.
const BALANCE_TOLERANCE: f64 = 1e-9;
const ZERO_RATE: f64 = 1e-12;
const CREDIT_CARD_MINIMUM_FLOOR: f64 = 25.0;
const REFINANCE_BREAK_EVEN_LIMIT_MONTHS: f64 = 60.0;
const HELOC_REPAYMENT_MONTHS: u32 = 240;

pub trait Amortizer {
    /// Regular monthly payment before any extra payment.
    fn scheduled_payment(&self, terms: &LoanTerms) -> f64;

    fn amortize(&self, terms: &LoanTerms) -> AmortizationResult {
        run_schedule(terms, self.scheduled_payment(terms))
    }
}

/// Level payment that retires the principal over `term_months`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardAmortizer;

impl Amortizer for StandardAmortizer {
    fn scheduled_payment(&self, terms: &LoanTerms) -> f64 {
        monthly_payment(terms.principal, terms.annual_rate, terms.term_months)
    }
}

/// Existing balance paid down with a known payment; `term_months` is ignored.
#[derive(Debug, Clone, Copy)]
pub struct FixedPaymentAmortizer {
    pub payment: f64,
}

impl Amortizer for FixedPaymentAmortizer {
    fn scheduled_payment(&self, _terms: &LoanTerms) -> f64 {
        self.payment.max(0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AmortizationResult {
    #[serde(serialize_with = "money")]
    pub payment: f64,
    #[serde(serialize_with = "money")]
    pub extra_payment: f64,
    pub payoff_months: u32,
    #[serde(serialize_with = "money")]
    pub total_interest: f64,
    #[serde(serialize_with = "money")]
    pub total_paid: f64,
    #[serde(serialize_with = "money")]
    pub remaining_balance: f64,
    pub status: PayoffStatus,
    pub schedule: Vec<AmortizationRow>,
}

impl AmortizationResult {
    pub fn total_principal(&self) -> f64 {
        self.schedule.iter().map(|row| row.principal_portion).sum()
    }
}

pub fn amortize(
    principal: f64,
    annual_rate: f64,
    term_months: u32,
    extra_payment: f64,
) -> AmortizationResult {
    let terms = LoanTerms::new(principal, annual_rate, term_months).with_extra_payment(extra_payment);
    StandardAmortizer.amortize(&terms)
}

pub fn monthly_payment(principal: f64, annual_rate: f64, term_months: u32) -> f64 {
    if term_months == 0 {
        return principal.max(0.0);
    }
    let n = term_months as f64;
    let r = annual_rate / 12.0;
    if r.abs() <= ZERO_RATE {
        return principal / n;
    }
    let growth = (1.0 + r).powf(n);
    principal * r * growth / (growth - 1.0)
}

/// Largest principal a monthly budget retires over `term_months`.
pub fn max_principal(monthly_budget: f64, annual_rate: f64, term_months: u32) -> f64 {
    let n = term_months as f64;
    let r = annual_rate / 12.0;
    if r.abs() <= ZERO_RATE {
        return monthly_budget * n;
    }
    let growth = (1.0 + r).powf(n);
    monthly_budget * (growth - 1.0) / (r * growth)
}

fn run_schedule(terms: &LoanTerms, payment: f64) -> AmortizationResult {
    let rate = terms.monthly_rate();
    let extra = terms.extra_payment.max(0.0);
    let tolerance = terms.principal.abs().max(1.0) * BALANCE_TOLERANCE;

    let mut balance = terms.principal.max(0.0);
    let mut schedule = Vec::new();
    let mut total_interest = 0.0;
    let mut status = PayoffStatus::PaidOff;

    while balance > tolerance {
        if schedule.len() as u32 >= MAX_PERIODS {
            status = PayoffStatus::CapReached;
            break;
        }

        let interest = balance * rate;
        let available = payment + extra - interest;
        if available <= 0.0 {
            status = PayoffStatus::PaymentBelowInterest;
            break;
        }

        let mut principal_portion = available.min(balance);
        let mut remaining = balance - principal_portion;
        if remaining <= tolerance {
            principal_portion = balance;
            remaining = 0.0;
        }

        total_interest += interest;
        schedule.push(AmortizationRow {
            period: schedule.len() as u32 + 1,
            payment: principal_portion + interest,
            principal_portion,
            interest_portion: interest,
            remaining_balance: remaining,
        });
        balance = remaining;
    }

    if balance <= tolerance {
        balance = 0.0;
    }
    if !status.is_paid_off() {
        warn!(
            principal = terms.principal,
            annual_rate = terms.annual_rate,
            payment,
            ?status,
            "loan does not pay off"
        );
    }
    debug!(
        principal = terms.principal,
        periods = schedule.len(),
        total_interest,
        "amortization schedule built"
    );

    let principal_repaid = terms.principal.max(0.0) - balance;
    AmortizationResult {
        payment,
        extra_payment: extra,
        payoff_months: schedule.len() as u32,
        total_interest,
        total_paid: principal_repaid + total_interest,
        remaining_balance: balance,
        status,
        schedule,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HousingPayment {
    #[serde(serialize_with = "money")]
    pub principal_and_interest: f64,
    #[serde(serialize_with = "money")]
    pub property_tax: f64,
    #[serde(serialize_with = "money")]
    pub insurance: f64,
    #[serde(serialize_with = "money")]
    pub pmi: f64,
    #[serde(serialize_with = "money")]
    pub total: f64,
}

/// Monthly PITI from annual property tax, insurance and PMI.
pub fn housing_payment(
    principal: f64,
    annual_rate: f64,
    term_months: u32,
    annual_property_tax: f64,
    annual_insurance: f64,
    annual_pmi: f64,
) -> HousingPayment {
    let principal_and_interest = monthly_payment(principal, annual_rate, term_months);
    let property_tax = annual_property_tax / 12.0;
    let insurance = annual_insurance / 12.0;
    let pmi = annual_pmi / 12.0;
    HousingPayment {
        principal_and_interest,
        property_tax,
        insurance,
        pmi,
        total: principal_and_interest + property_tax + insurance + pmi,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtraPaymentComparison {
    pub standard: AmortizationResult,
    pub accelerated: AmortizationResult,
    /// `None` unless the loan pays off without the extra payment.
    pub months_saved: Option<u32>,
    #[serde(serialize_with = "opt_money")]
    pub interest_saved: Option<f64>,
}

pub fn compare_extra_payment(
    balance: f64,
    annual_rate: f64,
    payment: f64,
    extra_payment: f64,
) -> ExtraPaymentComparison {
    let amortizer = FixedPaymentAmortizer { payment };
    let terms = LoanTerms::new(balance, annual_rate, MAX_PERIODS);
    let standard = amortizer.amortize(&terms);
    let accelerated = amortizer.amortize(&terms.with_extra_payment(extra_payment));
    let baseline_paid_off = standard.status.is_paid_off();
    ExtraPaymentComparison {
        months_saved: baseline_paid_off
            .then(|| standard.payoff_months.saturating_sub(accelerated.payoff_months)),
        interest_saved: baseline_paid_off
            .then(|| standard.total_interest - accelerated.total_interest),
        standard,
        accelerated,
    }
}

/// Payment that retires `balance` within `target_months`, rounded up to the cent.
pub fn required_payment(balance: f64, annual_rate: f64, target_months: u32) -> f64 {
    let exact = monthly_payment(balance, annual_rate, target_months.max(1));
    (exact * 100.0 - 1e-9).ceil() / 100.0
}

/// Extra needed on top of `payment` to finish within `target_months`; zero
/// when the current payment is already sufficient.
pub fn required_extra_payment(
    balance: f64,
    annual_rate: f64,
    payment: f64,
    target_months: u32,
) -> f64 {
    (required_payment(balance, annual_rate, target_months) - payment).max(0.0)
}

pub fn credit_card_minimum(balance: f64, minimum_rate: f64) -> f64 {
    (balance * minimum_rate).max(CREDIT_CARD_MINIMUM_FLOOR)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AutoLoanTerms {
    pub vehicle_price: f64,
    pub down_payment: f64,
    pub trade_in_value: f64,
    pub sales_tax_rate: f64,
    pub fees: f64,
    pub annual_rate: f64,
    pub term_months: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoLoanQuote {
    #[serde(serialize_with = "money")]
    pub sales_tax: f64,
    #[serde(serialize_with = "money")]
    pub amount_financed: f64,
    #[serde(serialize_with = "money")]
    pub monthly_payment: f64,
    #[serde(serialize_with = "money")]
    pub total_payments: f64,
    #[serde(serialize_with = "money")]
    pub total_interest: f64,
    #[serde(serialize_with = "money")]
    pub total_cost: f64,
}

pub fn auto_loan(terms: &AutoLoanTerms) -> AutoLoanQuote {
    let sales_tax = terms.vehicle_price * terms.sales_tax_rate;
    let amount_financed = (terms.vehicle_price + sales_tax + terms.fees
        - terms.down_payment
        - terms.trade_in_value)
        .max(0.0);
    let payment = monthly_payment(amount_financed, terms.annual_rate, terms.term_months);
    let total_payments = payment * terms.term_months as f64;
    let total_interest = (total_payments - amount_financed).max(0.0);
    AutoLoanQuote {
        sales_tax,
        amount_financed,
        monthly_payment: payment,
        total_payments,
        total_interest,
        total_cost: terms.vehicle_price + sales_tax + terms.fees + total_interest,
    }
}

/// Sticker price a monthly budget supports once sales tax is added back.
pub fn affordable_vehicle_price(
    monthly_budget: f64,
    down_payment: f64,
    trade_in_value: f64,
    sales_tax_rate: f64,
    annual_rate: f64,
    term_months: u32,
) -> f64 {
    let financed = max_principal(monthly_budget, annual_rate, term_months);
    (financed + down_payment + trade_in_value) / (1.0 + sales_tax_rate.max(0.0))
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RefinanceTerms {
    pub current_balance: f64,
    pub current_rate: f64,
    pub current_payment: f64,
    pub new_rate: f64,
    pub new_term_months: u32,
    pub closing_costs: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefinanceAnalysis {
    #[serde(serialize_with = "money")]
    pub new_payment: f64,
    #[serde(serialize_with = "money")]
    pub monthly_savings: f64,
    pub break_even_months: Option<u32>,
    /// Interest left on the current loan; `None` when its payment never retires it.
    #[serde(serialize_with = "opt_money")]
    pub current_remaining_interest: Option<f64>,
    pub current_status: PayoffStatus,
    #[serde(serialize_with = "money")]
    pub new_total_interest: f64,
    #[serde(serialize_with = "opt_money")]
    pub interest_savings: Option<f64>,
    #[serde(serialize_with = "percent")]
    pub new_rate: f64,
    pub should_refinance: bool,
}

pub fn refinance(terms: &RefinanceTerms) -> RefinanceAnalysis {
    let current = FixedPaymentAmortizer {
        payment: terms.current_payment,
    }
    .amortize(&LoanTerms::new(
        terms.current_balance,
        terms.current_rate,
        MAX_PERIODS,
    ));
    let replacement = StandardAmortizer.amortize(&LoanTerms::new(
        terms.current_balance,
        terms.new_rate,
        terms.new_term_months,
    ));

    let monthly_savings = terms.current_payment - replacement.payment;
    let break_even =
        (monthly_savings > 0.0).then(|| terms.closing_costs.max(0.0) / monthly_savings);
    let should_refinance =
        break_even.is_some_and(|months| months < REFINANCE_BREAK_EVEN_LIMIT_MONTHS);
    let current_remaining_interest =
        current.status.is_paid_off().then_some(current.total_interest);

    RefinanceAnalysis {
        new_payment: replacement.payment,
        monthly_savings,
        break_even_months: break_even.map(|months| months.ceil() as u32),
        current_remaining_interest,
        current_status: current.status,
        new_total_interest: replacement.total_interest,
        interest_savings: current_remaining_interest
            .map(|interest| interest - replacement.total_interest),
        new_rate: terms.new_rate,
        should_refinance,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MortgageAffordability {
    #[serde(serialize_with = "money")]
    pub max_loan: f64,
    #[serde(serialize_with = "money")]
    pub max_home_price: f64,
}

pub fn mortgage_affordability(
    monthly_budget: f64,
    annual_rate: f64,
    term_months: u32,
    down_payment: f64,
) -> MortgageAffordability {
    let max_loan = max_principal(monthly_budget, annual_rate, term_months);
    MortgageAffordability {
        max_loan,
        max_home_price: max_loan + down_payment,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeEquity {
    #[serde(serialize_with = "money")]
    pub home_value: f64,
    #[serde(serialize_with = "money")]
    pub mortgage_balance: f64,
    #[serde(serialize_with = "money")]
    pub total_equity: f64,
    #[serde(serialize_with = "percent")]
    pub equity_ratio: f64,
    /// Borrowing room left under the combined loan-to-value limit.
    #[serde(serialize_with = "money")]
    pub available_equity: f64,
    #[serde(serialize_with = "percent")]
    pub current_ltv: f64,
    #[serde(serialize_with = "percent")]
    pub max_combined_ltv: f64,
    #[serde(serialize_with = "percent")]
    pub combined_ltv_after: f64,
}

/// `home_value` must be positive.
pub fn home_equity(home_value: f64, mortgage_balance: f64, max_combined_ltv: f64) -> HomeEquity {
    let total_equity = home_value - mortgage_balance;
    let available_equity = (home_value * max_combined_ltv - mortgage_balance).max(0.0);
    HomeEquity {
        home_value,
        mortgage_balance,
        total_equity,
        equity_ratio: total_equity / home_value,
        available_equity,
        current_ltv: mortgage_balance / home_value,
        max_combined_ltv,
        combined_ltv_after: (mortgage_balance + available_equity) / home_value,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HelocPayment {
    #[serde(serialize_with = "money")]
    pub monthly_payment: f64,
    #[serde(serialize_with = "money")]
    pub interest_payment: f64,
    #[serde(serialize_with = "money")]
    pub principal_payment: f64,
    pub interest_only: bool,
}

/// Draw-period payment when `interest_only`, otherwise the level payment
/// that repays the line over 20 years.
pub fn heloc_payment(balance: f64, annual_rate: f64, interest_only: bool) -> HelocPayment {
    let interest_payment = balance * annual_rate / 12.0;
    let monthly_payment = if interest_only {
        interest_payment
    } else {
        monthly_payment(balance, annual_rate, HELOC_REPAYMENT_MONTHS)
    };
    HelocPayment {
        monthly_payment,
        interest_payment,
        principal_payment: monthly_payment - interest_payment,
        interest_only,
    }
}
