use serde::Serialize;

use super::rounding::{money, percent};

/// Hard bound on month-by-month loops (50 years).
pub const MAX_PERIODS: u32 = 600;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoanTerms {
    pub principal: f64,
    pub annual_rate: f64,
    pub term_months: u32,
    pub extra_payment: f64,
}

impl LoanTerms {
    pub fn new(principal: f64, annual_rate: f64, term_months: u32) -> Self {
        Self {
            principal,
            annual_rate,
            term_months,
            extra_payment: 0.0,
        }
    }

    pub fn with_extra_payment(mut self, extra_payment: f64) -> Self {
        self.extra_payment = extra_payment;
        self
    }

    pub fn monthly_rate(&self) -> f64 {
        self.annual_rate / 12.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AmortizationRow {
    pub period: u32,
    #[serde(serialize_with = "money")]
    pub payment: f64,
    #[serde(serialize_with = "money")]
    pub principal_portion: f64,
    #[serde(serialize_with = "money")]
    pub interest_portion: f64,
    #[serde(serialize_with = "money")]
    pub remaining_balance: f64,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PayoffStatus {
    PaidOff,
    /// Still carrying a balance after `MAX_PERIODS`.
    CapReached,
    /// The payment never covers the accruing interest.
    PaymentBelowInterest,
}

impl PayoffStatus {
    pub fn is_paid_off(self) -> bool {
        self == PayoffStatus::PaidOff
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Debt {
    pub name: String,
    pub balance: f64,
    pub annual_rate: f64,
    pub minimum_payment: f64,
}

impl Debt {
    pub fn new(name: impl Into<String>, balance: f64, annual_rate: f64, minimum_payment: f64) -> Self {
        Self {
            name: name.into(),
            balance,
            annual_rate,
            minimum_payment,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaxBracket {
    /// `f64::INFINITY` for the top bracket.
    pub upper_bound: f64,
    pub rate: f64,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FilingStatus {
    Single,
    MarriedJoint,
    HeadOfHousehold,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GrowthScenario {
    pub initial_principal: f64,
    pub periodic_contribution: f64,
    pub annual_rate: f64,
    pub periods: u32,
    pub periods_per_year: u32,
}

impl GrowthScenario {
    pub fn new(
        initial_principal: f64,
        periodic_contribution: f64,
        annual_rate: f64,
        periods: u32,
    ) -> Self {
        Self {
            initial_principal,
            periodic_contribution,
            annual_rate,
            periods,
            periods_per_year: 12,
        }
    }

    pub fn with_periods_per_year(mut self, periods_per_year: u32) -> Self {
        self.periods_per_year = periods_per_year.max(1);
        self
    }

    pub fn rate_per_period(&self) -> f64 {
        self.annual_rate / self.periods_per_year.max(1) as f64
    }

    pub fn total_contributions(&self) -> f64 {
        self.initial_principal + self.periodic_contribution * self.periods as f64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GrowthPoint {
    pub year: u32,
    #[serde(serialize_with = "money")]
    pub balance: f64,
    #[serde(serialize_with = "money")]
    pub contributions: f64,
    #[serde(serialize_with = "money")]
    pub growth: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GrowthProjection {
    #[serde(serialize_with = "money")]
    pub final_balance: f64,
    #[serde(serialize_with = "money")]
    pub total_contributions: f64,
    #[serde(serialize_with = "money")]
    pub total_growth: f64,
    #[serde(serialize_with = "money")]
    pub tax_paid: f64,
    #[serde(serialize_with = "money")]
    pub after_tax_value: f64,
    pub yearly_series: Vec<GrowthPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BracketSlice {
    #[serde(serialize_with = "percent")]
    pub rate: f64,
    #[serde(serialize_with = "money")]
    pub lower_bound: f64,
    /// `None` for the open-ended top bracket.
    #[serde(serialize_with = "super::rounding::opt_money")]
    pub upper_bound: Option<f64>,
    #[serde(serialize_with = "money")]
    pub taxable_amount: f64,
    #[serde(serialize_with = "money")]
    pub tax: f64,
}
