//! Calculator arguments shared by the CLI and the HTTP API.
//!
//! Each struct derives clap `Args` for the subcommand and serde `Deserialize`
//! for query strings and JSON bodies. Rates are given in percent (`6.5` means
//! 6.5%) and converted to fractions during validation. Omitted HTTP keys fall
//! back to the `Default` impls, which mirror the clap defaults.

use clap::{Args, ValueEnum};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;

use crate::core::amortization::{
    self, AmortizationResult, AutoLoanQuote, AutoLoanTerms, ExtraPaymentComparison,
    HelocPayment, HomeEquity, HousingPayment, MortgageAffordability, RefinanceAnalysis,
    RefinanceTerms,
};
use crate::core::debt::{self, StrategyComparison};
use crate::core::growth::{
    self, ContributionLimitCheck, CostBasis, EmployerMatchPlan, EmployerMatchProjection,
    InvestmentComparison, InvestmentReturn, IraComparison, IraComparisonInput, Lot,
    NamedInvestment, RequiredSavings, RetirementDrawdown, RetirementGap, RetirementGoal,
    RetirementIncome, StockPosition, StockReturn, TaxTreatmentComparison, TreatmentRates,
};
use crate::core::rounding::{opt_money, percent as percent_field};
use crate::core::social_security::{self, BenefitEstimate};
use crate::core::tax::{
    CapitalGainInput, CapitalGainsAssessment, CapitalGainsTax, IncomeTaxAssessment, RefundEstimate,
    RefundInput, SelfEmploymentAssessment, SelfEmploymentInput, SelfEmploymentTax, TaxEvaluator,
};
use crate::core::{Debt, FilingStatus, GrowthProjection, GrowthScenario, MAX_PERIODS};
use crate::error::InputError;

const MAX_PROJECTION_YEARS: u32 = 100;
const MAX_COMPOUNDING_PER_YEAR: u32 = 365;

/// A calculator request: validated, then evaluated by the core.
pub trait Calculation: DeserializeOwned + Default + Send + 'static {
    type Output: Serialize;

    fn calculate(self) -> Result<Self::Output, InputError>;
}

fn finite(arg: &'static str, value: f64) -> Result<f64, InputError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(InputError::NotFinite { arg })
    }
}

fn non_negative(arg: &'static str, value: f64) -> Result<f64, InputError> {
    let value = finite(arg, value)?;
    if value < 0.0 {
        return Err(InputError::out_of_range(arg, ">= 0"));
    }
    Ok(value)
}

fn positive(arg: &'static str, value: f64) -> Result<f64, InputError> {
    let value = finite(arg, value)?;
    if value <= 0.0 {
        return Err(InputError::out_of_range(arg, "> 0"));
    }
    Ok(value)
}

/// Percent in [0, 100] as a fraction.
fn percent(arg: &'static str, value: f64) -> Result<f64, InputError> {
    let value = finite(arg, value)?;
    if !(0.0..=100.0).contains(&value) {
        return Err(InputError::out_of_range(arg, "between 0 and 100"));
    }
    Ok(value / 100.0)
}

/// Percent return that may be negative, as a fraction.
fn return_percent(arg: &'static str, value: f64) -> Result<f64, InputError> {
    let value = finite(arg, value)?;
    if value <= -100.0 || value > 100.0 {
        return Err(InputError::out_of_range(arg, "greater than -100 and at most 100"));
    }
    Ok(value / 100.0)
}

fn term_months(arg: &'static str, months: u32) -> Result<u32, InputError> {
    if months == 0 || months > MAX_PERIODS {
        return Err(InputError::out_of_range(arg, "between 1 and 600"));
    }
    Ok(months)
}

fn term_years(arg: &'static str, years: u32) -> Result<u32, InputError> {
    if years == 0 || years > MAX_PERIODS / 12 {
        return Err(InputError::out_of_range(arg, "between 1 and 50"));
    }
    Ok(years * 12)
}

fn projection_years(arg: &'static str, years: u32) -> Result<u32, InputError> {
    if years == 0 || years > MAX_PROJECTION_YEARS {
        return Err(InputError::out_of_range(arg, "between 1 and 100"));
    }
    Ok(years)
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, ValueEnum, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FilingStatusArg {
    #[default]
    Single,
    #[value(alias = "married")]
    #[serde(alias = "married", alias = "marriedJoint", alias = "married_joint")]
    MarriedJoint,
    #[value(alias = "hoh")]
    #[serde(alias = "hoh", alias = "headOfHousehold", alias = "head_of_household")]
    HeadOfHousehold,
}

impl From<FilingStatusArg> for FilingStatus {
    fn from(value: FilingStatusArg) -> Self {
        match value {
            FilingStatusArg::Single => FilingStatus::Single,
            FilingStatusArg::MarriedJoint => FilingStatus::MarriedJoint,
            FilingStatusArg::HeadOfHousehold => FilingStatus::HeadOfHousehold,
        }
    }
}

/// One debt, written `name:balance:rate:minimum` on the command line.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "DebtRepr")]
pub struct DebtArg {
    pub name: String,
    pub balance: f64,
    /// Percent.
    pub annual_rate: f64,
    pub minimum_payment: f64,
}

impl FromStr for DebtArg {
    type Err = InputError;

    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| InputError::Debt {
            spec: spec.to_string(),
            reason: reason.to_string(),
        };
        let parts: Vec<&str> = spec.split(':').map(str::trim).collect();
        let [name, balance, rate, minimum] = parts.as_slice() else {
            return Err(invalid("expected name:balance:rate:minimum"));
        };
        if name.is_empty() {
            return Err(invalid("name is empty"));
        }
        let number = |field: &str, raw: &str| {
            raw.parse::<f64>()
                .map_err(|_| invalid(&format!("{field} `{raw}` is not a number")))
        };
        Ok(DebtArg {
            name: (*name).to_string(),
            balance: number("balance", *balance)?,
            annual_rate: number("rate", *rate)?,
            minimum_payment: number("minimum", *minimum)?,
        })
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DebtRepr {
    Spec(String),
    #[serde(rename_all = "camelCase")]
    Fields {
        name: String,
        balance: f64,
        #[serde(alias = "rate")]
        annual_rate: f64,
        #[serde(alias = "minimum")]
        minimum_payment: f64,
    },
}

impl TryFrom<DebtRepr> for DebtArg {
    type Error = InputError;

    fn try_from(value: DebtRepr) -> Result<Self, Self::Error> {
        match value {
            DebtRepr::Spec(spec) => spec.parse(),
            DebtRepr::Fields {
                name,
                balance,
                annual_rate,
                minimum_payment,
            } => Ok(DebtArg {
                name,
                balance,
                annual_rate,
                minimum_payment,
            }),
        }
    }
}

impl DebtArg {
    fn validate(&self) -> Result<Debt, InputError> {
        let invalid = |reason: &str| InputError::Debt {
            spec: self.name.clone(),
            reason: reason.to_string(),
        };
        if !self.balance.is_finite() || self.balance < 0.0 {
            return Err(invalid("balance must be >= 0"));
        }
        if !(0.0..=100.0).contains(&self.annual_rate) {
            return Err(invalid("rate must be between 0 and 100"));
        }
        if !self.minimum_payment.is_finite() || self.minimum_payment < 0.0 {
            return Err(invalid("minimum must be >= 0"));
        }
        Ok(Debt::new(
            self.name.clone(),
            self.balance,
            self.annual_rate / 100.0,
            self.minimum_payment,
        ))
    }
}

/// Numeric fields of a colon-separated list item.
fn numeric_fields(arg: &'static str, item: &str, fields: &[&str]) -> Result<Vec<f64>, InputError> {
    fields
        .iter()
        .map(|raw| {
            raw.parse::<f64>().map_err(|_| InputError::Item {
                arg,
                item: item.to_string(),
                reason: format!("`{raw}` is not a number"),
            })
        })
        .collect()
}

/// One purchase lot, written `price:shares`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(try_from = "LotRepr")]
pub struct LotArg {
    pub price: f64,
    pub shares: f64,
}

impl FromStr for LotArg {
    type Err = InputError;

    fn from_str(item: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = item.split(':').map(str::trim).collect();
        match numeric_fields("lot", item, &parts)?.as_slice() {
            [price, shares] => Ok(LotArg {
                price: *price,
                shares: *shares,
            }),
            _ => Err(InputError::Item {
                arg: "lot",
                item: item.to_string(),
                reason: "expected price:shares".to_string(),
            }),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LotRepr {
    Spec(String),
    Fields { price: f64, shares: f64 },
}

impl TryFrom<LotRepr> for LotArg {
    type Error = InputError;

    fn try_from(value: LotRepr) -> Result<Self, Self::Error> {
        match value {
            LotRepr::Spec(spec) => spec.parse(),
            LotRepr::Fields { price, shares } => Ok(LotArg { price, shares }),
        }
    }
}

impl LotArg {
    fn validate(&self) -> Result<Lot, InputError> {
        let valid = |value: f64| value.is_finite() && value >= 0.0;
        if !valid(self.price) || !valid(self.shares) {
            return Err(InputError::Item {
                arg: "lot",
                item: format!("{}:{}", self.price, self.shares),
                reason: "price and shares must be >= 0".to_string(),
            });
        }
        Ok(Lot {
            price: self.price,
            shares: self.shares,
        })
    }
}

/// One holding, written `name:initial:final:years` with an optional
/// `:dividends` suffix.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "InvestmentRepr")]
pub struct InvestmentArg {
    pub name: String,
    pub initial_value: f64,
    pub final_value: f64,
    pub years: f64,
    pub dividends: f64,
}

impl FromStr for InvestmentArg {
    type Err = InputError;

    fn from_str(item: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| InputError::Item {
            arg: "investment",
            item: item.to_string(),
            reason: reason.to_string(),
        };
        let parts: Vec<&str> = item.split(':').map(str::trim).collect();
        let Some((name, numbers)) = parts.split_first() else {
            return Err(invalid("expected name:initial:final:years[:dividends]"));
        };
        if name.is_empty() {
            return Err(invalid("name is empty"));
        }
        let (initial_value, final_value, years, dividends) =
            match numeric_fields("investment", item, numbers)?.as_slice() {
                [initial, last, years] => (*initial, *last, *years, 0.0),
                [initial, last, years, dividends] => (*initial, *last, *years, *dividends),
                _ => return Err(invalid("expected name:initial:final:years[:dividends]")),
            };
        Ok(InvestmentArg {
            name: (*name).to_string(),
            initial_value,
            final_value,
            years,
            dividends,
        })
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum InvestmentRepr {
    Spec(String),
    #[serde(rename_all = "camelCase")]
    Fields {
        name: String,
        #[serde(alias = "initial")]
        initial_value: f64,
        #[serde(alias = "final")]
        final_value: f64,
        years: f64,
        #[serde(default)]
        dividends: f64,
    },
}

impl TryFrom<InvestmentRepr> for InvestmentArg {
    type Error = InputError;

    fn try_from(value: InvestmentRepr) -> Result<Self, Self::Error> {
        match value {
            InvestmentRepr::Spec(spec) => spec.parse(),
            InvestmentRepr::Fields {
                name,
                initial_value,
                final_value,
                years,
                dividends,
            } => Ok(InvestmentArg {
                name,
                initial_value,
                final_value,
                years,
                dividends,
            }),
        }
    }
}

impl InvestmentArg {
    fn validate(&self) -> Result<NamedInvestment, InputError> {
        let invalid = |reason: &str| InputError::Item {
            arg: "investment",
            item: self.name.clone(),
            reason: reason.to_string(),
        };
        if !self.initial_value.is_finite() || self.initial_value <= 0.0 {
            return Err(invalid("initial value must be > 0"));
        }
        if !self.final_value.is_finite() || self.final_value < 0.0 {
            return Err(invalid("final value must be >= 0"));
        }
        if !self.years.is_finite() || self.years <= 0.0 {
            return Err(invalid("years must be > 0"));
        }
        if !self.dividends.is_finite() || self.dividends < 0.0 {
            return Err(invalid("dividends must be >= 0"));
        }
        Ok(NamedInvestment {
            name: self.name.clone(),
            initial_value: self.initial_value,
            final_value: self.final_value,
            dividends: self.dividends,
            years: self.years,
        })
    }
}

/// A list given as one comma-separated string (query strings) or as an array.
#[derive(Deserialize)]
#[serde(untagged)]
enum ListRepr<T> {
    Joined(String),
    Items(Vec<T>),
}

fn split_list<T>(joined: &str) -> Result<Vec<T>, String>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    joined
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| item.parse::<T>().map_err(|e| e.to_string()))
        .collect()
}

fn item_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + FromStr,
    T::Err: std::fmt::Display,
{
    match ListRepr::<T>::deserialize(deserializer)? {
        ListRepr::Joined(joined) => split_list(&joined).map_err(serde::de::Error::custom),
        ListRepr::Items(items) => Ok(items),
    }
}

#[derive(Args, Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MortgageArgs {
    #[arg(long, default_value_t = 400_000.0)]
    pub home_price: f64,
    #[arg(long, default_value_t = 80_000.0)]
    pub down_payment: f64,
    #[arg(long, default_value_t = 6.5, help = "Annual interest rate in percent")]
    pub annual_rate: f64,
    #[arg(long, default_value_t = 30)]
    pub term_years: u32,
    #[arg(long, default_value_t = 4_800.0, help = "Annual property tax")]
    pub property_tax: f64,
    #[arg(long, default_value_t = 1_500.0, help = "Annual homeowners insurance")]
    pub insurance: f64,
    #[arg(long, default_value_t = 0.0, help = "Annual private mortgage insurance")]
    pub pmi: f64,
    #[arg(long, default_value_t = 0.0)]
    pub extra_payment: f64,
    #[arg(long, help = "Include the month-by-month schedule")]
    pub schedule: bool,
}

impl Default for MortgageArgs {
    fn default() -> Self {
        Self {
            home_price: 400_000.0,
            down_payment: 80_000.0,
            annual_rate: 6.5,
            term_years: 30,
            property_tax: 4_800.0,
            insurance: 1_500.0,
            pmi: 0.0,
            extra_payment: 0.0,
            schedule: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MortgageReport {
    #[serde(serialize_with = "crate::core::rounding::money")]
    pub loan_amount: f64,
    #[serde(serialize_with = "percent_field")]
    pub down_payment_ratio: f64,
    pub housing: HousingPayment,
    pub amortization: AmortizationResult,
}

impl Calculation for MortgageArgs {
    type Output = MortgageReport;

    fn calculate(self) -> Result<MortgageReport, InputError> {
        let home_price = positive("home-price", self.home_price)?;
        let down_payment = non_negative("down-payment", self.down_payment)?;
        if down_payment > home_price {
            return Err(InputError::Ordering {
                arg: "home-price",
                other: "down-payment",
            });
        }
        let rate = percent("annual-rate", self.annual_rate)?;
        let months = term_years("term-years", self.term_years)?;
        let loan_amount = home_price - down_payment;

        let housing = amortization::housing_payment(
            loan_amount,
            rate,
            months,
            non_negative("property-tax", self.property_tax)?,
            non_negative("insurance", self.insurance)?,
            non_negative("pmi", self.pmi)?,
        );
        let mut schedule = amortization::amortize(
            loan_amount,
            rate,
            months,
            non_negative("extra-payment", self.extra_payment)?,
        );
        if !self.schedule {
            schedule.schedule.clear();
        }

        Ok(MortgageReport {
            loan_amount,
            down_payment_ratio: down_payment / home_price,
            housing,
            amortization: schedule,
        })
    }
}

#[derive(Args, Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AffordabilityArgs {
    #[arg(long, default_value_t = 2_500.0, help = "Monthly principal and interest budget")]
    pub monthly_budget: f64,
    #[arg(long, default_value_t = 6.5)]
    pub annual_rate: f64,
    #[arg(long, default_value_t = 30)]
    pub term_years: u32,
    #[arg(long, default_value_t = 60_000.0)]
    pub down_payment: f64,
}

impl Default for AffordabilityArgs {
    fn default() -> Self {
        Self {
            monthly_budget: 2_500.0,
            annual_rate: 6.5,
            term_years: 30,
            down_payment: 60_000.0,
        }
    }
}

impl Calculation for AffordabilityArgs {
    type Output = MortgageAffordability;

    fn calculate(self) -> Result<MortgageAffordability, InputError> {
        Ok(amortization::mortgage_affordability(
            positive("monthly-budget", self.monthly_budget)?,
            percent("annual-rate", self.annual_rate)?,
            term_years("term-years", self.term_years)?,
            non_negative("down-payment", self.down_payment)?,
        ))
    }
}

#[derive(Args, Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AmortizationArgs {
    #[arg(long, default_value_t = 200_000.0)]
    pub principal: f64,
    #[arg(long, default_value_t = 6.5, help = "Annual interest rate in percent")]
    pub annual_rate: f64,
    #[arg(long, default_value_t = 360)]
    pub term_months: u32,
    #[arg(long, default_value_t = 0.0)]
    pub extra_payment: f64,
}

impl Default for AmortizationArgs {
    fn default() -> Self {
        Self {
            principal: 200_000.0,
            annual_rate: 6.5,
            term_months: 360,
            extra_payment: 0.0,
        }
    }
}

impl Calculation for AmortizationArgs {
    type Output = AmortizationResult;

    fn calculate(self) -> Result<AmortizationResult, InputError> {
        Ok(amortization::amortize(
            non_negative("principal", self.principal)?,
            percent("annual-rate", self.annual_rate)?,
            term_months("term-months", self.term_months)?,
            non_negative("extra-payment", self.extra_payment)?,
        ))
    }
}

#[derive(Args, Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LoanPayoffArgs {
    #[arg(long, default_value_t = 25_000.0)]
    pub balance: f64,
    #[arg(long, default_value_t = 7.0)]
    pub annual_rate: f64,
    #[arg(long, default_value_t = 500.0, help = "Current monthly payment")]
    pub payment: f64,
    #[arg(long, default_value_t = 100.0)]
    pub extra_payment: f64,
    #[arg(long, help = "Months in which the balance should be gone")]
    pub target_months: Option<u32>,
}

impl Default for LoanPayoffArgs {
    fn default() -> Self {
        Self {
            balance: 25_000.0,
            annual_rate: 7.0,
            payment: 500.0,
            extra_payment: 100.0,
            target_months: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanPayoffReport {
    #[serde(flatten)]
    pub comparison: ExtraPaymentComparison,
    #[serde(serialize_with = "opt_money")]
    pub required_extra_payment: Option<f64>,
}

impl Calculation for LoanPayoffArgs {
    type Output = LoanPayoffReport;

    fn calculate(self) -> Result<LoanPayoffReport, InputError> {
        let balance = non_negative("balance", self.balance)?;
        let rate = percent("annual-rate", self.annual_rate)?;
        let payment = positive("payment", self.payment)?;
        let target = self
            .target_months
            .map(|months| term_months("target-months", months))
            .transpose()?;

        let comparison = amortization::compare_extra_payment(
            balance,
            rate,
            payment,
            non_negative("extra-payment", self.extra_payment)?,
        );
        Ok(LoanPayoffReport {
            comparison,
            required_extra_payment: target
                .map(|months| amortization::required_extra_payment(balance, rate, payment, months)),
        })
    }
}

#[derive(Args, Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CreditCardArgs {
    #[arg(long, default_value_t = 5_000.0)]
    pub balance: f64,
    #[arg(long, default_value_t = 22.0, help = "APR in percent")]
    pub annual_rate: f64,
    #[arg(long, help = "Monthly payment; defaults to the card minimum")]
    pub payment: Option<f64>,
    #[arg(long, default_value_t = 2.0, help = "Minimum payment as a percent of balance")]
    pub minimum_percent: f64,
    #[arg(long, default_value_t = 0.0)]
    pub extra_payment: f64,
    #[arg(long)]
    pub target_months: Option<u32>,
}

impl Default for CreditCardArgs {
    fn default() -> Self {
        Self {
            balance: 5_000.0,
            annual_rate: 22.0,
            payment: None,
            minimum_percent: 2.0,
            extra_payment: 0.0,
            target_months: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditCardReport {
    #[serde(serialize_with = "crate::core::rounding::money")]
    pub minimum_payment: f64,
    #[serde(serialize_with = "crate::core::rounding::money")]
    pub payment: f64,
    #[serde(flatten)]
    pub comparison: ExtraPaymentComparison,
    #[serde(serialize_with = "opt_money")]
    pub required_payment: Option<f64>,
}

impl Calculation for CreditCardArgs {
    type Output = CreditCardReport;

    fn calculate(self) -> Result<CreditCardReport, InputError> {
        let balance = non_negative("balance", self.balance)?;
        let rate = percent("annual-rate", self.annual_rate)?;
        let minimum_payment =
            amortization::credit_card_minimum(balance, percent("minimum-percent", self.minimum_percent)?);
        let payment = match self.payment {
            Some(payment) => positive("payment", payment)?,
            None => minimum_payment,
        };
        let target = self
            .target_months
            .map(|months| term_months("target-months", months))
            .transpose()?;

        Ok(CreditCardReport {
            minimum_payment,
            payment,
            comparison: amortization::compare_extra_payment(
                balance,
                rate,
                payment,
                non_negative("extra-payment", self.extra_payment)?,
            ),
            required_payment: target
                .map(|months| amortization::required_payment(balance, rate, months)),
        })
    }
}

#[derive(Args, Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AutoLoanArgs {
    #[arg(long, default_value_t = 35_000.0)]
    pub vehicle_price: f64,
    #[arg(long, default_value_t = 5_000.0)]
    pub down_payment: f64,
    #[arg(long, default_value_t = 0.0)]
    pub trade_in_value: f64,
    #[arg(long, default_value_t = 7.0, help = "Sales tax in percent")]
    pub sales_tax_rate: f64,
    #[arg(long, default_value_t = 500.0)]
    pub fees: f64,
    #[arg(long, default_value_t = 6.0)]
    pub annual_rate: f64,
    #[arg(long, default_value_t = 60)]
    pub term_months: u32,
    #[arg(long, help = "Also report the price this monthly budget supports")]
    pub monthly_budget: Option<f64>,
}

impl Default for AutoLoanArgs {
    fn default() -> Self {
        Self {
            vehicle_price: 35_000.0,
            down_payment: 5_000.0,
            trade_in_value: 0.0,
            sales_tax_rate: 7.0,
            fees: 500.0,
            annual_rate: 6.0,
            term_months: 60,
            monthly_budget: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoLoanReport {
    #[serde(flatten)]
    pub quote: AutoLoanQuote,
    #[serde(serialize_with = "opt_money")]
    pub affordable_price: Option<f64>,
}

impl Calculation for AutoLoanArgs {
    type Output = AutoLoanReport;

    fn calculate(self) -> Result<AutoLoanReport, InputError> {
        let terms = AutoLoanTerms {
            vehicle_price: positive("vehicle-price", self.vehicle_price)?,
            down_payment: non_negative("down-payment", self.down_payment)?,
            trade_in_value: non_negative("trade-in-value", self.trade_in_value)?,
            sales_tax_rate: percent("sales-tax-rate", self.sales_tax_rate)?,
            fees: non_negative("fees", self.fees)?,
            annual_rate: percent("annual-rate", self.annual_rate)?,
            term_months: term_months("term-months", self.term_months)?,
        };
        let affordable_price = self
            .monthly_budget
            .map(|budget| positive("monthly-budget", budget))
            .transpose()?
            .map(|budget| {
                amortization::affordable_vehicle_price(
                    budget,
                    terms.down_payment,
                    terms.trade_in_value,
                    terms.sales_tax_rate,
                    terms.annual_rate,
                    terms.term_months,
                )
            });
        Ok(AutoLoanReport {
            quote: amortization::auto_loan(&terms),
            affordable_price,
        })
    }
}

#[derive(Args, Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RefinanceArgs {
    #[arg(long, default_value_t = 250_000.0)]
    pub current_balance: f64,
    #[arg(long, default_value_t = 7.0)]
    pub current_rate: f64,
    #[arg(long, default_value_t = 1_800.0)]
    pub current_payment: f64,
    #[arg(long, default_value_t = 6.0)]
    pub new_rate: f64,
    #[arg(long, default_value_t = 360)]
    pub new_term_months: u32,
    #[arg(long, default_value_t = 5_000.0)]
    pub closing_costs: f64,
}

impl Default for RefinanceArgs {
    fn default() -> Self {
        Self {
            current_balance: 250_000.0,
            current_rate: 7.0,
            current_payment: 1_800.0,
            new_rate: 6.0,
            new_term_months: 360,
            closing_costs: 5_000.0,
        }
    }
}

impl Calculation for RefinanceArgs {
    type Output = RefinanceAnalysis;

    fn calculate(self) -> Result<RefinanceAnalysis, InputError> {
        Ok(amortization::refinance(&RefinanceTerms {
            current_balance: positive("current-balance", self.current_balance)?,
            current_rate: percent("current-rate", self.current_rate)?,
            current_payment: positive("current-payment", self.current_payment)?,
            new_rate: percent("new-rate", self.new_rate)?,
            new_term_months: term_months("new-term-months", self.new_term_months)?,
            closing_costs: non_negative("closing-costs", self.closing_costs)?,
        }))
    }
}

#[derive(Args, Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DebtPayoffArgs {
    #[arg(
        long = "debt",
        value_name = "NAME:BALANCE:RATE:MINIMUM",
        help = "A debt; repeat for each one"
    )]
    #[serde(deserialize_with = "item_list")]
    pub debts: Vec<DebtArg>,
    #[arg(long, default_value_t = 0.0, help = "Monthly amount beyond the minimums")]
    pub extra_payment: f64,
}

impl Calculation for DebtPayoffArgs {
    type Output = StrategyComparison;

    fn calculate(self) -> Result<StrategyComparison, InputError> {
        if self.debts.is_empty() {
            return Err(InputError::Missing { arg: "debt" });
        }
        let debts = self
            .debts
            .iter()
            .map(DebtArg::validate)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(debt::compare(
            &debts,
            non_negative("extra-payment", self.extra_payment)?,
        ))
    }
}

#[derive(Args, Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CompoundInterestArgs {
    #[arg(long, default_value_t = 10_000.0)]
    pub principal: f64,
    #[arg(long, default_value_t = 500.0)]
    pub monthly_contribution: f64,
    #[arg(long, default_value_t = 7.0, help = "Annual return in percent")]
    pub annual_rate: f64,
    #[arg(long, default_value_t = 20)]
    pub years: u32,
    #[arg(long, default_value_t = 12)]
    pub compounding_per_year: u32,
}

impl Default for CompoundInterestArgs {
    fn default() -> Self {
        Self {
            principal: 10_000.0,
            monthly_contribution: 500.0,
            annual_rate: 7.0,
            years: 20,
            compounding_per_year: 12,
        }
    }
}

impl Calculation for CompoundInterestArgs {
    type Output = GrowthProjection;

    fn calculate(self) -> Result<GrowthProjection, InputError> {
        if self.compounding_per_year == 0 || self.compounding_per_year > MAX_COMPOUNDING_PER_YEAR {
            return Err(InputError::out_of_range("compounding-per-year", "between 1 and 365"));
        }
        Ok(growth::compound_interest(
            non_negative("principal", self.principal)?,
            non_negative("monthly-contribution", self.monthly_contribution)?,
            return_percent("annual-rate", self.annual_rate)?,
            projection_years("years", self.years)?,
            self.compounding_per_year,
        ))
    }
}

#[derive(Args, Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TaxDeferredArgs {
    #[arg(long, default_value_t = 10_000.0)]
    pub principal: f64,
    #[arg(long, default_value_t = 500.0)]
    pub monthly_contribution: f64,
    #[arg(long, default_value_t = 7.0)]
    pub annual_rate: f64,
    #[arg(long, default_value_t = 30)]
    pub years: u32,
    #[arg(long, default_value_t = 22.0)]
    pub current_tax_rate: f64,
    #[arg(long, default_value_t = 22.0)]
    pub retirement_tax_rate: f64,
    #[arg(long, default_value_t = 15.0, help = "Tax on taxable-account returns")]
    pub investment_tax_rate: f64,
}

impl Default for TaxDeferredArgs {
    fn default() -> Self {
        Self {
            principal: 10_000.0,
            monthly_contribution: 500.0,
            annual_rate: 7.0,
            years: 30,
            current_tax_rate: 22.0,
            retirement_tax_rate: 22.0,
            investment_tax_rate: 15.0,
        }
    }
}

impl Calculation for TaxDeferredArgs {
    type Output = TaxTreatmentComparison;

    fn calculate(self) -> Result<TaxTreatmentComparison, InputError> {
        let scenario = GrowthScenario::new(
            non_negative("principal", self.principal)?,
            non_negative("monthly-contribution", self.monthly_contribution)?,
            return_percent("annual-rate", self.annual_rate)?,
            projection_years("years", self.years)? * 12,
        );
        let rates = TreatmentRates {
            current_tax_rate: percent("current-tax-rate", self.current_tax_rate)?,
            retirement_tax_rate: percent("retirement-tax-rate", self.retirement_tax_rate)?,
            investment_tax_rate: percent("investment-tax-rate", self.investment_tax_rate)?,
        };
        Ok(growth::compare_tax_treatments(&scenario, rates))
    }
}

#[derive(Args, Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Retirement401kArgs {
    #[arg(long, default_value_t = 50_000.0)]
    pub current_balance: f64,
    #[arg(long, default_value_t = 100_000.0)]
    pub annual_salary: f64,
    #[arg(long, default_value_t = 10.0, help = "Employee contribution, percent of salary")]
    pub contribution_rate: f64,
    #[arg(long, default_value_t = 50.0, help = "Employer match, percent of employee dollars")]
    pub match_rate: f64,
    #[arg(long, default_value_t = 6.0, help = "Matched share of salary in percent")]
    pub match_limit: f64,
    #[arg(long, default_value_t = 7.0)]
    pub annual_return: f64,
    #[arg(long, default_value_t = 25)]
    pub years: u32,
    #[arg(long, default_value_t = 3.0)]
    pub salary_growth: f64,
    #[arg(long, default_value_t = 40)]
    pub age: u32,
}

impl Default for Retirement401kArgs {
    fn default() -> Self {
        Self {
            current_balance: 50_000.0,
            annual_salary: 100_000.0,
            contribution_rate: 10.0,
            match_rate: 50.0,
            match_limit: 6.0,
            annual_return: 7.0,
            years: 25,
            salary_growth: 3.0,
            age: 40,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Retirement401kReport {
    #[serde(flatten)]
    pub projection: EmployerMatchProjection,
    pub limits: ContributionLimitCheck,
}

impl Calculation for Retirement401kArgs {
    type Output = Retirement401kReport;

    fn calculate(self) -> Result<Retirement401kReport, InputError> {
        let plan = EmployerMatchPlan {
            current_balance: non_negative("current-balance", self.current_balance)?,
            annual_salary: non_negative("annual-salary", self.annual_salary)?,
            contribution_rate: percent("contribution-rate", self.contribution_rate)?,
            match_rate: percent("match-rate", self.match_rate)?,
            match_limit_rate: percent("match-limit", self.match_limit)?,
            annual_return: return_percent("annual-return", self.annual_return)?,
            years: projection_years("years", self.years)?,
            salary_growth: return_percent("salary-growth", self.salary_growth)?,
        };
        Ok(Retirement401kReport {
            projection: growth::project_employer_match(&plan),
            limits: growth::contribution_limit_check(
                plan.annual_salary,
                plan.contribution_rate,
                self.age,
            ),
        })
    }
}

#[derive(Args, Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IraArgs {
    #[arg(long, default_value_t = 22.0)]
    pub current_tax_rate: f64,
    #[arg(long, default_value_t = 22.0)]
    pub retirement_tax_rate: f64,
    #[arg(long, default_value_t = 7_000.0)]
    pub annual_contribution: f64,
    #[arg(long, default_value_t = 30)]
    pub years: u32,
    #[arg(long, default_value_t = 7.0)]
    pub annual_return: f64,
    #[arg(long, default_value_t = 35)]
    pub current_age: u32,
}

impl Default for IraArgs {
    fn default() -> Self {
        Self {
            current_tax_rate: 22.0,
            retirement_tax_rate: 22.0,
            annual_contribution: 7_000.0,
            years: 30,
            annual_return: 7.0,
            current_age: 35,
        }
    }
}

impl Calculation for IraArgs {
    type Output = IraComparison;

    fn calculate(self) -> Result<IraComparison, InputError> {
        Ok(growth::compare_ira(&IraComparisonInput {
            current_tax_rate: percent("current-tax-rate", self.current_tax_rate)?,
            retirement_tax_rate: percent("retirement-tax-rate", self.retirement_tax_rate)?,
            annual_contribution: non_negative("annual-contribution", self.annual_contribution)?,
            years: projection_years("years", self.years)?,
            annual_return: return_percent("annual-return", self.annual_return)?,
            current_age: self.current_age,
        }))
    }
}

#[derive(Args, Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RetirementArgs {
    #[arg(long, default_value_t = 35)]
    pub current_age: u32,
    #[arg(long, default_value_t = 65)]
    pub retirement_age: u32,
    #[arg(long, default_value_t = 50_000.0)]
    pub current_savings: f64,
    #[arg(long, default_value_t = 1_000.0)]
    pub monthly_contribution: f64,
    #[arg(long, default_value_t = 7.0)]
    pub annual_return: f64,
    #[arg(long, default_value_t = 80_000.0)]
    pub desired_annual_income: f64,
    #[arg(long, default_value_t = 4.0, help = "Sustainable withdrawal rate in percent")]
    pub withdrawal_rate: f64,
}

impl Default for RetirementArgs {
    fn default() -> Self {
        Self {
            current_age: 35,
            retirement_age: 65,
            current_savings: 50_000.0,
            monthly_contribution: 1_000.0,
            annual_return: 7.0,
            desired_annual_income: 80_000.0,
            withdrawal_rate: 4.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RetirementReport {
    #[serde(flatten)]
    pub gap: RetirementGap,
    /// Years the projected savings fund the desired income; `None` if indefinitely.
    pub longevity_years: Option<u32>,
}

impl Calculation for RetirementArgs {
    type Output = RetirementReport;

    fn calculate(self) -> Result<RetirementReport, InputError> {
        if self.retirement_age < self.current_age {
            return Err(InputError::Ordering {
                arg: "retirement-age",
                other: "current-age",
            });
        }
        if self.retirement_age - self.current_age > MAX_PROJECTION_YEARS {
            return Err(InputError::out_of_range(
                "retirement-age",
                "within 100 years of --current-age",
            ));
        }
        let withdrawal_rate = percent("withdrawal-rate", self.withdrawal_rate)?;
        if withdrawal_rate <= 0.0 {
            return Err(InputError::out_of_range("withdrawal-rate", "> 0"));
        }
        let goal = RetirementGoal {
            current_age: self.current_age,
            retirement_age: self.retirement_age,
            current_savings: non_negative("current-savings", self.current_savings)?,
            monthly_contribution: non_negative("monthly-contribution", self.monthly_contribution)?,
            annual_return: return_percent("annual-return", self.annual_return)?,
            desired_annual_income: non_negative("desired-annual-income", self.desired_annual_income)?,
            withdrawal_rate,
        };
        let gap = growth::retirement_gap(&goal);
        let longevity_years = growth::savings_longevity(
            gap.projected_savings,
            goal.desired_annual_income,
            goal.annual_return,
        );
        Ok(RetirementReport {
            gap,
            longevity_years,
        })
    }
}

#[derive(Args, Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InvestmentReturnArgs {
    #[arg(long, default_value_t = 10_000.0)]
    pub initial_value: f64,
    #[arg(long, default_value_t = 15_000.0)]
    pub final_value: f64,
    #[arg(long, default_value_t = 0.0)]
    pub dividends: f64,
    #[arg(long, default_value_t = 5.0)]
    pub years: f64,
}

impl Default for InvestmentReturnArgs {
    fn default() -> Self {
        Self {
            initial_value: 10_000.0,
            final_value: 15_000.0,
            dividends: 0.0,
            years: 5.0,
        }
    }
}

impl Calculation for InvestmentReturnArgs {
    type Output = InvestmentReturn;

    fn calculate(self) -> Result<InvestmentReturn, InputError> {
        Ok(growth::investment_return(
            positive("initial-value", self.initial_value)?,
            non_negative("final-value", self.final_value)?,
            non_negative("dividends", self.dividends)?,
            positive("years", self.years)?,
        ))
    }
}

#[derive(Args, Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IncomeTaxArgs {
    #[arg(long, default_value_t = 75_000.0, help = "Gross annual income")]
    pub income: f64,
    #[arg(long, value_enum, default_value_t = FilingStatusArg::Single)]
    pub filing_status: FilingStatusArg,
    #[arg(long, default_value_t = 0.0, help = "Itemized deductions")]
    pub deduction: f64,
}

impl Default for IncomeTaxArgs {
    fn default() -> Self {
        Self {
            income: 75_000.0,
            filing_status: FilingStatusArg::Single,
            deduction: 0.0,
        }
    }
}

impl Calculation for IncomeTaxArgs {
    type Output = IncomeTaxAssessment;

    fn calculate(self) -> Result<IncomeTaxAssessment, InputError> {
        Ok(crate::core::compute_tax(
            non_negative("income", self.income)?,
            self.filing_status.into(),
            non_negative("deduction", self.deduction)?,
        ))
    }
}

#[derive(Args, Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CapitalGainsArgs {
    #[arg(long, default_value_t = 10_000.0)]
    pub purchase_price: f64,
    #[arg(long, default_value_t = 15_000.0)]
    pub sale_price: f64,
    #[arg(long, default_value_t = 12)]
    pub holding_months: u32,
    #[arg(long, value_enum, default_value_t = FilingStatusArg::Single)]
    pub filing_status: FilingStatusArg,
    #[arg(long, default_value_t = 75_000.0, help = "Taxable ordinary income")]
    pub ordinary_income: f64,
}

impl Default for CapitalGainsArgs {
    fn default() -> Self {
        Self {
            purchase_price: 10_000.0,
            sale_price: 15_000.0,
            holding_months: 12,
            filing_status: FilingStatusArg::Single,
            ordinary_income: 75_000.0,
        }
    }
}

impl Calculation for CapitalGainsArgs {
    type Output = CapitalGainsAssessment;

    fn calculate(self) -> Result<CapitalGainsAssessment, InputError> {
        Ok(CapitalGainsTax.evaluate(&CapitalGainInput {
            purchase_price: non_negative("purchase-price", self.purchase_price)?,
            sale_price: non_negative("sale-price", self.sale_price)?,
            holding_months: self.holding_months,
            filing_status: self.filing_status.into(),
            ordinary_income: non_negative("ordinary-income", self.ordinary_income)?,
        }))
    }
}

#[derive(Args, Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SelfEmploymentArgs {
    #[arg(long, default_value_t = 60_000.0)]
    pub net_earnings: f64,
    #[arg(long, default_value_t = 0.0, help = "W-2 wages subject to Social Security")]
    pub other_wages: f64,
}

impl Default for SelfEmploymentArgs {
    fn default() -> Self {
        Self {
            net_earnings: 60_000.0,
            other_wages: 0.0,
        }
    }
}

impl Calculation for SelfEmploymentArgs {
    type Output = SelfEmploymentAssessment;

    fn calculate(self) -> Result<SelfEmploymentAssessment, InputError> {
        Ok(SelfEmploymentTax::default().evaluate(&SelfEmploymentInput {
            net_earnings: non_negative("net-earnings", self.net_earnings)?,
            other_wages: non_negative("other-wages", self.other_wages)?,
        }))
    }
}

#[derive(Args, Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TaxRefundArgs {
    #[arg(long, default_value_t = 75_000.0)]
    pub income: f64,
    #[arg(long, value_enum, default_value_t = FilingStatusArg::Single)]
    pub filing_status: FilingStatusArg,
    #[arg(long, default_value_t = 9_000.0, help = "Federal tax withheld this year")]
    pub withholding: f64,
    #[arg(long, default_value_t = 0.0)]
    pub deduction: f64,
    #[arg(long, default_value_t = 0.0, help = "Nonrefundable credits")]
    pub credits: f64,
}

impl Default for TaxRefundArgs {
    fn default() -> Self {
        Self {
            income: 75_000.0,
            filing_status: FilingStatusArg::Single,
            withholding: 9_000.0,
            deduction: 0.0,
            credits: 0.0,
        }
    }
}

impl Calculation for TaxRefundArgs {
    type Output = RefundEstimate;

    fn calculate(self) -> Result<RefundEstimate, InputError> {
        Ok(crate::core::tax::estimate_refund(&RefundInput {
            income: non_negative("income", self.income)?,
            filing_status: self.filing_status.into(),
            withholding: non_negative("withholding", self.withholding)?,
            deduction: non_negative("deduction", self.deduction)?,
            credits: non_negative("credits", self.credits)?,
        }))
    }
}

#[derive(Args, Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SocialSecurityArgs {
    #[arg(long, help = "Average indexed monthly earnings")]
    pub aime: Option<f64>,
    #[arg(
        long,
        value_delimiter = ',',
        help = "Annual indexed earnings history, used when --aime is absent"
    )]
    #[serde(deserialize_with = "item_list")]
    pub earnings: Vec<f64>,
    #[arg(long, default_value_t = 67.0)]
    pub claiming_age: f64,
    #[arg(long, default_value_t = social_security::DEFAULT_FULL_RETIREMENT_AGE)]
    pub full_retirement_age: f64,
}

impl Default for SocialSecurityArgs {
    fn default() -> Self {
        Self {
            aime: None,
            earnings: Vec::new(),
            claiming_age: 67.0,
            full_retirement_age: social_security::DEFAULT_FULL_RETIREMENT_AGE,
        }
    }
}

impl Calculation for SocialSecurityArgs {
    type Output = BenefitEstimate;

    fn calculate(self) -> Result<BenefitEstimate, InputError> {
        let aime = match self.aime {
            Some(aime) => non_negative("aime", aime)?,
            None if self.earnings.is_empty() => return Err(InputError::Missing { arg: "aime" }),
            None => {
                for value in &self.earnings {
                    non_negative("earnings", *value)?;
                }
                social_security::average_indexed_monthly_earnings(&self.earnings)
            }
        };
        let full_retirement_age = finite("full-retirement-age", self.full_retirement_age)?;
        if !(social_security::EARLIEST_CLAIMING_AGE..=social_security::LATEST_CLAIMING_AGE)
            .contains(&full_retirement_age)
        {
            return Err(InputError::out_of_range("full-retirement-age", "between 62 and 70"));
        }
        Ok(social_security::estimate_benefit(
            aime,
            finite("claiming-age", self.claiming_age)?,
            full_retirement_age,
        ))
    }
}

#[derive(Args, Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HomeEquityArgs {
    #[arg(long, default_value_t = 500_000.0)]
    pub home_value: f64,
    #[arg(long, default_value_t = 300_000.0)]
    pub mortgage_balance: f64,
    #[arg(long, default_value_t = 80.0, help = "Maximum combined loan-to-value in percent")]
    pub max_ltv: f64,
    #[arg(long, help = "Also price a home equity line with this balance")]
    pub heloc_balance: Option<f64>,
    #[arg(long, default_value_t = 9.0)]
    pub heloc_rate: f64,
    #[arg(long, help = "Repay the line over 20 years instead of interest-only")]
    pub amortizing: bool,
}

impl Default for HomeEquityArgs {
    fn default() -> Self {
        Self {
            home_value: 500_000.0,
            mortgage_balance: 300_000.0,
            max_ltv: 80.0,
            heloc_balance: None,
            heloc_rate: 9.0,
            amortizing: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeEquityReport {
    #[serde(flatten)]
    pub equity: HomeEquity,
    pub heloc: Option<HelocPayment>,
}

impl Calculation for HomeEquityArgs {
    type Output = HomeEquityReport;

    fn calculate(self) -> Result<HomeEquityReport, InputError> {
        let equity = amortization::home_equity(
            positive("home-value", self.home_value)?,
            non_negative("mortgage-balance", self.mortgage_balance)?,
            percent("max-ltv", self.max_ltv)?,
        );
        let heloc_rate = percent("heloc-rate", self.heloc_rate)?;
        let heloc = self
            .heloc_balance
            .map(|balance| non_negative("heloc-balance", balance))
            .transpose()?
            .map(|balance| amortization::heloc_payment(balance, heloc_rate, !self.amortizing));
        Ok(HomeEquityReport { equity, heloc })
    }
}

#[derive(Args, Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RetirementIncomeArgs {
    #[arg(long, default_value_t = 1_000_000.0)]
    pub savings: f64,
    #[arg(long, default_value_t = 2_000.0, help = "Monthly Social Security benefit")]
    pub social_security: f64,
    #[arg(long, default_value_t = 0.0, help = "Monthly pension")]
    pub pension: f64,
    #[arg(long, default_value_t = 0.0, help = "Other monthly income")]
    pub other_income: f64,
    #[arg(long, default_value_t = 4.0)]
    pub withdrawal_rate: f64,
    #[arg(long, help = "Monthly income to plan for; savings cover what other sources do not")]
    pub target_monthly_income: Option<f64>,
    #[arg(long, default_value_t = 5.0, help = "Annual return in retirement, percent")]
    pub annual_return: f64,
    #[arg(long, default_value_t = 2.5, help = "Annual inflation in percent")]
    pub inflation: f64,
}

impl Default for RetirementIncomeArgs {
    fn default() -> Self {
        Self {
            savings: 1_000_000.0,
            social_security: 2_000.0,
            pension: 0.0,
            other_income: 0.0,
            withdrawal_rate: 4.0,
            target_monthly_income: None,
            annual_return: 5.0,
            inflation: 2.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RetirementIncomeReport {
    #[serde(flatten)]
    pub income: RetirementIncome,
    pub required: Option<RequiredSavings>,
    pub drawdown: RetirementDrawdown,
}

impl Calculation for RetirementIncomeArgs {
    type Output = RetirementIncomeReport;

    fn calculate(self) -> Result<RetirementIncomeReport, InputError> {
        let savings = non_negative("savings", self.savings)?;
        let social_security = non_negative("social-security", self.social_security)?;
        let pension = non_negative("pension", self.pension)?;
        let other_income = non_negative("other-income", self.other_income)?;
        let withdrawal_rate = percent("withdrawal-rate", self.withdrawal_rate)?;
        if withdrawal_rate <= 0.0 {
            return Err(InputError::out_of_range("withdrawal-rate", "> 0"));
        }
        let target = self
            .target_monthly_income
            .map(|income| non_negative("target-monthly-income", income))
            .transpose()?;

        let income = growth::retirement_income(
            savings,
            social_security,
            pension,
            other_income,
            withdrawal_rate,
        );
        let drawn_from_savings = match target {
            Some(target) => (target - social_security - pension - other_income).max(0.0),
            None => income.monthly.savings_withdrawal,
        };
        let drawdown = growth::project_drawdown(
            savings,
            drawn_from_savings,
            return_percent("annual-return", self.annual_return)?,
            return_percent("inflation", self.inflation)?,
        );
        Ok(RetirementIncomeReport {
            income,
            required: target.map(|target| {
                growth::required_savings(target, social_security, pension, withdrawal_rate)
            }),
            drawdown,
        })
    }
}

#[derive(Args, Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StockReturnArgs {
    #[arg(long, default_value_t = 50.0, help = "Price per share at purchase")]
    pub purchase_price: f64,
    #[arg(long, default_value_t = 100.0)]
    pub shares: f64,
    #[arg(long, default_value_t = 75.0)]
    pub current_price: f64,
    #[arg(long, default_value_t = 0.0, help = "Total dividends received")]
    pub dividends: f64,
    #[arg(long)]
    pub reinvest_dividends: bool,
    #[arg(
        long = "lot",
        value_name = "PRICE:SHARES",
        help = "A purchase lot for the cost basis; repeat for each one"
    )]
    #[serde(deserialize_with = "item_list")]
    pub lots: Vec<LotArg>,
}

impl Default for StockReturnArgs {
    fn default() -> Self {
        Self {
            purchase_price: 50.0,
            shares: 100.0,
            current_price: 75.0,
            dividends: 0.0,
            reinvest_dividends: false,
            lots: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockReturnReport {
    #[serde(flatten)]
    pub returns: StockReturn,
    pub cost_basis: Option<CostBasis>,
}

impl Calculation for StockReturnArgs {
    type Output = StockReturnReport;

    fn calculate(self) -> Result<StockReturnReport, InputError> {
        let returns = growth::stock_return(&StockPosition {
            purchase_price: positive("purchase-price", self.purchase_price)?,
            shares: positive("shares", self.shares)?,
            current_price: non_negative("current-price", self.current_price)?,
            dividends: non_negative("dividends", self.dividends)?,
            dividends_reinvested: self.reinvest_dividends,
        });
        let lots = self
            .lots
            .iter()
            .map(LotArg::validate)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(StockReturnReport {
            returns,
            cost_basis: (!lots.is_empty()).then(|| growth::cost_basis(&lots)),
        })
    }
}

#[derive(Args, Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InvestmentComparisonArgs {
    #[arg(
        long = "investment",
        value_name = "NAME:INITIAL:FINAL:YEARS[:DIVIDENDS]",
        help = "A holding to compare; repeat for each one"
    )]
    #[serde(deserialize_with = "item_list")]
    pub investments: Vec<InvestmentArg>,
}

impl Calculation for InvestmentComparisonArgs {
    type Output = InvestmentComparison;

    fn calculate(self) -> Result<InvestmentComparison, InputError> {
        if self.investments.is_empty() {
            return Err(InputError::Missing { arg: "investment" });
        }
        let investments = self
            .investments
            .iter()
            .map(InvestmentArg::validate)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(growth::compare_investments(&investments))
    }
}
