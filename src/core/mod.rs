pub mod amortization;
pub mod debt;
pub mod growth;
pub mod rounding;
pub mod social_security;
pub mod tax;
mod types;

pub use amortization::{
    AmortizationResult, Amortizer, FixedPaymentAmortizer, StandardAmortizer, amortize,
};
pub use debt::{PayoffPlan, PayoffStrategy, StrategyComparison};
pub use growth::{
    CompoundProjector, GrowthProjector, RothAccount, TaxableAccount, TraditionalAccount, project,
};
pub use social_security::{BenefitEstimate, estimate_benefit};
pub use tax::{FederalIncomeTax, TaxEvaluator, compute_tax};
pub use types::{
    AmortizationRow, BracketSlice, Debt, FilingStatus, GrowthPoint, GrowthProjection,
    GrowthScenario, LoanTerms, MAX_PERIODS, PayoffStatus, TaxBracket,
};
