use serde::Serialize;
use tracing::{debug, warn};

use super::rounding::money;
use super::types::{Debt, MAX_PERIODS};

/// Avalanche must beat snowball by more than this share of snowball's
/// interest before it is recommended.
const AVALANCHE_MARGIN: f64 = 0.95;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PayoffStrategy {
    /// Highest rate first.
    Avalanche,
    /// Smallest balance first.
    Snowball,
}

impl PayoffStrategy {
    pub fn order(self, debts: &[Debt]) -> Vec<Debt> {
        let mut ordered = debts.to_vec();
        match self {
            PayoffStrategy::Avalanche => {
                ordered.sort_by(|a, b| b.annual_rate.total_cmp(&a.annual_rate))
            }
            PayoffStrategy::Snowball => ordered.sort_by(|a, b| a.balance.total_cmp(&b.balance)),
        }
        ordered
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebtPayment {
    pub name: String,
    #[serde(serialize_with = "money")]
    pub payment: f64,
    #[serde(serialize_with = "money")]
    pub interest: f64,
    #[serde(serialize_with = "money")]
    pub remaining: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebtMonth {
    pub month: u32,
    #[serde(serialize_with = "money")]
    pub total_paid: f64,
    pub payments: Vec<DebtPayment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoffEvent {
    pub name: String,
    pub month: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoffPlan {
    pub strategy: PayoffStrategy,
    pub ordered_debts: Vec<String>,
    pub months: u32,
    #[serde(serialize_with = "money")]
    pub total_interest: f64,
    #[serde(serialize_with = "money")]
    pub total_paid: f64,
    #[serde(serialize_with = "money")]
    pub remaining_balance: f64,
    pub paid_off: bool,
    pub payoff_order: Vec<PayoffEvent>,
    pub schedule: Vec<DebtMonth>,
}

impl PayoffPlan {
    pub fn payoff_month(&self, name: &str) -> Option<u32> {
        self.payoff_order
            .iter()
            .find(|event| event.name == name)
            .map(|event| event.month)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyComparison {
    pub avalanche: PayoffPlan,
    pub snowball: PayoffPlan,
    /// Snowball interest minus avalanche interest.
    #[serde(serialize_with = "money")]
    pub interest_saved: f64,
    pub months_saved: i64,
    pub recommended: PayoffStrategy,
}

pub fn avalanche(debts: &[Debt], extra_payment: f64) -> PayoffPlan {
    simulate(debts, extra_payment, PayoffStrategy::Avalanche)
}

pub fn snowball(debts: &[Debt], extra_payment: f64) -> PayoffPlan {
    simulate(debts, extra_payment, PayoffStrategy::Snowball)
}

/// Month-by-month payoff. Each month every open debt accrues interest and
/// receives its minimum; the pool (extra payment, minimums freed by debts
/// already retired, and minimum capacity a nearly-finished debt could not
/// absorb) goes to open debts in strategy order.
pub fn simulate(debts: &[Debt], extra_payment: f64, strategy: PayoffStrategy) -> PayoffPlan {
    let ordered = strategy.order(debts);
    let mut remaining: Vec<f64> = ordered.iter().map(|d| d.balance.max(0.0)).collect();
    let extra = extra_payment.max(0.0);

    let mut payoff_order = Vec::new();
    let mut freed_minimums = 0.0;
    for (debt, balance) in ordered.iter().zip(&remaining) {
        if *balance <= 0.0 {
            payoff_order.push(PayoffEvent {
                name: debt.name.clone(),
                month: 0,
            });
            freed_minimums += debt.minimum_payment.max(0.0);
        }
    }

    let mut month = 0;
    let mut total_interest = 0.0;
    let mut total_paid = 0.0;
    let mut schedule = Vec::new();

    while remaining.iter().any(|b| *b > 0.0) && month < MAX_PERIODS {
        month += 1;
        let active: Vec<bool> = remaining.iter().map(|b| *b > 0.0).collect();
        let mut interest = vec![0.0; ordered.len()];
        let mut paid = vec![0.0; ordered.len()];
        let mut pool = extra + freed_minimums;

        for (idx, debt) in ordered.iter().enumerate() {
            if !active[idx] {
                continue;
            }
            interest[idx] = remaining[idx] * debt.annual_rate / 12.0;
            remaining[idx] += interest[idx];

            let minimum = debt.minimum_payment.max(0.0);
            let payment = minimum.min(remaining[idx]);
            remaining[idx] -= payment;
            paid[idx] = payment;
            pool += minimum - payment;
        }

        for idx in 0..ordered.len() {
            if pool <= 0.0 {
                break;
            }
            if remaining[idx] <= 0.0 {
                continue;
            }
            let payment = pool.min(remaining[idx]);
            remaining[idx] -= payment;
            paid[idx] += payment;
            pool -= payment;
        }

        let mut payments = Vec::new();
        for (idx, debt) in ordered.iter().enumerate() {
            if !active[idx] {
                continue;
            }
            if remaining[idx] <= 0.0 {
                remaining[idx] = 0.0;
                payoff_order.push(PayoffEvent {
                    name: debt.name.clone(),
                    month,
                });
                freed_minimums += debt.minimum_payment.max(0.0);
            }
            payments.push(DebtPayment {
                name: debt.name.clone(),
                payment: paid[idx],
                interest: interest[idx],
                remaining: remaining[idx],
            });
        }

        let month_interest: f64 = interest.iter().sum();
        let month_paid: f64 = paid.iter().sum();
        total_interest += month_interest;
        total_paid += month_paid;
        schedule.push(DebtMonth {
            month,
            total_paid: month_paid,
            payments,
        });
    }

    let remaining_balance: f64 = remaining.iter().sum();
    let paid_off = remaining_balance <= 0.0;
    if !paid_off {
        warn!(
            ?strategy,
            remaining_balance, "debts not retired within the month cap"
        );
    }
    debug!(?strategy, months = month, total_interest, "debt payoff simulated");

    PayoffPlan {
        strategy,
        ordered_debts: ordered.iter().map(|d| d.name.clone()).collect(),
        months: month,
        total_interest,
        total_paid,
        remaining_balance,
        paid_off,
        payoff_order,
        schedule,
    }
}

pub fn compare(debts: &[Debt], extra_payment: f64) -> StrategyComparison {
    let avalanche = avalanche(debts, extra_payment);
    let snowball = snowball(debts, extra_payment);

    let recommended = if avalanche.total_interest < snowball.total_interest * AVALANCHE_MARGIN {
        PayoffStrategy::Avalanche
    } else {
        PayoffStrategy::Snowball
    };

    StrategyComparison {
        interest_saved: snowball.total_interest - avalanche.total_interest,
        months_saved: snowball.months as i64 - avalanche.months as i64,
        recommended,
        avalanche,
        snowball,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::collection::vec;
    use proptest::prelude::{prop_assert, proptest};

    fn cards() -> Vec<Debt> {
        vec![
            Debt::new("Visa", 5_000.0, 0.22, 150.0),
            Debt::new("Store card", 2_000.0, 0.18, 80.0),
        ]
    }

    #[test]
    fn strategies_order_debts() {
        let debts = vec![
            Debt::new("a", 3_000.0, 0.10, 50.0),
            Debt::new("b", 1_000.0, 0.05, 50.0),
            Debt::new("c", 8_000.0, 0.25, 50.0),
        ];
        let names = |ordered: Vec<Debt>| ordered.into_iter().map(|d| d.name).collect::<Vec<_>>();
        assert_eq!(names(PayoffStrategy::Avalanche.order(&debts)), ["c", "a", "b"]);
        assert_eq!(names(PayoffStrategy::Snowball.order(&debts)), ["b", "a", "c"]);
    }

    #[test]
    fn avalanche_retires_the_expensive_card_sooner_and_saves_interest() {
        let comparison = compare(&cards(), 100.0);
        assert!(comparison.interest_saved > 0.0);
        assert!(comparison.avalanche.paid_off);
        assert!(comparison.snowball.paid_off);

        let avalanche_visa = comparison.avalanche.payoff_month("Visa").expect("visa retired");
        let snowball_visa = comparison.snowball.payoff_month("Visa").expect("visa retired");
        assert!(avalanche_visa < snowball_visa);
        assert_eq!(comparison.avalanche.ordered_debts, ["Visa", "Store card"]);
        assert_eq!(comparison.snowball.ordered_debts, ["Store card", "Visa"]);
    }

    #[test]
    fn freed_minimums_roll_into_the_next_debt() {
        let debts = vec![
            Debt::new("small", 100.0, 0.0, 50.0),
            Debt::new("large", 1_000.0, 0.0, 50.0),
        ];
        let plan = snowball(&debts, 0.0);
        // Month 1-2: 50 each. Month 3 onwards: 100/month to the large debt.
        assert_eq!(plan.payoff_month("small"), Some(2));
        assert_eq!(plan.payoff_month("large"), Some(11));
        assert_eq!(plan.months, 11);
        assert!((plan.schedule[2].payments[0].payment - 100.0).abs() < 1e-9);
    }

    #[test]
    fn monthly_budget_stays_constant_until_the_final_month() {
        let plan = avalanche(&cards(), 100.0);
        let budget = 150.0 + 80.0 + 100.0;
        let last = plan.schedule.len() - 1;
        for month in &plan.schedule[..last] {
            assert!((month.total_paid - budget).abs() < 1e-6, "month {}", month.month);
        }
        assert!(plan.schedule[last].total_paid <= budget + 1e-9);
    }

    #[test]
    fn total_paid_is_principal_plus_interest() {
        let plan = snowball(&cards(), 100.0);
        assert!((plan.total_paid - (7_000.0 + plan.total_interest)).abs() < 1e-6);
    }

    #[test]
    fn large_rate_gap_recommends_avalanche() {
        let debts = vec![
            Debt::new("cheap", 9_000.0, 0.02, 100.0),
            Debt::new("expensive", 10_000.0, 0.30, 300.0),
        ];
        let comparison = compare(&debts, 400.0);
        assert!(comparison.avalanche.total_interest < comparison.snowball.total_interest * 0.95);
        assert_eq!(comparison.recommended, PayoffStrategy::Avalanche);
    }

    #[test]
    fn equal_rates_recommend_snowball() {
        let debts = vec![
            Debt::new("one", 4_000.0, 0.15, 100.0),
            Debt::new("two", 1_500.0, 0.15, 60.0),
        ];
        let comparison = compare(&debts, 50.0);
        assert!(comparison.interest_saved.abs() < 1e-6);
        assert_eq!(comparison.recommended, PayoffStrategy::Snowball);
    }

    #[test]
    fn minimums_below_interest_hit_the_cap() {
        let debts = vec![Debt::new("stuck", 10_000.0, 0.24, 150.0)];
        let plan = avalanche(&debts, 0.0);
        assert!(!plan.paid_off);
        assert_eq!(plan.months, MAX_PERIODS);
        assert!(plan.payoff_order.is_empty());
        assert!(plan.remaining_balance > 10_000.0);
    }

    #[test]
    fn empty_and_zero_balance_debts() {
        let plan = snowball(&[], 100.0);
        assert_eq!(plan.months, 0);
        assert!(plan.paid_off);

        let debts = vec![
            Debt::new("done", 0.0, 0.2, 40.0),
            Debt::new("open", 400.0, 0.0, 10.0),
        ];
        let plan = snowball(&debts, 0.0);
        assert_eq!(plan.payoff_month("done"), Some(0));
        // 10 minimum + 40 freed from the retired debt each month.
        assert_eq!(plan.payoff_month("open"), Some(8));
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(48))]

        #[test]
        fn prop_avalanche_interest_never_exceeds_snowball(
            raw in vec((100u32..20_000, 0u32..3_000, 100u32..600), 1..5),
            extra in 0u32..500
        ) {
            let debts: Vec<Debt> = raw
                .iter()
                .enumerate()
                .map(|(idx, (balance, rate_bp, headroom_bp))| {
                    let balance = *balance as f64;
                    let rate = *rate_bp as f64 / 10_000.0;
                    let minimum = balance * (rate / 12.0 + *headroom_bp as f64 / 10_000.0);
                    Debt::new(format!("debt-{idx}"), balance, rate, minimum)
                })
                .collect();

            let comparison = compare(&debts, extra as f64);
            prop_assert!(comparison.avalanche.paid_off);
            prop_assert!(comparison.snowball.paid_off);
            let tolerance = 1e-9 * comparison.snowball.total_interest.max(1.0);
            prop_assert!(
                comparison.avalanche.total_interest <= comparison.snowball.total_interest + tolerance
            );
        }
    }
}
