use clap::{Parser, Subcommand};
use std::net::IpAddr;
use std::process::ExitCode;
use tracing::error;

use fincalc::api::{
    self, AffordabilityArgs, AmortizationArgs, AutoLoanArgs, Calculation, CapitalGainsArgs,
    CompoundInterestArgs, CreditCardArgs, DebtPayoffArgs, HomeEquityArgs, IncomeTaxArgs,
    InvestmentComparisonArgs, InvestmentReturnArgs, IraArgs, LoanPayoffArgs, MortgageArgs,
    RefinanceArgs, Retirement401kArgs, RetirementArgs, RetirementIncomeArgs, SelfEmploymentArgs,
    SocialSecurityArgs, StockReturnArgs, TaxDeferredArgs, TaxRefundArgs,
};
use fincalc::logging;

/// Exit status for rejected calculator input.
const INPUT_ERROR_EXIT: u8 = 2;

#[derive(Parser, Debug)]
#[command(
    name = "fincalc",
    version,
    about = "Loan, debt payoff, investment growth, tax and Social Security calculators"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve every calculator as a JSON HTTP API
    Serve(ServeArgs),
    /// Monthly mortgage payment with taxes, insurance and PMI
    Mortgage(MortgageArgs),
    /// Largest mortgage and home price a monthly budget supports
    Affordability(AffordabilityArgs),
    /// Month-by-month amortization schedule for a fixed-rate loan
    Amortization(AmortizationArgs),
    /// Effect of an extra monthly payment on an existing loan
    LoanPayoff(LoanPayoffArgs),
    /// Credit card payoff at the minimum or a chosen payment
    CreditCard(CreditCardArgs),
    /// Auto loan financing including tax, fees and trade-in
    AutoLoan(AutoLoanArgs),
    /// Whether refinancing pays off and when it breaks even
    Refinance(RefinanceArgs),
    /// Home equity available to borrow and HELOC payments
    HomeEquity(HomeEquityArgs),
    /// Avalanche versus snowball payoff of several debts
    DebtPayoff(DebtPayoffArgs),
    /// Compound growth with monthly contributions
    CompoundInterest(CompoundInterestArgs),
    /// Traditional, Roth and taxable account growth compared
    TaxDeferred(TaxDeferredArgs),
    /// 401(k) growth with an employer match
    #[command(name = "401k")]
    Retirement401k(Retirement401kArgs),
    /// Traditional versus Roth IRA
    Ira(IraArgs),
    /// Retirement savings gap and how long savings last
    Retirement(RetirementArgs),
    /// Retirement income by source, savings needed and drawdown
    RetirementIncome(RetirementIncomeArgs),
    /// Total return and CAGR of an investment
    InvestmentReturn(InvestmentReturnArgs),
    /// Returns of several investments side by side
    InvestmentComparison(InvestmentComparisonArgs),
    /// Stock return with dividends and cost basis
    StockReturn(StockReturnArgs),
    /// Federal income tax by bracket
    IncomeTax(IncomeTaxArgs),
    /// Tax on a capital gain
    CapitalGains(CapitalGainsArgs),
    /// Self-employment tax
    SelfEmploymentTax(SelfEmploymentArgs),
    /// Expected refund or balance due
    TaxRefund(TaxRefundArgs),
    /// Social Security benefit by claiming age
    SocialSecurity(SocialSecurityArgs),
}

#[derive(clap::Args, Debug)]
struct ServeArgs {
    #[arg(long, env = "FINCALC_PORT", default_value_t = 8080)]
    port: u16,
    #[arg(long, env = "FINCALC_BIND", default_value = "0.0.0.0")]
    bind: IpAddr,
}

#[tokio::main]
async fn main() -> ExitCode {
    logging::init();

    match Cli::parse().command {
        Command::Serve(args) => serve(args).await,
        Command::Mortgage(args) => print(args),
        Command::Affordability(args) => print(args),
        Command::Amortization(args) => print(args),
        Command::LoanPayoff(args) => print(args),
        Command::CreditCard(args) => print(args),
        Command::AutoLoan(args) => print(args),
        Command::Refinance(args) => print(args),
        Command::HomeEquity(args) => print(args),
        Command::DebtPayoff(args) => print(args),
        Command::CompoundInterest(args) => print(args),
        Command::TaxDeferred(args) => print(args),
        Command::Retirement401k(args) => print(args),
        Command::Ira(args) => print(args),
        Command::Retirement(args) => print(args),
        Command::RetirementIncome(args) => print(args),
        Command::InvestmentReturn(args) => print(args),
        Command::InvestmentComparison(args) => print(args),
        Command::StockReturn(args) => print(args),
        Command::IncomeTax(args) => print(args),
        Command::CapitalGains(args) => print(args),
        Command::SelfEmploymentTax(args) => print(args),
        Command::TaxRefund(args) => print(args),
        Command::SocialSecurity(args) => print(args),
    }
}

async fn serve(args: ServeArgs) -> ExitCode {
    match api::run_http_server(args.bind, args.port).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "server error");
            ExitCode::FAILURE
        }
    }
}

fn print<C: Calculation>(args: C) -> ExitCode {
    let output = match args.calculate() {
        Ok(output) => output,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(INPUT_ERROR_EXIT);
        }
    };
    match serde_json::to_string_pretty(&output) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "failed to encode result");
            ExitCode::FAILURE
        }
    }
}
