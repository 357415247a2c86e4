use chrono::NaiveDate;
use fincalc_core::mortgage::amortization::{
    compute_amortization_schedule, compute_baseline_schedule, max_schedule_periods,
};
use fincalc_core::mortgage::loan::{
    ExtraPaymentPolicy, InterestAccrual, LoanParameters, OneTimePayment, PaymentFrequency,
};
use fincalc_core::mortgage::payoff::{analyze_payoff, PayoffInput};
use fincalc_core::summary::{summarize, Projection, SummaryMetrics};
use fincalc_core::CalcError;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn thirty_year() -> LoanParameters {
    LoanParameters {
        principal: dec!(300_000),
        annual_rate_percent: dec!(6),
        term_years: 30,
        start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        payment_frequency: PaymentFrequency::Monthly,
        interest_accrual: InterestAccrual::MonthlyRate,
    }
}

fn mixed_policy() -> ExtraPaymentPolicy {
    ExtraPaymentPolicy {
        recurring_extra: dec!(150),
        one_time: Some(OneTimePayment {
            amount: dec!(20_000),
            date: NaiveDate::from_ymd_opt(2027, 6, 15).unwrap(),
        }),
        round_up_enabled: true,
        round_up_increment: dec!(50),
    }
}

// ===========================================================================
// Schedule invariants
// ===========================================================================

#[test]
fn test_balance_is_non_increasing_and_ends_at_zero() {
    let schedule = compute_amortization_schedule(&thirty_year(), &mixed_policy()).unwrap();
    let mut previous = dec!(300_000);
    for entry in &schedule {
        assert!(entry.remaining_balance <= previous);
        assert!(entry.remaining_balance >= Decimal::ZERO);
        previous = entry.remaining_balance;
    }
    assert_eq!(schedule.last().unwrap().remaining_balance, Decimal::ZERO);
}

#[test]
fn test_cumulative_interest_is_non_decreasing() {
    let schedule = compute_amortization_schedule(&thirty_year(), &mixed_policy()).unwrap();
    assert!(schedule
        .windows(2)
        .all(|w| w[1].cumulative_interest >= w[0].cumulative_interest));
    let summed: Decimal = schedule.iter().map(|e| e.interest_portion).sum();
    assert_eq!(summed, schedule.last().unwrap().cumulative_interest);
}

#[test]
fn test_principal_is_conserved() {
    for policy in [ExtraPaymentPolicy::none(), ExtraPaymentPolicy::recurring(dec!(450)), mixed_policy()] {
        let schedule = compute_amortization_schedule(&thirty_year(), &policy).unwrap();
        let repaid: Decimal = schedule
            .iter()
            .map(|e| e.principal_portion + e.extra_applied)
            .sum();
        assert!((repaid - dec!(300_000)).abs() < dec!(0.000001), "repaid {repaid}");
    }
}

#[test]
fn test_one_time_payment_lands_in_its_month() {
    let schedule = compute_amortization_schedule(&thirty_year(), &mixed_policy()).unwrap();
    let june = schedule
        .iter()
        .find(|e| e.date == NaiveDate::from_ymd_opt(2027, 6, 1).unwrap())
        .unwrap();
    assert!(june.extra_applied > dec!(20_150));
    assert!(june.extra_applied < dec!(20_200));
}

#[test]
fn test_projection_is_idempotent() {
    let a = compute_amortization_schedule(&thirty_year(), &mixed_policy()).unwrap();
    let b = compute_amortization_schedule(&thirty_year(), &mixed_policy()).unwrap();
    assert_eq!(a, b);
}

// ===========================================================================
// Baseline comparison
// ===========================================================================

#[test]
fn test_extra_payments_never_increase_interest() {
    let loan = thirty_year();
    let baseline = compute_baseline_schedule(&loan).unwrap();
    for extra in [dec!(0), dec!(1), dec!(50), dec!(200), dec!(5_000)] {
        let schedule = compute_amortization_schedule(&loan, &ExtraPaymentPolicy::recurring(extra)).unwrap();
        let metrics = summarize(Projection::Loan {
            schedule: &schedule,
            baseline: Some(&baseline),
            frequency: PaymentFrequency::Monthly,
        })
        .unwrap();
        let SummaryMetrics::Payoff(cmp) = metrics else {
            panic!("expected a payoff comparison");
        };
        assert!(cmp.interest_saved >= Decimal::ZERO, "extra {extra}");
        assert!(cmp.periods_saved >= 0);
    }
}

#[test]
fn test_reference_mortgage_scenario() {
    let out = analyze_payoff(&PayoffInput {
        loan: thirty_year(),
        extra: ExtraPaymentPolicy::recurring(dec!(200)),
        include_schedule: false,
    })
    .unwrap();
    let cmp = &out.result.comparison;

    assert_eq!(cmp.baseline.number_of_payments, 360);
    assert_eq!(cmp.baseline.years_to_payoff, dec!(30));
    assert!((cmp.baseline.total_interest_paid - dec!(347_514.57)).abs() < dec!(0.05));

    assert_eq!(cmp.accelerated.number_of_payments, 279);
    assert_eq!(cmp.accelerated.years_to_payoff, dec!(23.25));
    assert!((cmp.accelerated.total_interest_paid - dec!(256_341.13)).abs() < dec!(0.05));
    assert_eq!(cmp.accelerated.total_extra_paid, dec!(200) * dec!(278));
}

// ===========================================================================
// Edge cases
// ===========================================================================

#[test]
fn test_zero_rate_payment_is_principal_over_periods() {
    let mut loan = thirty_year();
    loan.annual_rate_percent = Decimal::ZERO;
    loan.principal = dec!(180_000);
    loan.term_years = 15;
    assert_eq!(loan.monthly_payment().unwrap(), dec!(1_000));

    let schedule = compute_baseline_schedule(&loan).unwrap();
    assert_eq!(schedule.len(), 180);
    assert!(schedule.iter().all(|e| e.interest_portion == Decimal::ZERO));
    assert_eq!(schedule.last().unwrap().cumulative_interest, Decimal::ZERO);
}

#[test]
fn test_huge_extra_pays_off_in_first_period() {
    let schedule =
        compute_amortization_schedule(&thirty_year(), &ExtraPaymentPolicy::recurring(dec!(1_000_000)))
            .unwrap();
    assert_eq!(schedule.len(), 1);
    assert_eq!(schedule[0].principal_portion, dec!(300_000));
    assert_eq!(schedule[0].extra_applied, Decimal::ZERO);
    assert_eq!(schedule[0].remaining_balance, Decimal::ZERO);
}

#[test]
fn test_negative_amortization_is_an_error() {
    let mut loan = thirty_year();
    loan.payment_frequency = PaymentFrequency::Weekly;
    let err = compute_baseline_schedule(&loan).unwrap_err();
    match err {
        CalcError::NonConvergence {
            remaining_balance, ..
        } => assert_eq!(remaining_balance, dec!(300_000)),
        other => panic!("expected non-convergence, got {other}"),
    }
}

#[test]
fn test_schedule_length_is_bounded() {
    let mut loan = thirty_year();
    loan.payment_frequency = PaymentFrequency::Weekly;
    loan.interest_accrual = InterestAccrual::PerPeriod;
    let schedule = compute_baseline_schedule(&loan).unwrap();
    assert!(schedule.len() as u32 <= max_schedule_periods(&loan));
}

#[test]
fn test_slow_amortization_stops_at_period_cap() {
    // At 2.06% the biweekly split payment clears interest by under a dollar,
    // so the balance is still large when the cap is reached.
    let mut loan = thirty_year();
    loan.annual_rate_percent = dec!(2.06);
    loan.payment_frequency = PaymentFrequency::Biweekly;
    let cap = max_schedule_periods(&loan);
    assert_eq!(cap, 130 * 26);

    match compute_baseline_schedule(&loan) {
        Err(CalcError::NonConvergence {
            iterations,
            remaining_balance,
            ..
        }) => {
            assert_eq!(iterations, cap);
            assert!(remaining_balance > dec!(100_000), "left {remaining_balance}");
        }
        other => panic!("expected NonConvergence, got {other:?}"),
    }
}

#[test]
fn test_long_term_loan_within_bounds_pays_off() {
    let mut loan = thirty_year();
    loan.annual_rate_percent = Decimal::ZERO;
    loan.term_years = 120;
    let schedule = compute_baseline_schedule(&loan).unwrap();
    assert_eq!(schedule.len(), 1440);
    assert_eq!(schedule.last().unwrap().remaining_balance, Decimal::ZERO);
}

#[test]
fn test_extreme_rates_are_errors_not_panics() {
    let mut loan = thirty_year();
    loan.annual_rate_percent = dec!(500);
    assert!(matches!(
        compute_baseline_schedule(&loan),
        Err(CalcError::InvalidInput { .. })
    ));

    loan.annual_rate_percent = dec!(100);
    loan.term_years = 200;
    assert!(matches!(
        compute_amortization_schedule(&loan, &mixed_policy()),
        Err(CalcError::InvalidInput { .. })
    ));
}

#[test]
fn test_invalid_loans_rejected() {
    let mut loan = thirty_year();
    loan.principal = dec!(-1);
    assert!(matches!(
        compute_baseline_schedule(&loan),
        Err(CalcError::InvalidInput { .. })
    ));
}

#[test]
fn test_payoff_input_from_json() {
    let input: PayoffInput = serde_json::from_str(
        r#"{
            "loan": {
                "principal": "250000",
                "annual_rate_percent": "5.5",
                "term_years": 30,
                "start_date": "2025-03-01",
                "payment_frequency": "biweekly",
                "interest_accrual": "per_period"
            },
            "extra": { "recurring_extra": "50" }
        }"#,
    )
    .unwrap();
    assert!(input.include_schedule);
    let out = analyze_payoff(&input).unwrap();
    assert_eq!(out.result.payment_frequency, PaymentFrequency::Biweekly);
    assert!(out.result.comparison.time_saved_years > Decimal::ZERO);
}
