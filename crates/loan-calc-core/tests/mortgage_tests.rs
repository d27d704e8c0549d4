#![cfg(feature = "mortgage")]

use loan_calc_core::annuity::round_payment;
use loan_calc_core::mortgage::ltv::{
    calculate_down_payment, clamp_down_payment, min_down_payment, DownPaymentInput,
};
use loan_calc_core::mortgage::payment::{calculate_mortgage_payment, payment_bounds, MortgagePaymentInput};
use loan_calc_core::mortgage::period::{compute_period_years_within, PeriodBoundary};
use loan_calc_core::mortgage::recompute::{recompute, run_recompute, RecomputeInput};
use loan_calc_core::mortgage::{
    compute_monthly_payment, compute_period_years, ActiveField, CalculatorState, CalculatorStatus,
    PropertyOwnership,
};
use loan_calc_core::policy::LtvTable;
use loan_calc_core::{LoanCalcError, LoanPolicy, PeriodBounds};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ===========================================================================
// Payment engine
// ===========================================================================

#[test]
fn test_reference_scenario_two_million() {
    // 2,000,000 property, 500,000 down, 25 years, 5%
    let p = compute_monthly_payment(dec!(2_000_000), dec!(500_000), dec!(25), dec!(5)).unwrap();
    assert!(p > dec!(8760) && p < dec!(8775), "payment {p}");
    assert_eq!(round_payment(p), dec!(8769));
}

#[test]
fn test_zero_rate_repays_loan_exactly() {
    for years in [1u32, 7, 12, 30] {
        let p = compute_monthly_payment(dec!(600_000), dec!(100_000), Decimal::from(years), Decimal::ZERO)
            .unwrap();
        let repaid = p * Decimal::from(years * 12);
        assert!((repaid - dec!(500_000)).abs() < dec!(0.0001), "{years}y repaid {repaid}");
    }
}

#[test]
fn test_payment_strictly_decreases_with_period() {
    let mut previous = None;
    for years in 1..=30u32 {
        let p = compute_monthly_payment(dec!(1_500_000), dec!(400_000), Decimal::from(years), dec!(4.2))
            .unwrap();
        if let Some(prev) = previous {
            assert!(p < prev, "payment at {years}y not below {}y", years - 1);
        }
        previous = Some(p);
    }
}

#[test]
fn test_payment_grows_with_rate() {
    let low = compute_monthly_payment(dec!(900_000), dec!(200_000), dec!(20), dec!(3)).unwrap();
    let high = compute_monthly_payment(dec!(900_000), dec!(200_000), dec!(20), dec!(6)).unwrap();
    assert!(high > low);
}

#[test]
fn test_payment_bounds_bracket_every_period() {
    let bounds = PeriodBounds::new(4, 30);
    let b = payment_bounds(dec!(1_200_000), dec!(300_000), dec!(5), &bounds).unwrap();
    for years in 4..=30u32 {
        let p = round_payment(
            compute_monthly_payment(dec!(1_200_000), dec!(300_000), Decimal::from(years), dec!(5)).unwrap(),
        );
        assert!(p >= b.min_payment && p <= b.max_payment, "{years}y payment {p}");
    }
}

#[test]
fn test_envelope_serializes_decimals_as_strings() {
    let input = MortgagePaymentInput {
        property_value: dec!(1_000_000),
        down_payment: dec!(200_000),
        annual_rate_percent: dec!(5),
        period_years: 30,
        include_schedule: false,
        start_date: None,
    };
    let out = calculate_mortgage_payment(&input).unwrap();
    let json = serde_json::to_value(&out).unwrap();
    assert_eq!(json["result"]["monthly_payment_rounded"], "4295");
    assert_eq!(json["result"]["number_of_payments"], 360);
}

// ===========================================================================
// Period solver
// ===========================================================================

#[test]
fn test_payment_period_round_trip() {
    for years in 1..=30u32 {
        let p = compute_monthly_payment(dec!(1_000_000), dec!(250_000), Decimal::from(years), dec!(5))
            .unwrap();
        let s = compute_period_years(dec!(1_000_000), dec!(250_000), p, dec!(5)).unwrap();
        assert_eq!(s.period_years, years, "round trip at {years}y");
        assert_eq!(s.boundary, None);
    }
}

#[test]
fn test_payment_period_round_trip_at_zero_rate() {
    for years in 1..=30u32 {
        let p = compute_monthly_payment(dec!(1_000_000), dec!(250_000), Decimal::from(years), Decimal::ZERO)
            .unwrap();
        let s = compute_period_years(dec!(1_000_000), dec!(250_000), p, Decimal::ZERO).unwrap();
        assert_eq!(s.period_years, years, "round trip at {years}y");
        assert_eq!(s.boundary, None);
    }
}

#[test]
fn test_period_is_clamped_and_flagged() {
    let bounds = PeriodBounds::new(4, 30);
    let s = compute_period_years_within(dec!(800_000), Decimal::ZERO, dec!(80_000), dec!(5), &bounds).unwrap();
    assert_eq!(s.period_years, 4);
    assert_eq!(s.boundary, Some(PeriodBoundary::Minimum));
}

#[test]
fn test_unsolvable_period_reports_minimum_payment() {
    // 1,000,000 at 6% accrues 5,000 interest a month
    let err = compute_period_years(dec!(1_000_000), Decimal::ZERO, dec!(4_000), dec!(6)).unwrap_err();
    match err {
        LoanCalcError::PeriodUnsolvable { minimum_payment } => {
            let thirty = compute_monthly_payment(dec!(1_000_000), Decimal::ZERO, dec!(30), dec!(6)).unwrap();
            assert_eq!(minimum_payment, round_payment(thirty));
            assert!(err_message_mentions(minimum_payment));
        }
        other => panic!("Expected PeriodUnsolvable, got {other:?}"),
    }
}

fn err_message_mentions(minimum_payment: Decimal) -> bool {
    LoanCalcError::PeriodUnsolvable { minimum_payment }
        .to_string()
        .contains(&minimum_payment.to_string())
}

// ===========================================================================
// LTV policy
// ===========================================================================

#[test]
fn test_min_down_payment_tiers() {
    let v = dec!(2_000_000);
    assert_eq!(min_down_payment(v, PropertyOwnership::NoProperty), dec!(500_000));
    assert_eq!(min_down_payment(v, PropertyOwnership::HasProperty), dec!(1_000_000));
    assert_eq!(min_down_payment(v, PropertyOwnership::SellingProperty), dec!(600_000));
}

#[test]
fn test_clamped_down_payment_always_in_range() {
    let table = LtvTable::default();
    let v = dec!(1_000_000);
    for down in [dec!(0), dec!(100_000), dec!(400_000), dec!(999_999), dec!(5_000_000)] {
        for o in [
            PropertyOwnership::NoProperty,
            PropertyOwnership::HasProperty,
            PropertyOwnership::SellingProperty,
        ] {
            let c = clamp_down_payment(&table, v, down, o);
            assert!(c >= min_down_payment(v, o) && c <= v, "{down} {o:?} -> {c}");
        }
    }
}

#[test]
fn test_custom_ltv_table() {
    let policy = LoanPolicy::from_json(r#"{"ltv": {"no_property": "0.6"}}"#).unwrap();
    let out = calculate_down_payment(
        &DownPaymentInput {
            property_value: dec!(1_000_000),
            ownership: "option_1".into(),
            down_payment: None,
        },
        &policy.ltv,
    )
    .unwrap();
    assert_eq!(out.result.min_down_payment, dec!(400_000));
    assert!(!out.result.fallback_applied);
}

// ===========================================================================
// Recompute
// ===========================================================================

fn state() -> CalculatorState {
    CalculatorState {
        principal: dec!(2_000_000),
        down_payment: dec!(500_000),
        annual_rate_percent: dec!(5),
        period_years: 25,
        monthly_payment: dec!(8769),
        status: CalculatorStatus::Ok,
    }
}

#[test]
fn test_recompute_is_idempotent() {
    let bounds = LoanPolicy::default().mortgage_period;
    for active in [ActiveField::EditingPeriod, ActiveField::EditingPayment] {
        let once = recompute(&state(), active, &bounds);
        let twice = recompute(&once, active, &bounds);
        assert_eq!(once, twice, "{active:?}");
    }
}

#[test]
fn test_recompute_single_writer() {
    let bounds = PeriodBounds::default();
    let mut s = state();
    s.period_years = 10;
    let next = recompute(&s, ActiveField::EditingPeriod, &bounds);
    assert_eq!(next.period_years, 10);
    assert_ne!(next.monthly_payment, s.monthly_payment);

    let mut s = state();
    s.monthly_payment = dec!(12_000);
    let next = recompute(&s, ActiveField::EditingPayment, &bounds);
    assert_eq!(next.monthly_payment, dec!(12_000));
    assert!(next.period_years < 25);
}

#[test]
fn test_recompute_failure_keeps_last_valid_period() {
    let mut s = state();
    s.monthly_payment = dec!(5_000);
    let out = run_recompute(&RecomputeInput {
        state: s,
        active_field: ActiveField::EditingPayment,
        bounds: Some(PeriodBounds::new(4, 30)),
    })
    .unwrap();
    assert_eq!(out.result.period_years, 25);
    assert!(matches!(out.result.status, CalculatorStatus::IncreasePayment { .. }));
}

#[test]
fn test_recompute_input_from_json() {
    let input: RecomputeInput = serde_json::from_str(
        r#"{
            "state": {
                "principal": "1000000",
                "down_payment": "200000",
                "annual_rate_percent": "5",
                "period_years": 30,
                "monthly_payment": "5000"
            },
            "active_field": "editing_payment"
        }"#,
    )
    .unwrap();
    let out = run_recompute(&input).unwrap();
    assert_eq!(out.result.period_years, 22);
    let json = serde_json::to_value(&out.result).unwrap();
    assert_eq!(json["status"]["kind"], "ok");
}

// ===========================================================================
// Extreme inputs
// ===========================================================================

#[test]
fn test_extreme_rates_report_instead_of_panicking() {
    for pct in [dec!(200), dec!(500)] {
        assert!(compute_monthly_payment(dec!(1_000_000), Decimal::ZERO, dec!(30), pct).is_ok());

        let next = recompute(
            &CalculatorState {
                principal: dec!(1_000_000),
                down_payment: dec!(200_000),
                annual_rate_percent: pct,
                period_years: 30,
                monthly_payment: dec!(5000),
                status: CalculatorStatus::Ok,
            },
            ActiveField::EditingPayment,
            &PeriodBounds::default(),
        );
        assert_eq!(next.period_years, 30);
        assert!(
            matches!(next.status, CalculatorStatus::IncreasePayment { .. }),
            "{pct}%: {:?}",
            next.status
        );
    }
}

#[test]
fn test_oversized_bounds_are_invalid_input() {
    let err = compute_period_years_within(
        dec!(600_000),
        Decimal::ZERO,
        dec!(1000),
        dec!(6),
        &PeriodBounds::new(1, 400_000_000),
    )
    .unwrap_err();
    match err {
        LoanCalcError::InvalidInput { field, .. } => assert_eq!(field, "bounds"),
        other => panic!("Expected InvalidInput, got {other:?}"),
    }
}
