use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::error::CalcError;
use crate::types::{Money, Rate};
use crate::CalcResult;

/// Compute (1 + r)^n via iterative multiplication (avoids Decimal::powd drift).
pub fn compound(rate: Rate, n: u32) -> CalcResult<Decimal> {
    let factor = Decimal::ONE
        .checked_add(rate)
        .ok_or_else(|| CalcError::overflow("rate", format!("1 + {rate}")))?;
    let mut result = Decimal::ONE;
    for _ in 0..n {
        result = result
            .checked_mul(factor)
            .ok_or_else(|| CalcError::overflow("rate", format!("(1 + {rate})^{n}")))?;
    }
    Ok(result)
}

/// Level payment that retires `principal` over `n` periods at `periodic_rate`:
/// `P·r·(1+r)^n / ((1+r)^n − 1)`, or `P / n` when the rate is zero.
pub fn level_payment(principal: Money, periodic_rate: Rate, n: u32) -> CalcResult<Money> {
    if n == 0 {
        return Err(CalcError::invalid(
            "number_of_payments",
            "Number of payments must be > 0",
        ));
    }

    if periodic_rate.is_zero() {
        return Ok(principal / Decimal::from(n));
    }

    let factor = compound(periodic_rate, n)?;
    let denom = factor - Decimal::ONE;
    if denom.is_zero() {
        return Err(CalcError::DivisionByZero {
            context: "level payment annuity factor".into(),
        });
    }

    principal
        .checked_mul(periodic_rate)
        .and_then(|v| v.checked_mul(factor))
        .and_then(|v| v.checked_div(denom))
        .ok_or_else(|| CalcError::overflow("principal", "level payment"))
}

/// Future value of a starting balance plus an ordinary annuity of `payment`
/// deposited at the end of each of `n` periods.
pub fn future_value(present: Money, periodic_rate: Rate, n: u32, payment: Money) -> CalcResult<Money> {
    if periodic_rate.is_zero() {
        return payment
            .checked_mul(Decimal::from(n))
            .and_then(|v| v.checked_add(present))
            .ok_or_else(|| CalcError::overflow("payment", "future value"));
    }
    let factor = compound(periodic_rate, n)?;
    let grown = present.checked_mul(factor);
    let annuity = payment
        .checked_mul(factor - Decimal::ONE)
        .and_then(|v| v.checked_div(periodic_rate));
    grown
        .zip(annuity)
        .and_then(|(g, a)| g.checked_add(a))
        .ok_or_else(|| CalcError::overflow("present", "future value"))
}

/// Deflate a nominal amount `n` years out to today's money.
pub fn real_value(nominal: Money, inflation: Rate, n: u32) -> CalcResult<Money> {
    if inflation <= dec!(-1) {
        return Err(CalcError::invalid(
            "inflation_percent",
            "Inflation must be greater than -100%",
        ));
    }
    let factor = compound(inflation, n)?;
    if factor.is_zero() {
        return Err(CalcError::DivisionByZero {
            context: "inflation discount factor".into(),
        });
    }
    nominal
        .checked_div(factor)
        .ok_or_else(|| CalcError::overflow("inflation_percent", "inflation-adjusted value"))
}
