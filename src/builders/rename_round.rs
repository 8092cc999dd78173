use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::ContractViolation;
use crate::frame::{expect_number, Frame, Value};

/// Project `frame` onto `column_map` (`(source, renamed)` pairs, in output order),
/// then round the output columns named in `rounding_map` to a fixed number of decimals.
///
/// With an empty rounding map every value passes through untouched.
pub fn rename_and_round(
    frame: &Frame,
    column_map: &[(&str, &str)],
    rounding_map: &[(&str, u32)],
) -> Result<Frame, ContractViolation> {
    let sources: Vec<usize> = column_map
        .iter()
        .map(|(src, _)| frame.column_index(src))
        .collect::<Result<_, _>>()?;
    let columns: Vec<String> = column_map.iter().map(|(_, dst)| dst.to_string()).collect();

    let mut decimals: Vec<Option<u32>> = vec![None; columns.len()];
    for (name, dp) in rounding_map {
        let pos = columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| ContractViolation::UnknownColumn {
                column: name.to_string(),
                available: columns.join(", "),
            })?;
        decimals[pos] = Some(*dp);
    }

    let mut out = Frame::new(columns.clone());
    for (row_no, row) in frame.rows().iter().enumerate() {
        let mut projected = Vec::with_capacity(sources.len());
        for (slot, &idx) in sources.iter().enumerate() {
            let cell = &row[idx];
            let value = match decimals[slot] {
                Some(dp) => Value::Number(round_half_up(expect_number(cell, &columns[slot], row_no)?, dp)?),
                None => cell.clone(),
            };
            projected.push(value);
        }
        out.push_row(projected)?;
    }
    Ok(out)
}

/// Round half away from zero on the shortest decimal representation of `value`,
/// so `12.345` rounds to `12.35` even though its binary value sits just below the midpoint.
pub fn round_half_up(value: f64, decimals: u32) -> Result<f64, ContractViolation> {
    if !value.is_finite() {
        return Err(ContractViolation::OutOfDomain(format!("cannot round non-finite value {value}")));
    }
    let exact = Decimal::from_str(&value.to_string())
        .or_else(|_| Decimal::from_scientific(&format!("{value:e}")))
        .map_err(|e| ContractViolation::OutOfDomain(format!("cannot round {value}: {e}")))?;
    exact
        .round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .ok_or_else(|| ContractViolation::OutOfDomain(format!("cannot represent rounded {value}")))
}
