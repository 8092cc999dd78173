use crate::error::ContractViolation;

/// Each value's percentage of the total. A zero total yields all-zero shares.
pub fn percentage_share(values: &[f64]) -> Result<Vec<f64>, ContractViolation> {
    if let Some((i, v)) = values.iter().enumerate().find(|(_, v)| !v.is_finite() || **v < 0.0) {
        return Err(ContractViolation::OutOfDomain(format!(
            "share input {i} is {v}; shares need finite non-negative values"
        )));
    }

    let total: f64 = values.iter().sum();
    if total == 0.0 {
        return Ok(vec![0.0; values.len()]);
    }
    Ok(values.iter().map(|v| v / total * 100.0).collect())
}
