use crate::types::{CustomerRisk, RiskLevel};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskBucket {
    pub level: RiskLevel,
    pub customers: u64,
    pub total_spent: f64,
}

/// Customer count and spend per risk level.
///
/// Always four buckets in `RiskLevel::ALL` order; a level with no customers is
/// reported as zero rather than omitted.
pub fn risk_level_rollup(rows: &[CustomerRisk]) -> [RiskBucket; 4] {
    let mut buckets = RiskLevel::ALL.map(|level| RiskBucket {
        level,
        customers: 0,
        total_spent: 0.0,
    });
    for row in rows {
        let bucket = &mut buckets[slot(row.risk_level)];
        bucket.customers += 1;
        bucket.total_spent += row.total_spent;
    }
    buckets
}

fn slot(level: RiskLevel) -> usize {
    match level {
        RiskLevel::Low => 0,
        RiskLevel::Medium => 1,
        RiskLevel::High => 2,
        RiskLevel::Critical => 3,
    }
}
