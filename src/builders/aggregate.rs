use std::collections::HashMap;

use crate::error::ContractViolation;
use crate::frame::{expect_number, Frame, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateOp {
    Sum,
    /// Number of non-missing cells in the group.
    Count,
    Mean,
}

/// One output column of `group_and_aggregate`.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregation {
    pub column: String,
    pub op: AggregateOp,
    pub output: String,
}

impl Aggregation {
    pub fn new(column: &str, op: AggregateOp, output: &str) -> Self {
        Self {
            column: column.to_string(),
            op,
            output: output.to_string(),
        }
    }

    pub fn sum(column: &str, output: &str) -> Self {
        Self::new(column, AggregateOp::Sum, output)
    }

    pub fn count(column: &str, output: &str) -> Self {
        Self::new(column, AggregateOp::Count, output)
    }

    pub fn mean(column: &str, output: &str) -> Self {
        Self::new(column, AggregateOp::Mean, output)
    }
}

#[derive(Default)]
struct Accumulator {
    rows: usize,
    sums: Vec<f64>,
    counts: Vec<usize>,
}

/// Partition rows by `group_key` and apply each aggregation per group.
///
/// Output columns are `group_key` followed by each aggregation's `output`, one
/// row per distinct key in order of first occurrence. Only keys that occur in
/// the data appear. Rows with a missing key are left out, and `Count` skips
/// missing cells.
pub fn group_and_aggregate(
    frame: &Frame,
    group_key: &str,
    aggregations: &[Aggregation],
) -> Result<Frame, ContractViolation> {
    let key_idx = frame.column_index(group_key)?;
    let agg_idx: Vec<usize> = aggregations
        .iter()
        .map(|a| frame.column_index(&a.column))
        .collect::<Result<_, _>>()?;

    let mut order: Vec<Value> = Vec::new();
    let mut groups: HashMap<String, Accumulator> = HashMap::new();

    for (row_no, row) in frame.rows().iter().enumerate() {
        let key = &row[key_idx];
        if key.is_missing() {
            continue;
        }
        let acc = groups.entry(group_id(key)).or_insert_with(|| {
            order.push(key.clone());
            Accumulator {
                rows: 0,
                sums: vec![0.0; aggregations.len()],
                counts: vec![0; aggregations.len()],
            }
        });
        acc.rows += 1;

        for (slot, (agg, &idx)) in aggregations.iter().zip(&agg_idx).enumerate() {
            match agg.op {
                AggregateOp::Count => acc.counts[slot] += usize::from(!row[idx].is_missing()),
                AggregateOp::Sum | AggregateOp::Mean => {
                    acc.sums[slot] += expect_number(&row[idx], &agg.column, row_no)?;
                }
            }
        }
    }

    let mut columns = vec![group_key.to_string()];
    columns.extend(aggregations.iter().map(|a| a.output.clone()));

    let mut out = Frame::new(columns);
    for key in order {
        let acc = &groups[&group_id(&key)];
        let mut row = vec![key];
        for (slot, agg) in aggregations.iter().enumerate() {
            let value = match agg.op {
                AggregateOp::Sum => acc.sums[slot],
                AggregateOp::Count => acc.counts[slot] as f64,
                AggregateOp::Mean => acc.sums[slot] / acc.rows as f64,
            };
            row.push(Value::Number(value));
        }
        out.push_row(row)?;
    }
    Ok(out)
}

/// Hashable identity of a key cell; kind-prefixed so `Text("1")` and `Number(1)` stay apart.
fn group_id(value: &Value) -> String {
    match value {
        Value::Number(n) => format!("{}:{}", value.kind(), n.to_bits()),
        other => format!("{}:{other}", other.kind()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sales() -> Frame {
        let rows = vec![
            vec![Value::from("Chips"), Value::Number(2.0), Value::from("p1")],
            vec![Value::from("Coffee"), Value::Number(10.0), Value::from("p2")],
            vec![Value::from("Chips"), Value::Number(3.0), Value::from("p3")],
            vec![Value::from("Energy"), Value::Number(7.5), Value::from("p4")],
            vec![Value::from("Coffee"), Value::Number(6.0), Value::from("p5")],
        ];
        Frame::from_rows(vec!["desc".into(), "total_price".into(), "payment_key".into()], rows).unwrap()
    }

    #[test]
    fn groups_in_first_occurrence_order() {
        let out = group_and_aggregate(&sales(), "desc", &[Aggregation::sum("total_price", "revenue")]).unwrap();
        assert_eq!(out.labels("desc").unwrap(), vec!["Chips", "Coffee", "Energy"]);
        assert_eq!(out.numbers("revenue").unwrap(), vec![5.0, 16.0, 7.5]);
    }

    #[test]
    fn count_and_mean() {
        let out = group_and_aggregate(
            &sales(),
            "desc",
            &[
                Aggregation::count("payment_key", "transactions"),
                Aggregation::mean("total_price", "avg"),
            ],
        )
        .unwrap();
        assert_eq!(out.columns(), ["desc", "transactions", "avg"]);
        assert_eq!(out.numbers("transactions").unwrap(), vec![2.0, 2.0, 1.0]);
        assert_eq!(out.numbers("avg").unwrap(), vec![2.5, 8.0, 7.5]);
    }

    #[test]
    fn count_accepts_non_numeric_columns() {
        let out = group_and_aggregate(&sales(), "desc", &[Aggregation::count("payment_key", "n")]).unwrap();
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn sum_over_text_column_is_a_contract_violation() {
        let err = group_and_aggregate(&sales(), "desc", &[Aggregation::sum("payment_key", "x")]).unwrap_err();
        assert!(matches!(err, ContractViolation::WrongCellType { .. }), "err={err:?}");
    }

    #[test]
    fn unknown_group_key_is_a_contract_violation() {
        let err = group_and_aggregate(&sales(), "category", &[]).unwrap_err();
        assert!(matches!(err, ContractViolation::UnknownColumn { .. }));
    }

    #[test]
    fn empty_input_has_no_groups() {
        let empty = Frame::new(vec!["desc".into(), "total_price".into()]);
        let out = group_and_aggregate(&empty, "desc", &[Aggregation::sum("total_price", "revenue")]).unwrap();
        assert!(out.is_empty());
        assert_eq!(out.columns(), ["desc", "revenue"]);
    }

    #[test]
    fn missing_keys_and_cells_are_not_counted() {
        let frame = Frame::from_rows(
            vec!["desc".into(), "total_price".into(), "payment_key".into()],
            vec![
                vec![Value::from("Chips"), Value::Number(2.0), Value::from("p1")],
                vec![Value::from("Chips"), Value::Number(3.0), Value::from("")],
                vec![Value::from(""), Value::Number(9.0), Value::from("p3")],
            ],
        )
        .unwrap();
        let out = group_and_aggregate(
            &frame,
            "desc",
            &[
                Aggregation::sum("total_price", "revenue"),
                Aggregation::count("payment_key", "transactions"),
            ],
        )
        .unwrap();
        assert_eq!(out.labels("desc").unwrap(), vec!["Chips"], "empty key must not form a group");
        assert_eq!(out.numbers("revenue").unwrap(), vec![5.0]);
        assert_eq!(out.numbers("transactions").unwrap(), vec![1.0], "empty payment_key is not counted");
    }

    #[test]
    fn text_and_number_keys_stay_distinct() {
        let frame = Frame::from_rows(
            vec!["k".into(), "v".into()],
            vec![
                vec![Value::from("1"), Value::Number(1.0)],
                vec![Value::Number(1.0), Value::Number(2.0)],
            ],
        )
        .unwrap();
        let out = group_and_aggregate(&frame, "k", &[Aggregation::sum("v", "s")]).unwrap();
        assert_eq!(out.len(), 2);
    }
}
