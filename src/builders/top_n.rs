use std::cmp::Ordering;

use crate::error::ContractViolation;
use crate::frame::Frame;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// First `n` rows of `frame` ordered by `sort_key`.
///
/// The sort is stable, so input already ordered by the key comes back as a plain
/// prefix and ties keep their file order. `n` beyond the row count returns every row.
pub fn top_n(frame: &Frame, n: usize, sort_key: &str, direction: SortDirection) -> Result<Frame, ContractViolation> {
    let idx = frame.column_index(sort_key)?;
    let rows = frame.rows();

    if let Some(first) = rows.first() {
        let kind = first[idx].kind();
        if let Some((row, r)) = rows.iter().enumerate().find(|(_, r)| r[idx].kind() != kind) {
            return Err(ContractViolation::WrongCellType {
                column: sort_key.to_string(),
                row,
                expected: kind,
                found: r[idx].kind(),
            });
        }
    }

    let mut order: Vec<usize> = (0..rows.len()).collect();
    order.sort_by(|&a, &b| {
        let ord = rows[a][idx].compare(&rows[b][idx]).unwrap_or(Ordering::Equal);
        match direction {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        }
    });

    let picked = order.into_iter().take(n).map(|i| rows[i].clone()).collect();
    Frame::from_rows(frame.columns().to_vec(), picked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Value;

    fn products(revenues: &[f64]) -> Frame {
        let rows = revenues
            .iter()
            .enumerate()
            .map(|(i, r)| vec![Value::Text(format!("item-{i}")), Value::Number(*r)])
            .collect();
        Frame::from_rows(vec!["item_name".into(), "revenue".into()], rows).unwrap()
    }

    #[test]
    fn takes_n_rows_sorted_descending() {
        let revenues: Vec<f64> = (1..=20).map(|i| ((i * 37) % 23) as f64).collect();
        let frame = products(&revenues);

        let top = top_n(&frame, 10, "revenue", SortDirection::Descending).unwrap();
        assert_eq!(top.len(), 10);
        let values = top.numbers("revenue").unwrap();
        assert!(values.windows(2).all(|w| w[0] >= w[1]), "not descending: {values:?}");
    }

    #[test]
    fn truncation_is_idempotent() {
        let revenues: Vec<f64> = (1..=20).map(|i| ((i * 13) % 17) as f64).collect();
        let frame = products(&revenues);

        let ten = top_n(&frame, 10, "revenue", SortDirection::Descending).unwrap();
        let hundred = top_n(&frame, 100, "revenue", SortDirection::Descending).unwrap();
        assert_eq!(hundred.len(), 20);
        assert_eq!(ten.rows(), &hundred.rows()[..10]);
    }

    #[test]
    fn already_sorted_input_is_a_prefix_take() {
        let frame = products(&[9.0, 7.0, 7.0, 3.0, 1.0]);
        let top = top_n(&frame, 3, "revenue", SortDirection::Descending).unwrap();
        assert_eq!(top.rows(), &frame.rows()[..3]);
    }

    #[test]
    fn ascending_direction() {
        let frame = products(&[3.0, 1.0, 2.0]);
        let top = top_n(&frame, 2, "revenue", SortDirection::Ascending).unwrap();
        assert_eq!(top.numbers("revenue").unwrap(), vec![1.0, 2.0]);
    }

    #[test]
    fn unknown_sort_key_is_a_contract_violation() {
        let frame = products(&[1.0]);
        let err = top_n(&frame, 1, "sales", SortDirection::Descending).unwrap_err();
        assert!(matches!(err, ContractViolation::UnknownColumn { .. }));
    }

    #[test]
    fn mixed_kinds_in_sort_column_are_rejected() {
        let frame = Frame::from_rows(
            vec!["k".into()],
            vec![vec![Value::Number(1.0)], vec![Value::from("x")]],
        )
        .unwrap();
        assert!(top_n(&frame, 2, "k", SortDirection::Ascending).is_err());
    }

    #[test]
    fn empty_frame_yields_empty_frame() {
        let frame = products(&[]);
        let top = top_n(&frame, 5, "revenue", SortDirection::Descending).unwrap();
        assert!(top.is_empty());
        assert_eq!(top.columns(), frame.columns());
    }
}
