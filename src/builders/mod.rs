//! Pure view-model builders. None of them catch malformed input: a shape they
//! do not accept comes back as a `ContractViolation`.

pub mod aggregate;
pub mod rename_round;
pub mod risk;
pub mod share;
pub mod top_n;

pub use aggregate::{group_and_aggregate, AggregateOp, Aggregation};
pub use rename_round::{rename_and_round, round_half_up};
pub use risk::{risk_level_rollup, RiskBucket};
pub use share::percentage_share;
pub use top_n::{top_n, SortDirection};
