pub mod table;
pub mod distribution;

pub use table::ScoreTable;
pub use distribution::{Bucket, ScoreDistribution};
