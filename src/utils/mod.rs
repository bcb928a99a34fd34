pub mod numeric;

pub use numeric::finite_or_zero;
