//! Text cleanup applied to every extracted line.

pub mod normalize;

pub use normalize::normalize_line;
