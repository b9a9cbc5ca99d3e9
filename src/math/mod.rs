pub mod bit_math;
pub mod price;
pub mod tick_math;
