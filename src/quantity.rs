#[macro_use]
mod macros;

pub mod currency;
pub mod emissions;
pub mod energy;
pub mod power;
pub mod time;
