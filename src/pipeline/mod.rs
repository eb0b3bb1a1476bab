pub mod executor;
pub mod fsm;

pub use executor::{Animator, validate};
