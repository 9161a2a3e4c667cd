pub mod health;
pub mod kelly;
pub mod simulate;
