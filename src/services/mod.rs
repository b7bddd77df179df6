pub mod board;
pub mod weather;
