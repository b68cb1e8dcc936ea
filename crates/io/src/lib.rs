// File I/O operations

pub mod catalog;
pub mod xlsx;
