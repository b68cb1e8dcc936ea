pub mod cell_ref;
pub mod merge;
pub mod record;
pub mod session;
