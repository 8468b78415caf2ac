pub mod keys;
pub mod pop;
