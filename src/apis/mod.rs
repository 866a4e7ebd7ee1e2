pub mod backend;
pub mod eventim;
