pub mod errors;
pub mod email;
