pub mod document;
pub mod envelope;
pub mod error;
pub mod identifier;
pub mod object;
pub mod temporal;
pub mod util;
pub mod verification;
