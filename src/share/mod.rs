pub mod access;
pub mod risk;
pub mod sanitize;
pub mod scope;
pub mod validate;
