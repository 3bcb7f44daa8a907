pub mod payload;
pub mod project;
pub mod share_token;
