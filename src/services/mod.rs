pub mod reporter;
pub mod transcoder;
pub mod validator;
