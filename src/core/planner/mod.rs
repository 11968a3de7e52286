pub mod geodesy;
pub mod service;
