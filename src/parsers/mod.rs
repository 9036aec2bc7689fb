pub mod eslint;
pub mod prettier;
