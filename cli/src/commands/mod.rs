pub mod info;
pub mod reconcile;
pub mod tokens;
