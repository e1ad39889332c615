pub mod catalog;
pub mod config;
pub mod reconcile;
pub mod report;
pub mod retry;
pub mod store;
pub mod sync;
pub mod translator;
pub mod validator;
pub mod workspace;
