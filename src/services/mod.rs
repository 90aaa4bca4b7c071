pub mod employee;
pub mod ledger;
pub mod report;
pub mod user;

#[cfg(test)]
mod integration_tests;
