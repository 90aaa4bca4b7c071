pub mod department;
pub mod employee;
pub mod general;
pub mod salary;
pub mod user;
