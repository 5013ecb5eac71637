pub mod adapters;
pub mod location;
pub mod salary;
pub mod skills;
pub mod tally;
