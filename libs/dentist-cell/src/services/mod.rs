pub mod roster;

pub use roster::DentistRoster;
