//! Host-side tests for the multi-mode clock
//!
//! Scenario tests drive the whole core through the simulated board; the
//! driver tests check the firmware crate against mocked buses.


#[cfg(test)]
mod property_tests;

#[cfg(test)]
mod expander_tests;

#[cfg(test)]
mod flash_tests;

#[cfg(test)]
mod board_tests;
