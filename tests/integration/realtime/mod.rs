//! Live delivery integration tests

mod socket_test;
