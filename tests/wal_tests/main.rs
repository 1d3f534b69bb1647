//! Transaction log test suite

mod event_tests;
