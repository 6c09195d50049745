//! Test suites for the bulb daemon.

mod support;
