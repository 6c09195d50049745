//! Test suites for the bulb CLI runtime.

mod behaviour;
mod support;
