//! Test suites for the overseer server manager.

mod support;
