//! Notifier loop tests.

mod runner_test;
