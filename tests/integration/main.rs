//! Integration test target

mod e2e_test;
mod pipeline_test;
mod session_test;
