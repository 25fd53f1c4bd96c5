//! Integration tests for cmdext

mod cli_dispatch;
mod config_loading;
mod directory_pipeline;
mod end_to_end;
mod partial_failure;
mod test_utils;
