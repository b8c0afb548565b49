//! Integration tests for the workspace tree synchronizer

mod support;

mod end_to_end;
mod host_switching;
mod local_workspace;
mod session_intents;
