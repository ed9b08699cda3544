//! CLI command implementations
//!
//! Each command returns the process exit code: `0` success, `1` at least one
//! input file failed, `2` configuration error, `4` connection error, `5` other
//! fatal error.

use crate::domain::LoaderError;

pub mod init;
pub mod load;
pub mod validate;

/// Exit code for an error that ends the process before a command finishes
pub fn exit_code_for(err: &LoaderError) -> i32 {
    match err {
        LoaderError::Configuration(_) => 2,
        LoaderError::Connection(_) => 4,
        _ => 5,
    }
}
