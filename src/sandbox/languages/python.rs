//! Python language profile

use super::{ExecutionProfile, SourceNaming};

/// Profile for Python 3.9
pub static PROFILE: ExecutionProfile = ExecutionProfile {
    language_id: "python",
    name: "Python",
    version_label: "3.9",
    runtime_image: "python:3.9-slim",
    source_naming: SourceNaming::Fixed("main.py"),
    compile_command: None,
    // Unbuffered so output survives a timeout kill
    run_command: "python -u {source}",
};
