//! C language profile

use super::{ExecutionProfile, SourceNaming};

/// Profile for C (GCC 13)
pub static PROFILE: ExecutionProfile = ExecutionProfile {
    language_id: "c",
    name: "C",
    version_label: "GCC 13",
    runtime_image: "gcc:13",
    source_naming: SourceNaming::Fixed("main.c"),
    compile_command: Some("gcc -O2 -o main {source} -lm"),
    run_command: "./{entry}",
};
