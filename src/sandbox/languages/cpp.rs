//! C++ language profile

use super::{ExecutionProfile, SourceNaming};

/// Profile for C++17 (GCC 13)
pub static PROFILE: ExecutionProfile = ExecutionProfile {
    language_id: "cpp",
    name: "C++",
    version_label: "GCC 13 (C++17)",
    runtime_image: "gcc:13",
    source_naming: SourceNaming::Fixed("main.cpp"),
    compile_command: Some("g++ -O2 -std=c++17 -o main {source}"),
    run_command: "./{entry}",
};
