//! Java language profile
//!
//! `javac` requires the file to be named after its public class, so the
//! source file name is derived from the submitted code.

use super::{ExecutionProfile, SourceNaming};

/// Profile for Java 11
pub static PROFILE: ExecutionProfile = ExecutionProfile {
    language_id: "java",
    name: "Java",
    version_label: "11",
    runtime_image: "openjdk:11-slim",
    source_naming: SourceNaming::EntryClass {
        extension: "java",
        default_entry: "Main",
    },
    compile_command: Some("javac {source}"),
    run_command: "java {entry}",
};
