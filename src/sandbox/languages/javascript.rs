//! JavaScript (Node.js) language profile

use super::{ExecutionProfile, SourceNaming};

/// Profile for Node.js 16
pub static PROFILE: ExecutionProfile = ExecutionProfile {
    language_id: "javascript",
    name: "JavaScript",
    version_label: "Node.js 16",
    runtime_image: "node:16-slim",
    source_naming: SourceNaming::Fixed("main.js"),
    compile_command: None,
    run_command: "node {source}",
};
