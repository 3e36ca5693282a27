//! Language registry
//!
//! Every supported language is one static [`ExecutionProfile`] entry in
//! [`PROFILES`]. Adding a language means adding a module with its profile and
//! listing it there; the runner never branches on language ids.

pub mod c;
pub mod cpp;
pub mod java;
pub mod javascript;
pub mod python;

use super::SandboxError;

/// How the source file is named inside the workspace
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceNaming {
    /// Always the same file name
    Fixed(&'static str),
    /// File named after the entry class declared in the source
    EntryClass {
        extension: &'static str,
        default_entry: &'static str,
    },
}

/// Static description of how to build and run one language in a sandbox
///
/// Command templates may reference `{source}` (resolved file name) and
/// `{entry}` (resolved entry point, the file stem for fixed names).
#[derive(Debug, PartialEq, Eq)]
pub struct ExecutionProfile {
    pub language_id: &'static str,
    pub name: &'static str,
    pub version_label: &'static str,
    pub runtime_image: &'static str,
    pub source_naming: SourceNaming,
    pub compile_command: Option<&'static str>,
    pub run_command: &'static str,
}

/// Source file name and entry point resolved for one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSource {
    pub file_name: String,
    pub entry: String,
}

impl ResolvedSource {
    /// Resolve a fixed file name; the entry is the file stem
    pub fn fixed(file_name: &str) -> Self {
        let entry = file_name
            .rsplit_once('.')
            .map(|(stem, _)| stem)
            .unwrap_or(file_name);

        Self {
            file_name: file_name.to_string(),
            entry: entry.to_string(),
        }
    }

    /// Resolve a class-named source file
    pub fn entry_class(entry: &str, extension: &str) -> Self {
        Self {
            file_name: format!("{}.{}", entry, extension),
            entry: entry.to_string(),
        }
    }
}

impl ExecutionProfile {
    /// Shell command line (compile step, if any, chained with the run step)
    pub fn command_line(&self, source: &ResolvedSource) -> String {
        let run = render(self.run_command, source);

        match self.compile_command {
            Some(compile) => format!("{} && {}", render(compile, source), run),
            None => run,
        }
    }
}

fn render(template: &str, source: &ResolvedSource) -> String {
    template
        .replace("{source}", &source.file_name)
        .replace("{entry}", &source.entry)
}

/// Registry table, in catalog display order
static PROFILES: &[&ExecutionProfile] = &[
    &python::PROFILE,
    &javascript::PROFILE,
    &java::PROFILE,
    &c::PROFILE,
    &cpp::PROFILE,
];

/// Look up the profile for a language id
pub fn resolve(language_id: &str) -> Result<&'static ExecutionProfile, SandboxError> {
    PROFILES
        .iter()
        .copied()
        .find(|profile| profile.language_id == language_id)
        .ok_or_else(|| SandboxError::UnsupportedLanguage(language_id.to_string()))
}

/// All registered profiles
pub fn all() -> &'static [&'static ExecutionProfile] {
    PROFILES
}
