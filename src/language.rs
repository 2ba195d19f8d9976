//! Language registry: comment styles, whitespace sensitivity, dataset layout.

use serde::{Deserialize, Serialize};

/// Programming languages covered by the benchmark datasets.
///
/// `Generic` is the fallback for unrecognized languages: no comment stripping
/// is applied during normalization, and fenced blocks use the `code` tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    JavaScript,
    TypeScript,
    Java,
    C,
    Cpp,
    CSharp,
    Rust,
    Php,
    Go,
    Python,
    Ruby,
    Generic,
}

impl Language {
    /// All concrete languages with a dataset partition.
    pub const ALL: &'static [Language] = &[
        Language::JavaScript,
        Language::TypeScript,
        Language::Java,
        Language::C,
        Language::Cpp,
        Language::CSharp,
        Language::Rust,
        Language::Php,
        Language::Go,
        Language::Python,
        Language::Ruby,
    ];

    /// Parse a dataset partition name. Unknown names map to `None`, not
    /// `Generic`; callers decide whether to fall back.
    pub fn from_name(name: &str) -> Option<Language> {
        match name {
            "javascript" => Some(Language::JavaScript),
            "typescript" => Some(Language::TypeScript),
            "java" => Some(Language::Java),
            "c" => Some(Language::C),
            "cpp" => Some(Language::Cpp),
            "csharp" => Some(Language::CSharp),
            "rust" => Some(Language::Rust),
            "php" => Some(Language::Php),
            "go" => Some(Language::Go),
            "python" => Some(Language::Python),
            "ruby" => Some(Language::Ruby),
            "generic" => Some(Language::Generic),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::JavaScript => "javascript",
            Language::TypeScript => "typescript",
            Language::Java => "java",
            Language::C => "c",
            Language::Cpp => "cpp",
            Language::CSharp => "csharp",
            Language::Rust => "rust",
            Language::Php => "php",
            Language::Go => "go",
            Language::Python => "python",
            Language::Ruby => "ruby",
            Language::Generic => "generic",
        }
    }

    /// Markdown fence tag for this language.
    pub fn markdown_tag(&self) -> &'static str {
        match self {
            Language::Generic => "code",
            other => other.as_str(),
        }
    }

    /// Languages whose comments are `/* ... */` and `// ...`.
    ///
    /// Go is included here even though it is whitespace-sensitive: it gets
    /// C-style comment stripping but keeps its whitespace.
    pub fn uses_c_comments(&self) -> bool {
        matches!(
            self,
            Language::JavaScript
                | Language::TypeScript
                | Language::Java
                | Language::C
                | Language::Cpp
                | Language::CSharp
                | Language::Rust
                | Language::Php
                | Language::Go
        )
    }

    /// Languages whose comments are `# ...` (plus triple-quoted literals).
    pub fn uses_hash_comments(&self) -> bool {
        matches!(self, Language::Python | Language::Ruby)
    }

    /// Whitespace-sensitive languages keep their whitespace during
    /// normalization; everything else is collapsed to single spaces.
    pub fn whitespace_sensitive(&self) -> bool {
        matches!(self, Language::Python | Language::Go | Language::Ruby)
    }

    /// Dataset directory name under the merges root for this language.
    pub fn dataset_dir(&self) -> Option<&'static str> {
        match self {
            Language::JavaScript => Some("repos_github_javascript"),
            Language::TypeScript => Some("repos_github_typescript"),
            Language::Java => Some("repos_github_java"),
            Language::C => Some("repos_reaper_c"),
            Language::Cpp => Some("repos_reaper_cpp"),
            Language::CSharp => Some("repos_reaper_csharp"),
            Language::Rust => Some("repos_github_rust"),
            Language::Php => Some("repos_reaper_php"),
            Language::Go => Some("repos_github_go"),
            Language::Python => Some("repos_reaper_python"),
            Language::Ruby => Some("repos_reaper_ruby"),
            Language::Generic => None,
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_round_trip() {
        for lang in Language::ALL {
            assert_eq!(Language::from_name(lang.as_str()), Some(*lang));
        }
        assert_eq!(Language::from_name("cobol"), None);
    }

    #[test]
    fn comment_style_partition() {
        assert!(Language::Rust.uses_c_comments());
        assert!(Language::Go.uses_c_comments());
        assert!(Language::Python.uses_hash_comments());
        assert!(!Language::Python.uses_c_comments());
        assert!(!Language::Generic.uses_c_comments());
        assert!(!Language::Generic.uses_hash_comments());
    }

    #[test]
    fn whitespace_sensitivity() {
        assert!(Language::Python.whitespace_sensitive());
        assert!(Language::Go.whitespace_sensitive());
        assert!(Language::Ruby.whitespace_sensitive());
        assert!(!Language::Java.whitespace_sensitive());
        assert!(!Language::Generic.whitespace_sensitive());
    }

    #[test]
    fn markdown_tags() {
        assert_eq!(Language::Cpp.markdown_tag(), "cpp");
        assert_eq!(Language::Generic.markdown_tag(), "code");
    }
}
