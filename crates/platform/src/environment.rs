//! Read-only facts about how the host finds executables

use serde::{Deserialize, Serialize};
use std::ffi::OsStr;
use std::path::PathBuf;

/// Extensions Windows falls back to when `PATHEXT` is unset
const WINDOWS_DEFAULT_PATHEXT: &str = ".COM;.EXE;.BAT;.CMD";

/// Executable name extensions recognized by the host
///
/// Never empty: an empty input is normalized to the single empty extension,
/// meaning "bare name only". Comparisons are ASCII case-insensitive when the
/// set was built for Windows and byte-exact otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionSet {
    entries: Vec<String>,
    case_insensitive: bool,
}

impl ExtensionSet {
    pub fn new<I, S>(entries: I, case_insensitive: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for entry in entries {
            let entry = entry.into();
            let duplicate = unique.iter().any(|existing| {
                if case_insensitive {
                    existing.eq_ignore_ascii_case(&entry)
                } else {
                    *existing == entry
                }
            });
            if !duplicate {
                unique.push(entry);
            }
        }
        if unique.is_empty() {
            unique.push(String::new());
        }
        Self {
            entries: unique,
            case_insensitive,
        }
    }

    /// `{""}` with exact comparison, the POSIX default
    #[must_use]
    pub fn bare() -> Self {
        Self::new(Vec::<String>::new(), false)
    }

    #[must_use]
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    #[must_use]
    pub fn is_case_insensitive(&self) -> bool {
        self.case_insensitive
    }

    #[must_use]
    pub fn contains(&self, extension: &str) -> bool {
        self.entries.iter().any(|entry| self.text_eq(entry, extension))
    }

    /// Split `file_name` into base name and extension
    ///
    /// The longest member that is a suffix of `file_name` is stripped.
    /// Returns `None` when no member matches, which can only happen when the
    /// empty extension is not part of the set.
    #[must_use]
    pub fn split<'a>(&self, file_name: &'a str) -> Option<(&'a str, &'a str)> {
        self.entries
            .iter()
            .filter_map(|extension| {
                let cut = file_name.len().checked_sub(extension.len())?;
                if !file_name.is_char_boundary(cut) {
                    return None;
                }
                let (base, suffix) = file_name.split_at(cut);
                self.text_eq(suffix, extension).then_some((base, suffix))
            })
            .max_by_key(|(_, suffix)| suffix.len())
    }

    /// Whether `file_name` is `name` followed by a member extension
    #[must_use]
    pub fn matches(&self, file_name: &str, name: &str) -> bool {
        self.split(file_name)
            .is_some_and(|(base, _)| self.text_eq(base, name))
    }

    fn text_eq(&self, left: &str, right: &str) -> bool {
        if self.case_insensitive {
            left.eq_ignore_ascii_case(right)
        } else {
            left == right
        }
    }
}

impl Default for ExtensionSet {
    fn default() -> Self {
        Self::bare()
    }
}

/// Host facts supplied once per resolution run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformEnvironment {
    search_directories: Vec<PathBuf>,
    name_extensions: ExtensionSet,
    is_windows: bool,
}

impl PlatformEnvironment {
    /// Build an environment; extension comparison follows `is_windows`
    pub fn new<D, E, S>(search_directories: D, extensions: E, is_windows: bool) -> Self
    where
        D: IntoIterator,
        D::Item: Into<PathBuf>,
        E: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            search_directories: search_directories.into_iter().map(Into::into).collect(),
            name_extensions: ExtensionSet::new(extensions, is_windows),
            is_windows,
        }
    }

    /// POSIX semantics: bare names, exact case, execute bits required
    pub fn posix<D>(search_directories: D) -> Self
    where
        D: IntoIterator,
        D::Item: Into<PathBuf>,
    {
        Self::new(search_directories, Vec::<String>::new(), false)
    }

    /// Windows semantics: case-insensitive names, extension decides executability
    pub fn windows<D, E, S>(search_directories: D, extensions: E) -> Self
    where
        D: IntoIterator,
        D::Item: Into<PathBuf>,
        E: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(search_directories, extensions, true)
    }

    /// Capture the running process's `PATH` (and `PATHEXT` on Windows)
    #[must_use]
    pub fn capture() -> Self {
        let path = std::env::var_os("PATH");
        let pathext = std::env::var("PATHEXT").ok();
        Self::from_variables(path.as_deref(), pathext.as_deref(), cfg!(windows))
    }

    /// Interpret raw `PATH`/`PATHEXT` values
    ///
    /// Empty `PATH` components are dropped. `PATHEXT` is ignored on POSIX.
    #[must_use]
    pub fn from_variables(path: Option<&OsStr>, pathext: Option<&str>, is_windows: bool) -> Self {
        let search_directories: Vec<PathBuf> = path
            .map(|value| {
                std::env::split_paths(value)
                    .filter(|dir| !dir.as_os_str().is_empty())
                    .collect()
            })
            .unwrap_or_default();

        if !is_windows {
            return Self::posix(search_directories);
        }

        let pathext = pathext
            .filter(|value| !value.trim().is_empty())
            .unwrap_or(WINDOWS_DEFAULT_PATHEXT);
        let extensions: Vec<String> = pathext
            .split(';')
            .map(str::trim)
            .filter(|extension| !extension.is_empty())
            .map(str::to_string)
            .collect();
        Self::windows(search_directories, extensions)
    }

    /// Same host semantics with a different search path
    #[must_use]
    pub fn with_search_directories<D>(mut self, search_directories: D) -> Self
    where
        D: IntoIterator,
        D::Item: Into<PathBuf>,
    {
        self.search_directories = search_directories.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn search_directories(&self) -> &[PathBuf] {
        &self.search_directories
    }

    #[must_use]
    pub fn name_extensions(&self) -> &ExtensionSet {
        &self.name_extensions
    }

    #[must_use]
    pub fn is_windows(&self) -> bool {
        self.is_windows
    }
}
