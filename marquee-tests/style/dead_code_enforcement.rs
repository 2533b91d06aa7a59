//! Dead Code Enforcement
//!
//! Enforces that production code carries no #[allow(dead_code)] attributes and
//! no panicking `unwrap()`/`expect()` calls. Everything after a file's first
//! `#[cfg(test)]` is test code and exempt, as are dedicated test helper files.

use std::fs;
use std::path::{Path, PathBuf};

/// What a flagged line does wrong
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ViolationKind {
    DeadCodeAllowance,
    PanickingUnwrap,
}

/// A violation found in production code
#[derive(Debug)]
struct Violation {
    file_path: String,
    line_number: usize,
    context: String,
    kind: ViolationKind,
}

/// Checker for production code hygiene across the workspace crates
struct DeadCodeChecker {
    violations: Vec<Violation>,
    files_checked: usize,
}

impl DeadCodeChecker {
    fn new() -> Self {
        Self {
            violations: Vec::new(),
            files_checked: 0,
        }
    }

    /// Source directories of every `marquee-*` workspace crate
    fn crate_source_dirs(root: &Path) -> anyhow::Result<Vec<PathBuf>> {
        let mut dirs = Vec::new();
        for entry in fs::read_dir(root)? {
            let path = entry?.path();
            let is_member = path
                .file_name()
                .is_some_and(|name| name.to_string_lossy().starts_with("marquee-"));
            if is_member && path.join("src").is_dir() {
                dirs.push(path.join("src"));
            }
        }
        dirs.sort();
        Ok(dirs)
    }

    fn find_rust_files(dir: &Path, files: &mut Vec<PathBuf>) -> anyhow::Result<()> {
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_dir() {
                Self::find_rust_files(&path, files)?;
            } else if path.extension().is_some_and(|ext| ext == "rs") {
                files.push(path);
            }
        }
        Ok(())
    }

    /// Check if a file path represents test-only code
    fn is_test_file(path: &Path) -> bool {
        let path_str = path.to_string_lossy().to_lowercase();
        path_str.contains("/tests/") || path_str.contains("test_") || path_str.ends_with("tests.rs")
    }

    /// Scan file content up to its test module
    fn check_content(&mut self, file_path: &str, content: &str) {
        self.files_checked += 1;

        for (index, line) in content.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.starts_with("#[cfg(test)]") {
                break;
            }
            if trimmed.starts_with("//") {
                continue;
            }

            let kind = if trimmed.contains("#[allow(") && trimmed.contains("dead_code") {
                ViolationKind::DeadCodeAllowance
            } else if trimmed.contains(".unwrap()") || trimmed.contains(".expect(") {
                ViolationKind::PanickingUnwrap
            } else {
                continue;
            };

            self.violations.push(Violation {
                file_path: file_path.to_string(),
                line_number: index + 1,
                context: line.to_string(),
                kind,
            });
        }
    }

    /// Check all workspace crate sources below `root`
    fn check_workspace(&mut self, root: &Path) -> anyhow::Result<()> {
        for dir in Self::crate_source_dirs(root)? {
            let mut files = Vec::new();
            Self::find_rust_files(&dir, &mut files)?;

            for file in files.iter().filter(|file| !Self::is_test_file(file)) {
                let content = fs::read_to_string(file)?;
                self.check_content(&file.to_string_lossy(), &content);
            }
        }
        Ok(())
    }

    /// Report violations and return whether the check passed
    fn report_violations(&self) -> bool {
        if self.violations.is_empty() {
            println!(
                "Dead code enforcement: {} files checked, no violations found",
                self.files_checked
            );
            return true;
        }

        println!("Production code violations found:");
        println!();
        for violation in &self.violations {
            println!(
                "{}:{} ({:?})",
                violation.file_path, violation.line_number, violation.kind
            );
            println!("  {}", violation.context.trim());
            println!();
        }
        println!(
            "Found {} violation(s) in {} file(s) checked",
            self.violations.len(),
            self.files_checked
        );
        println!("Remove unused code and propagate errors with `?` instead of panicking.");

        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_test_file() {
        assert!(DeadCodeChecker::is_test_file(Path::new(
            "marquee-search/src/test_mocks.rs"
        )));
        assert!(DeadCodeChecker::is_test_file(Path::new("crate/tests/flow.rs")));

        assert!(!DeadCodeChecker::is_test_file(Path::new("marquee-search/src/lib.rs")));
        assert!(!DeadCodeChecker::is_test_file(Path::new(
            "marquee-search/src/pipeline.rs"
        )));
    }

    #[test]
    fn test_violations_before_test_module_are_flagged() {
        let mut checker = DeadCodeChecker::new();
        let content = r#"
#[allow(dead_code)]
struct Unused;

fn risky(value: Option<u32>) -> u32 {
    // value.unwrap() in a comment is fine
    value.unwrap()
}

#[cfg(test)]
mod tests {
    #[test]
    fn ok() {
        Some(1).unwrap();
    }
}
"#;

        checker.check_content("sample.rs", content);

        let kinds: Vec<_> = checker.violations.iter().map(|v| v.kind).collect();
        assert_eq!(
            kinds,
            vec![ViolationKind::DeadCodeAllowance, ViolationKind::PanickingUnwrap]
        );
        assert_eq!(checker.violations[0].line_number, 2);
        assert_eq!(checker.violations[1].line_number, 7);
    }

    #[test]
    fn dead_code_enforcement() {
        let mut checker = DeadCodeChecker::new();

        checker
            .check_workspace(Path::new(".."))
            .expect("Failed to check workspace");

        assert!(checker.files_checked > 0, "No workspace sources found");
        assert!(
            checker.report_violations(),
            "Production code violations found - see output above"
        );
    }
}
