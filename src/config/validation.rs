//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check route declarations are well-formed (absolute paths, actions)
//! - Detect duplicate declarations that could never both match
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function: RouterConfig → Result<(), Vec<ValidationError>>
//! - Runs before the config is accepted into the system

use std::fmt;

use crate::config::schema::RouterConfig;

/// One semantic problem found in a config.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    EmptyPath { index: usize },
    RelativePath { index: usize, path: String },
    EmptyAction { index: usize },
    DuplicateRoute { index: usize, path: String },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::EmptyPath { index } => {
                write!(f, "route #{index}: path is empty")
            }
            ValidationError::RelativePath { index, path } => {
                write!(f, "route #{index}: path \"{path}\" must start with '/'")
            }
            ValidationError::EmptyAction { index } => {
                write!(f, "route #{index}: action is empty")
            }
            ValidationError::DuplicateRoute { index, path } => {
                write!(
                    f,
                    "route #{index}: \"{path}\" repeats an earlier declaration with the same methods"
                )
            }
        }
    }
}

/// Validate a parsed config, collecting every error.
pub fn validate_config(config: &RouterConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let mut seen: Vec<(&str, Vec<&str>)> = Vec::new();

    for (index, spec) in config.routes.iter().enumerate() {
        if spec.path.is_empty() {
            errors.push(ValidationError::EmptyPath { index });
        } else if !spec.path.starts_with('/') {
            errors.push(ValidationError::RelativePath {
                index,
                path: spec.path.clone(),
            });
        }

        if spec.action.is_empty() {
            errors.push(ValidationError::EmptyAction { index });
        }

        let mut methods: Vec<&str> = spec.methods.iter().map(|m| m.as_str()).collect();
        methods.sort_unstable();
        methods.dedup();
        let key = (spec.path.as_str(), methods);
        if seen.contains(&key) {
            errors.push(ValidationError::DuplicateRoute {
                index,
                path: spec.path.clone(),
            });
        } else {
            seen.push(key);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
