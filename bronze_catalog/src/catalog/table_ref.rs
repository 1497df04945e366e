use std::fmt;

use crate::catalog::CatalogError;

/// A warehouse table name: `dataset.table`, optionally qualified by a project
/// as `project.dataset.table` or `project:dataset.table`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableRef {
    pub project: Option<String>,
    pub dataset: String,
    pub table: String,
}

impl TableRef {
    pub fn parse(name: &str) -> Result<Self, CatalogError> {
        let invalid = || CatalogError::InvalidTableName(name.to_string());
        let name = name.trim();

        let (project, rest) = match name.split_once(':') {
            Some((p, rest)) => (Some(p), rest),
            None => (None, name),
        };
        let parts: Vec<&str> = rest.split('.').collect();
        let (project, dataset, table) = match (project, parts.as_slice()) {
            (None, [p, d, t]) => (Some(*p), *d, *t),
            (p, [d, t]) => (p, *d, *t),
            _ => return Err(invalid()),
        };

        let valid = |s: &str| {
            !s.is_empty()
                && s
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        };
        if !valid(dataset) || !valid(table) || project.is_some_and(|p| !valid(p)) {
            return Err(invalid());
        }

        Ok(Self {
            project: project.map(str::to_string),
            dataset: dataset.to_string(),
            table: table.to_string(),
        })
    }

    /// Project to use, falling back to `default_project`.
    pub fn project_or<'a>(&'a self, default_project: &'a str) -> &'a str {
        self.project.as_deref().unwrap_or(default_project)
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.project {
            Some(p) => write!(f, "{p}.{}.{}", self.dataset, self.table),
            None => write!(f, "{}.{}", self.dataset, self.table),
        }
    }
}
