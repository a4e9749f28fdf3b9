use std::fmt;

use crate::errors::*;

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
enum PathStep {
    Field(String),
    Index(usize),
}

// FieldPath is only used to say _where_ something went wrong; it's rendered in the same
// `a.b[2].c` style that the API server uses in its validation errors.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct FieldPath(Vec<PathStep>);

impl FieldPath {
    pub fn new(root: &str) -> FieldPath {
        FieldPath(vec![PathStep::Field(root.into())])
    }

    pub fn from_fields(fields: &[&str]) -> FieldPath {
        FieldPath(fields.iter().map(|f| PathStep::Field((*f).into())).collect())
    }

    pub fn child(&self, name: &str) -> FieldPath {
        self.with(PathStep::Field(name.into()))
    }

    pub fn children(&self, names: &[&str]) -> FieldPath {
        names.iter().fold(self.clone(), |path, name| path.child(name))
    }

    pub fn index(&self, i: usize) -> FieldPath {
        self.with(PathStep::Index(i))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn with(&self, step: PathStep) -> FieldPath {
        let mut steps = self.0.clone();
        steps.push(step);
        FieldPath(steps)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, step) in self.0.iter().enumerate() {
            match step {
                PathStep::Field(name) if i == 0 => write!(f, "{name}")?,
                PathStep::Field(name) => write!(f, ".{name}")?,
                PathStep::Index(idx) => write!(f, "[{idx}]")?,
            }
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
#[error("{path}: {err:#}")]
pub struct FieldError {
    pub path: FieldPath,
    pub err: anyhow::Error,
}

impl FieldError {
    pub fn new(path: FieldPath, err: anyhow::Error) -> FieldError {
        FieldError { path, err }
    }
}

#[derive(Debug, Default)]
pub struct FieldErrorList(Vec<FieldError>);

impl FieldErrorList {
    pub fn new() -> FieldErrorList {
        FieldErrorList(vec![])
    }

    pub fn push(&mut self, path: FieldPath, err: anyhow::Error) {
        self.0.push(FieldError::new(path, err));
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    pub fn paths(&self) -> Vec<String> {
        self.0.iter().map(|e| e.path.to_string()).collect()
    }

    pub fn into_result(self) -> EmptyResult {
        if self.is_empty() { Ok(()) } else { Err(anyhow!(self)) }
    }
}

impl IntoIterator for FieldErrorList {
    type Item = FieldError;
    type IntoIter = std::vec::IntoIter<FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl fmt::Display for FieldErrorList {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let msgs: Vec<_> = self.0.iter().map(|e| e.to_string()).collect();
        if msgs.len() == 1 {
            write!(f, "{}", msgs[0])
        } else {
            write!(f, "[{}]", msgs.join(", "))
        }
    }
}

impl std::error::Error for FieldErrorList {}
