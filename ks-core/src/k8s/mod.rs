mod field_path;
mod gvk;
mod locator;
mod object;

pub use field_path::*;
pub use gvk::*;
pub use locator::*;
pub use object::*;

use crate::errors::*;

err_impl! {KubernetesError,
    #[error("{0}")]
    NotApplicable(String),
}

#[cfg(test)]
mod tests;
