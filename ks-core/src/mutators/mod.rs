mod build_spec;
mod image_reference;
mod pod_spec;

pub use build_spec::BuildSpecMutator;
pub use image_reference::*;
pub use pod_spec::PodSpecMutator;

use crate::errors::*;
use crate::k8s::{
    FieldErrorList,
    Object,
    build_spec,
    build_spec_mut,
    pod_spec,
    pod_spec_mut,
};

pub type ImageReferenceMutateFn<'f> = dyn FnMut(&mut ImageReference) -> EmptyResult + 'f;

// An ImageReferenceMutator visits every image reference site in an object exactly once, in a
// fixed order, and hands each one to the supplied function.  Errors from the function are
// collected (tagged with the path of the site) rather than stopping the walk.
pub trait ImageReferenceMutator {
    fn mutate(&mut self, f: &mut ImageReferenceMutateFn) -> FieldErrorList;
}

// Returns the mutator for the object's kind.  If an old version of the object is supplied, sites
// whose reference is unchanged from the old version are skipped.
pub fn image_reference_mutator<'a>(
    obj: &'a mut Object,
    old: Option<&'a Object>,
) -> anyhow::Result<Box<dyn ImageReferenceMutator + 'a>> {
    if matches!(obj, Object::Build(_) | Object::BuildConfig(_)) {
        let (spec, path) = build_spec_mut(obj)?;
        let old_spec = old.and_then(|o| build_spec(o).ok()).map(|(s, _)| s);
        return Ok(Box::new(BuildSpecMutator::new(spec, old_spec, path)));
    }

    let (spec, path) = pod_spec_mut(obj)?;
    let old_spec = old.and_then(|o| pod_spec(o).ok()).map(|(s, _)| s);
    Ok(Box::new(PodSpecMutator::new(spec, old_spec, path)))
}

#[cfg(test)]
mod tests;
