use ks_api::v1::CommonSpec;

use super::*;
use crate::k8s::FieldPath;
use crate::prelude::*;

// Visits, in order: every `source.images[i].from`, then the `from` of the custom, docker, and
// source strategies (whichever are present).
pub struct BuildSpecMutator<'a> {
    spec: &'a mut CommonSpec,
    old: Option<&'a CommonSpec>,
    path: FieldPath,
}

impl<'a> BuildSpecMutator<'a> {
    pub fn new(spec: &'a mut CommonSpec, old: Option<&'a CommonSpec>, path: FieldPath) -> BuildSpecMutator<'a> {
        BuildSpecMutator { spec, old, path }
    }
}

impl ImageReferenceMutator for BuildSpecMutator<'_> {
    fn mutate(&mut self, f: &mut ImageReferenceMutateFn) -> FieldErrorList {
        let mut errs = FieldErrorList::new();

        // Image sources are compared against the whole old list rather than position-by-position,
        // so that inserting a new source doesn't cause every source after it to be revisited.
        let old_images: Option<Vec<ImageReference>> = self
            .old
            .map(|o| o.source.images.iter().flatten().map(|i| ImageReference::from(&i.from)).collect());
        if let Some(images) = self.spec.source.images.as_mut() {
            let images_path = self.path.children(&["source", "images"]);
            for (i, image) in images.iter_mut().enumerate() {
                let current = ImageReference::from(&image.from);
                if old_images.as_ref().is_some_and(|old| old.contains(&current)) {
                    continue;
                }
                visit(&mut image.from, f, images_path.index(i).children(&["from", "name"]), &mut errs);
            }
        }

        let old_strategy = self.old.map(|o| &o.strategy);
        let strategy_path = self.path.child("strategy");
        let strategy = &mut self.spec.strategy;

        if let Some(custom) = strategy.custom_strategy.as_mut() {
            let old_from = old_strategy.and_then(|s| s.custom_strategy.as_ref()).map(|s| &s.from);
            if !unchanged(&custom.from, old_from) {
                let path = strategy_path.children(&["customStrategy", "from", "name"]);
                visit(&mut custom.from, f, path, &mut errs);
            }
        }

        if let Some(from) = strategy.docker_strategy.as_mut().and_then(|s| s.from.as_mut()) {
            let old_from = old_strategy.and_then(|s| s.docker_strategy.as_ref()).and_then(|s| s.from.as_ref());
            if !unchanged(from, old_from) {
                let path = strategy_path.children(&["dockerStrategy", "from", "name"]);
                visit(from, f, path, &mut errs);
            }
        }

        if let Some(source) = strategy.source_strategy.as_mut() {
            let old_from = old_strategy.and_then(|s| s.source_strategy.as_ref()).map(|s| &s.from);
            if !unchanged(&source.from, old_from) {
                let path = strategy_path.children(&["sourceStrategy", "from", "name"]);
                visit(&mut source.from, f, path, &mut errs);
            }
        }

        errs
    }
}

fn unchanged(current: &corev1::ObjectReference, old: Option<&corev1::ObjectReference>) -> bool {
    old.is_some_and(|o| ImageReference::from(o) == ImageReference::from(current))
}

fn visit(
    obj_ref: &mut corev1::ObjectReference,
    f: &mut ImageReferenceMutateFn,
    path: FieldPath,
    errs: &mut FieldErrorList,
) {
    let mut image_ref = ImageReference::from(&*obj_ref);
    match f(&mut image_ref) {
        Ok(()) => image_ref.write_to(obj_ref),
        Err(err) => errs.push(path, err),
    }
}
