use super::*;
use crate::k8s::FieldPath;
use crate::prelude::*;

// Visits `initContainers[i].image` and then `containers[i].image`.  When an old pod spec is
// supplied, containers are matched up with the old version by name.
pub struct PodSpecMutator<'a> {
    spec: &'a mut corev1::PodSpec,
    old: Option<&'a corev1::PodSpec>,
    path: FieldPath,
}

impl<'a> PodSpecMutator<'a> {
    pub fn new(
        spec: &'a mut corev1::PodSpec,
        old: Option<&'a corev1::PodSpec>,
        path: FieldPath,
    ) -> PodSpecMutator<'a> {
        PodSpecMutator { spec, old, path }
    }
}

impl ImageReferenceMutator for PodSpecMutator<'_> {
    fn mutate(&mut self, f: &mut ImageReferenceMutateFn) -> FieldErrorList {
        let mut errs = FieldErrorList::new();

        let old_init = self.old.and_then(|o| o.init_containers.as_deref());
        if let Some(containers) = self.spec.init_containers.as_mut() {
            let path = self.path.child("initContainers");
            visit_containers(containers, old_init, f, &path, &mut errs);
        }

        let old_containers = self.old.map(|o| o.containers.as_slice());
        let path = self.path.child("containers");
        visit_containers(&mut self.spec.containers, old_containers, f, &path, &mut errs);

        errs
    }
}

fn visit_containers(
    containers: &mut [corev1::Container],
    old: Option<&[corev1::Container]>,
    f: &mut ImageReferenceMutateFn,
    path: &FieldPath,
    errs: &mut FieldErrorList,
) {
    for (i, container) in containers.iter_mut().enumerate() {
        let old_container = old.and_then(|cs| cs.iter().find(|c| c.name == container.name));
        if old_container.is_some_and(|c| c.image == container.image) {
            continue;
        }

        let image = container.image.as_deref().unwrap_or_default();
        let mut image_ref = ImageReference::docker_image(image);
        let image_path = path.index(i).child("image");
        match f(&mut image_ref) {
            Ok(()) if !image_ref.is_docker_image() => errs.push(
                image_path,
                anyhow!("pod specs may only contain references to docker images, not {}", image_ref.kind),
            ),
            Ok(()) => {
                if image_ref.name != image {
                    container.image = Some(image_ref.name);
                }
            },
            Err(err) => errs.push(image_path, err),
        }
    }
}
