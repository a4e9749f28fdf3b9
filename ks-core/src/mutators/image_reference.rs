use std::fmt;

use crate::prelude::*;

// ImageReference is the kind-independent view of a reference site: builds use object references,
// pod specs use bare image strings (which are always DockerImage references).
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct ImageReference {
    pub kind: String,
    pub name: String,
    pub namespace: Option<String>,
}

impl ImageReference {
    pub fn new(kind: &str, name: &str, namespace: Option<&str>) -> ImageReference {
        ImageReference {
            kind: kind.into(),
            name: name.into(),
            namespace: namespace.filter(|ns| !ns.is_empty()).map(|ns| ns.into()),
        }
    }

    pub fn docker_image(name: &str) -> ImageReference {
        ImageReference::new(DOCKER_IMAGE_KIND, name, None)
    }

    pub fn is_docker_image(&self) -> bool {
        self.kind == DOCKER_IMAGE_KIND
    }

    // Only the fields that actually changed are written, so that a reference which comes back from
    // the mutate function untouched leaves the object byte-for-byte identical
    pub fn write_to(&self, obj_ref: &mut corev1::ObjectReference) {
        let current = ImageReference::from(&*obj_ref);
        if current.kind != self.kind {
            obj_ref.kind = Some(self.kind.clone());
        }
        if current.name != self.name {
            obj_ref.name = Some(self.name.clone());
        }
        if current.namespace != self.namespace {
            obj_ref.namespace = self.namespace.clone();
        }
    }
}

impl From<&corev1::ObjectReference> for ImageReference {
    fn from(obj_ref: &corev1::ObjectReference) -> ImageReference {
        ImageReference::new(
            obj_ref.kind.as_deref().unwrap_or_default(),
            obj_ref.name.as_deref().unwrap_or_default(),
            obj_ref.namespace.as_deref(),
        )
    }
}

impl From<&ImageReference> for corev1::ObjectReference {
    fn from(image_ref: &ImageReference) -> corev1::ObjectReference {
        let mut obj_ref = corev1::ObjectReference::default();
        image_ref.write_to(&mut obj_ref);
        obj_ref
    }
}

impl fmt::Display for ImageReference {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{}/{ns}/{}", self.kind, self.name),
            None => write!(f, "{}/{}", self.kind, self.name),
        }
    }
}
