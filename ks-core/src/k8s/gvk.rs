use std::borrow::Cow;
use std::fmt;
use std::ops::Deref;

use kube::core::{
    DynamicObject,
    GroupVersionKind,
    TypeMeta,
};

use crate::errors::*;

// GVK is a "newtype" wrapper around the GroupVersionKind object so we can give it a compact
// display format ("group/version.kind", or "version.kind" for the core group) and a few
// conversion helpers.
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub struct GVK(GroupVersionKind);

impl GVK {
    pub fn new(group: &str, version: &str, kind: &str) -> GVK {
        GVK(GroupVersionKind::gvk(group, version, kind))
    }

    pub fn of<K: kube::Resource<DynamicType = ()>>() -> GVK {
        GVK::new(&K::group(&()), &K::version(&()), &K::kind(&()))
    }

    pub fn from_type_meta(tm: &TypeMeta) -> anyhow::Result<GVK> {
        let parts: Vec<_> = tm.api_version.split('/').collect();
        match parts.len() {
            1 => Ok(GVK::new("", parts[0], &tm.kind)),
            2 => Ok(GVK::new(parts[0], parts[1], &tm.kind)),
            _ => bail!("invalid format for apiVersion: {}", tm.api_version),
        }
    }

    pub fn from_dynamic_obj(obj: &DynamicObject) -> anyhow::Result<GVK> {
        match &obj.types {
            Some(t) => GVK::from_type_meta(t),
            None => bail!("no type data present"),
        }
    }

    pub fn into_type_meta(&self) -> TypeMeta {
        TypeMeta {
            api_version: self.0.api_version(),
            kind: self.0.kind.clone(),
        }
    }
}

// Impl Deref lets a GVK act like a GroupVersionKind anywhere one of those is expected
impl Deref for GVK {
    type Target = GroupVersionKind;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Display for GVK {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut group = Cow::from(&self.0.group);
        if !group.is_empty() {
            group.to_mut().push('/');
        }

        write!(f, "{group}{}.{}", self.0.version, self.0.kind)
    }
}
