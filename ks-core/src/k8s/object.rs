use std::fmt;

use kube::Resource;
use kube::core::{
    DynamicObject,
    TypeMeta,
};
use serde_json as json;

use super::*;
use crate::errors::*;
use crate::prelude::*;

// Object is the closed set of kinds that kset knows how to mutate, plus a catch-all for
// everything else.  Anything that lands in `Other` is carried through untouched, and the
// mutators report it as not applicable.
#[derive(Clone, Debug)]
pub enum Object {
    Build(Build),
    BuildConfig(BuildConfig),
    DeploymentConfig(DeploymentConfig),
    Pod(corev1::Pod),
    PodTemplate(corev1::PodTemplate),
    ReplicationController(corev1::ReplicationController),
    Deployment(appsv1::Deployment),
    DaemonSet(appsv1::DaemonSet),
    ReplicaSet(appsv1::ReplicaSet),
    StatefulSet(appsv1::StatefulSet),
    Job(batchv1::Job),
    CronJob(batchv1::CronJob),
    Route(Route),
    Other(DynamicObject),
}

macro_rules! each_variant {
    ($obj:expr, $o:ident => $body:expr) => {
        match $obj {
            Object::Build($o) => $body,
            Object::BuildConfig($o) => $body,
            Object::DeploymentConfig($o) => $body,
            Object::Pod($o) => $body,
            Object::PodTemplate($o) => $body,
            Object::ReplicationController($o) => $body,
            Object::Deployment($o) => $body,
            Object::DaemonSet($o) => $body,
            Object::ReplicaSet($o) => $body,
            Object::StatefulSet($o) => $body,
            Object::Job($o) => $body,
            Object::CronJob($o) => $body,
            Object::Route($o) => $body,
            Object::Other($o) => $body,
        }
    };
}

impl Object {
    pub fn from_value(value: json::Value) -> anyhow::Result<Object> {
        let field = |key: &str| value.get(key).and_then(|v| v.as_str()).unwrap_or_default().to_string();
        let tm = TypeMeta { api_version: field("apiVersion"), kind: field("kind") };
        if tm.api_version.is_empty() || tm.kind.is_empty() {
            bail!("object is missing apiVersion or kind");
        }
        let gvk = GVK::from_type_meta(&tm)?;

        let obj = if gvk == GVK::of::<Build>() {
            Object::Build(json::from_value(value)?)
        } else if gvk == GVK::of::<BuildConfig>() {
            Object::BuildConfig(json::from_value(value)?)
        } else if gvk == GVK::of::<DeploymentConfig>() {
            Object::DeploymentConfig(json::from_value(value)?)
        } else if gvk == GVK::of::<corev1::Pod>() {
            Object::Pod(json::from_value(value)?)
        } else if gvk == GVK::of::<corev1::PodTemplate>() {
            Object::PodTemplate(json::from_value(value)?)
        } else if gvk == GVK::of::<corev1::ReplicationController>() {
            Object::ReplicationController(json::from_value(value)?)
        } else if gvk == GVK::of::<appsv1::Deployment>() {
            Object::Deployment(json::from_value(value)?)
        } else if gvk == GVK::of::<appsv1::DaemonSet>() {
            Object::DaemonSet(json::from_value(value)?)
        } else if gvk == GVK::of::<appsv1::ReplicaSet>() {
            Object::ReplicaSet(json::from_value(value)?)
        } else if gvk == GVK::of::<appsv1::StatefulSet>() {
            Object::StatefulSet(json::from_value(value)?)
        } else if gvk == GVK::of::<batchv1::Job>() {
            Object::Job(json::from_value(value)?)
        } else if gvk == GVK::of::<batchv1::CronJob>() {
            Object::CronJob(json::from_value(value)?)
        } else if gvk == GVK::of::<Route>() {
            Object::Route(json::from_value(value)?)
        } else {
            Object::Other(json::from_value(value)?)
        };

        Ok(obj)
    }

    pub fn gvk(&self) -> GVK {
        match self {
            Object::Build(_) => GVK::of::<Build>(),
            Object::BuildConfig(_) => GVK::of::<BuildConfig>(),
            Object::DeploymentConfig(_) => GVK::of::<DeploymentConfig>(),
            Object::Pod(_) => GVK::of::<corev1::Pod>(),
            Object::PodTemplate(_) => GVK::of::<corev1::PodTemplate>(),
            Object::ReplicationController(_) => GVK::of::<corev1::ReplicationController>(),
            Object::Deployment(_) => GVK::of::<appsv1::Deployment>(),
            Object::DaemonSet(_) => GVK::of::<appsv1::DaemonSet>(),
            Object::ReplicaSet(_) => GVK::of::<appsv1::ReplicaSet>(),
            Object::StatefulSet(_) => GVK::of::<appsv1::StatefulSet>(),
            Object::Job(_) => GVK::of::<batchv1::Job>(),
            Object::CronJob(_) => GVK::of::<batchv1::CronJob>(),
            Object::Route(_) => GVK::of::<Route>(),
            Object::Other(o) => GVK::from_dynamic_obj(o).unwrap_or_else(|_| GVK::new("", "v1", "Unknown")),
        }
    }

    pub fn kind(&self) -> String {
        self.gvk().kind.clone()
    }

    pub fn meta(&self) -> &metav1::ObjectMeta {
        each_variant!(self, o => o.meta())
    }

    pub fn meta_mut(&mut self) -> &mut metav1::ObjectMeta {
        each_variant!(self, o => o.meta_mut())
    }

    pub fn name(&self) -> String {
        self.meta().name.clone().unwrap_or_default()
    }

    pub fn namespace(&self) -> Option<String> {
        self.meta().namespace.clone()
    }

    pub fn info(&self) -> ObjectInfo {
        ObjectInfo { gvk: self.gvk(), namespace: self.namespace(), name: self.name() }
    }

    // A dynamic object can be read without type data; fill it in so that the printed object can
    // always be read back in
    pub fn to_value(&self) -> anyhow::Result<json::Value> {
        let mut value = each_variant!(self, o => json::to_value(o)?);
        if let json::Value::Object(map) = &mut value {
            let tm = self.gvk().into_type_meta();
            map.entry("apiVersion").or_insert(json::Value::String(tm.api_version));
            map.entry("kind").or_insert(json::Value::String(tm.kind));
        }
        Ok(value)
    }
}

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct ObjectInfo {
    pub gvk: GVK,
    pub namespace: Option<String>,
    pub name: String,
}

impl fmt::Display for ObjectInfo {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}/{}", self.gvk.kind.to_lowercase(), self.name)
    }
}
