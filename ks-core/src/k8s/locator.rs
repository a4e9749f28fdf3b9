use ks_api::v1::CommonSpec;

use super::*;
use crate::prelude::*;

// The locator functions give everything else in kset a uniform view into the object kinds it
// knows about.  Kinds outside the supported set, and objects which are missing the relevant
// structure, are reported as NotApplicable so that callers can skip them.

pub fn pod_spec_path(obj: &Object) -> anyhow::Result<FieldPath> {
    match obj {
        Object::Pod(_) => Ok(FieldPath::from_fields(&["spec"])),
        Object::PodTemplate(_) => Ok(FieldPath::from_fields(&["template", "spec"])),
        Object::ReplicationController(_)
        | Object::Deployment(_)
        | Object::DaemonSet(_)
        | Object::ReplicaSet(_)
        | Object::StatefulSet(_)
        | Object::Job(_)
        | Object::DeploymentConfig(_) => Ok(FieldPath::from_fields(&["spec", "template", "spec"])),
        Object::CronJob(_) => Ok(FieldPath::from_fields(&["spec", "jobTemplate", "spec", "template", "spec"])),
        Object::Build(_) | Object::BuildConfig(_) | Object::Route(_) | Object::Other(_) => {
            Err(KubernetesError::not_applicable(&format!("{} does not have a pod spec", obj.info())))
        },
    }
}

pub fn pod_spec(obj: &Object) -> anyhow::Result<(&corev1::PodSpec, FieldPath)> {
    let path = pod_spec_path(obj)?;
    let maybe_spec = match obj {
        Object::Pod(o) => o.spec.as_ref(),
        Object::PodTemplate(o) => o.template.as_ref().and_then(|t| t.spec.as_ref()),
        Object::ReplicationController(o) => {
            o.spec.as_ref().and_then(|s| s.template.as_ref()).and_then(|t| t.spec.as_ref())
        },
        Object::Deployment(o) => o.spec.as_ref().and_then(|s| s.template.spec.as_ref()),
        Object::DaemonSet(o) => o.spec.as_ref().and_then(|s| s.template.spec.as_ref()),
        Object::ReplicaSet(o) => o.spec.as_ref().and_then(|s| s.template.as_ref()).and_then(|t| t.spec.as_ref()),
        Object::StatefulSet(o) => o.spec.as_ref().and_then(|s| s.template.spec.as_ref()),
        Object::Job(o) => o.spec.as_ref().and_then(|s| s.template.spec.as_ref()),
        Object::CronJob(o) => o
            .spec
            .as_ref()
            .and_then(|s| s.job_template.spec.as_ref())
            .and_then(|j| j.template.spec.as_ref()),
        Object::DeploymentConfig(o) => o.spec.template.as_ref().and_then(|t| t.spec.as_ref()),
        Object::Build(_) | Object::BuildConfig(_) | Object::Route(_) | Object::Other(_) => None,
    };

    match maybe_spec {
        Some(spec) => Ok((spec, path)),
        None => Err(KubernetesError::not_applicable(&format!("{} has no {path}", obj.info()))),
    }
}

pub fn pod_spec_mut(obj: &mut Object) -> anyhow::Result<(&mut corev1::PodSpec, FieldPath)> {
    let path = pod_spec_path(obj)?;
    let info = obj.info();
    let maybe_spec = match obj {
        Object::Pod(o) => o.spec.as_mut(),
        Object::PodTemplate(o) => o.template.as_mut().and_then(|t| t.spec.as_mut()),
        Object::ReplicationController(o) => {
            o.spec.as_mut().and_then(|s| s.template.as_mut()).and_then(|t| t.spec.as_mut())
        },
        Object::Deployment(o) => o.spec.as_mut().and_then(|s| s.template.spec.as_mut()),
        Object::DaemonSet(o) => o.spec.as_mut().and_then(|s| s.template.spec.as_mut()),
        Object::ReplicaSet(o) => o.spec.as_mut().and_then(|s| s.template.as_mut()).and_then(|t| t.spec.as_mut()),
        Object::StatefulSet(o) => o.spec.as_mut().and_then(|s| s.template.spec.as_mut()),
        Object::Job(o) => o.spec.as_mut().and_then(|s| s.template.spec.as_mut()),
        Object::CronJob(o) => o
            .spec
            .as_mut()
            .and_then(|s| s.job_template.spec.as_mut())
            .and_then(|j| j.template.spec.as_mut()),
        Object::DeploymentConfig(o) => o.spec.template.as_mut().and_then(|t| t.spec.as_mut()),
        Object::Build(_) | Object::BuildConfig(_) | Object::Route(_) | Object::Other(_) => None,
    };

    match maybe_spec {
        Some(spec) => Ok((spec, path)),
        None => Err(KubernetesError::not_applicable(&format!("{info} has no {path}"))),
    }
}

pub fn has_pod_spec(obj: &Object) -> bool {
    pod_spec(obj).is_ok()
}

pub fn build_spec(obj: &Object) -> anyhow::Result<(&CommonSpec, FieldPath)> {
    match obj {
        Object::Build(o) => Ok((&o.spec.common, FieldPath::new("spec"))),
        Object::BuildConfig(o) => Ok((&o.spec.common, FieldPath::new("spec"))),
        _ => Err(KubernetesError::not_applicable(&format!("{} does not have a build spec", obj.info()))),
    }
}

pub fn build_spec_mut(obj: &mut Object) -> anyhow::Result<(&mut CommonSpec, FieldPath)> {
    let info = obj.info();
    match obj {
        Object::Build(o) => Ok((&mut o.spec.common, FieldPath::new("spec"))),
        Object::BuildConfig(o) => Ok((&mut o.spec.common, FieldPath::new("spec"))),
        _ => Err(KubernetesError::not_applicable(&format!("{info} does not have a build spec"))),
    }
}

pub fn is_not_applicable(err: &anyhow::Error) -> bool {
    matches!(err.downcast_ref::<KubernetesError>(), Some(KubernetesError::NotApplicable(_)))
}
