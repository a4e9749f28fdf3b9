mod annotations;
mod build_config;
mod deployment_config;
mod update;

use std::collections::BTreeSet;

pub use ks_api::v1::WebHookTrigger;
pub use update::*;

use crate::errors::*;
use crate::k8s::Object;
use crate::patch::Mutation;
use crate::prelude::*;

err_impl! {TriggerError,
    #[error("{0} does not support triggers")]
    Unsupported(String),

    #[error("{0}")]
    Invalid(String),
}

// An image change trigger, independent of how the object kind stores it.  `namespace` is None
// when the image stream lives in the same namespace as the object.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ImageChangeTrigger {
    pub auto: bool,
    pub from: String,
    pub namespace: Option<String>,
    pub names: Vec<String>,
}

// TriggerDefinition is the kind-independent view of the triggers on an object.  It's read from
// an object, changed, and then applied back; applying an unchanged definition leaves the object's
// triggers exactly as they were.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct TriggerDefinition {
    pub config_change: bool,
    pub image_change: Vec<ImageChangeTrigger>,
    pub generic_webhooks: Vec<WebHookTrigger>,
    pub github_webhooks: Vec<WebHookTrigger>,
    pub gitlab_webhooks: Vec<WebHookTrigger>,
    pub bitbucket_webhooks: Vec<WebHookTrigger>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TriggerRow {
    pub type_: String,
    pub value: String,
    pub auto: String,
}

impl TriggerDefinition {
    // Objects without a namespace of their own are treated as living in `default_ns`; image
    // stream tags in that namespace are read and written without one
    pub fn read(obj: &Object, default_ns: Option<&str>) -> anyhow::Result<TriggerDefinition> {
        let ns = effective_namespace(obj, default_ns);
        let ns = ns.as_deref();
        match obj {
            Object::BuildConfig(bc) => Ok(build_config::read(bc, ns)),
            Object::DeploymentConfig(dc) => Ok(deployment_config::read(dc, ns)),
            Object::Deployment(_) | Object::DaemonSet(_) | Object::StatefulSet(_) | Object::CronJob(_) => {
                annotations::read(obj, ns)
            },
            _ => Err(TriggerError::unsupported(&obj.info().to_string())),
        }
    }

    pub fn apply(&self, obj: &mut Object, default_ns: Option<&str>) -> EmptyResult {
        let ns = effective_namespace(obj, default_ns);
        let ns = ns.as_deref();
        match obj {
            Object::BuildConfig(bc) => build_config::apply(self, bc, ns),
            Object::DeploymentConfig(dc) => deployment_config::apply(self, dc, ns),
            Object::Deployment(_) | Object::DaemonSet(_) | Object::StatefulSet(_) | Object::CronJob(_) => {
                annotations::apply(self, obj, ns)
            },
            _ => Err(TriggerError::unsupported(&obj.info().to_string())),
        }
    }

    // One row per trigger, for display
    pub fn rows(&self) -> Vec<TriggerRow> {
        let row = |type_: &str, value: String, auto: String| TriggerRow { type_: type_.into(), value, auto };

        let mut rows = vec![row("config", "".into(), self.config_change.to_string())];
        for image in &self.image_change {
            let from = match &image.namespace {
                Some(ns) => format!("{ns}/{}", image.from),
                None => image.from.clone(),
            };
            let value = if image.names.is_empty() { from } else { format!("{from} ({})", image.names.join(", ")) };
            rows.push(row("image", value, image.auto.to_string()));
        }
        for hook in &self.generic_webhooks {
            let value = if hook.allow_env.unwrap_or(false) { "<secret>, allowenv" } else { "<secret>" };
            rows.push(row("webhook", value.into(), "".into()));
        }
        for (type_, hooks) in [
            ("github", &self.github_webhooks),
            ("gitlab", &self.gitlab_webhooks),
            ("bitbucket", &self.bitbucket_webhooks),
        ] {
            rows.extend(hooks.iter().map(|_| row(type_, "<secret>".into(), "".into())));
        }
        rows
    }

    fn ensure_no_webhooks(&self, prefix: &str) -> EmptyResult {
        for (hooks, name) in [
            (&self.github_webhooks, "GitHub web hooks"),
            (&self.generic_webhooks, "web hooks"),
            (&self.gitlab_webhooks, "GitLab web hooks"),
            (&self.bitbucket_webhooks, "Bitbucket web hooks"),
        ] {
            if !hooks.is_empty() {
                return Err(TriggerError::invalid(&format!("{prefix} {name}")));
            }
        }
        Ok(())
    }
}

pub fn supports_triggers(obj: &Object) -> bool {
    matches!(
        obj,
        Object::BuildConfig(_)
            | Object::DeploymentConfig(_)
            | Object::Deployment(_)
            | Object::DaemonSet(_)
            | Object::StatefulSet(_)
            | Object::CronJob(_)
    )
}

// Reads the triggers off the object, hands them to `f`, and writes the result back.  Objects that
// don't support triggers are left alone.
pub fn update_triggers_for_object<F>(obj: &mut Object, default_ns: Option<&str>, f: F) -> Mutation
where
    F: FnOnce(&mut TriggerDefinition) -> EmptyResult,
{
    if !supports_triggers(obj) {
        return Mutation::Unchanged;
    }

    let mut triggers = match TriggerDefinition::read(obj, default_ns) {
        Ok(t) => t,
        Err(err) => return Mutation::Failed(err),
    };
    if let Err(err) = f(&mut triggers) {
        return Mutation::Failed(err);
    }
    triggers.apply(obj, default_ns).into()
}

pub fn effective_namespace(obj: &Object, default_ns: Option<&str>) -> Option<String> {
    obj.namespace().filter(|ns| !ns.is_empty()).or_else(|| default_ns.map(String::from))
}

// Returns None if the namespace is unset or matches the default, otherwise the namespace
pub(crate) fn default_namespace(namespace: Option<&str>, default: Option<&str>) -> Option<String> {
    match namespace {
        Some(ns) if !ns.is_empty() && Some(ns) != default => Some(ns.into()),
        _ => None,
    }
}

// Keeps every existing trigger that still matches something in the new list (so that fields set
// by the server are left alone), then adds the new triggers that weren't already there.
pub(crate) fn merge_triggers<T>(existing: Vec<T>, new: Vec<T>, same: impl Fn(&T, &T) -> bool) -> Vec<T> {
    let mut result: Vec<T> = existing.into_iter().filter(|e| new.iter().any(|n| same(e, n))).collect();
    for n in new {
        if !result.iter().any(|r| same(r, &n)) {
            result.push(n);
        }
    }
    result
}

pub(crate) fn container_names(spec: Option<&corev1::PodSpec>) -> BTreeSet<String> {
    let Some(spec) = spec else { return BTreeSet::new() };
    spec.containers
        .iter()
        .chain(spec.init_containers.iter().flatten())
        .map(|c| c.name.clone())
        .collect()
}

pub(crate) fn validate_container_names(trigger: &ImageChangeTrigger, all_names: &BTreeSet<String>) -> EmptyResult {
    if trigger.names.is_empty() {
        return Err(TriggerError::invalid("you must specify --containers when setting --from-image"));
    }

    let missing: BTreeSet<_> = trigger.names.iter().filter(|n| !all_names.contains(*n)).cloned().collect();
    if !missing.is_empty() {
        return Err(TriggerError::invalid(&format!(
            "not all container names exist: {} (accepts: {})",
            missing.into_iter().collect::<Vec<_>>().join(", "),
            all_names.iter().cloned().collect::<Vec<_>>().join(", "),
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests;
