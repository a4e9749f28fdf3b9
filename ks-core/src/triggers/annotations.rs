use std::collections::BTreeMap;

use ks_api::v1::{
    ObjectFieldReference,
    ObjectFieldTrigger,
};
use lazy_static::lazy_static;
use regex::Regex;
use serde_json as json;
use tracing::*;

use super::*;
use crate::k8s::{
    FieldPath,
    pod_spec,
};

// Kinds without a native trigger field store image triggers in an annotation, as a JSON list of
// {from, fieldPath, paused} entries.  Each entry points at a single container's image by name.
// Entries that kset doesn't understand are carried through untouched.

lazy_static! {
    static ref CONTAINER_FIELD_PATH: Regex =
        Regex::new(r#"^(containers|initContainers)\[\?\(@\.name=="([^"]+)"\)\]\.(.+)$"#).unwrap();
}

pub(super) fn read(obj: &Object, ns: Option<&str>) -> anyhow::Result<TriggerDefinition> {
    let mut t = TriggerDefinition { config_change: true, ..Default::default() };
    if let Object::Deployment(depl) = obj {
        t.config_change = !depl.spec.as_ref().and_then(|s| s.paused).unwrap_or(false);
    }

    let entries = annotation_entries(obj)?;
    if entries.is_empty() {
        return Ok(t);
    }

    let (spec, path) = pod_spec(obj)?;
    for entry in &entries {
        let Some((trigger, container)) = parse_entry(entry, spec, &path) else {
            debug!("skipping unrecognized trigger on {}: {entry}", obj.info());
            continue;
        };
        t.image_change.push(ImageChangeTrigger {
            auto: !trigger.paused,
            from: trigger.from.name,
            namespace: default_namespace(Some(trigger.from.namespace.as_str()), ns),
            names: vec![container],
        });
    }
    Ok(t)
}

pub(super) fn apply(t: &TriggerDefinition, obj: &mut Object, ns: Option<&str>) -> EmptyResult {
    t.ensure_no_webhooks(&format!("{} does not support", obj.info()))?;

    let entries = annotation_entries(obj)?;
    let (spec, path) = pod_spec(obj)?;
    let all_names = container_names(Some(spec));

    let mut already_triggered = BTreeSet::new();
    let mut triggers = vec![];
    for trigger in &t.image_change {
        validate_container_names(trigger, &all_names)?;

        let duplicates: Vec<_> = trigger.names.iter().filter(|n| already_triggered.contains(*n)).cloned().collect();
        if !duplicates.is_empty() {
            return Err(TriggerError::invalid(&format!(
                "only one trigger may reference each container: {}",
                duplicates.join(", ")
            )));
        }
        already_triggered.extend(trigger.names.iter().cloned());

        for name in &trigger.names {
            let list = if spec.containers.iter().any(|c| &c.name == name) { "containers" } else { "initContainers" };
            triggers.push(ObjectFieldTrigger {
                from: ObjectFieldReference {
                    kind: IMAGE_STREAM_TAG_KIND.into(),
                    name: trigger.from.clone(),
                    namespace: default_namespace(trigger.namespace.as_deref(), ns).unwrap_or_default(),
                    ..Default::default()
                },
                field_path: format!("{}[?(@.name==\"{name}\")].image", path.child(list)),
                paused: !trigger.auto,
            });
        }
    }

    // Same merge as the other kinds, except that entries which couldn't be parsed are always kept
    let mut result = vec![];
    let mut kept = vec![];
    let mut changed = false;
    for entry in entries {
        match parse_entry(&entry, spec, &path) {
            None => result.push(entry),
            Some((existing, _)) if triggers.iter().any(|n| same_trigger(&existing, n, ns)) => {
                kept.push(existing);
                result.push(entry);
            },
            Some(_) => changed = true,
        }
    }
    for trigger in triggers {
        if !kept.iter().any(|k| same_trigger(k, &trigger, ns)) {
            result.push(json::to_value(&trigger)?);
            kept.push(trigger);
            changed = true;
        }
    }

    if changed {
        let value = json::to_string(&result)?;
        obj.meta_mut()
            .annotations
            .get_or_insert_with(BTreeMap::new)
            .insert(TRIGGER_ANNOTATION_KEY.into(), value);
    }

    // Turning off the config change trigger pauses a deployment
    if let Object::Deployment(depl) = obj
        && let Some(spec) = depl.spec.as_mut()
        && spec.paused.unwrap_or(false) == t.config_change
    {
        spec.paused = Some(!t.config_change);
    }
    Ok(())
}

fn annotation_entries(obj: &Object) -> anyhow::Result<Vec<json::Value>> {
    match obj.meta().annotations.as_ref().and_then(|a| a.get(TRIGGER_ANNOTATION_KEY)) {
        Some(raw) => json::from_str(raw)
            .map_err(|err| TriggerError::invalid(&format!("invalid {TRIGGER_ANNOTATION_KEY} annotation: {err}"))),
        None => Ok(vec![]),
    }
}

// Returns the parsed trigger along with the name of the container it refers to, or None if the
// entry doesn't point at the image of a container in the pod spec
fn parse_entry(entry: &json::Value, spec: &corev1::PodSpec, path: &FieldPath) -> Option<(ObjectFieldTrigger, String)> {
    let trigger: ObjectFieldTrigger = json::from_value(entry.clone()).ok()?;
    let relative = trigger.field_path.strip_prefix(&format!("{path}."))?;
    let caps = CONTAINER_FIELD_PATH.captures(relative)?;
    if &caps[3] != "image" {
        return None;
    }

    let name = caps[2].to_string();
    let exists = match &caps[1] {
        "containers" => spec.containers.iter().any(|c| c.name == name),
        _ => spec.init_containers.iter().flatten().any(|c| c.name == name),
    };
    exists.then_some((trigger, name))
}

fn same_trigger(a: &ObjectFieldTrigger, b: &ObjectFieldTrigger, ns: Option<&str>) -> bool {
    let kind = |r: &ObjectFieldReference| {
        if r.kind.is_empty() { IMAGE_STREAM_TAG_KIND.to_string() } else { r.kind.clone() }
    };
    let namespace = |r: &ObjectFieldReference| default_namespace(Some(r.namespace.as_str()), ns);
    a.field_path == b.field_path
        && a.paused == b.paused
        && a.from.name == b.from.name
        && kind(&a.from) == kind(&b.from)
        && namespace(&a.from) == namespace(&b.from)
}
