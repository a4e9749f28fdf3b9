use ks_api::v1::{
    DeploymentTriggerImageChangeParams,
    DeploymentTriggerPolicy,
    DeploymentTriggerType,
};

use super::*;
use crate::mutators::ImageReference;

pub(super) fn read(dc: &DeploymentConfig, ns: Option<&str>) -> TriggerDefinition {
    let mut t = TriggerDefinition::default();
    for policy in dc.spec.triggers.iter().flatten() {
        match policy.type_ {
            DeploymentTriggerType::ConfigChange => t.config_change = true,
            DeploymentTriggerType::ImageChange => {
                if let Some(params) = &policy.image_change_params {
                    t.image_change.push(ImageChangeTrigger {
                        auto: params.automatic.unwrap_or(false),
                        from: params.from.name.clone().unwrap_or_default(),
                        namespace: default_namespace(params.from.namespace.as_deref(), ns),
                        names: params.container_names.clone().unwrap_or_default(),
                    });
                }
            },
        }
    }
    t
}

pub(super) fn apply(t: &TriggerDefinition, dc: &mut DeploymentConfig, ns: Option<&str>) -> EmptyResult {
    t.ensure_no_webhooks("deployment configs do not support")?;

    let all_names = container_names(dc.spec.template.as_ref().and_then(|tmpl| tmpl.spec.as_ref()));
    let mut triggers = vec![];
    if t.config_change {
        triggers.push(DeploymentTriggerPolicy::new(DeploymentTriggerType::ConfigChange));
    }
    for trigger in &t.image_change {
        validate_container_names(trigger, &all_names)?;
        triggers.push(DeploymentTriggerPolicy {
            image_change_params: Some(DeploymentTriggerImageChangeParams {
                automatic: Some(trigger.auto),
                container_names: Some(trigger.names.clone()),
                from: corev1::ObjectReference {
                    kind: Some(IMAGE_STREAM_TAG_KIND.into()),
                    name: Some(trigger.from.clone()),
                    namespace: trigger.namespace.clone(),
                    ..Default::default()
                },
                ..Default::default()
            }),
            ..DeploymentTriggerPolicy::new(DeploymentTriggerType::ImageChange)
        });
    }

    let existing = dc.spec.triggers.clone();
    let merged = merge_triggers(existing.clone().unwrap_or_default(), triggers, |a, b| same_policy(a, b, ns));

    // A missing trigger list gets defaulted by the server, so an empty list is only written out if
    // there was a list to begin with
    dc.spec.triggers = if merged.is_empty() && existing.is_none() { None } else { Some(merged) };
    Ok(())
}

// The server records the last image it deployed on each image change trigger; that field is
// ignored when matching triggers up, along with the difference between unset and default values
fn same_policy(a: &DeploymentTriggerPolicy, b: &DeploymentTriggerPolicy, ns: Option<&str>) -> bool {
    let params_match = match (&a.image_change_params, &b.image_change_params) {
        (None, None) => true,
        (Some(x), Some(y)) => {
            let from = |p: &DeploymentTriggerImageChangeParams| {
                let mut image_ref = ImageReference::from(&p.from);
                image_ref.namespace = default_namespace(image_ref.namespace.as_deref(), ns);
                image_ref
            };
            x.automatic.unwrap_or(false) == y.automatic.unwrap_or(false)
                && x.container_names.as_deref().unwrap_or_default() == y.container_names.as_deref().unwrap_or_default()
                && from(x) == from(y)
        },
        _ => false,
    };

    a.type_ == b.type_ && params_match
}
