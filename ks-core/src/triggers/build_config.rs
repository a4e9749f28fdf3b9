use ks_api::v1::{
    BuildTriggerPolicy,
    BuildTriggerType,
    ImageChangeTrigger as BuildImageChangeTrigger,
};

use super::*;
use crate::mutators::ImageReference;

// Build configs have an extra wrinkle: an image change trigger with no `from` refers to whatever
// image stream tag the build strategy builds on top of.  That's surfaced here as a regular image
// trigger (the "strategy trigger").

pub(super) fn read(bc: &BuildConfig, ns: Option<&str>) -> TriggerDefinition {
    let strategy = strategy_trigger(bc, ns);

    let mut t = TriggerDefinition::default();
    let mut found_strategy = false;
    for policy in &bc.spec.triggers {
        match policy.type_ {
            BuildTriggerType::ConfigChange => t.config_change = true,
            BuildTriggerType::Generic => t.generic_webhooks.extend(policy.generic.clone()),
            BuildTriggerType::GitHub => t.github_webhooks.extend(policy.github.clone()),
            BuildTriggerType::GitLab => t.gitlab_webhooks.extend(policy.gitlab.clone()),
            BuildTriggerType::Bitbucket => t.bitbucket_webhooks.extend(policy.bitbucket.clone()),
            BuildTriggerType::ImageChange => {
                let trigger = match policy.image_change.as_ref().and_then(|ic| ic.from.as_ref()) {
                    Some(from) => ImageChangeTrigger {
                        auto: true,
                        from: from.name.clone().unwrap_or_default(),
                        namespace: default_namespace(from.namespace.as_deref(), ns),
                        names: vec![],
                    },
                    None => match &strategy {
                        Some(s) => ImageChangeTrigger { auto: true, ..s.clone() },
                        None => continue,
                    },
                };
                found_strategy |= strategy.as_ref().is_some_and(|s| same_image(s, &trigger));
                t.image_change.push(trigger);
            },
        }
    }

    // If nothing triggers off of the strategy image, it still shows up as a manual trigger
    if !found_strategy && let Some(s) = strategy {
        t.image_change.push(s);
    }
    t
}

pub(super) fn apply(t: &TriggerDefinition, bc: &mut BuildConfig, ns: Option<&str>) -> EmptyResult {
    let mut triggers = vec![];
    if t.config_change {
        triggers.push(BuildTriggerPolicy::new(BuildTriggerType::ConfigChange));
    }
    for hook in &t.generic_webhooks {
        triggers.push(BuildTriggerPolicy {
            generic: Some(hook.clone()),
            ..BuildTriggerPolicy::new(BuildTriggerType::Generic)
        });
    }
    for hook in &t.github_webhooks {
        triggers.push(BuildTriggerPolicy {
            github: Some(hook.clone()),
            ..BuildTriggerPolicy::new(BuildTriggerType::GitHub)
        });
    }
    for hook in &t.gitlab_webhooks {
        triggers.push(BuildTriggerPolicy {
            gitlab: Some(hook.clone()),
            ..BuildTriggerPolicy::new(BuildTriggerType::GitLab)
        });
    }
    for hook in &t.bitbucket_webhooks {
        triggers.push(BuildTriggerPolicy {
            bitbucket: Some(hook.clone()),
            ..BuildTriggerPolicy::new(BuildTriggerType::Bitbucket)
        });
    }

    let strategy = strategy_trigger(bc, ns);
    let mut existing = bc.spec.triggers.clone();
    for trigger in &t.image_change {
        // Manual image triggers don't exist on build configs; turning a trigger to manual removes it
        if !trigger.auto {
            existing.retain(|p| !matches_image_change(trigger, strategy.as_ref(), p, ns));
            continue;
        }

        // Reuse the form of an existing matching trigger if there is one, so the merge below keeps it
        let from = match existing.iter().find(|p| matches_image_change(trigger, strategy.as_ref(), p, ns)) {
            Some(p) => p.image_change.as_ref().and_then(|ic| ic.from.clone()),
            None if strategy.as_ref().is_some_and(|s| same_image(s, trigger) && trigger.names.is_empty()) => None,
            None => Some(corev1::ObjectReference {
                kind: Some(IMAGE_STREAM_TAG_KIND.into()),
                name: Some(trigger.from.clone()),
                namespace: trigger.namespace.clone(),
                ..Default::default()
            }),
        };
        triggers.push(BuildTriggerPolicy {
            image_change: Some(BuildImageChangeTrigger { from, ..Default::default() }),
            ..BuildTriggerPolicy::new(BuildTriggerType::ImageChange)
        });
    }

    bc.spec.triggers = merge_triggers(existing, triggers, |a, b| same_policy(a, b, ns));
    Ok(())
}

// The synthetic trigger for the image the build strategy runs on, if it's an image stream tag
fn strategy_trigger(bc: &BuildConfig, ns: Option<&str>) -> Option<ImageChangeTrigger> {
    let from = bc.spec.common.strategy.input_reference()?;
    if from.kind.as_deref() != Some(IMAGE_STREAM_TAG_KIND) {
        return None;
    }

    Some(ImageChangeTrigger {
        auto: false,
        from: from.name.clone().unwrap_or_default(),
        namespace: default_namespace(from.namespace.as_deref(), ns),
        names: vec![],
    })
}

fn same_image(a: &ImageChangeTrigger, b: &ImageChangeTrigger) -> bool {
    a.from == b.from && a.namespace == b.namespace
}

fn matches_image_change(
    trigger: &ImageChangeTrigger,
    strategy: Option<&ImageChangeTrigger>,
    policy: &BuildTriggerPolicy,
    ns: Option<&str>,
) -> bool {
    let Some(image_change) = &policy.image_change else { return false };
    match &image_change.from {
        None => strategy.is_some_and(|s| same_image(s, trigger)),
        Some(from) => {
            from.name.as_deref() == Some(trigger.from.as_str())
                && default_namespace(from.namespace.as_deref(), ns) == trigger.namespace
        },
    }
}

fn normalized_from(from: Option<&corev1::ObjectReference>, ns: Option<&str>) -> Option<ImageReference> {
    from.map(|r| {
        let mut image_ref = ImageReference::from(r);
        image_ref.namespace = default_namespace(image_ref.namespace.as_deref(), ns);
        image_ref
    })
}

// Two policies are the same trigger if everything matches except for the bookkeeping fields
// the server fills in on image change triggers
fn same_policy(a: &BuildTriggerPolicy, b: &BuildTriggerPolicy, ns: Option<&str>) -> bool {
    let image_change_matches = match (&a.image_change, &b.image_change) {
        (None, None) => true,
        (Some(x), Some(y)) => normalized_from(x.from.as_ref(), ns) == normalized_from(y.from.as_ref(), ns),
        _ => false,
    };

    a.type_ == b.type_
        && a.generic == b.generic
        && a.github == b.github
        && a.gitlab == b.gitlab
        && a.bitbucket == b.bitbucket
        && image_change_matches
}
