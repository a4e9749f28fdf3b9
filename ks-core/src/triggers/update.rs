use rand::Rng;
use rand::distributions::Alphanumeric;

use super::*;

// TriggerUpdate describes a single change to make to the triggers of every object: add one kind
// of trigger, remove one kind (or all of them), or flip existing triggers between automatic and
// manual.
#[derive(Clone, Debug, Default)]
pub struct TriggerUpdate {
    pub remove: bool,
    pub remove_all: bool,
    pub auto: bool,
    pub manual: bool,
    pub from_config: bool,
    pub from_image: Option<ImageStreamTagRef>,
    pub container_names: Vec<String>,
    pub from_github: bool,
    pub from_webhook: bool,
    pub from_webhook_allow_env: bool,
    pub from_gitlab: bool,
    pub from_bitbucket: bool,
}

// An image stream tag given on the command line, in `[namespace/]name:tag` form
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ImageStreamTagRef {
    pub name: String,
    pub namespace: Option<String>,
}

impl ImageStreamTagRef {
    pub fn parse(value: &str, default_ns: Option<&str>) -> anyhow::Result<ImageStreamTagRef> {
        let invalid = |msg: &str| TriggerError::invalid(&format!("the value of --from-image {msg}"));

        if value.contains('@') {
            return Err(invalid("must point to an image stream tag on this server"));
        }
        let (namespace, name) = match value.split('/').collect::<Vec<_>>()[..] {
            [name] => (None, name),
            [first, _, ..] if first.contains(['.', ':']) || first == "localhost" => {
                return Err(invalid("must point to an image stream tag on this server"));
            },
            [ns, name] => (Some(ns), name),
            _ => return Err(invalid("does not appear to be a valid reference to an image")),
        };

        match name.split_once(':') {
            Some((stream, tag)) if !stream.is_empty() && !tag.is_empty() => Ok(ImageStreamTagRef {
                name: name.into(),
                namespace: default_namespace(namespace, default_ns),
            }),
            Some(_) => Err(invalid("does not appear to be a valid reference to an image")),
            None => Err(invalid("must include the tag you wish to pull from")),
        }
    }
}

impl TriggerUpdate {
    fn count(&self) -> usize {
        [
            self.from_config,
            self.from_image.is_some(),
            self.from_github,
            self.from_webhook,
            self.from_webhook_allow_env,
            self.from_gitlab,
            self.from_bitbucket,
        ]
        .iter()
        .filter(|b| **b)
        .count()
    }

    // With no flags at all, the triggers are only printed
    pub fn is_print_only(&self) -> bool {
        self.count() == 0 && !self.remove && !self.remove_all && !self.auto && !self.manual
    }

    // An image stream tag in the object's own namespace is written without one
    pub fn for_namespace(&self, ns: Option<&str>) -> TriggerUpdate {
        let mut update = self.clone();
        if let Some(image) = update.from_image.as_mut() {
            image.namespace = default_namespace(image.namespace.as_deref(), ns);
        }
        update
    }

    pub fn validate(&self) -> EmptyResult {
        let count = self.count();
        let msg = if self.auto && self.manual {
            "you must specify at most one of --auto or --manual"
        } else if self.remove && self.remove_all {
            "you must specify either --remove or --remove-all"
        } else if self.remove_all && (count != 0 || self.auto || self.manual) {
            "--remove-all may not be used with any other flag"
        } else if self.remove && count < 1 {
            "--remove requires a flag defining a trigger type to be specified"
        } else if count > 1 {
            "you may only set one trigger type at a time"
        } else {
            return Ok(());
        };
        Err(TriggerError::invalid(msg))
    }

    pub fn apply(&self, triggers: &mut TriggerDefinition) {
        if self.remove_all {
            *triggers = TriggerDefinition::default();
            return;
        }

        if self.remove {
            if self.from_config {
                triggers.config_change = false;
            }
            if let Some(image) = &self.from_image {
                triggers.image_change.retain(|t| t.from != image.name);
            }
            if self.from_webhook || self.from_webhook_allow_env {
                triggers.generic_webhooks.clear();
            }
            if self.from_github {
                triggers.github_webhooks.clear();
            }
            if self.from_gitlab {
                triggers.gitlab_webhooks.clear();
            }
            if self.from_bitbucket {
                triggers.bitbucket_webhooks.clear();
            }
            return;
        }

        // --auto or --manual on their own flip every existing trigger
        if self.count() == 0 && (self.auto || self.manual) {
            triggers.config_change = self.auto;
            for image in triggers.image_change.iter_mut() {
                image.auto = self.auto;
            }
            return;
        }

        if self.from_config {
            triggers.config_change = true;
        }
        if let Some(image) = &self.from_image {
            let existing = triggers
                .image_change
                .iter_mut()
                .find(|t| t.from == image.name && t.namespace == image.namespace);
            match existing {
                Some(t) => {
                    t.auto = !self.manual;
                    t.names = self.container_names.clone();
                },
                None => triggers.image_change.push(ImageChangeTrigger {
                    auto: !self.manual,
                    from: image.name.clone(),
                    namespace: image.namespace.clone(),
                    names: self.container_names.clone(),
                }),
            }
        }
        if self.from_webhook {
            triggers.generic_webhooks.push(new_webhook(false));
        }
        if self.from_webhook_allow_env {
            triggers.generic_webhooks.push(new_webhook(true));
        }
        if self.from_github {
            triggers.github_webhooks.push(new_webhook(false));
        }
        if self.from_gitlab {
            triggers.gitlab_webhooks.push(new_webhook(false));
        }
        if self.from_bitbucket {
            triggers.bitbucket_webhooks.push(new_webhook(false));
        }
    }
}

fn new_webhook(allow_env: bool) -> WebHookTrigger {
    WebHookTrigger {
        secret: Some(generate_secret(WEBHOOK_SECRET_LENGTH)),
        allow_env: allow_env.then_some(true),
        ..Default::default()
    }
}

pub fn generate_secret(len: usize) -> String {
    rand::thread_rng().sample_iter(&Alphanumeric).take(len).map(char::from).collect()
}
