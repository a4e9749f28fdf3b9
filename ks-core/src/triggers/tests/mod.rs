mod annotations_test;

use assertables::*;
use ks_testutils::*;
use rstest::*;
use serde_json as json;

use super::*;
use crate::errors::*;
use crate::patch::Mutation;

fn from_image(name: &str, names: &[&str]) -> TriggerUpdate {
    TriggerUpdate {
        from_image: Some(ImageStreamTagRef { name: name.into(), namespace: None }),
        container_names: names.iter().map(|n| n.to_string()).collect(),
        ..Default::default()
    }
}

fn update(obj: &mut Object, update: &TriggerUpdate) -> EmptyResult {
    match update_triggers_for_object(obj, None, |t| {
        update.apply(t);
        Ok(())
    }) {
        Mutation::Changed => Ok(()),
        Mutation::Failed(err) => Err(err),
        Mutation::Unchanged => bail!("object was not changed"),
    }
}

fn to_json(obj: &Object) -> json::Value {
    obj.to_value().unwrap()
}
