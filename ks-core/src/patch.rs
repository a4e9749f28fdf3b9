use serde_json as json;
use tracing::*;

use crate::errors::*;
use crate::k8s::{
    Object,
    ObjectInfo,
};

// The outcome of running a mutation over a single object.  `Unchanged` means the mutation didn't
// apply to the object at all; it's different from a mutation that ran and happened to produce an
// empty patch.
#[derive(Debug)]
pub enum Mutation {
    Unchanged,
    Changed,
    Failed(anyhow::Error),
}

impl From<EmptyResult> for Mutation {
    fn from(res: EmptyResult) -> Mutation {
        match res {
            Ok(()) => Mutation::Changed,
            Err(err) => Mutation::Failed(err),
        }
    }
}

#[derive(Debug)]
pub struct Patch {
    pub info: ObjectInfo,
    pub before: Vec<u8>,
    pub after: Vec<u8>,
    pub patch: Vec<u8>,
    pub err: Option<anyhow::Error>,
}

impl Patch {
    fn new(info: ObjectInfo) -> Patch {
        Patch { info, before: vec![], after: vec![], patch: vec![], err: None }
    }

    // A patch with no operations means the mutation ran but the object came out identical
    pub fn is_empty(&self) -> bool {
        self.patch.is_empty() || self.patch == b"[]"
    }

    pub fn operations(&self) -> anyhow::Result<json_patch::Patch> {
        if self.patch.is_empty() {
            return Ok(json_patch::Patch(vec![]));
        }
        Ok(json::from_slice(&self.patch)?)
    }
}

// Runs `mutate_fn` over every object and computes a JSON patch for the ones that changed.  Objects
// are mutated in place; failures are recorded on the individual patch and never stop the batch.
#[instrument(skip_all, fields(objects = objects.len()))]
pub fn calculate_patches<F>(objects: &mut [Object], mut mutate_fn: F) -> Vec<Patch>
where
    F: FnMut(&mut Object) -> Mutation,
{
    objects.iter_mut().filter_map(|obj| patch_object(obj, snapshot, &mut mutate_fn)).collect()
}

// Returns None if the mutation didn't apply to the object.  The object is always handed to the
// mutation, even if it couldn't be serialized, so that it's skipped the same way in either case.
pub(crate) fn patch_object<S, F>(obj: &mut Object, snapshot_fn: S, mutate_fn: &mut F) -> Option<Patch>
where
    S: Fn(&Object) -> anyhow::Result<(json::Value, Vec<u8>)>,
    F: FnMut(&mut Object) -> Mutation,
{
    let mut patch = Patch::new(obj.info());

    let before = snapshot_fn(obj);
    match mutate_fn(obj) {
        Mutation::Unchanged => {
            debug!("{} was not touched by the mutation", patch.info);
            return None;
        },
        Mutation::Changed => (),
        Mutation::Failed(err) => patch.err = Some(err),
    }

    let before = match before {
        Ok((value, bytes)) => {
            patch.before = bytes;
            value
        },
        Err(err) => {
            warn!("could not serialize {}: {err:#}", patch.info);
            patch.err.get_or_insert(err);
            return Some(patch);
        },
    };

    // The after snapshot is always taken, so that callers can see what the mutation was trying to
    // do even when it failed
    match snapshot_fn(obj) {
        Ok((after, bytes)) => {
            patch.after = bytes;
            if patch.err.is_none() {
                match json::to_vec(&json_patch::diff(&before, &after)) {
                    Ok(p) => patch.patch = p,
                    Err(err) => patch.err = Some(err.into()),
                }
            }
        },
        Err(err) => {
            patch.err.get_or_insert(err);
        },
    }

    debug!("computed patch for {}: {}", patch.info, String::from_utf8_lossy(&patch.patch));
    Some(patch)
}

fn snapshot(obj: &Object) -> anyhow::Result<(json::Value, Vec<u8>)> {
    let value = obj.to_value()?;
    let bytes = json::to_vec(&value)?;
    Ok((value, bytes))
}
