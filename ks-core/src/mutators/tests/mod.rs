
use ks_testutils::*;
use rstest::*;

use super::*;
use crate::prelude::*;

// Records every reference it's called with and passes it through unchanged
fn recording_fn(seen: &mut Vec<ImageReference>) -> impl FnMut(&mut ImageReference) -> EmptyResult + '_ {
    move |image_ref: &mut ImageReference| {
        seen.push(image_ref.clone());
        Ok(())
    }
}
