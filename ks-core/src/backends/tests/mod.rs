mod input_test;

use assertables::*;
use ks_testutils::*;
use rstest::*;

use super::*;

fn weights(backends: &Backends) -> Vec<(&str, Option<i32>)> {
    backends.backends.iter().map(|b| (b.name.as_str(), b.weight)).collect()
}

fn adjust(token: &str) -> BackendTransform {
    BackendTransform { adjust: true, inputs: vec![BackendInput::parse(token).unwrap()], ..Default::default() }
}
