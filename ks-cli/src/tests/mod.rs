mod image_refs_test;
mod volumes_test;

use assert_fs::prelude::*;
use assertables::*;
use ks_core::prelude::*;
use ks_testutils::*;
use rstest::*;
use serde_json as json;

use crate::objects::parse_objects;

fn objects_file(objs: Vec<Object>) -> assert_fs::NamedTempFile {
    let docs: Vec<_> = objs.iter().map(|o| serde_yaml::to_string(&o.to_value().unwrap()).unwrap()).collect();
    let file = assert_fs::NamedTempFile::new("objects.yml").unwrap();
    file.write_str(&docs.join("---\n")).unwrap();
    file
}

fn path(file: &assert_fs::NamedTempFile) -> String {
    file.path().to_string_lossy().into()
}

// Splits `patch` output into (object, operations) pairs
fn patch_lines(out: &[u8]) -> Vec<(String, json::Value)> {
    String::from_utf8_lossy(out)
        .lines()
        .map(|line| {
            let (info, patch) = line.split_once(": ").unwrap();
            (info.to_string(), json::from_str(patch).unwrap())
        })
        .collect()
}
