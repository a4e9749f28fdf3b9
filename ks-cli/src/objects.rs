use std::fs;
use std::io::Read;

use ks_core::errors::*;
use ks_core::prelude::*;
use serde::Deserialize;
use serde_json as json;
use tracing::*;

const LIST_KIND: &str = "List";

// Reads every object out of a file ("-" for stdin).  The file can hold any number of YAML or JSON
// documents, and any document can be a List whose items get flattened into the result.
pub fn read_objects(filename: &str) -> anyhow::Result<Vec<Object>> {
    let contents = if filename == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        fs::read_to_string(filename)?
    };
    parse_objects(&contents)
}

pub fn parse_objects(contents: &str) -> anyhow::Result<Vec<Object>> {
    let mut objects = vec![];
    for doc in serde_yaml::Deserializer::from_str(contents) {
        let value = json::Value::deserialize(doc)?;
        if value.is_null() {
            continue;
        }

        if value.get("kind").and_then(|k| k.as_str()) == Some(LIST_KIND) {
            let items = match value.get("items") {
                Some(json::Value::Array(items)) => items.clone(),
                Some(json::Value::Null) | None => vec![],
                Some(_) => bail!("the items field of a List must be an array"),
            };
            for item in items {
                objects.push(Object::from_value(item)?);
            }
        } else {
            objects.push(Object::from_value(value)?);
        }
    }

    debug!("read {} objects", objects.len());
    Ok(objects)
}

// Objects are matched up across files by kind, namespace, and name
pub fn find_object<'a>(objects: &'a [Object], info: &ObjectInfo) -> Option<&'a Object> {
    objects.iter().find(|o| &o.info() == info)
}
