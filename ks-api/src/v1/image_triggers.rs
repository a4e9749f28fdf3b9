use serde::{
    Deserialize,
    Serialize,
};

// Objects without a native trigger field (deployments, daemon sets, stateful sets, cron jobs)
// carry their image triggers as a JSON list of these in the trigger annotation.

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectFieldReference {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub kind: String,

    pub name: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub namespace: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub api_version: String,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectFieldTrigger {
    pub from: ObjectFieldReference,

    pub field_path: String,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub paused: bool,
}
