use std::collections::BTreeMap;

use super::*;

const WEB_FIELD_PATH: &str = r#"spec.template.spec.containers[?(@.name=="web")].image"#;

fn with_annotation(mut depl: appsv1::Deployment, value: json::Value) -> Object {
    depl.metadata.annotations = Some(BTreeMap::from([(TRIGGER_ANNOTATION_KEY.into(), value.to_string())]));
    Object::Deployment(depl)
}

fn annotation(obj: &Object) -> Option<json::Value> {
    obj.meta()
        .annotations
        .as_ref()
        .and_then(|a| a.get(TRIGGER_ANNOTATION_KEY))
        .map(|raw| json::from_str(raw).unwrap())
}

#[rstest]
fn test_read_no_annotation(test_deployment: appsv1::Deployment) {
    let t = TriggerDefinition::read(&Object::Deployment(test_deployment), None).unwrap();
    assert_eq!(t, TriggerDefinition { config_change: true, ..Default::default() });
}

#[rstest]
fn test_read_annotation(test_deployment: appsv1::Deployment) {
    let obj = with_annotation(
        test_deployment,
        json::json!([
            {
                "from": {"kind": "ImageStreamTag", "name": "web:latest", "namespace": TEST_NAMESPACE},
                "fieldPath": WEB_FIELD_PATH,
            },
            {
                "from": {"kind": "ImageStreamTag", "name": "proxy:v3", "namespace": TEST_OTHER_NAMESPACE},
                "fieldPath": r#"spec.template.spec.containers[?(@.name=="sidecar")].image"#,
                "paused": true,
            },
        ]),
    );
    let t = TriggerDefinition::read(&obj, None).unwrap();

    assert_eq!(t.image_change, vec![
        ImageChangeTrigger { auto: true, from: "web:latest".into(), namespace: None, names: vec!["web".into()] },
        ImageChangeTrigger {
            auto: false,
            from: "proxy:v3".into(),
            namespace: Some(TEST_OTHER_NAMESPACE.into()),
            names: vec!["sidecar".into()],
        },
    ]);
}

#[rstest]
fn test_round_trip_keeps_unrecognized_entries(test_deployment: appsv1::Deployment) {
    let mut obj = with_annotation(
        test_deployment,
        json::json!([
            {"from": {"kind": "ImageStreamTag", "name": "web:latest"}, "fieldPath": WEB_FIELD_PATH},
            {
                "from": {"kind": "ImageStreamTag", "name": "other:1"},
                "fieldPath": r#"spec.template.spec.containers[?(@.name=="gone")].image"#,
            },
            {"from": {"kind": "ImageStreamTag", "name": "other:2"}, "fieldPath": "metadata.labels.foo"},
        ]),
    );
    let before = to_json(&obj);

    let t = TriggerDefinition::read(&obj, None).unwrap();
    assert_len_eq_x!(&t.image_change, 1);
    t.apply(&mut obj, None).unwrap();

    assert_eq!(to_json(&obj), before);
}

#[rstest]
fn test_round_trip_no_annotation(test_deployment: appsv1::Deployment) {
    let mut obj = Object::Deployment(test_deployment);
    let before = to_json(&obj);

    let t = TriggerDefinition::read(&obj, None).unwrap();
    t.apply(&mut obj, None).unwrap();

    assert_eq!(to_json(&obj), before);
}

#[rstest]
fn test_add_image_trigger(test_deployment: appsv1::Deployment) {
    let mut obj = Object::Deployment(test_deployment);
    update(&mut obj, &from_image(TEST_IMAGE_STREAM_TAG, &[TEST_CONTAINER, TEST_INIT_CONTAINER])).unwrap();

    assert_some_eq_x!(
        annotation(&obj),
        json::json!([
            {"from": {"kind": "ImageStreamTag", "name": "web:latest"}, "fieldPath": WEB_FIELD_PATH},
            {
                "from": {"kind": "ImageStreamTag", "name": "web:latest"},
                "fieldPath": r#"spec.template.spec.initContainers[?(@.name=="init")].image"#,
            },
        ])
    );
}

#[rstest]
fn test_add_image_trigger_cronjob(test_cronjob: batchv1::CronJob) {
    let mut obj = Object::CronJob(test_cronjob);
    let image = TriggerUpdate { manual: true, ..from_image("web:latest", &[TEST_CONTAINER]) };
    update(&mut obj, &image).unwrap();

    assert_some_eq_x!(
        annotation(&obj),
        json::json!([{
            "from": {"kind": "ImageStreamTag", "name": "web:latest"},
            "fieldPath": r#"spec.jobTemplate.spec.template.spec.containers[?(@.name=="web")].image"#,
            "paused": true,
        }])
    );
}

#[rstest]
fn test_duplicate_container(test_deployment: appsv1::Deployment) {
    let mut obj = with_annotation(
        test_deployment,
        json::json!([{"from": {"kind": "ImageStreamTag", "name": "web:latest"}, "fieldPath": WEB_FIELD_PATH}]),
    );
    let err = update(&mut obj, &from_image("web:next", &[TEST_CONTAINER])).unwrap_err();
    assert_eq!(err.to_string(), "only one trigger may reference each container: web");
}

#[rstest]
fn test_rejects_webhooks(test_daemonset: appsv1::DaemonSet) {
    let mut obj = Object::DaemonSet(test_daemonset);
    let err = update(&mut obj, &TriggerUpdate { from_gitlab: true, ..Default::default() }).unwrap_err();
    assert_eq!(err.to_string(), format!("daemonset/{TEST_DAEMONSET} does not support GitLab web hooks"));
}

#[rstest]
fn test_invalid_annotation(test_deployment: appsv1::Deployment) {
    let mut obj = Object::Deployment(test_deployment);
    obj.meta_mut().annotations = Some(BTreeMap::from([(TRIGGER_ANNOTATION_KEY.into(), "{not json".into())]));

    let err = update(&mut obj, &TriggerUpdate { from_config: true, ..Default::default() }).unwrap_err();
    assert!(err.to_string().starts_with(&format!("invalid {TRIGGER_ANNOTATION_KEY} annotation")));
}

#[rstest]
#[case::remove_config(TriggerUpdate { remove: true, from_config: true, ..Default::default() }, Some(true))]
#[case::manual(TriggerUpdate { manual: true, ..Default::default() }, Some(true))]
#[case::auto(TriggerUpdate { auto: true, ..Default::default() }, None)]
fn test_config_change_pauses_deployment(
    test_deployment: appsv1::Deployment,
    #[case] change: TriggerUpdate,
    #[case] expected: Option<bool>,
) {
    let mut obj = Object::Deployment(test_deployment);
    update(&mut obj, &change).unwrap();

    let Object::Deployment(depl) = &obj else { panic!("expected a deployment") };
    assert_eq!(depl.spec.as_ref().unwrap().paused, expected);
}

#[rstest]
fn test_remove_all_empties_annotation(test_deployment: appsv1::Deployment) {
    let mut obj = with_annotation(
        test_deployment,
        json::json!([{"from": {"kind": "ImageStreamTag", "name": "web:latest"}, "fieldPath": WEB_FIELD_PATH}]),
    );
    update(&mut obj, &TriggerUpdate { remove_all: true, ..Default::default() }).unwrap();

    assert_some_eq_x!(annotation(&obj), json::json!([]));
}
