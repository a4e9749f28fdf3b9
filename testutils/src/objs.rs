use k8s_openapi::api::apps::v1 as appsv1;
use k8s_openapi::api::batch::v1 as batchv1;
use k8s_openapi::api::core::v1 as corev1;
use k8s_openapi::apimachinery::pkg::apis::meta::v1 as metav1;
use ks_api::v1::*;
use kube::core::{
    ApiResource,
    DynamicObject,
    GroupVersionKind,
};
use rstest::*;
use serde_json::json;

use crate::constants::*;

pub fn test_meta(name: &str) -> metav1::ObjectMeta {
    metav1::ObjectMeta {
        name: Some(name.into()),
        namespace: Some(TEST_NAMESPACE.into()),
        ..Default::default()
    }
}

pub fn test_container(name: &str, image: &str) -> corev1::Container {
    corev1::Container {
        name: name.into(),
        image: Some(image.into()),
        ..Default::default()
    }
}

pub fn test_image_stream_tag(name: &str, namespace: Option<&str>) -> corev1::ObjectReference {
    corev1::ObjectReference {
        kind: Some(IMAGE_STREAM_TAG_KIND.into()),
        name: Some(name.into()),
        namespace: namespace.map(|ns| ns.into()),
        ..Default::default()
    }
}

#[fixture]
pub fn test_pod_spec() -> corev1::PodSpec {
    corev1::PodSpec {
        init_containers: Some(vec![test_container(TEST_INIT_CONTAINER, TEST_INIT_IMAGE)]),
        containers: vec![
            test_container(TEST_CONTAINER, TEST_IMAGE),
            test_container(TEST_SIDECAR_CONTAINER, TEST_SIDECAR_IMAGE),
        ],
        ..Default::default()
    }
}

fn test_pod_template_spec() -> corev1::PodTemplateSpec {
    corev1::PodTemplateSpec {
        metadata: Some(metav1::ObjectMeta {
            labels: Some([("app".to_string(), "web".to_string())].into()),
            ..Default::default()
        }),
        spec: Some(test_pod_spec()),
    }
}

#[fixture]
pub fn test_pod(#[default(TEST_POD)] name: &str) -> corev1::Pod {
    corev1::Pod {
        metadata: test_meta(name),
        spec: Some(test_pod_spec()),
        ..Default::default()
    }
}

#[fixture]
pub fn test_deployment(#[default(TEST_DEPLOYMENT)] name: &str) -> appsv1::Deployment {
    appsv1::Deployment {
        metadata: test_meta(name),
        spec: Some(appsv1::DeploymentSpec {
            replicas: Some(3),
            template: test_pod_template_spec(),
            ..Default::default()
        }),
        ..Default::default()
    }
}

#[fixture]
pub fn test_daemonset(#[default(TEST_DAEMONSET)] name: &str) -> appsv1::DaemonSet {
    appsv1::DaemonSet {
        metadata: test_meta(name),
        spec: Some(appsv1::DaemonSetSpec {
            template: test_pod_template_spec(),
            ..Default::default()
        }),
        ..Default::default()
    }
}

#[fixture]
pub fn test_cronjob(#[default(TEST_CRONJOB)] name: &str) -> batchv1::CronJob {
    batchv1::CronJob {
        metadata: test_meta(name),
        spec: Some(batchv1::CronJobSpec {
            schedule: "*/5 * * * *".into(),
            job_template: batchv1::JobTemplateSpec {
                metadata: None,
                spec: Some(batchv1::JobSpec {
                    template: test_pod_template_spec(),
                    ..Default::default()
                }),
            },
            ..Default::default()
        }),
        ..Default::default()
    }
}

// A deployment config that's been through a couple of image-triggered rollouts: the image change
// trigger has a server-populated lastTriggeredImage that must survive a round trip.
#[fixture]
pub fn test_deployment_config(#[default(TEST_DEPLOYMENT_CONFIG)] name: &str) -> DeploymentConfig {
    DeploymentConfig {
        metadata: test_meta(name),
        spec: DeploymentConfigSpec {
            replicas: Some(2),
            triggers: Some(vec![
                DeploymentTriggerPolicy::new(DeploymentTriggerType::ConfigChange),
                DeploymentTriggerPolicy {
                    image_change_params: Some(DeploymentTriggerImageChangeParams {
                        automatic: Some(true),
                        container_names: Some(vec![TEST_CONTAINER.into()]),
                        from: test_image_stream_tag(TEST_IMAGE_STREAM_TAG, None),
                        last_triggered_image: Some(TEST_LAST_TRIGGERED_IMAGE.into()),
                        ..Default::default()
                    }),
                    ..DeploymentTriggerPolicy::new(DeploymentTriggerType::ImageChange)
                },
            ]),
            template: Some(test_pod_template_spec()),
            ..Default::default()
        },
        status: None,
    }
}

#[fixture]
pub fn test_config_map(#[default(TEST_CONFIG_MAP)] name: &str) -> DynamicObject {
    let gvk = GroupVersionKind::gvk("", "v1", "ConfigMap");
    DynamicObject::new(name, &ApiResource::from_gvk(&gvk))
        .within(TEST_NAMESPACE)
        .data(json!({"data": {"foo": "bar"}}))
}
