pub mod backends;
pub mod config;
pub mod constants;
pub mod errors;
pub mod k8s;
pub mod logging;
pub mod mutators;
pub mod patch;
pub mod triggers;
pub mod volumes;

pub mod prelude {
    pub use k8s_openapi::api::apps::v1 as appsv1;
    pub use k8s_openapi::api::batch::v1 as batchv1;
    pub use k8s_openapi::api::core::v1 as corev1;
    pub use k8s_openapi::apimachinery::pkg::apis::meta::v1 as metav1;
    pub use ks_api::v1::{
        Build,
        BuildConfig,
        DeploymentConfig,
        Route,
    };
    pub use kube::ResourceExt;

    pub use crate::constants::*;
    pub use crate::errors::EmptyResult;
    pub use crate::k8s::{
        FieldPath,
        Object,
        ObjectInfo,
    };
}

#[cfg(test)]
mod tests;
