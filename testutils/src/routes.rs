use ks_api::v1::*;
use rstest::*;

use crate::constants::*;
use crate::objs::*;

// Builds a route from a list of (name, weight) pairs; the first entry is the primary backend
pub fn test_route_with_backends(backends: &[(&str, Option<i32>)]) -> Route {
    let mut targets = backends.iter().map(|(name, weight)| RouteTargetReference::service(name, *weight));
    let to = targets.next().unwrap_or_default();
    let alternates: Vec<_> = targets.collect();

    Route {
        metadata: test_meta(TEST_ROUTE),
        spec: RouteSpec {
            host: Some("web.apps.example.com".into()),
            to,
            alternate_backends: if alternates.is_empty() { None } else { Some(alternates) },
            ..Default::default()
        },
        status: None,
    }
}

#[fixture]
pub fn test_route() -> Route {
    test_route_with_backends(&[("prod", Some(90)), ("canary", Some(10))])
}
