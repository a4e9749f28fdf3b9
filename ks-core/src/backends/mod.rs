use ks_api::v1::RouteTargetReference;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::*;

use crate::errors::*;
use crate::k8s::Object;
use crate::patch::Mutation;
use crate::prelude::*;

err_impl! {BackendError,
    #[error("{0}")]
    Invalid(String),

    #[error("{0} is not in list of backends")]
    NotFound(String),
}

lazy_static! {
    static ref BACKEND_INPUT: Regex = Regex::new(r"^([^=]+)=([+-]?)(\d+)(%?)$").unwrap();
}

// The ordered list of services a route sends traffic to; the first entry is the primary backend
// (`spec.to`) and the rest are the alternates.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Backends {
    pub backends: Vec<RouteTargetReference>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BackendRow {
    pub name: String,
    pub kind: String,
    pub weight: String,
    pub percentage: String,
}

impl Backends {
    pub fn from_route(route: &Route) -> Backends {
        let mut backends = vec![route.spec.to.clone()];
        backends.extend(route.spec.alternate_backends.iter().flatten().cloned());
        Backends { backends }
    }

    pub fn write_to(self, route: &mut Route) {
        let mut backends = self.backends.into_iter();
        if let Some(to) = backends.next() {
            route.spec.to = to;
        }

        let alternates: Vec<_> = backends.collect();
        if alternates.is_empty() && route.spec.alternate_backends.is_none() {
            return;
        }
        route.spec.alternate_backends = Some(alternates);
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.backends.iter().position(|b| b.name == name)
    }

    // Unset weights get the router default for the purposes of computing percentages
    pub fn rows(&self, default_weight: i32) -> Vec<BackendRow> {
        let weight_of = |b: &RouteTargetReference| b.weight.unwrap_or(default_weight).max(0) as i64;
        let total: i64 = self.backends.iter().map(weight_of).sum();

        self.backends
            .iter()
            .map(|b| BackendRow {
                name: b.name.clone(),
                kind: b.kind.clone(),
                weight: b.weight.map(|w| w.to_string()).unwrap_or_default(),
                percentage: if total == 0 {
                    "0%".into()
                } else {
                    format!("{}%", (weight_of(b) * 100 + total / 2) / total)
                },
            })
            .collect()
    }
}

// One NAME=WEIGHT argument.  A leading sign makes the value relative to the current weight, and a
// trailing % makes it a percentage of the traffic shared with the paired backend.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BackendInput {
    pub name: String,
    pub value: i32,
    pub relative: bool,
    pub percentage: bool,
}

impl BackendInput {
    pub fn parse(token: &str) -> anyhow::Result<BackendInput> {
        let invalid = || {
            BackendError::invalid(&format!(
                "invalid argument {token:?}: expected NAME=WEIGHT, NAME=WEIGHT%, or NAME=[+-]WEIGHT[%]"
            ))
        };

        let caps = BACKEND_INPUT.captures(token).ok_or_else(invalid)?;
        let magnitude: i32 = caps[3].parse().map_err(|_| invalid())?;
        let value = if &caps[2] == "-" { -magnitude } else { magnitude };

        Ok(BackendInput {
            name: caps[1].to_string(),
            value,
            relative: !caps[2].is_empty(),
            percentage: !caps[4].is_empty(),
        })
    }

    fn apply(&self, backends: &mut [RouteTargetReference], default_weight: i32) -> EmptyResult {
        let Some(target) = backends.iter().position(|b| b.name == self.name) else {
            return Err(BackendError::not_found(&self.name));
        };

        // With nothing to be relative to, every adjustment is an absolute weight
        if backends.len() == 1 {
            backends[target].weight = Some(self.value.max(0));
            return Ok(());
        }

        let current = backends[target].weight.unwrap_or(default_weight);
        match (self.percentage, self.relative) {
            (true, _) => {
                let other = if target == 0 { 1 } else { 0 };
                adjust_percentage(backends, target, other, self, default_weight);
            },
            (false, true) => backends[target].weight = Some((current + self.value).max(0)),
            (false, false) => backends[target].weight = Some(self.value),
        }
        Ok(())
    }
}

// Percentages are relative to the pair (target, other): their combined weight is treated as 100%,
// and the target's share of it is set (or moved, for relative adjustments).  Everything outside
// the pair is rescaled first so it keeps the same proportion to the pair as it had before.
fn adjust_percentage(
    backends: &mut [RouteTargetReference],
    target: usize,
    other: usize,
    input: &BackendInput,
    default_weight: i32,
) {
    let target_weight = backends[target].weight.unwrap_or(default_weight) as i64;
    let other_weight = backends[other].weight.unwrap_or(default_weight) as i64;
    let previous = target_weight + other_weight;

    if previous != 0 {
        for (i, backend) in backends.iter_mut().enumerate() {
            if i == target || i == other {
                continue;
            }
            if let Some(w) = backend.weight {
                backend.weight = Some(clamp_weight(w as i64 * 100 / previous));
            }
        }
    }

    let mut share = input.value as f64 / 100.0;
    if input.relative && previous != 0 {
        share += target_weight as f64 / previous as f64;
    }
    let share = share.clamp(0.0, 1.0);

    let weight = (share * 100.0).round() as i32;
    backends[target].weight = Some(weight);
    backends[other].weight = Some(100 - weight);

    // Repeated small relative adjustments would otherwise grow the other weights without bound
    let max = backends.iter().filter_map(|b| b.weight).max().unwrap_or(0);
    if max > RESCALE_THRESHOLD_WEIGHT {
        debug!("rescaling backend weights, max weight {max} exceeds {RESCALE_THRESHOLD_WEIGHT}");
        for backend in backends.iter_mut() {
            if let Some(w) = backend.weight
                && w > 0
            {
                let scaled = RESCALE_TARGET_WEIGHT as i64 * w as i64 / max as i64;
                backend.weight = Some((scaled as i32).max(1));
            }
        }
    }
}

fn clamp_weight(w: i64) -> i32 {
    w.clamp(0, i32::MAX as i64) as i32
}

// BackendTransform is a single change to the backends of every route.  With no flags and no
// inputs the backends are only printed.
#[derive(Clone, Debug)]
pub struct BackendTransform {
    pub zero: bool,
    pub equal: bool,
    pub adjust: bool,
    pub inputs: Vec<BackendInput>,
    pub default_weight: i32,
}

impl Default for BackendTransform {
    fn default() -> BackendTransform {
        BackendTransform {
            zero: false,
            equal: false,
            adjust: false,
            inputs: vec![],
            default_weight: DEFAULT_BACKEND_WEIGHT,
        }
    }
}

impl BackendTransform {
    pub fn is_print_only(&self) -> bool {
        !self.zero && !self.equal && !self.adjust && self.inputs.is_empty()
    }

    pub fn validate(&self) -> EmptyResult {
        let flags = [self.zero, self.equal, self.adjust].iter().filter(|b| **b).count();
        if flags > 1 {
            return Err(BackendError::invalid("you may specify at most one of --zero, --equal, or --adjust"));
        }
        if (self.zero || self.equal) && !self.inputs.is_empty() {
            return Err(BackendError::invalid("--zero and --equal may not be combined with backend weights"));
        }

        if self.adjust {
            let [input] = &self.inputs[..] else {
                return Err(BackendError::invalid("--adjust requires exactly one NAME=WEIGHT argument"));
            };
            return validate_adjustment(input);
        }

        // The first input decides whether the weights are percentages or not
        let percentages = self.inputs.first().is_some_and(|input| input.percentage);
        for (i, input) in self.inputs.iter().enumerate() {
            if input.percentage != percentages {
                return Err(BackendError::invalid("cannot mix percentage weights with non-percentage weights"));
            }
            if input.relative {
                return Err(BackendError::invalid(&format!(
                    "{}: relative weights may only be used with --adjust",
                    input.name
                )));
            }
            if self.inputs[..i].iter().any(|prev| prev.name == input.name) {
                return Err(BackendError::invalid(&format!("{}: backend specified more than once", input.name)));
            }
            validate_weight(input)?;
        }
        Ok(())
    }

    pub fn apply(&self, backends: &mut Backends) -> EmptyResult {
        if self.zero {
            backends.backends.iter_mut().for_each(|b| b.weight = Some(0));
        } else if self.equal {
            backends.backends.iter_mut().for_each(|b| b.weight = Some(EQUAL_BACKEND_WEIGHT));
        } else if self.adjust {
            let [input] = &self.inputs[..] else {
                return Err(BackendError::invalid("--adjust requires exactly one NAME=WEIGHT argument"));
            };
            input.apply(&mut backends.backends, self.default_weight)?;
        } else if !self.inputs.is_empty() {
            // Setting replaces the list wholesale, in the order given.  A percentage here is just a
            // weight, since every weight is already relative to the others.
            backends.backends = self
                .inputs
                .iter()
                .map(|input| RouteTargetReference::service(&input.name, Some(input.value)))
                .collect();
        }
        Ok(())
    }
}

fn validate_adjustment(input: &BackendInput) -> EmptyResult {
    match (input.percentage, input.relative) {
        (true, true) if !(-100..=100).contains(&input.value) => Err(BackendError::invalid(&format!(
            "{}: relative percentages must be between -100% and 100%",
            input.name
        ))),
        (false, true) if input.value.abs() > MAX_BACKEND_WEIGHT => Err(BackendError::invalid(&format!(
            "{}: relative weights must be between -{MAX_BACKEND_WEIGHT} and {MAX_BACKEND_WEIGHT}",
            input.name
        ))),
        (_, false) => validate_weight(input),
        _ => Ok(()),
    }
}

fn validate_weight(input: &BackendInput) -> EmptyResult {
    let max = if input.percentage { 100 } else { MAX_BACKEND_WEIGHT };
    if !(0..=max).contains(&input.value) {
        let unit = if input.percentage { "%" } else { "" };
        return Err(BackendError::invalid(&format!("{}: weight must be between 0{unit} and {max}{unit}", input.name)));
    }
    Ok(())
}

// Hands the backends of a route to `f` and writes the result back; other kinds are left alone
pub fn update_backends_for_object<F>(obj: &mut Object, f: F) -> Mutation
where
    F: FnOnce(&mut Backends) -> EmptyResult,
{
    let Object::Route(route) = obj else {
        return Mutation::Unchanged;
    };

    let mut backends = Backends::from_route(route);
    if let Err(err) = f(&mut backends) {
        return Mutation::Failed(err);
    }
    backends.write_to(route);
    Mutation::Changed
}

#[cfg(test)]
mod tests;
