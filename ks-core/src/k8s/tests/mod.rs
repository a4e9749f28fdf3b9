
use ks_testutils::*;
use rstest::*;

use super::*;
use crate::prelude::*;
