
use ks_testutils::*;
use rstest::*;

use crate::prelude::*;
