pub(crate) use crate::constants::*;
pub(crate) use crate::velocity_set::{Parameters as VelocitySetParameters, VelocitySet};
pub(crate) use crate::{BoundaryFace, SiteStatus};

pub(crate) use std::sync::{Arc, RwLock};
