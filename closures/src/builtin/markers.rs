//! Marker Closures
//!
//! Markers never produce composite entries; their weights are read by the
//! scalar tree helpers.

use crate::closure_id::ClosureId;
use crate::params::*;
use crate::registry::*;

pub(super) const BACKGROUND: ClosureDescriptor = marker(ClosureId::Background, "background", &[]);

pub(super) const DEBUG: ClosureDescriptor =
    marker(ClosureId::Debug, "debug", &[ParamDesc::new("tag", ParamType::String)]);

pub(super) const HOLDOUT: ClosureDescriptor = marker(ClosureId::Holdout, "holdout", &[]);

pub(super) const TRANSPARENT: ClosureDescriptor = marker(ClosureId::Transparent, "transparent", &[]);

const fn marker(id: ClosureId, name: &'static str, params: &'static [ParamDesc]) -> ClosureDescriptor {
    ClosureDescriptor {
        id,
        name,
        params,
        affinity: CompositeKind::MARKER,
        converter: ClosureConverter::Nop,
    }
}
