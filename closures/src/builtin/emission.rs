//! Emission Closure

use crate::closure_id::ClosureId;
use crate::composite::*;
use crate::error::*;
use crate::input_values::*;
use crate::params::*;
use crate::registry::*;
use pbrt_core::pbrt::*;
use pbrt_core::spectrum::*;

pub(super) const EMISSION: ClosureDescriptor = ClosureDescriptor {
    id: ClosureId::Emission,
    name: "emission",
    params: &[],
    affinity: CompositeKind::EMISSION,
    converter: ClosureConverter::Emission(convert_emission),
};

/// Diffuse emission. The colour is stored normalized by its largest
/// component, which becomes the multiplier.
fn convert_emission(
    composite: &mut CompositeEmissionClosure,
    _params: &mut ParamReader<'_>,
    weight: &Spectrum,
    max_weight_component: Float,
) -> ClosureResult<()> {
    let values = EmissionValues {
        radiance: *weight / max_weight_component,
        radiance_multiplier: max_weight_component,
    };
    composite.add_closure(ClosureId::Emission, weight, max_weight_component, values)?;
    Ok(())
}
