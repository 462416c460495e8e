//! Series composition of pipelines.

use super::{Involved, Pipeline};
use crate::config::InvolveConfig;
use crate::context::Context;
use crate::errors::InvalidCompositionError;
use crate::stages::Target;
use tracing::debug;

/// Composes `pipelines` into one run around `target`.
///
/// The result behaves exactly like a single pipeline holding every input's
/// middleware in list order, followed by every input's afterware in the
/// same list order. Validation happens before anything runs.
///
/// # Errors
///
/// Returns [`InvalidCompositionError`] if `pipelines` is empty.
pub fn series(
    pipelines: &[Pipeline],
    target: impl Target + 'static,
    context: impl Into<Option<Context>>,
    config: impl Into<Option<InvolveConfig>>,
) -> Result<Involved, InvalidCompositionError> {
    if pipelines.is_empty() {
        return Err(InvalidCompositionError::empty());
    }

    let flattened = Pipeline::concat(pipelines);
    debug!(
        pipelines = pipelines.len(),
        middleware = flattened.middleware().len(),
        afterware = flattened.afterware().len(),
        "composed pipelines in series"
    );
    Ok(flattened.involve(target, context, config))
}
