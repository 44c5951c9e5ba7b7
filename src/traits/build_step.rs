use async_trait::async_trait;

use crate::engine::StepContext;

/// The runnable logic of one node in a build chain.
///
/// A step reads the items it declared as consumed and emits the items it
/// declared as produced through the [`StepContext`]. Returning an error (or
/// panicking) marks the run as failed without stopping other steps.
#[async_trait]
pub trait BuildStep: Send + Sync + 'static {
    async fn execute(&self, context: &StepContext) -> anyhow::Result<()>;

    /// Name used in errors, diagnostics, logs and graph output.
    fn id(&self) -> String {
        std::any::type_name::<Self>().to_string()
    }
}

/// A build step backed by a synchronous closure.
pub struct FnBuildStep<F> {
    id: String,
    body: F,
}

impl<F> FnBuildStep<F>
where
    F: Fn(&StepContext) -> anyhow::Result<()> + Send + Sync + 'static,
{
    pub fn new(id: impl Into<String>, body: F) -> Self {
        Self {
            id: id.into(),
            body,
        }
    }
}

#[async_trait]
impl<F> BuildStep for FnBuildStep<F>
where
    F: Fn(&StepContext) -> anyhow::Result<()> + Send + Sync + 'static,
{
    async fn execute(&self, context: &StepContext) -> anyhow::Result<()> {
        (self.body)(context)
    }

    fn id(&self) -> String {
        self.id.clone()
    }
}

/// Wraps a closure as a named build step.
///
/// ```
/// use buildchain::traits::{step_fn, BuildStep};
///
/// let step = step_fn("noop", |_context| Ok(()));
/// assert_eq!(step.id(), "noop");
/// ```
pub fn step_fn<F>(id: impl Into<String>, body: F) -> FnBuildStep<F>
where
    F: Fn(&StepContext) -> anyhow::Result<()> + Send + Sync + 'static,
{
    FnBuildStep::new(id, body)
}
