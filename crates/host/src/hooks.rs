use std::sync::Arc;

use saledash_auth::SessionContext;

use crate::error::HostError;

/// Callback run after a record transition has completed successfully.
///
/// The record passed in is the post-transition state. Returning an error
/// aborts the remaining hooks and reaches the caller as [`HostError::Hook`].
pub trait TransitionHook<R>: Send + Sync {
    fn name(&self) -> &str;

    fn after_transition(&self, ctx: &SessionContext, record: &R) -> anyhow::Result<()>;
}

impl<R, F> TransitionHook<R> for F
where
    F: Fn(&SessionContext, &R) -> anyhow::Result<()> + Send + Sync,
{
    fn name(&self) -> &str {
        "anonymous"
    }

    fn after_transition(&self, ctx: &SessionContext, record: &R) -> anyhow::Result<()> {
        self(ctx, record)
    }
}

/// Named list of hooks attached to one host transition.
pub struct ExtensionPoint<R> {
    name: &'static str,
    hooks: Vec<Arc<dyn TransitionHook<R>>>,
}

impl<R> ExtensionPoint<R> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            hooks: Vec::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn register(&mut self, hook: Arc<dyn TransitionHook<R>>) {
        tracing::debug!(extension_point = self.name, hook = hook.name(), "hook registered");
        self.hooks.push(hook);
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Run every hook in registration order; the first failure wins.
    pub fn run(&self, ctx: &SessionContext, record: &R) -> Result<(), HostError> {
        for hook in &self.hooks {
            if let Err(err) = hook.after_transition(ctx, record) {
                tracing::warn!(
                    extension_point = self.name,
                    hook = hook.name(),
                    error = %err,
                    "extension hook failed"
                );
                return Err(HostError::Hook(err));
            }
        }
        Ok(())
    }
}

impl<R> core::fmt::Debug for ExtensionPoint<R> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ExtensionPoint")
            .field("name", &self.name)
            .field(
                "hooks",
                &self.hooks.iter().map(|h| h.name().to_string()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use saledash_core::UserId;
    use std::sync::Mutex;

    fn ctx() -> SessionContext {
        SessionContext::authenticated(UserId::new(5), "demo", "Demo")
    }

    #[test]
    fn hooks_run_in_registration_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut point = ExtensionPoint::<u32>::new("test");

        for tag in ["first", "second"] {
            let seen = seen.clone();
            point.register(Arc::new(move |_: &SessionContext, r: &u32| -> anyhow::Result<()> {
                seen.lock().unwrap().push((tag, *r));
                Ok(())
            }));
        }

        point.run(&ctx(), &7).unwrap();
        assert_eq!(*seen.lock().unwrap(), vec![("first", 7), ("second", 7)]);
    }

    #[test]
    fn first_failure_stops_the_chain() {
        let calls = Arc::new(Mutex::new(0));
        let mut point = ExtensionPoint::<u32>::new("test");
        point.register(Arc::new(|_: &SessionContext, _: &u32| -> anyhow::Result<()> { anyhow::bail!("bus down") }));
        {
            let calls = calls.clone();
            point.register(Arc::new(move |_: &SessionContext, _: &u32| -> anyhow::Result<()> {
                *calls.lock().unwrap() += 1;
                Ok(())
            }));
        }

        let err = point.run(&ctx(), &1).unwrap_err();
        assert_eq!(err.hook_error().map(|e| e.to_string()).as_deref(), Some("bus down"));
        assert_eq!(*calls.lock().unwrap(), 0);
    }
}
