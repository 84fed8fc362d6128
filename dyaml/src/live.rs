//! Configs that follow their git store.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::{
    config::Config,
    error::{Error, Result},
    loader,
    printer::Printer,
    store::{self, GitOperator},
};

/// Callback receiving background reload failures.
pub type FailHandler = Arc<dyn Fn(&Error) + Send + Sync>;

/// Something a store worker reloads after each sync.
pub trait Reloadable: Send + Sync {
    fn reload(&self) -> Result<()>;

    /// Report a failed sync or reload.
    fn fail(&self, error: &Error);
}

/// A loaded config kept current by its git store's background worker.
///
/// A failed reload leaves the last good state in place and is handed to the
/// failure handler.
pub struct LiveConfig<T> {
    inner: Arc<Mutex<T>>,
    printer: Printer,
    on_fail: Option<FailHandler>,
}

impl<T: Config + Send + 'static> LiveConfig<T> {
    /// Load `T` and, when it is bound to a registered git store, attach it
    /// to the store's worker.
    pub fn load(printer: Printer, on_fail: Option<FailHandler>) -> Result<Arc<Self>> {
        let instance = loader::load::<T>(&printer)?;
        let live = Arc::new(LiveConfig {
            inner: Arc::new(Mutex::new(instance)),
            printer,
            on_fail,
        });

        if let Some(operator) = T::location()
            .git
            .and_then(|binding| store::fetch_store(binding.namespace))
        {
            live.watch(&operator);
        }
        Ok(live)
    }

    /// Attach to `operator` so every background sync reloads this config.
    pub fn watch(self: &Arc<Self>, operator: &Arc<GitOperator>) {
        let target: Arc<dyn Reloadable> = self.clone();
        operator.watch(&target);
    }

    /// Lock the current value.
    pub fn get(&self) -> MutexGuard<'_, T> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The shared value, for holders that outlive this handle.
    pub fn shared(&self) -> Arc<Mutex<T>> {
        self.inner.clone()
    }

    pub fn printer(&self) -> &Printer {
        &self.printer
    }

    /// Re-read the document now.
    pub fn reload(&self) -> Result<()> {
        loader::reload(&mut *self.get(), &self.printer)
    }

    /// Write the current value to the document.
    pub fn store(&self) -> Result<()> {
        loader::store(&*self.get(), &self.printer)
    }
}

impl<T: Config + Send + 'static> Reloadable for LiveConfig<T> {
    fn reload(&self) -> Result<()> {
        LiveConfig::reload(self)
    }

    fn fail(&self, error: &Error) {
        match &self.on_fail {
            Some(handler) => handler(error),
            None => warn!(
                "reloading {} failed: {error}",
                std::any::type_name::<T>()
            ),
        }
    }
}
