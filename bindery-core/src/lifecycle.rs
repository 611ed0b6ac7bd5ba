use std::cell::RefCell;
use std::fmt;

/// Mount and teardown hooks owned by one directive instance.
#[derive(Default)]
pub struct Lifecycle {
    mounted: RefCell<Vec<Box<dyn FnOnce()>>>,
    destroy: RefCell<Vec<Box<dyn FnOnce()>>>,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a hook to run when the owning window is shown
    pub fn on_mounted(&self, f: impl FnOnce() + 'static) {
        self.mounted.borrow_mut().push(Box::new(f));
    }

    /// Run and forget the mounted hooks. Hooks may register further hooks.
    pub fn run_mounted_hooks(&self) {
        let hooks = std::mem::take(&mut *self.mounted.borrow_mut());
        for hook in hooks {
            hook();
        }
    }

    /// Register a hook to run before the owning instance is torn down
    pub fn before_destroy(&self, f: impl FnOnce() + 'static) {
        self.destroy.borrow_mut().push(Box::new(f));
    }

    pub fn run_destroy_hooks(&self) {
        let hooks = std::mem::take(&mut *self.destroy.borrow_mut());
        for hook in hooks {
            hook();
        }
    }
}

impl fmt::Debug for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lifecycle")
            .field("mounted", &self.mounted.borrow().len())
            .field("destroy", &self.destroy.borrow().len())
            .finish()
    }
}
