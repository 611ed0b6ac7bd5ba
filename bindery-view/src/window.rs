use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use bindery_core::Model;
use bindery_dom::{Toolkit, WidgetId};
use tracing::{debug, info};

use crate::directive::{Directive, Instance};
use crate::error::ViewError;
use crate::registry::Registry;

/// A top-level window showing one component.
///
/// The first window opened on a toolkit is its root window; later ones are
/// toplevels.
pub struct Window {
    toolkit: Rc<dyn Toolkit>,
    window: WidgetId,
    instance: Rc<Instance>,
    title: RefCell<String>,
}

impl Window {
    /// Create the window and inflate `component` into it against `model`.
    pub fn open(
        toolkit: Rc<dyn Toolkit>,
        registry: Rc<Registry>,
        component: Rc<dyn Directive>,
        model: impl Into<Option<Rc<Model>>>,
    ) -> Result<Self, ViewError> {
        let window = toolkit.create_window()?;
        let instance = Instance::mount(component, None, toolkit.clone(), registry, model.into(), window, None)?;
        Ok(Self {
            toolkit,
            window,
            instance,
            title: RefCell::new(String::new()),
        })
    }

    pub fn set_title(&self, title: impl Into<String>) {
        *self.title.borrow_mut() = title.into();
    }

    pub fn title(&self) -> String {
        self.title.borrow().clone()
    }

    pub fn window_id(&self) -> WidgetId {
        self.window
    }

    pub fn instance(&self) -> &Rc<Instance> {
        &self.instance
    }

    /// Title the window, run mounted hooks and enter the event loop.
    pub fn show(&self) -> Result<(), ViewError> {
        let title = self.title();
        self.toolkit.set_title(self.window, &title)?;
        self.instance.run_mounted_hooks();
        info!(%title, "showing window");
        self.toolkit.main_loop();
        Ok(())
    }

    /// Detach every binding of the window's directives and destroy it.
    /// Dropping the window does the same.
    pub fn close(self) {
        drop(self);
    }
}

impl Drop for Window {
    fn drop(&mut self) {
        debug!(window = ?self.window, "closing window");
        self.instance.teardown();
        self.toolkit.destroy(self.window);
    }
}

impl fmt::Debug for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Window")
            .field("window", &self.window)
            .field("title", &self.title.borrow())
            .field("instance", &self.instance)
            .finish()
    }
}
