use std::cell::Cell;
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::rc::Rc;

use bindery_core::Command;
use bindery_dom::{Options, WidgetId};
use bindery_template::{TemplateFormat, TemplateNode, load_template, parse_template};
use tracing::debug;

use crate::directive::{Directive, Instance};
use crate::error::ViewError;

type InstanceFn = Rc<dyn Fn(&Rc<Instance>)>;
type ConfigureFn = Rc<dyn Fn(&Rc<Instance>, &Options) -> Result<(), ViewError>>;

/// Where a component's template comes from.
#[derive(Debug, Clone)]
pub enum TemplateSource {
    Inline { source: String, format: TemplateFormat },
    Path(PathBuf),
    Tree(TemplateNode),
}

/// A structural directive that inflates its own template.
///
/// Inside a window the template's root becomes the component's root widget.
/// Anywhere else the template is built inside a fresh `Frame` named after
/// the component.
pub struct Component {
    name: String,
    template: Option<TemplateSource>,
    handlers: HashMap<String, InstanceFn>,
    mounted: Option<InstanceFn>,
    on_configure: Option<ConfigureFn>,
    counter: Cell<usize>,
}

impl Component {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            template: None,
            handlers: HashMap::new(),
            mounted: None,
            on_configure: None,
            counter: Cell::new(0),
        }
    }

    /// Use an inline XML template.
    pub fn template(mut self, source: impl Into<String>) -> Self {
        self.template = Some(TemplateSource::Inline {
            source: source.into(),
            format: TemplateFormat::Xml,
        });
        self
    }

    /// Use an inline template in the experimental YAML format.
    pub fn template_yaml(mut self, source: impl Into<String>) -> Self {
        self.template = Some(TemplateSource::Inline {
            source: source.into(),
            format: TemplateFormat::Yaml,
        });
        self
    }

    /// Read the template from a file each time the component is built.
    pub fn template_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.template = Some(TemplateSource::Path(path.into()));
        self
    }

    pub fn template_tree(mut self, tree: TemplateNode) -> Self {
        self.template = Some(TemplateSource::Tree(tree));
        self
    }

    /// Offer a handler to command attributes in this component's template
    /// and in the templates it encloses.
    pub fn handler(mut self, name: impl Into<String>, f: impl Fn(&Rc<Instance>) + 'static) -> Self {
        self.handlers.insert(name.into(), Rc::new(f));
        self
    }

    /// Run `f` when the window showing this component is shown.
    pub fn on_mounted(mut self, f: impl Fn(&Rc<Instance>) + 'static) -> Self {
        self.mounted = Some(Rc::new(f));
        self
    }

    /// Receive the custom (dashed) options written on this component's tag.
    pub fn on_configure(mut self, f: impl Fn(&Rc<Instance>, &Options) -> Result<(), ViewError> + 'static) -> Self {
        self.on_configure = Some(Rc::new(f));
        self
    }

    pub fn parsed_template(&self) -> Result<TemplateNode, ViewError> {
        match &self.template {
            Some(TemplateSource::Inline { source, format }) => Ok(parse_template(source, *format)?),
            Some(TemplateSource::Path(path)) => Ok(load_template(path)?),
            Some(TemplateSource::Tree(tree)) => Ok(tree.clone()),
            None => Err(ViewError::MissingTemplate(self.name.clone())),
        }
    }
}

impl Directive for Component {
    fn name(&self) -> &str {
        &self.name
    }

    fn create(&self, instance: &Rc<Instance>, parent: WidgetId) -> Result<WidgetId, ViewError> {
        let tree = self.parsed_template()?;
        let toolkit = instance.toolkit().clone();

        if let Some(mounted) = &self.mounted {
            let mounted = mounted.clone();
            let weak = Rc::downgrade(instance);
            instance.lifecycle().on_mounted(move || {
                if let Some(instance) = weak.upgrade() {
                    mounted(&instance);
                }
            });
        }

        if toolkit.is_window(parent) {
            return Ok(instance.construct(&tree, parent)?.widget);
        }
        let n = self.counter.get();
        self.counter.set(n + 1);
        let frame_name = format!("{}{n}", self.name.to_lowercase());
        debug!(component = %self.name, frame = %frame_name, "building component frame");
        let frame = toolkit.create_widget("Frame", parent, Some(&frame_name))?;
        instance.construct(&tree, frame)?;
        Ok(frame)
    }

    fn handler(&self, instance: &Rc<Instance>, name: &str) -> Option<Command> {
        let f = self.handlers.get(name)?.clone();
        let weak = Rc::downgrade(instance);
        Some(Rc::new(move || {
            if let Some(instance) = weak.upgrade() {
                f(&instance);
            }
        }))
    }

    fn configure(&self, instance: &Rc<Instance>, options: &Options) -> Result<(), ViewError> {
        match &self.on_configure {
            Some(f) => f(instance, options),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component")
            .field("name", &self.name)
            .field("template", &self.template)
            .field("handlers", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}
