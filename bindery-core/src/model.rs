//! View models: schemas of named, typed properties and the instances that hold
//! their values.
//!
//! A [`ModelSchema`] is built once with explicit property names and shared by
//! every [`Model`] created from it. Each [`PropertyDescriptor`] keeps the list
//! of bindings observing it; a write notifies only the bindings whose source is
//! the instance being written.
//!
//! Computed properties replace the stored slot with a getter and a setter.
//! Bindings see whatever the getter reports after the setter ran.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use thiserror::Error;
use tracing::trace;

use crate::binding::{Binding, BindingId};
use crate::value::{CoerceError, DataType, Value};

/// A no-argument handler a widget can invoke.
pub type Command = Rc<dyn Fn()>;

/// Reads a computed property.
pub type Getter = Rc<dyn Fn(&Model) -> Value>;

/// Stores an already coerced value into a computed property.
pub type Setter = Rc<dyn Fn(&Model, Value) -> Result<(), ModelError>>;

#[derive(Clone)]
struct Accessors {
    get: Getter,
    set: Setter,
}

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("{model} has no property \"{property}\"")]
    UnknownProperty { model: String, property: String },

    #[error("{model} has no sub-model \"{name}\"")]
    UnknownChild { model: String, name: String },

    #[error("property \"{0}\" is declared twice")]
    DuplicateProperty(String),

    #[error("cannot assign to \"{property}\": {source}")]
    Coerce {
        property: String,
        #[source]
        source: CoerceError,
    },
}

/// A named, typed, default-valued property of a model schema.
pub struct PropertyDescriptor {
    name: String,
    dtype: DataType,
    default: Value,
    accessors: Option<Accessors>,
    bindings: RefCell<Vec<Rc<Binding>>>,
    suppressed: RefCell<Vec<BindingId>>,
}

impl PropertyDescriptor {
    fn new(name: String, dtype: DataType, default: Value, accessors: Option<Accessors>) -> Self {
        Self {
            name,
            dtype,
            default,
            accessors,
            bindings: RefCell::new(Vec::new()),
            suppressed: RefCell::new(Vec::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data_type(&self) -> DataType {
        self.dtype
    }

    pub fn default_value(&self) -> &Value {
        &self.default
    }

    pub fn is_computed(&self) -> bool {
        self.accessors.is_some()
    }

    /// Snapshot of the attached bindings.
    pub fn bindings(&self) -> Vec<Rc<Binding>> {
        self.bindings.borrow().clone()
    }

    pub fn binding_count(&self) -> usize {
        self.bindings.borrow().len()
    }

    /// Current value of this property on `model`.
    pub fn read(&self, model: &Model) -> Value {
        if let Some(accessors) = &self.accessors {
            let raw = (accessors.get)(model);
            return self.dtype.coerce(&raw).unwrap_or_else(|err| {
                trace!(property = %self.name, %err, "getter returned an unusable value");
                self.dtype.zero()
            });
        }
        model
            .slots
            .borrow()
            .get(&self.name)
            .cloned()
            .unwrap_or_else(|| self.default.clone())
    }

    /// Store `value` on `model` and push the stored value to the view-bound
    /// bindings of that instance. A suppressed binding is skipped unless the
    /// store changed what it wrote.
    pub fn write(&self, model: &Model, value: impl Into<Value>) -> Result<(), ModelError> {
        let value = self
            .dtype
            .coerce(&value.into())
            .map_err(|source| ModelError::Coerce {
                property: self.name.clone(),
                source,
            })?;
        let stored = match &self.accessors {
            Some(accessors) => {
                (accessors.set)(model, value.clone())?;
                self.read(model)
            }
            None => {
                model
                    .slots
                    .borrow_mut()
                    .insert(self.name.clone(), value.clone());
                value.clone()
            }
        };

        let bindings = self.bindings();
        for binding in bindings {
            if self.is_suppressed(binding.id()) && stored == value {
                continue;
            }
            binding.notify_to_view(&stored, model);
        }
        Ok(())
    }

    /// Exclude `binding` from notifications until the guard drops.
    pub fn suppress(&self, binding: BindingId) -> SuppressGuard<'_> {
        self.suppressed.borrow_mut().push(binding);
        SuppressGuard {
            property: self,
            binding,
        }
    }

    fn is_suppressed(&self, binding: BindingId) -> bool {
        self.suppressed.borrow().contains(&binding)
    }

    pub(crate) fn attach(&self, binding: Rc<Binding>) {
        debug_assert!(std::ptr::eq(Rc::as_ptr(binding.property()), self));
        let mut bindings = self.bindings.borrow_mut();
        if !bindings.iter().any(|b| Rc::ptr_eq(b, &binding)) {
            bindings.push(binding);
        }
    }

    pub(crate) fn detach(&self, binding: &Binding) -> bool {
        let mut bindings = self.bindings.borrow_mut();
        let before = bindings.len();
        bindings.retain(|b| b.id() != binding.id());
        bindings.len() != before
    }
}

impl fmt::Debug for PropertyDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyDescriptor")
            .field("name", &self.name)
            .field("dtype", &self.dtype)
            .field("default", &self.default)
            .field("computed", &self.is_computed())
            .field("bindings", &self.binding_count())
            .finish()
    }
}

/// Scoped exclusion of one binding from a property's notifications.
pub struct SuppressGuard<'a> {
    property: &'a PropertyDescriptor,
    binding: BindingId,
}

impl Drop for SuppressGuard<'_> {
    fn drop(&mut self) {
        let mut suppressed = self.property.suppressed.borrow_mut();
        if let Some(pos) = suppressed.iter().rposition(|b| *b == self.binding) {
            suppressed.remove(pos);
        }
    }
}

/// The declared properties of a model type.
#[derive(Debug)]
pub struct ModelSchema {
    name: String,
    properties: Vec<Rc<PropertyDescriptor>>,
}

impl ModelSchema {
    pub fn builder(name: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder {
            name: name.into(),
            properties: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn property(&self, name: &str) -> Option<&Rc<PropertyDescriptor>> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub fn properties(&self) -> impl Iterator<Item = &Rc<PropertyDescriptor>> {
        self.properties.iter()
    }
}

struct Declared {
    name: String,
    dtype: DataType,
    default: Value,
    accessors: Option<Accessors>,
}

pub struct SchemaBuilder {
    name: String,
    properties: Vec<Declared>,
}

impl SchemaBuilder {
    /// Declare a property defaulting to the zero value of `dtype`.
    pub fn property(self, name: impl Into<String>, dtype: DataType) -> Self {
        self.declare(name.into(), dtype, dtype.zero(), None)
    }

    /// Declare a property whose type is taken from its default.
    pub fn property_with_default(self, name: impl Into<String>, default: impl Into<Value>) -> Self {
        let default = default.into();
        self.declare(name.into(), default.data_type(), default, None)
    }

    /// Declare a property without a slot of its own. Reads call `get`;
    /// writes coerce through `dtype` and hand the result to `set`.
    pub fn computed(
        self,
        name: impl Into<String>,
        dtype: DataType,
        get: impl Fn(&Model) -> Value + 'static,
        set: impl Fn(&Model, Value) -> Result<(), ModelError> + 'static,
    ) -> Self {
        let accessors = Accessors {
            get: Rc::new(get),
            set: Rc::new(set),
        };
        self.declare(name.into(), dtype, dtype.zero(), Some(accessors))
    }

    fn declare(mut self, name: String, dtype: DataType, default: Value, accessors: Option<Accessors>) -> Self {
        self.properties.push(Declared {
            name,
            dtype,
            default,
            accessors,
        });
        self
    }

    pub fn build(self) -> Result<Rc<ModelSchema>, ModelError> {
        let mut properties: Vec<Rc<PropertyDescriptor>> = Vec::with_capacity(self.properties.len());
        for declared in self.properties {
            if properties.iter().any(|p| p.name == declared.name) {
                return Err(ModelError::DuplicateProperty(declared.name));
            }
            properties.push(Rc::new(PropertyDescriptor::new(
                declared.name,
                declared.dtype,
                declared.default,
                declared.accessors,
            )));
        }
        Ok(Rc::new(ModelSchema {
            name: self.name,
            properties,
        }))
    }
}

static NEXT_MODEL_ID: AtomicU64 = AtomicU64::new(1);

/// One view-model instance.
pub struct Model {
    id: u64,
    schema: Rc<ModelSchema>,
    slots: RefCell<HashMap<String, Value>>,
    children: RefCell<HashMap<String, Rc<Model>>>,
    handlers: RefCell<HashMap<String, Command>>,
}

impl Model {
    /// Create an instance with every declared default applied.
    pub fn new(schema: Rc<ModelSchema>) -> Rc<Self> {
        let slots = schema
            .properties()
            .filter(|p| !p.is_computed())
            .map(|p| (p.name.clone(), p.default.clone()))
            .collect();
        Rc::new(Self {
            id: NEXT_MODEL_ID.fetch_add(1, Ordering::Relaxed),
            schema,
            slots: RefCell::new(slots),
            children: RefCell::new(HashMap::new()),
            handlers: RefCell::new(HashMap::new()),
        })
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn schema(&self) -> &Rc<ModelSchema> {
        &self.schema
    }

    pub fn property(&self, name: &str) -> Result<&Rc<PropertyDescriptor>, ModelError> {
        self.schema
            .property(name)
            .ok_or_else(|| ModelError::UnknownProperty {
                model: self.schema.name.clone(),
                property: name.to_string(),
            })
    }

    pub fn get(&self, name: &str) -> Result<Value, ModelError> {
        Ok(self.property(name)?.read(self))
    }

    pub fn set(&self, name: &str, value: impl Into<Value>) -> Result<(), ModelError> {
        let property = self.property(name)?.clone();
        trace!(model = %self.schema.name, property = name, "set");
        property.write(self, value)
    }

    /// The raw slot `name`, bypassing accessors and bindings. Computed
    /// properties keep their state here.
    pub fn slot(&self, name: &str) -> Option<Value> {
        self.slots.borrow().get(name).cloned()
    }

    /// Overwrite the raw slot `name` without notifying anyone.
    pub fn set_slot(&self, name: impl Into<String>, value: impl Into<Value>) {
        self.slots.borrow_mut().insert(name.into(), value.into());
    }

    /// Attach a nested view model under `name`.
    pub fn add_child(&self, name: impl Into<String>, child: Rc<Model>) {
        self.children.borrow_mut().insert(name.into(), child);
    }

    pub fn child(&self, name: &str) -> Result<Rc<Model>, ModelError> {
        self.children
            .borrow()
            .get(name)
            .cloned()
            .ok_or_else(|| ModelError::UnknownChild {
                model: self.schema.name.clone(),
                name: name.to_string(),
            })
    }

    /// Register a command handler widgets can refer to by name.
    pub fn on(&self, name: impl Into<String>, handler: impl Fn() + 'static) {
        self.handlers
            .borrow_mut()
            .insert(name.into(), Rc::new(handler));
    }

    pub fn handler(&self, name: &str) -> Option<Command> {
        self.handlers.borrow().get(name).cloned()
    }
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("id", &self.id)
            .field("schema", &self.schema.name)
            .field("slots", &*self.slots.borrow())
            .finish()
    }
}
