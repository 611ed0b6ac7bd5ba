//! The live link between one model property and one widget-facing value slot.
//!
//! # Propagation
//!
//! - To-model: any write to the binding's [`Variable`] is coerced through the
//!   property's type and written back to the model while the property
//!   suppresses this binding, so the write is not echoed back to it.
//! - To-view: the property pushes every write on the source instance into the
//!   variable. The binding marks itself as syncing for the duration so the
//!   variable write does not travel back to the model.
//!
//! # Invariants
//!
//! 1. A binding is attached to at most one property list, its own.
//! 2. A [`BindingTable`] holds at most one binding per [`BindingKey`]; the
//!    previous holder is detached before the new one is attached.
//! 3. Reading the variable never fails: malformed input yields the zero value
//!    of the property's type.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{trace, warn};

use crate::model::{Model, PropertyDescriptor};
use crate::value::Value;
use crate::variable::{TraceId, Variable};

/// Which way changes travel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    ToView,
    ToModel,
    TwoWay,
}

impl Direction {
    pub fn from_flags(to_view: bool, to_model: bool) -> Option<Self> {
        match (to_view, to_model) {
            (true, true) => Some(Direction::TwoWay),
            (true, false) => Some(Direction::ToView),
            (false, true) => Some(Direction::ToModel),
            (false, false) => None,
        }
    }

    pub fn to_view(self) -> bool {
        matches!(self, Direction::ToView | Direction::TwoWay)
    }

    pub fn to_model(self) -> bool {
        matches!(self, Direction::ToModel | Direction::TwoWay)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BindingId(u64);

/// Identity of a bound target: widget identity plus target attribute.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BindingKey(String);

impl BindingKey {
    pub fn new(widget: &str, attribute: &str) -> Self {
        BindingKey(format!("{widget}.{attribute}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BindingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingState {
    Unbound,
    Bound,
    Superseded,
}

/// How the widget side observes the binding.
pub enum TargetSink {
    /// The widget links the variable itself (a `*variable` option).
    Variable,
    /// The widget has no variable for this attribute; run a configuration
    /// callback with each new value instead.
    Config(Rc<dyn Fn(&Value)>),
}

static NEXT_BINDING_ID: AtomicU64 = AtomicU64::new(1);

pub struct Binding {
    id: BindingId,
    source: Weak<Model>,
    source_id: u64,
    property: Rc<PropertyDescriptor>,
    var: Variable,
    key: BindingKey,
    attribute: String,
    to_view: bool,
    to_model: bool,
    syncing: Cell<bool>,
    state: Cell<BindingState>,
    traces: RefCell<Vec<TraceId>>,
}

impl Binding {
    /// Link `property` on `source` to `attribute` of the widget identified by
    /// `widget`. The variable starts out holding the property's current value.
    pub fn new(
        source: &Rc<Model>,
        property: &Rc<PropertyDescriptor>,
        widget: &str,
        attribute: &str,
        direction: Direction,
        sink: TargetSink,
    ) -> Rc<Self> {
        let mut to_model = direction.to_model();
        if to_model && matches!(sink, TargetSink::Config(_)) {
            warn!(
                property = property.name(),
                attribute,
                "target is not a variable: binding back to model not supported"
            );
            to_model = false;
        }

        Rc::new_cyclic(|this: &Weak<Binding>| {
            let var = Variable::new(property.read(source));
            let mut traces = Vec::new();

            let weak = this.clone();
            traces.push(var.trace_write(move |_| {
                if let Some(binding) = weak.upgrade() {
                    binding.notify_to_model();
                }
            }));

            if let TargetSink::Config(configure) = sink {
                if direction.to_view() {
                    let weak = this.clone();
                    traces.push(var.trace_write(move |_| {
                        if let Some(binding) = weak.upgrade() {
                            configure(&binding.safe_get());
                        }
                    }));
                }
            }

            Binding {
                id: BindingId(NEXT_BINDING_ID.fetch_add(1, Ordering::Relaxed)),
                source: Rc::downgrade(source),
                source_id: source.id(),
                property: property.clone(),
                var,
                key: BindingKey::new(widget, attribute),
                attribute: attribute.to_string(),
                to_view: direction.to_view(),
                to_model,
                syncing: Cell::new(false),
                state: Cell::new(BindingState::Unbound),
                traces: RefCell::new(traces),
            }
        })
    }

    pub fn id(&self) -> BindingId {
        self.id
    }

    pub fn key(&self) -> &BindingKey {
        &self.key
    }

    pub fn target_attribute(&self) -> &str {
        &self.attribute
    }

    pub fn property(&self) -> &Rc<PropertyDescriptor> {
        &self.property
    }

    pub fn source(&self) -> Option<Rc<Model>> {
        self.source.upgrade()
    }

    pub fn variable(&self) -> &Variable {
        &self.var
    }

    pub fn to_view(&self) -> bool {
        self.to_view
    }

    /// False for config targets even when two-way was requested.
    pub fn to_model(&self) -> bool {
        self.to_model
    }

    pub fn state(&self) -> BindingState {
        self.state.get()
    }

    /// The variable's value coerced through the property's type, or the type's
    /// zero value when it does not parse.
    pub fn safe_get(&self) -> Value {
        let dtype = self.property.data_type();
        dtype.coerce(&self.var.get()).unwrap_or_else(|err| {
            trace!(key = %self.key, %err, "substituting zero value");
            dtype.zero()
        })
    }

    /// Called by the property setter for every write.
    pub fn notify_to_view(&self, value: &Value, source: &Model) {
        if !self.to_view || self.source_id != source.id() {
            return;
        }
        self.syncing.set(true);
        self.var.set(value.clone());
        self.syncing.set(false);
    }

    fn notify_to_model(&self) {
        if !self.to_model || self.syncing.get() || self.state.get() == BindingState::Superseded {
            return;
        }
        let Some(model) = self.source.upgrade() else {
            return;
        };
        let value = self.safe_get();
        trace!(key = %self.key, ?value, "to model");
        let _guard = self.property.suppress(self.id);
        if let Err(err) = self.property.write(&model, value) {
            warn!(key = %self.key, %err, "model rejected bound value");
        }
    }

    /// Remove this binding from its property and stop observing its variable.
    pub fn detach(&self) {
        self.property.detach(self);
        for id in self.traces.borrow_mut().drain(..) {
            self.var.untrace(id);
        }
        self.state.set(BindingState::Superseded);
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("key", &self.key)
            .field("property", &self.property.name())
            .field("to_view", &self.to_view)
            .field("to_model", &self.to_model)
            .field("state", &self.state.get())
            .finish()
    }
}

/// Bindings owned by one directive instance, keyed by target.
#[derive(Debug, Default)]
pub struct BindingTable {
    entries: HashMap<BindingKey, Rc<Binding>>,
}

impl BindingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `binding` under its key, detaching whatever held that key.
    /// Returns the superseded binding.
    pub fn install(&mut self, binding: Rc<Binding>) -> Option<Rc<Binding>> {
        let previous = self.entries.remove(binding.key());
        if let Some(prev) = &previous {
            prev.detach();
        }
        binding.property().attach(binding.clone());
        binding.state.set(BindingState::Bound);
        self.entries.insert(binding.key().clone(), binding);
        previous
    }

    pub fn get(&self, key: &BindingKey) -> Option<&Rc<Binding>> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rc<Binding>> {
        self.entries.values()
    }

    /// Detach and drop every binding.
    pub fn clear(&mut self) {
        for (_, binding) in self.entries.drain() {
            binding.detach();
        }
    }
}
