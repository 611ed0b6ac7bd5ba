use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::value::{DataType, Value};

/// Handle returned by [`Variable::trace_write`], used to remove the observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TraceId(u64);

type Observer = Rc<dyn Fn(&Value)>;

struct Inner {
    value: RefCell<Value>,
    observers: RefCell<Vec<(TraceId, Observer)>>,
    next_trace: Cell<u64>,
    writes: Cell<u64>,
}

/// The observable cell a binding shares with a widget.
///
/// Widgets write raw values into it (typed text is a `Value::Str` even when the
/// bound property is numeric); readers coerce. Every write notifies every
/// observer, equal values included, the same way a toolkit write trace fires.
#[derive(Clone)]
pub struct Variable {
    inner: Rc<Inner>,
}

impl Variable {
    pub fn new(initial: impl Into<Value>) -> Self {
        Self {
            inner: Rc::new(Inner {
                value: RefCell::new(initial.into()),
                observers: RefCell::new(Vec::new()),
                next_trace: Cell::new(0),
                writes: Cell::new(0),
            }),
        }
    }

    /// A variable holding the zero value of `dtype`.
    pub fn for_type(dtype: DataType) -> Self {
        Self::new(dtype.zero())
    }

    /// The raw stored value, uncoerced.
    pub fn get(&self) -> Value {
        self.inner.value.borrow().clone()
    }

    /// Store `value` and run every write observer with it.
    pub fn set(&self, value: impl Into<Value>) {
        let value = value.into();
        *self.inner.value.borrow_mut() = value.clone();
        self.inner.writes.set(self.inner.writes.get() + 1);

        // Snapshot observers so they may trace/untrace or write again.
        let observers: Vec<Observer> = self
            .inner
            .observers
            .borrow()
            .iter()
            .map(|(_, o)| o.clone())
            .collect();
        for observer in observers {
            observer(&value);
        }
    }

    /// Register `observer` to run after every write.
    pub fn trace_write(&self, observer: impl Fn(&Value) + 'static) -> TraceId {
        let id = TraceId(self.inner.next_trace.get());
        self.inner.next_trace.set(id.0 + 1);
        self.inner
            .observers
            .borrow_mut()
            .push((id, Rc::new(observer)));
        id
    }

    pub fn untrace(&self, id: TraceId) -> bool {
        let mut observers = self.inner.observers.borrow_mut();
        let before = observers.len();
        observers.retain(|(t, _)| *t != id);
        observers.len() != before
    }

    pub fn observer_count(&self) -> usize {
        self.inner.observers.borrow().len()
    }

    /// Number of writes since creation.
    pub fn write_count(&self) -> u64 {
        self.inner.writes.get()
    }

    pub fn ptr_eq(&self, other: &Variable) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Variable")
            .field("value", &*self.inner.value.borrow())
            .field("observers", &self.observer_count())
            .finish()
    }
}
