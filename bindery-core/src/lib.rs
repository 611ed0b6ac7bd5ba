//! Values, view models and the binding protocol.
//!
//! Everything here is single-threaded: models, properties and bindings share
//! state through `Rc` and `RefCell` and are driven from the UI thread.

pub mod binding;
pub mod lifecycle;
pub mod model;
pub mod value;
pub mod variable;

pub use binding::{Binding, BindingId, BindingKey, BindingState, BindingTable, Direction, TargetSink};
pub use lifecycle::Lifecycle;
pub use model::{Command, Getter, Model, ModelError, ModelSchema, PropertyDescriptor, SchemaBuilder, Setter};
pub use value::{CoerceError, DataType, Value};
pub use variable::{TraceId, Variable};
