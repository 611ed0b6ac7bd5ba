//! Directives wrapping a single native widget.

use std::rc::Rc;

use bindery_core::{DataType, Value, Variable};
use bindery_dom::{ConfigValue, EditAction, Options, Validator, WidgetId};
use tracing::debug;

use crate::directive::{Directive, Instance};
use crate::error::ViewError;

/// A native class under its own tag, created with preset options.
#[derive(Debug, Clone)]
pub struct WidgetWrapper {
    name: String,
    class: String,
    presets: Vec<(String, Value)>,
}

impl WidgetWrapper {
    pub fn new(name: impl Into<String>, class: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            class: class.into(),
            presets: Vec::new(),
        }
    }

    pub fn preset(mut self, option: impl Into<String>, value: impl Into<Value>) -> Self {
        self.presets.push((option.into(), value.into()));
        self
    }
}

impl Directive for WidgetWrapper {
    fn name(&self) -> &str {
        &self.name
    }

    fn create(&self, instance: &Rc<Instance>, parent: WidgetId) -> Result<WidgetId, ViewError> {
        let toolkit = instance.toolkit();
        let widget = toolkit.create_widget(&self.class, parent, instance.declared_name())?;
        if !self.presets.is_empty() {
            let options = self
                .presets
                .iter()
                .map(|(k, v)| (k.clone(), ConfigValue::Value(v.clone())))
                .collect();
            toolkit.configure(widget, options)?;
        }
        Ok(widget)
    }
}

/// Option selecting the type a [`NumericEntry`] accepts.
pub const DATA_TYPE_OPTION: &str = "data-type";

/// Whether `text` is acceptable input for `dtype` while typing.
pub fn accepts(dtype: DataType, text: &str) -> bool {
    match dtype {
        DataType::Int => text.parse::<i64>().is_ok(),
        DataType::Float => text.parse::<f64>().is_ok(),
        DataType::Bool => dtype.coerce(&Value::from(text)).is_ok(),
        DataType::Str | DataType::List => true,
    }
}

/// A key validator for `dtype`. Deletions are always accepted, so a field
/// can be cleared.
pub fn numeric_validator(dtype: DataType) -> Validator {
    Rc::new(move |action: EditAction, proposed: &str| match action {
        EditAction::Delete => true,
        EditAction::Insert => accepts(dtype, proposed),
    })
}

/// An `Entry` that only accepts keystrokes leaving it parseable as its data
/// type (integer unless `data-type` says otherwise).
#[derive(Debug, Clone)]
pub struct NumericEntry {
    default_type: DataType,
}

impl NumericEntry {
    pub fn new() -> Self {
        Self {
            default_type: DataType::Int,
        }
    }

    fn install_validator(instance: &Rc<Instance>, widget: WidgetId, dtype: DataType) -> Result<(), ViewError> {
        instance.toolkit().configure(
            widget,
            vec![
                ("validate".to_string(), ConfigValue::from("key")),
                ("validatecommand".to_string(), ConfigValue::Validator(numeric_validator(dtype))),
            ],
        )?;
        Ok(())
    }
}

impl Default for NumericEntry {
    fn default() -> Self {
        Self::new()
    }
}

impl Directive for NumericEntry {
    fn name(&self) -> &str {
        "NumericEntry"
    }

    fn create(&self, instance: &Rc<Instance>, parent: WidgetId) -> Result<WidgetId, ViewError> {
        let widget = instance
            .toolkit()
            .create_widget("Entry", parent, instance.declared_name())?;
        Self::install_validator(instance, widget, self.default_type)?;
        Ok(widget)
    }

    fn configure(&self, instance: &Rc<Instance>, options: &Options) -> Result<(), ViewError> {
        let Some(name) = options.get(DATA_TYPE_OPTION) else {
            return Ok(());
        };
        let dtype = DataType::from_name(name).ok_or_else(|| ViewError::InvalidOption {
            option: DATA_TYPE_OPTION.to_string(),
            value: name.clone(),
        })?;
        let Some(widget) = instance.root_widget() else {
            return Ok(());
        };
        Self::install_validator(instance, widget, dtype)
    }
}

/// Option carrying an [`OptionMenu`]'s choices.
pub const VALUES_OPTION: &str = "values";

/// A menubutton whose dropdown offers `values` as radio entries. The chosen
/// value lands in the button's text variable; `variable` is accepted as a
/// name for it.
#[derive(Debug, Default, Clone, Copy)]
pub struct OptionMenu;

impl OptionMenu {
    /// Replace the dropdown's entries with `choices`. The selection survives
    /// when it is still offered; otherwise the first choice is selected.
    pub fn set_menu(instance: &Rc<Instance>, choices: &[String]) -> Result<(), ViewError> {
        let toolkit = instance.toolkit();
        let button = instance
            .root_widget()
            .ok_or_else(|| ViewError::Unmounted("OptionMenu".to_string()))?;
        let menu = toolkit
            .children(button)
            .into_iter()
            .next()
            .ok_or_else(|| ViewError::Unmounted("OptionMenu dropdown".to_string()))?;

        let variable = match toolkit.cget(button, "textvariable") {
            Some(ConfigValue::Variable(var)) => var,
            _ => {
                let var = Variable::new("");
                toolkit.configure(button, vec![("textvariable".to_string(), ConfigValue::Variable(var.clone()))])?;
                var
            }
        };

        toolkit.menu_delete(menu, 0)?;
        for choice in choices {
            toolkit.menu_add_item(
                menu,
                "radiobutton",
                vec![
                    ("label".to_string(), ConfigValue::from(choice.as_str())),
                    ("value".to_string(), ConfigValue::from(choice.as_str())),
                    ("variable".to_string(), ConfigValue::Variable(variable.clone())),
                ],
            )?;
        }
        debug!(choices = choices.len(), "option menu filled");

        let current = variable.get().to_string();
        if !choices.contains(&current) {
            if let Some(first) = choices.first() {
                variable.set(first.as_str());
            }
        }
        Ok(())
    }
}

fn choices_of(value: &ConfigValue) -> Result<Vec<String>, ViewError> {
    let raw = match value {
        ConfigValue::Value(v) => v.clone(),
        ConfigValue::Variable(var) => var.get(),
        ConfigValue::Unset => return Ok(Vec::new()),
        other => {
            return Err(ViewError::InvalidOption {
                option: VALUES_OPTION.to_string(),
                value: format!("{other:?}"),
            });
        }
    };
    match DataType::List.coerce(&raw) {
        Ok(Value::List(items)) => Ok(items),
        _ => Err(ViewError::InvalidOption {
            option: VALUES_OPTION.to_string(),
            value: raw.to_string(),
        }),
    }
}

impl Directive for OptionMenu {
    fn name(&self) -> &str {
        "OptionMenu"
    }

    fn create(&self, instance: &Rc<Instance>, parent: WidgetId) -> Result<WidgetId, ViewError> {
        let toolkit = instance.toolkit();
        let button = toolkit.create_widget("Menubutton", parent, instance.declared_name())?;
        let menu = toolkit.create_widget("Menu", button, Some("menu"))?;
        let menu_path = toolkit.path_name(menu)?;
        toolkit.configure(
            button,
            vec![
                ("menu".to_string(), ConfigValue::from(menu_path.as_str())),
                ("direction".to_string(), ConfigValue::from("flush")),
            ],
        )?;
        Ok(button)
    }

    fn configure_widget(&self, instance: &Rc<Instance>, options: Vec<(String, ConfigValue)>) -> Result<(), ViewError> {
        let button = instance
            .root_widget()
            .ok_or_else(|| ViewError::Unmounted(self.name().to_string()))?;
        let mut values = None;
        let mut rest = Vec::with_capacity(options.len());
        for (key, value) in options {
            match key.as_str() {
                VALUES_OPTION => values = Some(value),
                "variable" => rest.push(("textvariable".to_string(), value)),
                _ => rest.push((key, value)),
            }
        }
        // The text variable has to be in place before entries refer to it.
        if !rest.is_empty() {
            instance.toolkit().configure(button, rest)?;
        }
        match values {
            Some(values) => Self::set_menu(instance, &choices_of(&values)?),
            None => Ok(()),
        }
    }
}
