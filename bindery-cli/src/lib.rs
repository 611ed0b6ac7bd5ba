use anyhow::{anyhow, bail, Context, Result};
use bindery_core::{DataType, Model, ModelSchema, Value};
use bindery_dom::diff;
use bindery_dom::{HeadlessToolkit, VNode};
use bindery_template::{load_template, parse_template, TemplateFormat, TemplateNode};
use bindery_view::{Component, Instance, Registration, RegistryBuilder, Window};
use clap::ValueEnum;
use serde::Deserialize;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tracing::{debug, info};

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum FormatArg {
    Xml,
    Yaml,
}

impl From<FormatArg> for TemplateFormat {
    fn from(f: FormatArg) -> Self {
        match f {
            FormatArg::Xml => TemplateFormat::Xml,
            FormatArg::Yaml => TemplateFormat::Yaml,
        }
    }
}

/// A value as written in a model file: a scalar or a list of strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<String>),
}

impl From<Scalar> for Value {
    fn from(s: Scalar) -> Self {
        match s {
            Scalar::Bool(b) => Value::Bool(b),
            Scalar::Int(n) => Value::Int(n),
            Scalar::Float(x) => Value::Float(x),
            Scalar::Str(s) => Value::Str(s),
            Scalar::List(items) => Value::List(items),
        }
    }
}

/// A property is either a bare default (its type is inferred) or a
/// `{ type, default }` mapping.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PropertySpec {
    Typed {
        #[serde(rename = "type")]
        type_name: String,
        #[serde(default)]
        default: Option<Scalar>,
    },
    Default(Scalar),
}

/// A view model described in YAML:
///
/// ```yaml
/// name: Person
/// properties:
///   name: Ada
///   age: { type: int, default: 36 }
/// handlers: [save]
/// children:
///   address:
///     properties:
///       city: London
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModelSpec {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub properties: BTreeMap<String, PropertySpec>,
    #[serde(default)]
    pub handlers: Vec<String>,
    #[serde(default)]
    pub children: BTreeMap<String, ModelSpec>,
}

/// Handler invocations, in order, as `model.handler` strings.
pub type HandlerLog = Rc<RefCell<Vec<String>>>;

impl ModelSpec {
    pub fn from_yaml(src: &str) -> Result<Self> {
        serde_yaml::from_str(src).context("invalid model description")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let src = fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_yaml(&src).with_context(|| format!("in {}", path.display()))
    }

    /// Instantiate the model. Declared handlers record their invocations in
    /// `log`.
    pub fn build(&self, fallback_name: &str, log: &HandlerLog) -> Result<Rc<Model>> {
        let name = self.name.clone().unwrap_or_else(|| fallback_name.to_string());
        let mut schema = ModelSchema::builder(name.clone());
        for (prop, spec) in &self.properties {
            schema = match spec {
                PropertySpec::Default(value) => schema.property_with_default(prop, value.clone()),
                PropertySpec::Typed { type_name, default } => {
                    let dtype = DataType::from_name(type_name)
                        .ok_or_else(|| anyhow!("property {prop:?} has unknown type {type_name:?}"))?;
                    match default {
                        Some(value) => {
                            let value = dtype
                                .coerce(&value.clone().into())
                                .with_context(|| format!("default of property {prop:?}"))?;
                            schema.property_with_default(prop, value)
                        }
                        None => schema.property(prop, dtype),
                    }
                }
            };
        }
        let model = Model::new(schema.build()?);
        for handler in &self.handlers {
            let log = log.clone();
            let entry = format!("{name}.{handler}");
            model.on(handler, move || {
                info!(handler = %entry, "handler invoked");
                log.borrow_mut().push(entry.clone());
            });
        }
        for (child_name, child) in &self.children {
            model.add_child(child_name, child.build(child_name, log)?);
        }
        Ok(model)
    }
}

/// Parse a template and render its element tree.
pub fn parse_cmd(input: &Path, format: Option<FormatArg>) -> Result<String> {
    let tree = match format {
        Some(format) => {
            let src = fs::read_to_string(input).with_context(|| format!("failed to read {}", input.display()))?;
            parse_template(&src, format.into())
        }
        None => load_template(input),
    }
    .with_context(|| format!("failed to parse {}", input.display()))?;
    let mut out = String::new();
    write_tree(&tree, 0, &mut out);
    Ok(out)
}

fn write_tree(node: &TemplateNode, depth: usize, out: &mut String) {
    let _ = write!(out, "{}{}", "  ".repeat(depth), node.tag);
    for (k, v) in &node.attrs {
        let _ = write!(out, " {k}={v:?}");
    }
    if let Some(text) = node.trimmed_text() {
        let _ = write!(out, " {text:?}");
    }
    out.push('\n');
    for child in &node.children {
        write_tree(child, depth + 1, out);
    }
}

/// What `inspect` should build and poke at.
#[derive(Debug, Clone, Default)]
pub struct InspectOptions {
    pub template: PathBuf,
    pub model: Option<PathBuf>,
    /// Extra components as `(tag, template path)`.
    pub components: Vec<(String, PathBuf)>,
    /// Model writes as `(property path, value)`; dotted paths select sub-models.
    pub sets: Vec<(String, String)>,
    /// Named widgets of the main component to invoke after the writes.
    pub clicks: Vec<String>,
    pub title: Option<String>,
}

/// Split `key=value`.
pub fn parse_assignment(s: &str) -> Result<(String, String)> {
    let (k, v) = s
        .split_once('=')
        .ok_or_else(|| anyhow!("expected KEY=VALUE, got {s:?}"))?;
    if k.is_empty() {
        bail!("empty key in {s:?}");
    }
    Ok((k.to_string(), v.to_string()))
}

/// Inflate a template headlessly and report its widget tree, its bindings
/// and what each model write and click changed.
pub fn inspect_cmd(opts: &InspectOptions) -> Result<String> {
    let log = HandlerLog::default();
    let stem = opts
        .template
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("main");

    let model = match &opts.model {
        Some(path) => Some(ModelSpec::load(path)?.build(stem, &log)?),
        None => None,
    };

    let mut registry = RegistryBuilder::standard();
    for (tag, path) in &opts.components {
        debug!(tag = %tag, path = %path.display(), "registering component");
        registry = registry.register(Registration::directive(Component::new(tag).template_path(path)));
    }
    let registry = registry.build()?;

    let main = Rc::new(Component::new(stem).template_path(&opts.template));
    let tk = Rc::new(HeadlessToolkit::new());
    let window = Window::open(tk.clone(), registry, main, model.clone())
        .with_context(|| format!("failed to inflate {}", opts.template.display()))?;
    window.set_title(opts.title.clone().unwrap_or_else(|| stem.to_string()));
    window.show()?;

    let mut out = String::new();
    let mut before = tk.snapshot(window.window_id())?;
    out.push_str(&before.render());

    out.push_str("\nbindings:\n");
    for line in binding_lines(window.instance()) {
        let _ = writeln!(out, "  {line}");
    }

    let model_ref = model.as_ref();
    for (path, value) in &opts.sets {
        let model = model_ref.ok_or_else(|| anyhow!("--set {path} needs a --model"))?;
        let (target, property) = select(model, path)?;
        target
            .set(&property, value.as_str())
            .with_context(|| format!("failed to set {path}"))?;
        let after = tk.snapshot(window.window_id())?;
        let _ = writeln!(out, "\nset {path}={value}");
        write_changes(&before, &after, &mut out);
        before = after;
    }

    for name in &opts.clicks {
        let widget = window
            .instance()
            .widget(name)
            .ok_or_else(|| anyhow!("no widget named {name:?}"))?;
        let seen = log.borrow().len();
        tk.invoke(widget)?;
        let after = tk.snapshot(window.window_id())?;
        let _ = writeln!(out, "\nclick {name}");
        for handler in log.borrow().iter().skip(seen) {
            let _ = writeln!(out, "  handler {handler}");
        }
        write_changes(&before, &after, &mut out);
        before = after;
    }

    window.close();
    Ok(out)
}

fn write_changes(before: &VNode, after: &VNode, out: &mut String) {
    let changes = diff::changes(before, after);
    if changes.is_empty() {
        out.push_str("  (no changes)\n");
    }
    for change in changes {
        let _ = writeln!(out, "  {change}");
    }
}

/// Resolve `a.b.prop` to the sub-model `a.b` and the property name.
fn select(model: &Rc<Model>, path: &str) -> Result<(Rc<Model>, String)> {
    let mut parts: Vec<&str> = path.split('.').collect();
    let property = parts.pop().unwrap_or_default().to_string();
    let mut current = model.clone();
    for part in parts {
        current = current.child(part)?;
    }
    Ok((current, property))
}

/// Every binding in the instance tree, sorted.
pub fn binding_lines(instance: &Rc<Instance>) -> Vec<String> {
    let mut lines = Vec::new();
    collect_bindings(instance, &mut lines);
    lines.sort();
    lines
}

fn collect_bindings(instance: &Rc<Instance>, lines: &mut Vec<String>) {
    for binding in instance.bindings().iter() {
        let arrow = match (binding.to_view(), binding.to_model()) {
            (true, true) => "<->",
            (true, false) => "<-",
            (false, true) => "->",
            (false, false) => "x",
        };
        lines.push(format!("{} {arrow} {}", binding.key(), binding.property().name()));
    }
    for child in instance.children() {
        collect_bindings(&child, lines);
    }
}

