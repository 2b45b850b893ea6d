//! The closed set of helpers understood by templates, and their Handlebars bindings.

use cruet::Inflector;
use handlebars::{
    Context, Handlebars, Helper as HelperCall, HelperDef, HelperResult, Output, RenderContext,
    RenderError, RenderErrorReason, Renderable, ScopedJson,
};

use crate::value::Value;

/// Number of arguments a helper accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exactly(usize),
    AtLeast(usize),
}

impl Arity {
    pub fn accepts(self, count: usize) -> bool {
        match self {
            Arity::Exactly(n) => count == n,
            Arity::AtLeast(n) => count >= n,
        }
    }
}

impl std::fmt::Display for Arity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Arity::Exactly(1) => write!(f, "exactly 1 argument"),
            Arity::Exactly(n) => write!(f, "exactly {n} arguments"),
            Arity::AtLeast(1) => write!(f, "at least 1 argument"),
            Arity::AtLeast(n) => write!(f, "at least {n} arguments"),
        }
    }
}

/// A registered helper.
///
/// `each` and the `this`/`../`/`@root`/`@index` paths come from Handlebars itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Helper {
    If,
    Unless,
    Eq,
    Ne,
    Or,
    And,
    Not,
    Capitalize,
    Upper,
    Lower,
    KebabCase,
    SnakeCase,
    PascalCase,
    CamelCase,
}

impl Helper {
    pub const ALL: [Helper; 14] = [
        Helper::If,
        Helper::Unless,
        Helper::Eq,
        Helper::Ne,
        Helper::Or,
        Helper::And,
        Helper::Not,
        Helper::Capitalize,
        Helper::Upper,
        Helper::Lower,
        Helper::KebabCase,
        Helper::SnakeCase,
        Helper::PascalCase,
        Helper::CamelCase,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|helper| helper.name() == name)
    }

    pub fn name(self) -> &'static str {
        match self {
            Helper::If => "if",
            Helper::Unless => "unless",
            Helper::Eq => "eq",
            Helper::Ne => "ne",
            Helper::Or => "or",
            Helper::And => "and",
            Helper::Not => "not",
            Helper::Capitalize => "capitalize",
            Helper::Upper => "upper",
            Helper::Lower => "lower",
            Helper::KebabCase => "kebab_case",
            Helper::SnakeCase => "snake_case",
            Helper::PascalCase => "pascal_case",
            Helper::CamelCase => "camel_case",
        }
    }

    pub fn arity(self) -> Arity {
        match self {
            Helper::Eq | Helper::Ne => Arity::Exactly(2),
            Helper::Or | Helper::And => Arity::AtLeast(1),
            _ => Arity::Exactly(1),
        }
    }

    /// Conditionals emit their block when their result is truthy.
    /// The text helpers only work inline.
    pub fn is_conditional(self) -> bool {
        matches!(
            self,
            Helper::If
                | Helper::Unless
                | Helper::Eq
                | Helper::Ne
                | Helper::Or
                | Helper::And
                | Helper::Not
        )
    }

    /// Evaluates an inline helper or the condition of a conditional block.
    ///
    /// Callers check the argument count against [`Helper::arity`] first.
    pub fn call(self, args: &[Value]) -> Value {
        match self {
            Helper::If => Value::Bool(args[0].is_truthy()),
            Helper::Unless | Helper::Not => Value::Bool(!args[0].is_truthy()),
            Helper::Eq => Value::Bool(args[0] == args[1]),
            Helper::Ne => Value::Bool(args[0] != args[1]),
            Helper::Or => Value::Bool(args.iter().any(Value::is_truthy)),
            Helper::And => Value::Bool(args.iter().all(Value::is_truthy)),
            Helper::Capitalize => Value::String(capitalize(&args[0].to_string())),
            Helper::Upper => Value::String(args[0].to_string().to_uppercase()),
            Helper::Lower => Value::String(args[0].to_string().to_lowercase()),
            Helper::KebabCase => Value::String(args[0].to_string().to_kebab_case()),
            Helper::SnakeCase => Value::String(args[0].to_string().to_snake_case()),
            Helper::PascalCase => Value::String(args[0].to_string().to_pascal_case()),
            Helper::CamelCase => Value::String(args[0].to_string().to_camel_case()),
        }
    }
}

/// Upper-cases the first character and leaves the rest untouched.
fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn failure(message: String) -> RenderError {
    RenderErrorReason::Other(message).into()
}

/// Parameters of a call, with unresolved paths kept as [`Value::Absent`].
fn arguments(call: &HelperCall<'_>) -> Vec<Value> {
    call.params()
        .iter()
        .map(|param| {
            if param.is_value_missing() {
                Value::Absent
            } else {
                Value::from(param.value().clone())
            }
        })
        .collect()
}

/// Exposes a [`Helper`] to a Handlebars registry, inline, as a block and in
/// sub-expressions.
#[derive(Debug, Clone, Copy)]
pub struct HelperBinding(pub Helper);

impl HelperBinding {
    fn evaluate(&self, call: &HelperCall<'_>) -> Result<Value, RenderError> {
        let helper = self.0;
        let args = arguments(call);
        if !helper.arity().accepts(args.len()) {
            return Err(failure(format!(
                "helper `{}` takes {}, got {}",
                helper.name(),
                helper.arity(),
                args.len()
            )));
        }
        Ok(helper.call(&args))
    }
}

impl HelperDef for HelperBinding {
    fn call_inner<'reg: 'rc, 'rc>(
        &self,
        h: &HelperCall<'rc>,
        _: &'reg Handlebars<'reg>,
        _: &'rc Context,
        _: &mut RenderContext<'reg, 'rc>,
    ) -> Result<ScopedJson<'rc>, RenderError> {
        Ok(ScopedJson::Derived(self.evaluate(h)?.to_json()))
    }

    fn call<'reg: 'rc, 'rc>(
        &self,
        h: &HelperCall<'rc>,
        r: &'reg Handlebars<'reg>,
        ctx: &'rc Context,
        rc: &mut RenderContext<'reg, 'rc>,
        out: &mut dyn Output,
    ) -> HelperResult {
        let result = self.evaluate(h)?;
        if !h.is_block() {
            out.write(&result.to_string())?;
            return Ok(());
        }
        if !self.0.is_conditional() {
            return Err(failure(format!("helper `{}` cannot open a block", self.0.name())));
        }

        let branch = if result.is_truthy() { h.template() } else { h.inverse() };
        match branch {
            Some(template) => template.render(r, ctx, rc, out),
            None => Ok(()),
        }
    }
}

/// Registered as `helperMissing` and `blockHelperMissing`.
///
/// A bare unresolved path such as `{{a.b.c}}` renders empty; anything that looks
/// like a helper call (arguments or a block) fails.
#[derive(Debug, Clone, Copy)]
pub struct UnknownHelper;

impl HelperDef for UnknownHelper {
    fn call_inner<'reg: 'rc, 'rc>(
        &self,
        h: &HelperCall<'rc>,
        _: &'reg Handlebars<'reg>,
        _: &'rc Context,
        _: &mut RenderContext<'reg, 'rc>,
    ) -> Result<ScopedJson<'rc>, RenderError> {
        if h.is_block() || !h.params().is_empty() || !h.hash().is_empty() {
            return Err(failure(format!("unknown helper `{}`", h.name())));
        }
        Ok(ScopedJson::Missing)
    }
}
