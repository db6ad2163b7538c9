//! Immutable markup nodes.
//!
//! A tree is built once per render with [`h`] and [`fragment`] and is never
//! mutated afterwards. There is no diffing: the serializer walks it once.

use std::fmt;
use std::sync::Arc;

/// A primitive attribute value, or a primitive child rendered as text.
#[derive(Debug, Clone, PartialEq)]
pub enum PropValue {
    Str(String),
    Number(f64),
    /// Arbitrary-precision integers in the source model; i128 covers every
    /// value this crate is asked to print.
    BigInt(i128),
    Bool(bool),
    /// Null and undefined. Never rendered.
    Null,
}

impl PropValue {
    /// Text form of a printable value. `None` for `false` and `Null`.
    pub fn printable(&self) -> Option<String> {
        match self {
            Self::Str(s) => Some(s.clone()),
            Self::Number(n) => Some(format_number(*n)),
            Self::BigInt(n) => Some(n.to_string()),
            Self::Bool(true) => Some("true".to_string()),
            Self::Bool(false) | Self::Null => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric reading of the value, parsing strings the way attribute
    /// values are usually written (`"50"`, `"12.5"`).
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Str(s) => s.trim().parse().ok(),
            Self::Number(n) => Some(*n),
            Self::BigInt(n) => Some(*n as f64),
            Self::Bool(_) | Self::Null => None,
        }
    }

    /// Whether a child with this value produces any output.
    pub fn is_renderable(&self) -> bool {
        match self {
            Self::Str(s) => !s.is_empty(),
            Self::Bool(b) => *b,
            Self::Null => false,
            Self::Number(_) | Self::BigInt(_) => true,
        }
    }
}

/// Shortest round-trip decimal, spelled the way browsers print numbers:
/// exponent form outside `[1e-6, 1e21)` with an explicit `+` on positive
/// exponents, and named non-finite values.
fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if n == 0.0 {
        "0".to_string()
    } else if !(1e-6..1e21).contains(&n.abs()) {
        let exponential = format!("{:e}", n);
        match exponential.split_once('e') {
            Some((mantissa, exponent)) if !exponent.starts_with('-') => {
                format!("{}e+{}", mantissa, exponent)
            }
            _ => exponential,
        }
    } else {
        n.to_string()
    }
}

impl From<&str> for PropValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for PropValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<&String> for PropValue {
    fn from(value: &String) -> Self {
        Self::Str(value.clone())
    }
}

impl From<f64> for PropValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<f32> for PropValue {
    fn from(value: f32) -> Self {
        Self::Number(f64::from(value))
    }
}

macro_rules! integer_prop {
    ($($ty:ty),*) => {
        $(impl From<$ty> for PropValue {
            fn from(value: $ty) -> Self {
                Self::BigInt(i128::from(value))
            }
        })*
    };
}

integer_prop!(i32, i64, u8, u16, u32, u64);

impl From<usize> for PropValue {
    fn from(value: usize) -> Self {
        Self::BigInt(value as i128)
    }
}

impl From<bool> for PropValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl<T: Into<PropValue>> From<Option<T>> for PropValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// Ordered attribute list. Later writes to an existing name replace the
/// value in place, so output order follows first insertion.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attrs(Vec<(String, PropValue)>);

impl Attrs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<PropValue>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<PropValue>) {
        let name = name.into();
        let value = value.into();
        match self.0.iter_mut().find(|(key, _)| *key == name) {
            Some((_, slot)) => *slot = value,
            None => self.0.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&PropValue> {
        self.0
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    pub fn remove(&mut self, name: &str) -> Option<PropValue> {
        let index = self.0.iter().position(|(key, _)| key == name)?;
        Some(self.0.remove(index).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropValue)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<PropValue>> FromIterator<(K, V)> for Attrs {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut attrs = Self::new();
        for (key, value) in iter {
            attrs.set(key, value);
        }
        attrs
    }
}

/// A child slot: a nested node or a primitive.
#[derive(Debug, Clone)]
pub enum Child {
    Node(Node),
    Value(PropValue),
}

impl Child {
    /// The empty child, rendered as nothing.
    pub const NONE: Child = Child::Value(PropValue::Null);

    pub fn is_renderable(&self) -> bool {
        match self {
            Self::Node(_) => true,
            Self::Value(value) => value.is_renderable(),
        }
    }
}

impl From<Node> for Child {
    fn from(node: Node) -> Self {
        Self::Node(node)
    }
}

macro_rules! value_child {
    ($($ty:ty),*) => {
        $(impl From<$ty> for Child {
            fn from(value: $ty) -> Self {
                Self::Value(value.into())
            }
        })*
    };
}

value_child!(PropValue, &str, String, &String, f64, f32, i32, i64, u8, u16, u32, u64, usize, bool);

impl<T: Into<Child>> From<Option<T>> for Child {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::NONE, Into::into)
    }
}

/// Children as seen by a component: absent, the lone child, or all of them.
#[derive(Debug, Clone, Default)]
pub enum ComponentChildren {
    #[default]
    None,
    One(Box<Child>),
    Many(Vec<Child>),
}

impl ComponentChildren {
    fn from_children(children: &[Child]) -> Self {
        match children {
            [] => Self::None,
            [only] => Self::One(Box::new(only.clone())),
            many => Self::Many(many.to_vec()),
        }
    }

    pub fn into_vec(self) -> Vec<Child> {
        match self {
            Self::None => Vec::new(),
            Self::One(child) => vec![*child],
            Self::Many(children) => children,
        }
    }
}

/// What a component is called with: its attributes plus `children`.
#[derive(Debug, Clone, Default)]
pub struct Props {
    pub attrs: Attrs,
    pub children: ComponentChildren,
}

impl Props {
    pub fn get(&self, name: &str) -> Option<&PropValue> {
        self.attrs.get(name)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(PropValue::as_str)
    }
}

/// A component: a pure function from props to a node.
pub type Component = Arc<dyn Fn(Props) -> Node + Send + Sync>;

/// Element tag: a tag name or a component.
#[derive(Clone)]
pub enum Tag {
    Name(String),
    Component(Component),
}

impl Tag {
    pub fn component(f: impl Fn(Props) -> Node + Send + Sync + 'static) -> Self {
        Self::Component(Arc::new(f))
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => f.debug_tuple("Name").field(name).finish(),
            Self::Component(_) => f.write_str("Component(..)"),
        }
    }
}

impl From<&str> for Tag {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<String> for Tag {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl From<Component> for Tag {
    fn from(component: Component) -> Self {
        Self::Component(component)
    }
}

#[derive(Debug)]
pub struct Element {
    tag: Tag,
    attrs: Attrs,
    children: Vec<Child>,
}

impl Element {
    pub fn tag(&self) -> &Tag {
        &self.tag
    }

    pub fn attrs(&self) -> &Attrs {
        &self.attrs
    }

    pub fn children(&self) -> &[Child] {
        &self.children
    }

    /// Props handed to a component tag.
    pub fn props(&self) -> Props {
        Props {
            attrs: self.attrs.clone(),
            children: ComponentChildren::from_children(&self.children),
        }
    }
}

#[derive(Debug)]
pub struct Fragment {
    children: Vec<Child>,
}

impl Fragment {
    pub fn children(&self) -> &[Child] {
        &self.children
    }
}

/// A markup node. Cloning shares the underlying tree.
#[derive(Debug, Clone)]
pub enum Node {
    Element(Arc<Element>),
    Fragment(Arc<Fragment>),
}

/// Build an element node.
pub fn h(tag: impl Into<Tag>, attrs: Attrs, children: Vec<Child>) -> Node {
    Node::Element(Arc::new(Element {
        tag: tag.into(),
        attrs,
        children,
    }))
}

/// Build a fragment node.
pub fn fragment(children: Vec<Child>) -> Node {
    Node::Fragment(Arc::new(Fragment { children }))
}

/// Build an [`Attrs`] list: `attrs! { "x" => 10, "fill" => "none" }`.
#[macro_export]
macro_rules! attrs {
    () => { $crate::Attrs::new() };
    ($($name:expr => $value:expr),+ $(,)?) => {{
        let mut attrs = $crate::Attrs::new();
        $(attrs.set($name, $value);)+
        attrs
    }};
}

/// Build a child list from anything convertible into [`Child`].
#[macro_export]
macro_rules! children {
    ($($child:expr),* $(,)?) => {
        vec![$($crate::Child::from($child)),*]
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_formatting() {
        assert_eq!(PropValue::from(1.0).printable().as_deref(), Some("1"));
        assert_eq!(PropValue::from(0.1).printable().as_deref(), Some("0.1"));
        assert_eq!(PropValue::from(-0.0).printable().as_deref(), Some("0"));
        assert_eq!(
            PropValue::from(f64::INFINITY).printable().as_deref(),
            Some("Infinity")
        );
        assert_eq!(PropValue::from(42u32).printable().as_deref(), Some("42"));
    }

    #[test]
    fn test_number_formatting_exponent_thresholds() {
        assert_eq!(format_number(1e21), "1e+21");
        assert_eq!(format_number(-1e21), "-1e+21");
        assert_eq!(format_number(1.5e300), "1.5e+300");
        assert_eq!(format_number(1e-7), "1e-7");
        assert_eq!(format_number(-2.5e-7), "-2.5e-7");
        assert_eq!(format_number(1e20), "100000000000000000000");
        assert_eq!(format_number(0.000001), "0.000001");
        assert_eq!(format_number(123.25), "123.25");
    }

    #[test]
    fn test_non_printable_values() {
        assert_eq!(PropValue::from(false).printable(), None);
        assert_eq!(PropValue::from(None::<&str>).printable(), None);
        assert_eq!(PropValue::from(true).printable().as_deref(), Some("true"));
    }

    #[test]
    fn test_attrs_keep_first_insertion_order() {
        let mut attrs = attrs! { "x" => 1, "y" => 2 };
        attrs.set("x", 3);
        let names: Vec<_> = attrs.iter().map(|(name, _)| name).collect();
        assert_eq!(names, ["x", "y"]);
        assert_eq!(attrs.get("x"), Some(&PropValue::BigInt(3)));
        assert_eq!(attrs.remove("y"), Some(PropValue::BigInt(2)));
        assert!(attrs.get("y").is_none());
    }

    #[test]
    fn test_component_children_shape() {
        assert!(matches!(
            ComponentChildren::from_children(&[]),
            ComponentChildren::None
        ));
        assert!(matches!(
            ComponentChildren::from_children(&children!["a"]),
            ComponentChildren::One(_)
        ));
        let many = ComponentChildren::from_children(&children!["a", 1, false]);
        assert_eq!(many.into_vec().len(), 3);
    }

    #[test]
    fn test_renderable_children() {
        assert!(!Child::NONE.is_renderable());
        assert!(!Child::from("").is_renderable());
        assert!(!Child::from(false).is_renderable());
        assert!(Child::from(0).is_renderable());
        assert!(Child::from(fragment(vec![])).is_renderable());
    }
}
