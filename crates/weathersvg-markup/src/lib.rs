//! Markup nodes and their serializer
//!
//! Builds SVG as an immutable tree of elements and fragments, where a tag is
//! either a name or a component function, and turns it into text in one pass.

pub mod escape;
pub mod node;
pub mod render;

pub use node::{
    fragment, h, Attrs, Child, Component, ComponentChildren, Element, Fragment, Node, PropValue,
    Props, Tag,
};
pub use render::{is_valid_name, render, RenderError, RenderMode, Renderer, COMMENT_TAG};
