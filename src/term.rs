//! Elixir Term Conversion Utilities
//!
//! Converts the AST and converted objects to Elixir terms. Both walks keep
//! their open containers on a heap stack.

use std::iter::Rev;
use std::slice;

use rustler::{Encoder, Env, NewBinary, NifResult, Term};
use serde_json::Value;

use crate::dom::{Element, Node, Root};
use crate::error::ParseError;

// Pre-defined atoms for efficiency - created once at compile time
rustler::atoms! {
    ok,
    error,
    element,
    root,
}

/// `{:root, children, {start, end}}`
pub fn root_to_term<'a>(env: Env<'a>, tree: &Root) -> NifResult<Term<'a>> {
    let children = nodes_to_list(env, &tree.children);
    Ok((root(), children, (tree.loc.start, tree.loc.end)).encode(env))
}

/// Child list under construction, filled back to front
struct ListFrame<'a, 'n> {
    element: Option<&'n Element>,
    pending: Rev<slice::Iter<'n, Node>>,
    list: Term<'a>,
}

impl<'a, 'n> ListFrame<'a, 'n> {
    fn new(env: Env<'a>, element: Option<&'n Element>, nodes: &'n [Node]) -> Self {
        ListFrame {
            element,
            pending: nodes.iter().rev(),
            list: Term::list_new_empty(env),
        }
    }

    /// The element tuple, or the bare list for the top frame
    fn finish(self, env: Env<'a>) -> Term<'a> {
        match self.element {
            Some(el) => element_to_term(env, el, self.list),
            None => self.list,
        }
    }
}

/// `{:element, name, [{name, value}], children, {start, end}}`
fn element_to_term<'a>(env: Env<'a>, el: &Element, children: Term<'a>) -> Term<'a> {
    let mut attrs = Term::list_new_empty(env);
    for attr in el.attributes.iter().rev() {
        let attr_tuple = (str_to_binary(env, &attr.name), str_to_binary(env, &attr.value));
        attrs = attrs.list_prepend(attr_tuple.encode(env));
    }

    (
        element(),
        str_to_binary(env, &el.tag_name),
        attrs,
        children,
        (el.loc.start, el.loc.end),
    )
        .encode(env)
}

fn nodes_to_list<'a>(env: Env<'a>, nodes: &[Node]) -> Term<'a> {
    let mut current = ListFrame::new(env, None, nodes);
    let mut parents = Vec::new();
    loop {
        match current.pending.next() {
            Some(Node::Element(el)) => {
                let frame = ListFrame::new(env, Some(el), &el.children);
                parents.push(std::mem::replace(&mut current, frame));
            }
            Some(Node::Content(text)) => current.list = current.list.list_prepend(str_to_binary(env, text)),
            None => {
                let term = current.finish(env);
                match parents.pop() {
                    Some(parent) => {
                        current = parent;
                        current.list = current.list.list_prepend(term);
                    }
                    None => return term,
                }
            }
        }
    }
}

/// Array or object whose members are being encoded
enum Container<'a, 'v> {
    Array {
        items: Rev<slice::Iter<'v, Value>>,
        list: Term<'a>,
    },
    Object {
        fields: serde_json::map::Iter<'v>,
        key: Option<Term<'a>>,
        pairs: Vec<(Term<'a>, Term<'a>)>,
    },
}

/// Encoded scalar, or a container still to be filled
enum Encoded<'a, 'v> {
    Leaf(Term<'a>),
    Open(Container<'a, 'v>),
}

impl<'a, 'v> Container<'a, 'v> {
    fn open(env: Env<'a>, value: &'v Value) -> Encoded<'a, 'v> {
        let leaf = match value {
            Value::Array(items) => {
                return Encoded::Open(Container::Array {
                    items: items.iter().rev(),
                    list: Term::list_new_empty(env),
                })
            }
            Value::Object(fields) => {
                return Encoded::Open(Container::Object {
                    fields: fields.iter(),
                    key: None,
                    pairs: Vec::with_capacity(fields.len()),
                })
            }
            Value::Null => rustler::types::atom::nil().encode(env),
            Value::Bool(b) => b.encode(env),
            Value::Number(n) => match (n.as_i64(), n.as_f64()) {
                (Some(i), _) => i.encode(env),
                (None, Some(f)) => f.encode(env),
                (None, None) => str_to_binary(env, &n.to_string()),
            },
            Value::String(s) => str_to_binary(env, s),
        };
        Encoded::Leaf(leaf)
    }

    fn next_member(&mut self, env: Env<'a>) -> Option<&'v Value> {
        match self {
            Container::Array { items, .. } => items.next(),
            Container::Object { fields, key, .. } => fields.next().map(|(name, field)| {
                *key = Some(str_to_binary(env, name));
                field
            }),
        }
    }

    fn accept(&mut self, term: Term<'a>) {
        match self {
            Container::Array { list, .. } => *list = list.list_prepend(term),
            Container::Object { key, pairs, .. } => {
                if let Some(key) = key.take() {
                    pairs.push((key, term));
                }
            }
        }
    }

    fn finish(self, env: Env<'a>) -> NifResult<Term<'a>> {
        match self {
            Container::Array { list, .. } => Ok(list),
            Container::Object { pairs, .. } => Term::map_from_pairs(env, &pairs),
        }
    }
}

/// Objects become maps with binary keys, arrays lists, null `nil`
pub fn value_to_term<'a>(env: Env<'a>, value: &Value) -> NifResult<Term<'a>> {
    let mut current = match Container::open(env, value) {
        Encoded::Leaf(term) => return Ok(term),
        Encoded::Open(container) => container,
    };
    let mut parents = Vec::new();
    loop {
        match current.next_member(env) {
            Some(member) => match Container::open(env, member) {
                Encoded::Leaf(term) => current.accept(term),
                Encoded::Open(container) => parents.push(std::mem::replace(&mut current, container)),
            },
            None => {
                let term = current.finish(env)?;
                match parents.pop() {
                    Some(parent) => {
                        current = parent;
                        current.accept(term);
                    }
                    None => return Ok(term),
                }
            }
        }
    }
}

/// `{:ok, term}` or `{:error, message}`
pub fn result_to_term<'a, T>(
    env: Env<'a>,
    result: Result<T, ParseError>,
    encode: impl FnOnce(Env<'a>, &T) -> NifResult<Term<'a>>,
) -> NifResult<Term<'a>> {
    match result {
        Ok(value) => Ok((ok(), encode(env, &value)?).encode(env)),
        Err(e) => Ok((error(), str_to_binary(env, &e.to_string())).encode(env)),
    }
}

/// Convert a string to a binary term (more efficient than .encode())
#[inline]
fn str_to_binary<'a>(env: Env<'a>, s: &str) -> Term<'a> {
    let bytes = s.as_bytes();
    let mut binary = NewBinary::new(env, bytes.len());
    binary.as_mut_slice().copy_from_slice(bytes);
    binary.into()
}
