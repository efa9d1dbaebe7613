//! Copying possibly-cyclic data into a finite JSON value.
//!
//! `Node` is a JSON-like graph whose containers are shared by reference, so
//! the same list or map can appear in several places, including inside
//! itself. `sanitize` copies a `Node` into a `serde_json::Value`, omitting
//! children that would lead back into a container already being copied.
//!
//! Container identity is reference identity: two distinct maps with equal
//! contents are different containers and are both kept.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use anyhow::Result;
use serde::Serialize;
use serde_json::{Map, Value};

use research_common::SanitizeMode;

pub type Shared<T> = Rc<RefCell<T>>;

#[derive(Debug, Clone)]
pub enum Node {
    Scalar(Value),
    List(Shared<Vec<Node>>),
    Map(Shared<Vec<(String, Node)>>),
}

impl Node {
    pub fn scalar(value: impl Into<Value>) -> Self {
        Node::Scalar(value.into())
    }

    pub fn list() -> Self {
        Node::List(Rc::new(RefCell::new(Vec::new())))
    }

    pub fn map() -> Self {
        Node::Map(Rc::new(RefCell::new(Vec::new())))
    }

    /// Build a tree (no shared containers) from a JSON value.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Array(items) => Node::List(Rc::new(RefCell::new(
                items.into_iter().map(Node::from_value).collect(),
            ))),
            Value::Object(entries) => Node::Map(Rc::new(RefCell::new(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, Node::from_value(v)))
                    .collect(),
            ))),
            scalar => Node::Scalar(scalar),
        }
    }

    /// Identity of the underlying container; scalars have none.
    pub fn id(&self) -> Option<usize> {
        match self {
            Node::Scalar(_) => None,
            Node::List(items) => Some(Rc::as_ptr(items) as *const () as usize),
            Node::Map(entries) => Some(Rc::as_ptr(entries) as *const () as usize),
        }
    }

    /// Append to a list node. Returns false for non-lists.
    pub fn push(&self, child: Node) -> bool {
        match self {
            Node::List(items) => {
                items.borrow_mut().push(child);
                true
            }
            _ => false,
        }
    }

    /// Set `key` on a map node, replacing an existing entry in place.
    /// Returns false for non-maps.
    pub fn insert(&self, key: impl Into<String>, child: Node) -> bool {
        let Node::Map(entries) = self else {
            return false;
        };
        let key = key.into();
        let mut entries = entries.borrow_mut();
        match entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = child,
            None => entries.push((key, child)),
        }
        true
    }

    /// Drop all children. Breaks reference cycles that pass through this node.
    pub fn clear(&self) {
        match self {
            Node::Scalar(_) => {}
            Node::List(items) => items.borrow_mut().clear(),
            Node::Map(entries) => entries.borrow_mut().clear(),
        }
    }
}

/// Copy `node` into a finite JSON value.
pub fn sanitize(node: &Node, mode: SanitizeMode) -> Value {
    match mode {
        SanitizeMode::Strict => copy_strict(node, &mut Vec::new()),
        SanitizeMode::Legacy => copy_legacy(node, &HashSet::new()),
    }
}

/// Serialize `data`, then run it through `sanitize`.
pub fn sanitize_serializable<T: Serialize>(data: &T, mode: SanitizeMode) -> Result<Value> {
    let value = serde_json::to_value(data)?;
    Ok(sanitize(&Node::from_value(value), mode))
}

/// `path` holds the containers from the root down to `node`'s parent.
fn copy_strict(node: &Node, path: &mut Vec<usize>) -> Value {
    match node {
        Node::Scalar(value) => value.clone(),
        Node::List(items) => {
            path.push(Rc::as_ptr(items) as *const () as usize);
            let ancestors: &[usize] = path;
            let children: Vec<Node> = items
                .borrow()
                .iter()
                .filter(|c| !on_path(ancestors, c))
                .cloned()
                .collect();
            let copied = children.iter().map(|c| copy_strict(c, path)).collect();
            path.pop();
            Value::Array(copied)
        }
        Node::Map(entries) => {
            path.push(Rc::as_ptr(entries) as *const () as usize);
            let ancestors: &[usize] = path;
            let (keys, children): (Vec<String>, Vec<Node>) = entries
                .borrow()
                .iter()
                .filter(|(_, c)| !on_path(ancestors, c))
                .cloned()
                .unzip();
            let copied: Map<String, Value> = keys
                .into_iter()
                .zip(children.iter().map(|c| copy_strict(c, path)))
                .collect();
            path.pop();
            Value::Object(copied)
        }
    }
}

fn on_path(path: &[usize], child: &Node) -> bool {
    child.id().is_some_and(|id| path.contains(&id))
}

/// `seen` holds the ancestors of `node`, not `node` itself.
fn copy_legacy(node: &Node, seen: &HashSet<usize>) -> Value {
    let unseen = |child: &Node| !child.id().is_some_and(|id| seen.contains(&id));
    let lineage = |id: usize| {
        let mut lineage = seen.clone();
        lineage.insert(id);
        lineage
    };

    match node {
        Node::Scalar(value) => value.clone(),
        Node::List(items) => {
            let lineage = lineage(Rc::as_ptr(items) as *const () as usize);
            Value::Array(
                items
                    .borrow()
                    .iter()
                    .filter(|c| unseen(*c))
                    .map(|c| copy_legacy(c, &lineage))
                    .collect(),
            )
        }
        Node::Map(entries) => {
            let lineage = lineage(Rc::as_ptr(entries) as *const () as usize);
            Value::Object(
                entries
                    .borrow()
                    .iter()
                    .filter(|(_, c)| unseen(c))
                    .map(|(k, c)| (k.clone(), copy_legacy(c, &lineage)))
                    .collect(),
            )
        }
    }
}
