use std::fmt;

use serde::Serialize;

use super::NestableEventedList;

/// An element of a nested list: a leaf value or a child group.
pub enum Node<T> {
    Leaf(T),
    Group(NestableEventedList<T>),
}

impl<T: fmt::Debug> fmt::Debug for Node<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Leaf(v) => f.debug_tuple("Leaf").field(v).finish(),
            Node::Group(g) => f.debug_tuple("Group").field(g).finish(),
        }
    }
}

impl<T> Node<T> {
    pub fn leaf(value: T) -> Self {
        Node::Leaf(value)
    }

    pub fn is_group(&self) -> bool {
        matches!(self, Node::Group(_))
    }

    pub fn as_leaf(&self) -> Option<&T> {
        match self {
            Node::Leaf(v) => Some(v),
            Node::Group(_) => None,
        }
    }

    pub fn as_group(&self) -> Option<&NestableEventedList<T>> {
        match self {
            Node::Group(g) => Some(g),
            Node::Leaf(_) => None,
        }
    }

    pub fn as_group_mut(&mut self) -> Option<&mut NestableEventedList<T>> {
        match self {
            Node::Group(g) => Some(g),
            Node::Leaf(_) => None,
        }
    }

    pub fn into_leaf(self) -> Option<T> {
        match self {
            Node::Leaf(v) => Some(v),
            Node::Group(_) => None,
        }
    }
}

impl<T: Clone + Send + Sync + 'static> Node<T> {
    /// Plain copy of this node and everything below it.
    pub fn snapshot(&self) -> NestedValue<T> {
        match self {
            Node::Leaf(v) => NestedValue::Leaf(v.clone()),
            Node::Group(g) => NestedValue::Group(g.snapshot()),
        }
    }
}

impl<T> From<NestableEventedList<T>> for Node<T> {
    fn from(group: NestableEventedList<T>) -> Self {
        Node::Group(group)
    }
}

/// Detached value of a node, carried by nested lifecycle events.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum NestedValue<T> {
    Leaf(T),
    Group(Vec<NestedValue<T>>),
}

impl<T> NestedValue<T> {
    pub fn as_leaf(&self) -> Option<&T> {
        match self {
            NestedValue::Leaf(v) => Some(v),
            NestedValue::Group(_) => None,
        }
    }

    pub fn children(&self) -> Option<&[NestedValue<T>]> {
        match self {
            NestedValue::Group(items) => Some(items),
            NestedValue::Leaf(_) => None,
        }
    }
}
