//! Evented lists whose elements may themselves be evented lists.
//!
//! The tree is strict: every group owns its children and no child holds a
//! reference to its parent. Event bubbling works through forwarding
//! subscribers instead. When a group adopts a child group it connects one
//! forwarder per lifecycle emitter of the child. The forwarder looks up the
//! child's current position (by [`SourceId`]) in the parent's position
//! registry and re-dispatches the event on the parent with that position
//! prepended to every path. The registry is updated on every structural
//! change, and the forwarders are disconnected as soon as the child leaves
//! the group. A listener on the root therefore sees every descendant
//! mutation with a fully qualified path, and a listener on a child sees the
//! same mutation relative to that child.
//!
//! Moves between groups are executed by the lowest common ancestor of the
//! two parent groups, which emits a single `moving`/`moved` pair.

mod node;
mod path;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use evented_emitter::{Callback, ConnectionId, EmitterGroup, Event, SourceId};
use parking_lot::RwLock;

use crate::config::{EventedConfig, NoopMoves};
use crate::element::ElementType;
use crate::error::ContainerError;
use crate::events::{lifecycle_group, ListEvent, SupportsEvents};
use crate::index::{resolve_index, resolve_insert};

pub use node::{NestedValue, Node};
pub use path::{prefixed, Path};

pub type NestedEvent<T> = ListEvent<Path, NestedValue<T>>;

pub struct NestableEventedList<T> {
    id: SourceId,
    nodes: Vec<Node<T>>,
    element_type: ElementType<T>,
    // Element types of the enclosing groups, outermost first.
    inherited: Vec<ElementType<T>>,
    config: EventedConfig,
    events: EmitterGroup<NestedEvent<T>>,
    // Child group id per position (`None` for leaves), read by forwarders.
    positions: Arc<RwLock<Vec<Option<SourceId>>>>,
    forwarders: HashMap<SourceId, Vec<ConnectionId>>,
}

impl<T: fmt::Debug> fmt::Debug for NestableEventedList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NestableEventedList")
            .field("id", &self.id)
            .field("nodes", &self.nodes)
            .finish()
    }
}

impl<T> SupportsEvents for NestableEventedList<T> {
    type Payload = NestedEvent<T>;

    fn events(&self) -> &EmitterGroup<NestedEvent<T>> {
        &self.events
    }
}

impl<T> Default for NestableEventedList<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> NestableEventedList<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self::typed(ElementType::any())
    }

    pub fn typed(element_type: ElementType<T>) -> Self {
        let id = SourceId::next();
        Self {
            id,
            nodes: Vec::new(),
            element_type,
            inherited: Vec::new(),
            config: EventedConfig::default(),
            events: lifecycle_group(id, false),
            positions: Arc::new(RwLock::new(Vec::new())),
            forwarders: HashMap::new(),
        }
    }

    /// An untyped group holding `nodes`. No events are emitted.
    pub fn from_nodes<I>(nodes: I) -> Self
    where
        I: IntoIterator<Item = Node<T>>,
    {
        let mut list = Self::new();
        for node in nodes {
            let at = list.nodes.len();
            list.attach(at, node);
        }
        list
    }

    /// Builds a typed list from `nodes`, rejecting the batch if any leaf
    /// (at any depth) fails `element_type`.
    pub fn with_nodes<I>(element_type: ElementType<T>, nodes: I) -> Result<Self, ContainerError>
    where
        I: IntoIterator<Item = Node<T>>,
    {
        let mut list = Self::typed(element_type);
        let nodes: Vec<Node<T>> = nodes.into_iter().collect();
        for node in &nodes {
            list.check_node(node)?;
        }
        for node in nodes {
            let at = list.nodes.len();
            list.attach(at, node);
        }
        Ok(list)
    }

    /// Applies `config` to this list and every group below it.
    pub fn with_config(mut self, config: EventedConfig) -> Self {
        let inherited = std::mem::take(&mut self.inherited);
        self.adopt(inherited, config);
        self
    }

    pub fn id(&self) -> SourceId {
        self.id
    }

    pub fn source(&self) -> Option<SourceId> {
        Some(self.id)
    }

    pub fn events(&self) -> &EmitterGroup<NestedEvent<T>> {
        &self.events
    }

    pub fn config(&self) -> EventedConfig {
        self.config
    }

    /// This group's own element type. Leaves must also satisfy the types of
    /// every enclosing group.
    pub fn element_type(&self) -> &ElementType<T> {
        &self.element_type
    }

    // ── Reads ──────────────────────────────────────────────────────────────

    /// Number of direct children.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[Node<T>] {
        &self.nodes
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Node<T>> {
        self.nodes.iter()
    }

    /// Resolves `path` (negative segments allowed) to an absolute path.
    pub fn resolve(&self, path: &[isize]) -> Result<Path, ContainerError> {
        let mut group = self;
        let mut out = Vec::with_capacity(path.len());
        for (depth, &seg) in path.iter().enumerate() {
            let idx = resolve_index(seg, group.nodes.len())?;
            out.push(idx);
            if depth + 1 < path.len() {
                group = match &group.nodes[idx] {
                    Node::Group(g) => g,
                    Node::Leaf(_) => return Err(not_a_group(path, depth)),
                };
            }
        }
        Ok(out)
    }

    pub fn get(&self, path: &[isize]) -> Result<&Node<T>, ContainerError> {
        let resolved = self.resolve(path)?;
        let (last, parent) = resolved.split_last().ok_or(ContainerError::EmptyPath)?;
        Ok(&self.descend(parent)?.nodes[*last])
    }

    /// The group at `path`; the empty path is this list itself.
    pub fn group(&self, path: &[isize]) -> Result<&Self, ContainerError> {
        let resolved = self.resolve(path)?;
        self.descend(&resolved)
    }

    /// Mutable access to a nested group. Its mutations still bubble up.
    pub fn group_mut(&mut self, path: &[isize]) -> Result<&mut Self, ContainerError> {
        let resolved = self.resolve(path)?;
        self.descend_mut(&resolved)
    }

    pub fn snapshot(&self) -> Vec<NestedValue<T>> {
        self.nodes.iter().map(Node::snapshot).collect()
    }

    /// Every leaf path, depth first.
    pub fn leaf_paths(&self) -> Vec<Path> {
        let mut out = Vec::new();
        self.collect_leaf_paths(&mut Vec::new(), &mut out);
        out
    }

    fn collect_leaf_paths(&self, prefix: &mut Path, out: &mut Vec<Path>) {
        for (i, node) in self.nodes.iter().enumerate() {
            prefix.push(i);
            match node {
                Node::Leaf(_) => out.push(prefix.clone()),
                Node::Group(g) => g.collect_leaf_paths(prefix, out),
            }
            prefix.pop();
        }
    }

    // ── Mutation by path ───────────────────────────────────────────────────

    /// Inserts `node` so that it ends up at `path`. Returns the resolved path.
    pub fn insert(&mut self, path: &[isize], node: Node<T>) -> Result<Path, ContainerError> {
        let (parent, last) = path::split_last(path).ok_or(ContainerError::EmptyPath)?;
        let mut at = self.resolve(parent)?;
        let idx = self.descend_mut(&at)?.insert_local(last, node)?;
        at.push(idx);
        Ok(at)
    }

    /// Appends `node` to this list.
    pub fn push(&mut self, node: Node<T>) -> Result<(), ContainerError> {
        self.insert_local(self.nodes.len() as isize, node).map(|_| ())
    }

    /// Appends `nodes`, type checking all of them first.
    pub fn extend<I>(&mut self, nodes: I) -> Result<(), ContainerError>
    where
        I: IntoIterator<Item = Node<T>>,
    {
        let nodes: Vec<Node<T>> = nodes.into_iter().collect();
        for node in &nodes {
            self.check_node(node)?;
        }
        for node in nodes {
            self.push(node)?;
        }
        Ok(())
    }

    pub fn remove(&mut self, path: &[isize]) -> Result<Node<T>, ContainerError> {
        let resolved = self.resolve(path)?;
        let (last, parent) = resolved.split_last().ok_or(ContainerError::EmptyPath)?;
        self.descend_mut(parent)?.remove_local(*last)
    }

    /// Replaces the node at `path`, returning the previous one.
    pub fn set(&mut self, path: &[isize], node: Node<T>) -> Result<Node<T>, ContainerError> {
        let resolved = self.resolve(path)?;
        let (last, parent) = resolved.split_last().ok_or(ContainerError::EmptyPath)?;
        self.descend_mut(parent)?.set_local(*last, node)
    }

    /// Moves the node at `src` so that afterwards it is found at `dst`.
    ///
    /// `dst` is read in the tree as it stands once the node has been taken
    /// out. The move is announced once, as a single `moving`/`moved` pair on
    /// the lowest group containing both parents, never as a remove/insert
    /// pair. Returns `false` for a suppressed no-op move.
    pub fn move_item(&mut self, src: &[isize], dst: &[isize]) -> Result<bool, ContainerError> {
        let src = self.resolve(src)?;
        if src.is_empty() || dst.is_empty() {
            return Err(ContainerError::EmptyPath);
        }
        // Levels above the source's parent are unaffected by taking the
        // source out, so the shared prefix is stable in both coordinates.
        let mut depth = 0;
        while depth + 1 < src.len() && depth + 1 < dst.len() {
            let len = self.descend(&src[..depth])?.nodes.len();
            if resolve_index(dst[depth], len)? != src[depth] {
                break;
            }
            depth += 1;
        }
        let (ancestor, rest) = src.split_at(depth);
        self.descend_mut(ancestor)?.move_within(rest, &dst[depth..])
    }

    // ── Local primitives ───────────────────────────────────────────────────

    fn insert_local(&mut self, index: isize, node: Node<T>) -> Result<usize, ContainerError> {
        let idx = resolve_insert(index, self.nodes.len(), self.config.clamp_insert)?;
        self.check_node(&node)?;
        self.emit(ListEvent::Inserting { index: vec![idx] })?;
        let value = node.snapshot();
        self.attach(idx, node);
        self.emit(ListEvent::Inserted {
            index: vec![idx],
            value,
        })?;
        Ok(idx)
    }

    fn remove_local(&mut self, idx: usize) -> Result<Node<T>, ContainerError> {
        self.emit(ListEvent::Removing { index: vec![idx] })?;
        let node = self.detach(idx);
        self.emit(ListEvent::Removed {
            index: vec![idx],
            value: node.snapshot(),
        })?;
        Ok(node)
    }

    fn set_local(&mut self, idx: usize, node: Node<T>) -> Result<Node<T>, ContainerError> {
        self.check_node(&node)?;
        let new_value = node.snapshot();
        let old = self.detach(idx);
        self.attach(idx, node);
        self.emit(ListEvent::Changed {
            index: vec![idx],
            old_value: old.snapshot(),
            new_value,
        })?;
        Ok(old)
    }

    /// Moves between two paths relative to this group. The node is taken out
    /// silently first so the destination can be resolved in the resulting
    /// tree; any failure before `moving` is dispatched puts it back.
    fn move_within(&mut self, src: &[usize], dst: &[isize]) -> Result<bool, ContainerError> {
        let (&src_idx, src_parent) = src.split_last().ok_or(ContainerError::EmptyPath)?;
        let (dst_parent, dst_last) = path::split_last(dst).ok_or(ContainerError::EmptyPath)?;

        let node = self.descend_mut(src_parent)?.detach(src_idx);
        let target = match self.resolve_destination(dst_parent, dst_last) {
            Ok(target) => target,
            Err(e) => {
                self.restore(src_parent, src_idx, node);
                return Err(e);
            }
        };
        let (&dst_idx, target_parent) = target.split_last().ok_or(ContainerError::EmptyPath)?;

        if target_parent == src_parent && dst_idx == src_idx {
            self.restore(src_parent, src_idx, node);
            if self.config.noop_moves == NoopMoves::Suppress {
                tracing::debug!(source = %self.id, path = ?src, "no-op move suppressed");
                return Ok(false);
            }
            let value = self.get_resolved(src).map(Node::snapshot)?;
            self.emit(ListEvent::Moving {
                index: src.to_vec(),
                new_index: target.clone(),
            })?;
            self.emit(ListEvent::Moved {
                index: src.to_vec(),
                new_index: target,
                value,
            })?;
            return Ok(true);
        }

        tracing::trace!(source = %self.id, from = ?src, to = ?target, "moving node");
        let value = node.snapshot();
        if let Err(e) = self.emit(ListEvent::Moving {
            index: src.to_vec(),
            new_index: target.clone(),
        }) {
            self.restore(src_parent, src_idx, node);
            return Err(e);
        }
        self.restore(target_parent, dst_idx, node);
        self.emit(ListEvent::Moved {
            index: src.to_vec(),
            new_index: target,
            value,
        })?;
        Ok(true)
    }

    /// Resolves a move destination. The last segment is a final position, so
    /// it may equal the current length of the target group.
    fn resolve_destination(&self, parent: &[isize], last: isize) -> Result<Path, ContainerError> {
        let mut out = self.resolve(parent)?;
        let group = self.descend(&out)?;
        out.push(resolve_index(last, group.nodes.len() + 1)?);
        Ok(out)
    }

    fn restore(&mut self, parent: &[usize], idx: usize, node: Node<T>) {
        if let Ok(group) = self.descend_mut(parent) {
            group.attach(idx, node);
        }
    }

    fn get_resolved(&self, path: &[usize]) -> Result<&Node<T>, ContainerError> {
        let (last, parent) = path.split_last().ok_or(ContainerError::EmptyPath)?;
        self.descend(parent)?
            .nodes
            .get(*last)
            .ok_or(ContainerError::IndexOutOfRange {
                index: *last as isize,
                len: self.nodes.len(),
            })
    }

    // ── Structure bookkeeping ──────────────────────────────────────────────

    fn descend(&self, path: &[usize]) -> Result<&Self, ContainerError> {
        let mut group = self;
        for (depth, &idx) in path.iter().enumerate() {
            group = match group.nodes.get(idx) {
                Some(Node::Group(g)) => g,
                Some(Node::Leaf(_)) => return Err(not_a_group_resolved(path, depth)),
                None => {
                    return Err(ContainerError::IndexOutOfRange {
                        index: idx as isize,
                        len: group.nodes.len(),
                    })
                }
            };
        }
        Ok(group)
    }

    fn descend_mut(&mut self, path: &[usize]) -> Result<&mut Self, ContainerError> {
        let mut group = self;
        for (depth, &idx) in path.iter().enumerate() {
            let len = group.nodes.len();
            group = match group.nodes.get_mut(idx) {
                Some(Node::Group(g)) => g,
                Some(Node::Leaf(_)) => return Err(not_a_group_resolved(path, depth)),
                None => {
                    return Err(ContainerError::IndexOutOfRange {
                        index: idx as isize,
                        len,
                    })
                }
            };
        }
        Ok(group)
    }

    fn check_node(&self, node: &Node<T>) -> Result<(), ContainerError> {
        match node {
            Node::Leaf(v) => self
                .inherited
                .iter()
                .chain(std::iter::once(&self.element_type))
                .try_for_each(|t| t.check(v)),
            Node::Group(g) => g.nodes.iter().try_for_each(|child| self.check_node(child)),
        }
    }

    /// The element types a direct child group inherits.
    fn constraints(&self) -> Vec<ElementType<T>> {
        let mut out = self.inherited.clone();
        out.push(self.element_type.clone());
        out
    }

    fn adopt(&mut self, inherited: Vec<ElementType<T>>, config: EventedConfig) {
        self.inherited = inherited;
        self.config = config;
        let constraints = self.constraints();
        for node in &mut self.nodes {
            if let Node::Group(g) = node {
                g.adopt(constraints.clone(), config);
            }
        }
    }

    /// Places `node` at `idx` without emitting anything.
    fn attach(&mut self, idx: usize, mut node: Node<T>) {
        let child_id = match &mut node {
            Node::Group(g) => {
                g.adopt(self.constraints(), self.config);
                let connections = self.forward_from(g);
                self.forwarders.insert(g.id, connections);
                Some(g.id)
            }
            Node::Leaf(_) => None,
        };
        self.nodes.insert(idx, node);
        self.positions.write().insert(idx, child_id);
    }

    /// Takes the node at `idx` out without emitting anything.
    fn detach(&mut self, idx: usize) -> Node<T> {
        let mut node = self.nodes.remove(idx);
        self.positions.write().remove(idx);
        if let Node::Group(g) = &mut node {
            if let Some(connections) = self.forwarders.remove(&g.id) {
                g.events.disconnect_ids(&connections);
            }
            let config = g.config;
            g.adopt(Vec::new(), config);
        }
        node
    }

    fn forward_from(&self, child: &Self) -> Vec<ConnectionId> {
        let child_id = child.id;
        child
            .events
            .iter()
            .filter_map(|(name, child_emitter)| {
                let parent_emitter = self.events.get(name)?.clone();
                let positions = Arc::clone(&self.positions);
                let source = Some(self.id);
                let forward = Callback::fallible(move |ev: &Event<NestedEvent<T>>| {
                    let Some(pos) = positions.read().iter().position(|p| *p == Some(child_id)) else {
                        tracing::debug!(child = %child_id, "forwarding from a detached group skipped");
                        return Ok(());
                    };
                    let payload = ev.payload().clone().map_index(|p| prefixed(pos, p));
                    parent_emitter.emit_event(&ev.forwarded(source, payload))?;
                    Ok(())
                });
                Some(child_emitter.connect_callback(&forward))
            })
            .collect()
    }

    fn emit(&self, event: NestedEvent<T>) -> Result<(), ContainerError> {
        self.events.emit(event.name(), event)?;
        Ok(())
    }
}

fn not_a_group(path: &[isize], depth: usize) -> ContainerError {
    ContainerError::NotAGroup {
        path: path.to_vec(),
        depth,
    }
}

fn not_a_group_resolved(path: &[usize], depth: usize) -> ContainerError {
    ContainerError::NotAGroup {
        path: path.iter().map(|&i| i as isize).collect(),
        depth,
    }
}
