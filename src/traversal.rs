//! Iterative traversal (C5): DFS, BFS, ancestor walks and the small family
//! of `find`/`find_all`/`find_ancestor` helpers built on top of them.
//!
//! Grounded in `ast-grep-core`'s `traversal.rs` — `Pre`/`Post`/`Level`
//! cursors that walk with an explicit stack/queue instead of recursion, for
//! the same reason that module states: unbounded recursion depth on
//! generated trees is a real failure mode, not a theoretical one.

use crate::arena::{Arena, NodeId};
use crate::expr::Expression;
use crate::slot::SlotValue;
use smallvec::SmallVec;
use std::collections::VecDeque;

/// Direct children of a node, in storage order (the order slots were
/// supplied to [`crate::expr::build`]), flattening `Node` and `List` slots
/// alike.
pub fn children(node: &Expression) -> SmallVec<[NodeId; 8]> {
  let mut out = SmallVec::new();
  for (_, value) in node.populated_args() {
    match value {
      SlotValue::Node(id) => out.push(*id),
      SlotValue::List(ids) => out.extend(ids.iter().copied()),
      _ => {}
    }
  }
  out
}

/// Pre-order depth-first traversal, explicit-stack (spec §4.5). Accepts a
/// `prune` predicate: when it returns true for a node, that node is still
/// yielded but its children are never pushed, so the walk does not descend
/// into it.
pub struct Dfs<'a> {
  arena: &'a Arena,
  stack: Vec<NodeId>,
  prune: Box<dyn FnMut(&Expression) -> bool + 'a>,
}

impl<'a> Iterator for Dfs<'a> {
  type Item = NodeId;
  fn next(&mut self) -> Option<NodeId> {
    let id = self.stack.pop()?;
    let node = self.arena.get(id);
    if !(self.prune)(node) {
      let kids = children(node);
      // push in reverse so the leftmost child is popped first
      for child in kids.into_iter().rev() {
        self.stack.push(child);
      }
    }
    Some(id)
  }
}

pub fn dfs(arena: &Arena, root: NodeId) -> Dfs<'_> {
  dfs_pruned(arena, root, |_| false)
}

/// Depth-first traversal that stops descending into any node for which
/// `prune` returns true (the node itself is still yielded).
pub fn dfs_pruned<'a, P>(arena: &'a Arena, root: NodeId, prune: P) -> Dfs<'a>
where
  P: FnMut(&Expression) -> bool + 'a,
{
  Dfs { arena, stack: vec![root], prune: Box::new(prune) }
}

/// Breadth-first traversal, explicit queue. Accepts the same `prune`
/// predicate as [`Dfs`].
pub struct Bfs<'a> {
  arena: &'a Arena,
  queue: VecDeque<NodeId>,
  prune: Box<dyn FnMut(&Expression) -> bool + 'a>,
}

impl<'a> Iterator for Bfs<'a> {
  type Item = NodeId;
  fn next(&mut self) -> Option<NodeId> {
    let id = self.queue.pop_front()?;
    let node = self.arena.get(id);
    if !(self.prune)(node) {
      self.queue.extend(children(node));
    }
    Some(id)
  }
}

pub fn bfs(arena: &Arena, root: NodeId) -> Bfs<'_> {
  bfs_pruned(arena, root, |_| false)
}

/// Breadth-first traversal that stops descending into any node for which
/// `prune` returns true (the node itself is still yielded).
pub fn bfs_pruned<'a, P>(arena: &'a Arena, root: NodeId, prune: P) -> Bfs<'a>
where
  P: FnMut(&Expression) -> bool + 'a,
{
  Bfs { arena, queue: VecDeque::from([root]), prune: Box::new(prune) }
}

/// Default traversal order (spec §4.5: "`walk` picks BFS by default; `dfs`
/// and `bfs` are exposed explicitly").
pub fn walk(arena: &Arena, root: NodeId) -> Bfs<'_> {
  bfs(arena, root)
}

/// Walk from `id` up through `parent` links, `id` itself first.
pub struct Ancestors<'a> {
  arena: &'a Arena,
  cur: Option<NodeId>,
}

impl<'a> Iterator for Ancestors<'a> {
  type Item = NodeId;
  fn next(&mut self) -> Option<NodeId> {
    let id = self.cur?;
    self.cur = self.arena.get(id).parent;
    Some(id)
  }
}

pub fn ancestors(arena: &Arena, id: NodeId) -> Ancestors<'_> {
  Ancestors { arena, cur: Some(id) }
}

/// First node in `root`'s subtree matching `pred`, in DFS order unless
/// `bfs` is set.
pub fn find<F>(arena: &Arena, root: NodeId, bfs: bool, mut pred: F) -> Option<NodeId>
where
  F: FnMut(&Expression) -> bool,
{
  if bfs {
    self::bfs(arena, root).find(|id| pred(arena.get(*id)))
  } else {
    dfs(arena, root).find(|id| pred(arena.get(*id)))
  }
}

/// Every node in `root`'s subtree matching `pred`, in DFS order unless
/// `bfs` is set.
pub fn find_all<F>(arena: &Arena, root: NodeId, bfs: bool, mut pred: F) -> Vec<NodeId>
where
  F: FnMut(&Expression) -> bool,
{
  if bfs {
    self::bfs(arena, root).filter(|id| pred(arena.get(*id))).collect()
  } else {
    dfs(arena, root).filter(|id| pred(arena.get(*id))).collect()
  }
}

/// First strict ancestor (parent, grandparent, …) matching `pred`.
pub fn find_ancestor<F>(arena: &Arena, id: NodeId, mut pred: F) -> Option<NodeId>
where
  F: FnMut(&Expression) -> bool,
{
  let parent = arena.get(id).parent?;
  ancestors(arena, parent).find(|a| pred(arena.get(*a)))
}

/// Nearest enclosing `Select`, if any — the common "what query am I part
/// of" query used when resolving unqualified column references.
pub fn parent_select(arena: &Arena, id: NodeId) -> Option<NodeId> {
  find_ancestor(arena, id, |n| n.kind() == crate::kind::Kind::Select)
}

/// Number of strict ancestors.
pub fn depth(arena: &Arena, id: NodeId) -> usize {
  ancestors(arena, id).count().saturating_sub(1)
}

/// Walk to the top of the tree.
pub fn root(arena: &Arena, id: NodeId) -> NodeId {
  ancestors(arena, id).last().unwrap_or(id)
}

/// Whether two nodes share an immediate parent.
pub fn same_parent(arena: &Arena, a: NodeId, b: NodeId) -> bool {
  match (arena.get(a).parent, arena.get(b).parent) {
    (Some(pa), Some(pb)) => pa == pb,
    (None, None) => a == b,
    _ => false,
  }
}
