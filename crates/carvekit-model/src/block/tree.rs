//! The block tree arena.
//!
//! Nodes live in an arena and address each other through stable indices;
//! the sibling list is intrusive (prev/next indices on the node), each
//! container owns a `listhead` chain, and one special `extruder` slot holds
//! a sketch's depth profile. Structural-contract violations (repositioning a
//! locked block, list operations on detached or empty targets) are silently
//! refused no-ops, logged at debug level.

use carvekit_core::{BlockError, Eps, Shared, Tool};
use smallvec::SmallVec;
use tracing::debug;
use uuid::Uuid;

use super::{BlockFlags, BlockPayload};
use crate::geom::{Aabb, Point2, Primitive};
use crate::offset::{Offset, OffsetCell};

/// Stable handle to a block in an [`Arena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockId(u32);

impl BlockId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// A single node: tree links, flags, the shared offset reference, and the
/// type-specific payload.
#[derive(Debug, Clone)]
pub struct BlockNode {
    /// Stable identity, preserved by snapshots for reverse lookup.
    pub uid: Uuid,
    pub flags: BlockFlags,
    /// Offset record this block's geometry is positioned by. References the
    /// owning construct's record or the project-wide zero record.
    pub offset: OffsetCell,
    pub payload: BlockPayload,
    parent: Option<BlockId>,
    prev: Option<BlockId>,
    next: Option<BlockId>,
    listhead: Option<BlockId>,
    extruder: Option<BlockId>,
}

impl BlockNode {
    pub fn parent(&self) -> Option<BlockId> {
        self.parent
    }
    pub fn prev(&self) -> Option<BlockId> {
        self.prev
    }
    pub fn next(&self) -> Option<BlockId> {
        self.next
    }
    pub fn listhead(&self) -> Option<BlockId> {
        self.listhead
    }
    pub fn extruder(&self) -> Option<BlockId> {
        self.extruder
    }
}

/// Arena of block nodes plus the top-level list head and the project-wide
/// zero offset record.
pub struct Arena {
    slots: Vec<Option<BlockNode>>,
    free: Vec<u32>,
    head: Option<BlockId>,
    zero_offset: OffsetCell,
}

impl Default for Arena {
    fn default() -> Self {
        Self::new()
    }
}

impl Arena {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            head: None,
            zero_offset: Offset::zero_cell(),
        }
    }

    /// The project-wide shared zero offset record.
    pub fn zero_offset(&self) -> &OffsetCell {
        &self.zero_offset
    }

    /// Head of the top-level block list.
    pub fn head(&self) -> Option<BlockId> {
        self.head
    }

    /// Creates a detached node. Container variants that compute their own
    /// offset get a fresh record; everything else references the project
    /// zero record until attached.
    pub fn create(&mut self, payload: BlockPayload) -> BlockId {
        let offset = if payload.owns_offset() {
            Offset::zero_cell()
        } else {
            Shared::clone(&self.zero_offset)
        };
        let node = BlockNode {
            uid: Uuid::new_v4(),
            flags: BlockFlags::default(),
            offset,
            payload,
            parent: None,
            prev: None,
            next: None,
            listhead: None,
            extruder: None,
        };
        if let Some(idx) = self.free.pop() {
            self.slots[idx as usize] = Some(node);
            BlockId(idx)
        } else {
            self.slots.push(Some(node));
            BlockId((self.slots.len() - 1) as u32)
        }
    }

    pub fn get(&self, id: BlockId) -> Option<&BlockNode> {
        self.slots.get(id.index()).and_then(|s| s.as_ref())
    }

    pub fn get_mut(&mut self, id: BlockId) -> Option<&mut BlockNode> {
        self.slots.get_mut(id.index()).and_then(|s| s.as_mut())
    }

    fn node(&self, id: BlockId) -> &BlockNode {
        self.get(id).expect("live block id")
    }

    fn node_mut(&mut self, id: BlockId) -> &mut BlockNode {
        self.get_mut(id).expect("live block id")
    }

    /// Child ids of a container (or the top-level list for `None`), in
    /// sibling order.
    pub fn children(&self, parent: Option<BlockId>) -> Vec<BlockId> {
        let mut out = Vec::new();
        let mut cursor = match parent {
            Some(p) => self.get(p).and_then(|n| n.listhead),
            None => self.head,
        };
        while let Some(id) = cursor {
            out.push(id);
            cursor = self.node(id).next;
        }
        out
    }

    fn is_detached(&self, id: BlockId) -> bool {
        let n = self.node(id);
        n.parent.is_none() && n.prev.is_none() && n.next.is_none() && self.head != Some(id)
    }

    fn is_ancestor(&self, maybe_ancestor: BlockId, of: BlockId) -> bool {
        let mut cursor = Some(of);
        while let Some(id) = cursor {
            if id == maybe_ancestor {
                return true;
            }
            cursor = self.node(id).parent;
        }
        false
    }

    fn list_head_of(&self, parent: Option<BlockId>) -> Option<BlockId> {
        match parent {
            Some(p) => self.node(p).listhead,
            None => self.head,
        }
    }

    fn set_list_head(&mut self, parent: Option<BlockId>, head: Option<BlockId>) {
        match parent {
            Some(p) => self.node_mut(p).listhead = head,
            None => self.head = head,
        }
    }

    /// Inherit the parent's offset record on attachment; top-level blocks
    /// reference the project zero record.
    fn inherit_offset(&mut self, id: BlockId, parent: Option<BlockId>) {
        let cell = match parent {
            Some(p) => Shared::clone(&self.node(p).offset),
            None => Shared::clone(&self.zero_offset),
        };
        // Owning constructs keep the record they computed for themselves.
        if !self.node(id).payload.owns_offset() {
            self.node_mut(id).offset = cell;
        }
    }

    /// Inserts a detached node as the first child of `parent`.
    pub fn insert_head(&mut self, parent: Option<BlockId>, id: BlockId) {
        if !self.is_detached(id) {
            debug!("insert_head refused: block already attached");
            return;
        }
        if let Some(p) = parent {
            if self.is_ancestor(id, p) {
                debug!("insert_head refused: would create a cycle");
                return;
            }
        }
        let old_head = self.list_head_of(parent);
        {
            let n = self.node_mut(id);
            n.parent = parent;
            n.prev = None;
            n.next = old_head;
        }
        if let Some(h) = old_head {
            self.node_mut(h).prev = Some(id);
        }
        self.set_list_head(parent, Some(id));
        self.inherit_offset(id, parent);
    }

    /// Appends a detached node as the last child of `parent`.
    pub fn append_tail(&mut self, parent: Option<BlockId>, id: BlockId) {
        if !self.is_detached(id) {
            debug!("append_tail refused: block already attached");
            return;
        }
        if let Some(p) = parent {
            if self.is_ancestor(id, p) {
                debug!("append_tail refused: would create a cycle");
                return;
            }
        }
        let mut tail = self.list_head_of(parent);
        while let Some(t) = tail {
            match self.node(t).next {
                Some(n) => tail = Some(n),
                None => break,
            }
        }
        match tail {
            None => self.insert_head(parent, id),
            Some(t) => self.link_after(t, id),
        }
    }

    /// Inserts a detached node directly after `after`.
    pub fn insert_after(&mut self, after: BlockId, id: BlockId) {
        if !self.is_detached(id) {
            debug!("insert_after refused: block already attached");
            return;
        }
        if self.is_ancestor(id, after) {
            debug!("insert_after refused: would create a cycle");
            return;
        }
        self.link_after(after, id);
    }

    fn link_after(&mut self, after: BlockId, id: BlockId) {
        let (parent, old_next) = {
            let a = self.node(after);
            (a.parent, a.next)
        };
        {
            let n = self.node_mut(id);
            n.parent = parent;
            n.prev = Some(after);
            n.next = old_next;
        }
        self.node_mut(after).next = Some(id);
        if let Some(nx) = old_next {
            self.node_mut(nx).prev = Some(id);
        }
        self.inherit_offset(id, parent);
    }

    /// Repositions `id` directly before `target` in the same sibling list.
    /// Refused when the block is locked or the two are not siblings.
    pub fn place_before(&mut self, id: BlockId, target: BlockId) {
        if id == target {
            return;
        }
        if !self.reposition_allowed(id, target) {
            return;
        }
        let parent = self.node(id).parent;
        self.detach(id);
        let target_prev = self.node(target).prev;
        match target_prev {
            Some(p) => self.link_after(p, id),
            None => self.insert_head(parent, id),
        }
    }

    /// Repositions `id` directly behind `target` in the same sibling list.
    /// Refused when the block is locked or the two are not siblings.
    pub fn place_behind(&mut self, id: BlockId, target: BlockId) {
        if id == target {
            return;
        }
        if !self.reposition_allowed(id, target) {
            return;
        }
        self.detach(id);
        self.link_after(target, id);
    }

    fn reposition_allowed(&self, id: BlockId, target: BlockId) -> bool {
        if self.node(id).flags.locked || self.node(target).flags.locked {
            debug!("reposition refused: block is locked");
            return false;
        }
        if self.node(id).parent != self.node(target).parent {
            debug!("reposition refused: blocks are not siblings");
            return false;
        }
        true
    }

    /// Unlinks a node from its sibling list (or extruder slot) without
    /// destroying it. The parent's head pointer is fixed up when the node
    /// was head.
    pub fn splice_out(&mut self, id: BlockId) {
        self.detach(id);
    }

    fn detach(&mut self, id: BlockId) {
        let (parent, prev, next) = {
            let n = self.node(id);
            (n.parent, n.prev, n.next)
        };
        if let Some(p) = parent {
            if self.node(p).extruder == Some(id) {
                self.node_mut(p).extruder = None;
                let n = self.node_mut(id);
                n.parent = None;
                return;
            }
        }
        match prev {
            Some(pv) => self.node_mut(pv).next = next,
            None => {
                if self.list_head_of(parent) == Some(id) {
                    self.set_list_head(parent, next);
                }
            }
        }
        if let Some(nx) = next {
            self.node_mut(nx).prev = prev;
        }
        let n = self.node_mut(id);
        n.parent = None;
        n.prev = None;
        n.next = None;
    }

    /// Splices a node out and destroys it together with its children and
    /// extruder.
    pub fn remove(&mut self, id: BlockId) {
        self.detach(id);
        self.free_recursive(id);
    }

    fn free_recursive(&mut self, id: BlockId) {
        let mut stack = vec![id];
        while let Some(cur) = stack.pop() {
            let node = match self.slots.get_mut(cur.index()).and_then(Option::take) {
                Some(n) => n,
                None => continue,
            };
            self.free.push(cur.0);
            if let Some(ex) = node.extruder {
                stack.push(ex);
            }
            let mut child = node.listhead;
            while let Some(c) = child {
                child = self.node(c).next;
                stack.push(c);
            }
        }
    }

    /// Assigns a detached node to the owner's extruder slot, destroying any
    /// previous occupant.
    pub fn set_extruder(&mut self, owner: BlockId, id: BlockId) {
        if !self.is_detached(id) {
            debug!("set_extruder refused: block already attached");
            return;
        }
        if let Some(old) = self.node(owner).extruder {
            self.node_mut(old).parent = None;
            self.free_recursive(old);
        }
        self.node_mut(id).parent = Some(owner);
        self.node_mut(owner).extruder = Some(id);
        let cell = Shared::clone(&self.node(owner).offset);
        if !self.node(id).payload.owns_offset() {
            self.node_mut(id).offset = cell;
        }
    }

    /// Deep-clones a subtree into detached nodes with fresh identities.
    /// Offset references are shared, never copied.
    pub fn clone_subtree(&mut self, src: BlockId) -> Option<BlockId> {
        let (payload, flags, offset) = {
            let n = self.get(src)?;
            (n.payload.clone(), n.flags, Shared::clone(&n.offset))
        };
        let dst = self.create(payload);
        {
            let n = self.node_mut(dst);
            n.flags = flags;
            n.offset = offset;
        }
        for child in self.children(Some(src)) {
            if let Some(c) = self.clone_subtree(child) {
                self.append_tail(Some(dst), c);
            }
        }
        if let Some(ex) = self.node(src).extruder {
            if let Some(c) = self.clone_subtree(ex) {
                self.set_extruder(dst, c);
            }
        }
        Some(dst)
    }

    // ------------------------------------------------------------------
    // Capability dispatch
    // ------------------------------------------------------------------

    fn unsupported(&self, id: BlockId, capability: &'static str) -> BlockError {
        match self.get(id) {
            Some(n) => BlockError::Unsupported {
                capability,
                variant: n.payload.variant_name(),
            },
            None => BlockError::StaleId,
        }
    }

    fn primitive_for(
        &self,
        id: BlockId,
        capability: &'static str,
    ) -> Result<Primitive, BlockError> {
        self.get(id)
            .ok_or(BlockError::StaleId)?
            .payload
            .primitive()
            .ok_or_else(|| self.unsupported(id, capability))
    }

    /// The primitive geometry of a Line/Arc block.
    pub fn primitive(&self, id: BlockId) -> Result<Primitive, BlockError> {
        self.primitive_for(id, "ends")
    }

    /// Raw endpoints (GET).
    pub fn ends(&self, id: BlockId) -> Result<(Point2, Point2), BlockError> {
        Ok(self.primitive(id)?.ends())
    }

    /// Raw start point ignoring direction (GET_ALPHA).
    pub fn alpha(&self, id: BlockId) -> Result<Point2, BlockError> {
        Ok(self.primitive(id)?.alpha())
    }

    /// Derived end point ignoring direction (GET_OMEGA).
    pub fn omega(&self, id: BlockId) -> Result<Point2, BlockError> {
        Ok(self.primitive(id)?.omega())
    }

    /// Positioned, tool-compensated endpoints (GET_WITH_OFFSET).
    pub fn ends_with_offset(&self, id: BlockId) -> Result<(Point2, Point2), BlockError> {
        let prim = self.primitive(id)?;
        let off = self.node(id).offset.borrow();
        Ok(prim.ends_with_offset(&off))
    }

    /// Unit right-hand travel normals at the endpoints (GET_NORMAL).
    pub fn normals(&self, id: BlockId) -> Result<(Point2, Point2), BlockError> {
        let prim = self.primitive(id)?;
        let off = self.node(id).offset.borrow();
        Ok(prim.normals(&off))
    }

    /// Unit travel tangents at the endpoints (GET_TANGENT).
    pub fn tangents(&self, id: BlockId) -> Result<(Point2, Point2), BlockError> {
        let prim = self.primitive(id)?;
        let off = self.node(id).offset.borrow();
        Ok(prim.tangents(&off))
    }

    /// Assigns endpoints (SET), re-deriving arc angles via reconstruction.
    /// Returns false when an arc cannot join the new endpoints.
    pub fn set_ends(
        &mut self,
        id: BlockId,
        p0: Point2,
        p1: Point2,
        eps: &Eps,
    ) -> Result<bool, BlockError> {
        let mut prim = self.primitive(id)?;
        let ok = prim.set_ends(p0, p1, eps);
        if ok {
            self.node_mut(id).payload.set_primitive(prim);
        }
        Ok(ok)
    }

    /// Intersects two primitive blocks on their positioned geometry.
    /// Non-primitive pairs report unsupported.
    pub fn intersect(
        &self,
        a: BlockId,
        b: BlockId,
        eps: &Eps,
    ) -> Result<SmallVec<[Point2; 2]>, BlockError> {
        let pa = self.primitive_for(a, "intersect")?;
        let pb = self.primitive_for(b, "intersect")?;
        let oa = self.node(a).offset.borrow();
        let ob = self.node(b).offset.borrow();
        Ok(crate::geom::intersect(&pa, &oa, &pb, &ob, eps))
    }

    /// Positioned length: primitives directly, containers as the sum over
    /// children.
    pub fn length(&self, id: BlockId) -> Result<f64, BlockError> {
        let node = self.get(id).ok_or(BlockError::StaleId)?;
        if let Some(prim) = node.payload.primitive() {
            return Ok(prim.length(&node.offset.borrow()));
        }
        if node.payload.is_container() {
            let mut total = 0.0;
            for child in self.children(Some(id)) {
                if let Ok(l) = self.length(child) {
                    total += l;
                }
            }
            return Ok(total);
        }
        Err(self.unsupported(id, "length"))
    }

    /// Positioned bounding box. Containers merge their children; a container
    /// with no contributing members returns the inverted empty box.
    pub fn aabb(&self, id: BlockId) -> Result<Aabb, BlockError> {
        let node = self.get(id).ok_or(BlockError::StaleId)?;
        if let Some(prim) = node.payload.primitive() {
            return Ok(prim.aabb(&node.offset.borrow()));
        }
        match &node.payload {
            BlockPayload::Point(p) => {
                let placed = node.offset.borrow().place(p.position);
                Ok(Aabb::from_points(placed, placed))
            }
            BlockPayload::BoltHoles(b) => {
                let off = node.offset.borrow();
                let mut bb = Aabb::EMPTY;
                for pos in b.positions() {
                    let placed = off.place(pos);
                    let r = b.hole_diameter / 2.0;
                    bb.expand(placed + Point2::new(r, r));
                    bb.expand(placed - Point2::new(r, r));
                }
                Ok(bb)
            }
            BlockPayload::Image(img) => {
                let origin = node.offset.borrow().origin;
                Ok(Aabb::from_points(
                    origin,
                    origin + Point2::new(img.size.0, img.size.1),
                ))
            }
            _ if node.payload.is_container() => {
                let mut bb = Aabb::EMPTY;
                for child in self.children(Some(id)) {
                    if let Ok(child_bb) = self.aabb(child) {
                        bb.merge(&child_bb);
                    }
                }
                Ok(bb)
            }
            _ => Err(self.unsupported(id, "aabb")),
        }
    }

    /// Translates a subtree's raw geometry.
    pub fn translate(&mut self, id: BlockId, d: Point2) {
        let children = self.children(Some(id));
        match &mut self.node_mut(id).payload {
            BlockPayload::Line(l) => l.translate(d),
            BlockPayload::Arc(a) => a.translate(d),
            BlockPayload::Point(p) => p.position = p.position + d,
            BlockPayload::Template(t) => t.position = t.position + d,
            BlockPayload::BoltHoles(b) => b.position = b.position + d,
            _ => {}
        }
        for child in children {
            self.translate(child, d);
        }
    }

    /// Rotates a subtree's raw geometry about `center`.
    pub fn spin(&mut self, id: BlockId, center: Point2, angle_deg: f64) {
        let children = self.children(Some(id));
        match &mut self.node_mut(id).payload {
            BlockPayload::Line(l) => l.rotate_about(center, angle_deg),
            BlockPayload::Arc(a) => a.rotate_about(center, angle_deg),
            BlockPayload::Point(p) => p.position = p.position.rotated_about(center, angle_deg),
            BlockPayload::Template(t) => {
                t.position = t.position.rotated_about(center, angle_deg);
                t.rotation += angle_deg;
            }
            BlockPayload::BoltHoles(b) => {
                b.position = b.position.rotated_about(center, angle_deg);
            }
            _ => {}
        }
        for child in children {
            self.spin(child, center, angle_deg);
        }
    }

    /// Uniformly scales a subtree's raw geometry about the origin. Depth
    /// profiles scale with the geometry.
    pub fn scale(&mut self, id: BlockId, factor: f64) {
        let children = self.children(Some(id));
        let extruder = self.node(id).extruder;
        match &mut self.node_mut(id).payload {
            BlockPayload::Line(l) => l.scale(factor),
            BlockPayload::Arc(a) => a.scale(factor),
            BlockPayload::Point(p) => p.position = p.position * factor,
            BlockPayload::Template(t) => t.position = t.position * factor,
            BlockPayload::BoltHoles(b) => {
                b.position = b.position * factor;
                b.offset_distance *= factor;
                b.hole_diameter *= factor;
            }
            BlockPayload::Extrusion(e) => e.resolution *= factor,
            BlockPayload::Sketch(s) => s.taper_offset = s.taper_offset * factor,
            _ => {}
        }
        for child in children {
            self.scale(child, factor);
        }
        if let Some(ex) = extruder {
            self.scale(ex, factor);
        }
    }

    /// Removes degenerate primitive children (near-zero length or radius)
    /// from a container, recursing into nested containers.
    pub fn prune_null(&mut self, id: BlockId, eps: &Eps) {
        for child in self.children(Some(id)) {
            let degenerate = self
                .node(child)
                .payload
                .primitive()
                .map(|p| p.is_null(eps))
                .unwrap_or(false);
            if degenerate {
                debug!("Pruning null section");
                self.remove(child);
            } else if self.node(child).payload.is_container() {
                self.prune_null(child, eps);
            }
        }
        if let Some(ex) = self.node(id).extruder {
            self.prune_null(ex, eps);
        }
    }

    /// Finds the nearest preceding Tool block by walking this node and its
    /// ancestor-sibling chains backward.
    pub fn find_tool(&self, from: BlockId) -> Option<Tool> {
        let mut cursor = from;
        loop {
            let node = self.get(cursor)?;
            match node.prev {
                Some(prev) => {
                    cursor = prev;
                    if let BlockPayload::Tool(t) = &self.node(cursor).payload {
                        return Some(t.clone());
                    }
                }
                None => {
                    cursor = node.parent?;
                    if let BlockPayload::Tool(t) = &self.node(cursor).payload {
                        return Some(t.clone());
                    }
                }
            }
        }
    }

    /// Collects the primitive children of a container into chain links,
    /// skipping suppressed blocks.
    pub fn chain_of(&self, parent: BlockId) -> Vec<crate::chain::ChainLink> {
        let mut out = Vec::new();
        for child in self.children(Some(parent)) {
            let node = self.node(child);
            if node.flags.suppressed {
                continue;
            }
            if let Some(prim) = node.payload.primitive() {
                out.push(crate::chain::ChainLink::new(node.uid, prim));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Line;

    fn line_block(arena: &mut Arena, x0: f64, y0: f64, x1: f64, y1: f64) -> BlockId {
        arena.create(BlockPayload::Line(Line::new(
            Point2::new(x0, y0),
            Point2::new(x1, y1),
        )))
    }

    #[test]
    fn test_append_and_children_order() {
        let mut arena = Arena::new();
        let sketch = arena.create(BlockPayload::Sketch(super::super::Sketch::default()));
        let a = line_block(&mut arena, 0.0, 0.0, 1.0, 0.0);
        let b = line_block(&mut arena, 1.0, 0.0, 1.0, 1.0);
        arena.append_tail(Some(sketch), a);
        arena.append_tail(Some(sketch), b);
        assert_eq!(arena.children(Some(sketch)), vec![a, b]);
        assert_eq!(arena.get(sketch).unwrap().listhead(), Some(a));
    }

    #[test]
    fn test_insert_head_updates_links() {
        let mut arena = Arena::new();
        let sketch = arena.create(BlockPayload::Sketch(super::super::Sketch::default()));
        let a = line_block(&mut arena, 0.0, 0.0, 1.0, 0.0);
        let b = line_block(&mut arena, 1.0, 0.0, 1.0, 1.0);
        arena.insert_head(Some(sketch), a);
        arena.insert_head(Some(sketch), b);
        assert_eq!(arena.children(Some(sketch)), vec![b, a]);
        assert_eq!(arena.get(a).unwrap().prev(), Some(b));
        assert_eq!(arena.get(b).unwrap().next(), Some(a));
    }

    #[test]
    fn test_splice_out_head_fixes_parent_head() {
        let mut arena = Arena::new();
        let sketch = arena.create(BlockPayload::Sketch(super::super::Sketch::default()));
        let a = line_block(&mut arena, 0.0, 0.0, 1.0, 0.0);
        let b = line_block(&mut arena, 1.0, 0.0, 1.0, 1.0);
        arena.append_tail(Some(sketch), a);
        arena.append_tail(Some(sketch), b);
        arena.splice_out(a);
        assert_eq!(arena.children(Some(sketch)), vec![b]);
        assert_eq!(arena.get(b).unwrap().prev(), None);
        assert!(arena.get(a).unwrap().parent().is_none());
    }

    #[test]
    fn test_place_refuses_locked_block() {
        let mut arena = Arena::new();
        let sketch = arena.create(BlockPayload::Sketch(super::super::Sketch::default()));
        let a = line_block(&mut arena, 0.0, 0.0, 1.0, 0.0);
        let b = line_block(&mut arena, 1.0, 0.0, 1.0, 1.0);
        arena.append_tail(Some(sketch), a);
        arena.append_tail(Some(sketch), b);
        arena.get_mut(b).unwrap().flags.locked = true;
        arena.place_before(b, a);
        // Refused: order unchanged.
        assert_eq!(arena.children(Some(sketch)), vec![a, b]);
    }

    #[test]
    fn test_remove_frees_children_and_extruder() {
        let mut arena = Arena::new();
        let sketch = arena.create(BlockPayload::Sketch(super::super::Sketch::default()));
        let a = line_block(&mut arena, 0.0, 0.0, 1.0, 0.0);
        arena.append_tail(Some(sketch), a);
        let ext = arena.create(BlockPayload::Extrusion(super::super::Extrusion::default()));
        let profile = line_block(&mut arena, 0.0, 0.0, 0.0, -1.0);
        arena.append_tail(Some(ext), profile);
        arena.set_extruder(sketch, ext);
        arena.remove(sketch);
        assert!(arena.get(sketch).is_none());
        assert!(arena.get(a).is_none());
        assert!(arena.get(ext).is_none());
        assert!(arena.get(profile).is_none());
    }

    #[test]
    fn test_container_has_no_ends() {
        let mut arena = Arena::new();
        let sketch = arena.create(BlockPayload::Sketch(super::super::Sketch::default()));
        match arena.ends(sketch) {
            Err(BlockError::Unsupported { variant, .. }) => assert_eq!(variant, "Sketch"),
            other => panic!("expected unsupported, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_container_aabb_is_inverted() {
        let mut arena = Arena::new();
        let sketch = arena.create(BlockPayload::Sketch(super::super::Sketch::default()));
        let bb = arena.aabb(sketch).unwrap();
        assert!(!bb.is_valid());
    }

    #[test]
    fn test_find_tool_walks_backward_and_up() {
        let mut arena = Arena::new();
        let tool = arena.create(BlockPayload::Tool(Tool::new(2, "test", 3.0)));
        arena.append_tail(None, tool);
        let sketch = arena.create(BlockPayload::Sketch(super::super::Sketch::default()));
        arena.append_tail(None, sketch);
        let a = line_block(&mut arena, 0.0, 0.0, 1.0, 0.0);
        arena.append_tail(Some(sketch), a);
        let found = arena.find_tool(a).unwrap();
        assert_eq!(found.number, 2);
    }

    #[test]
    fn test_find_tool_none_when_absent() {
        let mut arena = Arena::new();
        let sketch = arena.create(BlockPayload::Sketch(super::super::Sketch::default()));
        arena.append_tail(None, sketch);
        let a = line_block(&mut arena, 0.0, 0.0, 1.0, 0.0);
        arena.append_tail(Some(sketch), a);
        assert!(arena.find_tool(a).is_none());
    }

    #[test]
    fn test_clone_subtree_is_independent() {
        let mut arena = Arena::new();
        let sketch = arena.create(BlockPayload::Sketch(super::super::Sketch::default()));
        let a = line_block(&mut arena, 0.0, 0.0, 1.0, 0.0);
        arena.append_tail(Some(sketch), a);
        let copy = arena.clone_subtree(sketch).unwrap();
        assert_ne!(arena.get(copy).unwrap().uid, arena.get(sketch).unwrap().uid);
        assert_eq!(arena.children(Some(copy)).len(), 1);
        arena.remove(copy);
        assert!(arena.get(sketch).is_some());
        assert!(arena.get(a).is_some());
    }

    #[test]
    fn test_length_sums_container_children() {
        let mut arena = Arena::new();
        let sketch = arena.create(BlockPayload::Sketch(super::super::Sketch::default()));
        let a = line_block(&mut arena, 0.0, 0.0, 3.0, 0.0);
        let b = line_block(&mut arena, 3.0, 0.0, 3.0, 4.0);
        arena.append_tail(Some(sketch), a);
        arena.append_tail(Some(sketch), b);
        assert!((arena.length(sketch).unwrap() - 7.0).abs() < 1e-12);
    }

    #[test]
    fn test_translate_and_spin_move_geometry() {
        let mut arena = Arena::new();
        let a = line_block(&mut arena, 0.0, 0.0, 1.0, 0.0);
        arena.translate(a, Point2::new(2.0, 3.0));
        let (p0, _) = arena.ends(a).unwrap();
        assert!(p0.distance_to(&Point2::new(2.0, 3.0)) < 1e-12);
        arena.spin(a, Point2::new(2.0, 3.0), 90.0);
        let (_, p1) = arena.ends(a).unwrap();
        assert!(p1.distance_to(&Point2::new(2.0, 4.0)) < 1e-9);
    }

    #[test]
    fn test_scale_reaches_the_extruder_profile() {
        let mut arena = Arena::new();
        let sketch = arena.create(BlockPayload::Sketch(super::super::Sketch::default()));
        let edge = line_block(&mut arena, 0.0, 0.0, 1.0, 0.0);
        arena.append_tail(Some(sketch), edge);
        let ext = arena.create(BlockPayload::Extrusion(super::super::Extrusion::default()));
        let profile = line_block(&mut arena, 0.0, 0.0, 0.0, -1.0);
        arena.append_tail(Some(ext), profile);
        arena.set_extruder(sketch, ext);

        arena.scale(sketch, 2.0);
        let (_, p1) = arena.ends(edge).unwrap();
        assert!(p1.distance_to(&Point2::new(2.0, 0.0)) < 1e-12);
        let (_, d1) = arena.ends(profile).unwrap();
        assert!(d1.distance_to(&Point2::new(0.0, -2.0)) < 1e-12);
        match &arena.get(ext).unwrap().payload {
            BlockPayload::Extrusion(e) => assert!((e.resolution - 2.0).abs() < 1e-12),
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_intersect_dispatch_rejects_containers() {
        let mut arena = Arena::new();
        let eps = Eps::default();
        let sketch = arena.create(BlockPayload::Sketch(super::super::Sketch::default()));
        let a = line_block(&mut arena, 0.0, 0.0, 1.0, 0.0);
        match arena.intersect(a, sketch, &eps) {
            Err(BlockError::Unsupported { capability, .. }) => {
                assert_eq!(capability, "intersect")
            }
            other => panic!("expected unsupported, got {other:?}"),
        }
    }

    #[test]
    fn test_children_inherit_parent_offset_record() {
        let mut arena = Arena::new();
        let sketch = arena.create(BlockPayload::Sketch(super::super::Sketch::default()));
        let a = line_block(&mut arena, 0.0, 0.0, 1.0, 0.0);
        arena.append_tail(Some(sketch), a);
        arena.get(sketch).unwrap().offset.borrow_mut().origin = Point2::new(5.0, 0.0);
        let (p0, p1) = arena.ends_with_offset(a).unwrap();
        assert!(p0.distance_to(&Point2::new(5.0, 0.0)) < 1e-12);
        assert!(p1.distance_to(&Point2::new(6.0, 0.0)) < 1e-12);
    }

    #[test]
    fn test_image_supports_aabb_but_not_ends() {
        let mut arena = Arena::new();
        let image = arena.create(BlockPayload::Image(super::super::Image {
            size: (4.0, 2.0),
            resolution: (2, 1),
            depths: vec![0.0, -1.0],
        }));
        assert!(matches!(
            arena.ends(image),
            Err(BlockError::Unsupported { .. })
        ));
        let bb = arena.aabb(image).unwrap();
        assert!((bb.width() - 4.0).abs() < 1e-12);
        assert!((bb.height() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_prune_null_removes_degenerates() {
        let mut arena = Arena::new();
        let eps = Eps::default();
        let sketch = arena.create(BlockPayload::Sketch(super::super::Sketch::default()));
        let good = line_block(&mut arena, 0.0, 0.0, 1.0, 0.0);
        let degenerate = line_block(&mut arena, 2.0, 2.0, 2.0, 2.0);
        arena.append_tail(Some(sketch), good);
        arena.append_tail(Some(sketch), degenerate);
        arena.prune_null(sketch, &eps);
        assert_eq!(arena.children(Some(sketch)), vec![good]);
        assert!(arena.get(degenerate).is_none());
    }
}
