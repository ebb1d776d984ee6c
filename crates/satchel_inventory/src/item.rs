//! # Item Instances
//!
//! A live, identified instance of a template. Items carry no rules of their
//! own; every mutation goes through the owning [`crate::Inventory`].

use crate::catalog::ItemTemplate;
use satchel_shared::{ItemId, ItemPosition, TemplateId};
use std::sync::Arc;

/// A live item instance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Item {
    id: ItemId,
    template: Arc<ItemTemplate>,
    stack_size: u32,
    position: ItemPosition,
}

impl Item {
    /// Creates an item destined for `position`.
    #[must_use]
    pub fn new(
        id: ItemId,
        template: Arc<ItemTemplate>,
        stack_size: u32,
        position: ItemPosition,
    ) -> Self {
        Self {
            id,
            template,
            stack_size,
            position,
        }
    }

    /// Instance id.
    #[inline]
    #[must_use]
    pub const fn id(&self) -> ItemId {
        self.id
    }

    /// Template this item was made from.
    #[inline]
    #[must_use]
    pub fn template(&self) -> &ItemTemplate {
        &self.template
    }

    /// Template id.
    #[inline]
    #[must_use]
    pub fn template_id(&self) -> TemplateId {
        self.template.id
    }

    /// Units in this stack.
    #[inline]
    #[must_use]
    pub const fn stack_size(&self) -> u32 {
        self.stack_size
    }

    /// Units that still fit on top of this stack.
    #[inline]
    #[must_use]
    pub fn headroom(&self) -> u32 {
        self.template.max_stack.saturating_sub(self.stack_size)
    }

    /// Last position the item was placed at.
    #[inline]
    #[must_use]
    pub const fn position(&self) -> ItemPosition {
        self.position
    }

    pub(crate) fn update_stack_size(&mut self, delta: u32) {
        debug_assert!(delta <= self.headroom(), "stack grown past max_stack");
        self.stack_size += delta;
    }

    pub(crate) fn update_position(&mut self, position: ItemPosition) {
        self.position = position;
    }
}
