//! Generated instances: one row's copy of a template widget.

use indexmap::IndexMap;

use crate::level::{LevelBinding, LevelData};
use crate::template::{FieldValue, WidgetId};

bitflags::bitflags! {
    /// Editing capabilities withdrawn from a generated widget.
    ///
    /// Fixed when the instance is built; projected rows carry
    /// [`Capabilities::PROJECTION`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Capabilities: u8 {
        const RESIZE_DISABLED = 1 << 0;
        const PROPERTY_PANE_DISABLED = 1 << 1;
        const DRAG_DISABLED = 1 << 2;
        const DROP_DISABLED = 1 << 3;
        const IGNORE_COLLISION = 1 << 4;

        const PROJECTION = Self::RESIZE_DISABLED.bits()
            | Self::PROPERTY_PANE_DISABLED.bits()
            | Self::DRAG_DISABLED.bits()
            | Self::DROP_DISABLED.bits()
            | Self::IGNORE_COLLISION.bits();
    }
}

/// Resize grip of a widget frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResizeHandle {
    Left,
    Top,
    Right,
    Bottom,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// Handles disabled on projected rows. `Bottom` stays available so the row
/// height can still follow its content.
pub const PROJECTION_RESIZE_HANDLES: [ResizeHandle; 7] = [
    ResizeHandle::Left,
    ResizeHandle::Top,
    ResizeHandle::Right,
    ResizeHandle::BottomRight,
    ResizeHandle::TopLeft,
    ResizeHandle::TopRight,
    ResizeHandle::BottomLeft,
];

/// A materialized copy of a template widget for one row.
#[derive(Debug, Clone, PartialEq)]
pub struct MetaWidget {
    /// Instance id. Equals `template_widget_id` on the editable row.
    pub widget_id: WidgetId,
    /// Identity cache slot id of the instance.
    pub meta_widget_id: WidgetId,
    pub widget_name: String,
    pub template_widget_id: WidgetId,
    pub template_widget_name: String,
    pub kind: String,
    pub parent_id: Option<WidgetId>,
    pub children: Vec<WidgetId>,
    /// `currentIndex` of the row.
    pub row_index: usize,
    pub view_index: usize,
    pub current_item: FieldValue,
    pub current_view: FieldValue,
    /// What the widget sees under each `level_N` of its ancestors.
    pub ancestor_levels: IndexMap<String, LevelBinding>,
    pub props: IndexMap<String, FieldValue>,
    pub capabilities: Capabilities,
    pub disabled_resize_handles: Vec<ResizeHandle>,
    /// Nesting level the widget is generated for. Nested lists sit one
    /// level below the rows that contain them.
    pub level: usize,
    /// Ancestor context handed to a nested list's own generator.
    pub level_data: Option<LevelData>,
    /// Id namespace for a nested list's own generator.
    pub prefix_meta_widget_id: Option<WidgetId>,
}

impl MetaWidget {
    /// Whether this instance belongs to the directly editable row.
    pub fn is_canonical(&self) -> bool {
        self.widget_id == self.template_widget_id
    }

    pub fn prop(&self, key: &str) -> Option<&FieldValue> {
        self.props.get(key)
    }

    pub fn resize_disabled(&self) -> bool {
        self.capabilities.contains(Capabilities::RESIZE_DISABLED)
    }

    pub fn property_pane_disabled(&self) -> bool {
        self.capabilities
            .contains(Capabilities::PROPERTY_PANE_DISABLED)
    }

    pub fn drag_disabled(&self) -> bool {
        self.capabilities.contains(Capabilities::DRAG_DISABLED)
    }

    pub fn drop_disabled(&self) -> bool {
        self.capabilities.contains(Capabilities::DROP_DISABLED)
    }

    pub fn ignores_collision(&self) -> bool {
        self.capabilities.contains(Capabilities::IGNORE_COLLISION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn projection_withdraws_every_capability() {
        let caps = Capabilities::PROJECTION;
        for flag in [
            Capabilities::RESIZE_DISABLED,
            Capabilities::PROPERTY_PANE_DISABLED,
            Capabilities::DRAG_DISABLED,
            Capabilities::DROP_DISABLED,
            Capabilities::IGNORE_COLLISION,
        ] {
            assert!(caps.contains(flag));
        }
        assert!(Capabilities::default().is_empty());
    }

    #[test]
    fn bottom_handle_is_never_disabled() {
        assert!(!PROJECTION_RESIZE_HANDLES.contains(&ResizeHandle::Bottom));
        assert_eq!(PROJECTION_RESIZE_HANDLES.len(), 7);
    }
}
