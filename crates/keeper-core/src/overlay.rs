//! # Item Overlay State Machine
//!
//! Visibility and exclusivity of the two overlay surfaces (the category
//! browser and the item detail view), plus the view/edit toggle and the
//! capture close-guard.
//!
//! ## Surfaces
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Overlay Stacking                                   │
//! │                                                                         │
//! │   Closed ──open_categories──► CategoriesOpen ──open_item──►            │
//! │     ▲                            ▲      │                               │
//! │     │                            │      ▼                               │
//! │     │                       close_item  ItemDetailOpen {View|Edit}     │
//! │     │                            │      │                               │
//! │     └────────close_all───────────┴──────┘                               │
//! │                                                                         │
//! │  • Item detail is entered only from the category browser and returns   │
//! │    there on close (the shared backdrop never blinks)                   │
//! │  • close_all is the explicit backdrop close: everything goes           │
//! │  • Both close actions are refused while a capture is processing        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The machine is pure: the session layer owns one per shop screen and
//! performs the actual cache swaps and persistence around transitions.

use crate::capture::CaptureSequencer;
use crate::error::{CoreError, CoreResult};

// =============================================================================
// States
// =============================================================================

/// Item detail's local mode. Leaving `Edit` ALWAYS saves; there is no
/// cancel path (longstanding behavior, preserved; see DESIGN.md).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailMode {
    View,
    Edit,
}

/// Which overlay surface is visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayState {
    /// No overlay; the shared backdrop is hidden.
    Closed,
    /// Category browser content on the shared backdrop.
    CategoriesOpen,
    /// Item detail content; category content hidden but the backdrop
    /// stays, and close returns to `CategoriesOpen`.
    ItemDetailOpen { mode: DetailMode },
}

impl OverlayState {
    fn name(&self) -> &'static str {
        match self {
            OverlayState::Closed => "closed",
            OverlayState::CategoriesOpen => "categories",
            OverlayState::ItemDetailOpen { .. } => "item detail",
        }
    }
}

// =============================================================================
// Overlay Machine
// =============================================================================

/// The overlay state machine. One per shop screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Overlay {
    state: OverlayState,
}

impl Overlay {
    pub fn new() -> Self {
        Overlay {
            state: OverlayState::Closed,
        }
    }

    pub fn state(&self) -> OverlayState {
        self.state
    }

    pub fn is_item_open(&self) -> bool {
        matches!(self.state, OverlayState::ItemDetailOpen { .. })
    }

    pub fn mode(&self) -> Option<DetailMode> {
        match self.state {
            OverlayState::ItemDetailOpen { mode } => Some(mode),
            _ => None,
        }
    }

    /// Shows the category browser (the "manage stock" entry point). Also
    /// the landing state after an item detail closes.
    pub fn open_categories(&mut self) {
        self.state = OverlayState::CategoriesOpen;
    }

    /// Opens item detail on top of the category browser.
    ///
    /// Only valid from `CategoriesOpen`; detail remembers it must return
    /// there, so it cannot be entered from nowhere.
    pub fn open_item(&mut self) -> CoreResult<()> {
        match self.state {
            OverlayState::CategoriesOpen => {
                self.state = OverlayState::ItemDetailOpen {
                    mode: DetailMode::View,
                };
                Ok(())
            }
            state => Err(CoreError::InvalidOverlayState {
                state: state.name(),
                action: "open item detail",
            }),
        }
    }

    /// Closes item detail, restoring the category browser.
    ///
    /// Refused while the capture sequencer is processing a photo; an
    /// in-flight capture must not be orphaned. State is unchanged on
    /// refusal; the caller notifies the user.
    pub fn close_item(&mut self, capture: &CaptureSequencer) -> CoreResult<()> {
        if !self.is_item_open() {
            return Err(CoreError::InvalidOverlayState {
                state: self.state.name(),
                action: "close item detail",
            });
        }
        if capture.is_busy() {
            return Err(CoreError::CaptureInProgress {
                phase: capture.phase(),
            });
        }
        self.state = OverlayState::CategoriesOpen;
        Ok(())
    }

    /// Explicit backdrop close: everything goes, regardless of which
    /// surface was showing. The capture guard still applies while item
    /// detail is up.
    pub fn close_all(&mut self, capture: &CaptureSequencer) -> CoreResult<()> {
        if self.is_item_open() && capture.is_busy() {
            return Err(CoreError::CaptureInProgress {
                phase: capture.phase(),
            });
        }
        self.state = OverlayState::Closed;
        Ok(())
    }

    /// `view → edit`: swaps static text for editable fields. Purely local,
    /// nothing persists.
    pub fn enter_edit(&mut self) -> CoreResult<()> {
        match self.state {
            OverlayState::ItemDetailOpen {
                mode: DetailMode::View,
            } => {
                self.state = OverlayState::ItemDetailOpen {
                    mode: DetailMode::Edit,
                };
                Ok(())
            }
            state => Err(CoreError::InvalidOverlayState {
                state: state.name(),
                action: "enter edit mode",
            }),
        }
    }

    /// `edit → view`. The caller persists the edit buffer FIRST; leaving
    /// edit mode always saves.
    pub fn exit_edit(&mut self) -> CoreResult<()> {
        match self.state {
            OverlayState::ItemDetailOpen {
                mode: DetailMode::Edit,
            } => {
                self.state = OverlayState::ItemDetailOpen {
                    mode: DetailMode::View,
                };
                Ok(())
            }
            state => Err(CoreError::InvalidOverlayState {
                state: state.name(),
                action: "exit edit mode",
            }),
        }
    }
}

impl Default for Overlay {
    fn default() -> Self {
        Overlay::new()
    }
}

// =============================================================================
// Category Modal Affordances
// =============================================================================

/// Which actions the category modal offers for the selected node.
///
/// Leaf enforcement at the UI layer: a node holding items takes no
/// subcategories, a node with subcategories takes no items. The store
/// re-checks before item creation (the backend-equivalent check).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModalOptions {
    pub can_add_subcategory: bool,
    pub can_add_item: bool,
}

/// Computes modal affordances from the node's child counts.
pub fn modal_options(subcategory_count: usize, item_count: usize) -> ModalOptions {
    ModalOptions {
        can_add_subcategory: item_count == 0,
        can_add_item: subcategory_count == 0,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::CapturePhase;

    #[test]
    fn test_item_detail_entered_only_from_categories() {
        let mut overlay = Overlay::new();
        assert!(overlay.open_item().is_err());

        overlay.open_categories();
        overlay.open_item().unwrap();
        assert!(overlay.is_item_open());
        assert_eq!(overlay.mode(), Some(DetailMode::View));
    }

    #[test]
    fn test_close_item_returns_to_categories() {
        let mut overlay = Overlay::new();
        overlay.open_categories();
        overlay.open_item().unwrap();

        let capture = CaptureSequencer::resume(2);
        overlay.close_item(&capture).unwrap();
        assert_eq!(overlay.state(), OverlayState::CategoriesOpen);
    }

    /// Closing item detail while the capture phase is
    /// processing-image-1 is refused and the state is unchanged.
    #[test]
    fn test_close_refused_while_capturing() {
        let mut overlay = Overlay::new();
        overlay.open_categories();
        overlay.open_item().unwrap();

        let mut capture = CaptureSequencer::resume(0);
        capture.begin_first().unwrap();
        assert_eq!(capture.phase(), CapturePhase::ProcessingImage1);

        let err = overlay.close_item(&capture).unwrap_err();
        assert!(matches!(
            err,
            crate::CoreError::CaptureInProgress {
                phase: CapturePhase::ProcessingImage1
            }
        ));
        assert!(overlay.is_item_open());

        // Backdrop close is refused the same way
        assert!(overlay.close_all(&capture).is_err());
        assert!(overlay.is_item_open());
    }

    #[test]
    fn test_close_all_from_categories() {
        let mut overlay = Overlay::new();
        overlay.open_categories();
        overlay.close_all(&CaptureSequencer::default()).unwrap();
        assert_eq!(overlay.state(), OverlayState::Closed);
    }

    #[test]
    fn test_edit_toggle() {
        let mut overlay = Overlay::new();
        overlay.open_categories();
        overlay.open_item().unwrap();

        assert!(overlay.exit_edit().is_err());

        overlay.enter_edit().unwrap();
        assert_eq!(overlay.mode(), Some(DetailMode::Edit));
        assert!(overlay.enter_edit().is_err());

        overlay.exit_edit().unwrap();
        assert_eq!(overlay.mode(), Some(DetailMode::View));
    }

    /// Leaf enforcement holds in both directions.
    #[test]
    fn test_modal_options_leaf_enforcement() {
        // Subcategories present: no item-add offered
        let opts = modal_options(2, 0);
        assert!(opts.can_add_subcategory);
        assert!(!opts.can_add_item);

        // Items present: no subcategory-add offered
        let opts = modal_options(0, 3);
        assert!(!opts.can_add_subcategory);
        assert!(opts.can_add_item);

        // Empty node offers both
        let opts = modal_options(0, 0);
        assert!(opts.can_add_subcategory);
        assert!(opts.can_add_item);
    }
}
