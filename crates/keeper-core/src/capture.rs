//! # Capture Sequencer
//!
//! State machine for the mandatory two-photo intake flow on an open item.
//!
//! ## Phases
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Two-Photo Capture Flow                              │
//! │                                                                         │
//! │   images: 0                 images: 1                 images: 2        │
//! │                                                                         │
//! │   Idle ──begin_first──► ProcessingImage1 ──complete──► AwaitingImage2  │
//! │    ▲                         │                              │           │
//! │    └────────cancel───────────┘                       begin_second       │
//! │                                                             │           │
//! │   Idle ◄──complete── ProcessingImage2 ◄─────────────────────┘          │
//! │    ▲                         │                                          │
//! │    │                         └──cancel──► AwaitingImage2               │
//! │    └── then price-ensure, if either price is unset                     │
//! │                                                                         │
//! │  CLOSE GUARD: the item-detail overlay refuses to close while the       │
//! │  sequencer is in a Processing phase - an in-flight capture would be    │
//! │  lost otherwise.                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Resumability
//! Opening an item that already has exactly one photo resumes directly
//! into the capture-2 call-to-action (`AwaitingImage2`); capture 1 never
//! re-runs. Two photos skip straight past capture to price-ensure.
//!
//! The sequencer is pure state. The surrounding flow performs the actual
//! camera prompt, upload, persist and embedding notification, reporting
//! outcomes back here as transitions.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::MAX_ITEM_IMAGES;

// =============================================================================
// Capture Phase
// =============================================================================

/// Where the sequencer currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "kebab-case")]
#[ts(export)]
pub enum CapturePhase {
    /// No capture running. Covers both "no photos yet" (the flow solicits
    /// photo 1 on entry) and "both photos present".
    Idle,
    /// Photo 1 is being captured/uploaded.
    ProcessingImage1,
    /// Photo 1 saved; the persistent capture-2 CTA is showing.
    AwaitingImage2,
    /// Photo 2 is being captured/uploaded.
    ProcessingImage2,
}

// =============================================================================
// Capture Sequencer
// =============================================================================

/// Per-open-item capture state machine. Exactly one exists per item
/// detail view; it must not outlive overlay close while busy (the close
/// guard enforces this).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureSequencer {
    phase: CapturePhase,
}

impl CaptureSequencer {
    /// Resumes from the item's persisted photo count.
    ///
    /// - 0 photos → `Idle`; the flow immediately solicits photo 1
    /// - 1 photo  → `AwaitingImage2`; never re-runs capture 1
    /// - 2 photos → `Idle`; capture is done, price-ensure may follow
    pub fn resume(image_count: usize) -> Self {
        let phase = if image_count == 1 {
            CapturePhase::AwaitingImage2
        } else {
            CapturePhase::Idle
        };
        CaptureSequencer { phase }
    }

    pub fn phase(&self) -> CapturePhase {
        self.phase
    }

    /// True while a capture/upload is in flight. Gates overlay close.
    pub fn is_busy(&self) -> bool {
        matches!(
            self.phase,
            CapturePhase::ProcessingImage1 | CapturePhase::ProcessingImage2
        )
    }

    /// The first photo needs soliciting (brand-new item, nothing captured).
    pub fn wants_first(&self, image_count: usize) -> bool {
        self.phase == CapturePhase::Idle && image_count == 0
    }

    /// The capture-2 CTA should be showing.
    pub fn wants_second(&self) -> bool {
        self.phase == CapturePhase::AwaitingImage2
    }

    /// Starts capture of photo 1. Only valid from `Idle` with no photos.
    pub fn begin_first(&mut self) -> CoreResult<()> {
        match self.phase {
            CapturePhase::Idle => {
                self.phase = CapturePhase::ProcessingImage1;
                Ok(())
            }
            phase => Err(CoreError::InvalidCapturePhase { phase }),
        }
    }

    /// User cancelled the photo-1 picker: back to the stable placeholder
    /// state, nothing persisted, no automatic retry.
    pub fn cancel_first(&mut self) -> CoreResult<()> {
        match self.phase {
            CapturePhase::ProcessingImage1 => {
                self.phase = CapturePhase::Idle;
                Ok(())
            }
            phase => Err(CoreError::InvalidCapturePhase { phase }),
        }
    }

    /// Photo 1 uploaded and persisted: surface the capture-2 CTA.
    pub fn complete_first(&mut self) -> CoreResult<()> {
        match self.phase {
            CapturePhase::ProcessingImage1 => {
                self.phase = CapturePhase::AwaitingImage2;
                Ok(())
            }
            phase => Err(CoreError::InvalidCapturePhase { phase }),
        }
    }

    /// Starts capture of photo 2. Only valid from the CTA state.
    pub fn begin_second(&mut self) -> CoreResult<()> {
        match self.phase {
            CapturePhase::AwaitingImage2 => {
                self.phase = CapturePhase::ProcessingImage2;
                Ok(())
            }
            phase => Err(CoreError::InvalidCapturePhase { phase }),
        }
    }

    /// User cancelled the photo-2 picker: photo 1 stays persisted, the CTA
    /// comes back.
    pub fn cancel_second(&mut self) -> CoreResult<()> {
        match self.phase {
            CapturePhase::ProcessingImage2 => {
                self.phase = CapturePhase::AwaitingImage2;
                Ok(())
            }
            phase => Err(CoreError::InvalidCapturePhase { phase }),
        }
    }

    /// Photo 2 uploaded and persisted: capture is complete.
    pub fn complete_second(&mut self) -> CoreResult<()> {
        match self.phase {
            CapturePhase::ProcessingImage2 => {
                self.phase = CapturePhase::Idle;
                Ok(())
            }
            phase => Err(CoreError::InvalidCapturePhase { phase }),
        }
    }

    /// Starts an edit-mode retake of one specific slot.
    ///
    /// Only valid while no other capture is running; the slot picks which
    /// processing phase gates the close action.
    pub fn begin_retake(&mut self, slot: usize) -> CoreResult<()> {
        if slot >= MAX_ITEM_IMAGES {
            return Err(CoreError::ImageSlotOutOfRange(slot));
        }
        if self.is_busy() {
            return Err(CoreError::InvalidCapturePhase { phase: self.phase });
        }
        self.phase = if slot == 0 {
            CapturePhase::ProcessingImage1
        } else {
            CapturePhase::ProcessingImage2
        };
        Ok(())
    }

    /// Ends a retake (success or cancel): phase falls back to whatever the
    /// persisted photo count dictates.
    pub fn finish_retake(&mut self, image_count: usize) {
        *self = CaptureSequencer::resume(image_count);
    }
}

impl Default for CaptureSequencer {
    fn default() -> Self {
        CaptureSequencer {
            phase: CapturePhase::Idle,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
