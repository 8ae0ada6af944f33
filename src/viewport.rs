// Viewport adapter: breakpoint-derived layout constants for the rendering layer.
// Pure rendering parameters. Never feeds back into scroll position or phase logic.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::types::ViewportSettings;

/// Smallest height the desktop scene fits without shrinking.
const MIN_COMFORTABLE_HEIGHT: f32 = 700.0;

/// Layout offsets at scale 1.0, in CSS pixels.
const CARD_OFFSET_X: f32 = 360.0;
const RING_SPLIT_DISTANCE: f32 = 220.0;
const SCENE_OFFSET_Y: f32 = -40.0;

/// Constants consumed by the sequencer's rendering step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutConstants {
    pub is_mobile: bool,
    pub is_tablet: bool,
    pub scale: f32,
    pub card_offset_x: f32,
    pub ring_split_distance: f32,
    pub scene_offset_y: f32,
}

/// Tracks the viewport size and recomputes layout on resize.
#[derive(Debug, Clone)]
pub struct ViewportAdapter {
    settings: ViewportSettings,
    width: f32,
    height: f32,
    layout: LayoutConstants,
}

impl ViewportAdapter {
    pub fn new(settings: ViewportSettings) -> Self {
        let width = settings.design_width;
        let height = MIN_COMFORTABLE_HEIGHT;
        let layout = compute_layout(&settings, width, height);
        ViewportAdapter {
            settings,
            width,
            height,
            layout,
        }
    }

    /// Recomputes the layout. Returns `true` when the mobile flag flipped.
    pub fn update(&mut self, width: f32, height: f32) -> bool {
        if !(width.is_finite() && height.is_finite()) || width <= 0.0 || height <= 0.0 {
            // Transient garbage during orientation changes; the next resize corrects it.
            return false;
        }
        let was_mobile = self.layout.is_mobile;
        self.width = width;
        self.height = height;
        self.layout = compute_layout(&self.settings, width, height);

        let flipped = was_mobile != self.layout.is_mobile;
        if flipped {
            debug!(
                "viewport {}x{} crossed mobile breakpoint (mobile={})",
                width, height, self.layout.is_mobile
            );
        }
        flipped
    }

    pub fn layout(&self) -> &LayoutConstants {
        &self.layout
    }

    pub fn is_mobile(&self) -> bool {
        self.layout.is_mobile
    }

    pub fn size(&self) -> (f32, f32) {
        (self.width, self.height)
    }
}

/// Layout for a given viewport size.
pub fn compute_layout(settings: &ViewportSettings, width: f32, height: f32) -> LayoutConstants {
    let is_mobile = width < settings.mobile_breakpoint;
    let is_tablet = !is_mobile && width < settings.tablet_breakpoint;

    let width_scale = width / settings.design_width;
    let mut scale = if is_mobile {
        (width / settings.mobile_breakpoint).clamp(0.4, 1.0) * 0.6
    } else if is_tablet {
        width_scale.clamp(0.6, 1.0) * 0.9
    } else {
        width_scale.clamp(0.6, 1.25)
    };

    if !is_mobile && height < MIN_COMFORTABLE_HEIGHT {
        scale *= (height / MIN_COMFORTABLE_HEIGHT).max(0.5);
    }

    LayoutConstants {
        is_mobile,
        is_tablet,
        scale,
        // Cards stack vertically on mobile.
        card_offset_x: if is_mobile { 0.0 } else { CARD_OFFSET_X * scale },
        ring_split_distance: RING_SPLIT_DISTANCE * scale,
        scene_offset_y: if is_mobile { 0.0 } else { SCENE_OFFSET_Y * scale },
    }
}

/// Coarse `navigator.userAgent` sniffing for phones and tablets.
pub fn is_mobile_user_agent(user_agent: &str) -> bool {
    const TOKENS: [&str; 8] = [
        "android",
        "iphone",
        "ipad",
        "ipod",
        "blackberry",
        "iemobile",
        "opera mini",
        "mobile",
    ];
    let ua = user_agent.to_ascii_lowercase();
    TOKENS.iter().any(|token| ua.contains(token))
}
