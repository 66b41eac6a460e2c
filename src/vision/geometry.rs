//! Probe and hit-box coordinates for the dialogue UI
//!
//! All positions are measured on a 1920x1080 reference layout and scaled to
//! the player's resolution. Displays wider than 16:9 keep the dialogue UI
//! anchored differently, so three landmarks are interpolated between
//! measurements taken at 1920 and 3840 pixels wide instead.

use serde::{Deserialize, Serialize};

/// Reference layout width
pub const REF_WIDTH: u32 = 1920;
/// Reference layout height
pub const REF_HEIGHT: u32 = 1080;
/// Height / width of a 16:9 display
pub const STANDARD_RATIO: f64 = 0.5625;
/// Widest layout the right-anchored calibration was measured on
pub const DOUBLE_HD_WIDTH: u32 = 3840;
/// Largest autoplay probe x observed on left-anchored ultrawide layouts
pub const AUTOPLAY_X_CLAMP: i32 = 230;

/// Calibration measured against the game UI. Values are (x at 1920 wide,
/// x at 3840 wide, drift bias) and will need re-measuring if the UI moves.
mod calibration {
    pub const DIALOGUE_MIN_X: (i32, i32, f64) = (1300, 2734, 0.031);
    pub const DIALOGUE_MAX_X: (i32, i32, f64) = (1700, 3303, -0.015);
    pub const DIALOGUE_ICON_X: (i32, i32, f64) = (1301, 2770, 0.02);
    pub const AUTOPLAY_ICON_X: (i32, i32) = (84, 230);

    pub const DIALOGUE_MIN_Y: i32 = 790;
    pub const DIALOGUE_MAX_Y: i32 = 800;
    pub const AUTOPLAY_ICON_Y: i32 = 46;
    pub const LOADING_X: i32 = 1200;
    pub const LOADING_Y: i32 = 700;

    /// (lower, higher) dialogue icon rows on 16:9 layouts
    pub const DIALOGUE_ICON_Y: (i32, i32) = (808, 790);
    /// (lower, higher) dialogue icon rows on ultrawide layouts
    pub const DIALOGUE_ICON_Y_WIDE: (i32, i32) = (810, 792);
}

/// Screen resolution in physical pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Both sides are non-zero
    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// Wider than the reference and not 16:9
    pub fn is_non_standard_ratio(&self) -> bool {
        self.width > REF_WIDTH && self.height as f64 / self.width as f64 != STANDARD_RATIO
    }
}

impl Default for Resolution {
    fn default() -> Self {
        Self::new(REF_WIDTH, REF_HEIGHT)
    }
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Coordinate scaler for one resolution
#[derive(Debug, Clone, Copy)]
pub struct CoordinateModel {
    resolution: Resolution,
}

impl CoordinateModel {
    pub fn new(resolution: Resolution) -> Self {
        Self { resolution }
    }

    /// Scale X coordinate from reference to actual screen
    pub fn scale_x(&self, x: i32) -> i32 {
        (x as f64 / REF_WIDTH as f64 * self.resolution.width as f64) as i32
    }

    /// Scale Y coordinate from reference to actual screen
    pub fn scale_y(&self, y: i32) -> i32 {
        (y as f64 / REF_HEIGHT as f64 * self.resolution.height as f64) as i32
    }

    /// Pixels added to the HD position when interpolating towards 2xHD
    pub fn extra_pixels(&self, hd_x: i32, double_hd_x: i32, bias: f64) -> f64 {
        let change_per_pixel = (double_hd_x - hd_x) as f64 / REF_WIDTH as f64;
        let screen_diff = self.resolution.width as f64 - REF_WIDTH as f64;
        screen_diff * (change_per_pixel + bias)
    }

    /// Interpolated x for a landmark that follows the right side of the UI.
    ///
    /// The drift `bias` only applies past 3840 pixels wide; the measurements
    /// are exact up to there.
    pub fn right_anchored_x(&self, hd_x: i32, double_hd_x: i32, bias: f64) -> i32 {
        let bias = if self.resolution.width <= DOUBLE_HD_WIDTH {
            0.0
        } else {
            bias
        };
        (hd_x as f64 + self.extra_pixels(hd_x, double_hd_x, bias)) as i32
    }

    /// Interpolated x for a landmark that follows the left side of the UI
    pub fn left_anchored_x(&self, hd_x: i32, double_hd_x: i32) -> i32 {
        (hd_x as f64 + self.extra_pixels(hd_x, double_hd_x, 0.0)) as i32
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }
}

/// Rectangle clicks are spread over to advance dialogue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HitBox {
    pub min_x: i32,
    pub max_x: i32,
    pub min_y: i32,
    pub max_y: i32,
}

impl HitBox {
    pub fn contains(&self, x: i32, y: i32) -> bool {
        (self.min_x..=self.max_x).contains(&x) && (self.min_y..=self.max_y).contains(&y)
    }
}

/// A single pixel location
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Probe {
    pub x: i32,
    pub y: i32,
}

impl Probe {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Every coordinate the skipper needs, computed once at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenGeometry {
    pub resolution: Resolution,
    pub bottom_dialogue: HitBox,
    pub playing_icon: Probe,
    pub dialogue_icon_x: i32,
    pub dialogue_icon_lower_y: i32,
    pub dialogue_icon_higher_y: i32,
    pub loading_screen: Probe,
}

impl ScreenGeometry {
    /// Derive all probes for a resolution
    pub fn new(resolution: Resolution) -> Self {
        use calibration::*;

        let model = CoordinateModel::new(resolution);
        let wide = resolution.is_non_standard_ratio();

        let (min_x, max_x) = if wide {
            let (hd, dhd, bias) = DIALOGUE_MIN_X;
            let min_x = model.right_anchored_x(hd, dhd, bias);
            let (hd, dhd, bias) = DIALOGUE_MAX_X;
            (min_x, model.right_anchored_x(hd, dhd, bias))
        } else {
            (
                model.scale_x(DIALOGUE_MIN_X.0),
                model.scale_x(DIALOGUE_MAX_X.0),
            )
        };
        let bottom_dialogue = HitBox {
            min_x,
            max_x,
            min_y: model.scale_y(DIALOGUE_MIN_Y),
            max_y: model.scale_y(DIALOGUE_MAX_Y),
        };

        let playing_icon_x = if wide {
            let (hd, dhd) = AUTOPLAY_ICON_X;
            model.left_anchored_x(hd, dhd).min(AUTOPLAY_X_CLAMP)
        } else {
            model.scale_x(AUTOPLAY_ICON_X.0)
        };
        let playing_icon = Probe::new(playing_icon_x, model.scale_y(AUTOPLAY_ICON_Y));

        let (dialogue_icon_x, (lower_y, higher_y)) = if wide {
            let (hd, dhd, bias) = DIALOGUE_ICON_X;
            (model.right_anchored_x(hd, dhd, bias), DIALOGUE_ICON_Y_WIDE)
        } else {
            (model.scale_x(DIALOGUE_ICON_X.0), DIALOGUE_ICON_Y)
        };

        Self {
            resolution,
            bottom_dialogue,
            playing_icon,
            dialogue_icon_x,
            dialogue_icon_lower_y: model.scale_y(lower_y),
            dialogue_icon_higher_y: model.scale_y(higher_y),
            loading_screen: Probe::new(model.scale_x(LOADING_X), model.scale_y(LOADING_Y)),
        }
    }

    pub fn dialogue_icon_lower(&self) -> Probe {
        Probe::new(self.dialogue_icon_x, self.dialogue_icon_lower_y)
    }

    pub fn dialogue_icon_higher(&self) -> Probe {
        Probe::new(self.dialogue_icon_x, self.dialogue_icon_higher_y)
    }
}

impl Default for ScreenGeometry {
    fn default() -> Self {
        Self::new(Resolution::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geometry(width: u32, height: u32) -> ScreenGeometry {
        let resolution = Resolution::new(width, height);
        assert!(resolution.is_valid());
        ScreenGeometry::new(resolution)
    }

    #[test]
    fn test_reference_resolution_is_identity() {
        let geo = geometry(1920, 1080);

        assert_eq!(geo.bottom_dialogue.min_x, 1300);
        assert_eq!(geo.bottom_dialogue.max_x, 1700);
        assert_eq!(geo.bottom_dialogue.min_y, 790);
        assert_eq!(geo.bottom_dialogue.max_y, 800);
        assert_eq!(geo.playing_icon, Probe::new(84, 46));
        assert_eq!(geo.dialogue_icon_lower(), Probe::new(1301, 808));
        assert_eq!(geo.dialogue_icon_higher(), Probe::new(1301, 790));
        assert_eq!(geo.loading_screen, Probe::new(1200, 700));
    }

    #[test]
    fn test_coordinate_scaling() {
        let model = CoordinateModel::new(Resolution::new(2560, 1440));

        assert_eq!(model.scale_x(960), 1280);
        assert_eq!(model.scale_y(540), 720);
    }

    #[test]
    fn test_16_9_resolutions_scale_linearly() {
        for (width, height) in [(1920, 1080), (2560, 1440), (3840, 2160), (5120, 2880)] {
            let resolution = Resolution::new(width, height);
            assert!(!resolution.is_non_standard_ratio());

            let model = CoordinateModel::new(resolution);
            let geo = ScreenGeometry::new(resolution);
            assert_eq!(geo.bottom_dialogue.min_x, model.scale_x(1300));
            assert_eq!(geo.bottom_dialogue.max_x, model.scale_x(1700));
            assert_eq!(geo.playing_icon.x, model.scale_x(84));
            assert_eq!(geo.dialogue_icon_x, model.scale_x(1301));
            assert_eq!(geo.dialogue_icon_lower_y, model.scale_y(808));
        }
    }

    #[test]
    fn test_known_16_9_values() {
        let geo = geometry(2560, 1440);
        assert_eq!(geo.bottom_dialogue.min_x, 1733);
        assert_eq!(geo.bottom_dialogue.max_x, 2266);
        assert_eq!(geo.playing_icon, Probe::new(112, 61));
        assert_eq!(geo.loading_screen, Probe::new(1600, 933));
    }

    #[test]
    fn test_narrow_non_16_9_stays_linear() {
        // 1366x768 is not exactly 16:9 but is not wider than the reference
        let resolution = Resolution::new(1366, 768);
        assert!(!resolution.is_non_standard_ratio());

        let geo = ScreenGeometry::new(resolution);
        assert_eq!(geo.bottom_dialogue.min_x, 924);
        assert_eq!(geo.dialogue_icon_lower_y, 574);
    }

    #[test]
    fn test_double_hd_ultrawide_hits_calibration_points() {
        let geo = geometry(3840, 1080);

        assert_eq!(geo.bottom_dialogue.min_x, 2734);
        assert_eq!(geo.bottom_dialogue.max_x, 3303);
        assert_eq!(geo.playing_icon, Probe::new(230, 46));
        assert_eq!(geo.dialogue_icon_x, 2770);
        assert_eq!(geo.dialogue_icon_lower_y, 810);
        assert_eq!(geo.dialogue_icon_higher_y, 792);
        assert_eq!(geo.loading_screen, Probe::new(2400, 700));
    }

    #[test]
    fn test_ultrawide_differs_from_linear_by_extra_pixels() {
        let resolution = Resolution::new(2560, 1080);
        let model = CoordinateModel::new(resolution);
        let geo = ScreenGeometry::new(resolution);

        // below 3840 wide the drift bias is dropped
        let expected = (1300.0 + model.extra_pixels(1300, 2734, 0.0)) as i32;
        assert_eq!(geo.bottom_dialogue.min_x, expected);
        assert_eq!(geo.bottom_dialogue.min_x, 1778);
        assert_ne!(geo.bottom_dialogue.min_x, model.scale_x(1300));

        assert_eq!(geo.bottom_dialogue.max_x, 2234);
        assert_eq!(geo.playing_icon.x, 132);
        assert_eq!(geo.dialogue_icon_x, 1790);
    }

    #[test]
    fn test_bias_applies_beyond_double_hd() {
        let resolution = Resolution::new(5120, 1440);
        let model = CoordinateModel::new(resolution);
        let geo = ScreenGeometry::new(resolution);

        assert_eq!(geo.bottom_dialogue.min_x, 3789);
        assert_eq!(geo.bottom_dialogue.max_x, 4323);
        assert_eq!(geo.dialogue_icon_x, 3813);
        assert_ne!(
            geo.bottom_dialogue.min_x,
            model.right_anchored_x(1300, 2734, 0.0)
        );
    }

    #[test]
    fn test_left_anchored_autoplay_is_clamped() {
        // unclamped value reaches 231 at 3854 wide
        let model = CoordinateModel::new(Resolution::new(3854, 1080));
        assert_eq!(model.left_anchored_x(84, 230), 231);
        assert_eq!(geometry(3854, 1080).playing_icon.x, 230);

        // still exact at the calibration point and just past it
        assert_eq!(geometry(3840, 1080).playing_icon.x, 230);
        assert_eq!(geometry(3853, 1080).playing_icon.x, 230);

        let model = CoordinateModel::new(Resolution::new(5120, 1440));
        assert_eq!(model.left_anchored_x(84, 230), 327);
        assert_eq!(geometry(5120, 1440).playing_icon.x, 230);
    }

    #[test]
    fn test_hit_box_contains() {
        let geo = geometry(1920, 1080);
        assert!(geo.bottom_dialogue.contains(1500, 795));
        assert!(!geo.bottom_dialogue.contains(1200, 795));
        assert!(!geo.bottom_dialogue.contains(1500, 801));
    }

    #[test]
    fn test_resolution_validity() {
        assert!(Resolution::new(1920, 1080).is_valid());
        assert!(!Resolution::new(0, 1080).is_valid());
        assert!(!Resolution::new(1920, 0).is_valid());
        assert_eq!(Resolution::new(3440, 1440).to_string(), "3440x1440");
    }
}
