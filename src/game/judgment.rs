// Timing windows in seconds, ITG/SM values.
pub const TIMING_WINDOW_ADD_S: f32 = 0.0015; // +1.5ms padding applied by ITG/SM

pub const BASE_W1_S: f32 = 0.0215;
pub const BASE_W2_S: f32 = 0.0430;
pub const BASE_W3_S: f32 = 0.1020;
pub const BASE_W4_S: f32 = 0.1350;
pub const BASE_W5_S: f32 = 0.1800;

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum JudgeGrade {
    Fantastic, // W1
    Excellent, // W2
    Great,     // W3
    Decent,    // W4
    WayOff,    // W5
    Miss,
}

impl JudgeGrade {
    /// Lowercase key handed to skins through the render snapshot.
    #[inline(always)]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fantastic => "fantastic",
            Self::Excellent => "excellent",
            Self::Great => "great",
            Self::Decent => "decent",
            Self::WayOff => "way_off",
            Self::Miss => "miss",
        }
    }

    #[inline(always)]
    pub const fn breaks_combo(self) -> bool {
        matches!(self, Self::Decent | Self::WayOff | Self::Miss)
    }
}

#[inline(always)]
pub fn effective_windows_s() -> [f32; 5] {
    [
        BASE_W1_S + TIMING_WINDOW_ADD_S,
        BASE_W2_S + TIMING_WINDOW_ADD_S,
        BASE_W3_S + TIMING_WINDOW_ADD_S,
        BASE_W4_S + TIMING_WINDOW_ADD_S,
        BASE_W5_S + TIMING_WINDOW_ADD_S,
    ]
}

/// Grades a tap by its absolute timing error. Anything outside W5 is a miss.
pub fn grade_for_error(error_s: f32) -> JudgeGrade {
    let e = error_s.abs();
    let windows = effective_windows_s();
    if e <= windows[0] {
        JudgeGrade::Fantastic
    } else if e <= windows[1] {
        JudgeGrade::Excellent
    } else if e <= windows[2] {
        JudgeGrade::Great
    } else if e <= windows[3] {
        JudgeGrade::Decent
    } else if e <= windows[4] {
        JudgeGrade::WayOff
    } else {
        JudgeGrade::Miss
    }
}

#[cfg(test)]
mod tests {
    use super::{JudgeGrade, grade_for_error};

    #[test]
    fn grades_follow_window_edges() {
        assert_eq!(grade_for_error(0.0), JudgeGrade::Fantastic);
        assert_eq!(grade_for_error(-0.022), JudgeGrade::Fantastic);
        assert_eq!(grade_for_error(0.040), JudgeGrade::Excellent);
        assert_eq!(grade_for_error(0.100), JudgeGrade::Great);
        assert_eq!(grade_for_error(-0.130), JudgeGrade::Decent);
        assert_eq!(grade_for_error(0.180), JudgeGrade::WayOff);
        assert_eq!(grade_for_error(0.5), JudgeGrade::Miss);
    }

    #[test]
    fn only_low_grades_break_combo() {
        assert!(!JudgeGrade::Great.breaks_combo());
        assert!(JudgeGrade::Decent.breaks_combo());
        assert!(JudgeGrade::Miss.breaks_combo());
    }
}
