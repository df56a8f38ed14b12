use crate::config::InfoPanelPosition;
use crate::game::Placement;
use image::RgbaImage;
use log::debug;

/// Outer container of the display: layout attributes for the skin, the
/// background slot and whether a background video sits behind the view.
#[derive(Debug)]
pub struct Wrapper {
    panel_placement: Placement,
    info_panel_position: InfoPanelPosition,
    background: Option<RgbaImage>,
    has_video: bool,
}

impl Wrapper {
    pub const fn new(
        panel_placement: Placement,
        info_panel_position: InfoPanelPosition,
        has_video: bool,
    ) -> Self {
        Self {
            panel_placement,
            info_panel_position,
            background: None,
            has_video,
        }
    }

    #[inline(always)]
    pub const fn panel_placement(&self) -> Placement {
        self.panel_placement
    }

    #[inline(always)]
    pub const fn info_panel_position(&self) -> InfoPanelPosition {
        self.info_panel_position
    }

    #[inline(always)]
    pub const fn background(&self) -> Option<&RgbaImage> {
        self.background.as_ref()
    }

    #[inline(always)]
    pub const fn has_video(&self) -> bool {
        self.has_video
    }

    /// Fills the background slot. Only the first image is kept.
    pub fn attach_background(&mut self, image: RgbaImage) -> bool {
        if self.background.is_some() {
            return false;
        }
        debug!("Attached background {}x{}.", image.width(), image.height());
        self.background = Some(image);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::Wrapper;
    use crate::config::InfoPanelPosition;
    use crate::game::Placement;
    use image::RgbaImage;

    #[test]
    fn background_attaches_once() {
        let mut wrapper = Wrapper::new(Placement::Left, InfoPanelPosition::Bottom, false);
        assert!(wrapper.background().is_none());
        assert!(wrapper.attach_background(RgbaImage::new(2, 2)));
        assert!(!wrapper.attach_background(RgbaImage::new(8, 8)));
        assert_eq!(wrapper.background().map(|i| i.dimensions()), Some((2, 2)));
        assert_eq!(wrapper.panel_placement(), Placement::Left);
        assert_eq!(wrapper.info_panel_position(), InfoPanelPosition::Bottom);
    }
}
