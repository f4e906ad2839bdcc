#[derive(Debug, Clone, Copy)]
pub enum PageSize {
    A4,
    Letter,
}

impl PageSize {
    /// (width, height) in millimeters, portrait.
    pub fn dimensions(self) -> (f32, f32) {
        match self {
            PageSize::A4 => (210.0, 297.0),
            PageSize::Letter => (215.9, 279.4),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Margin {
    pub top: f32,
    pub bottom: f32,
    pub left: f32,
    pub right: f32,
}

impl Default for Margin {
    fn default() -> Self {
        Margin::uniform(20.0)
    }
}

impl Margin {
    pub fn uniform(size: f32) -> Self {
        Margin { top: size, bottom: size, left: size, right: size }
    }
}

/// Geometry of a fixed page, in millimeters. The pagination planner and the
/// fixed-page renderer both derive their capacity numbers from this.
#[derive(Debug, Clone, Copy)]
pub struct PageGeometry {
    pub size: PageSize,
    pub margin: Margin,
}

impl Default for PageGeometry {
    fn default() -> Self {
        PageGeometry { size: PageSize::A4, margin: Margin::default() }
    }
}

impl PageGeometry {
    pub fn width(&self) -> f32 {
        self.size.dimensions().0
    }

    pub fn height(&self) -> f32 {
        self.size.dimensions().1
    }

    pub fn usable_width(&self) -> f32 {
        self.width() - self.margin.left - self.margin.right
    }

    pub fn usable_height(&self) -> f32 {
        self.height() - self.margin.top - self.margin.bottom
    }

    /// Top of the content area measured from the page bottom, the coordinate
    /// system the fixed-page renderer draws in.
    pub fn content_top(&self) -> f32 {
        self.height() - self.margin.top
    }

    pub fn content_bottom(&self) -> f32 {
        self.margin.bottom
    }
}
