use primhash_lib::math::bounds::Aabb;

/// An 8-bit RGB color.
#[derive(Clone, Copy, Debug, Default, Hash, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const CYAN: Self = Self::new(0, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Line-based debug drawing, e.g. a renderer's line batcher.
pub trait DebugDraw {
    fn draw_wire_box(&mut self, aabb: Aabb, color: Color);
}

impl<T: DebugDraw + ?Sized> DebugDraw for &mut T {
    fn draw_wire_box(&mut self, aabb: Aabb, color: Color) {
        (**self).draw_wire_box(aabb, color);
    }
}

/// Collects every box instead of drawing it.
impl DebugDraw for Vec<(Aabb, Color)> {
    fn draw_wire_box(&mut self, aabb: Aabb, color: Color) {
        self.push((aabb, color));
    }
}
