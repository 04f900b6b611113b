use glam::IVec2;

/// Integer pixel rectangle used for control bounds.
#[derive(Copy, Clone, Eq, PartialEq, Default, Debug)]
pub struct IRect {
    pub position: IVec2,
    pub size: IVec2,
}

impl IRect {
    pub const ZERO: IRect = IRect {
        position: IVec2::ZERO,
        size: IVec2::ZERO,
    };

    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        IRect {
            position: IVec2::new(x, y),
            size: IVec2::new(width, height),
        }
    }
    pub fn from_size(size: IVec2) -> Self {
        IRect {
            position: IVec2::ZERO,
            size,
        }
    }

    pub fn x(&self) -> i32 {
        self.position.x
    }
    pub fn y(&self) -> i32 {
        self.position.y
    }
    pub fn width(&self) -> i32 {
        self.size.x
    }
    pub fn height(&self) -> i32 {
        self.size.y
    }

    /// Same position, new size.
    pub fn with_size(self, size: IVec2) -> IRect {
        IRect {
            position: self.position,
            size,
        }
    }
    pub fn with_position(self, position: IVec2) -> IRect {
        IRect {
            position,
            size: self.size,
        }
    }

    pub fn contains(&self, point: IVec2) -> bool {
        self.position.x <= point.x
            && self.position.y <= point.y
            && self.position.x + self.size.x > point.x
            && self.position.y + self.size.y > point.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_is_half_open() {
        let rect = IRect::new(10, 20, 5, 5);
        assert!(rect.contains(IVec2::new(10, 20)));
        assert!(rect.contains(IVec2::new(14, 24)));
        assert!(!rect.contains(IVec2::new(15, 24)));
        assert!(!rect.contains(IVec2::new(14, 25)));
    }

    #[test]
    fn with_size_keeps_position() {
        let rect = IRect::new(3, 4, 1, 1).with_size(IVec2::new(30, 40));
        assert_eq!(rect, IRect::new(3, 4, 30, 40));
    }
}
