// SPDX-License-Identifier: MIT OR Apache-2.0
//! Bindings between players and the visuals they animate.

use crate::value::{Color, Scale, UNIT_SCALE};
use std::cell::RefCell;
use std::rc::Rc;

/// A visual whose color and scale can be animated.
///
/// Implemented by the host for its images, labels or panels. The player only
/// reads and writes through this trait and never touches layout or rendering.
pub trait AnimationTarget {
    /// Current rendered color
    fn color(&self) -> Color;

    /// Write a new color
    fn set_color(&mut self, color: Color);

    /// Current local scale
    fn scale(&self) -> Scale;

    /// Write a new local scale
    fn set_scale(&mut self, scale: Scale);

    /// Whether the target can be scheduled (e.g. it is active in the hierarchy)
    fn is_active(&self) -> bool {
        true
    }
}

/// In-memory target, for headless hosts and tests
#[derive(Debug, Clone, PartialEq)]
pub struct SimpleTarget {
    /// Color
    pub color: Color,
    /// Scale
    pub scale: Scale,
    /// Activity flag
    pub active: bool,
}

impl SimpleTarget {
    /// Create an active target with unit scale and white color
    pub fn new() -> Self {
        Self {
            color: Color::WHITE,
            scale: UNIT_SCALE,
            active: true,
        }
    }

    /// Wrap in a shared handle so the host can keep reading it
    pub fn shared(self) -> Rc<RefCell<SimpleTarget>> {
        Rc::new(RefCell::new(self))
    }
}

impl Default for SimpleTarget {
    fn default() -> Self {
        Self::new()
    }
}

impl AnimationTarget for SimpleTarget {
    fn color(&self) -> Color {
        self.color
    }

    fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    fn scale(&self) -> Scale {
        self.scale
    }

    fn set_scale(&mut self, scale: Scale) {
        self.scale = scale;
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

impl<T: AnimationTarget + ?Sized> AnimationTarget for Rc<RefCell<T>> {
    fn color(&self) -> Color {
        self.borrow().color()
    }

    fn set_color(&mut self, color: Color) {
        self.borrow_mut().set_color(color);
    }

    fn scale(&self) -> Scale {
        self.borrow().scale()
    }

    fn set_scale(&mut self, scale: Scale) {
        self.borrow_mut().set_scale(scale);
    }

    fn is_active(&self) -> bool {
        self.borrow().is_active()
    }
}
