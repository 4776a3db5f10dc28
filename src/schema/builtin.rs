//! Built-in element kinds

use crate::expr::Expr;

use super::{alias, binary, ElementSchema};

const RECT_ATTRIBUTES: &[&str] = &["width", "height", "x", "y", "rx", "ry"];
const CIRCLE_ATTRIBUTES: &[&str] = &["cx", "cy", "r"];

/// `rect`: edges derived from position and size
#[derive(Debug, Default, Clone, Copy)]
pub struct RectSchema;

impl ElementSchema for RectSchema {
    fn kind(&self) -> &str {
        "rect"
    }

    fn accepted_attributes(&self) -> &[&'static str] {
        RECT_ATTRIBUTES
    }

    fn derive(&self, scope: &str) -> Vec<(&'static str, Expr)> {
        vec![
            ("left", alias(scope, "x")),
            ("right", binary(scope, "x", "+", "width")),
            ("top", alias(scope, "y")),
            ("bottom", binary(scope, "y", "+", "height")),
        ]
    }
}

/// `circle`: bounding edges derived from center and radius
#[derive(Debug, Default, Clone, Copy)]
pub struct CircleSchema;

impl ElementSchema for CircleSchema {
    fn kind(&self) -> &str {
        "circle"
    }

    fn accepted_attributes(&self) -> &[&'static str] {
        CIRCLE_ATTRIBUTES
    }

    fn derive(&self, scope: &str) -> Vec<(&'static str, Expr)> {
        vec![
            ("left", binary(scope, "cx", "-", "r")),
            ("right", binary(scope, "cx", "+", "r")),
            ("top", binary(scope, "cy", "-", "r")),
            ("bottom", binary(scope, "cy", "+", "r")),
        ]
    }
}
