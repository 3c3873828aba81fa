//! Lowering of pages and elements into drawing instructions.

use crate::template::template_commands;
use kurbo::{BezPath, Point, Rect, Size};
use moleskine_core::Page;
use moleskine_core::elements::{Element, LINK_FONT_SIZE, SerializableColor, ShapeElement};
use peniko::Color;
use std::f64::consts::FRAC_PI_6;

/// Length of each arrow head segment, in canvas units.
pub const ARROW_HEAD_LENGTH: f64 = 15.0;
/// Angle between an arrow head segment and the shaft.
pub const ARROW_HEAD_ANGLE: f64 = FRAC_PI_6;

/// One backend-independent drawing instruction in canvas coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Fill the whole surface.
    Clear(Color),
    /// Fill a closed path (non-zero winding).
    FillPath { path: BezPath, color: Color, opacity: f64 },
    StrokePath { path: BezPath, color: Color, width: f64, opacity: f64 },
    StrokeRect { rect: Rect, color: Color, width: f64 },
    /// Ellipse inscribed in `rect`.
    StrokeEllipse { rect: Rect, color: Color, width: f64 },
    /// Label whose baseline starts at `origin`.
    Text { origin: Point, text: String, size: f64, color: Color },
    /// Image identified by URL, stretched to `rect`.
    Image { key: String, rect: Rect },
}

impl DrawCommand {
    /// URL of the image this command needs, if any.
    pub fn image_key(&self) -> Option<&str> {
        match self {
            DrawCommand::Image { key, .. } => Some(key),
            _ => None,
        }
    }
}

/// Everything needed to draw `page` at the given logical size, back to front:
/// background colour, background image, template, then elements in z-order.
pub fn page_commands(page: &Page, size: Size) -> Vec<DrawCommand> {
    let mut commands = vec![DrawCommand::Clear(page.background.into())];
    if let Some(url) = &page.background_image {
        commands.push(DrawCommand::Image {
            key: url.clone(),
            rect: size.to_rect(),
        });
    }
    commands.extend(template_commands(page.template, size));
    commands.extend(element_commands(page.elements()));
    commands
}

/// Lower elements in order.
pub fn element_commands(elements: &[Element]) -> Vec<DrawCommand> {
    elements.iter().map(element_command).collect()
}

fn element_command(element: &Element) -> DrawCommand {
    match element {
        Element::Stroke(stroke) => DrawCommand::FillPath {
            path: stroke.outline_path(),
            color: stroke.color.into(),
            opacity: stroke.opacity(),
        },
        Element::Line(shape) => DrawCommand::StrokePath {
            path: segment_path(shape.start(), shape.end()),
            color: shape.color.into(),
            width: shape.width,
            opacity: 1.0,
        },
        Element::Arrow(shape) => DrawCommand::StrokePath {
            path: arrow_path(shape),
            color: shape.color.into(),
            width: shape.width,
            opacity: 1.0,
        },
        Element::Rectangle(shape) => DrawCommand::StrokeRect {
            rect: shape.bounds(),
            color: shape.color.into(),
            width: shape.width,
        },
        Element::Circle(shape) => DrawCommand::StrokeEllipse {
            rect: shape.bounds(),
            color: shape.color.into(),
            width: shape.width,
        },
        Element::Text(text) => DrawCommand::Text {
            origin: text.origin(),
            text: text.text.clone(),
            size: text.font_size,
            color: text.color.into(),
        },
        Element::Link(link) => DrawCommand::Text {
            origin: link.origin(),
            text: if link.label.is_empty() {
                link.url.clone()
            } else {
                link.label.clone()
            },
            size: LINK_FONT_SIZE,
            color: SerializableColor::link_blue().into(),
        },
        Element::Image(image) => DrawCommand::Image {
            key: image.url.clone(),
            rect: image.bounds(),
        },
    }
}

fn segment_path(from: Point, to: Point) -> BezPath {
    let mut path = BezPath::new();
    path.move_to(from);
    path.line_to(to);
    path
}

/// End points of the two head segments drawn back from `end`.
pub fn arrow_heads(start: Point, end: Point) -> [Point; 2] {
    let angle = (end.y - start.y).atan2(end.x - start.x);
    [angle - ARROW_HEAD_ANGLE, angle + ARROW_HEAD_ANGLE].map(|a| {
        Point::new(
            end.x - ARROW_HEAD_LENGTH * a.cos(),
            end.y - ARROW_HEAD_LENGTH * a.sin(),
        )
    })
}

fn arrow_path(shape: &ShapeElement) -> BezPath {
    let (start, end) = (shape.start(), shape.end());
    let mut path = segment_path(start, end);
    for head in arrow_heads(start, end) {
        path.move_to(end);
        path.line_to(head);
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use moleskine_core::elements::{FreehandStroke, ImageElement, LinkElement, StrokeKind, TextElement};
    use moleskine_core::geometry::StrokePoint;
    use moleskine_core::Template;

    fn black() -> SerializableColor {
        SerializableColor::black()
    }

    #[test]
    fn test_arrow_heads_at_thirty_degrees() {
        let [a, b] = arrow_heads(Point::new(0.0, 0.0), Point::new(100.0, 0.0));
        let half = ARROW_HEAD_LENGTH * FRAC_PI_6.cos();
        assert!((a.x - (100.0 - half)).abs() < 1e-9);
        assert!((b.x - (100.0 - half)).abs() < 1e-9);
        // `angle - 30°` swings below a left-to-right shaft (y grows downward).
        assert!((a.y - 7.5).abs() < 1e-9);
        assert!((b.y + 7.5).abs() < 1e-9);
        assert!((a.distance(Point::new(100.0, 0.0)) - ARROW_HEAD_LENGTH).abs() < 1e-9);
    }

    #[test]
    fn test_shapes_are_normalized() {
        let rect = Element::Rectangle(ShapeElement::new(black(), 2.0, 100.0, 80.0, 10.0, 20.0));
        let circle = Element::Circle(ShapeElement::new(black(), 2.0, 50.0, 0.0, 0.0, 40.0));
        let commands = element_commands(&[rect, circle]);
        match &commands[0] {
            DrawCommand::StrokeRect { rect, .. } => assert_eq!(*rect, Rect::new(10.0, 20.0, 100.0, 80.0)),
            other => panic!("unexpected {other:?}"),
        }
        match &commands[1] {
            DrawCommand::StrokeEllipse { rect, .. } => assert_eq!(*rect, Rect::new(0.0, 0.0, 50.0, 40.0)),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_highlighter_is_translucent_fill() {
        let points = vec![
            StrokePoint::new(0.0, 0.0, 0.5),
            StrokePoint::new(10.0, 5.0, 0.5),
            StrokePoint::new(20.0, 10.0, 0.5),
        ];
        let stroke = FreehandStroke::new(StrokeKind::Highlighter, black(), 3.0, points);
        match &element_commands(&[Element::Stroke(stroke)])[0] {
            DrawCommand::FillPath { opacity, path, .. } => {
                assert!((opacity - 0.3).abs() < 1e-12);
                assert!(!path.elements().is_empty());
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_link_uses_fixed_size_and_falls_back_to_url() {
        let link = LinkElement::new("https://example.com".into(), String::new(), 5.0, 6.0);
        match &element_commands(&[Element::Link(link)])[0] {
            DrawCommand::Text { text, size, origin, .. } => {
                assert_eq!(text, "https://example.com");
                assert_eq!(*size, LINK_FONT_SIZE);
                assert_eq!(*origin, Point::new(5.0, 6.0));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_page_command_order() {
        let mut page = Page::with_background_image("data:image/png;base64,AAAA".into(), None, Some(1));
        page.template = Template::Lines;
        page.push(Element::Text(TextElement::new(black(), "hi".into(), 1.0, 2.0, 20.0)));
        page.push(Element::Image(ImageElement::new("memory://a.png".into(), 0.0, 0.0, 10.0, 10.0)));

        let commands = page_commands(&page, Size::new(400.0, 300.0));
        assert!(matches!(commands[0], DrawCommand::Clear(_)));
        assert_eq!(commands[1].image_key(), Some("data:image/png;base64,AAAA"));
        let n = commands.len();
        assert!(matches!(commands[n - 2], DrawCommand::Text { .. }));
        assert_eq!(commands[n - 1].image_key(), Some("memory://a.png"));
        // Template sits between the background and the elements.
        assert!(commands[2..n - 2].iter().all(|c| matches!(c, DrawCommand::StrokePath { .. })));
        assert!(n > 4);
    }
}
