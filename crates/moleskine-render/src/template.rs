//! Procedural page templates.

use crate::commands::DrawCommand;
use kurbo::{BezPath, Circle, Point, Shape, Size};
use moleskine_core::Template;
use peniko::Color;

pub const GRID_PITCH: f64 = 20.0;
pub const LINE_PITCH: f64 = 30.0;
/// Baseline of the first ruled line.
pub const LINES_TOP: f64 = 60.0;
pub const DOT_PITCH: f64 = 20.0;
pub const DOT_RADIUS: f64 = 1.0;
/// x of the Cornell cue-column rule.
pub const CORNELL_CUE_X: f64 = 200.0;
/// Height of the Cornell summary area at the bottom of the page.
pub const CORNELL_SUMMARY_HEIGHT: f64 = 200.0;

const GRID_COLOR: Color = Color::from_rgba8(229, 231, 235, 255);
const RULE_COLOR: Color = Color::from_rgba8(209, 213, 219, 255);
const DOT_COLOR: Color = Color::from_rgba8(156, 163, 175, 255);
const MARGIN_COLOR: Color = Color::from_rgba8(248, 113, 113, 255);

const GRID_WIDTH: f64 = 0.5;
const RULE_WIDTH: f64 = 1.0;

/// Background pattern for `template` covering a page of `size`.
pub fn template_commands(template: Template, size: Size) -> Vec<DrawCommand> {
    match template {
        Template::None => Vec::new(),
        Template::Grid => vec![grid(size)],
        Template::Lines => ruled(size, size.height).into_iter().collect(),
        Template::Dots => vec![dots(size)],
        Template::Cornell => cornell(size),
    }
}

fn stroke(path: BezPath, color: Color, width: f64) -> DrawCommand {
    DrawCommand::StrokePath {
        path,
        color,
        width,
        opacity: 1.0,
    }
}

fn grid(size: Size) -> DrawCommand {
    let mut path = BezPath::new();
    let mut x = GRID_PITCH;
    while x < size.width {
        path.move_to(Point::new(x, 0.0));
        path.line_to(Point::new(x, size.height));
        x += GRID_PITCH;
    }
    let mut y = GRID_PITCH;
    while y < size.height {
        path.move_to(Point::new(0.0, y));
        path.line_to(Point::new(size.width, y));
        y += GRID_PITCH;
    }
    stroke(path, GRID_COLOR, GRID_WIDTH)
}

/// Horizontal rules from `LINES_TOP` down to (excluding) `bottom`.
fn ruled(size: Size, bottom: f64) -> Option<DrawCommand> {
    let mut path = BezPath::new();
    let mut y = LINES_TOP;
    while y < bottom {
        path.move_to(Point::new(0.0, y));
        path.line_to(Point::new(size.width, y));
        y += LINE_PITCH;
    }
    (!path.elements().is_empty()).then(|| stroke(path, RULE_COLOR, RULE_WIDTH))
}

fn dots(size: Size) -> DrawCommand {
    let mut path = BezPath::new();
    let mut x = DOT_PITCH;
    while x < size.width {
        let mut y = DOT_PITCH;
        while y < size.height {
            path.extend(Circle::new(Point::new(x, y), DOT_RADIUS).path_elements(0.1));
            y += DOT_PITCH;
        }
        x += DOT_PITCH;
    }
    DrawCommand::FillPath {
        path,
        color: DOT_COLOR,
        opacity: 1.0,
    }
}

fn cornell(size: Size) -> Vec<DrawCommand> {
    let summary_y = (size.height - CORNELL_SUMMARY_HEIGHT).max(0.0);
    let mut commands: Vec<DrawCommand> = ruled(size, summary_y).into_iter().collect();

    let mut margins = BezPath::new();
    margins.move_to(Point::new(CORNELL_CUE_X, 0.0));
    margins.line_to(Point::new(CORNELL_CUE_X, summary_y));
    margins.move_to(Point::new(0.0, summary_y));
    margins.line_to(Point::new(size.width, summary_y));
    commands.push(stroke(margins, MARGIN_COLOR, RULE_WIDTH));
    commands
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::PathEl;

    fn move_targets(command: &DrawCommand) -> Vec<Point> {
        let path = match command {
            DrawCommand::StrokePath { path, .. } | DrawCommand::FillPath { path, .. } => path,
            other => panic!("unexpected {other:?}"),
        };
        path.elements()
            .iter()
            .filter_map(|el| match el {
                PathEl::MoveTo(p) => Some(*p),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_blank_template_draws_nothing() {
        assert!(template_commands(Template::None, Size::new(800.0, 600.0)).is_empty());
    }

    #[test]
    fn test_lines_start_at_sixty_with_pitch_thirty() {
        let commands = template_commands(Template::Lines, Size::new(400.0, 200.0));
        let ys: Vec<f64> = move_targets(&commands[0]).iter().map(|p| p.y).collect();
        assert_eq!(ys, vec![60.0, 90.0, 120.0, 150.0, 180.0]);
    }

    #[test]
    fn test_grid_pitch() {
        let commands = template_commands(Template::Grid, Size::new(100.0, 60.0));
        let starts = move_targets(&commands[0]);
        // Vertical lines at 20..80, horizontal at 20 and 40.
        assert_eq!(starts.len(), 4 + 2);
        assert_eq!(starts[0], Point::new(20.0, 0.0));
        assert_eq!(starts[4], Point::new(0.0, 20.0));
    }

    #[test]
    fn test_dots_are_filled_circles() {
        let commands = template_commands(Template::Dots, Size::new(50.0, 50.0));
        assert_eq!(commands.len(), 1);
        // 2 x 2 dots at 20 and 40.
        assert_eq!(move_targets(&commands[0]).len(), 4);
        assert!(matches!(commands[0], DrawCommand::FillPath { .. }));
    }

    #[test]
    fn test_cornell_rules() {
        let size = Size::new(1600.0, 1000.0);
        let commands = template_commands(Template::Cornell, size);
        assert_eq!(commands.len(), 2);
        let rules = move_targets(&commands[0]);
        assert!(rules.iter().all(|p| p.y < 800.0));
        assert_eq!(
            move_targets(&commands[1]),
            vec![Point::new(200.0, 0.0), Point::new(0.0, 800.0)]
        );
    }
}
