use egui::{Align2, CornerRadius, FontId, Pos2, Rect, Stroke, StrokeKind};
use city_canvas_protocol::{RenderCommand, TextAlign};

use crate::theme::{self, ThemeMode};

/// Transform state for PushTransform/PopTransform.
#[derive(Debug, Clone, Copy)]
struct Transform {
    tx: f64,
    ty: f64,
    sx: f64,
    sy: f64,
}

impl Transform {
    fn identity() -> Self {
        Self {
            tx: 0.0,
            ty: 0.0,
            sx: 1.0,
            sy: 1.0,
        }
    }

    fn apply_x(&self, x: f64) -> f32 {
        (x * self.sx + self.tx) as f32
    }

    fn apply_y(&self, y: f64) -> f32 {
        (y * self.sy + self.ty) as f32
    }
}

/// Render a list of `RenderCommand` into an egui `Painter`.
///
/// `offset` is the top-left pixel position of the rendering area. Scale
/// components may be negative (the grid view flips Y), so rectangles are
/// normalized from their two transformed corners and line widths use the
/// scale magnitude.
pub fn render_commands(
    painter: &mut egui::Painter,
    commands: &[RenderCommand],
    offset: Pos2,
    mode: ThemeMode,
) {
    let mut transform_stack: Vec<Transform> = vec![Transform::identity()];
    let mut clip_stack: Vec<Rect> = Vec::new();

    for cmd in commands {
        let tf = transform_stack
            .last()
            .copied()
            .unwrap_or(Transform::identity());
        match cmd {
            RenderCommand::DrawRect {
                rect,
                color,
                border_color,
            } => {
                let a = Pos2::new(
                    tf.apply_x(rect.x) + offset.x,
                    tf.apply_y(rect.y) + offset.y,
                );
                let b = Pos2::new(
                    tf.apply_x(rect.right()) + offset.x,
                    tf.apply_y(rect.bottom()) + offset.y,
                );
                let egui_rect = Rect::from_two_pos(a, b);

                // Cull off-screen
                if !painter.clip_rect().intersects(egui_rect) {
                    continue;
                }

                let fill = theme::resolve(*color, mode);
                painter.rect_filled(egui_rect, CornerRadius::ZERO, fill);

                if let Some(bc) = border_color {
                    let stroke_color = theme::resolve(*bc, mode);
                    painter.rect_stroke(
                        egui_rect,
                        CornerRadius::ZERO,
                        Stroke::new(1.0, stroke_color),
                        StrokeKind::Inside,
                    );
                }
            }

            RenderCommand::DrawLine {
                from,
                to,
                color,
                width,
            } => {
                let p1 = Pos2::new(tf.apply_x(from.x) + offset.x, tf.apply_y(from.y) + offset.y);
                let p2 = Pos2::new(tf.apply_x(to.x) + offset.x, tf.apply_y(to.y) + offset.y);
                // Width lives in transformed space; either axis scale
                // magnitude works because the grid scales uniformly.
                let screen_width = (*width * tf.sx.abs()) as f32;
                let line_color = theme::resolve(*color, mode);
                painter.line_segment([p1, p2], Stroke::new(screen_width, line_color));
            }

            RenderCommand::DrawText {
                position,
                text,
                color,
                font_size,
                align,
            } => {
                let pos = Pos2::new(
                    tf.apply_x(position.x) + offset.x,
                    tf.apply_y(position.y) + offset.y,
                );
                let size = *font_size as f32;
                if size < 1.0 {
                    continue;
                }
                let anchor = match align {
                    TextAlign::Left => Align2::LEFT_CENTER,
                    TextAlign::Center => Align2::CENTER_CENTER,
                    TextAlign::Right => Align2::RIGHT_CENTER,
                };
                let text_color = theme::resolve(*color, mode);
                painter.text(pos, anchor, text, FontId::proportional(size), text_color);
            }

            RenderCommand::SetClip { rect } => {
                let a = Pos2::new(
                    tf.apply_x(rect.x) + offset.x,
                    tf.apply_y(rect.y) + offset.y,
                );
                let b = Pos2::new(
                    tf.apply_x(rect.right()) + offset.x,
                    tf.apply_y(rect.bottom()) + offset.y,
                );
                let clip_rect = Rect::from_two_pos(a, b);
                clip_stack.push(painter.clip_rect());
                let intersected = painter.clip_rect().intersect(clip_rect);
                painter.set_clip_rect(intersected);
            }

            RenderCommand::ClearClip => {
                if let Some(prev) = clip_stack.pop() {
                    painter.set_clip_rect(prev);
                }
            }

            RenderCommand::PushTransform { translate, scale } => {
                let parent = tf;
                transform_stack.push(Transform {
                    tx: parent.tx + translate.x * parent.sx,
                    ty: parent.ty + translate.y * parent.sy,
                    sx: parent.sx * scale.x,
                    sy: parent.sy * scale.y,
                });
            }

            RenderCommand::PopTransform => {
                if transform_stack.len() > 1 {
                    transform_stack.pop();
                }
            }

            RenderCommand::BeginGroup { .. } | RenderCommand::EndGroup => {
                // Groups are semantic — no visual effect in egui
            }
        }
    }
}
