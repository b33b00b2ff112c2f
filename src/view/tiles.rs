// Module for the tile set canvas and the selected tile's controls.
use iced::{
    alignment::Vertical,
    mouse,
    widget::{
        button, canvas, column, image, row, text,
        scrollable::{Direction, Scrollbar},
        Scrollable,
    },
    Element, Length, Point, Rectangle, Size,
};
use sms_gfx_editor::{canvas::Surface, common::PixelCoord, message::Message, tileset::TileSet};

use crate::{App, GuiMessage};

struct TileCanvas<'a> {
    image: &'a image::Handle,
    tile_set: &'a TileSet,
    width: f32,
    height: f32,
    scale: f32,
}

#[derive(Clone, Copy, Default, PartialEq, Eq, Debug)]
struct InternalState {
    hovering: bool,
}

impl TileCanvas<'_> {
    fn pixel_coords(&self, p: Point) -> (PixelCoord, PixelCoord) {
        (
            (p.x / self.scale).floor() as PixelCoord,
            (p.y / self.scale).floor() as PixelCoord,
        )
    }
}

impl canvas::Program<GuiMessage> for TileCanvas<'_> {
    type State = InternalState;

    fn update(
        &self,
        state: &mut Self::State,
        event: canvas::Event,
        bounds: iced::Rectangle,
        cursor: mouse::Cursor,
    ) -> (canvas::event::Status, Option<GuiMessage>) {
        let Some(p) = cursor.position_in(bounds) else {
            if state.hovering {
                state.hovering = false;
                return (
                    canvas::event::Status::Ignored,
                    Some(GuiMessage::Editor(Message::PointerLeft)),
                );
            }
            return (canvas::event::Status::Ignored, None);
        };
        let (x, y) = self.pixel_coords(p);
        let message = match event {
            canvas::Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left)) => {
                Message::PointerDown { x, y }
            }
            canvas::Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Right)) => {
                Message::SelectTile(self.tile_set.get_tile_index_by_coordinate(x, y))
            }
            canvas::Event::Mouse(mouse::Event::ButtonReleased(mouse::Button::Left)) => {
                Message::PointerUp
            }
            canvas::Event::Mouse(mouse::Event::CursorMoved { .. }) => {
                state.hovering = true;
                Message::PointerMove { x, y }
            }
            _ => return (canvas::event::Status::Ignored, None),
        };
        (canvas::event::Status::Captured, Some(GuiMessage::Editor(message)))
    }

    fn draw(
        &self,
        _state: &InternalState,
        renderer: &iced::Renderer,
        _theme: &iced::Theme,
        bounds: iced::Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<canvas::Geometry> {
        let mut frame = canvas::Frame::new(renderer, bounds.size());
        let image = iced::advanced::image::Image::new(self.image.clone())
            .filter_method(image::FilterMethod::Nearest)
            .snap(true);
        frame.draw_image(
            Rectangle::new(
                Point::ORIGIN,
                Size {
                    width: self.width,
                    height: self.height,
                },
            ),
            image,
        );
        vec![frame.into_geometry()]
    }

    fn mouse_interaction(
        &self,
        _interaction: &Self::State,
        bounds: iced::Rectangle,
        cursor: mouse::Cursor,
    ) -> mouse::Interaction {
        if cursor.is_over(bounds) {
            mouse::Interaction::Crosshair
        } else {
            mouse::Interaction::default()
        }
    }
}

pub fn tile_canvas_view(app: &App) -> Element<GuiMessage> {
    // The composited frame is already at the display scale.
    let width = app.frame.width() as f32;
    let height = app.frame.height() as f32;
    Scrollable::with_direction(
        canvas(TileCanvas {
            image: &app.image,
            tile_set: &app.state.project.tile_set,
            width,
            height,
            scale: app.state.canvas.scale() as f32,
        })
        .width(width)
        .height(height),
        Direction::Both {
            vertical: Scrollbar::default(),
            horizontal: Scrollbar::default(),
        },
    )
    .width(Length::Fill)
    .height(Length::Fill)
    .into()
}

fn tile_button(label: &str, message: Option<Message>) -> button::Button<'_, GuiMessage> {
    button(text(label))
        .style(button::secondary)
        .on_press_maybe(message.map(GuiMessage::Editor))
}

pub fn tile_controls_view(app: &App) -> Element<GuiMessage> {
    let selected = app.state.canvas.selected_tile();
    let on = |f: fn(usize) -> Message| selected.map(f);
    let heading = match selected {
        Some(idx) => format!("Tile {}", idx),
        None => "Tiles (right-click to select)".to_string(),
    };

    column![
        row![
            text(heading),
            button(text("\u{F64D}").font(iced_fonts::BOOTSTRAP_FONT))
                .style(button::success)
                .on_press(GuiMessage::Editor(Message::AddTile)),
            button(text("\u{F63B}").font(iced_fonts::BOOTSTRAP_FONT))
                .style(button::danger)
                .on_press_maybe(on(Message::RemoveTile).map(GuiMessage::Editor)),
        ]
        .spacing(10)
        .align_y(Vertical::Center),
        row![
            tile_button("Insert before", on(Message::InsertTileBefore)),
            tile_button("Insert after", on(Message::InsertTileAfter)),
            tile_button("Clone", on(Message::CloneTile)),
        ]
        .spacing(5),
        row![
            tile_button("Move left", on(Message::MoveTileLeft)),
            tile_button("Move right", on(Message::MoveTileRight)),
            tile_button("Mirror H", on(Message::MirrorTileHorizontal)),
            tile_button("Mirror V", on(Message::MirrorTileVertical)),
        ]
        .spacing(5),
    ]
    .spacing(5)
    .into()
}
