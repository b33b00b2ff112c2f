// Module for displaying and editing the 16 colours of palettes
use std::fmt;

use iced::{
    alignment::Vertical,
    mouse,
    widget::{button, canvas, column, pick_list, row, text, text_input, Row},
    Element, Length, Size,
};
use sms_gfx_editor::{
    colour::{native_colour_hex, System},
    common::{ColourIdx, PALETTE_SIZE},
    message::Message,
    palette::PaletteColour,
};

use crate::{App, GuiMessage};

#[derive(Debug)]
struct ColourBox {
    colour: PaletteColour,
    thickness: f32,
    selected: bool,
    transparent: bool,
    colour_idx: ColourIdx,
}

impl canvas::Program<GuiMessage> for ColourBox {
    // No internal state
    type State = ();

    fn update(
        &self,
        _interaction: &mut Self::State,
        event: canvas::Event,
        bounds: iced::Rectangle,
        cursor: mouse::Cursor,
    ) -> (canvas::event::Status, Option<GuiMessage>) {
        if cursor.position_in(bounds).is_none() {
            return (canvas::event::Status::Ignored, None);
        };

        match event {
            canvas::Event::Mouse(mouse::Event::ButtonPressed(button)) => {
                let message = match button {
                    mouse::Button::Left => Some(Message::SelectColour(self.colour_idx)),
                    // Right-click toggles the colour used as see-through.
                    mouse::Button::Right => Some(Message::SetTransparencyIndex(
                        (!self.transparent).then_some(self.colour_idx),
                    )),
                    _ => None,
                };
                (
                    canvas::event::Status::Captured,
                    message.map(GuiMessage::Editor),
                )
            }
            _ => (canvas::event::Status::Ignored, None),
        }
    }

    fn draw(
        &self,
        _state: &(),
        renderer: &iced::Renderer,
        theme: &iced::Theme,
        bounds: iced::Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<canvas::Geometry> {
        let mut frame = canvas::Frame::new(renderer, bounds.size());

        let thickness = self.thickness;
        let size = Size {
            width: frame.size().width - 2.0 * thickness,
            height: frame.size().height - 2.0 * thickness - 1.0,
        };
        let (r, g, b) = self.colour.rgb();
        frame.fill_rectangle(
            iced::Point {
                x: thickness,
                y: thickness,
            },
            size,
            iced::Color::from_rgb8(r, g, b),
        );

        if self.transparent {
            // Diagonal slash marks the see-through colour.
            let slash = canvas::Path::line(
                iced::Point::new(thickness, frame.size().height - thickness - 1.0),
                iced::Point::new(frame.size().width - thickness, thickness),
            );
            frame.stroke(
                &slash,
                canvas::Stroke {
                    width: 1.0,
                    style: iced::Color::from_rgb(0.5, 0.5, 0.5).into(),
                    ..Default::default()
                },
            );
        }

        if self.selected {
            let border_color = if theme.extended_palette().is_dark {
                iced::Color::WHITE
            } else {
                iced::Color::BLACK
            };
            let size = Size {
                width: frame.size().width - thickness,
                height: frame.size().height - thickness - 1.0,
            };
            frame.stroke_rectangle(
                iced::Point {
                    x: thickness / 2.0,
                    y: thickness / 2.0,
                },
                size,
                canvas::Stroke {
                    width: thickness,
                    style: border_color.into(),
                    ..Default::default()
                },
            );
        }

        vec![frame.into_geometry()]
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct PaletteChoice {
    idx: usize,
    title: String,
}

impl fmt::Display for PaletteChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.idx, self.title)
    }
}

pub fn palette_view(app: &App) -> Element<GuiMessage> {
    let state = &app.state;
    let palette_idx = state.palette_idx;
    let choices: Vec<PaletteChoice> = state
        .project
        .palette_list
        .palettes()
        .iter()
        .enumerate()
        .map(|(idx, p)| PaletteChoice {
            idx,
            title: p.title.clone(),
        })
        .collect();
    let Some(pal) = state.palette() else {
        return text("No palette").into();
    };
    let selected = choices.get(palette_idx).cloned();

    // Swatches show what the canvas shows, native colours included.
    let shown = if state.display_native {
        pal.native_preview()
    } else {
        pal.clone()
    };
    let mut colours_row: Row<GuiMessage> = Row::new();
    let size = 25.0;
    for (i, &colour) in shown.colours().iter().enumerate().take(PALETTE_SIZE) {
        let colour_idx = i as ColourIdx;
        colours_row = colours_row.push(
            canvas(ColourBox {
                colour,
                thickness: 2.0,
                selected: colour_idx == state.colour_idx,
                transparent: state.canvas.transparency_index() == Some(colour_idx),
                colour_idx,
            })
            .width(size)
            .height(size),
        );
    }

    let native = pal
        .colour(state.colour_idx)
        .map(|c| native_colour_hex(pal.system, c.rgb()))
        .unwrap_or_default();

    column![
        row![
            text("Palette"),
            pick_list(choices, selected, |c: PaletteChoice| {
                GuiMessage::Editor(Message::SelectPalette(c.idx))
            })
            .width(Length::Fill),
            button(text("\u{F64D}").font(iced_fonts::BOOTSTRAP_FONT))
                .style(button::success)
                .on_press(GuiMessage::Editor(Message::NewPalette)),
            button(text("\u{F63B}").font(iced_fonts::BOOTSTRAP_FONT))
                .style(button::danger)
                .on_press_maybe(
                    (state.project.palette_list.len() > 1)
                        .then_some(GuiMessage::Editor(Message::DeletePalette(palette_idx)))
                ),
        ]
        .spacing(10)
        .align_y(Vertical::Center),
        row![
            text("Name"),
            text_input("", &app.palette_title_edit)
                .on_input(GuiMessage::EditPaletteTitle)
                .on_submit(GuiMessage::Editor(Message::SetPaletteTitle {
                    palette_idx,
                    title: app.palette_title_edit.clone(),
                })),
            pick_list(
                [System::MasterSystem, System::GameGear],
                Some(pal.system),
                move |system| GuiMessage::Editor(Message::SetPaletteSystem {
                    palette_idx,
                    system
                })
            ),
        ]
        .spacing(10)
        .align_y(Vertical::Center),
        colours_row,
        row![
            text(format!("Colour {}", state.colour_idx)),
            text_input("#rrggbb", &app.colour_hex)
                .on_input(GuiMessage::EditColourHex)
                .on_submit(GuiMessage::SubmitColourHex)
                .width(100),
            text(format!("native ${}", native)),
        ]
        .spacing(10)
        .align_y(Vertical::Center),
    ]
    .spacing(5)
    .into()
}
