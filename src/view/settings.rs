use iced::{
    alignment::Vertical,
    widget::{button, checkbox, column, row, slider, text},
    Element,
};
use sms_gfx_editor::{
    canvas::{MAX_CURSOR_SIZE, MIN_CURSOR_SIZE},
    common::{MAX_SCALE, MIN_SCALE},
    message::{Message, Tool},
    project::BLANK_TILE_COLOUR,
};

use crate::{App, GuiMessage};

const MAX_TILE_WIDTH: u32 = 32;

fn tool_button(label: &str, tool: Tool, current: Tool) -> button::Button<'_, GuiMessage> {
    button(text(label))
        .style(if tool == current {
            button::primary
        } else {
            button::secondary
        })
        .on_press(GuiMessage::Editor(Message::SelectTool(tool)))
}

pub fn settings_view(app: &App) -> Element<GuiMessage> {
    let state = &app.state;
    let canvas = &state.canvas;
    let tile_width = state.project.tile_set.tile_width();
    let slider_width = u32::try_from(tile_width)
        .unwrap_or(MAX_TILE_WIDTH)
        .clamp(1, MAX_TILE_WIDTH);
    let edit = GuiMessage::Editor;

    column![
        row![
            tool_button("Pencil", Tool::Pencil, state.tool),
            tool_button("Bucket", Tool::Bucket, state.tool),
        ]
        .spacing(5),
        row![
            text(format!("Brush {}", canvas.cursor_size())).width(100),
            slider(MIN_CURSOR_SIZE..=MAX_CURSOR_SIZE, canvas.cursor_size(), move |v| {
                edit(Message::SetBrushSize(v))
            }),
        ]
        .spacing(10)
        .align_y(Vertical::Center),
        row![
            text(format!("Scale {}", canvas.scale())).width(100),
            slider(MIN_SCALE..=MAX_SCALE, canvas.scale(), move |v| {
                edit(Message::SetScale(v))
            }),
        ]
        .spacing(10)
        .align_y(Vertical::Center),
        row![
            text(format!("Width {}", tile_width)).width(100),
            slider(1..=MAX_TILE_WIDTH, slider_width, move |v: u32| {
                edit(Message::SetTileWidth(v as usize))
            }),
        ]
        .spacing(10)
        .align_y(Vertical::Center),
        row![
            checkbox("Tile grid", canvas.show_tile_grid())
                .on_toggle(move |v| edit(Message::SetTileGrid(v))),
            checkbox("Pixel grid", canvas.show_pixel_grid())
                .on_toggle(move |v| edit(Message::SetPixelGrid(v))),
            checkbox("Native colours", state.display_native)
                .on_toggle(move |v| edit(Message::SetDisplayNative(v))),
        ]
        .spacing(10),
        row![
            checkbox("Transparency", canvas.transparency_index().is_some()).on_toggle(
                move |v| edit(Message::SetTransparencyIndex(v.then_some(BLANK_TILE_COLOUR)))
            ),
            button(text("Reference image"))
                .style(button::secondary)
                .on_press(GuiMessage::OpenReferenceImage),
            button(text("Clear"))
                .style(button::secondary)
                .on_press_maybe(
                    (!canvas.reference_images().is_empty())
                        .then_some(edit(Message::ClearReferenceImages))
                ),
        ]
        .spacing(10)
        .align_y(Vertical::Center),
    ]
    .spacing(10)
    .into()
}
