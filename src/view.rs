mod palette;
mod settings;
mod tiles;

use iced::{
    alignment::Vertical,
    widget::{
        button, column, container, horizontal_space, row, text, text_input, vertical_rule,
    },
    Element, Length,
};
use palette::palette_view;
use settings::settings_view;
use sms_gfx_editor::message::Message;
use tiles::{tile_canvas_view, tile_controls_view};

use crate::{App, GuiMessage};

fn icon_button(icon: &str) -> button::Button<'_, GuiMessage> {
    button(text(icon).font(iced_fonts::BOOTSTRAP_FONT)).style(button::secondary)
}

fn project_bar(app: &App) -> Element<GuiMessage> {
    let undo = &app.state.undo;
    row![
        icon_button("\u{F3D7}").on_press(GuiMessage::OpenProject),
        button(text("Save")).style(button::secondary).on_press(GuiMessage::SaveProject),
        button(text("Save as")).style(button::secondary).on_press(GuiMessage::SaveProjectAs),
        button(text("Export PNG")).style(button::secondary).on_press(GuiMessage::ExportPng),
        text("Title"),
        text_input("", &app.title_edit)
            .on_input(GuiMessage::EditTitle)
            .on_submit(GuiMessage::Editor(Message::SetProjectTitle(
                app.title_edit.clone()
            )))
            .width(250),
        horizontal_space(),
        button(text("Undo"))
            .style(button::secondary)
            .on_press_maybe(undo.can_undo().then_some(GuiMessage::Editor(Message::Undo))),
        button(text("Redo"))
            .style(button::secondary)
            .on_press_maybe(undo.can_redo().then_some(GuiMessage::Editor(Message::Redo))),
    ]
    .spacing(10)
    .align_y(Vertical::Center)
    .into()
}

fn status_line(app: &App) -> Element<GuiMessage> {
    let state = &app.state;
    let position = match state.pointer {
        Some((x, y)) => {
            let tile = state.project.tile_set.get_tile_index_by_coordinate(x, y);
            let colour = state.project.tile_set.get_pixel_at(x, y);
            match (tile, colour) {
                (Some(t), Some(c)) => format!("({}, {})  tile {}  colour {}", x, y, t, c),
                _ => format!("({}, {})", x, y),
            }
        }
        None => String::new(),
    };
    let tile_set = &state.project.tile_set;
    text(format!(
        "{} tiles, {}x{} px  {}",
        tile_set.len(),
        tile_set.width_px(),
        tile_set.height_px(),
        position
    ))
    .into()
}

pub fn view(app: &App) -> Element<GuiMessage> {
    let side_panel = column![
        palette_view(app),
        settings_view(app),
        tile_controls_view(app),
    ]
    .spacing(10)
    .padding(10)
    .width(420);

    let main_panel = column![
        project_bar(app),
        container(tile_canvas_view(app))
            .width(Length::Fill)
            .height(Length::Fill),
        status_line(app),
    ]
    .spacing(10)
    .padding(10);

    row![main_panel, vertical_rule(1), side_panel]
        .spacing(0)
        .width(Length::Fill)
        .height(Length::Fill)
        .into()
}
