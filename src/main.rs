use std::path::PathBuf;

use clap::Parser;
use iced::{
    event,
    keyboard::{self, key},
    widget::image::Handle,
    window, Event, Subscription, Task, Theme,
};
use log::{error, info};
use sms_gfx_editor::{
    canvas::{Bitmap, ReferenceImage, Surface},
    message::{Message, Tool},
    palette::PaletteColour,
    persist,
    project::Project,
    state::{self, EditorState},
    update,
};

mod view;

#[derive(Parser, Debug)]
struct Args {
    /// Project file to open instead of the last one
    #[arg(long)]
    project: Option<PathBuf>,

    /// Initial pixel scale (1-50)
    #[arg(long)]
    scale: Option<u32>,
}

pub struct App {
    pub state: EditorState,
    pub frame: Bitmap,
    pub image: Handle,
    pub colour_hex: String,
    pub title_edit: String,
    pub palette_title_edit: String,
}

#[derive(Debug, Clone)]
pub enum GuiMessage {
    Editor(Message),
    Event(Event),
    WindowClose(window::Id),
    OpenProject,
    ProjectOpened(Option<PathBuf>),
    SaveProject,
    SaveProjectAs,
    SaveProjectPicked(Option<PathBuf>),
    ExportPng,
    ExportPngPicked(Option<PathBuf>),
    OpenReferenceImage,
    ReferenceImagePicked(Option<PathBuf>),
    EditColourHex(String),
    SubmitColourHex,
    EditTitle(String),
    EditPaletteTitle(String),
}

impl App {
    fn new(state: EditorState) -> Self {
        let mut app = App {
            state,
            frame: Bitmap::default(),
            image: Handle::from_rgba(0, 0, vec![]),
            colour_hex: String::new(),
            title_edit: String::new(),
            palette_title_edit: String::new(),
        };
        app.sync_inputs();
        app.redraw();
        app
    }

    /// Recomposites the tile view after a state change.
    fn redraw(&mut self) {
        if let Err(e) = self.state.draw(&mut self.frame) {
            error!("Error drawing tiles: {:#}", e);
            return;
        }
        self.image = Handle::from_rgba(
            self.frame.width(),
            self.frame.height(),
            self.frame.as_bytes().to_vec(),
        );
    }

    fn sync_inputs(&mut self) {
        self.title_edit = self.state.project.title.clone();
        if let Some(palette) = self.state.palette() {
            self.palette_title_edit = palette.title.clone();
        }
        if let Some(colour) = self
            .state
            .palette()
            .and_then(|p| p.colour(self.state.colour_idx).ok())
        {
            self.colour_hex = colour.to_hex();
        }
    }

    fn dispatch(&mut self, message: Message) {
        if let Err(e) = update::update(&mut self.state, message) {
            error!("{:#}", e);
        }
    }

    fn save(&mut self) {
        if let Err(e) = persist::save_modified_project(&mut self.state) {
            error!("Error saving project: {:#}", e);
        }
        if let Err(e) = persist::save_global_config(&mut self.state) {
            error!("Error saving global config: {:#}", e);
        }
    }
}

async fn pick_project() -> Option<PathBuf> {
    let picked = rfd::AsyncFileDialog::new()
        .set_title("Open project ...")
        .add_filter("Project", &["json"])
        .pick_file()
        .await;
    picked.map(|x| x.path().to_owned())
}

async fn pick_save_path(title: &'static str, filter: &'static str, ext: &'static str) -> Option<PathBuf> {
    let picked = rfd::AsyncFileDialog::new()
        .set_title(title)
        .add_filter(filter, &[ext])
        .save_file()
        .await;
    picked.map(|x| x.path().to_owned())
}

async fn pick_image() -> Option<PathBuf> {
    let picked = rfd::AsyncFileDialog::new()
        .set_title("Open reference image ...")
        .add_filter("PNG image", &["png"])
        .pick_file()
        .await;
    picked.map(|x| x.path().to_owned())
}

fn keyboard_message(key: &keyboard::Key, modifiers: keyboard::Modifiers) -> Option<GuiMessage> {
    match key.as_ref() {
        keyboard::Key::Character("z") if modifiers.command() && modifiers.shift() => {
            Some(GuiMessage::Editor(Message::Redo))
        }
        keyboard::Key::Character("z") if modifiers.command() => Some(GuiMessage::Editor(Message::Undo)),
        keyboard::Key::Character("y") if modifiers.command() => Some(GuiMessage::Editor(Message::Redo)),
        keyboard::Key::Character("s") if modifiers.command() => Some(GuiMessage::SaveProject),
        keyboard::Key::Character("o") if modifiers.command() => Some(GuiMessage::OpenProject),
        keyboard::Key::Character("p") => Some(GuiMessage::Editor(Message::SelectTool(Tool::Pencil))),
        keyboard::Key::Character("b") => Some(GuiMessage::Editor(Message::SelectTool(Tool::Bucket))),
        keyboard::Key::Named(key::Named::Escape) => Some(GuiMessage::Editor(Message::SelectTile(None))),
        _ => None,
    }
}

fn update(app: &mut App, message: GuiMessage) -> Task<GuiMessage> {
    match message {
        GuiMessage::Editor(message) => {
            // Pointer traffic leaves text being typed alone.
            let pointer = matches!(
                message,
                Message::PointerDown { .. }
                    | Message::PointerMove { .. }
                    | Message::PointerUp
                    | Message::PointerLeft
            );
            app.dispatch(message);
            if !pointer {
                app.sync_inputs();
            }
        }
        GuiMessage::Event(Event::Keyboard(keyboard::Event::KeyPressed { key, modifiers, .. })) => {
            if let Some(message) = keyboard_message(&key, modifiers) {
                return Task::done(message);
            }
        }
        GuiMessage::Event(_) => {}
        GuiMessage::WindowClose(id) => {
            app.save();
            return window::close(id);
        }
        GuiMessage::OpenProject => {
            return Task::perform(pick_project(), GuiMessage::ProjectOpened);
        }
        GuiMessage::ProjectOpened(path) => {
            let Some(path) = path else {
                return Task::none();
            };
            // Persist the old project before replacing it:
            app.save();
            info!("Opening project at {}", path.display());
            match persist::load_project(&path) {
                Ok(project) => {
                    app.dispatch(Message::ProjectLoaded(Box::new(project)));
                    app.state.project_path = Some(path);
                    app.state.modified = false;
                    app.sync_inputs();
                }
                Err(e) => error!("Error opening project: {:#}", e),
            }
        }
        GuiMessage::SaveProject => {
            if app.state.project_path.is_none() {
                return Task::done(GuiMessage::SaveProjectAs);
            }
            app.state.modified = true;
            app.save();
        }
        GuiMessage::SaveProjectAs => {
            return Task::perform(
                pick_save_path("Save project as ...", "Project", "json"),
                GuiMessage::SaveProjectPicked,
            );
        }
        GuiMessage::SaveProjectPicked(path) => {
            if let Some(path) = path {
                app.state.project_path = Some(path);
                app.state.modified = true;
                app.save();
            }
        }
        GuiMessage::ExportPng => {
            return Task::perform(
                pick_save_path("Export image ...", "PNG image", "png"),
                GuiMessage::ExportPngPicked,
            );
        }
        GuiMessage::ExportPngPicked(path) => {
            if let Some(path) = path {
                if let Err(e) = persist::export_png(&app.state.project, app.state.palette_idx, &path) {
                    error!("Error exporting image: {:#}", e);
                }
            }
        }
        GuiMessage::OpenReferenceImage => {
            return Task::perform(pick_image(), GuiMessage::ReferenceImagePicked);
        }
        GuiMessage::ReferenceImagePicked(path) => {
            if let Some(path) = path {
                match ReferenceImage::load_png(&path, 0, 0) {
                    Ok(reference) => app.dispatch(Message::AddReferenceImage(reference)),
                    Err(e) => error!("Error loading reference image: {:#}", e),
                }
            }
        }
        GuiMessage::EditColourHex(hex) => {
            app.colour_hex = hex;
        }
        GuiMessage::SubmitColourHex => match PaletteColour::from_hex(&app.colour_hex) {
            Ok(colour) => {
                app.dispatch(Message::SetPaletteColour {
                    palette_idx: app.state.palette_idx,
                    colour_idx: app.state.colour_idx,
                    colour,
                });
                app.sync_inputs();
            }
            Err(e) => error!("Invalid colour {}: {:#}", app.colour_hex, e),
        },
        GuiMessage::EditTitle(title) => {
            app.title_edit = title;
        }
        GuiMessage::EditPaletteTitle(title) => {
            app.palette_title_edit = title;
        }
    }
    app.redraw();
    Task::none()
}

fn subscription(_app: &App) -> Subscription<GuiMessage> {
    event::listen_with(|event, status, id| match event {
        Event::Window(window::Event::CloseRequested) => Some(GuiMessage::WindowClose(id)),
        Event::Keyboard(_) if status == event::Status::Ignored => Some(GuiMessage::Event(event)),
        _ => None,
    })
}

fn theme(_app: &App) -> Theme {
    match dark_light::detect().unwrap_or(dark_light::Mode::Unspecified) {
        dark_light::Mode::Light => Theme::Light,
        dark_light::Mode::Dark | dark_light::Mode::Unspecified => Theme::Dark,
    }
}

fn title(app: &App) -> String {
    let modified = if app.state.modified { " *" } else { "" };
    format!("{}{} - SMS/GG Tile Editor", app.state.project.title, modified)
}

pub fn main() -> iced::Result {
    env_logger::init();
    let args = Args::parse();

    let mut state = match state::get_initial_state(args.project.as_deref()) {
        Ok(s) => s,
        Err(e) => {
            error!("Error loading initial state: {:#}", e);
            EditorState::new(Project::default())
        }
    };
    if let Some(scale) = args.scale {
        if let Err(e) = update::update(&mut state, Message::SetScale(scale)) {
            error!("{:#}", e);
        }
    }

    iced::application(title, update, view::view)
        .font(iced_fonts::REQUIRED_FONT_BYTES)
        .font(iced_fonts::BOOTSTRAP_FONT_BYTES)
        .theme(theme)
        .subscription(subscription)
        .exit_on_close_request(false)
        .run_with(move || (App::new(state), Task::none()))
}
