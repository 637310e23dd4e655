#![forbid(unsafe_code)]
#![cfg_attr(
    all(not(debug_assertions), target_os = "windows"),
    windows_subsystem = "windows"
)]

#[cfg(target_arch = "wasm32")]
compile_error!("jotpad is a native desktop app; web/wasm builds are not supported.");

use std::{
    ffi::OsString,
    io,
    path::PathBuf,
    sync::mpsc,
    thread,
    time::Instant,
};

use eframe::egui;
use jotpad_core::{
    ApproximateMeasure, CaretEstimator, Editor, EditorError, Effect, IncomingFile, MAX_FILE_BYTES, MemoryStore,
    PendingAction, Phase, Resolution,
    ingest::{TEXT_EXTENSIONS, pick_dropped},
    settings::{FONT_SIZE_RANGE, MARGIN_RANGE, MARGIN_STEP},
    welcome,
};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

mod caret_layout;
mod disk_io;

const FONT_STEP: i32 = 1;
/// Rough stand-in for a browser's per-tab session storage allowance.
const SESSION_QUOTA_BYTES: usize = 10 * 1024 * 1024;
const EDITOR_ID: &str = "editor";
const BUBBLE_OFFSET: egui::Vec2 = egui::vec2(14.0, -2.0);

#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct LaunchOptions {
    dark: bool,
    path: Option<PathBuf>,
}

fn parse_launch_options<I, S>(args: I) -> LaunchOptions
where
    I: IntoIterator<Item = S>,
    S: Into<OsString>,
{
    let mut options = LaunchOptions::default();

    for arg in args {
        let arg = arg.into();
        if arg == "--dark" {
            options.dark = true;
            continue;
        }

        if options.path.is_none() {
            options.path = Some(PathBuf::from(arg));
        }
    }

    options
}

fn main() -> eframe::Result {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let launch_options = parse_launch_options(std::env::args_os().skip(1));

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([900.0, 700.0])
            .with_min_inner_size([420.0, 300.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };
    eframe::run_native(
        "jotpad",
        options,
        Box::new(move |cc| Ok(Box::new(JotpadApp::new(&cc.egui_ctx, launch_options)))),
    )
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Command {
    New,
    Open,
    Save,
    SaveAs,
    ToggleSettings,
    FontBigger,
    FontSmaller,
}

struct Alert {
    title: &'static str,
    message: String,
}

impl Alert {
    fn open_failed(err: &EditorError) -> Self {
        Self {
            title: "Cannot open file",
            message: err.to_string(),
        }
    }

    fn save_failed(err: &io::Error) -> Self {
        Self {
            title: "Cannot save file",
            message: format!("Save failed: {err}"),
        }
    }
}

struct ReadDone {
    name: String,
    result: io::Result<String>,
}

struct JotpadApp {
    editor: Editor<MemoryStore>,
    welcome_started: Instant,
    last_phase: Phase,
    alert: Option<Alert>,
    show_settings: bool,
    reads_tx: mpsc::Sender<ReadDone>,
    reads_rx: mpsc::Receiver<ReadDone>,
}

impl Drop for JotpadApp {
    fn drop(&mut self) {
        self.editor.shutdown();
    }
}

impl eframe::App for JotpadApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.frame(ctx, Instant::now());
    }
}

impl JotpadApp {
    fn frame(&mut self, ctx: &egui::Context, now: Instant) {
        self.poll_reads();
        self.editor.tick(now);

        let phase = self.editor.phase();
        if phase != self.last_phase {
            if phase == Phase::Welcome {
                self.welcome_started = now;
            }
            self.last_phase = phase;
        }

        ctx.set_theme(if self.editor.settings().is_dark_mode {
            egui::Theme::Dark
        } else {
            egui::Theme::Light
        });

        let dialog_open = self.editor.pending_action().is_some() || self.alert.is_some();
        if !dialog_open {
            for command in shortcut_commands(ctx) {
                self.run(ctx, command);
            }
            self.accept_drop(ctx);
        }

        let mut clicked = None;
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                for (command, label) in [
                    (Command::New, "New"),
                    (Command::Open, "Open"),
                    (Command::Save, "Save"),
                    (Command::SaveAs, "Save As"),
                ] {
                    if ui.button(label).clicked() {
                        clicked = Some(command);
                    }
                }
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.selectable_label(self.show_settings, "Settings").clicked() {
                        clicked = Some(Command::ToggleSettings);
                    }
                });
            });
        });
        if let Some(command) = clicked
            && !dialog_open
        {
            self.run(ctx, command);
        }

        if let Some(warning) = self.editor.autosave_status().warning() {
            egui::TopBottomPanel::top("autosave-warning").show(ctx, |ui| {
                ui.colored_label(ui.visuals().warn_fg_color, warning);
            });
        }

        egui::TopBottomPanel::bottom("status").show(ctx, |ui| self.show_status(ui));
        egui::CentralPanel::default().show(ctx, |ui| {
            // Frozen while a prompt is up so its choice applies to the text it asked about.
            ui.add_enabled_ui(!dialog_open, |ui| self.show_editor(ui, now));
        });

        self.show_settings_window(ctx);
        self.show_dialogs(ctx);
        self.update_viewport_title(ctx);

        if let Some(remaining) = self.editor.autosave_remaining(now) {
            ctx.request_repaint_after(remaining);
        }
        if self.editor.phase() == Phase::Welcome
            && let Some(next) = welcome::next_reveal(now.duration_since(self.welcome_started))
        {
            ctx.request_repaint_after(next);
        }
    }
}

fn shortcut_commands(ctx: &egui::Context) -> Vec<Command> {
    ctx.input(|i| {
        let cmd = i.modifiers.command;
        let s = i.key_pressed(egui::Key::S);
        [
            (cmd && i.key_pressed(egui::Key::N), Command::New),
            (cmd && i.key_pressed(egui::Key::O), Command::Open),
            (cmd && s && !i.modifiers.shift, Command::Save),
            (cmd && s && i.modifiers.shift, Command::SaveAs),
            (cmd && i.key_pressed(egui::Key::Equals), Command::FontBigger),
            (cmd && i.key_pressed(egui::Key::Minus), Command::FontSmaller),
        ]
        .into_iter()
        .filter_map(|(pressed, command)| pressed.then_some(command))
        .collect()
    })
}

impl JotpadApp {
    fn new(ctx: &egui::Context, options: LaunchOptions) -> Self {
        let (reads_tx, reads_rx) = mpsc::channel();
        let mut editor = Editor::new(MemoryStore::with_quota(SESSION_QUOTA_BYTES));
        if options.dark {
            editor.update_settings(|s| s.is_dark_mode = true);
        }

        let mut app = Self {
            last_phase: editor.phase(),
            editor,
            welcome_started: Instant::now(),
            alert: None,
            show_settings: false,
            reads_tx,
            reads_rx,
        };

        if let Some(path) = options.path {
            match IncomingFile::from_path(&path) {
                Ok(file) => {
                    let effect = app.editor.request(PendingAction::Load(file));
                    app.handle(ctx, effect);
                }
                Err(err) => warn!(%err, path = %path.display(), "cannot open launch file"),
            }
        }
        app
    }

    fn run(&mut self, ctx: &egui::Context, command: Command) {
        match command {
            Command::New => {
                let effect = self.editor.request(PendingAction::NewBlank);
                self.handle(ctx, effect);
            }
            Command::Open => {
                let effect = self.editor.request(PendingAction::Open);
                self.handle(ctx, effect);
            }
            Command::Save => match self.editor.save() {
                Ok(bytes) => debug!(bytes, "saved"),
                Err(err) => self.report(err),
            },
            Command::SaveAs => self.save_as(),
            Command::ToggleSettings => self.show_settings = !self.show_settings,
            Command::FontBigger => self.editor.update_settings(|s| s.step_font_size(FONT_STEP)),
            Command::FontSmaller => self.editor.update_settings(|s| s.step_font_size(-FONT_STEP)),
        }
    }

    fn handle(&mut self, ctx: &egui::Context, effect: Result<Effect, EditorError>) {
        match effect {
            Ok(Effect::Done | Effect::Confirm) => {}
            Ok(Effect::PickFile) => self.pick_file(ctx),
            Ok(Effect::Read(file)) => self.spawn_read(ctx, file),
            Err(err) => self.report(err),
        }
    }

    fn report(&mut self, err: EditorError) {
        match err {
            EditorError::FileTooLarge { .. } => self.alert = Some(Alert::open_failed(&err)),
            EditorError::ConfirmationPending => {}
            // Oversize content shows up as the autosave banner; store and
            // read failures are already logged by the editor.
            EditorError::ContentTooLarge { .. } | EditorError::Store(_) | EditorError::Read { .. } => {
                debug!(%err, "not surfaced");
            }
        }
    }

    fn pick_file(&mut self, ctx: &egui::Context) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("Text and Markdown", &TEXT_EXTENSIONS)
            .pick_file()
        else {
            return;
        };

        match IncomingFile::from_path(&path) {
            Ok(file) => {
                let effect = self.editor.begin_load(file);
                self.handle(ctx, effect);
            }
            Err(err) => warn!(%err, path = %path.display(), "cannot open picked file"),
        }
    }

    fn accept_drop(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        if dropped.is_empty() {
            return;
        }

        let candidates = dropped.iter().filter_map(|item| {
            let path = item.path.as_ref()?;
            let mut file = IncomingFile::from_path(path)
                .map_err(|err| warn!(%err, path = %path.display(), "ignoring dropped file"))
                .ok()?;
            if !item.mime.is_empty() {
                file.mime = Some(item.mime.clone());
            }
            Some(file)
        });
        if let Some(file) = pick_dropped(candidates) {
            let effect = self.editor.request(PendingAction::Load(file));
            self.handle(ctx, effect);
        }
    }

    fn spawn_read(&self, ctx: &egui::Context, file: IncomingFile) {
        let Some(path) = file.path else {
            warn!(name = %file.name, "file has no path to read from");
            return;
        };

        let tx = self.reads_tx.clone();
        let ctx = ctx.clone();
        let name = file.name;
        thread::spawn(move || {
            let result = disk_io::read_utf8_capped(&path, MAX_FILE_BYTES);
            if tx.send(ReadDone { name, result }).is_ok() {
                ctx.request_repaint();
            }
        });
    }

    fn poll_reads(&mut self) {
        while let Ok(done) = self.reads_rx.try_recv() {
            if let Err(err) = self.editor.finish_load(&done.name, done.result) {
                self.report(err);
            }
        }
    }

    fn save_as(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("Text and Markdown", &TEXT_EXTENSIONS)
            .set_file_name(self.editor.document().filename())
            .save_file()
        else {
            return;
        };

        let dir = path
            .parent()
            .map_or_else(|| PathBuf::from("."), PathBuf::from);
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        let mut sink = disk_io::DiskSink::new(dir);
        self.editor.save_as(&name, &mut sink);
        if let Err(err) = sink.result {
            self.alert = Some(Alert::save_failed(&err));
        }
    }

    fn show_status(&self, ui: &mut egui::Ui) {
        let doc = self.editor.document();
        let settings = self.editor.settings();
        ui.horizontal(|ui| {
            ui.label(doc.filename());

            if doc.is_dirty() {
                ui.separator();
                ui.colored_label(ui.visuals().warn_fg_color, "Modified");
            }

            if settings.show_count_display {
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(self.editor.counts().label(settings.show_word_count));
                });
            }
        });
    }

    fn show_editor(&mut self, ui: &mut egui::Ui, now: Instant) {
        let settings = self.editor.settings().clone();
        let font_size = f32::from(settings.font_size_px);
        let font = egui::FontId::monospace(font_size);

        let full = ui.available_rect_before_wrap();
        let left = f32::from(settings.left_margin_px).min(full.width() / 3.0);
        let right = f32::from(settings.right_margin_px).min(full.width() / 3.0);
        let rect = egui::Rect::from_min_max(
            full.min + egui::vec2(left, 0.0),
            full.max - egui::vec2(right, 0.0),
        );

        let id = egui::Id::new(EDITOR_ID);
        let focused = ui.memory(|m| m.has_focus(id));
        let tab = focused
            && ui.is_enabled()
            && ui.input_mut(|i| i.consume_key(egui::Modifiers::NONE, egui::Key::Tab));
        let placeholder = if self.editor.phase() == Phase::Welcome {
            welcome::visible(now.duration_since(self.welcome_started))
        } else {
            ""
        };

        let mut output = None;
        let editor = &mut self.editor;
        ui.scope_builder(egui::UiBuilder::new().max_rect(rect), |ui| {
            let min_size = ui.available_size();
            egui::ScrollArea::vertical()
                .auto_shrink([false; 2])
                .show(ui, |ui| {
                    editor.edit(now, |text| {
                        let out = egui::TextEdit::multiline(text)
                            .id(id)
                            .font(font.clone())
                            .frame(false)
                            .lock_focus(true)
                            .desired_width(f32::INFINITY)
                            .min_size(min_size)
                            .hint_text(placeholder)
                            .show(ui);
                        let changed = out.response.changed();
                        output = Some(out);
                        changed
                    });
                });
        });

        let Some(output) = output else {
            return;
        };
        let caret = output
            .state
            .cursor
            .char_range()
            .map(|range| range.primary.index);

        if tab && let Some(caret) = caret {
            let caret = self.editor.insert_indent(caret, now);
            let mut state = output.state.clone();
            state
                .cursor
                .set_char_range(Some(egui::text::CCursorRange::one(egui::text::CCursor::new(caret))));
            state.store(ui.ctx(), id);
            ui.ctx().request_repaint();
            return;
        }

        if settings.show_count_display
            && self.editor.phase() == Phase::Editing
            && let Some(caret) = caret
        {
            let estimator = CaretEstimator::new(
                Some(caret_layout::GalleyMeasure {
                    galley: &output.galley,
                }),
                ApproximateMeasure::for_font_size(font_size),
            );
            let point = estimator.estimate(self.editor.document().text(), caret);
            let pos = output.galley_pos + egui::vec2(point.x, point.y) + BUBBLE_OFFSET;
            if rect.contains(pos) {
                ui.painter().text(
                    pos,
                    egui::Align2::LEFT_TOP,
                    self.editor.counts().label(settings.show_word_count),
                    egui::FontId::proportional(font_size * 0.7),
                    ui.visuals().weak_text_color(),
                );
            }
        }
    }

    fn show_settings_window(&mut self, ctx: &egui::Context) {
        if !self.show_settings {
            return;
        }

        let mut open = true;
        let mut draft = self.editor.settings().clone();
        egui::Window::new("Settings")
            .open(&mut open)
            .collapsible(false)
            .resizable(false)
            .show(ctx, |ui| {
                ui.add(egui::Slider::new(&mut draft.font_size_px, FONT_SIZE_RANGE).text("Font size (px)"));
                ui.add(
                    egui::Slider::new(&mut draft.left_margin_px, MARGIN_RANGE)
                        .step_by(f64::from(MARGIN_STEP))
                        .text("Left margin (px)"),
                );
                ui.add(
                    egui::Slider::new(&mut draft.right_margin_px, MARGIN_RANGE)
                        .step_by(f64::from(MARGIN_STEP))
                        .text("Right margin (px)"),
                );
                ui.separator();
                ui.checkbox(&mut draft.is_dark_mode, "Dark mode");
                ui.checkbox(&mut draft.show_count_display, "Show count");
                ui.add_enabled_ui(draft.show_count_display, |ui| {
                    ui.horizontal(|ui| {
                        ui.radio_value(&mut draft.show_word_count, true, "Words");
                        ui.radio_value(&mut draft.show_word_count, false, "Characters");
                    });
                });
            });

        self.show_settings = open;
        if draft != *self.editor.settings() {
            self.editor.update_settings(|s| *s = draft);
        }
    }

    fn show_dialogs(&mut self, ctx: &egui::Context) {
        if let Some(alert) = &self.alert {
            let mut dismissed = ctx.input(|i| i.key_pressed(egui::Key::Escape));
            egui::Window::new(alert.title)
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
                .show(ctx, |ui| {
                    ui.label(alert.message.as_str());
                    ui.add_space(8.0);
                    if ui.button("OK").clicked() {
                        dismissed = true;
                    }
                });
            if dismissed {
                self.alert = None;
            }
            return;
        }

        if self.editor.pending_action().is_none() {
            return;
        }

        let mut choice = ctx
            .input(|i| i.key_pressed(egui::Key::Escape))
            .then_some(Resolution::Dismiss);
        let title = self.editor.document().filename().to_owned();
        egui::Window::new("Unsaved changes")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
            .show(ctx, |ui| {
                ui.label(format!("\"{title}\" has changes that are not saved yet."));
                ui.add_space(8.0);

                ui.horizontal(|ui| {
                    if ui.button("Save and continue").clicked() {
                        choice = Some(Resolution::SaveThenProceed);
                    }
                    if ui.button("Discard").clicked() {
                        choice = Some(Resolution::Discard);
                    }
                    if ui.button("Cancel").clicked() {
                        choice = Some(Resolution::Dismiss);
                    }
                });
            });

        if let Some(choice) = choice {
            let effect = self.editor.resolve(choice);
            self.handle(ctx, effect);
        }
    }

    fn update_viewport_title(&self, ctx: &egui::Context) {
        let doc = self.editor.document();
        ctx.send_viewport_cmd(egui::ViewportCommand::Title(format!(
            "jotpad - {}{}",
            doc.filename(),
            if doc.is_dirty() { "*" } else { "" },
        )));
    }
}
