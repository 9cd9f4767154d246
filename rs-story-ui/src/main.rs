mod dialogs;

use eframe::{egui, Frame};
use egui::Context;
use log::{error, info};

use rs_story_core::config::{AppConfig, CONFIG_FILE};
use rs_story_core::error::StoryError;
use rs_story_core::io::write_text;
use rs_story_core::model::language_model::LanguageModel;
use rs_story_core::model::sampler::NGramSampler;
use rs_story_core::story::data::StoryData;
use rs_story_core::story::history::SessionHistory;
use rs_story_core::story::params::{FormInput, GenerationParameters};
use rs_story_core::story::writer::StoryWriter;

/// Global UI state (MUST persist between frames in egui).
struct StoryWriterUI {
    story_data: StoryData,
    /// `Err` keeps the load failure so Generate can report it.
    model: Result<NGramSampler, String>,
    writer: StoryWriter,

    form: FormInput,
    output: String,
    history: SessionHistory,

    /// Validated request waiting for the next frame, so the spinner gets drawn once.
    pending: Option<GenerationParameters>,
    /// Errors met while starting up, shown on the first frame.
    startup_errors: Vec<String>,
}

impl StoryWriterUI {
    /// Loads story data and the language model from the configured paths.
    fn new(config: AppConfig) -> Self {
        let mut startup_errors = Vec::new();

        let story_data = match StoryData::try_load(&config.story_data_path) {
            Ok(data) => data,
            Err(e) => {
                error!("Cannot load '{}': {e}", config.story_data_path.display());
                startup_errors.push(e.to_string());
                StoryData::default()
            }
        };

        let model = match LanguageModel::from_dir(&config.models_dir, config.max_order) {
            Ok(model) => Ok(NGramSampler::new(model)),
            Err(e) => {
                error!("Cannot load language model from '{}': {e}", config.models_dir.display());
                let message = format!("The language model could not be loaded: {e}");
                startup_errors.push(message.clone());
                Err(message)
            }
        };

        Self {
            story_data,
            model,
            writer: config.story_writer(),
            form: FormInput::with_defaults(&config.defaults),
            output: String::new(),
            history: SessionHistory::new(),
            pending: None,
            startup_errors,
        }
    }

    /// Validates the form and schedules generation for the next frame.
    fn request_story(&mut self, ctx: &Context) {
        match self.form.parse() {
            Ok(params) => {
                self.pending = Some(params);
                ctx.request_repaint();
            }
            Err(e) => dialogs::warning("Input Error", &e.to_string()),
        }
    }

    /// Runs the generation loop on the UI thread.
    ///
    /// Success replaces the output and extends the history; any failure
    /// leaves both untouched.
    fn generate(&mut self, params: &GenerationParameters) {
        let model = match &mut self.model {
            Ok(model) => model,
            Err(message) => {
                dialogs::error("Error", message);
                return;
            }
        };

        let result = self.writer.generate_into_history(
            model,
            &self.story_data,
            params,
            &mut rand::rng(),
            &mut self.history,
        );
        match result {
            Ok(story) => self.output = story,
            Err(StoryError::EmptyStory) => dialogs::warning("Generation Error", "No story was generated."),
            Err(e) => {
                error!("Story generation failed: {e}");
                dialogs::error("Error", &e.to_string());
            }
        }
    }

    /// Replaces the story data with a user-picked file.
    ///
    /// A broken file leaves empty story data behind, like a broken default file.
    fn load_custom_story(&mut self) {
        let Some(path) = dialogs::pick_story_data() else {
            return;
        };
        match StoryData::try_load(&path) {
            Ok(data) => {
                self.story_data = data;
                dialogs::info("Success", "Custom story data loaded successfully.");
            }
            Err(e) => {
                error!("Cannot load '{}': {e}", path.display());
                self.story_data = StoryData::default();
                dialogs::error("Error", &e.to_string());
            }
        }
    }

    /// Writes the output text verbatim to a user-picked file.
    fn save_story(&self) {
        let Some(path) = dialogs::pick_story_output() else {
            return;
        };
        match write_text(&path, &self.output) {
            Ok(()) => info!("Story saved to '{}'", path.display()),
            Err(e) => dialogs::error("Error", &format!("The story could not be saved: {e}")),
        }
    }

    fn model_summary(&self) -> String {
        match &self.model {
            Ok(sampler) => {
                let model = sampler.model();
                format!(
                    "Model: {} ({} paragraphs, order {})",
                    model.corpus_names().join(", "),
                    model.paragraphs(),
                    model.max_order()
                )
            }
            Err(_) => "Model: not loaded".to_owned(),
        }
    }
}

impl eframe::App for StoryWriterUI {
    /// UI update loop (called every frame).
    fn update(&mut self, ctx: &Context, _: &mut Frame) {
        for message in std::mem::take(&mut self.startup_errors) {
            dialogs::error("Error", &message);
        }

        // Requested on the previous frame, the spinner is already on screen
        if let Some(params) = self.pending.take() {
            self.generate(&params);
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().id_salt("form").show(ui, |ui| {
                ui.label("Enter your story prompt:");
                ui.add(egui::TextEdit::singleline(&mut self.form.prompt).desired_width(f32::INFINITY));

                ui.label("Enter your base story (optional):");
                ui.add(
                    egui::TextEdit::multiline(&mut self.form.base_story)
                        .desired_rows(5)
                        .desired_width(f32::INFINITY),
                );

                ui.separator();

                egui::Grid::new("parameters_grid")
                    .num_columns(2)
                    .spacing([20.0, 6.0])
                    .striped(true)
                    .show(ui, |ui| {
                        ui.label("Max Length:");
                        ui.add(egui::TextEdit::singleline(&mut self.form.max_length).desired_width(80.0));
                        ui.end_row();

                        ui.label("Temperature:");
                        ui.add(egui::TextEdit::singleline(&mut self.form.temperature).desired_width(80.0));
                        ui.end_row();

                        ui.label("Top-k:");
                        ui.add(egui::TextEdit::singleline(&mut self.form.top_k).desired_width(80.0));
                        ui.end_row();

                        ui.label("Top-p:");
                        ui.add(egui::TextEdit::singleline(&mut self.form.top_p).desired_width(80.0));
                        ui.end_row();
                    });

                ui.separator();

                ui.horizontal(|ui| {
                    if ui
                        .add_sized([160.0, 32.0], egui::Button::new("Generate Story"))
                        .clicked()
                    {
                        self.request_story(ctx);
                    }
                    if ui
                        .add_sized([200.0, 32.0], egui::Button::new("Load Custom Story Data"))
                        .clicked()
                    {
                        self.load_custom_story();
                    }
                    if ui
                        .add_sized([120.0, 32.0], egui::Button::new("Save Story"))
                        .clicked()
                    {
                        self.save_story();
                    }
                    if self.pending.is_some() {
                        ui.spinner();
                    }
                });

                ui.label(self.model_summary());
                ui.separator();

                if self.output.is_empty() {
                    ui.label("Click Generate Story to start");
                }
                egui::ScrollArea::vertical()
                    .id_salt("output")
                    .max_height(320.0)
                    .show(ui, |ui| {
                        ui.add(
                            egui::TextEdit::multiline(&mut self.output)
                                .desired_rows(16)
                                .desired_width(f32::INFINITY),
                        );
                    });

                ui.separator();

                ui.label("Story History (Current Session):");
                let rendered = self.history.render();
                let mut history_view = rendered.as_str();
                egui::ScrollArea::vertical()
                    .id_salt("history")
                    .max_height(200.0)
                    .show(ui, |ui| {
                        ui.add(
                            egui::TextEdit::multiline(&mut history_view)
                                .desired_rows(8)
                                .desired_width(f32::INFINITY),
                        );
                    });
            });
        });
    }
}

/// Application entry point.
fn main() -> eframe::Result {
    env_logger::init();

    let config = AppConfig::load_or_default(CONFIG_FILE);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([640.0, 860.0])
            .with_resizable(true),
        ..Default::default()
    };

    eframe::run_native(
        "Creative Story Writer",
        options,
        Box::new(|_| Ok(Box::new(StoryWriterUI::new(config)))),
    )
}
