use rs_story_core::config::{AppConfig, CONFIG_FILE};
use rs_story_core::model::language_model::LanguageModel;
use rs_story_core::model::sampler::NGramSampler;
use rs_story_core::story::data::StoryData;
use rs_story_core::story::history::SessionHistory;
use rs_story_core::story::params::FormInput;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    // Optional "rs-story.json" in the working directory, defaults otherwise
    let config = AppConfig::load_or_default(CONFIG_FILE);

    // Train (or load the cached .bin of) every corpus in "data/models"
    let model = LanguageModel::from_dir(&config.models_dir, config.max_order)?;
    println!("Corpora: {}", model.corpus_names().join(", "));

    // A fixed seed replays the same stories on every run
    let mut sampler = NGramSampler::with_seed(model, 42);

    // Missing or broken story data only removes the random elements
    let story_data = StoryData::load_or_default(&config.story_data_path);

    // The form takes raw strings, like the text fields of the UI
    let mut form = FormInput::with_defaults(&config.defaults);
    form.prompt = "Once upon a time".to_owned();
    form.max_length = "20".to_owned();

    // Invalid values are rejected before anything runs
    form.temperature = "0".to_owned();
    match form.parse() {
        Ok(_) => println!("Should not happen"),
        Err(e) => println!("Rejected: {e}"),
    }
    form.temperature = "0.8".to_owned();
    let params = form.parse()?;

    let writer = config.story_writer();
    let mut history = SessionHistory::new();
    let mut rng = rand::rng();

    for i in 0..3 {
        let story = writer.generate_into_history(&mut sampler, &story_data, &params, &mut rng, &mut history)?;
        println!("Story {}: {} words", i + 1, story.split_whitespace().count());
    }

    print!("{}", history.render());

    Ok(())
}
