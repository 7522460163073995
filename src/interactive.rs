use crate::audio::MediaProbe;
use crate::error::ValidationError;
use crate::timestamp::{Timestamp, TrimRange};
use console::style;
use dialoguer::{Confirm, Input};
use std::path::{Path, PathBuf};

pub struct InteractiveResult {
    pub video: PathBuf,
    pub trim: Option<TrimRange>,
}

/// Ask for the source video and an optional trim range.
///
/// Invalid answers are re-prompted; only terminal I/O errors end the wizard.
pub fn run_interactive_wizard(probe: &dyn MediaProbe) -> anyhow::Result<InteractiveResult> {
    print_header();

    let video = select_video()?;
    println!("Will run on {}", style(video.display()).cyan());

    let trim = if Confirm::new()
        .with_prompt("Do you want to trim this clip?")
        .default(false)
        .interact()?
    {
        Some(select_trim_range(&video, probe)?)
    } else {
        None
    };

    println!();

    Ok(InteractiveResult { video, trim })
}

fn print_header() {
    println!();
    println!(
        "{}",
        style("╔═══════════════════════════════════════════════════╗").cyan()
    );
    println!(
        "{}",
        style("║        ripscribe - Video to Text Transcriber      ║").cyan()
    );
    println!(
        "{}",
        style("╚═══════════════════════════════════════════════════╝").cyan()
    );
    println!();
}

fn select_video() -> anyhow::Result<PathBuf> {
    let path: String = Input::new()
        .with_prompt("Please paste in full path to source video")
        .validate_with(|input: &String| -> Result<(), String> {
            if is_valid_file(input) {
                Ok(())
            } else {
                Err("File not found. Please correct your input and try again.".to_string())
            }
        })
        .interact_text()?;

    Ok(PathBuf::from(clean_path(&path)))
}

const START_PROMPT: &str = "When should track start? Enter in hh:mm:ss format";
const END_PROMPT: &str = "When should track end? Enter in hh:mm:ss format";

fn select_trim_range(video: &Path, probe: &dyn MediaProbe) -> anyhow::Result<TrimRange> {
    let ask = |prompt: &str| -> anyhow::Result<String> {
        Ok(Input::<String>::new().with_prompt(prompt).interact_text()?)
    };
    choose_trim_range(ask, video, probe)
}

/// Keep asking for a start and an end until they form a valid range.
///
/// A range that is empty or reversed asks for both ends again: a start near
/// the end of the video can leave no end that passes validation.
fn choose_trim_range<F>(
    mut ask: F,
    video: &Path,
    probe: &dyn MediaProbe,
) -> anyhow::Result<TrimRange>
where
    F: FnMut(&str) -> anyhow::Result<String>,
{
    loop {
        let start = read_timestamp(&mut ask, START_PROMPT, video, probe)?;
        let end = read_timestamp(&mut ask, END_PROMPT, video, probe)?;
        match TrimRange::new(start, end) {
            Ok(range) => return Ok(range),
            Err(e) => report_timestamp_error(&e),
        }
    }
}

fn read_timestamp<F>(
    ask: &mut F,
    prompt: &str,
    video: &Path,
    probe: &dyn MediaProbe,
) -> anyhow::Result<Timestamp>
where
    F: FnMut(&str) -> anyhow::Result<String>,
{
    loop {
        let raw = ask(prompt)?;
        match Timestamp::parse(raw.trim(), video, probe) {
            Ok(timestamp) => return Ok(timestamp),
            Err(e) => report_timestamp_error(&e),
        }
    }
}

fn report_timestamp_error(e: &ValidationError) {
    println!("{} Timestamp error: {}", style("!").yellow(), e);
}

/// Strip whitespace and the quotes file managers add when a path is pasted.
fn clean_path(input: &str) -> &str {
    let trimmed = input.trim();
    for quote in ['"', '\''] {
        if let Some(inner) = trimmed
            .strip_prefix(quote)
            .and_then(|s| s.strip_suffix(quote))
        {
            return inner;
        }
    }
    trimmed
}

fn is_valid_file(input: &str) -> bool {
    Path::new(clean_path(input)).is_file()
}
