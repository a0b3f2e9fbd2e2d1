pub const CAPTION_BASE: &str = include_str!("../data/prompts/caption_base.txt");
pub const IMAGE_ANALYSIS: &str = include_str!("../data/prompts/image_analysis.txt");
pub const AUDIO_ANALYSIS: &str = include_str!("../data/prompts/audio_analysis.txt");
pub const STYLE_REFERENCE: &str = include_str!("../data/prompts/style_reference.txt");
pub const STYLE_FALLBACK: &str = include_str!("../data/prompts/style_fallback.txt");

/// Replace `{{key}}` placeholders in a template string.
///
/// Variables are substituted in order, so text inserted by an earlier pair can
/// still be matched by a later key.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut result = template.to_string();
    for (key, value) in vars {
        result = result.replace(&format!("{{{{{}}}}}", key), value);
    }
    result
}

/// Clinic-level knobs that shape every prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptSettings {
    pub clinic_name: String,
    pub language: String,
}

impl Default for PromptSettings {
    fn default() -> Self {
        Self {
            clinic_name: "ID Implantes".to_string(),
            language: "Brazilian Portuguese".to_string(),
        }
    }
}

/// Per-request facts that select prompt fragments.
#[derive(Debug, Clone, Copy, Default)]
pub struct PromptOptions<'a> {
    pub has_images: bool,
    pub has_audio: bool,
    pub style_sample: Option<&'a str>,
}

/// Returns the style sample unless it is missing or empty.
///
/// Whitespace-only text still counts as a sample and is passed on as given.
fn effective_sample(sample: Option<&str>) -> Option<&str> {
    sample.filter(|s| !s.is_empty())
}

fn style_instruction(sample: Option<&str>) -> String {
    match effective_sample(sample) {
        Some(sample) => render(STYLE_REFERENCE.trim_end(), &[("sample", sample)]),
        None => STYLE_FALLBACK.trim_end().to_string(),
    }
}

/// Build the instruction text sent after the media parts.
pub fn compose_caption_prompt(options: &PromptOptions<'_>, settings: &PromptSettings) -> String {
    let mut analysis = Vec::new();
    if options.has_images {
        analysis.push(IMAGE_ANALYSIS.trim_end());
    }
    if options.has_audio {
        analysis.push(AUDIO_ANALYSIS.trim_end());
    }
    let media_analysis = analysis.join("\n\n");
    let style = style_instruction(options.style_sample);

    // `style` goes last: it may carry user text that must stay verbatim.
    render(
        CAPTION_BASE,
        &[
            ("clinic", settings.clinic_name.as_str()),
            ("language", settings.language.as_str()),
            ("media_analysis", media_analysis.as_str()),
            ("style", style.as_str()),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compose(has_audio: bool, style_sample: Option<&str>) -> String {
        compose_caption_prompt(
            &PromptOptions {
                has_images: true,
                has_audio,
                style_sample,
            },
            &PromptSettings::default(),
        )
    }

    #[test]
    fn test_render_single_var() {
        assert_eq!(
            render("Hello {{name}}!", &[("name", "world")]),
            "Hello world!"
        );
    }

    #[test]
    fn test_render_multiple_vars() {
        assert_eq!(
            render("{{a}} and {{b}}", &[("a", "cats"), ("b", "dogs")]),
            "cats and dogs"
        );
    }

    #[test]
    fn test_prompts_are_non_empty() {
        assert!(!CAPTION_BASE.is_empty());
        assert!(!IMAGE_ANALYSIS.is_empty());
        assert!(!AUDIO_ANALYSIS.is_empty());
        assert!(!STYLE_REFERENCE.is_empty());
        assert!(!STYLE_FALLBACK.is_empty());
    }

    #[test]
    fn test_caption_base_has_placeholders() {
        for key in ["{{clinic}}", "{{language}}", "{{media_analysis}}", "{{style}}"] {
            assert!(CAPTION_BASE.contains(key), "missing {}", key);
        }
        assert!(STYLE_REFERENCE.contains("{{sample}}"));
    }

    #[test]
    fn test_images_only_uses_fallback_tone() {
        let prompt = compose(false, None);
        assert!(prompt.contains(IMAGE_ANALYSIS.trim()));
        assert!(!prompt.contains(AUDIO_ANALYSIS.trim()));
        assert!(prompt.contains(STYLE_FALLBACK.trim()));
        assert!(!prompt.contains("{{"));
    }

    #[test]
    fn test_audio_fragment_included_when_audio_present() {
        let prompt = compose(true, None);
        assert!(prompt.contains(IMAGE_ANALYSIS.trim()));
        assert!(prompt.contains(AUDIO_ANALYSIS.trim()));
    }

    #[test]
    fn test_style_sample_is_included_verbatim() {
        let sample = "Seu sorriso merece o melhor! ✨ #Implantes";
        let prompt = compose(false, Some(sample));
        assert!(prompt.contains(sample));
        assert!(!prompt.contains(STYLE_FALLBACK.trim()));
    }

    #[test]
    fn test_style_sample_placeholders_are_not_expanded() {
        let sample = "Visit {{clinic}} in {{language}}";
        let prompt = compose(false, Some(sample));
        assert!(prompt.contains(sample));
    }

    #[test]
    fn test_empty_sample_falls_back() {
        assert!(compose(false, Some("")).contains(STYLE_FALLBACK.trim()));
    }

    #[test]
    fn test_whitespace_sample_takes_reference_branch() {
        let prompt = compose(false, Some("   "));
        assert!(prompt.contains("User's sample text: \"   \""));
        assert!(!prompt.contains(STYLE_FALLBACK.trim()));
    }

    #[test]
    fn test_settings_flow_into_prompt() {
        let prompt = compose_caption_prompt(
            &PromptOptions {
                has_images: true,
                ..Default::default()
            },
            &PromptSettings {
                clinic_name: "Smile Lab".to_string(),
                language: "English".to_string(),
            },
        );
        assert!(prompt.contains("\"Smile Lab\""));
        assert!(prompt.contains("captions in English"));
    }

    #[test]
    fn test_prompt_names_all_three_tones() {
        let prompt = compose(false, None);
        for tone in ["Informative", "Friendly", "Professional"] {
            assert!(prompt.contains(tone));
        }
        assert!(prompt.contains("hashtags"));
        assert!(prompt.contains("emoji"));
    }
}
