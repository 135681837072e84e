use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    #[default]
    Professional,
    Casual,
    Friendly,
    Persuasive,
    Academic,
    Humorous,
}

impl Tone {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Professional => "professional",
            Tone::Casual => "casual",
            Tone::Friendly => "friendly",
            Tone::Persuasive => "persuasive",
            Tone::Academic => "academic",
            Tone::Humorous => "humorous",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WritingStyle {
    #[default]
    Concise,
    Detailed,
    Creative,
    Instructional,
    Narrative,
    Poetic,
}

impl WritingStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            WritingStyle::Concise => "concise",
            WritingStyle::Detailed => "detailed",
            WritingStyle::Creative => "creative",
            WritingStyle::Instructional => "instructional",
            WritingStyle::Narrative => "narrative",
            WritingStyle::Poetic => "poetic",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageStyle {
    #[default]
    #[serde(rename = "realistic")]
    Realistic,
    #[serde(rename = "cartoon")]
    Cartoon,
    #[serde(rename = "3d render")]
    Render3d,
    #[serde(rename = "oil painting")]
    OilPainting,
    #[serde(rename = "watercolor")]
    Watercolor,
    #[serde(rename = "pencil sketch")]
    PencilSketch,
    #[serde(rename = "digital art")]
    DigitalArt,
}

impl ImageStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageStyle::Realistic => "realistic",
            ImageStyle::Cartoon => "cartoon",
            ImageStyle::Render3d => "3d render",
            ImageStyle::OilPainting => "oil painting",
            ImageStyle::Watercolor => "watercolor",
            ImageStyle::PencilSketch => "pencil sketch",
            ImageStyle::DigitalArt => "digital art",
        }
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for WritingStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for ImageStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn text_prompt(prompt: &str, tone: Tone, style: WritingStyle) -> String {
    format!("{prompt}\n\nTone: {tone}\nStyle: {style}")
}

pub fn image_prompt(prompt: &str, style: ImageStyle) -> String {
    format!("{prompt}, {style} style, high quality")
}

#[derive(Debug, Clone, Serialize)]
pub struct PromptTemplate {
    pub name: &'static str,
    pub prompt: &'static str,
    pub icon: &'static str,
}

pub const IMAGE_TEMPLATES: &[PromptTemplate] = &[
    PromptTemplate {
        name: "Portrait Photo",
        prompt: "A professional portrait of [person], [additional details], high quality, studio lighting",
        icon: "👤",
    },
    PromptTemplate {
        name: "Fantasy Scene",
        prompt: "A magical fantasy scene of [subject], ethereal lighting, detailed, vibrant colors",
        icon: "🧙‍♂️",
    },
    PromptTemplate {
        name: "Product Showcase",
        prompt: "A professional photo of [product], on white background, studio lighting, high detail",
        icon: "📦",
    },
    PromptTemplate {
        name: "Landscape",
        prompt: "A breathtaking landscape of [location], [time of day], cinematic, panoramic view",
        icon: "🏞️",
    },
    PromptTemplate {
        name: "Abstract Art",
        prompt: "Abstract art using [colors] and [shapes], modern art style, high resolution",
        icon: "🎨",
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_prompt_layout() {
        let prompt = text_prompt("Write a haiku", Tone::Casual, WritingStyle::Poetic);
        assert_eq!(prompt, "Write a haiku\n\nTone: casual\nStyle: poetic");
    }

    #[test]
    fn test_image_prompt_layout() {
        assert_eq!(
            image_prompt("a red fox", ImageStyle::Render3d),
            "a red fox, 3d render style, high quality"
        );
    }

    #[test]
    fn test_style_names_round_trip_through_serde() {
        let style: ImageStyle = serde_json::from_str("\"oil painting\"").unwrap();
        assert_eq!(style, ImageStyle::OilPainting);
        assert_eq!(serde_json::to_string(&style).unwrap(), "\"oil painting\"");

        let tone: Tone = serde_json::from_str("\"humorous\"").unwrap();
        assert_eq!(tone, Tone::Humorous);
    }

    #[test]
    fn test_defaults_match_form_defaults() {
        assert_eq!(Tone::default(), Tone::Professional);
        assert_eq!(WritingStyle::default(), WritingStyle::Concise);
        assert_eq!(ImageStyle::default(), ImageStyle::Realistic);
        assert_eq!(IMAGE_TEMPLATES.len(), 5);
    }
}
