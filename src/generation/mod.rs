//! Generation façade: remote text and image generation plus the prompt
//! shaping applied by the dashboard forms.

mod client;
pub mod prompt;

#[cfg(test)]
pub use client::MockGenerator;
pub use client::{Generator, HttpGenerator};
pub use prompt::{ImageStyle, PromptTemplate, Tone, WritingStyle, IMAGE_TEMPLATES};
