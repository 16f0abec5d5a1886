//! Prompt templates for the studio's generation actions.

use crate::services::youtube_service::ChannelSummary;

pub const SCRIPT_SYSTEM_PROMPT: &str = "You are a scriptwriter for short-form vertical video \
(YouTube Shorts, TikTok, Instagram Reels). Write tight, spoken-word scripts with a strong hook \
in the first two seconds, one idea per line, and a clear call to action at the end.";

pub const IDEAS_SYSTEM_PROMPT: &str = "You are a content strategist for short-form video creators. \
Suggest concrete, filmable video ideas. Each idea gets a working title, a one-sentence hook and \
the reason it should perform well. Answer as a numbered list.";

pub const MAX_IDEAS: u32 = 20;

pub fn script_prompt(
    topic: &str,
    duration_seconds: u32,
    tone: Option<&str>,
    platform: Option<&str>,
) -> String {
    let words = duration_seconds.saturating_mul(150) / 60;

    let mut prompt = format!(
        "Write a script for a {}-second video about: {}\n\
         Target length: about {} spoken words.",
        duration_seconds, topic, words
    );
    if let Some(tone) = tone.filter(|t| !t.trim().is_empty()) {
        prompt.push_str(&format!("\nTone: {}.", tone.trim()));
    }
    if let Some(platform) = platform.filter(|p| !p.trim().is_empty()) {
        prompt.push_str(&format!("\nPlatform: {}.", platform.trim()));
    }
    prompt.push_str("\nMark the hook, body and call to action with [HOOK], [BODY] and [CTA].");
    prompt
}

pub fn ideas_prompt(niche: &str, count: u32) -> String {
    format!(
        "Give me {} short-form video ideas for the niche: {}",
        count.clamp(1, MAX_IDEAS),
        niche
    )
}

pub fn channel_ideas_prompt(channel: &ChannelSummary, count: u32) -> String {
    let description = if channel.description.trim().is_empty() {
        "(no description)"
    } else {
        channel.description.trim()
    };

    format!(
        "Channel: {}\n\
         Description: {}\n\
         Subscribers: {}, videos: {}, total views: {}\n\n\
         Give me {} short-form video ideas that fit this channel's audience and \
         could grow it.",
        channel.title,
        description,
        channel.subscriber_count,
        channel.video_count,
        channel.view_count,
        count.clamp(1, MAX_IDEAS)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_prompt_includes_optional_fields_only_when_set() {
        let prompt = script_prompt("cold brew at home", 60, Some("playful"), None);
        assert!(prompt.contains("60-second"));
        assert!(prompt.contains("about 150 spoken words"));
        assert!(prompt.contains("Tone: playful."));
        assert!(!prompt.contains("Platform:"));
    }

    #[test]
    fn test_idea_count_is_capped() {
        assert!(ideas_prompt("gardening", 500).starts_with("Give me 20 "));
        assert!(ideas_prompt("gardening", 0).starts_with("Give me 1 "));
    }
}
