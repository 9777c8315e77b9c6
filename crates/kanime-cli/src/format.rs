//! Plain-text rendering of catalog records.

use kanime_api::{AnimeDetail, CatalogEntry, CharacterEntry, TaxonomyEntry, VoiceAssociation};
use kanime_core::views::{CharacterProfile, SectionItem};

pub fn score(score: Option<f32>) -> String {
    score.map_or_else(|| "N/A".into(), |s| format!("{s:.2}"))
}

/// Cut `text` to at most `max` characters, marking the cut with "...".
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", cut.trim_end())
}

pub fn entry_line(entry: &CatalogEntry, favorite: bool) -> String {
    let mut facts = Vec::new();
    if let Some(t) = &entry.media_type {
        facts.push(t.clone());
    }
    if let Some(eps) = entry.episodes {
        facts.push(format!("{eps} eps"));
    }
    facts.push(format!("score {}", score(entry.score)));
    if let Some(year) = entry.year {
        facts.push(year.to_string());
    }

    let marker = if favorite { " *" } else { "" };
    format!("{:>7}  {}  [{}]{marker}", entry.id, entry.title, facts.join(", "))
}

pub fn section_line(item: &SectionItem) -> String {
    match &item.badge {
        Some(badge) => format!("{:>7}  {:<7} {}", item.entry.id, badge, item.entry.title),
        None => format!("{:>7}  {}", item.entry.id, item.entry.title),
    }
}

pub fn detail_block(detail: &AnimeDetail) -> Vec<String> {
    let entry = &detail.entry;
    let mut lines = vec![format!("{} (#{})", entry.title, entry.id)];
    if let Some(english) = entry.title_english.as_deref().filter(|t| *t != entry.title) {
        lines.push(format!("  English:    {english}"));
    }
    if let Some(japanese) = &detail.title_japanese {
        lines.push(format!("  Japanese:   {japanese}"));
    }
    lines.push(format!("  Score:      {}", score(entry.score)));
    if let Some(rank) = detail.rank {
        lines.push(format!("  Rank:       #{rank}"));
    }
    if let Some(status) = &entry.status {
        lines.push(format!("  Status:     {status}"));
    }
    if let Some(aired) = &entry.aired.label {
        lines.push(format!("  Aired:      {aired}"));
    }
    if let Some(duration) = &detail.duration {
        lines.push(format!("  Duration:   {duration}"));
    }
    if !detail.studios.is_empty() {
        lines.push(format!("  Studios:    {}", detail.studios.join(", ")));
    }
    if !entry.genres.is_empty() {
        let names: Vec<&str> = entry.genres.iter().map(|g| g.name.as_str()).collect();
        lines.push(format!("  Genres:     {}", names.join(", ")));
    }
    if let Some(trailer) = &detail.trailer_url {
        lines.push(format!("  Trailer:    {trailer}"));
    }
    for link in &detail.streaming {
        lines.push(format!("  Watch on:   {} <{}>", link.name, link.url));
    }
    if let Some(synopsis) = &entry.synopsis {
        lines.push(String::new());
        lines.push(truncate(synopsis, 600));
    }
    lines
}

pub fn character_line(character: &CharacterEntry) -> String {
    match &character.name_kanji {
        Some(kanji) => format!(
            "{:>7}  {} ({kanji})  [{} favorites]",
            character.id, character.name, character.favorites_count
        ),
        None => format!(
            "{:>7}  {}  [{} favorites]",
            character.id, character.name, character.favorites_count
        ),
    }
}

fn voice_line(label: &str, voice: &VoiceAssociation) -> String {
    format!("  {label:<10}  {} (#{})", voice.person_name, voice.person_id)
}

pub fn profile_block(profile: &CharacterProfile) -> Vec<String> {
    let counts = profile.counts();
    let mut lines = vec![character_line(&profile.character)];
    if !profile.character.alternate_names.is_empty() {
        lines.push(format!(
            "  Also known as: {}",
            profile.character.alternate_names.join(", ")
        ));
    }
    lines.push(format!(
        "  {} appearances ({} main, {} supporting), {} voice actors",
        counts.appearances, counts.main, counts.supporting, counts.voice_actors
    ));

    for (label, roles) in [
        ("Main", &profile.main_roles),
        ("Supporting", &profile.supporting_roles),
        ("Other", &profile.other_roles),
    ] {
        for role in roles {
            lines.push(format!("  {label:<10}  {} (#{})", role.entry_title, role.entry_id));
        }
    }

    if let Some(voice) = &profile.japanese_voice {
        lines.push(voice_line("Japanese", voice));
    }
    if let Some(voice) = &profile.english_voice {
        lines.push(voice_line("English", voice));
    }
    for voice in &profile.other_voices {
        lines.push(voice_line(&voice.language, voice));
    }

    if let Some(bio) = &profile.character.biography {
        lines.push(String::new());
        lines.push(truncate(bio, 600));
    }
    lines
}

pub fn taxonomy_line(entry: &TaxonomyEntry) -> String {
    format!("{:>5}  {:<24} {:>6}", entry.id, entry.name, entry.count)
}
