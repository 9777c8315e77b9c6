//! Character detail: profile plus the anime and voice actors tied to it.

use kanime_api::{
    CatalogError, CatalogService, CharacterEntry, RoleAssociation, RoleKind, VoiceAssociation,
};

#[derive(Debug, Clone, PartialEq)]
pub struct CharacterProfile {
    pub character: CharacterEntry,
    pub main_roles: Vec<RoleAssociation>,
    pub supporting_roles: Vec<RoleAssociation>,
    /// Roles with any other tag, in service order.
    pub other_roles: Vec<RoleAssociation>,
    pub japanese_voice: Option<VoiceAssociation>,
    pub english_voice: Option<VoiceAssociation>,
    pub other_voices: Vec<VoiceAssociation>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharacterCounts {
    pub appearances: usize,
    pub main: usize,
    pub supporting: usize,
    pub voice_actors: usize,
}

impl CharacterProfile {
    pub fn assemble(
        character: CharacterEntry,
        roles: Vec<RoleAssociation>,
        voices: Vec<VoiceAssociation>,
    ) -> Self {
        let mut main_roles = Vec::new();
        let mut supporting_roles = Vec::new();
        let mut other_roles = Vec::new();
        for role in roles {
            match role.role {
                RoleKind::Main => main_roles.push(role),
                RoleKind::Supporting => supporting_roles.push(role),
                RoleKind::Other(_) => other_roles.push(role),
            }
        }

        let mut japanese_voice = None;
        let mut english_voice = None;
        let mut other_voices = Vec::new();
        for voice in voices {
            match voice.language.as_str() {
                "Japanese" if japanese_voice.is_none() => japanese_voice = Some(voice),
                "English" if english_voice.is_none() => english_voice = Some(voice),
                _ => other_voices.push(voice),
            }
        }

        Self {
            character,
            main_roles,
            supporting_roles,
            other_roles,
            japanese_voice,
            english_voice,
            other_voices,
        }
    }

    pub fn counts(&self) -> CharacterCounts {
        let main = self.main_roles.len();
        let supporting = self.supporting_roles.len();
        let voice_actors = self.other_voices.len()
            + usize::from(self.japanese_voice.is_some())
            + usize::from(self.english_voice.is_some());
        CharacterCounts {
            appearances: main + supporting + self.other_roles.len(),
            main,
            supporting,
            voice_actors,
        }
    }
}

/// Fetch all three parts at once. Only the profile is required.
pub async fn load_character<S: CatalogService>(
    service: &S,
    id: u64,
) -> Result<CharacterProfile, CatalogError> {
    let (character, roles, voices) = futures::join!(
        service.character(id),
        service.character_roles(id),
        service.character_voices(id),
    );
    let character = character?;

    let roles = roles.unwrap_or_else(|e| {
        tracing::warn!(id, error = %e, "character roles unavailable");
        Vec::new()
    });
    let voices = voices.unwrap_or_else(|e| {
        tracing::warn!(id, error = %e, "character voices unavailable");
        Vec::new()
    });
    Ok(CharacterProfile::assemble(character, roles, voices))
}

/// Gallery images; empty when unavailable.
pub async fn load_pictures<S: CatalogService>(service: &S, id: u64) -> Vec<String> {
    service.character_pictures(id).await.unwrap_or_else(|e| {
        tracing::warn!(id, error = %e, "character pictures unavailable");
        Vec::new()
    })
}
