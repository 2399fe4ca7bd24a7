/// Display identity the assistant borrows when replying in character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersonaProfile {
    pub name: &'static str,
    pub profile_picture: &'static str,
}

pub const BYSTANDER: PersonaProfile = PersonaProfile {
    name: "Tom",
    profile_picture: "/images/bystander_profile.png",
};

pub const EDUCATOR: PersonaProfile = PersonaProfile {
    name: "Ms. Smith",
    profile_picture: "/images/educator_profile.jpeg",
};

pub const VICTIM: PersonaProfile = PersonaProfile {
    name: "Dylan",
    profile_picture: "/images/victim_profile.png",
};

pub const BULLY: PersonaProfile = PersonaProfile {
    name: "Sarah",
    profile_picture: "/images/profile_1.png",
};

/// Map the role tag chosen by the model to a display identity. Unknown tags
/// fall back to the educator.
pub fn resolve(role_tag: &str) -> PersonaProfile {
    match role_tag.to_lowercase().as_str() {
        "bystander" => BYSTANDER,
        "educator" => EDUCATOR,
        "victim" => VICTIM,
        "bully" => BULLY,
        _ => EDUCATOR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_tags_resolve_exactly() {
        assert_eq!(resolve("bystander").name, "Tom");
        assert_eq!(resolve("educator").name, "Ms. Smith");
        assert_eq!(resolve("victim").name, "Dylan");
        assert_eq!(resolve("bully").name, "Sarah");
    }

    #[test]
    fn resolution_is_case_insensitive() {
        assert_eq!(resolve("Bystander"), BYSTANDER);
        assert_eq!(resolve("EDUCATOR"), EDUCATOR);
        assert_eq!(resolve("ViCtIm"), VICTIM);
        assert_eq!(resolve("BULLY"), BULLY);
    }

    #[test]
    fn unknown_tags_default_to_educator() {
        assert_eq!(resolve("moderator"), EDUCATOR);
        assert_eq!(resolve(""), EDUCATOR);
        assert_eq!(resolve("teacher "), EDUCATOR);
    }
}
