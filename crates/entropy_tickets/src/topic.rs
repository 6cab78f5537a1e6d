//! The ticket topic registry.
//!
//! Every topic carries its modal title, the ordered field specification, the
//! constant keys for its channel category and mention role, and the label
//! under which it appears on the status board. Intake, provisioning and
//! assignment all consult this one registry.

use strum::EnumIter;

/// Text input rendering style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldStyle {
    /// Single-line input
    Short,
    /// Multi-line input
    Paragraph,
}

/// One modal field of a topic.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    /// Label shown above the input
    pub label: &'static str,
    /// Short or paragraph styling
    pub style: FieldStyle,
    /// Whether the field must be filled
    pub required: bool,
    /// Optional character limit
    pub max_length: Option<u16>,
}

const fn short(label: &'static str, required: bool) -> FieldSpec {
    FieldSpec {
        label,
        style: FieldStyle::Short,
        required,
        max_length: None,
    }
}

const fn paragraph(label: &'static str, required: bool, max_length: u16) -> FieldSpec {
    FieldSpec {
        label,
        style: FieldStyle::Paragraph,
        required,
        max_length: Some(max_length),
    }
}

/// Static metadata of a topic.
#[derive(Debug, Clone, Copy)]
pub struct TopicSpec {
    /// Stable id, doubles as the modal custom id
    pub id: &'static str,
    /// Title of the submission modal
    pub modal_title: &'static str,
    /// Human label used on the status board and the pinned summary
    pub area_label: &'static str,
    /// Ordered field specification (2–5 entries)
    pub fields: &'static [FieldSpec],
    /// Constant key of the category the ticket channel is created under
    pub category_key: &'static str,
    /// Constant key of the role (or user) mentioned when the channel opens
    pub role_key: &'static str,
    /// Pro-teams quirk: mention a configured user instead of a role
    pub mention_user: bool,
}

/// Closed enumeration of ticket topics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum Topic {
    /// Diamond Club membership application
    DiamondClub,
    /// Pro team application
    ProTeams,
    /// Staff application
    StaffApplication,
    /// Content creator application
    ContentCreator,
    /// Support / contact request
    Support,
    /// Anything else
    Other,
    /// Community team: League of Legends
    GameLol,
    /// Community team: Rainbow Six
    GameR6,
    /// Community team: Counter-Strike 2
    GameCs2,
    /// Community team: Valorant
    GameValorant,
    /// Community team: Rocket League
    GameRocketLeague,
    /// Community team: other game
    GameOther,
}

const DIAMOND_CLUB_FIELDS: &[FieldSpec] = &[
    short("Vorname", true),
    short("Alter", true),
    short("Dein Main Game", true),
    paragraph("Gib uns kurz an wann du Zeit hast", true, 400),
];

const PRO_TEAMS_FIELDS: &[FieldSpec] = &[
    short("Vorname", true),
    short("Alter", true),
    short("Welches Spiel?", true),
    paragraph("Erfahrungen im Team?", true, 400),
    paragraph("Tracker & Social Media", true, 400),
];

const STAFF_APPLICATION_FIELDS: &[FieldSpec] = &[
    short("Vorname", true),
    short("Alter", false),
    short("Für was bewirbst du dich?", true),
    paragraph("Erfahrungen in dem Bereich?", true, 400),
    paragraph("Stelle dich kurz vor", true, 400),
];

const CONTENT_CREATOR_FIELDS: &[FieldSpec] = &[
    short("Vorname", true),
    short("Alter", false),
    paragraph("Social Links", true, 400),
    paragraph("Weiteres", false, 400),
];

const SUPPORT_FIELDS: &[FieldSpec] = &[
    short("Vorname", true),
    paragraph("Was ist dein Anliegen?", true, 750),
];

const GAME_LOL_FIELDS: &[FieldSpec] = &[
    short("Vorname", true),
    short("Alter", false),
    short("Main Rolle", true),
    short("Rang", true),
    short("op.gg Link", true),
];

const GAME_R6_FIELDS: &[FieldSpec] = &[
    short("Vorname", true),
    short("Alter", false),
    short("R6 Tracker Link", true),
    short("Plattform", true),
    paragraph("Infos über DICH!", true, 600),
];

const GAME_CS2_FIELDS: &[FieldSpec] = &[
    short("Vorname", true),
    short("Alter", false),
    short("Steam Profile Link", true),
    short("Rang", true),
];

const GAME_VALORANT_FIELDS: &[FieldSpec] = &[
    short("Vorname", true),
    short("Alter", false),
    short("InGame Name", true),
    short("Tracker Link", true),
];

const GAME_ROCKET_LEAGUE_FIELDS: &[FieldSpec] = &[
    short("Vorname", true),
    short("Alter", false),
    short("InGame Name", true),
    short("RL Tracker Network Link", true),
    short("Wunsch Elo", true),
];

const GAME_OTHER_FIELDS: &[FieldSpec] = &[
    short("Vorname", true),
    short("Alter", false),
    paragraph("Bitte erkläre kurz für was du dich bewirbst", true, 400),
];

const DIAMOND_CLUB_SPEC: TopicSpec = TopicSpec {
    id: "ticket_diamond_club",
    modal_title: "Bewerbung Diamond Club",
    area_label: "Diamond Club Bewerbung",
    fields: DIAMOND_CLUB_FIELDS,
    category_key: "CATEGORY_TICKET_DIAMOND_CLUB",
    role_key: "ROLE_TICKET_DIAMOND_CLUB",
    mention_user: false,
};

const PRO_TEAMS_SPEC: TopicSpec = TopicSpec {
    id: "ticket_pro_teams",
    modal_title: "Bewerbung für ein Pro Team",
    area_label: "Pro Team Bewerbung",
    fields: PRO_TEAMS_FIELDS,
    category_key: "CATEGORY_TICKET_PRO_TEAMS",
    role_key: "ROLE_TICKET_PROTEAMS",
    mention_user: true,
};

const STAFF_APPLICATION_SPEC: TopicSpec = TopicSpec {
    id: "ticket_bewerbung_staff",
    modal_title: "Bewerbung Staff",
    area_label: "Bewerbung Staff",
    fields: STAFF_APPLICATION_FIELDS,
    category_key: "CATEGORY_TICKET_STAFFAPPLICATION",
    role_key: "ROLE_TICKET_STAFFAPPLICATION",
    mention_user: false,
};

const CONTENT_CREATOR_SPEC: TopicSpec = TopicSpec {
    id: "ticket_content_creator",
    modal_title: "Bewerbung Content Creator",
    area_label: "Content Creator",
    fields: CONTENT_CREATOR_FIELDS,
    category_key: "CATEGORY_TICKET_CONTENT_CREATOR",
    role_key: "ROLE_TICKET_CONTENT_CREATOR",
    mention_user: false,
};

const SUPPORT_SPEC: TopicSpec = TopicSpec {
    id: "ticket_support_kontakt",
    modal_title: "Support Anfrage",
    area_label: "Kontakt/Support",
    fields: SUPPORT_FIELDS,
    category_key: "CATEGORY_TICKET_SUPPORT_CONTACT",
    role_key: "ROLE_TICKET_SUPPORT_CONTACT",
    mention_user: false,
};

const OTHER_SPEC: TopicSpec = TopicSpec {
    id: "ticket_sonstiges",
    modal_title: "Sonstige Anfragen",
    area_label: "Sonstiges",
    fields: SUPPORT_FIELDS,
    category_key: "CATEGORY_TICKET_SONSTIGE",
    role_key: "ROLE_TICKET_SONSTIGE",
    mention_user: false,
};

const GAME_LOL_SPEC: TopicSpec = TopicSpec {
    id: "ticket_game_lol",
    modal_title: "League of Legends Bewerbung",
    area_label: "League of Legends",
    fields: GAME_LOL_FIELDS,
    category_key: "CATEGORY_TICKET_COMMUNITY_TEAMS",
    role_key: "ROLE_TICKET_GAME_LOL",
    mention_user: false,
};

const GAME_R6_SPEC: TopicSpec = TopicSpec {
    id: "ticket_game_r6",
    modal_title: "RainbowSix Bewerbung",
    area_label: "Rainbow Six",
    fields: GAME_R6_FIELDS,
    category_key: "CATEGORY_TICKET_COMMUNITY_TEAMS",
    role_key: "ROLE_TICKET_GAME_R6",
    mention_user: false,
};

const GAME_CS2_SPEC: TopicSpec = TopicSpec {
    id: "ticket_game_cs2",
    modal_title: "CS2 Bewerbung",
    area_label: "Counter Strike 2",
    fields: GAME_CS2_FIELDS,
    category_key: "CATEGORY_TICKET_COMMUNITY_TEAMS",
    role_key: "ROLE_TICKET_GAME_CS2",
    mention_user: false,
};

const GAME_VALORANT_SPEC: TopicSpec = TopicSpec {
    id: "ticket_game_valorant",
    modal_title: "Valorant Bewerbung",
    area_label: "Valorant",
    fields: GAME_VALORANT_FIELDS,
    category_key: "CATEGORY_TICKET_COMMUNITY_TEAMS",
    role_key: "ROLE_TICKET_GAME_VALORANT",
    mention_user: false,
};

const GAME_ROCKET_LEAGUE_SPEC: TopicSpec = TopicSpec {
    id: "ticket_game_rocket_league",
    modal_title: "Rocket League Bewerbung",
    area_label: "Rocket League",
    fields: GAME_ROCKET_LEAGUE_FIELDS,
    category_key: "CATEGORY_TICKET_COMMUNITY_TEAMS",
    role_key: "ROLE_TICKET_GAME_ROCKETLEAGUE",
    mention_user: false,
};

const GAME_OTHER_SPEC: TopicSpec = TopicSpec {
    id: "ticket_game_sonstige",
    modal_title: "Sonstige Bewerbungen",
    area_label: "Spiel Sonstige",
    fields: GAME_OTHER_FIELDS,
    category_key: "CATEGORY_TICKET_COMMUNITY_TEAMS",
    role_key: "ROLE_TICKET_GAME_SONSTIGE",
    mention_user: false,
};

impl Topic {
    /// Registry lookup.
    pub fn spec(&self) -> &'static TopicSpec {
        match self {
            Topic::DiamondClub => &DIAMOND_CLUB_SPEC,
            Topic::ProTeams => &PRO_TEAMS_SPEC,
            Topic::StaffApplication => &STAFF_APPLICATION_SPEC,
            Topic::ContentCreator => &CONTENT_CREATOR_SPEC,
            Topic::Support => &SUPPORT_SPEC,
            Topic::Other => &OTHER_SPEC,
            Topic::GameLol => &GAME_LOL_SPEC,
            Topic::GameR6 => &GAME_R6_SPEC,
            Topic::GameCs2 => &GAME_CS2_SPEC,
            Topic::GameValorant => &GAME_VALORANT_SPEC,
            Topic::GameRocketLeague => &GAME_ROCKET_LEAGUE_SPEC,
            Topic::GameOther => &GAME_OTHER_SPEC,
        }
    }

    /// Stable topic id (also the modal custom id).
    pub fn id(&self) -> &'static str {
        self.spec().id
    }

    /// Parse a topic from its stable id.
    pub fn from_id(id: &str) -> Option<Topic> {
        use strum::IntoEnumIterator;
        Topic::iter().find(|t| t.id() == id)
    }

    /// Label under which the topic groups on the status board.
    pub fn area_label(&self) -> &'static str {
        self.spec().area_label
    }
}

/// Entries of the top-level topic selector: (label, selector value).
///
/// `ticket_community_teams` is selector-only; it expands into
/// [`GAME_SELECT_OPTIONS`] instead of a modal.
pub const TOPIC_SELECT_OPTIONS: &[(&str, &str)] = &[
    ("Beitritt Diamond Club", "ticket_diamond_club"),
    ("Bewerbung Competetive Teams", "ticket_community_teams"),
    ("Bewerbung Management", "ticket_bewerbung_staff"),
    ("Bewerbung Content Creator", "ticket_content_creator"),
    ("Bewerbung Pro Teams", "ticket_pro_teams"),
    ("Support/Kontakt", "ticket_support_kontakt"),
    ("Sonstiges", "ticket_sonstiges"),
];

/// Selector value that expands into the game selector.
pub const COMMUNITY_TEAMS_VALUE: &str = "ticket_community_teams";

/// Entries of the game selector: (label, selector value).
pub const GAME_SELECT_OPTIONS: &[(&str, &str)] = &[
    ("League of Legends", "ticket_game_lol"),
    ("RainbowSix", "ticket_game_r6"),
    ("CS2", "ticket_game_cs2"),
    ("Valorant", "ticket_game_valorant"),
    ("Rocket League", "ticket_game_rocket_league"),
    ("Sonstige", "ticket_game_sonstige"),
];

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn every_topic_has_two_to_five_fields() {
        for topic in Topic::iter() {
            let n = topic.spec().fields.len();
            assert!((2..=5).contains(&n), "{:?} has {} fields", topic, n);
        }
    }

    #[test]
    fn topic_ids_round_trip() {
        for topic in Topic::iter() {
            assert_eq!(Topic::from_id(topic.id()), Some(topic));
        }
        assert_eq!(Topic::from_id("ticket_unknown"), None);
    }

    #[test]
    fn topic_ids_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for topic in Topic::iter() {
            assert!(seen.insert(topic.id()), "duplicate id {}", topic.id());
        }
    }

    #[test]
    fn selector_values_resolve_or_expand() {
        for (_, value) in TOPIC_SELECT_OPTIONS {
            if *value == COMMUNITY_TEAMS_VALUE {
                continue;
            }
            assert!(Topic::from_id(value).is_some(), "unresolvable {}", value);
        }
        for (_, value) in GAME_SELECT_OPTIONS {
            assert!(Topic::from_id(value).is_some(), "unresolvable {}", value);
        }
    }

    #[test]
    fn first_field_is_always_required_name() {
        for topic in Topic::iter() {
            let first = &topic.spec().fields[0];
            assert_eq!(first.label, "Vorname");
            assert!(first.required);
        }
    }

    #[test]
    fn only_pro_teams_mentions_a_user() {
        for topic in Topic::iter() {
            assert_eq!(topic.spec().mention_user, topic == Topic::ProTeams);
        }
    }
}
