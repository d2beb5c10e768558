use serde::{Deserialize, Serialize};

/// Die types the overlay can animate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DieKind {
    D4,
    D6,
    D8,
    D10,
    D12,
    D20,
}

impl DieKind {
    /// All supported die types, smallest first.
    pub const ALL: [DieKind; 6] = [
        DieKind::D4,
        DieKind::D6,
        DieKind::D8,
        DieKind::D10,
        DieKind::D12,
        DieKind::D20,
    ];

    /// Number of faces — also the natural maximum.
    pub fn faces(self) -> u16 {
        match self {
            DieKind::D4 => 4,
            DieKind::D6 => 6,
            DieKind::D8 => 8,
            DieKind::D10 => 10,
            DieKind::D12 => 12,
            DieKind::D20 => 20,
        }
    }

    /// Lowercase label matching pack folder names ("d20").
    pub fn label(self) -> &'static str {
        match self {
            DieKind::D4 => "d4",
            DieKind::D6 => "d6",
            DieKind::D8 => "d8",
            DieKind::D10 => "d10",
            DieKind::D12 => "d12",
            DieKind::D20 => "d20",
        }
    }

    /// Parse a die type label like "d20". Case-insensitive.
    pub fn parse(s: &str) -> Option<DieKind> {
        let s = s.trim();
        DieKind::ALL
            .into_iter()
            .find(|d| d.label().eq_ignore_ascii_case(s))
    }

    /// Whether crit/fumble outcomes apply to this die (the check die).
    pub fn is_check_die(self) -> bool {
        matches!(self, DieKind::D20)
    }
}

impl std::fmt::Display for DieKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// What the overlay window shows. Controls window sizing and layout offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayMode {
    DiceOnly,
    CardOnly,
    #[default]
    DiceAndCard,
}

impl DisplayMode {
    pub fn shows_dice(self) -> bool {
        matches!(self, DisplayMode::DiceOnly | DisplayMode::DiceAndCard)
    }

    pub fn shows_cards(self) -> bool {
        matches!(self, DisplayMode::CardOnly | DisplayMode::DiceAndCard)
    }
}

/// Which screen side cards slide in from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    #[default]
    Left,
    Right,
}

/// A dice roll reported by the chat-bot collaborator.
///
/// For advantage/disadvantage rolls the kept-die selection has already been
/// made upstream: `result_face` is the roll that counts, `secondary_roll`
/// the one that was dropped. The overlay consumes that decision, it never
/// compares the two.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RollEvent {
    /// Character the roll belongs to (used for per-player card tinting).
    #[serde(default)]
    pub character_name: String,
    /// Die type label, e.g. "d20".
    pub die_type: String,
    /// The face that counts (1..=faces).
    pub result_face: u16,
    #[serde(default)]
    pub is_advantage: bool,
    #[serde(default)]
    pub is_disadvantage: bool,
    /// The dropped face for advantage/disadvantage rolls, 0 otherwise.
    #[serde(default)]
    pub secondary_roll: u16,
    /// Preferred color variant name; falls back to the configured default.
    #[serde(default)]
    pub color_preference: Option<String>,
    /// Preferred dice pack id; falls back to the configured default.
    #[serde(default)]
    pub pack_preference: Option<String>,
}

impl RollEvent {
    /// Validate the event at the boundary. Returns the parsed die type.
    ///
    /// Rejection here is the only place an invalid roll can surface — no
    /// sprite is ever constructed from a bad event.
    pub fn validate(&self) -> Result<DieKind, RollEventError> {
        let die = DieKind::parse(&self.die_type)
            .ok_or_else(|| RollEventError::UnknownDieType(self.die_type.clone()))?;
        if self.result_face < 1 || self.result_face > die.faces() {
            return Err(RollEventError::FaceOutOfRange {
                die,
                face: self.result_face,
            });
        }
        if self.is_advantage && self.is_disadvantage {
            return Err(RollEventError::ConflictingAdvantage);
        }
        if self.is_advantage || self.is_disadvantage {
            if self.secondary_roll < 1 || self.secondary_roll > die.faces() {
                return Err(RollEventError::SecondaryOutOfRange {
                    die,
                    face: self.secondary_roll,
                });
            }
        }
        Ok(die)
    }

    /// Whether this event carries a dropped companion die.
    pub fn is_paired(&self) -> bool {
        self.is_advantage || self.is_disadvantage
    }
}

/// Why a roll event was rejected at the boundary.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RollEventError {
    #[error("unknown die type: {0:?}")]
    UnknownDieType(String),
    #[error("face {face} out of range for {die}")]
    FaceOutOfRange { die: DieKind, face: u16 },
    #[error("secondary roll {face} out of range for {die}")]
    SecondaryOutOfRange { die: DieKind, face: u16 },
    #[error("roll cannot be both advantage and disadvantage")]
    ConflictingAdvantage,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d20_roll(face: u16) -> RollEvent {
        RollEvent {
            die_type: "d20".into(),
            result_face: face,
            ..Default::default()
        }
    }

    #[test]
    fn parse_known_die_types() {
        assert_eq!(DieKind::parse("d20"), Some(DieKind::D20));
        assert_eq!(DieKind::parse("D6"), Some(DieKind::D6));
        assert_eq!(DieKind::parse("d7"), None);
        assert_eq!(DieKind::parse(""), None);
    }

    #[test]
    fn faces_match_labels() {
        for die in DieKind::ALL {
            assert_eq!(die.label(), format!("d{}", die.faces()));
        }
    }

    #[test]
    fn valid_roll_passes() {
        assert_eq!(d20_roll(20).validate(), Ok(DieKind::D20));
        assert_eq!(d20_roll(1).validate(), Ok(DieKind::D20));
    }

    #[test]
    fn out_of_range_face_rejected() {
        assert!(matches!(
            d20_roll(21).validate(),
            Err(RollEventError::FaceOutOfRange { .. })
        ));
        assert!(matches!(
            d20_roll(0).validate(),
            Err(RollEventError::FaceOutOfRange { .. })
        ));
    }

    #[test]
    fn unknown_die_rejected() {
        let mut event = d20_roll(3);
        event.die_type = "d13".into();
        assert!(matches!(
            event.validate(),
            Err(RollEventError::UnknownDieType(_))
        ));
    }

    #[test]
    fn conflicting_advantage_rejected() {
        let mut event = d20_roll(15);
        event.is_advantage = true;
        event.is_disadvantage = true;
        event.secondary_roll = 8;
        assert_eq!(event.validate(), Err(RollEventError::ConflictingAdvantage));
    }

    #[test]
    fn advantage_requires_valid_secondary() {
        let mut event = d20_roll(15);
        event.is_advantage = true;
        event.secondary_roll = 0;
        assert!(matches!(
            event.validate(),
            Err(RollEventError::SecondaryOutOfRange { .. })
        ));
        event.secondary_roll = 8;
        assert_eq!(event.validate(), Ok(DieKind::D20));
    }

    #[test]
    fn display_mode_visibility() {
        assert!(DisplayMode::DiceOnly.shows_dice());
        assert!(!DisplayMode::DiceOnly.shows_cards());
        assert!(DisplayMode::DiceAndCard.shows_dice());
        assert!(DisplayMode::DiceAndCard.shows_cards());
        assert!(!DisplayMode::CardOnly.shows_dice());
    }

    #[test]
    fn display_mode_serde_matches_settings_strings() {
        let json = serde_json::to_string(&DisplayMode::DiceAndCard).unwrap();
        assert_eq!(json, "\"dice_and_card\"");
        let mode: DisplayMode = serde_json::from_str("\"dice_only\"").unwrap();
        assert_eq!(mode, DisplayMode::DiceOnly);
    }
}
