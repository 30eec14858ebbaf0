//! Game vocabulary shared by entities, transformers and exporters.
//!
//! Every enum here round-trips through the same lowercase (or kebab-case)
//! names used in payloads, API responses and exported documents.

use serde::{Deserialize, Serialize};

/// Error for an unrecognised vocabulary string
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid {kind}: {value}")]
pub struct ParseError {
    pub kind: &'static str,
    pub value: String,
}

macro_rules! vocabulary {
    (
        $(#[$meta:meta])*
        $name:ident ($label:literal) {
            $($variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $text)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }

            pub fn is_valid(value: &str) -> bool {
                value.parse::<Self>().is_ok()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = ParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    _ => Err(ParseError {
                        kind: $label,
                        value: s.to_string(),
                    }),
                }
            }
        }
    };
}

vocabulary! {
    /// Damage elements and status effects
    Element("element") {
        Fire => "fire",
        Water => "water",
        Ice => "ice",
        Thunder => "thunder",
        Dragon => "dragon",
        Poison => "poison",
        Sleep => "sleep",
        Paralysis => "paralysis",
        Blast => "blast",
        Stun => "stun",
    }
}

impl Element {
    /// Elements an armor piece carries a resistance value for
    pub const RESISTANCES: &'static [Element] = &[
        Element::Fire,
        Element::Water,
        Element::Ice,
        Element::Thunder,
        Element::Dragon,
    ];
}

vocabulary! {
    /// Equipment rank
    Rank("rank") {
        Low => "low",
        High => "high",
        Master => "master",
    }
}

vocabulary! {
    /// Armor slot a piece occupies
    ArmorType("armor type") {
        Head => "head",
        Chest => "chest",
        Gloves => "gloves",
        Waist => "waist",
        Legs => "legs",
    }
}

vocabulary! {
    WeaponType("weapon type") {
        GreatSword => "great-sword",
        LongSword => "long-sword",
        SwordAndShield => "sword-and-shield",
        DualBlades => "dual-blades",
        Hammer => "hammer",
        HuntingHorn => "hunting-horn",
        Lance => "lance",
        Gunlance => "gunlance",
        SwitchAxe => "switch-axe",
        ChargeBlade => "charge-blade",
        InsectGlaive => "insect-glaive",
        LightBowgun => "light-bowgun",
        HeavyBowgun => "heavy-bowgun",
        Bow => "bow",
    }
}

vocabulary! {
    DamageType("damage type") {
        Sever => "sever",
        Blunt => "blunt",
        Projectile => "projectile",
    }
}

/// Weapon attribute keys populated by the scraper and the weapon transformer
pub mod attribute {
    pub const AFFINITY: &str = "affinity";
    pub const ELDERSEAL: &str = "elderseal";
    pub const PHIAL_TYPE: &str = "phialType";
    pub const SHELLING_TYPE: &str = "shellingType";
    pub const DEFENSE: &str = "defense";
    pub const COATINGS: &str = "coatings";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_parse() {
        assert_eq!("fire".parse::<Element>().unwrap(), Element::Fire);
        assert_eq!("dragon".parse::<Element>().unwrap(), Element::Dragon);
        assert!("Fire".parse::<Element>().is_err());
        assert!(!Element::is_valid("lava"));
    }

    #[test]
    fn test_resistance_elements() {
        let names: Vec<&str> = Element::RESISTANCES.iter().map(|e| e.as_str()).collect();
        assert_eq!(names, vec!["fire", "water", "ice", "thunder", "dragon"]);
    }

    #[test]
    fn test_weapon_type_round_trip() {
        for weapon_type in WeaponType::ALL {
            assert_eq!(weapon_type.as_str().parse::<WeaponType>().unwrap(), *weapon_type);
        }
        assert_eq!(WeaponType::ALL.len(), 14);
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&WeaponType::SwordAndShield).unwrap();
        assert_eq!(json, "\"sword-and-shield\"");
        let rank: Rank = serde_json::from_str("\"master\"").unwrap();
        assert_eq!(rank, Rank::Master);
    }

    #[test]
    fn test_parse_error_message() {
        let err = "legs".parse::<Rank>().unwrap_err();
        assert_eq!(err.to_string(), "Invalid rank: legs");
    }
}
