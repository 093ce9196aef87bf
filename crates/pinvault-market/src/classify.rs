//! Default collection and category for listings imported without them,
//! guessed from keywords in the listing title. First match wins.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub collection: &'static str,
    pub category: &'static str,
}

const RULES: &[(&[&str], Classification)] = &[
    (
        &["star wars"],
        Classification {
            collection: "Star Wars",
            category: "Star Wars",
        },
    ),
    (
        &["princess", "ariel", "belle", "cinderella", "jasmine"],
        Classification {
            collection: "Disney Princesses",
            category: "Princesses",
        },
    ),
    (
        &["villain", "maleficent", "ursula", "jafar", "evil queen"],
        Classification {
            collection: "Disney Villains",
            category: "Villains",
        },
    ),
    (
        &["mickey", "minnie", "donald", "goofy"],
        Classification {
            collection: "Mickey and Friends",
            category: "Classic Disney",
        },
    ),
    (
        &["haunted", "splash", "space", "pirates"],
        Classification {
            collection: "Disney Parks",
            category: "Park Attractions",
        },
    ),
];

const FALLBACK: Classification = Classification {
    collection: "Disney Collection",
    category: "Disney Pins",
};

pub fn classify(title: &str) -> Classification {
    let title = title.to_lowercase();
    RULES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| title.contains(k)))
        .map(|(_, class)| *class)
        .unwrap_or(FALLBACK)
}
