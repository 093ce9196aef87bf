//! Bootstrap catalog for an empty database, plus the admin reseed.
//!
//! Every sample pin gets 30 daily synthetic price points ending today:
//! 80% of its listed value, a linear climb of up to 30%, and ±2.5 of noise.

use chrono::{Duration, Utc};
use pinvault_types::models::NewPin;
use rand::Rng;
use rusqlite::Connection;
use tracing::info;

use crate::queries::{format_ts, insert_pin, insert_price};
use crate::{Database, Result};

pub const SEED_SOURCE: &str = "eBay";
pub const SEED_HISTORY_DAYS: i64 = 30;

struct SamplePin {
    name: &'static str,
    description: &'static str,
    collection: &'static str,
    image_url: &'static str,
    category: &'static str,
    release_date: &'static str,
    limited: bool,
    value: f64,
}

const ALADDIN: &str = "Aladdin 30th Anniversary";

const SAMPLE_PINS: &[SamplePin] = &[
    SamplePin {
        name: "Aladdin 30th Anniversary - Jasmine & Rajah",
        description: "Princess Jasmine with her loyal tiger companion Rajah.",
        collection: ALADDIN,
        image_url: "https://pinandpop.com/cdn/shop/products/image_ba3a1d35-aba5-4c85-a13d-c4af9b31b4c9_1500x.jpg",
        category: "Characters",
        release_date: "2022-11-25",
        limited: true,
        value: 43.99,
    },
    SamplePin {
        name: "Aladdin 30th Anniversary - Genie Magic Lamp",
        description: "The Genie emerging from his magic lamp, with gold accents.",
        collection: ALADDIN,
        image_url: "https://pinandpop.com/cdn/shop/products/image_b5af4ef1-e9ef-4ebc-8bfe-53b35ad0ee21_1500x.jpg",
        category: "Characters",
        release_date: "2022-11-25",
        limited: true,
        value: 45.50,
    },
    SamplePin {
        name: "Aladdin 30th Anniversary - Jafar",
        description: "The villainous Jafar with his cobra staff.",
        collection: ALADDIN,
        image_url: "https://pinandpop.com/cdn/shop/products/image_97bd3c12-63bb-4d91-872c-0b1a23841dba_1500x.jpg",
        category: "Villains",
        release_date: "2022-11-25",
        limited: true,
        value: 47.99,
    },
    SamplePin {
        name: "Aladdin 30th Anniversary - Abu",
        description: "Aladdin's mischievous monkey companion Abu holding a jewel.",
        collection: ALADDIN,
        image_url: "https://pinandpop.com/cdn/shop/products/image_cf2b77e9-ecce-4f96-8a51-8a4a9f12ab9f_1500x.jpg",
        category: "Characters",
        release_date: "2022-11-25",
        limited: true,
        value: 38.99,
    },
    SamplePin {
        name: "Aladdin 30th Anniversary - Magic Carpet Ride",
        description: "Aladdin and Jasmine on their magic carpet ride.",
        collection: ALADDIN,
        image_url: "https://pinandpop.com/cdn/shop/products/image_88c14d4b-0d01-4878-b23e-9c7a066a6f6a_1500x.jpg",
        category: "Scenes",
        release_date: "2022-11-25",
        limited: true,
        value: 52.99,
    },
    SamplePin {
        name: "Aladdin 30th Anniversary - Iago",
        description: "Jafar's parrot sidekick Iago.",
        collection: ALADDIN,
        image_url: "https://pinandpop.com/cdn/shop/products/image_26ae0d1d-98ea-469d-a7d8-2172bb4a16ac_1500x.jpg",
        category: "Characters",
        release_date: "2022-11-25",
        limited: true,
        value: 39.50,
    },
    SamplePin {
        name: "Mickey Mouse 50th Anniversary",
        description: "Commemorative Mickey Mouse pin with gold detailing and iconic pose.",
        collection: "Disney Celebrations",
        image_url: "https://cdn-ssl.s7.disneystore.com/is/image/DisneyShopping/6505057372939",
        category: "Characters",
        release_date: "2021-10-01",
        limited: true,
        value: 45.99,
    },
    SamplePin {
        name: "Haunted Mansion: Hitchhiking Ghosts",
        description: "The Hitchhiking Ghosts from the Haunted Mansion attraction.",
        collection: "Disney Parks",
        image_url: "https://cdn-ssl.s7.disneystore.com/is/image/DisneyShopping/400020820926",
        category: "Attractions",
        release_date: "2020-09-01",
        limited: false,
        value: 35.50,
    },
    SamplePin {
        name: "Star Wars: The Mandalorian and Grogu",
        description: "The Mandalorian holding Grogu in his hovering pram.",
        collection: "Star Wars",
        image_url: "https://cdn-ssl.s7.disneystore.com/is/image/DisneyShopping/6505057372911",
        category: "Movies",
        release_date: "2019-12-15",
        limited: true,
        value: 32.75,
    },
    SamplePin {
        name: "Stitch with Dole Whip",
        description: "Stitch enjoying a classic Dole Whip treat.",
        collection: "Disney Food",
        image_url: "https://cdn-ssl.s7.disneystore.com/is/image/DisneyShopping/400929419889",
        category: "Characters",
        release_date: "2022-06-01",
        limited: false,
        value: 28.99,
    },
    SamplePin {
        name: "Disney Castle 100th Anniversary",
        description: "Cinderella Castle with 100th anniversary detailing and sparkle effects.",
        collection: "Anniversary Collection",
        image_url: "https://cdn-ssl.s7.disneystore.com/is/image/DisneyShopping/400022345146",
        category: "Landmarks",
        release_date: "2023-01-01",
        limited: true,
        value: 49.99,
    },
    SamplePin {
        name: "Minnie Mouse: Vintage Style",
        description: "Retro Minnie Mouse featuring early animation art.",
        collection: "Disney Classics",
        image_url: "https://cdn-ssl.s7.disneystore.com/is/image/DisneyShopping/400021045697",
        category: "Characters",
        release_date: "2022-05-15",
        limited: false,
        value: 29.99,
    },
    SamplePin {
        name: "WALL-E and EVE",
        description: "WALL-E and EVE together in outer space.",
        collection: "Pixar Collection",
        image_url: "https://cdn-ssl.s7.disneystore.com/is/image/DisneyShopping/400929695953",
        category: "Pixar",
        release_date: "2021-08-10",
        limited: false,
        value: 27.99,
    },
    SamplePin {
        name: "Marvel: Avengers Logo",
        description: "Avengers logo with metallic detailing and gemstone accents.",
        collection: "Marvel Heroes",
        image_url: "https://cdn-ssl.s7.disneystore.com/is/image/DisneyShopping/6505057373840",
        category: "Marvel",
        release_date: "2022-11-25",
        limited: false,
        value: 32.50,
    },
    SamplePin {
        name: "Jungle Cruise: Skipper Mickey",
        description: "Mickey as a Jungle Cruise skipper with the boat behind him.",
        collection: "Disney Parks",
        image_url: "https://cdn-ssl.s7.disneystore.com/is/image/DisneyShopping/400020820859",
        category: "Attractions",
        release_date: "2022-07-30",
        limited: true,
        value: 38.99,
    },
    SamplePin {
        name: "Tinker Bell: Pixie Dust Trail",
        description: "Tinker Bell leaving a trail of sparkling pixie dust.",
        collection: "Disney Fairies",
        image_url: "https://cdn-ssl.s7.disneystore.com/is/image/DisneyShopping/6505057373734",
        category: "Characters",
        release_date: "2023-02-14",
        limited: false,
        value: 26.99,
    },
    SamplePin {
        name: "Goofy: Through the Years",
        description: "Goofy's evolution through decades of animation.",
        collection: "Evolution Series",
        image_url: "https://cdn-ssl.s7.disneystore.com/is/image/DisneyShopping/400021045673",
        category: "Characters",
        release_date: "2023-03-09",
        limited: true,
        value: 42.50,
    },
    SamplePin {
        name: "Disney Monorail",
        description: "The Disney Parks monorail with moving parts.",
        collection: "Disney Transportation",
        image_url: "https://cdn-ssl.s7.disneystore.com/is/image/DisneyShopping/400020820873",
        category: "Transportation",
        release_date: "2022-08-12",
        limited: false,
        value: 33.75,
    },
];

/// Number of pins the bootstrap catalog contains.
pub fn sample_size() -> usize {
    SAMPLE_PINS.len()
}

/// Synthetic price for day `day` (1-based) of the seeded history.
/// `noise` is a uniform sample from [0, 1).
pub fn synthetic_price(value: f64, day: i64, noise: f64) -> f64 {
    let base = value * 0.8;
    let trend = (day as f64 / SEED_HISTORY_DAYS as f64) * value * 0.3;
    base + trend + (noise - 0.5) * 5.0
}

impl Database {
    /// Seeds the sample catalog when no pins exist. Returns the number of pins inserted.
    pub fn seed_if_empty(&self) -> Result<usize> {
        self.with_tx(|tx| {
            let existing: i64 = tx.query_row("SELECT COUNT(*) FROM pins", [], |r| r.get(0))?;
            if existing > 0 {
                return Ok(0);
            }
            let count = seed_catalog(tx, &mut rand::rng())?;
            info!("Seeded {} sample pins", count);
            Ok(count)
        })
    }

    /// Wipes the catalog together with every row that references it, then seeds again.
    pub fn reseed(&self) -> Result<usize> {
        self.with_tx(|tx| {
            tx.execute_batch(
                "DELETE FROM pin_price_history;
                 DELETE FROM want_list;
                 DELETE FROM user_pins;
                 DELETE FROM pins;",
            )?;
            let count = seed_catalog(tx, &mut rand::rng())?;
            info!("Reseeded catalog with {} sample pins", count);
            Ok(count)
        })
    }
}

fn seed_catalog<R: Rng>(conn: &Connection, rng: &mut R) -> Result<usize> {
    let now = Utc::now();
    for sample in SAMPLE_PINS {
        let pin = insert_pin(
            conn,
            &NewPin {
                name: sample.name.to_string(),
                description: Some(sample.description.to_string()),
                collection: Some(sample.collection.to_string()),
                image_url: Some(sample.image_url.to_string()),
                category: Some(sample.category.to_string()),
                release_date: Some(sample.release_date.to_string()),
                is_limited_edition: sample.limited,
                current_value: Some(sample.value),
            },
        )?;

        for day in 1..=SEED_HISTORY_DAYS {
            let recorded_at = now - Duration::days(SEED_HISTORY_DAYS - day);
            let price = synthetic_price(sample.value, day, rng.random::<f64>());
            insert_price(conn, pin.id, price, SEED_SOURCE, &format_ts(recorded_at))?;
        }
    }
    Ok(SAMPLE_PINS.len())
}
