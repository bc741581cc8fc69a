//! Starter reference data for an empty database.

use bayou_core::{
  history::{NewCity, NewHistoricalFact, NewPeriod, NewTopic},
  store::HistoryStore,
};

use crate::{Result, SqliteStore};

const CITIES: &[(&str, &str, Option<i32>, &str)] = &[
  ("Beaumont", "Jefferson", Some(1835), "County seat of Jefferson County on the Neches River; transformed by the 1901 Spindletop gusher."),
  ("Port Arthur", "Jefferson", Some(1898), "Gulf port founded by Arthur Stilwell as the terminus of the Kansas City, Pittsburg and Gulf Railroad."),
  ("Orange", "Orange", Some(1836), "Sabine River town known for lumber, shipbuilding and its Cajun and Creole heritage."),
  ("Nederland", "Jefferson", Some(1897), "Settled by Dutch immigrants drawn by the Port Arthur railroad."),
  ("Port Neches", "Jefferson", Some(1859), "Riverfront town that grew around refining and synthetic rubber plants."),
  ("Groves", "Jefferson", Some(1920), "Named for its pecan groves; grew with the refineries of the Golden Triangle."),
  ("Vidor", "Orange", Some(1909), "Lumber town named for the timber operator Charles Shelton Vidor."),
  ("Silsbee", "Hardin", Some(1894), "Railroad and sawmill town at the edge of the Big Thicket."),
];

const TOPICS: &[(&str, &str, &str)] = &[
  ("Spindletop", "industry", "The salt dome oil field south of Beaumont and the gusher that began the Texas oil age."),
  ("Oil Boom", "industry", "The rush of drillers, speculators and refiners that followed Spindletop."),
  ("Shipbuilding", "industry", "Shipyards at Orange, Beaumont and Port Arthur, especially during both World Wars."),
  ("Lumber Industry", "industry", "Sawmills and timber companies harvesting the East Texas pine forests."),
  ("Rice Farming", "agriculture", "Irrigated rice cultivation on the coastal prairie."),
  ("Hurricanes", "disaster", "Gulf storms that shaped the coast, from 1900 to Rita, Ike and Harvey."),
  ("Music", "culture", "Blues, rock, country and zydeco musicians from the Golden Triangle."),
];

const PERIODS: &[(&str, i32, i32, &str)] = &[
  ("Early Settlement", 1820, 1860, "Anglo-American and Cajun settlement along the Neches and Sabine rivers."),
  ("Timber and Rails", 1860, 1900, "Railroads and sawmills open the pine forests."),
  ("Oil Boom", 1901, 1930, "Spindletop and the growth of the refining towns."),
  ("War Industry", 1930, 1960, "Shipyards, refineries and synthetic rubber supply two world wars."),
  ("Modern Era", 1960, 2030, "Petrochemicals, hurricanes and recovery."),
];

struct SeedFact {
  title:      &'static str,
  content:    &'static str,
  event_date: Option<&'static str>,
  year:       i32,
  city:       &'static str,
  topic:      &'static str,
  source:     &'static str,
  importance: i64,
}

const FACTS: &[SeedFact] = &[
  SeedFact {
    title:      "The Lucas Gusher",
    content:    "On January 10, 1901, the Lucas well at Spindletop blew in, spraying oil more than 150 feet into the air for nine days before it was capped.",
    event_date: Some("January 10, 1901"),
    year:       1901,
    city:       "Beaumont",
    topic:      "Spindletop",
    source:     "Texas State Historical Association",
    importance: 10,
  },
  SeedFact {
    title:      "Gladys City Boomtown",
    content:    "Pattillo Higgins' Gladys City Oil, Gas and Manufacturing Company had promoted the Spindletop salt dome years before the gusher; the boomtown that grew there is now a museum.",
    event_date: None,
    year:       1892,
    city:       "Beaumont",
    topic:      "Spindletop",
    source:     "Spindletop-Gladys City Boomtown Museum",
    importance: 8,
  },
  SeedFact {
    title:      "Beaumont Population Triples",
    content:    "Within months of the Spindletop discovery Beaumont's population grew from about 9,000 to more than 30,000 as speculators and workers poured in.",
    event_date: None,
    year:       1901,
    city:       "Beaumont",
    topic:      "Oil Boom",
    source:     "Texas State Historical Association",
    importance: 7,
  },
  SeedFact {
    title:      "Refineries at Port Arthur",
    content:    "Gulf Oil and the Texas Company built refineries at Port Arthur in 1902, turning the young port into one of the largest refining centres in the world.",
    event_date: None,
    year:       1902,
    city:       "Port Arthur",
    topic:      "Oil Boom",
    source:     "Museum of the Gulf Coast",
    importance: 7,
  },
  SeedFact {
    title:      "Orange Shipyards in World War II",
    content:    "Consolidated Steel and Levingston shipyards in Orange employed more than 20,000 workers building destroyers and landing craft during World War II.",
    event_date: None,
    year:       1942,
    city:       "Orange",
    topic:      "Shipbuilding",
    source:     "Texas State Historical Association",
    importance: 6,
  },
  SeedFact {
    title:      "Vidor Sawmills",
    content:    "The Miller-Vidor Lumber Company's mills made Vidor a company town in the early twentieth century.",
    event_date: None,
    year:       1909,
    city:       "Vidor",
    topic:      "Lumber Industry",
    source:     "Handbook of Texas",
    importance: 4,
  },
  SeedFact {
    title:      "Rice on the Coastal Prairie",
    content:    "Irrigation canals pumped from the Neches River turned the prairie around Beaumont into one of the leading rice regions of Texas by 1900.",
    event_date: None,
    year:       1898,
    city:       "Beaumont",
    topic:      "Rice Farming",
    source:     "Handbook of Texas",
    importance: 4,
  },
  SeedFact {
    title:      "Hurricane Rita Landfall",
    content:    "Hurricane Rita made landfall near Sabine Pass on September 24, 2005, causing widespread damage across Jefferson and Orange counties.",
    event_date: Some("September 24, 2005"),
    year:       2005,
    city:       "Port Arthur",
    topic:      "Hurricanes",
    source:     "National Weather Service",
    importance: 6,
  },
  SeedFact {
    title:      "Janis Joplin of Port Arthur",
    content:    "Janis Joplin grew up in Port Arthur and graduated from Thomas Jefferson High School in 1960 before leaving for Austin and San Francisco.",
    event_date: None,
    year:       1960,
    city:       "Port Arthur",
    topic:      "Music",
    source:     "Museum of the Gulf Coast",
    importance: 5,
  },
  SeedFact {
    title:      "Synthetic Rubber at Port Neches",
    content:    "The Neches Butane Products plant at Port Neches supplied butadiene for synthetic rubber during World War II.",
    event_date: None,
    year:       1944,
    city:       "Port Neches",
    topic:      "Oil Boom",
    source:     "Handbook of Texas",
    importance: 3,
  },
];

impl SqliteStore {
  /// Insert the starter cities, topics, periods and facts if no cities exist
  /// yet. Returns `true` if anything was written.
  pub async fn seed_if_empty(&self) -> Result<bool> {
    if !self.list_cities().await?.is_empty() {
      return Ok(false);
    }

    let mut city_ids = Vec::with_capacity(CITIES.len());
    for &(name, county, founded_year, description) in CITIES {
      let city = self
        .add_city(NewCity {
          name: name.to_owned(),
          county: Some(county.to_owned()),
          founded_year,
          description: Some(description.to_owned()),
        })
        .await?;
      city_ids.push((name, city.id));
    }

    let mut topic_ids = Vec::with_capacity(TOPICS.len());
    for &(name, category, description) in TOPICS {
      let topic = self
        .add_topic(NewTopic {
          name:        name.to_owned(),
          category:    Some(category.to_owned()),
          description: Some(description.to_owned()),
        })
        .await?;
      topic_ids.push((name, topic.id));
    }

    for &(name, start, end, description) in PERIODS {
      self
        .add_period(NewPeriod {
          name:        name.to_owned(),
          start_year:  Some(start),
          end_year:    Some(end),
          description: Some(description.to_owned()),
        })
        .await?;
    }

    let lookup = |ids: &[(&str, i64)], name: &str| {
      ids.iter().find(|(n, _)| *n == name).map(|(_, id)| *id)
    };

    for fact in FACTS {
      self
        .record_fact(NewHistoricalFact {
          event_date: fact.event_date.map(str::to_owned),
          year: Some(fact.year),
          city_id: lookup(&city_ids, fact.city),
          topic_id: lookup(&topic_ids, fact.topic),
          source_name: Some(fact.source.to_owned()),
          verified: true,
          importance: fact.importance,
          ..NewHistoricalFact::new(fact.title, fact.content)
        })
        .await?;
    }

    tracing::info!(
      cities = CITIES.len(),
      topics = TOPICS.len(),
      facts = FACTS.len(),
      "seeded reference data"
    );
    Ok(true)
  }
}
