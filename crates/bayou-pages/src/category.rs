//! The fixed table of consolidation categories.

/// A group of related topics that share one consolidated page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Category {
  /// URL-safe identifier, e.g. `port-arthur`.
  pub key:          &'static str,
  /// Primary search term matched against researched topics.
  pub name:         &'static str,
  pub display_name: &'static str,
  pub description:  &'static str,
  /// Further substrings that place a topic in this category.
  pub related:      &'static [&'static str],
}

pub const CATEGORIES: &[Category] = &[
  Category {
    key:          "spindletop",
    name:         "spindletop",
    display_name: "Spindletop and the Oil Boom",
    description:  "The 1901 gusher south of Beaumont and the boom that followed.",
    related:      &["lucas gusher", "gladys city", "oil boom", "oil", "petrochemical"],
  },
  Category {
    key:          "beaumont",
    name:         "beaumont",
    display_name: "Beaumont",
    description:  "The Jefferson County seat on the Neches River.",
    related:      &["lamar university", "neches"],
  },
  Category {
    key:          "port-arthur",
    name:         "port arthur",
    display_name: "Port Arthur",
    description:  "Refinery port on Sabine Lake.",
    related:      &["sabine pass", "nederland", "groves", "port neches"],
  },
  Category {
    key:          "orange",
    name:         "orange",
    display_name: "Orange and the Sabine",
    description:  "Shipyards, sawmills and the Louisiana border.",
    related:      &["shipbuilding", "shipyard", "vidor"],
  },
  Category {
    key:          "hurricanes",
    name:         "hurricane",
    display_name: "Hurricanes and Floods",
    description:  "Gulf storms that reshaped the coast.",
    related:      &["storm", "flood"],
  },
  Category {
    key:          "music",
    name:         "music",
    display_name: "Music of the Golden Triangle",
    description:  "Blues, rock, country and zydeco from Southeast Texas.",
    related:      &["janis joplin", "big bopper", "george jones", "zydeco"],
  },
  Category {
    key:          "lumber",
    name:         "lumber",
    display_name: "Timber and the Big Thicket",
    description:  "Sawmill towns and the East Texas pine forests.",
    related:      &["timber", "big thicket", "sawmill", "silsbee"],
  },
];

impl Category {
  /// Search terms: the category name followed by its related terms.
  pub fn terms(&self) -> Vec<String> {
    std::iter::once(self.name)
      .chain(self.related.iter().copied())
      .map(str::to_owned)
      .collect()
  }

  /// Whether a researched topic string belongs to this category.
  pub fn matches(&self, topic: &str) -> bool {
    let topic = topic.to_lowercase();
    std::iter::once(self.name)
      .chain(self.related.iter().copied())
      .any(|term| topic.contains(term))
  }
}

/// Look up a category by key, case-insensitively.
pub fn find(key: &str) -> Option<&'static Category> {
  CATEGORIES.iter().find(|c| c.key.eq_ignore_ascii_case(key.trim()))
}

/// Every category a topic belongs to, in table order.
pub fn matching(topic: &str) -> Vec<&'static Category> {
  CATEGORIES.iter().filter(|c| c.matches(topic)).collect()
}
