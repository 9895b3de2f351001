use std::collections::HashSet;

use crate::types::ChannelDescriptor;

/// xmltv.se feed identifiers and the names their listings are stored under.
pub const XMLTV_CHANNELS: &[(&str, &str)] = &[
    ("aljazeera.net", "Al Jazeera"),
    ("nrk1.nrk.no", "NRK1"),
    ("nrk2.nrk.no", "NRK2"),
    ("nrk3.nrk.no", "NRK3"),
    ("film.tv2.no", "TV2 Film"),
    ("bliss.tv2.no", "TV2 Bliss"),
    ("tv2.no", "TV2"),
    ("news.tv2.no", "TV2 Nyheter"),
    ("sport.tv2.no", "TV2 Sport"),
    ("pl1.tv2.no", "TV2 Premium"),
    ("pl2.tv2.no", "TV2 Premium2"),
    ("pl3.tv2.no", "TV2 Premium3"),
    ("zebra.tv2.no", "TV2 Zebra"),
    ("max.no", "MAX"),
    ("tvnorge.no", "TV Norge"),
    ("fotball.cmore.no", "C More Fotball"),
    ("viasat4.no", "Viasat 4"),
    ("tv3.no", "TV3"),
    ("voxtv.no", "VOX"),
    ("fem.no", "FEM"),
];

/// Atlas channel group holding the Freeview line-up.
pub const FREEVIEW_GROUP: &str = "cbhh";

/// Freeview channels whose schedules are stored, by Atlas channel title.
pub const UK_CHANNELS: &[&str] = &[
    "BBC One London",
    "BBC Two England",
    "ITV London",
    "Channel 4",
    "Channel 5",
    "ITV2",
    "BBC Three",
    "BBC Four",
    "ITV3",
    "Dave",
    "Film4",
    "BBC News Channel HD",
    "BBC Parliament",
    "Sky News",
];

/// Ordered set of channels processed by one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    channels: Vec<ChannelDescriptor>,
}

impl Catalog {
    pub fn new(channels: Vec<ChannelDescriptor>) -> Self {
        Self { channels }
    }

    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        Self::new(
            pairs
                .iter()
                .map(|(id, name)| ChannelDescriptor::new(*id, *name))
                .collect(),
        )
    }

    pub fn scandinavian() -> Self {
        Self::from_pairs(XMLTV_CHANNELS)
    }

    pub fn channels(&self) -> &[ChannelDescriptor] {
        &self.channels
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChannelDescriptor> {
        self.channels.iter()
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

/// Display names a dynamically enumerated channel group is filtered by.
#[derive(Debug, Clone, Default)]
pub struct AllowList {
    names: HashSet<String>,
}

impl AllowList {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn uk() -> Self {
        Self::new(UK_CHANNELS.iter().copied())
    }

    pub fn allows(&self, name: &str) -> bool {
        self.names.contains(name)
    }
}
