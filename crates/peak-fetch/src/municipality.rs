//! Municipality identity and the file names derived from it.

use serde::Deserialize;

use crate::error::{FetchError, Result};

/// Municipalities whose Kartverket file name differs from the register name.
const KARTVERKET_NAMES: &[(&str, &str)] = &[("3322", "Nesbyen")];

/// A resolved municipality.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Municipality {
    /// Four digit municipality number, e.g. `"3324"`.
    pub id: String,
    /// Norwegian name, e.g. `"Vestre Slidre"`.
    pub name: String,
}

impl Municipality {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    /// `<id>_<name>` with spaces in the name replaced by `_`.
    pub fn file_stem(&self) -> String {
        format!("{}_{}", self.id, self.name.replace(' ', "_"))
    }

    /// Default SSR place name export for this municipality.
    pub fn ssr_file_name(&self) -> String {
        format!("stedsnavn_{}.geojson", self.file_stem())
    }

    /// Kartverket N50 archive name without extension, e.g.
    /// `Basisdata_3324_Vestre_Slidre_25833_N50Kartdata_GML`.
    pub fn n50_archive_stem(&self) -> String {
        let name = KARTVERKET_NAMES
            .iter()
            .find(|(id, _)| *id == self.id)
            .map_or(self.name.as_str(), |(_, name)| name);
        format!(
            "Basisdata_{}_{}_25833_N50Kartdata_GML",
            self.id,
            kartverket_file_name(name)
        )
    }

    /// Entry of the N50 archive that holds the elevation theme.
    pub fn n50_elevation_entry(&self) -> String {
        format!("{}.gml", self.n50_archive_stem().replace("Kartdata", "Hoyde"))
    }

    /// Default merged output file for this municipality.
    pub fn output_file_name(&self) -> String {
        format!("peaks_{}.osm", self.file_stem())
    }
}

impl std::fmt::Display for Municipality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.id, self.name)
    }
}

/// Kartverket spells file names without `æøå` and spaces.
fn kartverket_file_name(name: &str) -> String {
    name.chars()
        .map(|ch| match ch {
            'Æ' => 'E',
            'Ø' => 'O',
            'Å' => 'A',
            'æ' => 'e',
            'ø' => 'o',
            'å' => 'a',
            ' ' => '_',
            other => other,
        })
        .collect()
}

/// How a municipality was asked for on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MunicipalityQuery {
    Number(String),
    Name(String),
}

impl MunicipalityQuery {
    /// All-digit input is a municipality number, anything else a name.
    pub fn parse(input: &str) -> Self {
        let input = input.trim();
        if !input.is_empty() && input.chars().all(|ch| ch.is_ascii_digit()) {
            Self::Number(input.to_string())
        } else {
            Self::Name(input.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Number(text) | Self::Name(text) => text,
        }
    }
}

/// One municipality as returned by the GeoNorge register.
#[derive(Debug, Clone, Deserialize)]
pub struct MunicipalityRecord {
    #[serde(rename = "kommunenummer", default)]
    pub id: String,
    #[serde(rename = "kommunenavnNorsk")]
    pub name: String,
}

/// Body of a name search against the GeoNorge register.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    #[serde(rename = "antallTreff")]
    pub hits: usize,
    #[serde(rename = "kommuner", default)]
    pub municipalities: Vec<MunicipalityRecord>,
}

/// Picks the single hit of a name search.
pub fn resolve_search(query: &str, response: SearchResponse) -> Result<Municipality> {
    match (response.hits, response.municipalities.as_slice()) {
        (1, [only]) => Ok(Municipality::new(only.id.as_str(), only.name.as_str())),
        (_, []) => Err(FetchError::MunicipalityNotFound {
            query: query.to_string(),
        }),
        (_, found) => Err(FetchError::AmbiguousMunicipality {
            query: query.to_string(),
            candidates: found
                .iter()
                .map(|record| format!("{} {}", record.id, record.name))
                .collect(),
        }),
    }
}
