use std::fmt::{self, Display};

use heap_rust_sdk::providers::catalog::{
    BasicInformation,
    CollectionItem,
    Folder,
    RecordKind,
    ReleaseDetails,
    ReleaseId,
    SearchResult,
    WantlistItem,
};
use itertools::Itertools;
use serde::Serialize;

/// A collection or wantlist entry as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordSummary {
    pub id: ReleaseId,
    pub title: String,
    pub artists: String,
    pub year: Option<u32>,
    pub date_added: String,
    /// Cover for collection entries, thumbnail for wantlist entries
    pub image: Option<String>,
}

impl RecordSummary {
    fn new(
        id: ReleaseId,
        date_added: String,
        info: &BasicInformation,
        kind: RecordKind,
    ) -> Self {
        Self {
            id,
            title: info.title.clone(),
            artists: info.artist_names(),
            year: info.year,
            date_added,
            image: info.image_for(kind).map(ToString::to_string),
        }
    }
}

impl From<&CollectionItem> for RecordSummary {
    fn from(item: &CollectionItem) -> Self {
        Self::new(
            item.id,
            item.date_added.to_rfc3339(),
            &item.basic_information,
            RecordKind::Collection,
        )
    }
}

impl From<&WantlistItem> for RecordSummary {
    fn from(item: &WantlistItem) -> Self {
        Self::new(
            item.id,
            item.date_added.to_rfc3339(),
            &item.basic_information,
            RecordKind::Wantlist,
        )
    }
}

impl Display for RecordSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)?;
        if !self.artists.is_empty() {
            write!(f, " - {}", self.artists)?;
        }
        if let Some(year) = self.year.filter(|year| *year > 0) {
            write!(f, " ({year})")?;
        }
        Ok(())
    }
}

/// One record per line
pub struct DisplayRecords<'a>(pub &'a [RecordSummary]);

impl Display for DisplayRecords<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .0
            .iter()
            .map(|record| record.id.to_string().len())
            .max()
            .unwrap_or_default();
        for record in self.0 {
            writeln!(f, "{:>width$}  {record}", record.id.to_string())?;
        }
        Ok(())
    }
}

pub struct DisplayFolders<'a>(pub &'a [Folder]);

impl Display for DisplayFolders<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .0
            .iter()
            .map(|folder| folder.id.to_string().len())
            .max()
            .unwrap_or_default();
        for folder in self.0 {
            writeln!(
                f,
                "{:>width$}  {} ({})",
                folder.id.to_string(),
                folder.name,
                folder.count
            )?;
        }
        Ok(())
    }
}

pub struct DisplayRelease<'a>(pub &'a ReleaseDetails);

impl Display for DisplayRelease<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let release = self.0;
        let artists = release.artists.iter().map(|artist| &artist.name).join(", ");

        writeln!(f, "{} - {}", artists, release.title)?;
        if let Some(year) = release.year.filter(|year| *year > 0) {
            writeln!(f, "Year:     {year}")?;
        }
        if let Some(country) = &release.country {
            writeln!(f, "Country:  {country}")?;
        }
        if !release.labels.is_empty() {
            let labels = release
                .labels
                .iter()
                .map(|label| {
                    if label.catno.is_empty() {
                        label.name.clone()
                    } else {
                        format!("{} ({})", label.name, label.catno)
                    }
                })
                .join(", ");
            writeln!(f, "Labels:   {labels}")?;
        }
        if !release.formats.is_empty() {
            let formats = release
                .formats
                .iter()
                .map(|format| {
                    std::iter::once(format.name.as_str())
                        .chain(format.descriptions.iter().map(String::as_str))
                        .join(", ")
                })
                .join("; ");
            writeln!(f, "Format:   {formats}")?;
        }
        let genres = release.genres.iter().chain(&release.styles).join(", ");
        if !genres.is_empty() {
            writeln!(f, "Genre:    {genres}")?;
        }

        if !release.tracklist.is_empty() {
            writeln!(f)?;
            let width = release
                .tracklist
                .iter()
                .map(|track| track.position.len())
                .max()
                .unwrap_or_default();
            for track in &release.tracklist {
                write!(f, "{:<width$}  {}", track.position, track.title)?;
                if !track.duration.is_empty() {
                    write!(f, " ({})", track.duration)?;
                }
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

pub struct DisplaySearchResults<'a>(pub &'a [SearchResult]);

impl Display for DisplaySearchResults<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .0
            .iter()
            .map(|result| result.id.to_string().len())
            .max()
            .unwrap_or_default();
        for result in self.0 {
            write!(
                f,
                "{:>width$}  {:<7}  {}",
                result.id,
                result.result_type.as_str(),
                result.title
            )?;
            if let Some(year) = &result.year {
                write!(f, " ({year})")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
