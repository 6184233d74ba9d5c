//! The structured record extracted from one spec document.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Watched-folder tag. Decides downstream handling: CSV export applies only
/// to `Approved`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Folder {
    Ongoing,
    Approved,
}

impl Folder {
    /// Both watched folders, in processing order.
    pub const ALL: [Folder; 2] = [Folder::Ongoing, Folder::Approved];

    /// The tag as stored in the database and used in mail subjects.
    pub fn as_str(&self) -> &'static str {
        match self {
            Folder::Ongoing => "Ongoing",
            Folder::Approved => "Approved",
        }
    }
}

impl fmt::Display for Folder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown folder tag: {0}")]
pub struct ParseFolderError(String);

impl FromStr for Folder {
    type Err = ParseFolderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Ongoing" => Ok(Folder::Ongoing),
            "Approved" => Ok(Folder::Approved),
            other => Err(ParseFolderError(other.to_string())),
        }
    }
}

/// One of the seven section-header tokens recognized in document text.
///
/// Matching is exact and case-sensitive: no trailing punctuation, no
/// case-folding. A body line that happens to equal a token verbatim opens a
/// new section; that strict contract is intentional and must not be loosened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionHeader {
    Title,
    Author,
    Revision,
    Date,
    Area,
    Purpose,
    Description,
}

impl SectionHeader {
    pub const ALL: [SectionHeader; 7] = [
        SectionHeader::Title,
        SectionHeader::Author,
        SectionHeader::Revision,
        SectionHeader::Date,
        SectionHeader::Area,
        SectionHeader::Purpose,
        SectionHeader::Description,
    ];

    /// Match an already-trimmed line against the recognized tokens.
    pub fn parse(line: &str) -> Option<Self> {
        match line {
            "Title" => Some(SectionHeader::Title),
            "Author" => Some(SectionHeader::Author),
            "Revision" => Some(SectionHeader::Revision),
            "Date" => Some(SectionHeader::Date),
            "Area" => Some(SectionHeader::Area),
            "Purpose" => Some(SectionHeader::Purpose),
            "Description" => Some(SectionHeader::Description),
            _ => None,
        }
    }
}

/// Structured record extracted from one spec document.
///
/// `date` stays opaque text: source documents use inconsistent formats, so it
/// is never parsed to a calendar type. `id` is assigned by the store on
/// insert and carries no meaning before persistence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpecRecord {
    pub id: Option<i64>,
    pub title: String,
    pub author: String,
    pub revision: String,
    pub date: String,
    pub area: String,
    pub purpose: String,
    pub description: String,
    pub file_name: String,
    pub folder: Option<Folder>,
}

impl SpecRecord {
    /// Borrow the field a section header names.
    pub fn section(&self, header: SectionHeader) -> &str {
        match header {
            SectionHeader::Title => &self.title,
            SectionHeader::Author => &self.author,
            SectionHeader::Revision => &self.revision,
            SectionHeader::Date => &self.date,
            SectionHeader::Area => &self.area,
            SectionHeader::Purpose => &self.purpose,
            SectionHeader::Description => &self.description,
        }
    }

    /// Mutable slot for the field a section header names.
    pub fn section_mut(&mut self, header: SectionHeader) -> &mut String {
        match header {
            SectionHeader::Title => &mut self.title,
            SectionHeader::Author => &mut self.author,
            SectionHeader::Revision => &mut self.revision,
            SectionHeader::Date => &mut self.date,
            SectionHeader::Area => &mut self.area,
            SectionHeader::Purpose => &mut self.purpose,
            SectionHeader::Description => &mut self.description,
        }
    }

    /// A record is complete when every required field carries a value.
    ///
    /// The check is literal: the empty string counts as missing, a
    /// whitespace-only string does not. No trimming happens here.
    pub fn is_complete(&self) -> bool {
        SectionHeader::ALL
            .iter()
            .all(|header| !self.section(*header).is_empty())
            && !self.file_name.is_empty()
            && self.folder.is_some()
    }
}
